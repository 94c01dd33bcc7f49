//! Static Chart Renderer
//! Rasterizes a Figure into an RGB buffer with the plotters bitmap backend.
//!
//! Layout:
//! 1. Single: one set of axes with optional title and axis labels
//! 2. Grid: square pair grid, one set of axes per cell
//! 3. Heatmap: annotated cells, row labels left, column labels below, colorbar right
//!
//! Rotated tick labels are rasterized separately and copied in after the
//! backend releases the buffer.

use crate::charts::figure::{CorrelationMatrix, Figure, FigureLayout, Marks, Panel, LABEL_FONT_SIZE};
use crate::charts::theme::{annotation_color, coolwarm, ThemeStyle};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use thiserror::Error;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Figures are laid out as if printed at this resolution.
const DPI: f32 = 100.0;
const MAX_DIMENSION: u32 = 8192;
const COLORBAR_WIDTH: u32 = 20;
const MAX_TICKS: usize = 8;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid figure size {0}x{1}")]
    InvalidSize(u32, u32),
    #[error("Drawing failed: {0}")]
    Drawing(String),
}

fn drawing<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Point size to pixels.
fn px(points: f32) -> u32 {
    (points * DPI / 72.0).round() as u32
}

/// Rendered RGB pixels, row-major.
#[derive(Debug, Clone)]
pub struct RenderedFigure {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Text drawn at an angle once the main backend is done.
struct RotatedLabel {
    text: String,
    /// Top-center of the rotated text's bounding box.
    anchor: (i32, i32),
    size: u32,
    angle: f32,
    color: RGBColor,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Draw the complete figure.
    pub fn render(figure: &Figure) -> Result<RenderedFigure, RenderError> {
        let (width, height) = figure.size;
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RenderError::InvalidSize(width, height));
        }

        let style = ThemeStyle::for_theme(figure.theme);
        let mut pixels = vec![0u8; width as usize * height as usize * 3];

        let rotated = {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            root.fill(&style.figure_background).map_err(drawing)?;

            let labels = match &figure.layout {
                FigureLayout::Single(panel) => Self::draw_panel(&root, panel, &style)?,
                FigureLayout::Grid { variables, panels } => {
                    Self::draw_grid(&root, variables.len(), panels, &style)?
                }
                FigureLayout::Heatmap(matrix) => Self::draw_heatmap(&root, matrix, &style)?,
            };
            root.present().map_err(drawing)?;
            labels
        };

        for label in &rotated {
            Self::blit_rotated(&mut pixels, width, height, label)?;
        }

        tracing::debug!(kind = %figure.kind, width, height, "rendered figure");
        Ok(RenderedFigure {
            width,
            height,
            pixels,
        })
    }

    fn draw_grid(
        area: &Area,
        n: usize,
        panels: &[Panel],
        style: &ThemeStyle,
    ) -> Result<Vec<RotatedLabel>, RenderError> {
        let mut labels = Vec::new();
        if n == 0 {
            return Ok(labels);
        }
        for (cell, panel) in area.split_evenly((n, n)).iter().zip(panels) {
            labels.extend(Self::draw_panel(cell, panel, style)?);
        }
        Ok(labels)
    }

    fn draw_panel(
        area: &Area,
        panel: &Panel,
        style: &ThemeStyle,
    ) -> Result<Vec<RotatedLabel>, RenderError> {
        let deco = &panel.decorations;
        let tick_px = px(deco.tick_size);
        // A zero tick size draws the marks alone, without axes or text.
        let bare = tick_px == 0;
        let rotated = deco.x_tick_rotation != 0.0 && !bare;
        let desc_px = |label: &Option<crate::charts::figure::Label>| {
            label.as_ref().map(|l| px(l.size) + 6).unwrap_or(0)
        };

        let (mut x_range, y_range) = Self::ranges(&panel.marks);
        if let Some(categories) = &deco.x_categories {
            x_range = category_range(categories.len());
        }
        let categorical = deco.x_categories.is_some() || matches!(panel.marks, Marks::Bars(_));

        let x_ticks: Vec<(f64, String)> = match (&panel.marks, &deco.x_categories) {
            (_, Some(categories)) => categories
                .iter()
                .enumerate()
                .map(|(i, c)| (i as f64, c.clone()))
                .collect(),
            (Marks::Bars(bars), None) => bars
                .iter()
                .enumerate()
                .map(|(i, b)| (i as f64, b.label.clone()))
                .collect(),
            _ => nice_ticks(x_range.start, x_range.end, MAX_TICKS)
                .into_iter()
                .map(|v| (v, format_tick(v)))
                .collect(),
        };

        let tick_area = if rotated {
            let longest = x_ticks
                .iter()
                .map(|(_, t)| t.chars().count())
                .max()
                .unwrap_or(1);
            let cap = area.dim_in_pixel().1 * 2 / 5;
            (rotated_extent(longest, tick_px, deco.x_tick_rotation) + 8).min(cap)
        } else {
            tick_px + 10
        };
        let x_area = if bare { 0 } else { tick_area + desc_px(&deco.x_label) };
        let y_area = if bare { 0 } else { tick_px * 4 + desc_px(&deco.y_label) };

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(px(6.0))
            .x_label_area_size(x_area)
            .y_label_area_size(y_area);
        if let Some(title) = deco.title.as_ref().filter(|_| !bare) {
            builder.caption(
                &title.text,
                ("sans-serif", px(title.size)).into_font().color(&style.text),
            );
        }
        let mut chart = builder
            .build_cartesian_2d(x_range.clone(), y_range.clone())
            .map_err(drawing)?;

        chart
            .plotting_area()
            .fill(&style.plot_background)
            .map_err(drawing)?;

        let blank = |_: &f64| String::new();
        let numeric = |v: &f64| format_tick(*v);
        let bar_label = |v: &f64| {
            let idx = v.round();
            if (v - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            x_ticks
                .get(idx as usize)
                .map(|(_, t)| t.clone())
                .unwrap_or_default()
        };
        let x_formatter: &dyn Fn(&f64) -> String = if rotated {
            &blank
        } else if categorical {
            &bar_label
        } else {
            &numeric
        };

        if !bare {
            let mut mesh = chart.configure_mesh();
            mesh.x_labels(MAX_TICKS)
                .y_labels(MAX_TICKS)
                .x_label_formatter(x_formatter)
                .y_label_formatter(&numeric)
                .label_style(("sans-serif", tick_px).into_font().color(&style.text))
                .axis_style(style.axis_or_background().stroke_width(1))
                .set_all_tick_mark_size(if style.tick_marks { px(3.5) } else { 0 });

            if let Some(grid) = style.grid {
                mesh.bold_line_style(grid.stroke_width(1)).max_light_lines(0);
            } else {
                mesh.disable_mesh();
            }
            if let Some(label) = &deco.x_label {
                mesh.x_desc(label.text.as_str());
            }
            if let Some(label) = &deco.y_label {
                mesh.y_desc(label.text.as_str());
            }
            if let Some(label) = deco.x_label.as_ref().or(deco.y_label.as_ref()) {
                mesh.axis_desc_style(("sans-serif", px(label.size)).into_font().color(&style.text));
            }
            mesh.draw().map_err(drawing)?;
        }

        let color = style.series;
        match &panel.marks {
            Marks::Line(points) => {
                chart
                    .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                    .map_err(drawing)?;
            }
            Marks::Scatter(points) => {
                chart
                    .draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))
                    .map_err(drawing)?;
            }
            Marks::Bars(bars) => {
                chart
                    .draw_series(
                        bars.iter()
                            .enumerate()
                            .filter(|(_, b)| b.height.is_finite())
                            .map(|(i, b)| {
                                let x = i as f64;
                                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.height)], color.filled())
                            }),
                    )
                    .map_err(drawing)?;
            }
            Marks::Histogram { bins, density } => {
                chart
                    .draw_series(bins.iter().map(|b| {
                        Rectangle::new(
                            [(b.start, 0.0), (b.end, b.count as f64)],
                            color.mix(0.75).filled(),
                        )
                    }))
                    .map_err(drawing)?;
                chart
                    .draw_series(bins.iter().map(|b| {
                        Rectangle::new(
                            [(b.start, 0.0), (b.end, b.count as f64)],
                            style.figure_background.stroke_width(1),
                        )
                    }))
                    .map_err(drawing)?;
                if !density.is_empty() {
                    chart
                        .draw_series(LineSeries::new(
                            density.iter().copied(),
                            color.stroke_width(2),
                        ))
                        .map_err(drawing)?;
                }
            }
        }

        let mut labels = Vec::new();
        if rotated {
            for (x, text) in x_ticks {
                let (tx, ty) = chart.backend_coord(&(x, y_range.start));
                labels.push(RotatedLabel {
                    text,
                    anchor: (tx, ty + 4),
                    size: tick_px,
                    angle: deco.x_tick_rotation,
                    color: style.text,
                });
            }
        }
        Ok(labels)
    }

    fn draw_heatmap(
        area: &Area,
        matrix: &CorrelationMatrix,
        style: &ThemeStyle,
    ) -> Result<Vec<RotatedLabel>, RenderError> {
        let (width, height) = area.dim_in_pixel();
        let n = matrix.columns.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let label_px = px(LABEL_FONT_SIZE);
        let longest = matrix
            .columns
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(1);

        let left = approx_text_width(longest, label_px) + 16;
        let bottom = rotated_extent(longest, label_px, 45.0) + 16;
        let top = 20;
        let right = COLORBAR_WIDTH + label_px * 4 + 40;

        let grid_w = width.saturating_sub(left + right);
        let grid_h = height.saturating_sub(top + bottom);
        if grid_w == 0 || grid_h == 0 {
            return Err(RenderError::InvalidSize(width, height));
        }

        let cell_w = grid_w as f64 / n as f64;
        let cell_h = grid_h as f64 / n as f64;
        let (vmin, vmax) = value_range(matrix);
        let normalize = |v: f64| (v - vmin) / (vmax - vmin);
        let annot_px = label_px.min((cell_h * 0.4) as u32).max(6);

        let x_at = |col: usize| left as i32 + (col as f64 * cell_w).round() as i32;
        let y_at = |row: usize| top as i32 + (row as f64 * cell_h).round() as i32;

        for row in 0..n {
            for col in 0..n {
                let value = matrix.values[row][col];
                let fill = if value.is_finite() {
                    coolwarm(normalize(value))
                } else {
                    style.figure_background
                };
                let (x0, y0, x1, y1) = (x_at(col), y_at(row), x_at(col + 1), y_at(row + 1));
                area.draw(&Rectangle::new([(x0, y0), (x1, y1)], fill.filled()))
                    .map_err(drawing)?;

                let text = matrix.annotation(row, col);
                if !text.is_empty() {
                    let font = ("sans-serif", annot_px)
                        .into_font()
                        .color(&annotation_color(fill))
                        .pos(Pos::new(HPos::Center, VPos::Center));
                    area.draw(&Text::new(text, ((x0 + x1) / 2, (y0 + y1) / 2), font))
                        .map_err(drawing)?;
                }
            }
        }

        let mut labels = Vec::with_capacity(n);
        for (i, name) in matrix.columns.iter().enumerate() {
            let row_font = ("sans-serif", label_px)
                .into_font()
                .color(&style.text)
                .pos(Pos::new(HPos::Right, VPos::Center));
            let cy = (y_at(i) + y_at(i + 1)) / 2;
            area.draw(&Text::new(name.as_str(), (left as i32 - 6, cy), row_font))
                .map_err(drawing)?;

            labels.push(RotatedLabel {
                text: name.clone(),
                anchor: ((x_at(i) + x_at(i + 1)) / 2, y_at(n) + 4),
                size: label_px,
                angle: 45.0,
                color: style.text,
            });
        }

        // Colorbar: vmax at the top.
        let bar_x = (left + grid_w + 20) as i32;
        let bar_top = top as i32;
        for k in 0..grid_h {
            let t = 1.0 - k as f64 / grid_h.max(1) as f64;
            let y = bar_top + k as i32;
            area.draw(&Rectangle::new(
                [(bar_x, y), (bar_x + COLORBAR_WIDTH as i32, y + 1)],
                coolwarm(t).filled(),
            ))
            .map_err(drawing)?;
        }
        for tick in nice_ticks(vmin, vmax, 5) {
            let t = normalize(tick);
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            let y = bar_top + ((1.0 - t) * grid_h as f64).round() as i32;
            let font = ("sans-serif", label_px)
                .into_font()
                .color(&style.text)
                .pos(Pos::new(HPos::Left, VPos::Center));
            area.draw(&Text::new(
                format_tick(tick),
                (bar_x + COLORBAR_WIDTH as i32 + 6, y),
                font,
            ))
            .map_err(drawing)?;
        }

        Ok(labels)
    }

    /// Axis ranges with a little headroom; bar and histogram axes start at zero.
    fn ranges(marks: &Marks) -> (Range<f64>, Range<f64>) {
        match marks {
            Marks::Line(points) | Marks::Scatter(points) => (
                padded(points.iter().map(|p| p.0)),
                padded(points.iter().map(|p| p.1)),
            ),
            Marks::Bars(bars) => (
                category_range(bars.len()),
                zero_based(bars.iter().map(|b| b.height)),
            ),
            Marks::Histogram { bins, density } => {
                let x = match (bins.first(), bins.last()) {
                    (Some(first), Some(last)) => padded([first.start, last.end].into_iter()),
                    _ => 0.0..1.0,
                };
                let y = zero_based(
                    bins.iter()
                        .map(|b| b.count as f64)
                        .chain(density.iter().map(|d| d.1)),
                );
                (x, y)
            }
        }
    }

    /// Copy a label, rotated counter-clockwise by its angle, into `pixels`.
    fn blit_rotated(
        pixels: &mut [u8],
        width: u32,
        height: u32,
        label: &RotatedLabel,
    ) -> Result<(), RenderError> {
        let font = ("sans-serif", label.size).into_font();

        let (text_w, text_h) = {
            let mut scratch = vec![0u8; 3];
            let measure = BitMapBackend::with_buffer(&mut scratch, (1, 1)).into_drawing_area();
            measure
                .estimate_text_size(&label.text, &font.color(&BLACK))
                .map_err(drawing)?
        };
        let (tw, th) = (text_w + 4, text_h + 4);

        let mut glyphs = vec![255u8; tw as usize * th as usize * 3];
        {
            let scratch = BitMapBackend::with_buffer(&mut glyphs, (tw, th)).into_drawing_area();
            scratch
                .draw(&Text::new(label.text.as_str(), (2, 2), font.color(&BLACK)))
                .map_err(drawing)?;
            scratch.present().map_err(drawing)?;
        }

        let (sin, cos) = (label.angle as f64).to_radians().sin_cos();
        let (half_w, half_h) = (tw as f64 / 2.0, th as f64 / 2.0);
        let extent_x = (half_w * cos.abs() + half_h * sin.abs()).ceil() as i32;
        let extent_y = (half_w * sin.abs() + half_h * cos.abs()).ceil() as i32;
        let (cx, cy) = (label.anchor.0, label.anchor.1 + extent_y);
        let color = [label.color.0, label.color.1, label.color.2];

        for dy in -extent_y..=extent_y {
            for dx in -extent_x..=extent_x {
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    continue;
                }

                let sx = dx as f64 * cos - dy as f64 * sin + half_w;
                let sy = dx as f64 * sin + dy as f64 * cos + half_h;
                if sx < 0.0 || sy < 0.0 || sx >= tw as f64 || sy >= th as f64 {
                    continue;
                }

                let src = (sy as usize * tw as usize + sx as usize) * 3;
                let coverage = 1.0 - glyphs[src] as f64 / 255.0;
                if coverage <= 0.0 {
                    continue;
                }

                let dst = (y as usize * width as usize + x as usize) * 3;
                for (channel, &c) in color.iter().enumerate() {
                    let bg = pixels[dst + channel] as f64;
                    pixels[dst + channel] = (c as f64 * coverage + bg * (1.0 - coverage)) as u8;
                }
            }
        }
        Ok(())
    }
}

/// Categories sit at 0..n with half a slot of room on either side.
fn category_range(n: usize) -> Range<f64> {
    -0.5..(n as f64 - 0.5).max(0.5)
}

/// Finite min/max of the matrix; a flat matrix gets a unit-wide range.
fn value_range(matrix: &CorrelationMatrix) -> (f64, f64) {
    let (min, max) = matrix
        .values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        (-1.0, 1.0)
    } else if max > min {
        (min, max)
    } else {
        (max - 1.0, max)
    }
}

fn padded(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return 0.0..1.0;
    }
    if max <= min {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

fn zero_based(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if max <= min {
        return 0.0..1.0;
    }
    let pad = (max - min) * 0.05;
    let lo = if min < 0.0 { min - pad } else { 0.0 };
    let hi = if max > 0.0 { max + pad } else { 0.0 };
    lo..hi
}

/// Rough width of `chars` characters of a sans-serif face.
fn approx_text_width(chars: usize, size_px: u32) -> u32 {
    (chars as f32 * size_px as f32 * 0.6).ceil() as u32
}

/// Vertical space taken by a rotated label.
fn rotated_extent(chars: usize, size_px: u32, angle: f32) -> u32 {
    let (sin, cos) = angle.to_radians().sin_cos();
    let w = approx_text_width(chars, size_px) as f32;
    let h = size_px as f32;
    (w * sin.abs() + h * cos.abs()).ceil() as u32
}

/// Generate "nice" tick values in [min, max] with roughly max_ticks steps.
fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let range = if max > min { max - min } else { 1.0 };
    if max_ticks == 0 {
        return vec![min];
    }
    let raw_step = range / max_ticks as f64;
    let mag = 10.0_f64.powf(raw_step.log10().floor());
    let norm = raw_step / mag;
    let step = if norm <= 1.0 {
        mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };

    let mut ticks = Vec::new();
    let mut v = (min / step).ceil() * step;
    while v <= max + step * 0.001 && ticks.len() <= max_ticks + 2 {
        // Snap values like 0.30000000000000004 before formatting.
        ticks.push((v / step).round() * step);
        v += step;
    }
    if ticks.is_empty() {
        ticks.push(min);
    }
    ticks
}

/// Format a tick value for display (integer when whole, else up to 2 decimals).
fn format_tick(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let abs = v.abs();
    if abs >= 1e5 || abs < 1e-3 {
        format!("{:.1e}", v)
    } else if (v - v.round()).abs() < 1e-9 {
        format!("{:.0}", v)
    } else if (v * 10.0 - (v * 10.0).round()).abs() < 1e-9 {
        format!("{:.1}", v)
    } else {
        format!("{:.2}", v)
    }
}
