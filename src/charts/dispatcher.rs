//! Chart Dispatcher
//! Maps a validated plot request onto the Table and produces one Figure.

use crate::charts::figure::{
    Bar, CorrelationMatrix, Decorations, Figure, FigureLayout, Label, Marks, Panel,
    LABEL_FONT_SIZE, TITLE_FONT_SIZE,
};
use crate::charts::ChartKind;
use crate::config::FigureConfig;
use crate::data::{Axis, ColumnRef, PlotPlan, PlotRequest, SelectionError, Table};
use crate::stats::{StatsCalculator, KDE_GRID_POINTS};
use polars::prelude::PolarsError;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Heatmaps never grow past this multiple of the configured size.
const MAX_HEATMAP_SCALE: f32 = 3.0;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("Failed to read column data: {0}")]
    Data(#[from] PolarsError),
    #[error("Column '{column}' has no values to plot")]
    EmptyData { column: String },
    #[error("Heatmap Correlation needs at least one numeric column")]
    NoNumericColumns,
}

/// Builds figures from the loaded Table.
pub struct ChartDispatcher;

impl ChartDispatcher {
    /// Validate `request` against `table` and build its figure.
    pub fn build(
        table: &Table,
        request: &PlotRequest,
        config: &FigureConfig,
    ) -> Result<Figure, ChartError> {
        let plan = request.validate(table)?;
        tracing::debug!(kind = %request.kind, theme = %request.theme, "building figure");

        let single = |marks: Marks, x_categories: Option<Vec<String>>| {
            (
                config.single_size,
                FigureLayout::Single(Self::decorate(request, marks, x_categories)),
            )
        };

        let (size, layout) = match plan {
            PlotPlan::Line { x, y } => {
                let (points, categories) = Self::xy_points(table, &x, &y)?;
                single(Marks::Line(points), categories)
            }
            PlotPlan::Scatter { x, y } => {
                let (points, categories) = Self::xy_points(table, &x, &y)?;
                single(Marks::Scatter(points), categories)
            }
            PlotPlan::Bar { x, y } => single(Marks::Bars(Self::mean_bars(table, &x, &y)?), None),
            PlotPlan::Count { x } => single(Marks::Bars(Self::count_bars(table, &x)?), None),
            // Text columns are binned per category, like a count plot.
            PlotPlan::Distribution { x } if !x.is_numeric() => {
                single(Marks::Bars(Self::count_bars(table, &x)?), None)
            }
            PlotPlan::Distribution { x } => single(Self::distribution(table, &x)?, None),
            PlotPlan::Pair { x, y } => {
                let (w, h) = config.pair_panel_size;
                (
                    (w * 2, h * 2),
                    Self::pair_grid(table, &[x, y])?,
                )
            }
            PlotPlan::Heatmap => {
                let matrix = Self::correlation(table)?;
                (
                    Self::heatmap_size(config, matrix.columns.len()),
                    FigureLayout::Heatmap(matrix),
                )
            }
        };

        Ok(Figure {
            kind: request.kind,
            theme: request.theme,
            size,
            layout,
        })
    }

    /// Title and axis labels for single-panel kinds.
    fn decorate(request: &PlotRequest, marks: Marks, x_categories: Option<Vec<String>>) -> Panel {
        let x = request.axis_label(Axis::X);
        let y = request.axis_label(Axis::Y);

        let decorations = Decorations {
            title: Some(Label::new(
                format!("{} of {} vs {}", request.kind, y, x),
                TITLE_FONT_SIZE,
            )),
            x_label: Some(Label::new(x, LABEL_FONT_SIZE)),
            y_label: Some(Label::new(y, LABEL_FONT_SIZE)),
            x_tick_rotation: if request.kind.rotates_x_ticks() {
                45.0
            } else {
                0.0
            },
            x_categories,
            ..Decorations::default()
        };

        Panel { marks, decorations }
    }

    /// (x, y) for every row where both values are present, in row order.
    /// A text x column is placed at category positions 0..n in order of first
    /// appearance; the categories are returned alongside.
    fn xy_points(
        table: &Table,
        x: &ColumnRef,
        y: &ColumnRef,
    ) -> Result<(Vec<(f64, f64)>, Option<Vec<String>>), ChartError> {
        let ys = table.numeric_values(y)?;

        let (points, categories) = if x.is_numeric() {
            let points: Vec<(f64, f64)> = table
                .numeric_values(x)?
                .into_iter()
                .zip(ys)
                .filter_map(|(x, y)| Some((x?, y?)))
                .collect();
            (points, None)
        } else {
            let mut positions: HashMap<String, usize> = HashMap::new();
            let mut categories: Vec<String> = Vec::new();
            let mut points = Vec::new();
            for (label, y) in table.text_values(x)?.into_iter().zip(ys) {
                let (Some(label), Some(y)) = (label, y) else {
                    continue;
                };
                let position = match positions.get(&label) {
                    Some(&p) => p,
                    None => {
                        let p = categories.len();
                        positions.insert(label.clone(), p);
                        categories.push(label);
                        p
                    }
                };
                points.push((position as f64, y));
            }
            (points, Some(categories))
        };

        if points.is_empty() {
            return Err(ChartError::EmptyData {
                column: x.name().to_string(),
            });
        }
        Ok((points, categories))
    }

    /// Per-row category labels. Rows whose numeric x is missing get `None`.
    fn category_labels(table: &Table, x: &ColumnRef) -> Result<Vec<Option<String>>, ChartError> {
        let labels = table.text_values(x)?;
        if !x.is_numeric() {
            return Ok(labels);
        }
        let numbers = table.numeric_values(x)?;
        Ok(labels
            .into_iter()
            .zip(numbers)
            .map(|(label, n)| n.and(label))
            .collect())
    }

    /// Distinct categories: ascending for numeric columns, first appearance otherwise.
    fn category_order(
        table: &Table,
        x: &ColumnRef,
        rows: &[(String, usize)],
    ) -> Result<Vec<String>, ChartError> {
        let mut seen = HashSet::new();
        let mut order: Vec<(&str, usize)> = Vec::new();
        for (label, row) in rows {
            if seen.insert(label.as_str()) {
                order.push((label.as_str(), *row));
            }
        }

        if x.is_numeric() {
            let numbers = table.numeric_values(x)?;
            let key = |row: usize| numbers[row].unwrap_or(f64::NAN);
            order.sort_by(|a, b| key(a.1).total_cmp(&key(b.1)));
        }

        Ok(order.into_iter().map(|(label, _)| label.to_string()).collect())
    }

    /// One bar per x category, height = mean of y in that category.
    fn mean_bars(table: &Table, x: &ColumnRef, y: &ColumnRef) -> Result<Vec<Bar>, ChartError> {
        let labels = Self::category_labels(table, x)?;
        let ys = table.numeric_values(y)?;

        let rows: Vec<(String, usize, f64)> = labels
            .into_iter()
            .zip(ys)
            .enumerate()
            .filter_map(|(row, (label, y))| Some((label?, row, y?)))
            .collect();
        if rows.is_empty() {
            return Err(ChartError::EmptyData {
                column: y.name().to_string(),
            });
        }

        let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
        for (label, _, value) in &rows {
            groups.entry(label.as_str()).or_default().push(*value);
        }

        let keyed: Vec<(String, usize)> = rows
            .iter()
            .map(|(label, row, _)| (label.clone(), *row))
            .collect();
        let order = Self::category_order(table, x, &keyed)?;

        Ok(order
            .into_iter()
            .map(|label| {
                let height = groups
                    .get(label.as_str())
                    .map(|values| StatsCalculator::mean(values))
                    .unwrap_or(f64::NAN);
                Bar { label, height }
            })
            .collect())
    }

    /// One bar per distinct x value, height = occurrences.
    fn count_bars(table: &Table, x: &ColumnRef) -> Result<Vec<Bar>, ChartError> {
        let rows: Vec<(String, usize)> = Self::category_labels(table, x)?
            .into_iter()
            .enumerate()
            .filter_map(|(row, label)| Some((label?, row)))
            .collect();
        if rows.is_empty() {
            return Err(ChartError::EmptyData {
                column: x.name().to_string(),
            });
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (label, _) in &rows {
            *counts.entry(label.as_str()).or_default() += 1;
        }

        let order = Self::category_order(table, x, &rows)?;
        Ok(order
            .into_iter()
            .map(|label| {
                let height = counts.get(label.as_str()).copied().unwrap_or(0) as f64;
                Bar { label, height }
            })
            .collect())
    }

    /// Histogram of x with a density curve scaled to the count axis.
    fn distribution(table: &Table, x: &ColumnRef) -> Result<Marks, ChartError> {
        let values = Self::present_values(table, x)?;
        let bins = StatsCalculator::histogram(&values);

        let bin_width = bins.first().map(|b| b.end - b.start).unwrap_or(1.0);
        let scale = values.len() as f64 * bin_width;
        let density = StatsCalculator::kde(&values, KDE_GRID_POINTS)
            .into_iter()
            .map(|(x, d)| (x, d * scale))
            .collect();

        Ok(Marks::Histogram { bins, density })
    }

    fn present_values(table: &Table, column: &ColumnRef) -> Result<Vec<f64>, ChartError> {
        let values: Vec<f64> = table.numeric_values(column)?.into_iter().flatten().collect();
        if values.is_empty() {
            return Err(ChartError::EmptyData {
                column: column.name().to_string(),
            });
        }
        Ok(values)
    }

    /// Square grid: histograms on the diagonal, scatter plots elsewhere.
    /// Only the outer panels carry axis labels.
    fn pair_grid(table: &Table, variables: &[ColumnRef]) -> Result<FigureLayout, ChartError> {
        let n = variables.len();
        let mut panels = Vec::with_capacity(n * n);

        for (row, row_var) in variables.iter().enumerate() {
            for (col, col_var) in variables.iter().enumerate() {
                let marks = if row == col {
                    Marks::Histogram {
                        bins: StatsCalculator::histogram(&Self::present_values(table, row_var)?),
                        density: Vec::new(),
                    }
                } else {
                    Marks::Scatter(Self::xy_points(table, col_var, row_var)?.0)
                };

                let decorations = Decorations {
                    x_label: (row == n - 1).then(|| Label::new(col_var.name(), LABEL_FONT_SIZE)),
                    y_label: (col == 0).then(|| Label::new(row_var.name(), LABEL_FONT_SIZE)),
                    ..Decorations::default()
                };
                panels.push(Panel { marks, decorations });
            }
        }

        Ok(FigureLayout::Grid {
            variables: variables.iter().map(|v| v.name().to_string()).collect(),
            panels,
        })
    }

    /// Correlation across every numeric column of the table.
    fn correlation(table: &Table) -> Result<CorrelationMatrix, ChartError> {
        let columns = table.numeric_columns();
        if columns.is_empty() {
            return Err(ChartError::NoNumericColumns);
        }

        let data = columns
            .iter()
            .map(|c| table.numeric_values(c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorrelationMatrix {
            columns: columns.iter().map(|c| c.name().to_string()).collect(),
            values: StatsCalculator::correlation_matrix(&data),
        })
    }

    fn heatmap_size(config: &FigureConfig, columns: usize) -> (u32, u32) {
        let base = config.heatmap_base_columns.max(1) as f32;
        let scale = (columns as f32 / base).clamp(1.0, MAX_HEATMAP_SCALE);
        let (w, h) = config.heatmap_size;
        ((w as f32 * scale) as u32, (h as f32 * scale) as u32)
    }
}
