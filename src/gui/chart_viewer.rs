//! Chart Viewer Widget
//! Shows the last rendered figure as a texture, or the error that prevented it.

use crate::charts::RenderedFigure;
use egui::{Color32, RichText, TextureHandle, TextureOptions};

enum Content {
    Empty,
    Figure {
        texture: TextureHandle,
        size: [usize; 2],
    },
    Error(String),
}

pub struct ChartViewer {
    content: Content,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            content: Content::Empty,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.content = Content::Empty;
    }

    /// Upload a rendered figure, replacing whatever was shown.
    pub fn set_figure(&mut self, ctx: &egui::Context, figure: &RenderedFigure) {
        let size = [figure.width as usize, figure.height as usize];
        let image = egui::ColorImage::from_rgb(size, &figure.pixels);
        let texture = ctx.load_texture("figure", image, TextureOptions::LINEAR);
        self.content = Content::Figure { texture, size };
    }

    pub fn set_error(&mut self, message: String) {
        self.content = Content::Error(message);
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        match &self.content {
            Content::Empty => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Plot").size(20.0).color(Color32::GRAY));
                });
            }
            Content::Figure { texture, size } => {
                let shown = display_size(*size, ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.image((texture.id(), shown));
                });
            }
            Content::Error(message) => {
                egui::Frame::none()
                    .fill(ui.visuals().extreme_bg_color)
                    .rounding(5.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(format!("⚠ {message}"))
                                .size(13.0)
                                .color(Color32::from_rgb(220, 53, 69)),
                        );
                    });
            }
        }
    }
}

/// Figure size scaled down to fit `available_width`; never enlarged.
fn display_size(size: [usize; 2], available_width: f32) -> egui::Vec2 {
    let (w, h) = (size[0] as f32, size[1] as f32);
    let scale = if w > 0.0 && available_width > 0.0 {
        (available_width / w).min(1.0)
    } else {
        1.0
    };
    egui::vec2(w * scale, h * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_figures_shrink_to_fit() {
        let shown = display_size([1000, 800], 500.0);
        assert_eq!(shown, egui::vec2(500.0, 400.0));
    }

    #[test]
    fn small_figures_keep_their_size() {
        let shown = display_size([600, 400], 1200.0);
        assert_eq!(shown, egui::vec2(600.0, 400.0));
    }
}
