//! Data Visualizer Main Application
//! Data preview on the left; selectors and the rendered figure on the right.

use crate::charts::{ChartDispatcher, RenderedFigure, StaticChartRenderer};
use crate::config::{FigureConfig, VisualizerConfig};
use crate::data::{DataLoader, LoaderError, PlotRequest, Table};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, DataPreview, Status};
use anyhow::Context;
use egui::SidePanel;
use std::path::Path;

/// Main application window.
pub struct DataVisualizerApp {
    config: VisualizerConfig,
    loader: DataLoader,
    preview: DataPreview,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DataVisualizerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: VisualizerConfig) -> Self {
        Self {
            loader: DataLoader::new(config.infer_schema_length),
            preview: DataPreview::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            config,
        }
    }

    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            let result = self.loader.load_csv_path(&path).map(|_| ());
            self.finish_load(result);
        }
    }

    /// Load the first file dropped onto the window.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        let result = if let Some(bytes) = &file.bytes {
            let name = if file.name.is_empty() {
                "dropped.csv"
            } else {
                file.name.as_str()
            };
            self.loader.load_csv_bytes(name, bytes).map(|_| ())
        } else if let Some(path) = &file.path {
            self.loader.load_csv_path(Path::new(path)).map(|_| ())
        } else {
            return;
        };
        self.finish_load(result);
    }

    /// Refresh the preview and selectors, or report why the file was rejected.
    /// A failed load keeps the previous table.
    fn finish_load(&mut self, result: Result<(), LoaderError>) {
        match result {
            Ok(()) => {
                let (Some(table), Some(source)) = (self.loader.table(), self.loader.source())
                else {
                    return;
                };
                self.preview.set(source, table, self.config.preview_rows);
                self.control_panel.update_columns(source, table);
                self.chart_viewer.clear();
                self.control_panel.set_status(Status::Success(format!(
                    "Loaded {} rows, {} columns",
                    table.height(),
                    table.width()
                )));
            }
            Err(e) => {
                tracing::warn!(error = %e, "csv load failed");
                self.control_panel
                    .set_status(Status::Error(format!("Error: {e}")));
            }
        }
    }

    fn handle_generate(&mut self, ctx: &egui::Context) {
        let Some(table) = self.loader.table() else {
            self.control_panel
                .set_status(Status::Error("Error: no data loaded".to_string()));
            return;
        };
        let request = self.control_panel.request();

        match generate(table, &request, &self.config.figure) {
            Ok(figure) => {
                self.chart_viewer.set_figure(ctx, &figure);
                self.control_panel.set_status(Status::Success(format!(
                    "Generated {} ({})",
                    request.kind, request.theme
                )));
            }
            Err(e) => {
                let message = format!("{e:#}");
                tracing::warn!(kind = %request.kind, error = %message, "plot failed");
                self.chart_viewer.set_error(message);
                self.control_panel
                    .set_status(Status::Info("Plot not generated".to_string()));
            }
        }
    }
}

/// Dispatch then render one request.
fn generate(
    table: &Table,
    request: &PlotRequest,
    config: &FigureConfig,
) -> anyhow::Result<RenderedFigure> {
    let figure = ChartDispatcher::build(table, request, config)
        .with_context(|| format!("Cannot build {}", request.kind))?;
    let rendered = StaticChartRenderer::render(&figure)
        .with_context(|| format!("Cannot draw {}", request.kind))?;
    Ok(rendered)
}

impl eframe::App for DataVisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // Left panel - Data Preview
        SidePanel::left("data_preview")
            .default_width(360.0)
            .min_width(250.0)
            .show(ctx, |ui| {
                self.preview.show(ui);
            });

        // Right - selectors with the figure below
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                match self.control_panel.show(ui, self.loader.table()) {
                    ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                    ControlPanelAction::GeneratePlot => self.handle_generate(ctx),
                    ControlPanelAction::None => {}
                }

                ui.add_space(10.0);
                ui.separator();
                ui.add_space(10.0);

                self.chart_viewer.show(ui);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, StyleTheme};

    #[test]
    fn generate_reports_selection_errors_with_context() {
        let table = Table::from_csv_bytes(b"a,b\n1,2\n3,4\n", None).expect("csv");
        let request = PlotRequest::new(None, None, ChartKind::Scatter, StyleTheme::Dark);

        let err = generate(&table, &request, &FigureConfig::default())
            .expect_err("no columns selected");
        let message = format!("{err:#}");
        assert!(message.starts_with("Cannot build Scatter Plot"), "{message}");
        assert!(message.contains("None is selected"), "{message}");
    }

    #[test]
    fn generate_rejects_text_for_numeric_kinds() {
        let table = Table::from_csv_bytes(b"name,score\nx,1\ny,2\n", None).expect("csv");
        let request = PlotRequest::new(
            table.column_ref("score").ok(),
            table.column_ref("name").ok(),
            ChartKind::Line,
            StyleTheme::White,
        );

        let err = generate(&table, &request, &FigureConfig::default())
            .expect_err("text y column");
        assert!(format!("{err:#}").contains("not numeric"));
    }
}
