//! Data Preview Widget
//! First rows of the loaded table with a source / shape header.

use crate::data::{Table, TablePreview};
use egui::{Color32, RichText, ScrollArea};

#[derive(Default)]
pub struct DataPreview {
    header: Option<String>,
    preview: TablePreview,
}

impl DataPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, source: &str, table: &Table, rows: usize) {
        self.header = Some(format!(
            "{source}: {} rows × {} columns",
            table.height(),
            table.width()
        ));
        self.preview = table.preview(rows);
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("📋 Data Preview").size(14.0).strong());
        ui.add_space(5.0);

        let Some(header) = &self.header else {
            ui.label(RichText::new("No data loaded").color(Color32::GRAY));
            return;
        };
        ui.label(RichText::new(header).size(11.0).color(Color32::GRAY));
        ui.add_space(5.0);

        ScrollArea::both().show(ui, |ui| {
            egui::Grid::new("data_preview")
                .striped(true)
                .min_col_width(40.0)
                .show(ui, |ui| {
                    for name in &self.preview.columns {
                        ui.label(RichText::new(name).strong());
                    }
                    ui.end_row();

                    for row in &self.preview.rows {
                        for cell in row {
                            ui.label(cell);
                        }
                        ui.end_row();
                    }
                });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_reports_shape() {
        let table = Table::from_csv_bytes(b"a,b\n1,x\n2,y\n3,z\n", None).expect("csv");
        let mut preview = DataPreview::new();
        preview.set("data.csv", &table, 2);

        assert_eq!(
            preview.header.as_deref(),
            Some("data.csv: 3 rows × 2 columns")
        );
        assert_eq!(preview.preview.rows.len(), 2);
        assert_eq!(preview.preview.columns, vec!["a", "b"]);
    }
}
