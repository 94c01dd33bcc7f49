//! Control Panel Widget
//! Data source, column selectors, chart kind, style theme and the generate button.

use crate::charts::{ChartKind, StyleTheme};
use crate::data::{ColumnKind, ColumnRef, PlotRequest, Table, NONE_LABEL};
use egui::{Color32, ComboBox, RichText};

pub const APP_TITLE: &str = "📈 Data Visualizer";
pub const CREDIT: &str = "Visualization tool by Seaklong HENG";

const LABEL_WIDTH: f32 = 90.0;
const COMBO_WIDTH: f32 = 180.0;

/// Last action reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Ready,
    Info(String),
    Success(String),
    Error(String),
}

impl Status {
    fn text(&self) -> &str {
        match self {
            Status::Ready => "Ready",
            Status::Info(s) | Status::Success(s) | Status::Error(s) => s,
        }
    }

    fn color(&self) -> Color32 {
        match self {
            Status::Error(_) => Color32::from_rgb(220, 53, 69),
            Status::Success(_) => Color32::from_rgb(40, 167, 69),
            Status::Ready | Status::Info(_) => Color32::GRAY,
        }
    }
}

/// Widget state; turned into a `PlotRequest` when the user submits.
pub struct ControlPanel {
    source: Option<String>,
    columns: Vec<ColumnRef>,
    x: Option<ColumnRef>,
    y: Option<ColumnRef>,
    kind: ChartKind,
    theme: StyleTheme,
    status: Status,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            source: None,
            columns: Vec::new(),
            x: None,
            y: None,
            kind: ChartKind::default(),
            theme: StyleTheme::default(),
            status: Status::Ready,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer the columns of a newly loaded table. Both axes go back to None.
    pub fn update_columns(&mut self, source: &str, table: &Table) {
        self.source = Some(source.to_string());
        self.columns = table
            .column_names()
            .iter()
            .filter_map(|name| table.column_ref(name).ok())
            .collect();
        self.x = None;
        self.y = None;
    }

    /// Snapshot of the current choices.
    pub fn request(&self) -> PlotRequest {
        PlotRequest::new(self.x.clone(), self.y.clone(), self.kind, self.theme)
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Validation result of the pending request against the loaded table.
    fn pending_check(&self, table: Option<&Table>) -> Status {
        let Some(table) = table else {
            return Status::Info("Load a CSV file to start".to_string());
        };
        match self.request().validate(table) {
            Ok(_) => Status::Success("✓ Ready to plot".to_string()),
            Err(e) => Status::Error(format!("⚠ {e}")),
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, table: Option<&Table>) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new(APP_TITLE)
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new(CREDIT).size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();

        // ===== Data Source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let (text, color) = match &self.source {
                        Some(name) => (name.as_str(), ui.visuals().strong_text_color()),
                        None => ("Upload a CSV file (or drop one here)", Color32::GRAY),
                    };
                    ui.label(RichText::new(text).size(12.0).color(color));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Selections =====
        ui.label(RichText::new("🔧 Plot Settings").size(14.0).strong());
        ui.add_space(8.0);

        column_combo(ui, "x_column", "X-feature:", &mut self.x, &self.columns);
        ui.add_space(5.0);
        column_combo(ui, "y_column", "Y-feature:", &mut self.y, &self.columns);
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Chart:"));
            ComboBox::from_id_salt("chart_kind")
                .width(COMBO_WIDTH)
                .selected_text(self.kind.label())
                .show_ui(ui, |ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut self.kind, kind, kind.label());
                    }
                });
        });
        ui.horizontal(|ui| {
            ui.add_space(LABEL_WIDTH + ui.spacing().item_spacing.x);
            ui.label(RichText::new(self.kind.input_hint()).size(11.0).color(Color32::GRAY));
        });
        let check = self.pending_check(table);
        ui.horizontal(|ui| {
            ui.add_space(LABEL_WIDTH + ui.spacing().item_spacing.x);
            ui.label(RichText::new(check.text()).size(11.0).color(check.color()));
        });
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Style:"));
            ComboBox::from_id_salt("style_theme")
                .width(COMBO_WIDTH)
                .selected_text(self.theme.name())
                .show_ui(ui, |ui| {
                    for theme in StyleTheme::ALL {
                        ui.selectable_value(&mut self.theme, theme, theme.name());
                    }
                });
        });

        ui.add_space(12.0);

        ui.horizontal(|ui| {
            let button = egui::Button::new(RichText::new("▶ Generate Plot").size(16.0))
                .min_size(egui::vec2(200.0, 35.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::GeneratePlot;
            }
            ui.add_space(10.0);
            ui.label(
                RichText::new(self.status.text())
                    .size(11.0)
                    .color(self.status.color()),
            );
        });

        action
    }
}

/// Column selector with a leading "None" entry.
fn column_combo(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    choice: &mut Option<ColumnRef>,
    columns: &[ColumnRef],
) {
    ui.horizontal(|ui| {
        ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new(label));
        let selected = choice.as_ref().map(ColumnRef::name).unwrap_or(NONE_LABEL).to_string();
        ComboBox::from_id_salt(id)
            .width(COMBO_WIDTH)
            .selected_text(selected)
            .show_ui(ui, |ui| {
                if ui.selectable_label(choice.is_none(), NONE_LABEL).clicked() {
                    *choice = None;
                }
                for column in columns {
                    let text = match column.kind() {
                        ColumnKind::Numeric => RichText::new(column.name()),
                        ColumnKind::Text => RichText::new(column.name()).italics(),
                    };
                    if ui
                        .selectable_label(choice.as_ref() == Some(column), text)
                        .clicked()
                    {
                        *choice = Some(column.clone());
                    }
                }
            });
    });
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    GeneratePlot,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Table {
        Table::from_csv_bytes(csv.as_bytes(), None).expect("csv")
    }

    #[test]
    fn new_panel_requests_nothing() {
        let request = ControlPanel::new().request();
        assert_eq!(request.x, None);
        assert_eq!(request.y, None);
        assert_eq!(request.kind, ChartKind::Line);
        assert_eq!(request.theme, StyleTheme::Dark);
    }

    #[test]
    fn loading_a_table_resets_axes() {
        let first = table("a,b\n1,2\n");
        let mut panel = ControlPanel::new();
        panel.update_columns("first.csv", &first);
        panel.x = first.column_ref("a").ok();
        panel.y = first.column_ref("b").ok();

        let second = table("c,d\n3,4\n");
        panel.update_columns("second.csv", &second);
        let request = panel.request();
        assert_eq!(request.x, None);
        assert_eq!(request.y, None);
        assert_eq!(panel.columns.len(), 2);
        assert_eq!(panel.source.as_deref(), Some("second.csv"));
    }

    #[test]
    fn request_carries_choices() {
        let t = table("a,b\n1,2\n");
        let mut panel = ControlPanel::new();
        panel.update_columns("data.csv", &t);
        panel.x = t.column_ref("a").ok();
        panel.kind = ChartKind::Scatter;
        panel.theme = StyleTheme::Ticks;

        let request = panel.request();
        assert_eq!(request.x.as_ref().map(ColumnRef::name), Some("a"));
        assert_eq!(request.kind, ChartKind::Scatter);
        assert_eq!(request.theme, StyleTheme::Ticks);
    }

    #[test]
    fn pending_request_is_checked_against_table() {
        let t = table("a,b,name\n1,2,x\n3,4,y\n");
        let mut panel = ControlPanel::new();
        assert!(matches!(panel.pending_check(None), Status::Info(_)));

        panel.update_columns("data.csv", &t);
        let Status::Error(message) = panel.pending_check(Some(&t)) else {
            panic!("line plot without columns must not validate");
        };
        assert!(message.contains("None is selected"), "{message}");

        panel.x = t.column_ref("a").ok();
        panel.y = t.column_ref("name").ok();
        let Status::Error(message) = panel.pending_check(Some(&t)) else {
            panic!("text y must not validate");
        };
        assert!(message.contains("not numeric"), "{message}");

        panel.y = t.column_ref("b").ok();
        assert!(matches!(panel.pending_check(Some(&t)), Status::Success(_)));

        panel.kind = ChartKind::Heatmap;
        panel.x = None;
        panel.y = None;
        assert!(matches!(panel.pending_check(Some(&t)), Status::Success(_)));
    }

    #[test]
    fn heading_and_credit() {
        assert_eq!(APP_TITLE, "📈 Data Visualizer");
        assert_eq!(CREDIT, "Visualization tool by Seaklong HENG");
    }

    #[test]
    fn status_colors() {
        assert_eq!(Status::Ready.text(), "Ready");
        assert_eq!(
            Status::Error("x".into()).color(),
            Color32::from_rgb(220, 53, 69)
        );
    }
}
