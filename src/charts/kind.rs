//! Chart kinds and style themes offered by the selection panel.

use std::fmt;

/// The seven supported visualizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Scatter,
    Distribution,
    Count,
    Pair,
    Heatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Scatter,
        ChartKind::Distribution,
        ChartKind::Count,
        ChartKind::Pair,
        ChartKind::Heatmap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line Plot",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Distribution => "Distribution Plot",
            ChartKind::Count => "Count Plot",
            ChartKind::Pair => "Pair Plot",
            ChartKind::Heatmap => "Heatmap Correlation",
        }
    }

    /// X tick labels drawn at 45 degrees.
    pub fn rotates_x_ticks(self) -> bool {
        matches!(
            self,
            ChartKind::Bar | ChartKind::Distribution | ChartKind::Count
        )
    }

    /// Short description of the inputs this kind reads.
    pub fn input_hint(self) -> &'static str {
        match self {
            ChartKind::Line | ChartKind::Scatter | ChartKind::Bar => {
                "uses X (any) and Y (numeric)"
            }
            ChartKind::Pair => "uses X and Y (numeric)",
            ChartKind::Distribution => "uses X only",
            ChartKind::Count => "uses X only",
            ChartKind::Heatmap => "uses every numeric column",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named visual presets applied to the whole figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleTheme {
    #[default]
    Dark,
    White,
    DarkGrid,
    WhiteGrid,
    Ticks,
}

impl StyleTheme {
    pub const ALL: [StyleTheme; 5] = [
        StyleTheme::Dark,
        StyleTheme::White,
        StyleTheme::DarkGrid,
        StyleTheme::WhiteGrid,
        StyleTheme::Ticks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StyleTheme::Dark => "dark",
            StyleTheme::White => "white",
            StyleTheme::DarkGrid => "darkgrid",
            StyleTheme::WhiteGrid => "whitegrid",
            StyleTheme::Ticks => "ticks",
        }
    }
}

impl fmt::Display for StyleTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menus_have_fixed_sizes() {
        assert_eq!(ChartKind::ALL.len(), 7);
        assert_eq!(StyleTheme::ALL.len(), 5);
    }

    #[test]
    fn categorical_kinds_rotate_ticks() {
        let rotated: Vec<ChartKind> = ChartKind::ALL
            .into_iter()
            .filter(|k| k.rotates_x_ticks())
            .collect();
        assert_eq!(
            rotated,
            vec![ChartKind::Bar, ChartKind::Distribution, ChartKind::Count]
        );
    }

    #[test]
    fn labels_match_menu_text() {
        assert_eq!(ChartKind::Heatmap.to_string(), "Heatmap Correlation");
        assert_eq!(StyleTheme::WhiteGrid.to_string(), "whitegrid");
    }
}
