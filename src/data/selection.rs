//! Plot Request
//! The user's choices as one explicit value, validated against the Table.

use crate::charts::{ChartKind, StyleTheme};
use crate::data::{ColumnRef, Table};
use std::fmt;
use thiserror::Error;

/// Label of the "no column" choice in the selectors.
pub const NONE_LABEL: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("X"),
            Axis::Y => f.write_str("Y"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("{kind} needs a {axis}-feature, but None is selected")]
    MissingColumn { kind: ChartKind, axis: Axis },
    #[error("{kind} needs numeric data, but column '{column}' is not numeric")]
    NotNumeric { column: String, kind: ChartKind },
    #[error("Column '{0}' does not exist in the loaded data")]
    UnknownColumn(String),
    #[error("Column '{0}' belongs to a previously loaded file")]
    StaleColumn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnNeed {
    Any,
    Numeric,
}

/// Everything needed to build one figure.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub x: Option<ColumnRef>,
    pub y: Option<ColumnRef>,
    pub kind: ChartKind,
    pub theme: StyleTheme,
}

/// A request whose columns were checked for the chosen chart kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotPlan {
    Line { x: ColumnRef, y: ColumnRef },
    Bar { x: ColumnRef, y: ColumnRef },
    Scatter { x: ColumnRef, y: ColumnRef },
    Distribution { x: ColumnRef },
    Count { x: ColumnRef },
    Pair { x: ColumnRef, y: ColumnRef },
    Heatmap,
}

impl PlotRequest {
    pub fn new(
        x: Option<ColumnRef>,
        y: Option<ColumnRef>,
        kind: ChartKind,
        theme: StyleTheme,
    ) -> Self {
        Self { x, y, kind, theme }
    }

    /// Check the selected columns against the chart kind's inputs.
    pub fn validate(&self, table: &Table) -> Result<PlotPlan, SelectionError> {
        let x = |need| self.resolve(table, Axis::X, need);
        let y = |need| self.resolve(table, Axis::Y, need);

        let plan = match self.kind {
            ChartKind::Line => PlotPlan::Line {
                x: x(ColumnNeed::Any)?,
                y: y(ColumnNeed::Numeric)?,
            },
            ChartKind::Bar => PlotPlan::Bar {
                x: x(ColumnNeed::Any)?,
                y: y(ColumnNeed::Numeric)?,
            },
            ChartKind::Scatter => PlotPlan::Scatter {
                x: x(ColumnNeed::Any)?,
                y: y(ColumnNeed::Numeric)?,
            },
            ChartKind::Distribution => PlotPlan::Distribution {
                x: x(ColumnNeed::Any)?,
            },
            ChartKind::Count => PlotPlan::Count {
                x: x(ColumnNeed::Any)?,
            },
            ChartKind::Pair => PlotPlan::Pair {
                x: x(ColumnNeed::Numeric)?,
                y: y(ColumnNeed::Numeric)?,
            },
            ChartKind::Heatmap => PlotPlan::Heatmap,
        };
        Ok(plan)
    }

    fn resolve(
        &self,
        table: &Table,
        axis: Axis,
        need: ColumnNeed,
    ) -> Result<ColumnRef, SelectionError> {
        let choice = match axis {
            Axis::X => self.x.as_ref(),
            Axis::Y => self.y.as_ref(),
        };
        let column = choice.ok_or(SelectionError::MissingColumn {
            kind: self.kind,
            axis,
        })?;
        table.check(column)?;

        if need == ColumnNeed::Numeric && !column.is_numeric() {
            return Err(SelectionError::NotNumeric {
                column: column.name().to_string(),
                kind: self.kind,
            });
        }
        Ok(column.clone())
    }

    /// Display name of an axis choice, `None` for the sentinel.
    pub fn axis_label(&self, axis: Axis) -> &str {
        let choice = match axis {
            Axis::X => self.x.as_ref(),
            Axis::Y => self.y.as_ref(),
        };
        choice.map(ColumnRef::name).unwrap_or(NONE_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_csv_bytes(b"a,b,name\n1,2,x\n3,4,y\n", None).expect("valid csv")
    }

    fn request(table: &Table, x: Option<&str>, y: Option<&str>, kind: ChartKind) -> PlotRequest {
        let col = |name: Option<&str>| name.map(|n| table.column_ref(n).expect("column"));
        PlotRequest::new(col(x), col(y), kind, StyleTheme::default())
    }

    #[test]
    fn xy_kinds_accept_numeric_columns() {
        let t = table();
        for kind in [ChartKind::Line, ChartKind::Scatter, ChartKind::Pair, ChartKind::Bar] {
            let plan = request(&t, Some("a"), Some("b"), kind).validate(&t);
            assert!(plan.is_ok(), "{kind} rejected numeric columns");
        }
    }

    #[test]
    fn none_for_required_axis_is_rejected() {
        let t = table();
        let err = request(&t, Some("a"), None, ChartKind::Scatter)
            .validate(&t)
            .expect_err("y missing");
        assert_eq!(
            err,
            SelectionError::MissingColumn {
                kind: ChartKind::Scatter,
                axis: Axis::Y
            }
        );
    }

    #[test]
    fn x_only_kinds_ignore_y() {
        let t = table();
        let plan = request(&t, Some("name"), None, ChartKind::Count)
            .validate(&t)
            .expect("count plot needs only x");
        assert!(matches!(plan, PlotPlan::Count { x } if x.name() == "name"));
    }

    #[test]
    fn text_column_rejected_for_numeric_inputs() {
        let t = table();
        let err = request(&t, Some("a"), Some("name"), ChartKind::Line)
            .validate(&t)
            .expect_err("text y");
        assert!(matches!(err, SelectionError::NotNumeric { column, .. } if column == "name"));

        let err = request(&t, Some("name"), Some("a"), ChartKind::Pair)
            .validate(&t)
            .expect_err("pair plot needs numeric x");
        assert!(matches!(err, SelectionError::NotNumeric { .. }));
    }

    #[test]
    fn text_x_is_accepted_as_categories() {
        let t = table();
        for (kind, y) in [
            (ChartKind::Line, Some("a")),
            (ChartKind::Scatter, Some("a")),
            (ChartKind::Distribution, None),
        ] {
            assert!(
                request(&t, Some("name"), y, kind).validate(&t).is_ok(),
                "{kind} rejected a text x column"
            );
        }
    }

    #[test]
    fn bar_chart_takes_text_categories() {
        let t = table();
        assert!(request(&t, Some("name"), Some("a"), ChartKind::Bar)
            .validate(&t)
            .is_ok());
        assert!(request(&t, Some("a"), Some("name"), ChartKind::Bar)
            .validate(&t)
            .is_err());
    }

    #[test]
    fn heatmap_ignores_axes() {
        let t = table();
        let plan = request(&t, None, None, ChartKind::Heatmap)
            .validate(&t)
            .expect("heatmap");
        assert_eq!(plan, PlotPlan::Heatmap);
    }

    #[test]
    fn axis_label_uses_sentinel() {
        let t = table();
        let req = request(&t, Some("a"), None, ChartKind::Count);
        assert_eq!(req.axis_label(Axis::X), "a");
        assert_eq!(req.axis_label(Axis::Y), "None");
    }
}
