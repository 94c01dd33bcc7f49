//! Data module - CSV loading, the in-memory table and plot requests

mod loader;
mod selection;
mod table;

pub use loader::{DataLoader, LoaderError};
pub use selection::{Axis, PlotPlan, PlotRequest, SelectionError, NONE_LABEL};
pub use table::{ColumnKind, ColumnRef, Table, TablePreview};
