//! CSV Data Loader Module
//! Holds the single loaded Table; each load replaces the previous one.

use crate::data::Table;
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("No data loaded")]
    NoData,
}

/// Owns the currently loaded Table and where it came from.
pub struct DataLoader {
    table: Option<Table>,
    source: Option<String>,
    infer_schema_length: Option<usize>,
}

impl DataLoader {
    pub fn new(infer_schema_length: Option<usize>) -> Self {
        Self {
            table: None,
            source: None,
            infer_schema_length,
        }
    }

    /// Load an uploaded byte stream. On failure the previous Table is kept.
    pub fn load_csv_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<&Table, LoaderError> {
        let table = Table::from_csv_bytes(bytes, self.infer_schema_length)?;
        Ok(self.replace(name, table))
    }

    /// Load a CSV file from disk.
    pub fn load_csv_path(&mut self, path: &Path) -> Result<&Table, LoaderError> {
        let table = Table::from_csv_path(path, self.infer_schema_length)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.replace(&name, table))
    }

    fn replace(&mut self, name: &str, table: Table) -> &Table {
        tracing::info!(
            source = name,
            rows = table.height(),
            columns = table.width(),
            "loaded csv"
        );
        self.source = Some(name.to_string());
        self.table.insert(table)
    }

    /// Get a reference to the loaded Table.
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// Name of the loaded file.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_load_replaces_table() {
        let mut loader = DataLoader::new(Some(10000));
        loader.load_csv_bytes("first.csv", b"a,b\n1,2\n").expect("first");
        loader.load_csv_bytes("second.csv", b"c\n1\n2\n3\n").expect("second");

        let table = loader.table().expect("loaded");
        assert_eq!(table.column_names(), vec!["c"]);
        assert_eq!(table.height(), 3);
        assert_eq!(loader.source(), Some("second.csv"));
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let mut loader = DataLoader::new(Some(10000));
        loader.load_csv_bytes("good.csv", b"a,b\n1,2\n").expect("good");
        assert!(loader.load_csv_bytes("bad.csv", b"").is_err());

        assert_eq!(loader.source(), Some("good.csv"));
        assert_eq!(loader.table().map(Table::height), Some(1));
    }

    #[test]
    fn load_from_path_uses_file_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "month,total\njan,3\nfeb,4\n").expect("write");

        let mut loader = DataLoader::new(Some(10000));
        loader.load_csv_path(&path).expect("load");
        assert_eq!(loader.source(), Some("sales.csv"));
    }
}
