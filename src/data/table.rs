//! In-memory Table
//! A loaded CSV held as a polars DataFrame plus a typed view of its schema.

use crate::data::loader::LoaderError;
use crate::data::selection::SelectionError;
use polars::io::csv::read::NullValues;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Cell values read as missing, besides the empty field.
const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Coarse column type used to check chart compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    fn of(dtype: &DataType) -> Self {
        if matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        ) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        }
    }
}

/// A column of the current Table, obtained through [`Table::column_ref`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    name: String,
    index: usize,
    kind: ColumnKind,
}

impl ColumnRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }
}

/// First rows of a Table rendered as display strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Immutable table of named columns with positional rows.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    columns: Vec<ColumnRef>,
}

impl Table {
    /// Wrap an existing DataFrame.
    pub fn new(df: DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .enumerate()
            .map(|(index, col)| ColumnRef {
                name: col.name().to_string(),
                index,
                kind: ColumnKind::of(col.dtype()),
            })
            .collect();
        Self { df, columns }
    }

    /// Parse comma-separated values with a header row.
    pub fn from_csv_bytes(
        bytes: &[u8],
        infer_schema_length: Option<usize>,
    ) -> Result<Self, LoaderError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(LoaderError::NoData);
        }

        let missing = NullValues::AllColumns(
            MISSING_TOKENS.iter().map(|t| PlSmallStr::from(*t)).collect(),
        );
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(infer_schema_length)
            .map_parse_options(|opts| opts.with_null_values(Some(missing.clone())))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;

        Ok(Self::new(df))
    }

    /// Read a CSV file from disk.
    pub fn from_csv_path(
        path: &Path,
        infer_schema_length: Option<usize>,
    ) -> Result<Self, LoaderError> {
        let bytes = std::fs::read(path)?;
        Self::from_csv_bytes(&bytes, infer_schema_length)
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Numeric columns in table order.
    pub fn numeric_columns(&self) -> Vec<ColumnRef> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .cloned()
            .collect()
    }

    /// Resolve a column name against the schema.
    pub fn column_ref(&self, name: &str) -> Result<ColumnRef, SelectionError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownColumn(name.to_string()))
    }

    /// Check that a ColumnRef still describes this table.
    pub fn check(&self, column: &ColumnRef) -> Result<(), SelectionError> {
        match self.columns.get(column.index) {
            Some(current) if current == column => Ok(()),
            _ => Err(SelectionError::StaleColumn(column.name.clone())),
        }
    }

    /// Column values as f64; nulls and NaN become `None`.
    pub fn numeric_values(&self, column: &ColumnRef) -> Result<Vec<Option<f64>>, PolarsError> {
        let casted = self.df.column(&column.name)?.cast(&DataType::Float64)?;
        let values = casted
            .f64()?
            .into_iter()
            .map(|v| v.filter(|v| !v.is_nan()))
            .collect();
        Ok(values)
    }

    /// Column values rendered as strings; nulls become `None`.
    pub fn text_values(&self, column: &ColumnRef) -> Result<Vec<Option<String>>, PolarsError> {
        let casted = self.df.column(&column.name)?.cast(&DataType::String)?;
        let values = casted
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// First `n` rows as display strings. Nulls are shown as empty cells.
    pub fn preview(&self, n: usize) -> TablePreview {
        let head = self.df.head(Some(n));
        let columns = self.column_names();
        let mut rows = vec![vec![String::new(); columns.len()]; head.height()];

        for (col_idx, col) in head.get_columns().iter().enumerate() {
            let Ok(casted) = col.cast(&DataType::String) else {
                continue;
            };
            let Ok(values) = casted.str() else {
                continue;
            };
            for (row_idx, value) in values.into_iter().enumerate() {
                if let Some(v) = value {
                    rows[row_idx][col_idx] = v.to_string();
                }
            }
        }

        TablePreview { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(csv: &str) -> Table {
        Table::from_csv_bytes(csv.as_bytes(), Some(100)).expect("valid csv")
    }

    #[test]
    fn header_and_rows_match_input() {
        let t = table("a,b,name\n1,2.5,x\n3,4.5,y\n5,6.5,z\n");
        assert_eq!(t.column_names(), vec!["a", "b", "name"]);
        assert_eq!(t.height(), 3);
        assert_eq!(t.width(), 3);
    }

    #[test]
    fn column_kinds_follow_dtypes() {
        let t = table("a,b,name\n1,2.5,x\n3,4.5,y\n");
        let numeric: Vec<String> = t
            .numeric_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(numeric, vec!["a", "b"]);
        assert_eq!(t.column_ref("name").expect("column").kind(), ColumnKind::Text);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let t = table("a,b\n1,2\n");
        let err = t.column_ref("c").expect_err("no such column");
        assert!(matches!(err, SelectionError::UnknownColumn(name) if name == "c"));
    }

    #[test]
    fn column_ref_from_other_table_is_stale() {
        let old = table("a,b\n1,2\n");
        let new = table("b,a\nx,2\n");
        let a = old.column_ref("a").expect("column");
        assert!(old.check(&a).is_ok());
        assert!(matches!(new.check(&a), Err(SelectionError::StaleColumn(_))));
    }

    #[test]
    fn missing_values_become_none() {
        let t = table("a,b\n1,x\n,y\n3,\n");
        let a = t.column_ref("a").expect("column");
        let b = t.column_ref("b").expect("column");
        assert_eq!(
            t.numeric_values(&a).expect("values"),
            vec![Some(1.0), None, Some(3.0)]
        );
        assert_eq!(
            t.text_values(&b).expect("values"),
            vec![Some("x".to_string()), Some("y".to_string()), None]
        );
    }

    #[test]
    fn missing_tokens_keep_columns_numeric() {
        let t = table("a,b,name\n1,2.5,x\nNA,N/A,y\n4,nan,NULL\n");
        let a = t.column_ref("a").expect("column");
        let b = t.column_ref("b").expect("column");
        let name = t.column_ref("name").expect("column");

        assert!(a.is_numeric());
        assert!(b.is_numeric());
        assert_eq!(
            t.numeric_values(&a).expect("values"),
            vec![Some(1.0), None, Some(4.0)]
        );
        assert_eq!(
            t.numeric_values(&b).expect("values"),
            vec![Some(2.5), None, None]
        );
        assert_eq!(
            t.text_values(&name).expect("values"),
            vec![Some("x".to_string()), Some("y".to_string()), None]
        );
    }

    #[test]
    fn preview_keeps_first_rows_only() {
        let t = table("a,b\n1,x\n2,y\n3,z\n4,w\n5,v\n6,u\n7,t\n");
        let preview = t.preview(5);
        assert_eq!(preview.columns, vec!["a", "b"]);
        assert_eq!(preview.rows.len(), 5);
        assert_eq!(preview.rows[0], vec!["1", "x"]);
        assert_eq!(preview.rows[4], vec!["5", "v"]);
    }

    #[test]
    fn empty_input_is_no_data() {
        let err = Table::from_csv_bytes(b"", None).expect_err("empty");
        assert!(matches!(err, LoaderError::NoData));
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let err = Table::from_csv_bytes(b"a,b\n1,2\n3,4,5,6\n", None).expect_err("ragged");
        assert!(matches!(err, LoaderError::Csv(_)));
    }

    #[test]
    fn reads_from_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "x,y\n1,2\n3,4\n").expect("write");
        let t = Table::from_csv_path(&path, None).expect("load");
        assert_eq!(t.height(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = Table::from_csv_path(&dir.path().join("nope.csv"), None).expect_err("missing");
        assert!(matches!(err, LoaderError::Io(_)));
    }

    proptest! {
        #[test]
        fn loaded_shape_matches_csv(
            width in 1usize..6,
            rows in proptest::collection::vec(proptest::collection::vec(-1000i64..1000, 6), 1..30),
        ) {
            let header: Vec<String> = (0..width).map(|i| format!("col_{i}")).collect();
            let mut csv = header.join(",");
            csv.push('\n');
            for row in &rows {
                let cells: Vec<String> = row[..width].iter().map(|v| v.to_string()).collect();
                csv.push_str(&cells.join(","));
                csv.push('\n');
            }

            let t = Table::from_csv_bytes(csv.as_bytes(), Some(100)).expect("valid csv");
            prop_assert_eq!(t.column_names(), header);
            prop_assert_eq!(t.height(), rows.len());
        }
    }
}
