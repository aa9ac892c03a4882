//! CSV loading
//!
//! Reads a headered CSV into a [`Table`], detecting each column's kind with
//! [`detect_kind`](super::detect_kind). The whole file is read; datasets
//! here are one row per sample, not streams.

use super::{Column, Table};
use crate::error::{BuildError, Result};
use ::csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Load a table from a CSV file on disk
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| BuildError::io(path, e))?;
    let table = read(file)?;
    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.columns().len(),
        "loaded dataset"
    );
    Ok(table)
}

/// Load a table from any CSV reader
pub fn read<R: Read>(reader: R) -> Result<Table> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in csv_reader.records() {
        let record = record?;
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(idx).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .iter()
        .zip(cells.iter())
        .map(|(name, raw)| Column::from_raw(name, raw))
        .collect();

    Table::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnKind, Value};

    #[test]
    fn test_read_detects_kinds() {
        let data = "x1,x2,animal,path_to_images\n1,1.5,cat,a.png\n2,4,dog,b.png\n";
        let table = read(data.as_bytes()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.kind("x1"), Some(ColumnKind::Integer));
        assert_eq!(table.kind("x2"), Some(ColumnKind::Float));
        assert_eq!(table.kind("animal"), Some(ColumnKind::Text));
        assert_eq!(table.kind("path_to_images"), Some(ColumnKind::Text));
        assert_eq!(table.value(1, "x2"), Some(&Value::Float(4.0)));
    }

    #[test]
    fn test_read_trims_headers() {
        let data = " x1 , x2\n1,2\n";
        let table = read(data.as_bytes()).unwrap();
        assert!(table.has_column("x1"));
        assert!(table.has_column("x2"));
    }

    #[test]
    fn test_headers_only_is_empty_dataset() {
        let data = "x1,x2\n";
        assert!(matches!(read(data.as_bytes()), Err(BuildError::EmptyDataset)));
    }

    #[test]
    fn test_read_path_missing_file_is_io_error() {
        let err = read_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }

    #[test]
    fn test_ragged_rows_are_csv_errors() {
        let data = "a,b\n1,2\n3\n";
        assert!(matches!(read(data.as_bytes()), Err(BuildError::Csv(_))));
    }
}
