//! Tabular data model
//!
//! A [`Table`] is an ordered set of named, typed columns of equal length.
//! Row order is fixed at load time and defines the row index every widget
//! uses to address a sample. Tables are immutable snapshots: each pipeline
//! stage (identity column, path rewriting) returns a new table instead of
//! mutating the old one.
//!
//! # Numeric detection
//!
//! One rule, applied everywhere a column is built from raw text:
//!
//! - empty cells are nulls and don't vote
//! - at least one non-empty cell is required, otherwise the column is text
//! - every non-empty cell parses as `i64` → [`ColumnKind::Integer`]
//! - every non-empty cell parses as a finite `f64` → [`ColumnKind::Float`]
//! - anything else → [`ColumnKind::Text`]
//!
//! [`ColumnKind::Path`] is never detected; the pipeline assigns it to columns
//! bound by media widgets.

pub mod csv;

use crate::error::{BuildError, Result, Warning};
use serde::Serialize;

/// Name of the identity column inserted at position 0
pub const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    Path,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

/// A single cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text panel rendering. Floats get `precision` decimals when given,
    /// everything else uses its default string form. Nulls are empty.
    pub fn display(&self, precision: Option<usize>) -> String {
        match (self, precision) {
            (Value::Null, _) => String::new(),
            (Value::Int(v), _) => v.to_string(),
            (Value::Float(v), Some(p)) => to_fixed(*v, p),
            (Value::Float(v), None) => v.to_string(),
            (Value::Text(s), _) => s.clone(),
        }
    }
}

/// Digits after the point needed to print any finite `f64` exactly
const EXACT_DIGITS: usize = 1100;

/// Fixed-point text matching the page runtime's `Number.prototype.toFixed`:
/// exact ties round away from zero (`0.125` → `"0.13"`, `2.5` → `"3"`),
/// where `format!` would round them to even.
pub fn to_fixed(v: f64, precision: usize) -> String {
    if v == 0.0 {
        // no "-0.00"
        return format!("{:.*}", precision, 0.0);
    }
    let rounded = format!("{:.*}", precision, v);
    if !v.is_finite() || precision + 1 >= EXACT_DIGITS {
        return rounded;
    }

    let exact = format!("{:.*}", EXACT_DIGITS, v.abs());
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let tie = frac.as_bytes().get(precision) == Some(&b'5')
        && frac
            .get(precision + 1..)
            .map_or(false, |rest| rest.bytes().all(|b| b == b'0'));
    if !tie {
        return rounded;
    }

    let mut digits: Vec<u8> = format!("{}{}", int_part, &frac[..precision]).into_bytes();
    let mut carry = true;
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            carry = false;
            break;
        }
    }
    if carry {
        digits.insert(0, b'1');
    }

    let split = digits.len() - precision;
    let mut out = String::with_capacity(digits.len() + 2);
    if v < 0.0 {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|&b| char::from(b)));
    if precision > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|&b| char::from(b)));
    }
    out
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
}

impl Column {
    pub fn integers<I: IntoIterator<Item = i64>>(name: &str, values: I) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Integer,
            values: values.into_iter().map(Value::Int).collect(),
        }
    }

    pub fn floats<I: IntoIterator<Item = f64>>(name: &str, values: I) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Float,
            values: values.into_iter().map(Value::Float).collect(),
        }
    }

    pub fn text<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Text,
            values: values.into_iter().map(|s| Value::Text(s.into())).collect(),
        }
    }

    /// Build a column from raw cells, applying the numeric detection rule
    pub fn from_raw(name: &str, cells: &[String]) -> Self {
        let kind = detect_kind(cells);
        let values = cells
            .iter()
            .map(|cell| parse_cell(cell, kind))
            .collect();
        Self {
            name: name.to_string(),
            kind,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    /// Re-kind as a media path column. Values become text.
    pub fn into_path(self) -> Self {
        let values = self
            .values
            .into_iter()
            .map(|v| match v {
                Value::Null => Value::Null,
                Value::Text(s) => Value::Text(s),
                other => Value::Text(other.display(None)),
            })
            .collect();
        Self {
            name: self.name,
            kind: ColumnKind::Path,
            values,
        }
    }
}

/// Detect the kind of a column from its raw cells
pub fn detect_kind(cells: &[String]) -> ColumnKind {
    let mut seen = false;
    let mut all_int = true;
    let mut all_float = true;

    for cell in cells {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        seen = true;
        if all_int && cell.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_float && !cell.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
            all_float = false;
        }
        if !all_int && !all_float {
            break;
        }
    }

    match (seen, all_int, all_float) {
        (false, _, _) => ColumnKind::Text,
        (true, true, _) => ColumnKind::Integer,
        (true, false, true) => ColumnKind::Float,
        _ => ColumnKind::Text,
    }
}

fn parse_cell(cell: &str, kind: ColumnKind) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match kind {
        ColumnKind::Integer => trimmed.parse().map(Value::Int).unwrap_or(Value::Null),
        ColumnKind::Float => trimmed.parse().map(Value::Float).unwrap_or(Value::Null),
        ColumnKind::Text | ColumnKind::Path => Value::Text(cell.to_string()),
    }
}

/// Immutable column store
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table. All columns must have the same length and there must
    /// be at least one row.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if row_count == 0 {
            return Err(BuildError::EmptyDataset);
        }
        for column in &columns {
            if column.len() != row_count {
                return Err(BuildError::LengthMismatch {
                    column: column.name.clone(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Like [`Table::column`] but unknown names are an error
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| BuildError::UnknownColumn(name.to_string()))
    }

    /// Column must exist and be numeric
    pub fn require_numeric(&self, name: &str) -> Result<&Column> {
        let column = self.require(name)?;
        if !column.is_numeric() {
            return Err(BuildError::NotNumeric(name.to_string()));
        }
        Ok(column)
    }

    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.column(name).map(|c| c.kind)
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|c| c.values.get(row))
    }

    /// Names of numeric columns, in column order
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Insert the 0-based identity column at position 0. If a column named
    /// `id` already exists the table is returned unchanged with a warning.
    pub fn with_identity_column(self) -> (Self, Option<Warning>) {
        if self.has_column(ID_COLUMN) {
            return (self, Some(Warning::IdColumnExists));
        }
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::integers(ID_COLUMN, 0..self.row_count as i64));
        columns.extend(self.columns);
        (
            Self {
                columns,
                row_count: self.row_count,
            },
            None,
        )
    }

    /// Replace a column by name, keeping its position
    pub fn with_column(mut self, column: Column) -> Result<Self> {
        let actual = column.len();
        if actual != self.row_count {
            return Err(BuildError::LengthMismatch {
                column: column.name,
                expected: self.row_count,
                actual,
            });
        }
        match self.columns.iter().position(|c| c.name == column.name) {
            Some(pos) => self.columns[pos] = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    // ==========================================================================
    // NUMERIC DETECTION
    // ==========================================================================

    #[test]
    fn test_detect_integer_column() {
        assert_eq!(detect_kind(&raw(&["1", "2", "3"])), ColumnKind::Integer);
    }

    #[test]
    fn test_detect_float_column() {
        assert_eq!(detect_kind(&raw(&["1", "2.5", "3"])), ColumnKind::Float);
    }

    #[test]
    fn test_empty_cells_do_not_vote() {
        assert_eq!(detect_kind(&raw(&["", "2", " "])), ColumnKind::Integer);
        assert_eq!(detect_kind(&raw(&["", ""])), ColumnKind::Text);
    }

    #[test]
    fn test_mixed_column_is_text() {
        assert_eq!(detect_kind(&raw(&["1", "cat", "3"])), ColumnKind::Text);
        assert_eq!(detect_kind(&raw(&["data/a.png"])), ColumnKind::Text);
    }

    #[test]
    fn test_non_finite_is_not_numeric() {
        assert_eq!(detect_kind(&raw(&["1.0", "inf"])), ColumnKind::Text);
        assert_eq!(detect_kind(&raw(&["NaN"])), ColumnKind::Text);
    }

    #[test]
    fn test_from_raw_parses_nulls() {
        let col = Column::from_raw("x", &raw(&["1.5", ""]));
        assert_eq!(col.kind, ColumnKind::Float);
        assert_eq!(col.values, vec![Value::Float(1.5), Value::Null]);
    }

    // ==========================================================================
    // VALUE RENDERING
    // ==========================================================================

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(1).display(Some(2)), "1");
        assert_eq!(Value::Float(1.0).display(Some(2)), "1.00");
        assert_eq!(Value::Float(0.125).display(Some(1)), "0.1");
        assert_eq!(Value::Float(2.5).display(None), "2.5");
        assert_eq!(Value::from("dog").display(Some(2)), "dog");
        assert_eq!(Value::Null.display(Some(2)), "");
    }

    // ==========================================================================
    // TABLE
    // ==========================================================================

    fn sample() -> Table {
        Table::new(vec![
            Column::integers("x1", [1, 2, 3]),
            Column::integers("x2", [1, 4, 16]),
            Column::text("path_to_images", ["p0", "p1", "p2"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(Table::new(vec![]), Err(BuildError::EmptyDataset)));
        assert!(matches!(
            Table::new(vec![Column::integers("x", [])]),
            Err(BuildError::EmptyDataset)
        ));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Table::new(vec![
            Column::integers("a", [1, 2]),
            Column::integers("b", [1]),
        ])
        .unwrap_err();
        assert!(matches!(err, BuildError::LengthMismatch { ref column, .. } if column == "b"));
    }

    #[test]
    fn test_numeric_columns_in_order() {
        assert_eq!(sample().numeric_columns(), vec!["x1", "x2"]);
    }

    #[test]
    fn test_identity_column_inserted_first() {
        let (table, warning) = sample().with_identity_column();
        assert!(warning.is_none());
        assert_eq!(table.columns()[0].name, ID_COLUMN);
        assert_eq!(table.value(2, ID_COLUMN), Some(&Value::Int(2)));
        assert_eq!(table.numeric_columns(), vec!["id", "x1", "x2"]);
    }

    #[test]
    fn test_identity_column_collision_warns() {
        let table = Table::new(vec![Column::text("id", ["a", "b"])]).unwrap();
        let (table, warning) = table.with_identity_column();
        assert_eq!(warning, Some(Warning::IdColumnExists));
        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.kind("id"), Some(ColumnKind::Text));
    }

    #[test]
    fn test_require_numeric() {
        let table = sample();
        assert!(table.require_numeric("x1").is_ok());
        assert!(matches!(table.require_numeric("path_to_images"), Err(BuildError::NotNumeric(_))));
        assert!(matches!(table.require_numeric("nope"), Err(BuildError::UnknownColumn(_))));
    }

    #[test]
    fn test_float_ties_round_away_from_zero() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(0.5, 0), "1");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(9.5, 0), "10");
        assert_eq!(to_fixed(0.995, 2), "0.99", "0.995 is stored just below the tie");
        assert_eq!(to_fixed(1.005, 2), "1.00", "1.005 is stored just below the tie");
        assert_eq!(to_fixed(0.126, 2), "0.13");
        assert_eq!(to_fixed(-0.0, 2), "0.00");
        assert_eq!(to_fixed(-0.001, 2), "-0.00");
        assert_eq!(Value::Float(0.125).display(Some(2)), "0.13");
        assert_eq!(Value::Float(2.5).display(Some(0)), "3");
    }

    #[test]
    fn test_with_column_length_mismatch() {
        let table = sample();
        let short = Column::integers("x3", [1, 2]);
        assert!(matches!(
            table.with_column(short),
            Err(BuildError::LengthMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_with_column_replaces_in_place() {
        let table = sample();
        let path = table.column("path_to_images").unwrap().clone().into_path();
        let table = table.with_column(path).unwrap();
        assert_eq!(table.columns()[2].kind, ColumnKind::Path);
        assert_eq!(table.columns().len(), 3);
    }
}
