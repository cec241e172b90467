//! RollTable Table Implementation
//!
//! A Table is an ordered collection of equally long, named columns with a schema.
//! Column order is the order in which columns were defined or appended.
//!
//! # Examples
//!
//! ```
//! use rolltable::{Table, Schema, ColumnType, ColumnValue};
//! use std::collections::HashMap;
//!
//! let schema = Schema::new(vec![
//!     ("day".to_string(), ColumnType::String, false),
//!     ("temp".to_string(), ColumnType::Float64, true),
//! ]).unwrap();
//!
//! let mut table = Table::new("weather".to_string(), schema);
//!
//! let mut row = HashMap::new();
//! row.insert("day".to_string(), ColumnValue::String("mon".to_string()));
//! row.insert("temp".to_string(), ColumnValue::Float64(21.5));
//! table.append_row(row).unwrap();
//!
//! assert_eq!(table.len(), 1);
//! assert_eq!(table.get_value(0, "temp").unwrap().as_f64(), Some(21.5));
//! ```

use crate::column::{Column, ColumnType, ColumnValue};
use crate::error::{Result, TableError};
use std::collections::{HashMap, HashSet};

/// Schema definition with column names and types.
///
/// # Examples
///
/// ```
/// use rolltable::{Schema, ColumnType};
///
/// let schema = Schema::new(vec![
///     ("id".to_string(), ColumnType::Int32, false),
///     ("score".to_string(), ColumnType::Float64, true),
/// ]).unwrap();
///
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.get_column_index("score"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<(String, ColumnType, bool)>, // (name, type, nullable)
}

impl Schema {
    /// Creates a new schema. Column names must be unique.
    pub fn new(columns: Vec<(String, ColumnType, bool)>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (name, _, _) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Schema { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get_column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _, _)| name.as_str()).collect()
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _, _)| n == name)
    }

    /// Returns (name, type, nullable) for the column at `index`.
    pub fn get_column_info(&self, index: usize) -> Option<(&str, ColumnType, bool)> {
        self.columns
            .get(index)
            .map(|(name, ty, nullable)| (name.as_str(), *ty, *nullable))
    }

    pub fn get_column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, ty, _)| *ty)
    }

    fn push(&mut self, name: String, column_type: ColumnType, nullable: bool) -> Result<()> {
        if self.get_column_index(&name).is_some() {
            return Err(TableError::DuplicateColumn(name));
        }
        self.columns.push((name, column_type, nullable));
        Ok(())
    }
}

/// Table owning its columns.
#[derive(Clone)]
pub struct Table {
    name: String,
    schema: Schema,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Create an empty table with the given schema.
    pub fn new(name: String, schema: Schema) -> Self {
        let columns = schema
            .columns
            .iter()
            .map(|(col_name, col_type, nullable)| {
                Column::new(col_name.clone(), *col_type, *nullable)
            })
            .collect();

        Table {
            name,
            schema,
            columns,
            row_count: 0,
        }
    }

    /// Assemble a table from already populated columns.
    ///
    /// All columns must have the same length and distinct names.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolltable::{Column, Table};
    ///
    /// let table = Table::from_columns(
    ///     "prices",
    ///     vec![
    ///         Column::from_f64("open", &[1.0, 2.0]),
    ///         Column::from_f64("close", &[1.5, 2.5]),
    ///     ],
    /// ).unwrap();
    ///
    /// assert_eq!(table.column_names(), vec!["open", "close"]);
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn from_columns(name: &str, columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        let mut schema = Schema { columns: Vec::with_capacity(columns.len()) };

        for col in &columns {
            if col.len() != row_count {
                return Err(TableError::LengthMismatch {
                    column: col.name().to_string(),
                    expected: row_count,
                    got: col.len(),
                });
            }
            schema.push(col.name().to_string(), col.column_type(), col.is_nullable())?;
        }

        Ok(Table {
            name: name.to_string(),
            schema,
            columns,
            row_count,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.get_column_names()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.schema
            .get_column_index(name)
            .map(|idx| &self.columns[idx])
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Append a new named column after the existing ones.
    ///
    /// The column must have exactly `len()` rows, except that the first
    /// column added to a table without columns sets the row count.
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(TableError::LengthMismatch {
                column: column.name().to_string(),
                expected: self.row_count,
                got: column.len(),
            });
        }

        self.schema.push(
            column.name().to_string(),
            column.column_type(),
            column.is_nullable(),
        )?;
        if self.columns.is_empty() {
            self.row_count = column.len();
        }
        self.columns.push(column);
        Ok(())
    }

    fn column_or_err(&self, column: &str) -> Result<&Column> {
        self.column(column)
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))
    }

    pub fn get_value(&self, row: usize, column: &str) -> Result<ColumnValue> {
        self.column_or_err(column)?.get(row)
    }

    pub fn get_row(&self, row: usize) -> Result<HashMap<String, ColumnValue>> {
        if row >= self.row_count {
            return Err(TableError::RowOutOfRange {
                index: row,
                len: self.row_count,
            });
        }

        let mut result = HashMap::with_capacity(self.columns.len());
        for col in &self.columns {
            result.insert(col.name().to_string(), col.get(row)?);
        }
        Ok(result)
    }

    /// Append one row. Every column must be present; values are validated
    /// against the schema before any column is touched.
    pub fn append_row(&mut self, row: HashMap<String, ColumnValue>) -> Result<()> {
        self.append_rows(vec![row]).map(|_| ())
    }

    /// Append multiple rows at once. No rows are inserted on error.
    pub fn append_rows(&mut self, rows: Vec<HashMap<String, ColumnValue>>) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        // Validate everything against a scratch copy first
        let mut staged = self.columns.clone();
        for mut row in rows.iter().cloned() {
            for col in staged.iter_mut() {
                let value = row
                    .remove(col.name())
                    .ok_or_else(|| TableError::MissingValue(col.name().to_string()))?;
                col.append(value)?;
            }
        }

        self.columns = staged;
        self.row_count += rows.len();
        Ok(rows.len())
    }

    pub fn iter_rows(&self) -> TableRowIterator<'_> {
        TableRowIterator {
            table: self,
            index: 0,
        }
    }

    /// Minimum numeric value in a column; nulls are skipped.
    pub fn min(&self, column: &str) -> Result<Option<f64>> {
        Ok(self.column_or_err(column)?.min())
    }

    /// Maximum numeric value in a column; nulls are skipped.
    pub fn max(&self, column: &str) -> Result<Option<f64>> {
        Ok(self.column_or_err(column)?.max())
    }

    // ========================================================================
    // Serialization Methods
    // ========================================================================

    /// Export table to CSV format.
    ///
    /// NULL values become empty strings. Strings containing commas, quotes or
    /// newlines are quoted.
    pub fn to_csv(&self) -> String {
        let mut result = String::new();
        result.push_str(&self.column_names().join(","));
        result.push('\n');

        for row in 0..self.row_count {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| match col.get_ref(row) {
                    Some(ColumnValue::String(s)) => {
                        if s.contains(',') || s.contains('"') || s.contains('\n') {
                            format!("\"{}\"", s.replace('"', "\"\""))
                        } else {
                            s.clone()
                        }
                    }
                    Some(value) => value.to_string(),
                    None => String::new(),
                })
                .collect();
            result.push_str(&values.join(","));
            result.push('\n');
        }
        result
    }

    /// Export table to pretty-printed JSON (array of objects).
    ///
    /// Non-finite floats and NULL become JSON `null`.
    pub fn to_json(&self) -> Result<String> {
        let rows: Vec<serde_json::Value> = (0..self.row_count)
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .map(|col| {
                        let value = col
                            .get_ref(row)
                            .map_or(serde_json::Value::Null, column_value_to_json);
                        (col.name().to_string(), value)
                    })
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect();

        Ok(serde_json::to_string_pretty(&rows)?)
    }

    /// Create a table from a CSV string.
    ///
    /// The first line is the header, and every data row must have as many
    /// fields. Each column's type is inferred from all of its non-empty fields:
    /// - Integers that fit in i32 → INT32
    /// - Larger integers → INT64
    /// - Other numbers, or integers mixed with them → FLOAT64
    /// - "true"/"false" (case-insensitive) → BOOL
    /// - Anything else, or a mix of the above kinds → STRING
    ///
    /// All columns are nullable; empty fields become NULL. A column with no
    /// non-empty fields is FLOAT64.
    ///
    /// # Example
    ///
    /// ```
    /// use rolltable::{ColumnType, Table};
    ///
    /// let csv = "id,name,score\n1,Alice,95.5\n2,Bob,87.0";
    /// let table = Table::from_csv("students", csv).unwrap();
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.schema().get_column_type("score"), Some(ColumnType::Float64));
    /// ```
    pub fn from_csv(name: &str, csv: &str) -> Result<Table> {
        let mut all_rows = parse_csv_rows(csv);

        if all_rows.is_empty() {
            return Err(TableError::Parse("CSV is empty".to_string()));
        }

        let column_names = all_rows.remove(0);
        if column_names.iter().all(|h| h.trim().is_empty()) {
            return Err(TableError::Parse("CSV header is empty".to_string()));
        }

        let rows: Vec<Vec<String>> = all_rows
            .into_iter()
            .filter(|row| !row.iter().all(|f| f.is_empty()))
            .collect();

        for (row_idx, row_values) in rows.iter().enumerate() {
            if row_values.len() != column_names.len() {
                return Err(TableError::Parse(format!(
                    "row {}: header has {} columns, but row has {} values",
                    row_idx + 1,
                    column_names.len(),
                    row_values.len()
                )));
            }
        }

        let mut columns: Vec<Column> = column_names
            .iter()
            .enumerate()
            .map(|(i, col_name)| {
                let col_type = infer_csv_column_type(rows.iter().map(|row| row[i].as_str()));
                Column::new(col_name.trim().to_string(), col_type, true)
            })
            .collect();

        for (row_idx, row_values) in rows.iter().enumerate() {
            for (col, raw) in columns.iter_mut().zip(row_values.iter()) {
                let value = parse_csv_value(raw, col.column_type())
                    .map_err(|e| TableError::Parse(format!("row {}: {}", row_idx + 1, e)))?;
                col.append(value)?;
            }
        }

        Table::from_columns(name, columns)
    }

    /// Create a table from a JSON string (array of objects).
    ///
    /// Column order is taken from the first object, and every object must
    /// carry all of its keys. Each column's type is inferred from all of its
    /// non-null values:
    /// - integers → INT32, or INT64 if any value needs it
    /// - other numbers, or integers mixed with them → FLOAT64
    /// - strings → STRING
    /// - booleans → BOOL
    ///
    /// All columns are nullable. A column holding only nulls is FLOAT64. Mixing
    /// strings, booleans and numbers in one column is a type mismatch.
    ///
    /// # Example
    ///
    /// ```
    /// use rolltable::Table;
    ///
    /// let json = r#"[{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}]"#;
    /// let table = Table::from_json("users", json).unwrap();
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.column_names(), vec!["id", "name"]);
    /// ```
    pub fn from_json(name: &str, json: &str) -> Result<Table> {
        let parsed: Vec<serde_json::Value> = serde_json::from_str(json)?;

        let objects = parsed
            .iter()
            .map(|item| {
                item.as_object()
                    .ok_or_else(|| TableError::Parse("expected array of objects".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let first = objects
            .first()
            .ok_or_else(|| TableError::Parse("JSON array is empty".to_string()))?;

        let mut columns = Vec::with_capacity(first.len());
        for key in first.keys() {
            let raw_values = objects
                .iter()
                .map(|obj| obj.get(key).ok_or_else(|| TableError::MissingValue(key.clone())))
                .collect::<Result<Vec<_>>>()?;

            let mut value_types = Vec::with_capacity(raw_values.len());
            for raw in &raw_values {
                if let Some(ty) = infer_type_from_json(key, raw)? {
                    value_types.push(ty);
                }
            }
            let col_type = ColumnType::unify(value_types)
                .map_err(|(expected, found)| TableError::TypeMismatch {
                    column: key.clone(),
                    expected: expected.to_string(),
                    found: found.to_string(),
                })?
                .unwrap_or(ColumnType::Float64);

            let mut col = Column::new(key.clone(), col_type, true);
            for raw in raw_values {
                col.append(json_to_column_value(key, raw, col_type)?)?;
            }
            columns.push(col);
        }

        Table::from_columns(name, columns)
    }
}

// ============================================================================
// Helper functions for serialization
// ============================================================================

fn column_value_to_json(value: &ColumnValue) -> serde_json::Value {
    match value {
        ColumnValue::Int32(n) => serde_json::Value::Number((*n).into()),
        ColumnValue::Int64(n) => serde_json::Value::Number((*n).into()),
        ColumnValue::Float32(f) => serde_json::Number::from_f64(*f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ColumnValue::Float64(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ColumnValue::String(s) => serde_json::Value::String(s.clone()),
        ColumnValue::Bool(b) => serde_json::Value::Bool(*b),
        ColumnValue::Null => serde_json::Value::Null,
    }
}

/// Parse a CSV string into rows, handling quoted fields with embedded newlines
fn parse_csv_rows(csv: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut current_row = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = csv.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                // Doubled quote is an escaped quote
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current_field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
            }
            '\n' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
                rows.push(std::mem::take(&mut current_row));
            }
            '\r' if !in_quotes => {}
            _ => current_field.push(c),
        }
    }

    if !current_field.is_empty() || !current_row.is_empty() {
        current_row.push(current_field);
        rows.push(current_row);
    }

    rows
}

/// Type of a single CSV field; `None` for an empty field
fn infer_type_from_csv_value(value: &str) -> Option<ColumnType> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return None;
    }

    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        return Some(ColumnType::Bool);
    }

    if let Ok(n) = trimmed.parse::<i64>() {
        if i32::try_from(n).is_ok() {
            return Some(ColumnType::Int32);
        }
        return Some(ColumnType::Int64);
    }

    if trimmed.parse::<f64>().is_ok() {
        return Some(ColumnType::Float64);
    }

    Some(ColumnType::String)
}

/// Widest type over all fields of a CSV column. Kinds that do not widen into
/// each other fall back to STRING, which holds any field.
fn infer_csv_column_type<'a>(fields: impl Iterator<Item = &'a str>) -> ColumnType {
    match ColumnType::unify(fields.filter_map(infer_type_from_csv_value)) {
        Ok(Some(ty)) => ty,
        Ok(None) => ColumnType::Float64,
        Err(_) => ColumnType::String,
    }
}

/// Parse a CSV field into a ColumnValue of the expected type
fn parse_csv_value(value: &str, col_type: ColumnType) -> std::result::Result<ColumnValue, String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Ok(ColumnValue::Null);
    }

    match col_type {
        ColumnType::Int32 => trimmed
            .parse::<i32>()
            .map(ColumnValue::Int32)
            .map_err(|_| format!("cannot parse '{}' as INT32", trimmed)),
        ColumnType::Int64 => trimmed
            .parse::<i64>()
            .map(ColumnValue::Int64)
            .map_err(|_| format!("cannot parse '{}' as INT64", trimmed)),
        ColumnType::Float32 => trimmed
            .parse::<f32>()
            .map(ColumnValue::Float32)
            .map_err(|_| format!("cannot parse '{}' as FLOAT32", trimmed)),
        ColumnType::Float64 => trimmed
            .parse::<f64>()
            .map(ColumnValue::Float64)
            .map_err(|_| format!("cannot parse '{}' as FLOAT64", trimmed)),
        ColumnType::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(ColumnValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(ColumnValue::Bool(false))
            } else {
                Err(format!("cannot parse '{}' as BOOL", trimmed))
            }
        }
        ColumnType::String => Ok(ColumnValue::String(trimmed.to_string())),
    }
}

/// Type of a single JSON value; `None` for null
fn infer_type_from_json(key: &str, value: &serde_json::Value) -> Result<Option<ColumnType>> {
    match value {
        serde_json::Value::Number(n) => Ok(Some(match n.as_i64() {
            Some(v) if i32::try_from(v).is_ok() => ColumnType::Int32,
            Some(_) => ColumnType::Int64,
            None => ColumnType::Float64,
        })),
        serde_json::Value::String(_) => Ok(Some(ColumnType::String)),
        serde_json::Value::Bool(_) => Ok(Some(ColumnType::Bool)),
        serde_json::Value::Null => Ok(None),
        _ => Err(TableError::Parse(format!(
            "unsupported JSON value type for column '{}'",
            key
        ))),
    }
}

fn json_to_column_value(
    column: &str,
    value: &serde_json::Value,
    col_type: ColumnType,
) -> Result<ColumnValue> {
    let mismatch = || TableError::TypeMismatch {
        column: column.to_string(),
        expected: col_type.to_string(),
        found: value.to_string(),
    };

    if value.is_null() {
        return Ok(ColumnValue::Null);
    }

    match col_type {
        ColumnType::Int32 => value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(ColumnValue::Int32)
            .ok_or_else(mismatch),
        ColumnType::Int64 => value.as_i64().map(ColumnValue::Int64).ok_or_else(mismatch),
        ColumnType::Float32 => value
            .as_f64()
            .map(|v| ColumnValue::Float32(v as f32))
            .ok_or_else(mismatch),
        ColumnType::Float64 => value.as_f64().map(ColumnValue::Float64).ok_or_else(mismatch),
        ColumnType::String => value
            .as_str()
            .map(|s| ColumnValue::String(s.to_string()))
            .ok_or_else(mismatch),
        ColumnType::Bool => value.as_bool().map(ColumnValue::Bool).ok_or_else(mismatch),
    }
}

pub struct TableRowIterator<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Iterator for TableRowIterator<'a> {
    type Item = HashMap<String, ColumnValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.table.row_count {
            None
        } else {
            let result = self.table.get_row(self.index).ok();
            self.index += 1;
            result
        }
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Table {{ name: '{}', columns: {}, rows: {} }}",
            self.name,
            self.schema.len(),
            self.row_count
        )
    }
}
