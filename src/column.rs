/// RollTable Column Implementation
///
/// A Column is an array-like random-access data container indexed by integer.
/// Each Column has a declared type specifying the type of every value stored,
/// fixed when the column is created. Transforms classify a column as numeric
/// or non-numeric from that declared type alone.

use crate::error::{Result, TableError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Bool,
}

impl ColumnType {
    /// True for the integer and floating-point types.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Int32 | ColumnType::Int64 | ColumnType::Float32 | ColumnType::Float64
        )
    }

    /// The narrowest type that can hold values of both `self` and `other`.
    ///
    /// Integers widen INT32 → INT64 → FLOAT64, and any two numeric types meet
    /// at FLOAT64. STRING and BOOL only combine with themselves.
    pub fn widen(self, other: ColumnType) -> Option<ColumnType> {
        match (self, other) {
            (a, b) if a == b => Some(a),
            (ColumnType::Int32, ColumnType::Int64) | (ColumnType::Int64, ColumnType::Int32) => {
                Some(ColumnType::Int64)
            }
            (a, b) if a.is_numeric() && b.is_numeric() => Some(ColumnType::Float64),
            _ => None,
        }
    }

    /// Combine the types of every non-null value of a column into one.
    ///
    /// Returns `Ok(None)` if there were no values, and the first pair that
    /// cannot be widened as `Err((current, incoming))`.
    pub fn unify<I>(types: I) -> std::result::Result<Option<ColumnType>, (ColumnType, ColumnType)>
    where
        I: IntoIterator<Item = ColumnType>,
    {
        let mut unified: Option<ColumnType> = None;
        for ty in types {
            unified = Some(match unified {
                None => ty,
                Some(current) => current.widen(ty).ok_or((current, ty))?,
            });
        }
        Ok(unified)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Int32 => "INT32",
            ColumnType::Int64 => "INT64",
            ColumnType::Float32 => "FLOAT32",
            ColumnType::Float64 => "FLOAT64",
            ColumnType::String => "STRING",
            ColumnType::Bool => "BOOL",
        };
        f.write_str(name)
    }
}

/// Column value enum to support multiple types
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bool(bool),
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// The type this value belongs to, or None for Null.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            ColumnValue::Int32(_) => Some(ColumnType::Int32),
            ColumnValue::Int64(_) => Some(ColumnType::Int64),
            ColumnValue::Float32(_) => Some(ColumnType::Float32),
            ColumnValue::Float64(_) => Some(ColumnType::Float64),
            ColumnValue::String(_) => Some(ColumnType::String),
            ColumnValue::Bool(_) => Some(ColumnType::Bool),
            ColumnValue::Null => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ColumnValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value widened to f64. None for Null and non-numeric values.
    #[inline]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Int32(n) => Some(*n as f64),
            ColumnValue::Int64(n) => Some(*n as f64),
            ColumnValue::Float32(f) => Some(*f as f64),
            ColumnValue::Float64(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Int32(n) => write!(f, "{}", n),
            ColumnValue::Int64(n) => write!(f, "{}", n),
            ColumnValue::Float32(v) => write!(f, "{}", v),
            ColumnValue::Float64(v) => write!(f, "{}", v),
            ColumnValue::String(s) => f.write_str(s),
            ColumnValue::Bool(b) => write!(f, "{}", b),
            ColumnValue::Null => Ok(()),
        }
    }
}

/// A named, typed column of values.
#[derive(Clone, PartialEq)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    nullable: bool,
    values: Vec<ColumnValue>,
}

impl Column {
    pub fn new(name: String, column_type: ColumnType, nullable: bool) -> Self {
        Column {
            name,
            column_type,
            nullable,
            values: Vec::new(),
        }
    }

    /// Build a column from existing values, validating each one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolltable::{Column, ColumnType, ColumnValue};
    ///
    /// let col = Column::from_values(
    ///     "price".to_string(),
    ///     ColumnType::Float64,
    ///     false,
    ///     vec![ColumnValue::Float64(1.5), ColumnValue::Float64(2.5)],
    /// ).unwrap();
    ///
    /// assert_eq!(col.len(), 2);
    /// assert!(col.is_numeric());
    /// ```
    pub fn from_values(
        name: String,
        column_type: ColumnType,
        nullable: bool,
        values: Vec<ColumnValue>,
    ) -> Result<Self> {
        let mut column = Column::new(name, column_type, nullable);
        column.values.reserve(values.len());
        for value in values {
            column.append(value)?;
        }
        Ok(column)
    }

    /// Convenience constructor for a non-nullable FLOAT64 column.
    pub fn from_f64(name: &str, values: &[f64]) -> Self {
        Column {
            name: name.to_string(),
            column_type: ColumnType::Float64,
            nullable: false,
            values: values.iter().map(|v| ColumnValue::Float64(*v)).collect(),
        }
    }

    /// Nullable FLOAT64 column where None becomes Null.
    pub fn from_optional_f64(name: &str, values: Vec<Option<f64>>) -> Self {
        Column {
            name: name.to_string(),
            column_type: ColumnType::Float64,
            nullable: true,
            values: values
                .into_iter()
                .map(|v| v.map_or(ColumnValue::Null, ColumnValue::Float64))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type.is_numeric()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Validate value against the declared type
    fn validate_value(&self, value: &ColumnValue) -> Result<()> {
        match value.column_type() {
            None if self.nullable => Ok(()),
            None => Err(TableError::NullNotAllowed(self.name.clone())),
            Some(ty) if ty == self.column_type => Ok(()),
            Some(ty) => Err(TableError::TypeMismatch {
                column: self.name.clone(),
                expected: self.column_type.to_string(),
                found: ty.to_string(),
            }),
        }
    }

    pub fn get(&self, index: usize) -> Result<ColumnValue> {
        self.get_ref(index).cloned().ok_or(TableError::RowOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    pub fn get_ref(&self, index: usize) -> Option<&ColumnValue> {
        self.values.get(index)
    }

    /// Fast numeric access without cloning.
    /// Returns None if the value is null, not numeric, or out of bounds.
    #[inline]
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(ColumnValue::to_f64)
    }

    pub fn append(&mut self, value: ColumnValue) -> Result<()> {
        self.validate_value(&value)?;
        self.values.push(value);
        Ok(())
    }

    /// All values widened to f64, with None in place of nulls.
    pub fn to_f64_vec(&self) -> Vec<Option<f64>> {
        self.values.iter().map(ColumnValue::to_f64).collect()
    }

    pub fn values(&self) -> &[ColumnValue] {
        &self.values
    }

    /// Smallest numeric value, skipping nulls. NaN values are ignored.
    pub fn min(&self) -> Option<f64> {
        self.values
            .iter()
            .filter_map(ColumnValue::to_f64)
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
    }

    /// Largest numeric value, skipping nulls. NaN values are ignored.
    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .filter_map(ColumnValue::to_f64)
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnValue> {
        self.values.iter()
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column {{ name: '{}', type: {:?}, nullable: {}, len: {} }}",
            self.name,
            self.column_type,
            self.nullable,
            self.len()
        )
    }
}
