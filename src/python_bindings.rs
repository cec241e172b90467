/// Python bindings for RollTable using PyO3
///
/// Exposes a `Table` class with CSV/JSON loading and the three transforms.
/// `rolling_average` and `rolling_median` return new tables; `discretize`
/// appends to the table it is called on and returns that same object.

use pyo3::prelude::*;
use pyo3::exceptions::{PyIndexError, PyKeyError, PyTypeError, PyValueError};
use pyo3::types::{PyBool, PyDict, PyFloat, PyList, PyLong, PyString};

use crate::column::{Column, ColumnType as RustColumnType, ColumnValue as RustColumnValue};
use crate::discretize::discretize;
use crate::error::TableError;
use crate::rolling::{rolling_average, rolling_median};
use crate::table::Table as RustTable;

fn to_py_err(err: TableError) -> PyErr {
    let message = err.to_string();
    match err {
        TableError::ColumnNotFound(_) => PyKeyError::new_err(message),
        TableError::RowOutOfRange { .. } => PyIndexError::new_err(message),
        TableError::TypeMismatch { .. } => PyTypeError::new_err(message),
        _ => PyValueError::new_err(message),
    }
}

/// Convert ColumnValue to Python object
fn column_value_to_py(py: Python, value: &RustColumnValue) -> PyObject {
    match value {
        RustColumnValue::Int32(v) => v.to_object(py),
        RustColumnValue::Int64(v) => v.to_object(py),
        RustColumnValue::Float32(v) => v.to_object(py),
        RustColumnValue::Float64(v) => v.to_object(py),
        RustColumnValue::String(v) => v.to_object(py),
        RustColumnValue::Bool(v) => v.to_object(py),
        RustColumnValue::Null => py.None(),
    }
}

/// Infer a column type from a Python value. None gives no answer.
fn infer_py_type(value: &Bound<'_, PyAny>) -> PyResult<Option<RustColumnType>> {
    if value.is_none() {
        return Ok(None);
    }
    // bool must be checked before int (bool is a subclass of int)
    if value.is_instance_of::<PyBool>() {
        Ok(Some(RustColumnType::Bool))
    } else if value.is_instance_of::<PyLong>() {
        Ok(Some(RustColumnType::Int64))
    } else if value.is_instance_of::<PyFloat>() {
        Ok(Some(RustColumnType::Float64))
    } else if value.is_instance_of::<PyString>() {
        Ok(Some(RustColumnType::String))
    } else {
        Err(PyTypeError::new_err(format!(
            "Unsupported value type: {}",
            value.get_type().name()?
        )))
    }
}

/// Convert a Python value using the column's known type
fn py_to_column_value_typed(
    value: &Bound<'_, PyAny>,
    expected_type: RustColumnType,
) -> PyResult<RustColumnValue> {
    if value.is_none() {
        return Ok(RustColumnValue::Null);
    }

    match expected_type {
        RustColumnType::Int32 => value
            .extract::<i32>()
            .map(RustColumnValue::Int32)
            .map_err(|_| PyTypeError::new_err("Expected INT32 value")),
        RustColumnType::Int64 => value
            .extract::<i64>()
            .map(RustColumnValue::Int64)
            .map_err(|_| PyTypeError::new_err("Expected INT64 value")),
        RustColumnType::Float32 => value
            .extract::<f32>()
            .map(RustColumnValue::Float32)
            .map_err(|_| PyTypeError::new_err("Expected FLOAT32 value")),
        RustColumnType::Float64 => value
            .extract::<f64>()
            .map(RustColumnValue::Float64)
            .map_err(|_| PyTypeError::new_err("Expected FLOAT64 value")),
        RustColumnType::String => value
            .extract::<String>()
            .map(RustColumnValue::String)
            .map_err(|_| PyTypeError::new_err("Expected STRING value")),
        RustColumnType::Bool => value
            .extract::<bool>()
            .map(RustColumnValue::Bool)
            .map_err(|_| PyTypeError::new_err("Expected BOOL value")),
    }
}

/// Python-exposed table
#[pyclass(name = "Table")]
pub struct PyTable {
    inner: RustTable,
}

#[pymethods]
impl PyTable {
    /// Create a table from a dict of equally long lists.
    ///
    /// Each column's type is inferred from all of its non-None values:
    /// bool → BOOL, int → INT64, float (or int mixed with float) → FLOAT64,
    /// str → STRING. A column of only None is FLOAT64.
    ///
    /// Example:
    ///     t = rolltable.Table("prices", {"day": ["mon", "tue"], "close": [1.5, 2.0]})
    #[new]
    fn new(name: String, data: &Bound<'_, PyDict>) -> PyResult<Self> {
        let mut columns = Vec::with_capacity(data.len());

        for (key, value) in data.iter() {
            let col_name: String = key.extract()?;
            let items = value.downcast::<PyList>().map_err(|_| {
                PyTypeError::new_err(format!("Column '{}' must be a list", col_name))
            })?;

            let mut value_types = Vec::with_capacity(items.len());
            for item in items.iter() {
                if let Some(ty) = infer_py_type(&item)? {
                    value_types.push(ty);
                }
            }
            let col_type = RustColumnType::unify(value_types)
                .map_err(|(current, found)| {
                    PyTypeError::new_err(format!(
                        "Column '{}' mixes {} and {} values",
                        col_name, current, found
                    ))
                })?
                .unwrap_or(RustColumnType::Float64);

            let values = items
                .iter()
                .map(|item| py_to_column_value_typed(&item, col_type))
                .collect::<PyResult<Vec<_>>>()?;
            let column = Column::from_values(col_name, col_type, true, values).map_err(to_py_err)?;
            columns.push(column);
        }

        let inner = RustTable::from_columns(&name, columns).map_err(to_py_err)?;
        Ok(PyTable { inner })
    }

    /// Create a table from a CSV string. Types are inferred from the first row.
    #[staticmethod]
    fn from_csv(name: &str, csv: &str) -> PyResult<Self> {
        let inner = RustTable::from_csv(name, csv).map_err(to_py_err)?;
        Ok(PyTable { inner })
    }

    /// Create a table from a JSON string (array of objects).
    #[staticmethod]
    fn from_json(name: &str, json: &str) -> PyResult<Self> {
        let inner = RustTable::from_json(name, json).map_err(to_py_err)?;
        Ok(PyTable { inner })
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Table(name='{}', rows={}, columns={})",
            self.inner.name(),
            self.inner.len(),
            self.inner.num_columns()
        )
    }

    fn name(&self) -> String {
        self.inner.name().to_string()
    }

    fn column_names(&self) -> Vec<String> {
        self.inner.column_names().iter().map(|s| s.to_string()).collect()
    }

    fn get_value(&self, py: Python, row: usize, column: &str) -> PyResult<PyObject> {
        let value = self.inner.get_value(row, column).map_err(to_py_err)?;
        Ok(column_value_to_py(py, &value))
    }

    /// Get a full row as a dictionary
    fn get_row(&self, py: Python, index: usize) -> PyResult<PyObject> {
        let row = self.inner.get_row(index).map_err(to_py_err)?;

        let dict = PyDict::new_bound(py);
        for (key, value) in row.iter() {
            dict.set_item(key, column_value_to_py(py, value))?;
        }
        Ok(dict.to_object(py))
    }

    /// All values of a column as a list (NULL becomes None)
    fn column(&self, py: Python, name: &str) -> PyResult<PyObject> {
        let col = self
            .inner
            .column(name)
            .ok_or_else(|| PyKeyError::new_err(format!("column '{}' not found", name)))?;
        let values: Vec<PyObject> = col.iter().map(|v| column_value_to_py(py, v)).collect();
        Ok(PyList::new_bound(py, values).to_object(py))
    }

    fn to_csv(&self) -> String {
        self.inner.to_csv()
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(to_py_err)
    }

    /// Trailing moving average; returns a new table.
    fn rolling_average(&self, window_size: usize) -> PyResult<Self> {
        let inner = rolling_average(&self.inner, window_size).map_err(to_py_err)?;
        Ok(PyTable { inner })
    }

    /// Trailing moving median, None until the window is full; returns a new table.
    fn rolling_median(&self, window_size: usize) -> PyResult<Self> {
        let inner = rolling_median(&self.inner, window_size).map_err(to_py_err)?;
        Ok(PyTable { inner })
    }

    /// Append a "Binned Data" column in place and return this same table.
    fn discretize(mut slf: PyRefMut<'_, Self>, num_bins: usize) -> PyResult<PyRefMut<'_, Self>> {
        discretize(&mut slf.inner, num_bins).map_err(to_py_err)?;
        Ok(slf)
    }
}

#[pymodule]
fn rolltable(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTable>()?;
    Ok(())
}
