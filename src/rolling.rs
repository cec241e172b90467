//! Trailing window transforms: moving average and moving median.
//!
//! Both transforms return a new table with the same name, columns and row
//! count as the input. Numeric columns are replaced by FLOAT64 columns of
//! window statistics; every other column is copied unchanged.
//!
//! The two differ at the start of a column. The moving average shrinks its
//! window so the first row averages only itself, while the moving median
//! emits NULL until a full window of `window_size` rows is available.

use crate::column::Column;
use crate::error::{Result, TableError};
use crate::table::Table;

/// Moving average over a trailing window of `window_size` rows.
///
/// Row `i` of each numeric column becomes the mean of rows
/// `[max(0, i + 1 - window_size), i + 1)`. A NULL anywhere in that window
/// makes the output row NULL.
///
/// # Examples
///
/// ```
/// use rolltable::{rolling_average, Column, Table};
///
/// let x = Column::from_f64("x", &[2.0, 4.0, 6.0, 8.0]);
/// let table = Table::from_columns("t", vec![x]).unwrap();
/// let avg = rolling_average(&table, 2).unwrap();
///
/// let values: Vec<Option<f64>> = avg.column("x").unwrap().to_f64_vec();
/// assert_eq!(values, vec![Some(2.0), Some(3.0), Some(5.0), Some(7.0)]);
/// ```
pub fn rolling_average(table: &Table, window_size: usize) -> Result<Table> {
    check_window(window_size)?;
    log::debug!(
        "rolling average over table '{}' ({} rows), window {}",
        table.name(),
        table.len(),
        window_size
    );

    transform_numeric(table, |col| {
        let values = col.to_f64_vec();
        let averages = moving_average(&values, window_size);
        // A non-nullable input never yields a NULL window
        if col.is_nullable() {
            Column::from_optional_f64(col.name(), averages)
        } else {
            let dense: Vec<f64> = averages.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
            Column::from_f64(col.name(), &dense)
        }
    })
}

/// Moving median over an exact trailing window of `window_size` rows.
///
/// Rows `0..window_size - 1` of each numeric column are NULL; row `i` after
/// that is the median of rows `[i + 1 - window_size, i + 1)`. The output
/// columns are always nullable.
///
/// # Examples
///
/// ```
/// use rolltable::{rolling_median, Column, Table};
///
/// let x = Column::from_f64("x", &[5.0, 3.0, 8.0, 1.0]);
/// let table = Table::from_columns("t", vec![x]).unwrap();
/// let med = rolling_median(&table, 4).unwrap();
///
/// let values = med.column("x").unwrap().to_f64_vec();
/// assert_eq!(values, vec![None, None, None, Some(4.0)]);
/// ```
pub fn rolling_median(table: &Table, window_size: usize) -> Result<Table> {
    check_window(window_size)?;
    log::debug!(
        "rolling median over table '{}' ({} rows), window {}",
        table.name(),
        table.len(),
        window_size
    );

    transform_numeric(table, |col| {
        let values = col.to_f64_vec();
        Column::from_optional_f64(col.name(), moving_median(&values, window_size))
    })
}

/// Median of a slice. The input is copied before sorting and never modified.
///
/// Odd lengths give the middle element, even lengths the mean of the two
/// middle elements. Returns None for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn check_window(window_size: usize) -> Result<()> {
    if window_size == 0 {
        return Err(TableError::InvalidParameter(
            "window size must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Rebuild `table`, mapping numeric columns through `f` and cloning the rest.
fn transform_numeric<F>(table: &Table, f: F) -> Result<Table>
where
    F: Fn(&Column) -> Column,
{
    let columns = table
        .columns()
        .iter()
        .map(|col| if col.is_numeric() { f(col) } else { col.clone() })
        .collect();

    Table::from_columns(table.name(), columns)
}

/// Collect the window as plain floats, or None if any cell is NULL.
fn dense_window(window: &[Option<f64>]) -> Option<Vec<f64>> {
    window.iter().copied().collect()
}

fn moving_average(values: &[Option<f64>], window_size: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window_size);
            let window = dense_window(&values[start..=i])?;
            Some(window.iter().sum::<f64>() / window.len() as f64)
        })
        .collect()
}

fn moving_median(values: &[Option<f64>], window_size: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i + 1 < window_size {
                return None;
            }
            let window = dense_window(&values[i + 1 - window_size..=i])?;
            median(&window)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnType, ColumnValue};

    fn mixed_table() -> Table {
        Table::from_columns(
            "readings",
            vec![
                Column::from_values(
                    "sensor".to_string(),
                    ColumnType::String,
                    false,
                    ["a", "b", "c", "d", "e"]
                        .iter()
                        .map(|s| ColumnValue::String(s.to_string()))
                        .collect(),
                )
                .unwrap(),
                Column::from_values(
                    "count".to_string(),
                    ColumnType::Int32,
                    false,
                    [1, 2, 3, 4, 10].iter().map(|v| ColumnValue::Int32(*v)).collect(),
                )
                .unwrap(),
                Column::from_f64("value", &[5.0, 3.0, 8.0, 1.0, 9.0]),
            ],
        )
        .unwrap()
    }

    fn assert_close(actual: &[Option<f64>], expected: &[Option<f64>]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            match (a, e) {
                (Some(a), Some(e)) => assert!((a - e).abs() < 1e-12, "row {}: {} != {}", i, a, e),
                (None, None) => {}
                _ => panic!("row {}: {:?} != {:?}", i, a, e),
            }
        }
    }

    #[test]
    fn test_average_shrinking_window() {
        let out = rolling_average(&mixed_table(), 3).unwrap();

        assert_close(
            &out.column("value").unwrap().to_f64_vec(),
            &[Some(5.0), Some(4.0), Some(16.0 / 3.0), Some(4.0), Some(6.0)],
        );
        assert_close(
            &out.column("count").unwrap().to_f64_vec(),
            &[Some(1.0), Some(1.5), Some(2.0), Some(3.0), Some(17.0 / 3.0)],
        );
    }

    #[test]
    fn test_average_first_row_equals_input() {
        let table = mixed_table();
        for w in 1..=7 {
            let out = rolling_average(&table, w).unwrap();
            assert_eq!(out.column("value").unwrap().get_f64(0), Some(5.0));
        }
    }

    #[test]
    fn test_average_window_one_is_identity() {
        let table = mixed_table();
        let out = rolling_average(&table, 1).unwrap();

        for name in ["count", "value"] {
            assert_eq!(
                out.column(name).unwrap().to_f64_vec(),
                table.column(name).unwrap().to_f64_vec()
            );
        }
    }

    #[test]
    fn test_average_window_larger_than_column() {
        let out = rolling_average(&mixed_table(), 50).unwrap();
        assert_close(
            &out.column("value").unwrap().to_f64_vec(),
            &[Some(5.0), Some(4.0), Some(16.0 / 3.0), Some(17.0 / 4.0), Some(26.0 / 5.0)],
        );
    }

    #[test]
    fn test_average_output_types() {
        let out = rolling_average(&mixed_table(), 2).unwrap();
        assert_eq!(out.column("count").unwrap().column_type(), ColumnType::Float64);
        assert!(!out.column("value").unwrap().is_nullable());
        assert_eq!(out.column("sensor").unwrap().column_type(), ColumnType::String);
    }

    #[test]
    fn test_non_numeric_columns_pass_through() {
        let table = mixed_table();
        let avg = rolling_average(&table, 2).unwrap();
        let med = rolling_median(&table, 2).unwrap();

        assert_eq!(avg.column("sensor"), table.column("sensor"));
        assert_eq!(med.column("sensor"), table.column("sensor"));
    }

    #[test]
    fn test_shape_and_input_preserved() {
        let table = mixed_table();
        let before = table.clone();

        for out in [rolling_average(&table, 3).unwrap(), rolling_median(&table, 3).unwrap()] {
            assert_eq!(out.name(), "readings");
            assert_eq!(out.len(), table.len());
            assert_eq!(out.column_names(), table.column_names());
        }

        assert_eq!(table.columns(), before.columns());
    }

    #[test]
    fn test_median_undefined_prefix() {
        let out = rolling_median(&mixed_table(), 3).unwrap();
        let col = out.column("value").unwrap();

        assert!(col.is_nullable());
        assert!(col.get(0).unwrap().is_null());
        assert!(col.get(1).unwrap().is_null());
        // [5,3,8] -> 5, [3,8,1] -> 3, [8,1,9] -> 8
        assert_eq!(col.to_f64_vec(), vec![None, None, Some(5.0), Some(3.0), Some(8.0)]);
    }

    #[test]
    fn test_median_even_window() {
        let out = rolling_median(&mixed_table(), 4).unwrap();
        // [5,3,8,1] -> (3+5)/2, [3,8,1,9] -> (3+8)/2
        assert_eq!(
            out.column("value").unwrap().to_f64_vec(),
            vec![None, None, None, Some(4.0), Some(5.5)]
        );
    }

    #[test]
    fn test_median_window_one_is_identity() {
        let out = rolling_median(&mixed_table(), 1).unwrap();
        assert_eq!(
            out.column("count").unwrap().to_f64_vec(),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(10.0)]
        );
    }

    #[test]
    fn test_median_window_larger_than_column_is_all_null() {
        let out = rolling_median(&mixed_table(), 6).unwrap();
        assert!(out.column("value").unwrap().iter().all(ColumnValue::is_null));
    }

    #[test]
    fn test_median_helper() {
        let window = [5.0, 3.0, 8.0, 1.0];
        assert_eq!(median(&window), Some(4.0));
        assert_eq!(window, [5.0, 3.0, 8.0, 1.0]);

        assert_eq!(median(&[7.0, -1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[2.0]), Some(2.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_nulls_propagate_through_windows() {
        let table = Table::from_columns(
            "gaps",
            vec![Column::from_optional_f64(
                "x",
                vec![Some(1.0), None, Some(3.0), Some(5.0), Some(7.0)],
            )],
        )
        .unwrap();

        let avg = rolling_average(&table, 2).unwrap();
        assert_eq!(
            avg.column("x").unwrap().to_f64_vec(),
            vec![Some(1.0), None, None, Some(4.0), Some(6.0)]
        );

        let med = rolling_median(&table, 2).unwrap();
        assert_eq!(
            med.column("x").unwrap().to_f64_vec(),
            vec![None, None, None, Some(4.0), Some(6.0)]
        );
    }

    #[test]
    fn test_empty_columns() {
        let table = Table::from_columns("empty", vec![Column::from_f64("x", &[])]).unwrap();

        let avg = rolling_average(&table, 3).unwrap();
        let med = rolling_median(&table, 3).unwrap();
        assert!(avg.column("x").unwrap().is_empty());
        assert!(med.column("x").unwrap().is_empty());
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let table = mixed_table();
        assert!(matches!(
            rolling_average(&table, 0),
            Err(TableError::InvalidParameter(_))
        ));
        assert!(matches!(
            rolling_median(&table, 0),
            Err(TableError::InvalidParameter(_))
        ));
    }
}
