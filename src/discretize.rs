//! Equal-width discretization of a table's first column.
//!
//! Unlike the rolling transforms, `discretize` mutates its argument: the bin
//! column is appended to the caller's table and that same table is returned.

use crate::column::{Column, ColumnType, ColumnValue};
use crate::error::{Result, TableError};
use crate::table::Table;

/// Name of the column appended by [`discretize`].
pub const BINNED_COLUMN: &str = "Binned Data";

/// Append a `"Binned Data"` column holding the 1-based equal-width bin index
/// of every value in the table's first column.
///
/// Bins span `[min, max]` of the first column with width
/// `(max - min) / num_bins`; value `v` falls in bin
/// `ceil((v - min) / width)`. The minimum itself would land on the boundary
/// at 0 and is placed in bin 1 instead. Indices are clamped to
/// `1..=num_bins`. NULL and non-finite values get a NULL bin.
///
/// # Errors
///
/// - [`TableError::InvalidParameter`] if `num_bins` is 0
/// - [`TableError::EmptyTable`] if the table has no columns
/// - [`TableError::TypeMismatch`] if the first column is not numeric
/// - [`TableError::DegenerateRange`] if every value is the same
/// - [`TableError::DuplicateColumn`] if `"Binned Data"` already exists
///
/// # Examples
///
/// ```
/// use rolltable::{discretize, Column, Table, BINNED_COLUMN};
///
/// let mut table = Table::from_columns(
///     "scores",
///     vec![Column::from_f64("score", &[0.0, 25.0, 50.0, 75.0, 100.0])],
/// ).unwrap();
///
/// discretize(&mut table, 4).unwrap();
///
/// let bins: Vec<i64> = table
///     .column(BINNED_COLUMN)
///     .unwrap()
///     .iter()
///     .filter_map(|v| v.as_i64())
///     .collect();
/// assert_eq!(bins, vec![1, 1, 2, 3, 4]);
/// ```
pub fn discretize(table: &mut Table, num_bins: usize) -> Result<&mut Table> {
    if num_bins == 0 {
        return Err(TableError::InvalidParameter(
            "number of bins must be greater than 0".to_string(),
        ));
    }

    let source = table.column_at(0).ok_or(TableError::EmptyTable)?;
    if !source.is_numeric() {
        return Err(TableError::TypeMismatch {
            column: source.name().to_string(),
            expected: "numeric".to_string(),
            found: source.column_type().to_string(),
        });
    }

    let bins: Vec<ColumnValue> = match (source.min(), source.max()) {
        (Some(min), Some(max)) => {
            if min == max {
                return Err(TableError::DegenerateRange {
                    column: source.name().to_string(),
                    value: min,
                });
            }
            log::debug!(
                "discretizing '{}' into {} bins over [{}, {}]",
                source.name(),
                num_bins,
                min,
                max
            );
            let width = (max - min) / num_bins as f64;
            source
                .iter()
                .map(|value| match value.to_f64() {
                    Some(v) if v.is_finite() => {
                        ColumnValue::Int64(bin_index(v, min, width, num_bins))
                    }
                    _ => ColumnValue::Null,
                })
                .collect()
        }
        _ => {
            log::warn!(
                "column '{}' has no numeric values; all bins are NULL",
                source.name()
            );
            vec![ColumnValue::Null; source.len()]
        }
    };

    let binned = Column::from_values(BINNED_COLUMN.to_string(), ColumnType::Int64, true, bins)?;
    table.add_column(binned)?;
    Ok(table)
}

fn bin_index(value: f64, min: f64, width: f64, num_bins: usize) -> i64 {
    // Same as nudging the minimum by 1e-9, without depending on the width
    if value == min {
        return 1;
    }
    let bin = ((value - min) / width).ceil() as i64;
    bin.clamp(1, num_bins as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binned(table: &Table) -> Vec<Option<i64>> {
        table
            .column(BINNED_COLUMN)
            .unwrap()
            .iter()
            .map(|v| v.as_i64())
            .collect()
    }

    fn score_table(values: &[f64]) -> Table {
        Table::from_columns(
            "scores",
            vec![
                Column::from_f64("score", values),
                Column::from_values(
                    "label".to_string(),
                    ColumnType::String,
                    false,
                    (0..values.len())
                        .map(|i| ColumnValue::String(format!("r{}", i)))
                        .collect(),
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_boundary_mapping() {
        let mut table = score_table(&[0.0, 25.0, 50.0, 75.0, 100.0]);
        discretize(&mut table, 4).unwrap();

        assert_eq!(binned(&table), vec![Some(1), Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_appends_exactly_one_column() {
        let mut table = score_table(&[3.0, 1.0, 2.0]);
        let before = table.clone();

        discretize(&mut table, 2).unwrap();

        assert_eq!(table.column_names(), vec!["score", "label", BINNED_COLUMN]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("score"), before.column("score"));
        assert_eq!(table.column("label"), before.column("label"));
        assert_eq!(table.column(BINNED_COLUMN).unwrap().column_type(), ColumnType::Int64);
    }

    #[test]
    fn test_returns_same_table() {
        let mut table = score_table(&[1.0, 2.0]);
        let original: *const Table = &table;

        let returned = discretize(&mut table, 3).unwrap();
        assert!(std::ptr::eq(original, returned));
    }

    #[test]
    fn test_uneven_values() {
        // min 10, max 20, width 2.5
        let mut table = score_table(&[10.0, 12.5, 12.6, 17.0, 20.0, 11.0]);
        discretize(&mut table, 4).unwrap();

        assert_eq!(
            binned(&table),
            vec![Some(1), Some(1), Some(2), Some(3), Some(4), Some(1)]
        );
    }

    #[test]
    fn test_integer_column() {
        let mut table = Table::from_columns(
            "ints",
            vec![Column::from_values(
                "n".to_string(),
                ColumnType::Int32,
                false,
                (1..=6).map(ColumnValue::Int32).collect(),
            )
            .unwrap()],
        )
        .unwrap();

        discretize(&mut table, 5).unwrap();
        // min 1, max 6, width 1
        assert_eq!(
            binned(&table),
            vec![Some(1), Some(1), Some(2), Some(3), Some(4), Some(5)]
        );
    }

    #[test]
    fn test_tiny_range_stays_in_bounds() {
        let mut table = score_table(&[0.0, 1e-12, 2e-12]);
        discretize(&mut table, 2).unwrap();

        assert_eq!(binned(&table), vec![Some(1), Some(1), Some(2)]);
    }

    #[test]
    fn test_nulls_and_nan_get_null_bins() {
        let mut table = Table::from_columns(
            "gaps",
            vec![Column::from_optional_f64(
                "x",
                vec![Some(0.0), None, Some(f64::NAN), Some(10.0)],
            )],
        )
        .unwrap();

        discretize(&mut table, 2).unwrap();
        assert_eq!(binned(&table), vec![Some(1), None, None, Some(2)]);
    }

    #[test]
    fn test_empty_table_rows() {
        let mut table = score_table(&[]);
        discretize(&mut table, 3).unwrap();

        assert_eq!(table.len(), 0);
        assert!(table.column(BINNED_COLUMN).unwrap().is_empty());
    }

    #[test]
    fn test_all_null_column() {
        let mut table = Table::from_columns(
            "nulls",
            vec![Column::from_optional_f64("x", vec![None, None])],
        )
        .unwrap();

        discretize(&mut table, 3).unwrap();
        assert_eq!(binned(&table), vec![None, None]);
    }

    #[test]
    fn test_constant_column_is_rejected() {
        let mut table = score_table(&[5.0, 5.0, 5.0]);
        let err = discretize(&mut table, 3).unwrap_err();

        assert_eq!(
            err,
            TableError::DegenerateRange {
                column: "score".to_string(),
                value: 5.0
            }
        );
        assert!(table.column(BINNED_COLUMN).is_none());
    }

    #[test]
    fn test_invalid_inputs() {
        let mut table = score_table(&[1.0, 2.0]);
        assert!(matches!(
            discretize(&mut table, 0),
            Err(TableError::InvalidParameter(_))
        ));

        let mut empty = Table::from_columns("none", Vec::new()).unwrap();
        assert_eq!(discretize(&mut empty, 2).unwrap_err(), TableError::EmptyTable);

        let mut strings = Table::from_columns(
            "s",
            vec![Column::from_values(
                "name".to_string(),
                ColumnType::String,
                false,
                vec![ColumnValue::String("a".to_string())],
            )
            .unwrap()],
        )
        .unwrap();
        assert!(matches!(
            discretize(&mut strings, 2),
            Err(TableError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_second_call_reports_duplicate_column() {
        let mut table = score_table(&[1.0, 2.0, 3.0]);
        discretize(&mut table, 2).unwrap();

        assert_eq!(
            discretize(&mut table, 2).unwrap_err(),
            TableError::DuplicateColumn(BINNED_COLUMN.to_string())
        );
        assert_eq!(table.num_columns(), 3);
    }
}
