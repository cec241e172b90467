/// RollTable - Columnar Tables with Window and Binning Transforms
///
/// A typed columnar table plus three column transforms:
/// - `rolling_average`: trailing moving average with a window that grows from
///   one row at the start of the column
/// - `rolling_median`: trailing moving median, NULL until the window is full
/// - `discretize`: equal-width bin index of the first column, appended in place
///
/// Every column's type is fixed when it is created; transforms treat a column
/// as numeric or not from that type alone.

pub mod error;
pub mod column;
pub mod table;
pub mod rolling;
pub mod discretize;
pub mod ops;

pub use error::{Result, TableError};
pub use column::{Column, ColumnType, ColumnValue};
pub use table::{Schema, Table};
pub use rolling::{median, rolling_average, rolling_median};
pub use discretize::{discretize, BINNED_COLUMN};
pub use ops::{Operation, Pipeline};

// Python bindings - only when python feature is enabled
#[cfg(feature = "python")]
mod python_bindings;
#[cfg(feature = "python")]
pub use python_bindings::*;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_complete_workflow() {
        let schema = Schema::new(vec![
            ("price".to_string(), ColumnType::Float64, false),
            ("ticker".to_string(), ColumnType::String, false),
            ("volume".to_string(), ColumnType::Int64, false),
        ])
        .unwrap();

        let mut table = Table::new("quotes".to_string(), schema);
        let prices = [10.0, 12.0, 11.0, 15.0, 14.0, 20.0];
        let volumes = [100, 250, 175, 300, 125, 400];

        for (price, volume) in prices.iter().zip(volumes.iter()) {
            let mut row = HashMap::new();
            row.insert("price".to_string(), ColumnValue::Float64(*price));
            row.insert("ticker".to_string(), ColumnValue::String("ACME".to_string()));
            row.insert("volume".to_string(), ColumnValue::Int64(*volume));
            table.append_row(row).unwrap();
        }

        // Average first, then bin the smoothed prices
        let mut smoothed = rolling_average(&table, 2).unwrap();
        assert_eq!(
            smoothed.column("price").unwrap().to_f64_vec(),
            vec![Some(10.0), Some(11.0), Some(11.5), Some(13.0), Some(14.5), Some(17.0)]
        );
        assert_eq!(smoothed.get_value(3, "ticker").unwrap().as_string(), Some("ACME"));

        discretize(&mut smoothed, 7).unwrap();
        // min 10, max 17, width 1
        let bins: Vec<Option<i64>> = smoothed
            .column(BINNED_COLUMN)
            .unwrap()
            .iter()
            .map(|v| v.as_i64())
            .collect();
        assert_eq!(bins, vec![Some(1), Some(1), Some(2), Some(3), Some(5), Some(7)]);

        // The source table is untouched by either step
        assert_eq!(table.num_columns(), 3);
        assert_eq!(table.get_value(1, "price").unwrap().as_f64(), Some(12.0));

        let medians = rolling_median(&table, 3).unwrap();
        assert_eq!(
            medians.column("volume").unwrap().to_f64_vec(),
            vec![None, None, Some(175.0), Some(250.0), Some(175.0), Some(300.0)]
        );
    }

    #[test]
    fn test_csv_pipeline() {
        let csv = "value,label\n0,a\n25,b\n50,c\n75,d\n100,e\n";
        let table = Table::from_csv("levels", csv).unwrap();

        let pipeline = Pipeline::new(vec![
            Operation::from_name("rolling_median", 1).unwrap(),
            Operation::from_name("discretize", 4).unwrap(),
        ]);
        let out = pipeline.run(table).unwrap();

        let csv_out = out.to_csv();
        let lines: Vec<&str> = csv_out.lines().collect();
        assert_eq!(lines[0], "value,label,Binned Data");
        assert_eq!(lines[1], "0,a,1");
        assert_eq!(lines[3], "50,c,2");
        assert_eq!(lines[5], "100,e,4");
    }
}
