/// Basic Table Operations Example
///
/// This example demonstrates:
/// - Creating a table with a schema
/// - Adding rows and reading them back
/// - Loading a table from CSV and exporting it as JSON

use rolltable::{ColumnType, ColumnValue, Schema, Table};
use std::collections::HashMap;

fn main() {
    println!("=== RollTable Basic Table Example ===\n");

    // 1. Create a schema
    println!("1. Creating schema...");
    let schema = Schema::new(vec![
        ("city".to_string(), ColumnType::String, false),
        ("temp".to_string(), ColumnType::Float64, true), // Nullable
        ("rain_mm".to_string(), ColumnType::Int32, false),
    ])
    .unwrap();
    println!("   Schema created with {} columns\n", schema.len());

    // 2. Create a table and add rows
    println!("2. Adding rows...");
    let mut weather = Table::new("weather".to_string(), schema);

    let readings = [
        ("Oslo", Some(4.5), 12),
        ("Lima", Some(19.0), 0),
        ("Pune", None, 40),
    ];
    for (city, temp, rain) in readings {
        let mut row = HashMap::new();
        row.insert("city".to_string(), ColumnValue::String(city.to_string()));
        row.insert(
            "temp".to_string(),
            temp.map_or(ColumnValue::Null, ColumnValue::Float64),
        );
        row.insert("rain_mm".to_string(), ColumnValue::Int32(rain));
        weather.append_row(row).unwrap();
    }
    println!("   Added {} rows\n", weather.len());

    // 3. Query data
    println!("3. Querying data...");
    for (i, row) in weather.iter_rows().enumerate() {
        println!(
            "   Row {}: {} temp={} rain={}",
            i,
            row["city"],
            match &row["temp"] {
                ColumnValue::Null => "N/A".to_string(),
                v => v.to_string(),
            },
            row["rain_mm"]
        );
    }
    println!(
        "   Rain range: {:?} .. {:?}\n",
        weather.min("rain_mm").unwrap(),
        weather.max("rain_mm").unwrap()
    );

    // 4. CSV in, JSON out
    println!("4. Loading CSV...");
    let csv = "day,visitors\nmon,120\ntue,95\nwed,143\n";
    let visits = Table::from_csv("visits", csv).unwrap();
    println!("   {:?}", visits);
    println!("{}", visits.to_json().unwrap());

    println!("\n=== Example Complete ===");
}
