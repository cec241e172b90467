/// Column Transforms Example
///
/// This example demonstrates:
/// - Rolling average with a shrinking start window
/// - Rolling median with an undefined (NULL) prefix
/// - Discretizing the first column into equal-width bins, in place
/// - Running the same steps as a JSON pipeline

use rolltable::{discretize, rolling_average, rolling_median, Pipeline, Table};

fn main() {
    println!("=== RollTable Transforms Example ===\n");

    let csv = "price,ticker\n10,ACME\n12,ACME\n11,ACME\n15,ACME\n14,ACME\n20,ACME\n";
    let prices = Table::from_csv("prices", csv).unwrap();

    println!("1. Rolling average (window 3):");
    let avg = rolling_average(&prices, 3).unwrap();
    print!("{}", avg.to_csv());

    println!("\n2. Rolling median (window 3):");
    let med = rolling_median(&prices, 3).unwrap();
    print!("{}", med.to_csv());

    println!("\n3. Discretize price into 4 bins (appends to the same table):");
    let mut binned = prices.clone();
    discretize(&mut binned, 4).unwrap();
    print!("{}", binned.to_csv());

    println!("\n4. Pipeline from JSON:");
    let pipeline = Pipeline::from_json(
        r#"{"steps": [
            {"op": "rolling_median", "windowSize": 1},
            {"op": "discretize", "numBins": 2}
        ]}"#,
    )
    .unwrap();
    let out = pipeline.run(prices).unwrap();
    print!("{}", out.to_csv());

    println!("\n=== Example Complete ===");
}
