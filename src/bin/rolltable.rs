/// RollTable command-line tool
///
/// Loads a CSV or JSON table, applies one named transform or a JSON pipeline,
/// and writes the result as CSV or JSON.

use clap::Parser;
use rolltable::{Operation, Pipeline, Table};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "rolltable")]
#[command(version)]
#[command(about = "Rolling average, rolling median and equal-width binning for tabular data")]
#[command(long_about = "Apply column transforms to a CSV or JSON table.

EXAMPLES:
  # 3-row moving average of every numeric column
  rolltable prices.csv --op rolling_average --param 3

  # Bin the first column into 10 equal-width bins, write JSON
  rolltable scores.csv --op discretize --param 10 --format json

  # Run a pipeline file: {\"steps\": [{\"op\": \"rolling_median\", \"windowSize\": 5}]}
  rolltable data.json --pipeline steps.json -o out.csv")]
struct Args {
    /// Input table (CSV or JSON array of objects)
    input: String,

    /// Operation name: rolling_average, rolling_median or discretize
    #[arg(long, value_name = "NAME", requires = "param", conflicts_with = "pipeline")]
    op: Option<String>,

    /// Window size or number of bins for --op
    #[arg(long, value_name = "N", requires = "op")]
    param: Option<usize>,

    /// JSON pipeline file with a list of steps
    #[arg(long, value_name = "FILE")]
    pipeline: Option<String>,

    /// Input format (defaults to the input file extension)
    #[arg(long, value_parser = ["csv", "json"], value_name = "FORMAT")]
    input_format: Option<String>,

    /// Output format (defaults to the output file extension, then csv)
    #[arg(long, value_parser = ["csv", "json"], value_name = "FORMAT")]
    format: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let pipeline = resolve_pipeline(&args)?;

    let name = Path::new(&args.input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();
    let text = fs::read_to_string(&args.input)?;
    let table = match input_format(&args).as_str() {
        "json" => Table::from_json(&name, &text)?,
        _ => Table::from_csv(&name, &text)?,
    };
    log::info!(
        "loaded '{}': {} rows, {} columns",
        table.name(),
        table.len(),
        table.num_columns()
    );

    let result = pipeline.run(table)?;

    let rendered = match output_format(&args).as_str() {
        "json" => result.to_json()?,
        _ => result.to_csv(),
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            log::info!("wrote {} rows to {}", result.len(), path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// A single `--op`/`--param` step, or the steps of a `--pipeline` file.
fn resolve_pipeline(args: &Args) -> Result<Pipeline, Box<dyn Error>> {
    match (&args.op, args.param, &args.pipeline) {
        (Some(name), Some(param), None) => {
            Ok(Pipeline::new(vec![Operation::from_name(name, param)?]))
        }
        (None, None, Some(path)) => Ok(Pipeline::from_json(&fs::read_to_string(path)?)?),
        (None, Some(_), _) => Err("--param needs --op".into()),
        _ => Err("either --op with --param or --pipeline is required".into()),
    }
}

/// `--input-format`, else the input extension, else csv
fn input_format(args: &Args) -> String {
    args.input_format
        .clone()
        .or_else(|| extension(&args.input))
        .unwrap_or_else(|| "csv".to_string())
}

/// `--format`, else the output extension, else csv
fn output_format(args: &Args) -> String {
    args.format
        .clone()
        .or_else(|| args.output.as_deref().and_then(extension))
        .unwrap_or_else(|| "csv".to_string())
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| e == "csv" || e == "json")
}
