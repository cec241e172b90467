//! Named transforms and pipelines of them.
//!
//! An [`Operation`] is one of the three table transforms together with its
//! parameter. Operations can be built from a name (as a CLI or script would
//! pass it) or deserialized from JSON:
//!
//! ```json
//! {"steps": [
//!     {"op": "rolling_average", "windowSize": 3},
//!     {"op": "discretize", "numBins": 4}
//! ]}
//! ```

use crate::discretize::discretize;
use crate::error::{Result, TableError};
use crate::rolling::{rolling_average, rolling_median};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    #[serde(alias = "rollingAverage")]
    RollingAverage {
        #[serde(rename = "windowSize", alias = "window_size")]
        window_size: usize,
    },
    #[serde(alias = "rollingMedian")]
    RollingMedian {
        #[serde(rename = "windowSize", alias = "window_size")]
        window_size: usize,
    },
    #[serde(alias = "discretize_column", alias = "discretizeColumn")]
    Discretize {
        #[serde(rename = "numBins", alias = "num_bins")]
        num_bins: usize,
    },
}

impl Operation {
    /// Build an operation from its name and single integer parameter.
    ///
    /// Accepts: "rolling_average", "rolling_median", "discretize" (or
    /// "discretize_column"), in snake_case or camelCase, case-insensitive.
    /// `param` is the window size or the number of bins.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolltable::Operation;
    ///
    /// let op = Operation::from_name("rollingMedian", 5).unwrap();
    /// assert_eq!(op, Operation::RollingMedian { window_size: 5 });
    /// assert!(Operation::from_name("rolling_sum", 5).is_err());
    /// ```
    pub fn from_name(name: &str, param: usize) -> Result<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "rollingaverage" => Ok(Operation::RollingAverage { window_size: param }),
            "rollingmedian" => Ok(Operation::RollingMedian { window_size: param }),
            "discretize" | "discretizecolumn" => Ok(Operation::Discretize { num_bins: param }),
            _ => Err(TableError::UnknownOperation(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::RollingAverage { .. } => "rolling_average",
            Operation::RollingMedian { .. } => "rolling_median",
            Operation::Discretize { .. } => "discretize",
        }
    }

    /// Run the operation, consuming the input table.
    ///
    /// Rolling operations build a new table; `Discretize` appends to the
    /// given table and hands it back.
    pub fn apply(&self, table: Table) -> Result<Table> {
        match *self {
            Operation::RollingAverage { window_size } => rolling_average(&table, window_size),
            Operation::RollingMedian { window_size } => rolling_median(&table, window_size),
            Operation::Discretize { num_bins } => {
                let mut table = table;
                discretize(&mut table, num_bins)?;
                Ok(table)
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::RollingAverage { window_size }
            | Operation::RollingMedian { window_size } => {
                write!(f, "{}(windowSize={})", self.name(), window_size)
            }
            Operation::Discretize { num_bins } => {
                write!(f, "{}(numBins={})", self.name(), num_bins)
            }
        }
    }
}

/// An ordered list of operations applied one after another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub steps: Vec<Operation>,
}

impl Pipeline {
    pub fn new(steps: Vec<Operation>) -> Self {
        Pipeline { steps }
    }

    /// Parse a pipeline from JSON of the form `{"steps": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step in order. Stops at the first failing step.
    pub fn run(&self, table: Table) -> Result<Table> {
        self.steps
            .iter()
            .enumerate()
            .try_fold(table, |table, (i, op)| {
                log::info!("step {}/{}: {} on '{}'", i + 1, self.steps.len(), op, table.name());
                op.apply(table)
            })
    }
}
