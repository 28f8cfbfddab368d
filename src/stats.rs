//! Column classification and descriptive statistics.
//!
//! A column is numeric when strictly more than half of its cells parse as a
//! finite float; everything else is categorical. Numeric columns carry count,
//! sum, mean, min, max, and median of the cells that parsed. The computation
//! is a pure function of the dataset and is recomputed on every analysis.

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::{cli::StatsArgs, dataset::TabularDataset, io_utils, table};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("dataset has no rows to analyze")]
pub struct EmptyDatasetError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<String>,
    /// Numeric column names in declaration order.
    pub numeric_columns: Vec<String>,
    pub profiles: BTreeMap<String, ColumnProfile>,
}

impl DatasetStats {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric_columns.iter().any(|name| name == column)
    }
}

/// Attempts to read one cell as a number. Cells that are empty, non-numeric,
/// or parse to a non-finite value do not count towards the numeric majority.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn compute_stats(dataset: &TabularDataset) -> Result<DatasetStats, EmptyDatasetError> {
    if dataset.is_empty() {
        return Err(EmptyDatasetError);
    }

    let row_count = dataset.row_count();
    let mut numeric_columns = Vec::new();
    let mut profiles = BTreeMap::new();

    for (idx, name) in dataset.columns().iter().enumerate() {
        let values: Vec<f64> = dataset
            .column_values(idx)
            .filter_map(parse_numeric)
            .collect();
        // Strictly more than half: exactly half stays categorical.
        if values.len() as f64 > row_count as f64 / 2.0 {
            numeric_columns.push(name.clone());
            profiles.insert(name.clone(), ColumnProfile::from_values(&values));
        }
    }

    Ok(DatasetStats {
        total_rows: row_count,
        total_columns: dataset.column_count(),
        columns: dataset.columns().to_vec(),
        numeric_columns,
        profiles,
    })
}

impl ColumnProfile {
    fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            min = min.min(*value);
            max = max.max(*value);
        }
        Self {
            count,
            sum,
            mean: sum / count as f64,
            min,
            max,
            median: median(values),
        }
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn execute(args: &StatsArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let limit = (args.limit > 0).then_some(args.limit);

    let dataset = TabularDataset::load(&args.input, delimiter, encoding, limit)
        .with_context(|| format!("Reading dataset from {:?}", args.input))?;
    let stats = compute_stats(&dataset)?;

    let selected = resolve_columns(&stats, &args.columns)?;
    if selected.is_empty() {
        return Err(anyhow!(
            "No numeric columns found. Statistics require a numeric majority per column."
        ));
    }

    let headers = ["column", "count", "mean", "min", "max", "median"]
        .map(String::from)
        .to_vec();
    let rows = selected
        .iter()
        .filter_map(|name| stats.profiles.get(name).map(|profile| (name, profile)))
        .map(|(name, profile)| {
            vec![
                name.clone(),
                profile.count.to_string(),
                format_number(profile.mean),
                format_number(profile.min),
                format_number(profile.max),
                format_number(profile.median),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    info!(
        "Computed summary statistics for {} of {} column(s) in {:?}",
        rows.len(),
        stats.total_columns,
        args.input
    );
    Ok(())
}

fn resolve_columns(stats: &DatasetStats, specified: &[String]) -> Result<Vec<String>> {
    if specified.is_empty() {
        return Ok(stats.numeric_columns.clone());
    }
    specified
        .iter()
        .map(|name| {
            if !stats.columns.iter().any(|column| column == name) {
                Err(anyhow!("Column '{name}' not found in dataset"))
            } else if !stats.is_numeric(name) {
                Err(anyhow!(
                    "Column '{name}' is categorical and cannot be profiled for statistics"
                ))
            } else {
                Ok(name.clone())
            }
        })
        .collect()
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}
