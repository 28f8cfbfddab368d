//! Chart shape selection over a profiled dataset.
//!
//! Pure shaping, no rendering: the selected variant serializes to JSON for an
//! external chart renderer. The shape follows the numeric column count —
//! none: categorical distribution of the first column; one: sorted value
//! distribution; several: side-by-side series comparison.

use std::{collections::HashMap, fs};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::ChartArgs,
    dataset::TabularDataset,
    io_utils,
    stats::{self, DatasetStats, compute_stats},
};

pub const MAX_CATEGORIES: usize = 10;
pub const MAX_COMPARISON_COLUMNS: usize = 3;
pub const MAX_SERIES_POINTS: usize = 20;

/// Label used in place of empty cells when counting categories.
pub const EMPTY_LABEL: &str = "<empty>";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Categorical {
        column: String,
        top_categories: Vec<CategoryCount>,
    },
    Distribution {
        column: String,
        sorted_values: Vec<f64>,
    },
    Comparison {
        columns: Vec<String>,
        series: Vec<Vec<f64>>,
    },
}

impl ChartSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ChartSpec::Categorical { .. } => "categorical",
            ChartSpec::Distribution { .. } => "distribution",
            ChartSpec::Comparison { .. } => "comparison",
        }
    }
}

pub fn select_chart_series(dataset: &TabularDataset, stats: &DatasetStats) -> ChartSpec {
    match stats.numeric_columns.len() {
        0 => categorical_spec(dataset, stats),
        1 => distribution_spec(dataset, &stats.numeric_columns[0]),
        _ => comparison_spec(dataset, stats),
    }
}

fn categorical_spec(dataset: &TabularDataset, stats: &DatasetStats) -> ChartSpec {
    let column = stats.columns.first().cloned().unwrap_or_default();
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    if let Some(column_idx) = dataset.column_index(&column) {
        for value in dataset.column_values(column_idx) {
            let label = if value.trim().is_empty() {
                EMPTY_LABEL.to_string()
            } else {
                value.to_string()
            };
            match index.get(&label) {
                Some(&slot) => counts[slot].count += 1,
                None => {
                    index.insert(label.clone(), counts.len());
                    counts.push(CategoryCount { label, count: 1 });
                }
            }
        }
    }

    // Stable sort keeps first-seen order for equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(MAX_CATEGORIES);
    ChartSpec::Categorical {
        column,
        top_categories: counts,
    }
}

fn distribution_spec(dataset: &TabularDataset, column: &str) -> ChartSpec {
    let mut values: Vec<f64> = dataset
        .column_index(column)
        .map(|idx| {
            dataset
                .column_values(idx)
                .filter_map(stats::parse_numeric)
                .collect()
        })
        .unwrap_or_default();
    values.sort_by(f64::total_cmp);
    ChartSpec::Distribution {
        column: column.to_string(),
        sorted_values: values,
    }
}

fn comparison_spec(dataset: &TabularDataset, stats: &DatasetStats) -> ChartSpec {
    let columns: Vec<String> = stats
        .numeric_columns
        .iter()
        .take(MAX_COMPARISON_COLUMNS)
        .cloned()
        .collect();
    let series = columns
        .iter()
        .map(|column| {
            dataset
                .column_index(column)
                .map(|idx| {
                    dataset
                        .column_values(idx)
                        .filter_map(stats::parse_numeric)
                        .take(MAX_SERIES_POINTS)
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();
    ChartSpec::Comparison { columns, series }
}

pub fn execute(args: &ChartArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = TabularDataset::load(&args.input, delimiter, encoding, None)
        .with_context(|| format!("Reading dataset from {:?}", args.input))?;
    let stats = compute_stats(&dataset)?;
    let spec = select_chart_series(&dataset, &stats);
    let rendered =
        serde_json::to_string_pretty(&spec).context("Serializing chart specification")?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Writing chart specification to {path:?}"))?;
            info!(
                "Wrote {} chart specification for {:?} to {:?}",
                spec.kind(),
                args.input,
                path
            );
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> TabularDataset {
        TabularDataset::from_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn no_numeric_columns_selects_categorical() {
        let data = dataset(
            &["city", "state"],
            &[&["NY", "NY"], &["LA", "CA"], &["NY", "NY"]],
        );
        let stats = compute_stats(&data).expect("stats");
        let spec = select_chart_series(&data, &stats);
        match spec {
            ChartSpec::Categorical {
                column,
                top_categories,
            } => {
                assert_eq!(column, "city");
                assert_eq!(top_categories[0].label, "NY");
                assert_eq!(top_categories[0].count, 2);
                assert_eq!(top_categories[1].label, "LA");
            }
            other => panic!("expected categorical, got {}", other.kind()),
        }
    }

    #[test]
    fn category_ties_keep_first_seen_order_and_cap_at_ten() {
        let rows: Vec<Vec<String>> = (0..12)
            .map(|n| vec![format!("cat{n:02}")])
            .collect();
        let data = TabularDataset::from_rows(vec!["label".into()], rows);
        let stats = compute_stats(&data).expect("stats");
        match select_chart_series(&data, &stats) {
            ChartSpec::Categorical { top_categories, .. } => {
                assert_eq!(top_categories.len(), MAX_CATEGORIES);
                assert_eq!(top_categories[0].label, "cat00");
                assert_eq!(top_categories[9].label, "cat09");
            }
            other => panic!("expected categorical, got {}", other.kind()),
        }
    }

    #[test]
    fn empty_cells_are_counted_under_the_empty_label() {
        let data = dataset(&["city"], &[&[""], &["NY"], &[" "]]);
        let stats = compute_stats(&data).expect("stats");
        match select_chart_series(&data, &stats) {
            ChartSpec::Categorical { top_categories, .. } => {
                assert_eq!(top_categories[0].label, EMPTY_LABEL);
                assert_eq!(top_categories[0].count, 2);
            }
            other => panic!("expected categorical, got {}", other.kind()),
        }
    }

    #[test]
    fn single_numeric_column_selects_sorted_distribution() {
        let data = dataset(&["score"], &[&["9"], &["1"], &["5"], &["x"]]);
        let stats = compute_stats(&data).expect("stats");
        match select_chart_series(&data, &stats) {
            ChartSpec::Distribution {
                column,
                sorted_values,
            } => {
                assert_eq!(column, "score");
                assert_eq!(sorted_values, vec![1.0, 5.0, 9.0]);
            }
            other => panic!("expected distribution, got {}", other.kind()),
        }
    }

    #[test]
    fn multiple_numeric_columns_select_comparison_in_row_order() {
        let data = dataset(
            &["a", "b", "c", "d"],
            &[
                &["3", "30", "300", "3000"],
                &["1", "10", "100", "1000"],
                &["2", "20", "200", "2000"],
            ],
        );
        let stats = compute_stats(&data).expect("stats");
        match select_chart_series(&data, &stats) {
            ChartSpec::Comparison { columns, series } => {
                assert_eq!(columns, ["a", "b", "c"]);
                assert_eq!(series[0], vec![3.0, 1.0, 2.0]);
                assert_eq!(series[1], vec![30.0, 10.0, 20.0]);
            }
            other => panic!("expected comparison, got {}", other.kind()),
        }
    }

    #[test]
    fn comparison_series_cap_at_twenty_points() {
        let rows: Vec<Vec<String>> = (0..25)
            .map(|n| vec![n.to_string(), (n * 2).to_string()])
            .collect();
        let data = TabularDataset::from_rows(vec!["x".into(), "y".into()], rows);
        let stats = compute_stats(&data).expect("stats");
        match select_chart_series(&data, &stats) {
            ChartSpec::Comparison { series, .. } => {
                assert_eq!(series[0].len(), MAX_SERIES_POINTS);
                assert_eq!(series[0][0], 0.0);
                assert_eq!(series[0][19], 19.0);
            }
            other => panic!("expected comparison, got {}", other.kind()),
        }
    }

    #[test]
    fn chart_spec_serializes_with_a_kind_tag() {
        let spec = ChartSpec::Distribution {
            column: "score".to_string(),
            sorted_values: vec![1.0, 2.0],
        };
        let json = serde_json::to_value(&spec).expect("serialize");
        assert_eq!(json["kind"], "distribution");
        assert_eq!(json["column"], "score");
    }
}
