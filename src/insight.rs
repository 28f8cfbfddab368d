//! Narrative insight generation.
//!
//! When an analyzer capability is configured, the composer hands it a bounded
//! digest of the dataset and returns whatever it narrates. Any analyzer
//! failure is logged and recovered by the deterministic local template below,
//! so an analysis never fails because a provider did.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};
use serde::Serialize;

use crate::{
    analyzer::Analyzer,
    dataset::TabularDataset,
    stats::{ColumnProfile, DatasetStats},
};

/// Rows of the dataset included verbatim in the analyzer digest.
pub const DIGEST_SAMPLE_ROWS: usize = 3;

const COMPLEX_COLUMN_THRESHOLD: usize = 10;
const MODELING_ROW_THRESHOLD: usize = 1000;

/// One paragraph of narrative text. Opaque to the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Insight(String);

impl Insight {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize)]
pub struct DigestOverview {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: Vec<String>,
}

/// Bounded summary handed to an analyzer: overview fields, the numeric-column
/// statistics, the ordered column names, and a small sample of rows aligned
/// with those names.
#[derive(Debug, Serialize)]
pub struct AnalysisDigest {
    pub overview: DigestOverview,
    pub statistics: BTreeMap<String, ColumnProfile>,
    pub columns: Vec<String>,
    pub sample_rows: Vec<Vec<String>>,
}

pub fn build_digest(dataset: &TabularDataset, stats: &DatasetStats) -> AnalysisDigest {
    let sample_rows = (0..dataset.row_count().min(DIGEST_SAMPLE_ROWS))
        .map(|row| dataset.row_cells(row).to_vec())
        .collect();
    AnalysisDigest {
        overview: DigestOverview {
            rows: stats.total_rows,
            columns: stats.total_columns,
            numeric_columns: stats.numeric_columns.clone(),
        },
        statistics: stats.profiles.clone(),
        columns: stats.columns.clone(),
        sample_rows,
    }
}

/// Produces the ordered insight list for one analysis run. Delegates to the
/// analyzer when it holds a credential; otherwise, or on any analyzer error,
/// falls back to [`local_insights`].
pub fn compose_insights(
    dataset: &TabularDataset,
    stats: &DatasetStats,
    analyzer: Option<&dyn Analyzer>,
) -> Vec<Insight> {
    if let Some(analyzer) = analyzer {
        if analyzer.is_configured() {
            let digest = build_digest(dataset, stats);
            match analyzer.analyze(&digest) {
                Ok(insights) if !insights.is_empty() => return insights,
                Ok(_) => warn!(
                    "Analyzer '{}' returned no insights; falling back to local analysis",
                    analyzer.name()
                ),
                Err(err) => warn!(
                    "Analyzer '{}' failed ({err}); falling back to local analysis",
                    analyzer.name()
                ),
            }
        } else {
            debug!(
                "Analyzer '{}' has no credential; using local analysis",
                analyzer.name()
            );
        }
    }
    local_insights(dataset, stats)
}

/// Deterministic template analysis. Emits four to six insights in a fixed
/// order: overview, type distribution, first-numeric-column highlight,
/// completeness, correlation suggestion, closing remark.
pub fn local_insights(dataset: &TabularDataset, stats: &DatasetStats) -> Vec<Insight> {
    let mut insights = Vec::with_capacity(6);

    let structure = if stats.total_columns > COMPLEX_COLUMN_THRESHOLD {
        "fairly complex"
    } else {
        "relatively simple"
    };
    insights.push(Insight::new(format!(
        "Data overview: the dataset holds {} record(s) across {} field(s); its structure is {structure}.",
        stats.total_rows, stats.total_columns
    )));

    let numeric_ratio = round1(
        stats.numeric_columns.len() as f64 / stats.total_columns as f64 * 100.0,
    );
    let ratio_remark = if numeric_ratio > 50.0 {
        "well suited to statistical analysis"
    } else {
        "leaning towards text, better suited to categorical analysis"
    };
    insights.push(Insight::new(format!(
        "Type distribution: numeric fields make up {numeric_ratio:.1}% of all columns, {ratio_remark}."
    )));

    if let Some(first) = stats.numeric_columns.first()
        && let Some(profile) = stats.profiles.get(first)
    {
        // A zero mean would divide away; report it as stable instead.
        let volatile = profile.mean != 0.0 && (profile.max - profile.min) / profile.mean > 1.0;
        let spread_remark = if volatile {
            "its spread is wide, so values fluctuate noticeably"
        } else {
            "its spread is narrow, so values stay relatively stable"
        };
        insights.push(Insight::new(format!(
            "Key metric: \"{first}\" averages {:.2}; {spread_remark}.",
            profile.mean
        )));
    }

    if let Some(record) = dataset.record(0) {
        let empty_fields = record
            .values()
            .filter(|value| value.trim().is_empty())
            .count();
        let completeness = round1(
            (stats.total_columns - empty_fields) as f64 / stats.total_columns as f64 * 100.0,
        );
        let quality_remark = if completeness > 90.0 {
            "quality looks excellent"
        } else {
            "consider cleansing the data before deeper analysis"
        };
        insights.push(Insight::new(format!(
            "Data completeness: the sampled record is {completeness:.1}% complete; {quality_remark}."
        )));
    }

    if stats.numeric_columns.len() >= 2 {
        insights.push(Insight::new(format!(
            "Suggested follow-up: explore the correlation between \"{}\" and \"{}\".",
            stats.numeric_columns[0], stats.numeric_columns[1]
        )));
    }

    let closing = if stats.total_rows > MODELING_ROW_THRESHOLD {
        "the volume is sufficient for modeling work"
    } else {
        "collecting more data would improve analysis accuracy"
    };
    insights.push(Insight::new(format!(
        "Outlook: judging by its shape, {closing}."
    )));

    insights
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
