//! The end-to-end analysis pipeline behind the `analyze` subcommand:
//! dataset → statistics → insights and chart series. The run either fully
//! succeeds or fails before anything is printed; only analyzer problems are
//! recovered (by local insight generation).

use std::fs;

use anyhow::{Context, Result};
use log::info;

use crate::{
    analyzer::{self, Analyzer},
    chart,
    cli::AnalyzeArgs,
    credentials::{self, CredentialStore},
    dataset::TabularDataset,
    insight, io_utils,
    stats::compute_stats,
};

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

    info!(
        "Analyzing '{}' with delimiter '{}'",
        args.input.display(),
        io_utils::printable_delimiter(delimiter)
    );
    let dataset = TabularDataset::load(&args.input, delimiter, encoding, None)
        .with_context(|| format!("Reading dataset from {:?}", args.input))?;
    let stats = compute_stats(&dataset)?;

    let analyzer: Option<Box<dyn Analyzer>> = if args.offline {
        None
    } else {
        let path = credentials::resolve_path(args.credentials.as_deref())?;
        let store = CredentialStore::load(&path)?;
        let provider = args.provider.as_deref().unwrap_or(analyzer::DEFAULT_PROVIDER);
        Some(
            analyzer::for_provider(provider, &store)
                .with_context(|| format!("Selecting analyzer provider '{provider}'"))?,
        )
    };

    if let Some(path) = &args.digest_out {
        let digest = insight::build_digest(&dataset, &stats);
        let rendered =
            serde_json::to_string_pretty(&digest).context("Serializing analyzer digest")?;
        fs::write(path, rendered)
            .with_context(|| format!("Writing analyzer digest to {path:?}"))?;
        info!("Wrote analyzer digest to {path:?}");
    }

    let insights = insight::compose_insights(&dataset, &stats, analyzer.as_deref());
    let spec = chart::select_chart_series(&dataset, &stats);

    for (idx, insight) in insights.iter().enumerate() {
        println!("{}. {insight}", idx + 1);
    }

    if let Some(path) = &args.chart_out {
        let rendered =
            serde_json::to_string_pretty(&spec).context("Serializing chart specification")?;
        fs::write(path, rendered)
            .with_context(|| format!("Writing chart specification to {path:?}"))?;
        info!("Wrote {} chart specification to {path:?}", spec.kind());
    }

    info!(
        "Produced {} insight(s) and a {} chart for {} row(s) across {} column(s)",
        insights.len(),
        spec.kind(),
        stats.total_rows,
        stats.total_columns
    );
    Ok(())
}
