use anyhow::{Context, Result};
use log::info;

use crate::{cli::PreviewArgs, dataset::TabularDataset, io_utils, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = TabularDataset::load(&args.input, delimiter, encoding, None)
        .with_context(|| format!("Reading dataset from {:?}", args.input))?;

    let shown = args.rows.min(dataset.row_count());
    let rows = (0..shown)
        .map(|row| dataset.row_cells(row).to_vec())
        .collect::<Vec<_>>();
    table::print_table(dataset.columns(), &rows);
    info!(
        "Displayed {} of {} row(s) across {} column(s) from {:?}",
        shown,
        dataset.row_count(),
        dataset.column_count(),
        args.input
    );
    Ok(())
}
