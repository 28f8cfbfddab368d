pub mod analyze;
pub mod analyzer;
pub mod chart;
pub mod cli;
pub mod credentials;
pub mod dataset;
pub mod insight;
pub mod io_utils;
pub mod preview;
pub mod stats;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => preview::execute(&args),
        Commands::Stats(args) => stats::execute(&args),
        Commands::Analyze(args) => analyze::execute(&args),
        Commands::Chart(args) => chart::execute(&args),
        Commands::Config(args) => credentials::execute(&args),
    }
}
