use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze CSV files: statistics, charts, insights", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Preview the first few rows of a CSV file in a formatted table
    Preview(PreviewArgs),
    /// Produce summary statistics for numeric columns
    Stats(StatsArgs),
    /// Run the full analysis: insights plus a chart-ready data series
    Analyze(AnalyzeArgs),
    /// Emit the chart specification for a CSV file as JSON
    Chart(ChartArgs),
    /// Manage analyzer provider credentials
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Input CSV file to profile
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Columns to include (defaults to all numeric columns)
    #[arg(short = 'C', long = "columns", action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Maximum rows to scan (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Input CSV file to analyze
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Analyzer provider to use when a credential is configured
    #[arg(long)]
    pub provider: Option<String>,
    /// Credential file path (defaults to the user configuration directory)
    #[arg(long)]
    pub credentials: Option<PathBuf>,
    /// Skip the external analyzer and use local insight generation only
    #[arg(long)]
    pub offline: bool,
    /// Write the chart specification JSON to this path
    #[arg(long = "chart-out")]
    pub chart_out: Option<PathBuf>,
    /// Write the analyzer digest JSON to this path
    #[arg(long = "digest-out")]
    pub digest_out: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Input CSV file to shape into a chart series
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Provider the credential belongs to (openai, baidu)
    #[arg(short = 'p', long)]
    pub provider: Option<String>,
    /// Single API key credential
    #[arg(long = "api-key")]
    pub api_key: Option<String>,
    /// Client id half of an id/secret credential pair
    #[arg(long = "client-id")]
    pub client_id: Option<String>,
    /// Client secret half of an id/secret credential pair
    #[arg(long = "client-secret")]
    pub client_secret: Option<String>,
    /// Remove the stored credential for the provider
    #[arg(long)]
    pub clear: bool,
    /// List stored credentials with masked secrets
    #[arg(long)]
    pub list: bool,
    /// Credential file path (defaults to the user configuration directory)
    #[arg(long)]
    pub credentials: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
