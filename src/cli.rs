use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze sales data with automatic column detection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full analysis: detect roles, clean, aggregate, and save
    Analyze(AnalyzeArgs),
    /// Detect the date/product/quantity/price columns without cleaning
    Roles(RolesArgs),
    /// Show the first few rows of a dataset with detected column kinds
    Preview(PreviewArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Excel,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Input dataset (.csv, .tsv, .xls, .xlsx, or .json)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Format for the cleaned output file
    #[arg(short = 'f', long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormat,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit the summary as JSON instead of tables
    #[arg(long)]
    pub json: bool,
    /// Skip ASCII chart rendering
    #[arg(long = "no-charts")]
    pub no_charts: bool,
    /// Skip writing the cleaned dataset
    #[arg(long = "no-save")]
    pub no_save: bool,
}

#[derive(Debug, Args)]
pub struct RolesArgs {
    /// Input dataset (.csv, .tsv, .xls, .xlsx, or .json)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit the role assignment as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input dataset (.csv, .tsv, .xls, .xlsx, or .json)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
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
