pub mod aggregate;
pub mod analysis;
pub mod chart;
pub mod clean;
pub mod cli;
pub mod data;
pub mod error;
pub mod infer;
pub mod io_utils;
pub mod load;
pub mod output;
pub mod profile;
pub mod report;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use crate::cli::{Cli, Commands, PreviewArgs, RolesArgs};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("salescope", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => analysis::execute(&args),
        Commands::Roles(args) => handle_roles(&args),
        Commands::Preview(args) => handle_preview(&args),
    }
}

fn handle_roles(args: &RolesArgs) -> Result<()> {
    let table = load::load_dataset(&args.input, args.delimiter, args.input_encoding.as_deref())
        .with_context(|| format!("Loading dataset {:?}", args.input))?;
    let roles = infer::infer(&table)?;
    let named = roles.named(&table);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&named)?);
    } else {
        let rows = vec![
            vec!["date".to_string(), named.date],
            vec!["product".to_string(), named.product],
            vec!["quantity".to_string(), named.quantity],
            vec!["price".to_string(), named.price],
        ];
        print!("{}", report::render_table(&["role", "column"], &rows));
    }
    Ok(())
}

fn handle_preview(args: &PreviewArgs) -> Result<()> {
    let table = load::load_dataset(&args.input, args.delimiter, args.input_encoding.as_deref())
        .with_context(|| format!("Loading dataset {:?}", args.input))?;
    let headers: Vec<String> = table
        .columns()
        .iter()
        .map(|column| format!("{} ({:?})", column.name, column.kind).to_lowercase())
        .collect();
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = (0..table.row_count().min(args.rows))
        .map(|row| table.render_row(row))
        .collect();
    print!("{}", report::render_table(&header_refs, &rows));
    info!(
        "Previewed {} of {} row(s) from {}",
        rows.len(),
        table.row_count(),
        args.input.display()
    );
    Ok(())
}
