//! Orchestration of a single analysis run.
//!
//! Load, infer, clean, and aggregate run as one synchronous sequence; the
//! report, charts, and output writer consume the results afterwards. Only
//! loading and writing touch the filesystem.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    aggregate::{self, AggregationResult},
    chart::{self, TextCharts},
    clean,
    cli::AnalyzeArgs,
    infer::{self, NamedRoles},
    load, output, report,
};

#[derive(Serialize)]
struct JsonSummary<'a> {
    roles: &'a NamedRoles,
    rows_in: usize,
    rows_out: usize,
    summary: &'a AggregationResult,
}

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    info!("Selected file: {}", args.input.display());

    let table = load::load_dataset(&args.input, args.delimiter, args.input_encoding.as_deref())
        .with_context(|| format!("Loading dataset {:?}", args.input))?;
    let roles = infer::infer(&table)?;
    let named = roles.named(&table);
    info!(
        "Auto-detected: Date={}, Product={}, Qty={}, Price={}",
        named.date, named.product, named.quantity, named.price
    );

    let cleaned = clean::clean(&table, &roles)?;
    info!(
        "Cleaning kept {} of {} row(s)",
        cleaned.row_count(),
        table.row_count()
    );

    let result = aggregate::aggregate(&cleaned, &roles);

    if args.json {
        let summary = JsonSummary {
            roles: &named,
            rows_in: table.row_count(),
            rows_out: cleaned.row_count(),
            summary: &result,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", report::render_summary(&cleaned, &named, &result));
    }

    if !args.no_charts && !args.json {
        chart::render_all(&mut TextCharts::default(), &result);
    }

    if !args.no_save {
        let metrics = aggregate::derive_rows(&cleaned, &roles);
        let saved = output::write_cleaned(&cleaned, &metrics, &args.input, args.format)
            .context("Writing cleaned dataset")?;
        info!("Done. Saved: {}", saved.display());
    }

    Ok(())
}
