//! Cleaned-table writer.
//!
//! Produces `{base}_cleaned_{YYYYMMDD_HHMMSS}.{ext}` next to the input file
//! (current directory when the input has no parent), carrying every column
//! of the cleaned table plus the derived Total and Month columns. An Excel
//! write that fails falls back to CSV under the same base name; the fallback
//! is a warning, never an error.

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use csv::QuoteStyle;
use log::warn;
use rust_xlsxwriter::Workbook;

use crate::aggregate::RowMetrics;
use crate::cli::OutputFormat;
use crate::data::CellValue;
use crate::table::TableModel;

pub fn write_cleaned(
    table: &TableModel,
    metrics: &[RowMetrics],
    input: &Path,
    format: OutputFormat,
) -> Result<PathBuf> {
    let dir = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => env::current_dir().context("Resolving current directory")?,
    };
    fs::create_dir_all(&dir).with_context(|| format!("Creating output directory {dir:?}"))?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let base = format!("{stem}_cleaned_{timestamp}");

    match format {
        OutputFormat::Csv => {
            let path = dir.join(format!("{base}.csv"));
            write_csv(table, metrics, &path)?;
            Ok(path)
        }
        OutputFormat::Excel => {
            let path = dir.join(format!("{base}.xlsx"));
            match write_excel(table, metrics, &path) {
                Ok(()) => Ok(path),
                Err(err) => {
                    warn!("Excel save failed ({err:#}), saving as CSV instead.");
                    let fallback = dir.join(format!("{base}.csv"));
                    write_csv(table, metrics, &fallback)?;
                    Ok(fallback)
                }
            }
        }
    }
}

fn output_headers(table: &TableModel) -> Vec<String> {
    let mut headers: Vec<String> = table
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    headers.push("Total".to_string());
    headers.push("Month".to_string());
    headers
}

fn write_csv(table: &TableModel, metrics: &[RowMetrics], path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)
        .with_context(|| format!("Creating output file {path:?}"))?;

    writer.write_record(output_headers(table))?;
    for (row, metric) in metrics.iter().enumerate() {
        let mut record = table.render_row(row);
        record.push(CellValue::Number(metric.total).as_display());
        record.push(metric.month.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_excel(table: &TableModel, metrics: &[RowMetrics], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in output_headers(table).iter().enumerate() {
        worksheet.write_string(0, col as u16, header.as_str())?;
    }
    let total_col = table.column_count() as u16;
    for (row, metric) in metrics.iter().enumerate() {
        let excel_row = (row + 1) as u32;
        for col in 0..table.column_count() {
            match table.cell(row, col) {
                Some(CellValue::Number(n)) => {
                    worksheet.write_number(excel_row, col as u16, *n)?;
                }
                Some(cell) => {
                    worksheet.write_string(excel_row, col as u16, cell.as_display())?;
                }
                None => {}
            }
        }
        worksheet.write_number(excel_row, total_col, metric.total)?;
        worksheet.write_number(excel_row, total_col + 1, metric.month as f64)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Saving workbook {path:?}"))?;
    Ok(())
}
