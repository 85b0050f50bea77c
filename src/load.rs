//! Dataset loader: extension-dispatched readers that materialize a
//! [`TableModel`].
//!
//! The pipeline itself never touches the filesystem; everything the core
//! consumes arrives through this module. Column kinds are decided here: a
//! column whose non-null values are all numbers is numeric, Excel datetime
//! cells make a column temporal, everything else is textual.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use log::debug;

use crate::data::{parse_number, CellValue};
use crate::error::AnalysisError;
use crate::io_utils;
use crate::table::{Column, ColumnKind, TableModel};

/// Loads a dataset by extension: `.csv`/`.tsv`, `.xls`/`.xlsx`, `.json`.
pub fn load_dataset(
    path: &Path,
    delimiter: Option<u8>,
    encoding_label: Option<&str>,
) -> Result<TableModel> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" | "tsv" => load_csv(path, delimiter, encoding_label)?,
        "xls" | "xlsx" => load_excel(path)?,
        "json" => load_json(path)?,
        _ => {
            return Err(AnalysisError::UnsupportedFormat {
                extension: format!(".{extension}"),
            }
            .into())
        }
    };
    debug!(
        "Loaded {} column(s), {} row(s) from {}",
        table.column_count(),
        table.row_count(),
        path.display()
    );
    Ok(table)
}

fn load_csv(path: &Path, delimiter: Option<u8>, encoding_label: Option<&str>) -> Result<TableModel> {
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    let encoding = io_utils::resolve_encoding(encoding_label)?;
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;

    let header_record = reader.byte_headers()?.clone();
    let headers = io_utils::decode_record(&header_record, encoding)?;
    let mut cells: Vec<Vec<Option<CellValue>>> = vec![Vec::new(); headers.len()];

    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        for (idx, column) in cells.iter_mut().enumerate() {
            let value = match record.get(idx) {
                None => None,
                Some(field) if field.is_empty() => None,
                Some(field) => {
                    let decoded = io_utils::decode_bytes(field, encoding)?;
                    let trimmed = decoded.trim();
                    (!trimmed.is_empty()).then(|| CellValue::Text(trimmed.to_string()))
                }
            };
            column.push(value);
        }
    }

    Ok(build_table(headers, cells))
}

fn load_excel(path: &Path) -> Result<TableModel> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Opening workbook {path:?}"))?;
    let sheet_names = workbook.sheet_names().to_vec();
    let Some(sheet) = sheet_names.first() else {
        bail!("Workbook {path:?} has no sheets");
    };
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Reading sheet '{sheet}'"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(TableModel::new(Vec::new()));
    };
    let headers: Vec<String> = header_row.iter().map(excel_header).collect();
    let mut cells: Vec<Vec<Option<CellValue>>> = vec![Vec::new(); headers.len()];

    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).and_then(excel_cell));
        }
    }

    Ok(build_table(headers, cells))
}

fn excel_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn excel_cell(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Text(b.to_string())),
        Data::DateTime(dt) => dt.as_datetime().map(|ndt| CellValue::Date(ndt.date())),
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| CellValue::Text(trimmed.to_string()))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) => None,
    }
}

fn load_json(path: &Path) -> Result<TableModel> {
    let reader =
        BufReader::new(File::open(path).with_context(|| format!("Opening input file {path:?}"))?);
    let value: serde_json::Value =
        serde_json::from_reader(reader).with_context(|| format!("Parsing JSON in {path:?}"))?;
    let serde_json::Value::Array(records) = value else {
        bail!("JSON input must be a top-level array of objects");
    };

    // Column order follows first appearance across records.
    let mut headers: Vec<String> = Vec::new();
    for record in &records {
        if let serde_json::Value::Object(map) = record {
            for key in map.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    let mut cells: Vec<Vec<Option<CellValue>>> = vec![Vec::new(); headers.len()];
    for record in &records {
        let map = match record {
            serde_json::Value::Object(map) => map,
            _ => bail!("JSON records must be objects"),
        };
        for (idx, header) in headers.iter().enumerate() {
            cells[idx].push(map.get(header).and_then(json_cell));
        }
    }

    Ok(build_table(headers, cells))
}

fn json_cell(value: &serde_json::Value) -> Option<CellValue> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => n.as_f64().map(CellValue::Number),
        serde_json::Value::Bool(b) => Some(CellValue::Text(b.to_string())),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| CellValue::Text(trimmed.to_string()))
        }
        nested => Some(CellValue::Text(nested.to_string())),
    }
}

fn build_table(headers: Vec<String>, cells: Vec<Vec<Option<CellValue>>>) -> TableModel {
    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| finalize_column(name, values))
        .collect();
    TableModel::new(columns)
}

/// Decides a column's declared kind from its materialized cells and coerces
/// the cells to match: all dates -> temporal, all numbers (textual digits
/// included) -> numeric, anything mixed -> textual.
fn finalize_column(name: String, values: Vec<Option<CellValue>>) -> Column {
    let non_null = values.iter().flatten().count();
    let all_dates =
        non_null > 0 && values.iter().flatten().all(|v| v.as_date().is_some());
    if all_dates {
        return Column::new(name, ColumnKind::Temporal, values);
    }

    let numeric: Vec<Option<CellValue>> = values
        .iter()
        .map(|v| {
            v.as_ref().and_then(|cell| match cell {
                CellValue::Number(n) => Some(CellValue::Number(*n)),
                CellValue::Text(s) => parse_number(s).map(CellValue::Number),
                CellValue::Date(_) => None,
            })
        })
        .collect();
    if non_null > 0 && numeric.iter().flatten().count() == non_null {
        return Column::new(name, ColumnKind::Numeric, numeric);
    }

    let textual = values
        .into_iter()
        .map(|v| v.map(|cell| CellValue::Text(cell.as_display())))
        .collect();
    Column::new(name, ColumnKind::Textual, textual)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<Option<CellValue>> {
        values
            .iter()
            .map(|v| {
                let trimmed = v.trim();
                (!trimmed.is_empty()).then(|| CellValue::Text(trimmed.to_string()))
            })
            .collect()
    }

    #[test]
    fn all_numeric_strings_become_a_numeric_column() {
        let column = finalize_column("qty".into(), texts(&["2", "3.5", ""]));
        assert_eq!(column.kind, ColumnKind::Numeric);
        assert_eq!(column.values[0], Some(CellValue::Number(2.0)));
        assert_eq!(column.values[2], None);
    }

    #[test]
    fn mixed_content_stays_textual() {
        let column = finalize_column("c".into(), texts(&["2", "two"]));
        assert_eq!(column.kind, ColumnKind::Textual);
        assert_eq!(column.values[0], Some(CellValue::Text("2".into())));
    }

    #[test]
    fn all_null_column_is_textual() {
        let column = finalize_column("c".into(), vec![None, None]);
        assert_eq!(column.kind, ColumnKind::Textual);
    }

    #[test]
    fn date_cells_make_a_temporal_column() {
        let date = CellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let column = finalize_column("d".into(), vec![Some(date), None]);
        assert_eq!(column.kind, ColumnKind::Temporal);
    }

    #[test]
    fn unsupported_extension_is_a_typed_error() {
        let err = load_dataset(Path::new("data.parquet"), None, None).unwrap_err();
        let typed = err.downcast_ref::<AnalysisError>().expect("typed error");
        assert!(matches!(typed, AnalysisError::UnsupportedFormat { extension } if extension == ".parquet"));
    }
}
