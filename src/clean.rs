//! Role-driven cleaning pass.
//!
//! Consumes the raw table plus the inferred roles and produces a new table:
//! canonicalized product names, numeric quantity/price, temporal dates, and
//! the row filters applied in a fixed order (nulls, undated rows, exact
//! duplicates). The input table is never mutated.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::data::{parse_day_first_date, parse_number, CellValue};
use crate::error::AnalysisError;
use crate::infer::RoleAssignment;
use crate::table::{Column, ColumnKind, TableModel};

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9 ]+").expect("valid pattern"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid pattern"))
}

/// Canonicalizes a product name: strip punctuation (runs become a single
/// word break), collapse whitespace, title-case. Idempotent.
pub fn clean_product_name(name: &str) -> String {
    let stripped = disallowed_chars().replace_all(name.trim(), " ");
    let collapsed = whitespace_runs().replace_all(stripped.trim(), " ");
    title_case(&collapsed)
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cleans the table according to the inferred roles. Fails with
/// [`AnalysisError::EmptyResult`] when no rows survive.
pub fn clean(table: &TableModel, roles: &RoleAssignment) -> Result<TableModel, AnalysisError> {
    let mut columns: Vec<Column> = table.columns().to_vec();

    // Coercions run product-first so a degenerate assignment where roles
    // share a column resolves the same way every run.
    canonicalize_product(&mut columns[roles.product]);
    coerce_numeric(&mut columns[roles.quantity]);
    coerce_numeric(&mut columns[roles.price]);
    coerce_temporal(&mut columns[roles.date]);

    let row_count = table.row_count();
    let mut kept: Vec<usize> = (0..row_count)
        .filter(|&row| {
            columns[roles.quantity].values[row].is_some()
                && columns[roles.price].values[row].is_some()
                && columns[roles.product].values[row].is_some()
        })
        .collect();

    // Undated rows are dropped only when at least one surviving row has a
    // usable date; otherwise dates are simply unknown for the whole table.
    let any_dated = kept
        .iter()
        .any(|&row| columns[roles.date].values[row].is_some());
    if any_dated {
        kept.retain(|&row| columns[roles.date].values[row].is_some());
    }

    let mut seen = HashSet::new();
    kept.retain(|&row| seen.insert(row_key(&columns, row)));

    if kept.is_empty() {
        return Err(AnalysisError::EmptyResult);
    }

    let cleaned = columns
        .into_iter()
        .map(|column| {
            let values = kept.iter().map(|&row| column.values[row].clone()).collect();
            Column {
                name: column.name,
                kind: column.kind,
                values,
            }
        })
        .collect();
    Ok(TableModel::new(cleaned))
}

fn canonicalize_product(column: &mut Column) {
    for value in &mut column.values {
        if let Some(cell) = value.take() {
            let cleaned = clean_product_name(&cell.as_display());
            *value = (!cleaned.is_empty()).then_some(CellValue::Text(cleaned));
        }
    }
    column.kind = ColumnKind::Textual;
}

fn coerce_numeric(column: &mut Column) {
    for value in &mut column.values {
        *value = value.take().and_then(|cell| match cell {
            CellValue::Number(n) => Some(CellValue::Number(n)),
            other => parse_number(&other.as_display()).map(CellValue::Number),
        });
    }
    column.kind = ColumnKind::Numeric;
}

fn coerce_temporal(column: &mut Column) {
    if column.kind == ColumnKind::Temporal {
        return;
    }
    for value in &mut column.values {
        *value = value.take().and_then(|cell| match cell {
            CellValue::Date(d) => Some(CellValue::Date(d)),
            other => parse_day_first_date(&other.as_display()).map(CellValue::Date),
        });
    }
    column.kind = ColumnKind::Temporal;
}

// Duplicate key spanning every column; a type tag keeps a numeric 2 and a
// textual "2" distinct.
fn row_key(columns: &[Column], row: usize) -> String {
    let mut key = String::new();
    for column in columns {
        match &column.values[row] {
            None => key.push('\u{0}'),
            Some(CellValue::Text(s)) => {
                key.push('t');
                key.push_str(s);
            }
            Some(CellValue::Number(n)) => {
                key.push('n');
                key.push_str(&format!("{:x}", n.to_bits()));
            }
            Some(CellValue::Date(d)) => {
                key.push('d');
                key.push_str(&d.to_string());
            }
        }
        key.push('\u{1f}');
    }
    key
}
