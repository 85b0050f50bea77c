//! Derived per-row metrics and grouped summary statistics.
//!
//! Operates on a cleaned table, so quantity/price cells are finite numbers
//! and product cells are canonicalized text. Grouping is explicit map
//! accumulation with a post-sort; no dataframe machinery.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use itertools::Itertools;
use serde::Serialize;

use crate::infer::RoleAssignment;
use crate::table::TableModel;

/// Per-row fields derived from the role columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMetrics {
    pub product: String,
    pub quantity: f64,
    /// quantity x price.
    pub total: f64,
    /// Calendar month 1-12, or 1 for every row when the whole table is
    /// undated.
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub total_revenue: f64,
    /// Product -> summed quantity, descending.
    pub quantity_by_product: Vec<(String, f64)>,
    /// Product -> summed revenue, descending.
    pub revenue_by_product: Vec<(String, f64)>,
    /// Month -> summed revenue, ascending by month.
    pub revenue_by_month: Vec<(u32, f64)>,
    /// ceil(max monthly revenue / mean monthly revenue x 100); present only
    /// when the monthly map is non-empty with strictly positive mean.
    pub best_month_ratio: Option<i64>,
}

/// Computes the derived fields for every row of a cleaned table.
///
/// Whether months default to 1 is a table-wide decision: only a table with
/// no valid date anywhere is treated as a single undated bucket.
pub fn derive_rows(table: &TableModel, roles: &RoleAssignment) -> Vec<RowMetrics> {
    let dates = &table.column(roles.date).values;
    let any_dated = dates.iter().any(|v| {
        v.as_ref()
            .and_then(|cell| cell.as_date())
            .is_some()
    });

    (0..table.row_count())
        .filter_map(|row| {
            let quantity = table.cell(row, roles.quantity)?.as_number()?;
            let price = table.cell(row, roles.price)?.as_number()?;
            let product = table.cell(row, roles.product)?.as_display();
            let month = if any_dated {
                table
                    .cell(row, roles.date)
                    .and_then(|cell| cell.as_date())
                    .map(|d| d.month())
                    .unwrap_or(1)
            } else {
                1
            };
            Some(RowMetrics {
                product,
                quantity,
                total: quantity * price,
                month,
            })
        })
        .collect()
}

/// Aggregates a cleaned table into summary metrics. Pure function of its
/// input.
pub fn aggregate(table: &TableModel, roles: &RoleAssignment) -> AggregationResult {
    let rows = derive_rows(table, roles);

    let total_revenue: f64 = rows.iter().map(|r| r.total).sum();

    let mut quantity_by_product: HashMap<String, f64> = HashMap::new();
    let mut revenue_by_product: HashMap<String, f64> = HashMap::new();
    let mut revenue_by_month: BTreeMap<u32, f64> = BTreeMap::new();
    for row in &rows {
        *quantity_by_product.entry(row.product.clone()).or_default() += row.quantity;
        *revenue_by_product.entry(row.product.clone()).or_default() += row.total;
        *revenue_by_month.entry(row.month).or_default() += row.total;
    }

    let revenue_by_month: Vec<(u32, f64)> = revenue_by_month.into_iter().collect();
    let best_month_ratio = best_month_ratio(&revenue_by_month);

    AggregationResult {
        total_revenue,
        quantity_by_product: sort_descending(quantity_by_product),
        revenue_by_product: sort_descending(revenue_by_product),
        revenue_by_month,
        best_month_ratio,
    }
}

// Descending by summed value; ties resolve by ascending key so the order is
// total and deterministic.
fn sort_descending(groups: HashMap<String, f64>) -> Vec<(String, f64)> {
    groups
        .into_iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

fn best_month_ratio(revenue_by_month: &[(u32, f64)]) -> Option<i64> {
    if revenue_by_month.is_empty() {
        return None;
    }
    let sum: f64 = revenue_by_month.iter().map(|(_, v)| v).sum();
    let mean = sum / revenue_by_month.len() as f64;
    if mean <= 0.0 {
        return None;
    }
    let max = revenue_by_month
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    Some((max / mean * 100.0).ceil() as i64)
}
