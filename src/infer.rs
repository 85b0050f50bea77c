//! Heuristic column-role inference.
//!
//! Scores every column of an unlabeled table and selects the four roles
//! (date, product, quantity, price). Deterministic for a given table: ties
//! always resolve to the earliest column, and every "no candidate" case has
//! a documented fallback rather than an error. The ID-like exclusion and the
//! (unique_ratio, mean) quantity tie-break are heuristics with known limits
//! on small or adversarial tables; they are preserved deliberately.

use std::cmp::Ordering;

use log::debug;
use serde::Serialize;

use crate::error::AnalysisError;
use crate::profile::{self, ColumnProfile};
use crate::table::{ColumnKind, TableModel};

/// At most this many non-null values per column feed the date score.
const DATE_SAMPLE_CAP: usize = 300;
/// A column must beat this parse fraction to be considered a date.
const DATE_SCORE_THRESHOLD: f64 = 0.3;

/// Column indices selected for the four roles. Under degenerate inputs the
/// fallbacks may assign the same column to several roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    pub date: usize,
    pub product: usize,
    pub quantity: usize,
    pub price: usize,
}

/// Role assignment by column name, for reports and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct NamedRoles {
    pub date: String,
    pub product: String,
    pub quantity: String,
    pub price: String,
}

impl RoleAssignment {
    pub fn named(&self, table: &TableModel) -> NamedRoles {
        let name = |idx: usize| table.column(idx).name.clone();
        NamedRoles {
            date: name(self.date),
            product: name(self.product),
            quantity: name(self.quantity),
            price: name(self.price),
        }
    }
}

/// Infers the four column roles. Fails only when the table has no columns.
pub fn infer(table: &TableModel) -> Result<RoleAssignment, AnalysisError> {
    if table.column_count() == 0 {
        return Err(AnalysisError::EmptyTable);
    }

    let profiles: Vec<ColumnProfile> = table
        .columns()
        .iter()
        .map(ColumnProfile::from_column)
        .collect();

    let date = detect_date(table);
    let (quantity, price) = detect_quantity_price(table, &profiles);
    let product = detect_product(table, &profiles, date, quantity, price);

    let roles = RoleAssignment {
        date,
        product,
        quantity,
        price,
    };
    debug!(
        "Inferred roles: date={} product={} quantity={} price={}",
        table.column(date).name,
        table.column(product).name,
        table.column(quantity).name,
        table.column(price).name,
    );
    Ok(roles)
}

fn detect_date(table: &TableModel) -> usize {
    // An already-temporal column wins outright; first in column order.
    if let Some(idx) = table
        .columns()
        .iter()
        .position(|c| c.kind == ColumnKind::Temporal)
    {
        return idx;
    }

    let mut best: Option<usize> = None;
    let mut best_score = -1.0f64;
    for (idx, column) in table.columns().iter().enumerate() {
        let sample: Vec<_> = column
            .values
            .iter()
            .filter_map(|v| v.as_ref())
            .take(DATE_SAMPLE_CAP)
            .collect();
        let score = profile::date_sample_score(&sample);
        // Strict comparison keeps the earliest column on ties.
        if score > best_score && score > DATE_SCORE_THRESHOLD {
            best_score = score;
            best = Some(idx);
        }
    }
    // Conservative fallback when nothing clears the threshold.
    best.unwrap_or(0)
}

fn detect_quantity_price(table: &TableModel, profiles: &[ColumnProfile]) -> (usize, usize) {
    let numeric: Vec<usize> = profiles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind == ColumnKind::Numeric)
        .map(|(idx, _)| idx)
        .collect();

    let candidates: Vec<usize> = numeric
        .iter()
        .copied()
        .filter(|&idx| {
            let p = &profiles[idx];
            p.non_null > 0 && !profile::is_id_like(p, table.row_count())
        })
        .collect();

    if candidates.is_empty() {
        // Positional fallback: first/second numeric column, or the table's
        // first column when no numeric columns exist at all.
        let quantity = numeric.first().copied().unwrap_or(0);
        let price = numeric.get(1).copied().unwrap_or(quantity);
        return (quantity, price);
    }

    let mut quantity = candidates[0];
    for &idx in &candidates[1..] {
        if rank_quantity(&profiles[idx], &profiles[quantity]) == Ordering::Less {
            quantity = idx;
        }
    }

    let mut price = candidates[0];
    for &idx in &candidates[1..] {
        let mean = profiles[idx].mean.unwrap_or(f64::NEG_INFINITY);
        let best = profiles[price].mean.unwrap_or(f64::NEG_INFINITY);
        if mean.total_cmp(&best) == Ordering::Greater {
            price = idx;
        }
    }

    (quantity, price)
}

/// Lexicographic (unique_ratio, mean) order: low cardinality first, lower
/// mean on ties. Favors integer counts over currency-like columns.
fn rank_quantity(a: &ColumnProfile, b: &ColumnProfile) -> Ordering {
    a.unique_ratio()
        .total_cmp(&b.unique_ratio())
        .then_with(|| {
            a.mean
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.mean.unwrap_or(f64::INFINITY))
        })
}

fn detect_product(
    table: &TableModel,
    profiles: &[ColumnProfile],
    date: usize,
    quantity: usize,
    price: usize,
) -> usize {
    let textual: Vec<usize> = profiles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind == ColumnKind::Textual)
        .map(|(idx, _)| idx)
        .collect();

    if textual.is_empty() {
        let taken = [date, quantity, price];
        return (0..table.column_count())
            .find(|idx| !taken.contains(idx))
            .unwrap_or(0);
    }

    let mut best = textual[0];
    let mut best_score = f64::INFINITY;
    for &idx in &textual {
        let score =
            profile::product_cardinality_score(profiles[idx].distinct, table.row_count());
        if score < best_score {
            best_score = score;
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;
    use crate::table::Column;
    use chrono::NaiveDate;

    fn text(values: &[&str]) -> Vec<Option<CellValue>> {
        values
            .iter()
            .map(|v| Some(CellValue::Text(v.to_string())))
            .collect()
    }

    fn numbers(values: &[f64]) -> Vec<Option<CellValue>> {
        values.iter().map(|v| Some(CellValue::Number(*v))).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<CellValue> {
        Some(CellValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap()))
    }

    fn sales_table() -> TableModel {
        TableModel::new(vec![
            Column::new(
                "OrderDate",
                ColumnKind::Textual,
                text(&["2024-01-05", "2024-02-10", "2024-02-11"]),
            ),
            Column::new("Item", ColumnKind::Textual, text(&["mouse", "mouse", "keyboard"])),
            Column::new("Qty", ColumnKind::Numeric, numbers(&[2.0, 1.0, 1.0])),
            Column::new("UnitPrice", ColumnKind::Numeric, numbers(&[10.0, 10.0, 45.0])),
        ])
    }

    #[test]
    fn detects_roles_on_a_typical_sales_table() {
        let table = sales_table();
        let roles = infer(&table).unwrap();
        assert_eq!(roles.date, 0);
        assert_eq!(roles.product, 1);
        assert_eq!(roles.quantity, 2);
        assert_eq!(roles.price, 3);
    }

    #[test]
    fn temporal_column_wins_date_regardless_of_content() {
        let table = TableModel::new(vec![
            Column::new(
                "when_text",
                ColumnKind::Textual,
                text(&["2024-01-05", "2024-02-10"]),
            ),
            Column::new(
                "stamped",
                ColumnKind::Temporal,
                vec![date(2023, 3, 1), date(2023, 3, 2)],
            ),
        ]);
        let roles = infer(&table).unwrap();
        assert_eq!(roles.date, 1);
    }

    #[test]
    fn first_temporal_column_wins_when_several_exist() {
        let table = TableModel::new(vec![
            Column::new("a", ColumnKind::Temporal, vec![date(2024, 1, 1)]),
            Column::new("b", ColumnKind::Temporal, vec![date(2024, 2, 1)]),
        ]);
        assert_eq!(infer(&table).unwrap().date, 0);
    }

    #[test]
    fn date_falls_back_to_first_column_below_threshold() {
        let table = TableModel::new(vec![
            Column::new("name", ColumnKind::Textual, text(&["a", "b", "c", "d"])),
            Column::new(
                "mostly_junk",
                ColumnKind::Textual,
                text(&["2024-01-01", "x", "y", "z"]),
            ),
        ]);
        // 1/4 parsed = 0.25, below the 0.3 threshold.
        assert_eq!(infer(&table).unwrap().date, 0);
    }

    #[test]
    fn id_like_column_is_never_quantity_or_price() {
        let table = TableModel::new(vec![
            Column::new("id", ColumnKind::Numeric, numbers(&[1.0, 2.0, 3.0, 4.0])),
            Column::new("qty", ColumnKind::Numeric, numbers(&[2.0, 2.0, 1.0, 2.0])),
            Column::new(
                "price",
                ColumnKind::Numeric,
                numbers(&[9.5, 19.5, 9.5, 29.0]),
            ),
            Column::new(
                "item",
                ColumnKind::Textual,
                text(&["pen", "pen", "ink", "pen"]),
            ),
        ]);
        let roles = infer(&table).unwrap();
        assert_ne!(roles.quantity, 0);
        assert_ne!(roles.price, 0);
        assert_eq!(roles.quantity, 1);
        assert_eq!(roles.price, 2);
    }

    #[test]
    fn quantity_prefers_low_cardinality_then_low_mean() {
        // Same unique ratio, different means: the cheaper column is quantity.
        let table = TableModel::new(vec![
            Column::new("a", ColumnKind::Numeric, numbers(&[1.0, 2.0, 1.0, 2.0])),
            Column::new("b", ColumnKind::Numeric, numbers(&[100.0, 200.0, 100.0, 200.0])),
        ]);
        let roles = infer(&table).unwrap();
        assert_eq!(roles.quantity, 0);
        assert_eq!(roles.price, 1);
    }

    #[test]
    fn single_numeric_column_serves_both_numeric_roles_when_excluded() {
        // Lone numeric column is ID-like, so the positional fallback kicks in
        // and assigns it to both quantity and price.
        let table = TableModel::new(vec![
            Column::new("item", ColumnKind::Textual, text(&["a", "b", "c"])),
            Column::new("row", ColumnKind::Numeric, numbers(&[1.0, 2.0, 3.0])),
        ]);
        let roles = infer(&table).unwrap();
        assert_eq!(roles.quantity, 1);
        assert_eq!(roles.price, 1);
    }

    #[test]
    fn no_numeric_columns_fall_back_to_first_column() {
        let table = TableModel::new(vec![
            Column::new("x", ColumnKind::Textual, text(&["a", "b"])),
            Column::new("y", ColumnKind::Textual, text(&["c", "d"])),
        ]);
        let roles = infer(&table).unwrap();
        assert_eq!(roles.quantity, 0);
        assert_eq!(roles.price, 0);
    }

    #[test]
    fn product_falls_back_to_first_unassigned_column() {
        let table = TableModel::new(vec![
            Column::new("d", ColumnKind::Temporal, vec![date(2024, 1, 1), date(2024, 1, 2)]),
            Column::new("q", ColumnKind::Numeric, numbers(&[2.0, 2.0])),
            Column::new("p", ColumnKind::Numeric, numbers(&[5.0, 7.0])),
            Column::new("extra", ColumnKind::Numeric, numbers(&[1.5, 2.5])),
        ]);
        let roles = infer(&table).unwrap();
        // No textual columns; 0..2 are taken by date/quantity/price.
        assert_eq!(roles.product, 3);
    }

    #[test]
    fn empty_table_is_an_error() {
        let table = TableModel::new(vec![]);
        assert!(matches!(infer(&table), Err(AnalysisError::EmptyTable)));
    }

    #[test]
    fn inference_is_deterministic() {
        let table = sales_table();
        let first = infer(&table).unwrap();
        let second = infer(&table).unwrap();
        assert_eq!(first, second);
    }
}
