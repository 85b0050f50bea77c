//! Per-column statistics used only during role inference.
//!
//! Profiles are ephemeral: they are derived from a column, consumed by the
//! scoring heuristics in [`crate::infer`], and discarded. The heuristics are
//! pure functions over these numbers so they can be tested against synthetic
//! profiles without building a table.

use std::collections::HashSet;

use crate::data::{parse_day_first_date, CellValue};
use crate::table::{Column, ColumnKind};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub kind: ColumnKind,
    pub non_null: usize,
    pub distinct: usize,
    /// Mean of non-null values; numeric columns only.
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// True when every non-null numeric value has no fractional part.
    pub integer_valued: bool,
}

impl ColumnProfile {
    pub fn from_column(column: &Column) -> Self {
        let mut non_null = 0usize;
        let mut distinct = HashSet::new();
        let mut sum = 0.0f64;
        let mut numeric_count = 0usize;
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        let mut integer_valued = true;

        for value in column.values.iter().flatten() {
            non_null += 1;
            distinct.insert(distinct_key(value));
            if let Some(n) = value.as_number() {
                numeric_count += 1;
                sum += n;
                min = Some(min.map_or(n, |m| m.min(n)));
                max = Some(max.map_or(n, |m| m.max(n)));
                if n.fract() != 0.0 {
                    integer_valued = false;
                }
            }
        }

        let mean = (numeric_count > 0).then(|| sum / numeric_count as f64);
        Self {
            kind: column.kind,
            non_null,
            distinct: distinct.len(),
            mean,
            min,
            max,
            integer_valued,
        }
    }

    /// Distinct non-null values as a fraction of non-null count.
    pub fn unique_ratio(&self) -> f64 {
        if self.non_null == 0 {
            0.0
        } else {
            self.distinct as f64 / self.non_null as f64
        }
    }
}

fn distinct_key(value: &CellValue) -> String {
    match value {
        // Bit pattern keeps -0.0 and 0.0 distinct only in representation,
        // which is close enough for a cardinality estimate.
        CellValue::Number(n) => format!("n{:x}", n.to_bits()),
        CellValue::Text(s) => format!("t{s}"),
        CellValue::Date(d) => format!("d{d}"),
    }
}

/// Fraction of sampled raw values that parse as day-first dates. A column
/// whose sample cannot be read at all scores 0 rather than aborting.
pub fn date_sample_score(sample: &[&CellValue]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let parsed = sample
        .iter()
        .filter(|value| match value {
            CellValue::Date(_) => true,
            other => parse_day_first_date(&other.as_display()).is_some(),
        })
        .count();
    parsed as f64 / sample.len() as f64
}

/// An integer column whose values look like a row index (1..N): at least 80%
/// distinct, minimum 1, maximum equal to the table's row count. Known
/// heuristic limit: a genuine quantity column that happens to run 1..N over
/// N rows is excluded too; kept as-is for compatibility.
pub fn is_id_like(profile: &ColumnProfile, table_rows: usize) -> bool {
    profile.integer_valued
        && profile.non_null > 0
        && profile.distinct as f64 >= 0.8 * profile.non_null as f64
        && profile.min == Some(1.0)
        && profile.max == Some(table_rows as f64)
}

/// Distance from the medium-cardinality target that marks product-name
/// columns: distinct/rows near 0.2 scores best (lower is better).
pub fn product_cardinality_score(distinct: usize, row_count: usize) -> f64 {
    let ratio = distinct as f64 / row_count.max(1) as f64;
    (ratio - 0.2).abs()
}
