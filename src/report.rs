//! Human-readable summary of an analysis run.
//!
//! Formats the aggregation results as a trace: detected roles, total
//! revenue, grouped tables, and the best-month percentage. Consumers decide
//! where the text goes (stdout, log); nothing here performs I/O.

use std::fmt::Write as _;

use crate::aggregate::AggregationResult;
use crate::infer::NamedRoles;
use crate::table::TableModel;

pub fn render_summary(
    table: &TableModel,
    roles: &NamedRoles,
    result: &AggregationResult,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Columns: {}", table.column_names().join(", "));
    let _ = writeln!(
        out,
        "Auto-detected: Date={}, Product={}, Qty={}, Price={}",
        roles.date, roles.product, roles.quantity, roles.price
    );
    let _ = writeln!(
        out,
        "Total Revenue: {} (rounded: {})",
        format_number(result.total_revenue),
        result.total_revenue.ceil() as i64
    );

    let _ = writeln!(out, "\nQuantity by product:");
    out.push_str(&render_table(
        &["product", "quantity"],
        &result
            .quantity_by_product
            .iter()
            .map(|(name, qty)| vec![name.clone(), format_number(*qty)])
            .collect::<Vec<_>>(),
    ));

    let _ = writeln!(out, "\nRevenue by product:");
    out.push_str(&render_table(
        &["product", "revenue"],
        &result
            .revenue_by_product
            .iter()
            .map(|(name, revenue)| vec![name.clone(), format_number(*revenue)])
            .collect::<Vec<_>>(),
    ));

    let _ = writeln!(out, "\nRevenue by month:");
    out.push_str(&render_table(
        &["month", "revenue"],
        &result
            .revenue_by_month
            .iter()
            .map(|(month, revenue)| vec![month.to_string(), format_number(*revenue)])
            .collect::<Vec<_>>(),
    ));

    if let Some(ratio) = result.best_month_ratio {
        let _ = writeln!(out, "\nBest month vs avg: {ratio}%");
    }

    out
}

/// Elastic fixed-width table: header row, dashed separator, data rows.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let format_row = |cells: &[String], out: &mut String| {
        let mut line = String::new();
        for (idx, cell) in cells.iter().enumerate().take(widths.len()) {
            if idx > 0 {
                line.push_str("  ");
            }
            let _ = write!(line, "{cell:<width$}", width = widths[idx]);
        }
        let _ = writeln!(out, "{}", line.trim_end());
    };

    format_row(
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        &mut out,
    );
    format_row(
        &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
        &mut out,
    );
    for row in rows {
        format_row(row, &mut out);
    }
    out
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
