//! Visualization sink.
//!
//! The core hands grouped results to a [`ChartSink`]; rendering failures are
//! logged as warnings and never abort the run. The bundled implementation
//! draws horizontal ASCII bars to stdout.

use std::io::Write;

use anyhow::Result;
use log::warn;

use crate::aggregate::AggregationResult;

pub trait ChartSink {
    /// Receives revenue-by-product as a descending list of pairs.
    fn revenue_by_product(&mut self, series: &[(String, f64)]) -> Result<()>;
    /// Receives revenue-by-month as an ascending list of pairs.
    fn monthly_trend(&mut self, series: &[(u32, f64)]) -> Result<()>;
}

/// Feeds both chart series to the sink, downgrading failures to warnings.
pub fn render_all(sink: &mut dyn ChartSink, result: &AggregationResult) {
    if !result.revenue_by_product.is_empty() {
        if let Err(err) = sink.revenue_by_product(&result.revenue_by_product) {
            warn!("Bar chart skip: {err:#}");
        }
    }
    if !result.revenue_by_month.is_empty() {
        if let Err(err) = sink.monthly_trend(&result.revenue_by_month) {
            warn!("Line chart skip: {err:#}");
        }
    }
}

/// ASCII bar charts written to any `Write` target.
pub struct TextCharts<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TextCharts<W> {
    pub fn new(out: W) -> Self {
        Self { out, width: 40 }
    }

    fn bars(&mut self, title: &str, labels: &[String], values: &[f64]) -> Result<()> {
        writeln!(self.out, "\n{title}")?;
        let max = values.iter().fold(0.0f64, |acc, v| acc.max(*v));
        let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        for (label, value) in labels.iter().zip(values) {
            let len = if max > 0.0 {
                ((value / max) * self.width as f64).round() as usize
            } else {
                0
            };
            writeln!(
                self.out,
                "{label:<label_width$}  {} {value:.2}",
                "#".repeat(len.max(1))
            )?;
        }
        Ok(())
    }
}

impl Default for TextCharts<std::io::Stdout> {
    fn default() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ChartSink for TextCharts<W> {
    fn revenue_by_product(&mut self, series: &[(String, f64)]) -> Result<()> {
        let labels: Vec<String> = series.iter().map(|(name, _)| name.clone()).collect();
        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        self.bars("Revenue by Product", &labels, &values)
    }

    fn monthly_trend(&mut self, series: &[(u32, f64)]) -> Result<()> {
        let labels: Vec<String> = series.iter().map(|(m, _)| format!("month {m:>2}")).collect();
        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        self.bars("Monthly Sales Trend", &labels, &values)
    }
}
