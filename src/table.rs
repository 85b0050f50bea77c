//! Column-oriented in-memory table.
//!
//! A [`TableModel`] is an ordered sequence of named, typed columns whose cell
//! vectors are aligned by row index. Each pipeline stage exclusively owns the
//! table it produces; cleaning builds a new table rather than mutating the
//! loaded one, so the raw data stays available for diagnostics.

use crate::data::CellValue;

/// Declared type of a column, decided by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Textual,
    Temporal,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Option<CellValue>>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Option<CellValue>>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            kind,
            values,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableModel {
    columns: Vec<Column>,
}

impl TableModel {
    /// Builds a table from columns, padding shorter value vectors with nulls
    /// so the equal-length invariant holds.
    pub fn new(mut columns: Vec<Column>) -> Self {
        let rows = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for column in &mut columns {
            column.values.resize(rows, None);
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell at (row, column); `None` for nulls.
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.columns[column].values[row].as_ref()
    }

    /// Renders one row as display strings, empty string for nulls. Used for
    /// previews, duplicate detection, and the output writer.
    pub fn render_row(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| {
                column.values[row]
                    .as_ref()
                    .map(CellValue::as_display)
                    .unwrap_or_default()
            })
            .collect()
    }
}
