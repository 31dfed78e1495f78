pub mod builtin;
pub mod schema;

use crate::error::LedgerlyError;
use crate::extraction::RawTable;
use crate::model::OutflowSign;
use crate::parsing::is_empty_row;
use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use schema::{ColumnMap, LayoutDef};
use std::collections::HashSet;
use std::path::Path;

/// What a single raw row turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Empty,
    /// A repeated column-header row.
    Header,
    Transaction,
    /// Titles, subtotals, page furniture.
    Other,
}

/// Decides which extracted tables and rows carry transactions, and how
/// their cells map onto the canonical transaction fields.
pub trait RowClassifier: Send + Sync {
    /// Whether a table is shaped like a transaction table at all.
    fn accepts_table(&self, table: &RawTable) -> bool;

    fn classify_row(&self, row: &[String]) -> RowKind;

    fn columns(&self) -> &ColumnMap;

    /// Parse the transaction-date cell of a row already classified as a
    /// transaction.
    fn parse_date(&self, cell: &str) -> Result<NaiveDate, LedgerlyError>;

    fn outflow_sign(&self) -> OutflowSign;
}

/// [`RowClassifier`] driven by a validated [`LayoutDef`].
#[derive(Debug, Clone)]
pub struct LayoutClassifier {
    layout: LayoutDef,
    date_re: Regex,
}

impl LayoutClassifier {
    pub fn new(layout: LayoutDef) -> Result<Self, LedgerlyError> {
        validate_layout(&layout)?;
        let date_re = compile_date_pattern(&layout.date_pattern)?;
        Ok(LayoutClassifier { layout, date_re })
    }

    /// Classifier for a built-in preset.
    pub fn preset(name: &str) -> Result<Self, LedgerlyError> {
        Self::new(builtin::load_preset(name)?)
    }

    pub fn layout(&self) -> &LayoutDef {
        &self.layout
    }
}

impl RowClassifier for LayoutClassifier {
    fn accepts_table(&self, table: &RawTable) -> bool {
        table.column_count() >= self.layout.min_columns
    }

    fn classify_row(&self, row: &[String]) -> RowKind {
        if is_empty_row(row) {
            return RowKind::Empty;
        }

        let date_cell = row
            .get(self.layout.columns.transaction_date)
            .map(|c| c.trim())
            .unwrap_or("");

        if self.layout.header_labels.iter().any(|h| h == date_cell) {
            RowKind::Header
        } else if self.date_re.is_match(date_cell) {
            RowKind::Transaction
        } else {
            RowKind::Other
        }
    }

    fn columns(&self) -> &ColumnMap {
        &self.layout.columns
    }

    fn parse_date(&self, cell: &str) -> Result<NaiveDate, LedgerlyError> {
        let malformed = || LedgerlyError::MalformedDate {
            value: cell.to_string(),
            format: self.layout.date_format.clone(),
        };
        let date = NaiveDate::parse_from_str(cell.trim(), &self.layout.date_format)
            .map_err(|_| malformed())?;
        // Spreadsheet dates run from 1900 to 9999.
        if !(1900..=9999).contains(&date.year()) {
            return Err(malformed());
        }
        Ok(date)
    }

    fn outflow_sign(&self) -> OutflowSign {
        self.layout.outflow_sign
    }
}

/// Load a layout from a JSON file.
pub fn load_layout(path: &Path) -> Result<LayoutDef, LedgerlyError> {
    let content = std::fs::read_to_string(path).map_err(|e| LedgerlyError::LayoutLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_layout(&content, path)
}

/// Parse a layout from a JSON string.
pub fn parse_layout(json: &str, source: &Path) -> Result<LayoutDef, LedgerlyError> {
    let layout: LayoutDef = serde_json::from_str(json).map_err(|e| LedgerlyError::LayoutLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_layout(&layout)?;
    Ok(layout)
}

/// Parse a layout from a JSON string (no file path context).
pub fn parse_layout_str(json: &str) -> Result<LayoutDef, LedgerlyError> {
    let layout: LayoutDef = serde_json::from_str(json).map_err(LedgerlyError::Json)?;
    validate_layout(&layout)?;
    Ok(layout)
}

/// Validate that a layout is well-formed.
pub fn validate_layout(layout: &LayoutDef) -> Result<(), LedgerlyError> {
    if layout.min_columns == 0 {
        return Err(LedgerlyError::LayoutInvalid(
            "min_columns must be at least 1".into(),
        ));
    }

    compile_date_pattern(&layout.date_pattern)?;

    if layout.date_format.trim().is_empty() {
        return Err(LedgerlyError::LayoutInvalid(
            "date_format must not be empty".into(),
        ));
    }
    if StrftimeItems::new(&layout.date_format).any(|item| matches!(item, Item::Error)) {
        return Err(LedgerlyError::LayoutInvalid(format!(
            "invalid date_format '{}'",
            layout.date_format
        )));
    }

    let mut seen = HashSet::new();
    for (field, index) in layout.columns.entries() {
        if !seen.insert(index) {
            return Err(LedgerlyError::LayoutInvalid(format!(
                "column {} is assigned to more than one field (second: '{}')",
                index, field
            )));
        }
    }

    if layout.columns.transaction_date >= layout.min_columns {
        return Err(LedgerlyError::LayoutInvalid(format!(
            "transaction_date column {} lies outside min_columns {}",
            layout.columns.transaction_date, layout.min_columns
        )));
    }

    Ok(())
}

fn compile_date_pattern(pattern: &str) -> Result<Regex, LedgerlyError> {
    Regex::new(pattern).map_err(|e| {
        LedgerlyError::LayoutInvalid(format!("invalid date_pattern '{}': {}", pattern, e))
    })
}
