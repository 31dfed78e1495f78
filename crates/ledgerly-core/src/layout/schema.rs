use crate::model::OutflowSign;
use serde::{Deserialize, Serialize};

/// A statement layout: how to recognise transaction tables and rows, and
/// where each canonical field sits within a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Tables narrower than this are not transaction tables.
    #[serde(default = "default_min_columns")]
    pub min_columns: usize,
    /// Regex the transaction-date cell must match for a row to be kept.
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,
    /// chrono format string used to parse the transaction-date cell.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Literal date-cell values that mark a repeated header row.
    #[serde(default = "default_header_labels")]
    pub header_labels: Vec<String>,
    #[serde(default)]
    pub columns: ColumnMap,
    #[serde(default)]
    pub outflow_sign: OutflowSign,
}

/// Zero-based column index of each canonical transaction field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub transaction_date: usize,
    pub value_date: usize,
    pub details: usize,
    pub money_out: usize,
    pub money_in: usize,
    pub ledger_balance: usize,
    pub bank_reference: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMap {
            transaction_date: 0,
            value_date: 1,
            details: 2,
            money_out: 3,
            money_in: 4,
            ledger_balance: 5,
            bank_reference: 6,
        }
    }
}

impl ColumnMap {
    /// Field names paired with their indices, in canonical order.
    pub fn entries(&self) -> [(&'static str, usize); 7] {
        [
            ("transaction_date", self.transaction_date),
            ("value_date", self.value_date),
            ("details", self.details),
            ("money_out", self.money_out),
            ("money_in", self.money_in),
            ("ledger_balance", self.ledger_balance),
            ("bank_reference", self.bank_reference),
        ]
    }
}

fn default_min_columns() -> usize {
    6
}

fn default_date_pattern() -> String {
    r"^\d{2}\.\d{2}\.\d{4}$".to_string()
}

fn default_date_format() -> String {
    "%d.%m.%Y".to_string()
}

fn default_header_labels() -> Vec<String> {
    vec!["Transaction Date".to_string()]
}
