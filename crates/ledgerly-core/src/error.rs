use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LedgerlyError {
    #[error("table extraction failed: {0}")]
    Extraction(String),

    #[error("java not found. Install a Java runtime and point --java (or TABULA_JAVA) at it")]
    TabulaNotFound,

    #[error("tabula failed with exit code {code}: {stderr}")]
    TabulaFailed { code: i32, stderr: String },

    #[error("malformed transaction date '{value}' (expected format {format})")]
    MalformedDate { value: String, format: String },

    #[error("outgoing amount {amount} on {date} is not negative")]
    UnsignedOutflow { date: NaiveDate, amount: Decimal },

    #[error("transaction amounts are too large to total (from {date} on)")]
    AmountOverflow { date: NaiveDate },

    #[error("no valid tables found")]
    NoValidTables,

    #[error("{0}")]
    Rejected(RejectReason),

    #[error("failed to load layout from {path}: {reason}")]
    LayoutLoad { path: PathBuf, reason: String },

    #[error("invalid layout: {0}")]
    LayoutInvalid(String),

    #[error("failed to write report: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why an upload was turned away before any processing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingFile,
    EmptyFilename,
    DisallowedExtension,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingFile => write!(f, "No file part"),
            RejectReason::EmptyFilename => write!(f, "No selected file"),
            RejectReason::DisallowedExtension => write!(f, "Invalid file type"),
        }
    }
}
