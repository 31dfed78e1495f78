pub mod tabula;

use crate::error::LedgerlyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One table region detected on a PDF page, as an untyped grid of cell text.
///
/// Rows are not guaranteed to share a width, and tables from different pages
/// are not guaranteed to share a column count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub page_number: usize,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(page_number: usize, rows: Vec<Vec<String>>) -> Self {
        RawTable { page_number, rows }
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Trait for PDF table-detection backends.
pub trait TableExtractor: Send + Sync {
    /// Detect tables on every page of the PDF at `pdf_path`, in document order.
    fn extract_tables(&self, pdf_path: &Path) -> Result<Vec<RawTable>, LedgerlyError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
