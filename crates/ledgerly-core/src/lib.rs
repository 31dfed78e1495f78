pub mod aggregate;
pub mod error;
pub mod extraction;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod parsing;
pub mod report;
pub mod service;

use aggregate::{daily_totals, monthly_totals, summarize, DailyTotal, MonthlyTotal, SummaryRecord};
use error::LedgerlyError;
use extraction::{RawTable, TableExtractor};
use layout::RowClassifier;
use model::Ledger;
use serde::Serialize;
use std::path::Path;

/// A statement ledger together with everything derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub ledger: Ledger,
    pub summary: SummaryRecord,
    pub daily: Vec<DailyTotal>,
    pub monthly: Vec<MonthlyTotal>,
}

impl Analysis {
    pub fn from_ledger(ledger: Ledger) -> Self {
        let summary = summarize(&ledger);
        let daily = daily_totals(&ledger);
        let monthly = monthly_totals(&ledger);
        Analysis {
            ledger,
            summary,
            daily,
            monthly,
        }
    }

    /// Render the four-sheet report workbook.
    pub fn to_workbook(&self) -> Result<rust_xlsxwriter::Workbook, LedgerlyError> {
        report::assemble(&self.ledger, &self.summary, &self.daily, &self.monthly)
    }
}

/// Normalize already-extracted tables and aggregate the resulting ledger.
///
/// Returns `Ok(None)` when none of the tables looks like a transaction table.
pub fn analyze_tables(
    tables: &[RawTable],
    classifier: &dyn RowClassifier,
) -> Result<Option<Analysis>, LedgerlyError> {
    Ok(normalize::normalize(tables, classifier)?.map(Analysis::from_ledger))
}

/// Main API entry point: extract the tables of a statement PDF and analyze them.
pub fn analyze_pdf(
    pdf_path: &Path,
    extractor: &dyn TableExtractor,
    classifier: &dyn RowClassifier,
) -> Result<Option<Analysis>, LedgerlyError> {
    let tables = extractor.extract_tables(pdf_path)?;
    tracing::info!(
        backend = extractor.backend_name(),
        tables = tables.len(),
        "extracted tables"
    );
    analyze_tables(&tables, classifier)
}
