use crate::error::LedgerlyError;
use crate::extraction::RawTable;
use crate::layout::{RowClassifier, RowKind};
use crate::model::{Ledger, Transaction};
use crate::parsing::parse_amount;

/// Reduce the raw tables of a whole statement to one date-ordered ledger.
///
/// Tables the classifier does not accept are discarded; the remaining
/// tables are read in document order and only their transaction rows are
/// kept. Returns `Ok(None)` when no table was accepted at all.
///
/// A row that passed the date pre-filter but still fails to parse is an
/// error rather than a skipped row, since silently dropping it would hide a
/// classifier that disagrees with its own date format.
pub fn normalize(
    tables: &[RawTable],
    classifier: &dyn RowClassifier,
) -> Result<Option<Ledger>, LedgerlyError> {
    let mut accepted_tables = 0usize;
    let mut transactions = Vec::new();

    for (index, table) in tables.iter().enumerate() {
        if !classifier.accepts_table(table) {
            tracing::debug!(
                table = index,
                page = table.page_number,
                columns = table.column_count(),
                "skipping table: too few columns"
            );
            continue;
        }
        accepted_tables += 1;

        let mut kept = 0usize;
        let mut skipped = 0usize;
        for row in &table.rows {
            match classifier.classify_row(row) {
                RowKind::Transaction => {
                    transactions.push(to_transaction(row, classifier)?);
                    kept += 1;
                }
                RowKind::Empty | RowKind::Header | RowKind::Other => skipped += 1,
            }
        }

        tracing::debug!(
            table = index,
            page = table.page_number,
            kept,
            skipped,
            "normalized table"
        );
    }

    if accepted_tables == 0 {
        return Ok(None);
    }

    let ledger = Ledger::new(transactions, classifier.outflow_sign())?;
    tracing::info!(
        tables = accepted_tables,
        transactions = ledger.len(),
        "built ledger"
    );
    Ok(Some(ledger))
}

fn to_transaction(
    row: &[String],
    classifier: &dyn RowClassifier,
) -> Result<Transaction, LedgerlyError> {
    let columns = classifier.columns();
    let cell = |i: usize| row.get(i).map(|c| c.trim()).unwrap_or("");

    Ok(Transaction {
        transaction_date: classifier.parse_date(cell(columns.transaction_date))?,
        value_date: cell(columns.value_date).to_string(),
        details: cell(columns.details).to_string(),
        money_out: parse_amount(cell(columns.money_out)),
        money_in: parse_amount(cell(columns.money_in)),
        ledger_balance: parse_amount(cell(columns.ledger_balance)),
        bank_reference: cell(columns.bank_reference).to_string(),
    })
}
