//! Statistics derived from a [`Ledger`](crate::model::Ledger).
//!
//! Net movement is always `money_in + money_out`: the ledger guarantees
//! outflows are already negative. Absolute values appear only in the
//! average-transaction-value calculation.

pub mod daily;
pub mod monthly;
pub mod summary;

pub use daily::{daily_totals, DailyTotal};
pub use monthly::{monthly_totals, MonthlyTotal, Period};
pub use summary::{summarize, MetricValue, SummaryRecord};

use rust_decimal::Decimal;

/// Running sums of one group of transactions.
///
/// Plain `+` is safe here: [`Ledger::new`](crate::model::Ledger::new)
/// refuses ledgers whose absolute amounts do not sum within `Decimal`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Totals {
    pub money_in: Decimal,
    pub money_out: Decimal,
    pub count: usize,
}

impl Totals {
    pub fn add(&mut self, money_in: Option<Decimal>, money_out: Option<Decimal>) {
        self.money_in += money_in.unwrap_or_default();
        self.money_out += money_out.unwrap_or_default();
        self.count += 1;
    }

    pub fn net_movement(&self) -> Decimal {
        self.money_in + self.money_out
    }
}
