use crate::model::Ledger;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Whole-statement figures shown on the Summary sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRecord {
    pub total_money_in: Decimal,
    pub total_money_out: Decimal,
    pub net_movement: Decimal,
    pub transaction_count: usize,
    /// Rows with a `money_in` value.
    pub incoming_count: usize,
    /// Rows with a `money_out` value.
    pub outgoing_count: usize,
    pub average_in: Option<Decimal>,
    pub average_out: Option<Decimal>,
    pub largest_in: Option<Decimal>,
    /// The most negative outflow.
    pub largest_out: Option<Decimal>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// A summary value, typed for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue {
    Money(Option<Decimal>),
    Count(usize),
    Date(Option<NaiveDate>),
}

impl SummaryRecord {
    /// Metric names and values in display order.
    pub fn metrics(&self) -> Vec<(&'static str, MetricValue)> {
        vec![
            ("Total Money In", MetricValue::Money(Some(self.total_money_in))),
            ("Total Money Out", MetricValue::Money(Some(self.total_money_out))),
            ("Net Movement", MetricValue::Money(Some(self.net_movement))),
            ("Number of Transactions", MetricValue::Count(self.transaction_count)),
            ("Number of Incoming Transactions", MetricValue::Count(self.incoming_count)),
            ("Number of Outgoing Transactions", MetricValue::Count(self.outgoing_count)),
            ("Average Transaction In", MetricValue::Money(self.average_in)),
            ("Average Transaction Out", MetricValue::Money(self.average_out)),
            ("Largest Transaction In", MetricValue::Money(self.largest_in)),
            ("Largest Transaction Out", MetricValue::Money(self.largest_out)),
            ("First Transaction Date", MetricValue::Date(self.first_date)),
            ("Last Transaction Date", MetricValue::Date(self.last_date)),
        ]
    }
}

pub fn summarize(ledger: &Ledger) -> SummaryRecord {
    let ins: Vec<Decimal> = ledger.transactions().iter().filter_map(|t| t.money_in).collect();
    let outs: Vec<Decimal> = ledger.transactions().iter().filter_map(|t| t.money_out).collect();

    let total_money_in: Decimal = ins.iter().sum();
    let total_money_out: Decimal = outs.iter().sum();

    SummaryRecord {
        total_money_in,
        total_money_out,
        net_movement: total_money_in + total_money_out,
        transaction_count: ledger.len(),
        incoming_count: ins.len(),
        outgoing_count: outs.len(),
        average_in: mean(total_money_in, ins.len()),
        average_out: mean(total_money_out, outs.len()),
        largest_in: ins.iter().copied().max(),
        largest_out: outs.iter().copied().min(),
        first_date: ledger.first().map(|t| t.transaction_date),
        last_date: ledger.last().map(|t| t.transaction_date),
    }
}

fn mean(sum: Decimal, count: usize) -> Option<Decimal> {
    sum.checked_div(Decimal::from(count))
}
