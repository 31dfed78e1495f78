use crate::aggregate::Totals;
use crate::model::{Ledger, YearMonth};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// What a monthly row covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Month(YearMonth),
    GrandTotal,
}

impl Period {
    pub fn is_grand_total(&self) -> bool {
        matches!(self, Period::GrandTotal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub period: Period,
    pub money_in: Decimal,
    pub money_out: Decimal,
    pub transaction_count: usize,
    pub net_movement: Decimal,
    /// `(money_in + |money_out|) / transaction_count`
    pub average_transaction_value: Option<Decimal>,
    pub money_in_growth_pct: Option<Decimal>,
    pub money_out_growth_pct: Option<Decimal>,
    pub transaction_count_growth_pct: Option<Decimal>,
    pub running_total_in: Decimal,
    pub running_total_out: Decimal,
    pub running_net_movement: Decimal,
}

/// One row per calendar month in chronological order, then a grand total.
///
/// Growth percentages compare each month with the row before it; they are
/// `None` for the first month, whenever the previous value is zero, and on
/// the grand total row.
pub fn monthly_totals(ledger: &Ledger) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<YearMonth, Totals> = BTreeMap::new();
    for t in ledger.transactions() {
        months
            .entry(YearMonth::of(t.transaction_date))
            .or_default()
            .add(t.money_in, t.money_out);
    }

    let mut rows: Vec<MonthlyTotal> = Vec::with_capacity(months.len() + 1);
    let mut running = Totals::default();
    let mut previous: Option<Totals> = None;

    for (month, totals) in months {
        running.money_in += totals.money_in;
        running.money_out += totals.money_out;
        running.count += totals.count;

        rows.push(MonthlyTotal {
            period: Period::Month(month),
            money_in: totals.money_in,
            money_out: totals.money_out,
            transaction_count: totals.count,
            net_movement: totals.net_movement(),
            average_transaction_value: average_value(&totals),
            money_in_growth_pct: previous.and_then(|p| growth_pct(totals.money_in, p.money_in)),
            money_out_growth_pct: previous.and_then(|p| growth_pct(totals.money_out, p.money_out)),
            transaction_count_growth_pct: previous.and_then(|p| {
                growth_pct(Decimal::from(totals.count), Decimal::from(p.count))
            }),
            running_total_in: running.money_in,
            running_total_out: running.money_out,
            running_net_movement: running.net_movement(),
        });
        previous = Some(totals);
    }

    let money_in: Decimal = rows.iter().map(|r| r.money_in).sum();
    let money_out: Decimal = rows.iter().map(|r| r.money_out).sum();
    let transaction_count: usize = rows.iter().map(|r| r.transaction_count).sum();
    let net_movement: Decimal = rows.iter().map(|r| r.net_movement).sum();
    let grand = Totals {
        money_in,
        money_out,
        count: transaction_count,
    };

    rows.push(MonthlyTotal {
        period: Period::GrandTotal,
        money_in,
        money_out,
        transaction_count,
        net_movement,
        average_transaction_value: average_value(&grand),
        money_in_growth_pct: None,
        money_out_growth_pct: None,
        transaction_count_growth_pct: None,
        running_total_in: money_in,
        running_total_out: money_out,
        running_net_movement: net_movement,
    });

    rows
}

fn average_value(totals: &Totals) -> Option<Decimal> {
    (totals.money_in + totals.money_out.abs()).checked_div(Decimal::from(totals.count))
}

/// Percentage change from `previous` to `current`.
fn growth_pct(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    (current - previous)
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}
