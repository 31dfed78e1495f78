use crate::aggregate::Totals;
use crate::model::Ledger;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub money_in: Decimal,
    pub money_out: Decimal,
    pub transaction_count: usize,
    pub net_movement: Decimal,
}

/// One row per distinct transaction date, ascending.
pub fn daily_totals(ledger: &Ledger) -> Vec<DailyTotal> {
    let mut days: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for t in ledger.transactions() {
        days.entry(t.transaction_date)
            .or_default()
            .add(t.money_in, t.money_out);
    }

    days.into_iter()
        .map(|(date, totals)| DailyTotal {
            date,
            money_in: totals.money_in,
            money_out: totals.money_out,
            transaction_count: totals.count,
            net_movement: totals.net_movement(),
        })
        .collect()
}
