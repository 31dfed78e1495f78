use crate::error::LedgerlyError;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single statement line after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_date: NaiveDate,
    /// Passed through exactly as printed on the statement.
    pub value_date: String,
    pub details: String,
    /// Outgoing amount, negative-signed once inside a [`Ledger`].
    pub money_out: Option<Decimal>,
    pub money_in: Option<Decimal>,
    pub ledger_balance: Option<Decimal>,
    pub bank_reference: String,
}

/// How a ledger treats outgoing amounts that arrive without a minus sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutflowSign {
    /// Flip positive outflows to negative.
    #[default]
    Normalize,
    /// Refuse to build a ledger containing a positive outflow.
    Reject,
}

/// Date-ordered transactions of one statement.
///
/// Invariants upheld by [`Ledger::new`]: records are sorted ascending by
/// `transaction_date` (ties keep their statement order), every record has at
/// least one of `money_in`/`money_out`, and every `money_out` is `<= 0`, so
/// net movement is always the plain sum `money_in + money_out`. The absolute
/// amounts of the whole ledger sum without overflowing a [`Decimal`], so no
/// total derived from it can overflow either.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(mut transactions: Vec<Transaction>, sign: OutflowSign) -> Result<Self, LedgerlyError> {
        transactions.retain(|t| {
            let keep = t.money_in.is_some() || t.money_out.is_some();
            if !keep {
                tracing::warn!(
                    date = %t.transaction_date,
                    details = %t.details,
                    "dropping transaction without any amount"
                );
            }
            keep
        });

        for t in &mut transactions {
            if let Some(out) = t.money_out {
                if out.is_sign_positive() && !out.is_zero() {
                    match sign {
                        OutflowSign::Normalize => {
                            tracing::debug!(date = %t.transaction_date, %out, "negating unsigned outflow");
                            t.money_out = Some(-out);
                        }
                        OutflowSign::Reject => {
                            return Err(LedgerlyError::UnsignedOutflow {
                                date: t.transaction_date,
                                amount: out,
                            });
                        }
                    }
                }
            }
        }

        // Every aggregate is bounded by the sum of absolute amounts.
        let mut magnitude = Decimal::ZERO;
        for t in &transactions {
            for amount in [t.money_in, t.money_out].into_iter().flatten() {
                magnitude = magnitude
                    .checked_add(amount.abs())
                    .ok_or(LedgerlyError::AmountOverflow {
                        date: t.transaction_date,
                    })?;
            }
        }

        // sort_by_key is stable
        transactions.sort_by_key(|t| t.transaction_date);
        Ok(Ledger { transactions })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn first(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    pub fn last(&self) -> Option<&Transaction> {
        self.transactions.last()
    }
}

/// Calendar month used as the monthly grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

/// Renders as the full month name and year, e.g. "March 2024".
impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => write!(f, "{}", first.format("%B %Y")),
            None => write!(f, "{:04}-{:02}", self.year, self.month),
        }
    }
}
