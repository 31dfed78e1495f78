use rust_decimal::Decimal;
use std::str::FromStr;

const CURRENCY_SYMBOLS: &[char] = &['$', '£', '€', '¥', '₹', '₦', '₵', '₱'];

/// Parse a monetary cell into a decimal.
///
/// Handles formats like:
/// - "1234.56" -> 1234.56
/// - "$1,234.56" -> 1234.56
/// - "-1,234.56" -> -1234.56
/// - "-$45.00" -> -45.00
///
/// Anything that still does not read as a number after currency symbols and
/// thousands separators are stripped (blank cells, "-", "n/a") yields `None`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}
