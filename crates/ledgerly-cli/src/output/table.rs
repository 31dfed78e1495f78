use ledgerly_core::aggregate::{MetricValue, Period};
use ledgerly_core::report::GRAND_TOTAL_LABEL;
use ledgerly_core::Analysis;
use numbers::{money, opt_money, opt_pct};

/// Print a parsed statement as human-readable text.
pub fn print(analysis: &Analysis) {
    let transactions = analysis.ledger.transactions();
    println!("=== Transactions ({}) ===\n", transactions.len());
    if transactions.is_empty() {
        println!("  (no transactions)\n");
    } else {
        let max_details = transactions
            .iter()
            .map(|t| t.details.chars().count())
            .max()
            .unwrap_or(10)
            .min(48);

        for t in transactions {
            let details: String = t.details.chars().take(max_details).collect();
            println!(
                "  {}  {:<width$}  {:>14}  {:>14}  {:>14}",
                t.transaction_date.format("%d/%m/%Y"),
                details,
                opt_money(t.money_out),
                opt_money(t.money_in),
                opt_money(t.ledger_balance),
                width = max_details
            );
        }
        println!();
    }

    println!("=== Summary ===\n");
    for (name, value) in analysis.summary.metrics() {
        let rendered = match value {
            MetricValue::Money(v) => opt_money(v),
            MetricValue::Count(n) => n.to_string(),
            MetricValue::Date(d) => d
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "-".into()),
        };
        println!("  {:<34}{}", name, rendered);
    }
    println!();

    println!("=== Monthly Analysis ===\n");
    for m in &analysis.monthly {
        let label = match m.period {
            Period::Month(month) => month.to_string(),
            Period::GrandTotal => GRAND_TOTAL_LABEL.to_string(),
        };
        println!(
            "  {:<16}  in {:>14}  out {:>14}  net {:>14}  n={:<5} growth in {:>8}",
            label,
            money(m.money_in),
            money(m.money_out),
            money(m.net_movement),
            m.transaction_count,
            opt_pct(m.money_in_growth_pct),
        );
    }
}

/// Decimal rendering for terminal output.
mod numbers {
    use rust_decimal::Decimal;

    pub fn money(d: Decimal) -> String {
        let rounded = d.round_dp(2);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::new();
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        format!("{}{}.{}", if negative { "-" } else { "" }, grouped, frac_part)
    }

    pub fn opt_money(d: Option<Decimal>) -> String {
        d.map(money).unwrap_or_else(|| "-".into())
    }

    pub fn opt_pct(d: Option<Decimal>) -> String {
        d.map(|p| format!("{:.1}%", p.round_dp(1)))
            .unwrap_or_else(|| "-".into())
    }

}
