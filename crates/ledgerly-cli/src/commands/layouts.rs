use ledgerly_core::layout::builtin;
use ledgerly_core::layout::schema::LayoutDef;
use ledgerly_core::model::OutflowSign;
use std::path::Path;

pub fn list() -> Result<(), ledgerly_core::error::LedgerlyError> {
    println!("Available predefined layouts:\n");
    for name in builtin::PRESETS {
        let layout = builtin::load_preset(name)?;
        let default_marker = if *name == builtin::DEFAULT_PRESET {
            " [default]"
        } else {
            ""
        };
        println!(
            "  {:<10} {} (v{}){}",
            name, layout.name, layout.version, default_marker
        );
        if let Some(ref desc) = layout.description {
            println!("             {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), ledgerly_core::error::LedgerlyError> {
    let layout = builtin::load_preset(preset)?;
    print_layout(&layout);
    Ok(())
}

fn print_layout(layout: &LayoutDef) {
    println!("{} (version {})\n", layout.name, layout.version);

    if let Some(ref desc) = layout.description {
        println!("{}\n", desc);
    }

    println!(
        "Tables with fewer than {} columns are ignored (totals footers, page titles).",
        layout.min_columns
    );
    println!(
        "A row is a transaction when its date cell matches {} and parses as {}.",
        layout.date_pattern, layout.date_format
    );
    if !layout.header_labels.is_empty() {
        println!(
            "Repeated header rows are recognised by: {}.",
            layout.header_labels.join(", ")
        );
    }
    match layout.outflow_sign {
        OutflowSign::Normalize => {
            println!("Outgoing amounts printed without a minus sign are made negative.")
        }
        OutflowSign::Reject => {
            println!("An outgoing amount printed without a minus sign stops processing.")
        }
    }

    println!("\nColumns:\n");
    for (field, index) in layout.columns.entries() {
        println!("  {:<18} column {}", field, index);
    }
    println!();
}

pub fn schema() -> Result<(), ledgerly_core::error::LedgerlyError> {
    print!(
        r#"JSON Layout Schema
==================

A layout file tells ledgerly which extracted tables hold transactions and
where each field sits in a row. Use one when a bank prints its statement
differently from the built-in presets (`ledgerly layouts list`).

Top-level fields:
  name          (string, required)  Human-readable name of the layout
  description   (string, optional)  Which statements it is for
  version       (string, required)  Version identifier (e.g., "1.0")
  min_columns   (number, optional)  Tables with fewer columns are skipped.
                                    Default: 6
  date_pattern  (string, optional)  Regex the transaction-date cell must
                                    match for the row to count as a
                                    transaction. Default: "^\d{{2}}\.\d{{2}}\.\d{{4}}$"
  date_format   (string, optional)  strftime-style format used to parse the
                                    date cell. Default: "%d.%m.%Y"
  header_labels (array, optional)   Date-cell values that mark a repeated
                                    header row. Default: ["Transaction Date"]
  columns       (object, optional)  Zero-based column index of each field:
                                    transaction_date, value_date, details,
                                    money_out, money_in, ledger_balance,
                                    bank_reference. Default: 0..6 in that order
  outflow_sign  (string, optional)  "normalize" makes unsigned outgoing
                                    amounts negative; "reject" stops with an
                                    error instead. Default: "normalize"

Example:
{{
  "name": "Credit union export",
  "version": "1.0",
  "min_columns": 7,
  "date_pattern": "^\\d{{4}}-\\d{{2}}-\\d{{2}}$",
  "date_format": "%Y-%m-%d",
  "header_labels": ["Date"],
  "columns": {{
    "transaction_date": 0,
    "value_date": 1,
    "details": 2,
    "money_in": 3,
    "money_out": 4,
    "ledger_balance": 5,
    "bank_reference": 6
  }},
  "outflow_sign": "reject"
}}

Note: the regex must be escaped for JSON (each backslash doubled).
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), ledgerly_core::error::LedgerlyError> {
    let layout = ledgerly_core::layout::load_layout(file)?;

    println!("Layout '{}' (v{}) is valid.", layout.name, layout.version);
    println!("  Minimum columns: {}", layout.min_columns);
    println!("  Date: {} ({})", layout.date_pattern, layout.date_format);

    // Check for potential issues (warnings, not errors)
    let mut warnings = Vec::new();
    for (field, index) in layout.columns.entries() {
        if index >= layout.min_columns {
            warnings.push(format!(
                "'{}' (column {}) may be missing from tables with only {} columns",
                field, index, layout.min_columns
            ));
        }
    }
    if !layout.date_pattern.starts_with('^') || !layout.date_pattern.ends_with('$') {
        warnings.push("date_pattern is not anchored; dates inside longer text will match".into());
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
