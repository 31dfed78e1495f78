use ledgerly_core::error::LedgerlyError;
use ledgerly_core::Analysis;
use std::path::Path;

pub fn print(analysis: &Analysis) -> Result<(), LedgerlyError> {
    let json = serde_json::to_string_pretty(analysis)?;
    println!("{json}");
    Ok(())
}

pub fn write(analysis: &Analysis, path: &Path) -> Result<(), LedgerlyError> {
    let json = serde_json::to_string_pretty(analysis)?;
    std::fs::write(path, json)?;
    Ok(())
}
