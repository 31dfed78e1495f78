use std::path::PathBuf;

use crate::commands;
use crate::output;
use crate::{ExtractorArgs, LayoutArgs};

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    layout: &LayoutArgs,
    extractor_args: &ExtractorArgs,
) -> Result<(), ledgerly_core::error::LedgerlyError> {
    let analysis = commands::analyze(&input_file, layout, extractor_args)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            output::json::write(&analysis, &path)?;
            eprintln!(
                "Parsed {} transaction(s), written to {}",
                analysis.ledger.len(),
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&analysis)?,
            _ => output::table::print(&analysis),
        },
    }

    Ok(())
}
