use ledgerly_core::error::{LedgerlyError, RejectReason};
use ledgerly_core::report::save_report;
use ledgerly_core::service::{Orchestrator, Upload};
use std::path::{Path, PathBuf};

use crate::commands;
use crate::{ExtractorArgs, LayoutArgs};

pub fn run(
    input_file: PathBuf,
    out: Option<PathBuf>,
    staging_dir: Option<PathBuf>,
    layout: &LayoutArgs,
    extractor_args: &ExtractorArgs,
) -> Result<(), LedgerlyError> {
    // Pre-extracted tables go straight to the report
    if commands::is_tables_json(&input_file) {
        let analysis = commands::analyze(&input_file, layout, extractor_args)?;
        let dest = out.unwrap_or_else(|| default_destination(&input_file, None));
        let mut workbook = analysis.to_workbook()?;
        save_report(&mut workbook, &dest)?;
        print_done(&dest, analysis.ledger.len());
        return Ok(());
    }

    let filename = input_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(LedgerlyError::Rejected(RejectReason::EmptyFilename))?;
    let upload = Upload {
        filename,
        bytes: std::fs::read(&input_file)?,
    };

    let classifier = commands::classifier(layout)?;
    let extractor = commands::extractor(extractor_args)?;
    // Stage beside the destination so the finished report is a rename away.
    let staging_root = staging_dir.unwrap_or_else(|| {
        let target = out.as_deref().unwrap_or(input_file.as_path());
        match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    });
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging_root);

    let download = orchestrator.process(Some(&upload))?;
    let dest = out.unwrap_or_else(|| default_destination(&input_file, Some(&download.download_name)));
    download.persist(&dest)?;

    eprintln!("Report written to {}", dest.display());
    Ok(())
}

/// `<stem>.xlsx` beside the input file.
fn default_destination(input_file: &Path, download_name: Option<&str>) -> PathBuf {
    match download_name {
        Some(name) => input_file.with_file_name(name),
        None => input_file.with_extension("xlsx"),
    }
}

fn print_done(dest: &Path, transactions: usize) {
    eprintln!(
        "{} transaction(s), report written to {}",
        transactions,
        dest.display()
    );
}
