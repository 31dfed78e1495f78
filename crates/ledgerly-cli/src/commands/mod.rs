pub mod convert;
pub mod layouts;
pub mod parse;

use ledgerly_core::error::LedgerlyError;
use ledgerly_core::extraction::tabula::{TabulaConfig, TabulaExtractor};
use ledgerly_core::extraction::RawTable;
use ledgerly_core::layout::builtin::DEFAULT_PRESET;
use ledgerly_core::layout::{load_layout, LayoutClassifier};
use ledgerly_core::Analysis;
use std::path::Path;

use crate::{ExtractorArgs, LayoutArgs};

/// A custom layout file wins over a preset; no choice means the default preset.
pub fn classifier(args: &LayoutArgs) -> Result<LayoutClassifier, LedgerlyError> {
    let classifier = match (&args.layout, &args.preset) {
        (Some(path), _) => LayoutClassifier::new(load_layout(path)?)?,
        (None, Some(preset)) => LayoutClassifier::preset(preset)?,
        (None, None) => LayoutClassifier::preset(DEFAULT_PRESET)?,
    };
    let layout = classifier.layout();
    tracing::debug!(layout = %layout.name, version = %layout.version, "using layout");
    Ok(classifier)
}

/// Fails up front when the Java runtime cannot be started.
pub fn extractor(args: &ExtractorArgs) -> Result<TabulaExtractor, LedgerlyError> {
    let extractor = TabulaExtractor::new(TabulaConfig {
        java: args.java.clone(),
        jar: args.tabula_jar.clone(),
    });
    if !extractor.is_available() {
        return Err(LedgerlyError::TabulaNotFound);
    }
    Ok(extractor)
}

/// Tables JSON input skips PDF extraction entirely.
pub fn is_tables_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Analyze a statement given either as a PDF or as pre-extracted tables JSON.
pub fn analyze(
    input_file: &Path,
    layout: &LayoutArgs,
    extractor_args: &ExtractorArgs,
) -> Result<Analysis, LedgerlyError> {
    let classifier = classifier(layout)?;

    let analysis = if is_tables_json(input_file) {
        let json_bytes = std::fs::read(input_file)?;
        let tables: Vec<RawTable> = serde_json::from_slice(&json_bytes)?;
        ledgerly_core::analyze_tables(&tables, &classifier)?
    } else {
        ledgerly_core::analyze_pdf(input_file, &extractor(extractor_args)?, &classifier)?
    };

    analysis.ok_or(LedgerlyError::NoValidTables)
}
