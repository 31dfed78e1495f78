//! Upload handling: one statement PDF in, one report download (or a short
//! message) out.

use crate::error::{LedgerlyError, RejectReason};
use crate::extraction::TableExtractor;
use crate::layout::RowClassifier;
use crate::report::{place_file, CONTENT_TYPE};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// What goes back to the client.
#[derive(Debug)]
pub enum Response {
    Download(ReportDownload),
    Message(String),
}

/// A finished report waiting to be sent.
///
/// The file is deleted when this value is dropped, so the caller cleans up
/// simply by letting go of it after transmission, or keeps it with
/// [`ReportDownload::persist`].
#[derive(Debug)]
pub struct ReportDownload {
    /// `<upload-stem>.xlsx`
    pub download_name: String,
    pub content_type: &'static str,
    path: TempPath,
}

impl ReportDownload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the report to `dest` instead of deleting it.
    ///
    /// When `dest` is on another filesystem the report is copied over and
    /// the staged file removed.
    pub fn persist(self, dest: &Path) -> Result<(), LedgerlyError> {
        match self.path.persist(dest) {
            Ok(()) => Ok(()),
            Err(e) if e.error.kind() == io::ErrorKind::CrossesDevices => {
                tracing::debug!(dest = %dest.display(), "staging is on another filesystem, copying report");
                let staged = e.path;
                place_file(File::open(&staged)?, dest)?;
                staged.close()?;
                Ok(())
            }
            Err(e) => Err(e.error.into()),
        }
    }
}

/// Runs the extract → normalize → aggregate → assemble pipeline for one
/// upload at a time.
///
/// Every call stages its input in a fresh temporary directory under
/// `staging_root`; that directory is removed when the call returns, on every
/// path. The finished report is written to `staging_root` in full before it
/// is handed back.
pub struct Orchestrator<'a> {
    extractor: &'a dyn TableExtractor,
    classifier: &'a dyn RowClassifier,
    staging_root: PathBuf,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        extractor: &'a dyn TableExtractor,
        classifier: &'a dyn RowClassifier,
        staging_root: impl Into<PathBuf>,
    ) -> Self {
        Orchestrator {
            extractor,
            classifier,
            staging_root: staging_root.into(),
        }
    }

    /// Handle an upload; `None` means the request carried no file at all.
    ///
    /// Never fails: every error becomes a short message.
    pub fn handle_upload(&self, upload: Option<&Upload>) -> Response {
        match self.process(upload) {
            Ok(download) => Response::Download(download),
            Err(err) => {
                tracing::warn!(error = %err, "upload not converted");
                Response::Message(user_message(&err))
            }
        }
    }

    /// Like [`handle_upload`](Self::handle_upload), but keeps the error typed.
    pub fn process(&self, upload: Option<&Upload>) -> Result<ReportDownload, LedgerlyError> {
        let upload = upload.ok_or(LedgerlyError::Rejected(RejectReason::MissingFile))?;
        if upload.filename.is_empty() {
            return Err(LedgerlyError::Rejected(RejectReason::EmptyFilename));
        }
        if !allowed_file(&upload.filename) {
            return Err(LedgerlyError::Rejected(RejectReason::DisallowedExtension));
        }

        let filename = match secure_filename(&upload.filename) {
            name if name.is_empty() => "statement.pdf".to_string(),
            name => name,
        };
        let stem = filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or("statement");

        let staging = tempfile::Builder::new()
            .prefix("ledgerly-upload-")
            .tempdir_in(&self.staging_root)?;
        let pdf_path = staging.path().join(&filename);
        std::fs::write(&pdf_path, &upload.bytes)?;
        tracing::info!(file = %filename, bytes = upload.bytes.len(), "staged upload");

        let analysis = crate::analyze_pdf(&pdf_path, self.extractor, self.classifier)?
            .ok_or(LedgerlyError::NoValidTables)?;
        let bytes = analysis.to_workbook()?.save_to_buffer()?;

        let mut report = tempfile::Builder::new()
            .prefix(&format!("{stem}-"))
            .suffix(".xlsx")
            .tempfile_in(&self.staging_root)?;
        report.write_all(&bytes)?;
        report.flush()?;

        Ok(ReportDownload {
            download_name: format!("{stem}.xlsx"),
            content_type: CONTENT_TYPE,
            path: report.into_temp_path(),
        })
    }
}

/// The message shown to the client for a failed upload.
pub fn user_message(err: &LedgerlyError) -> String {
    match err {
        LedgerlyError::Rejected(reason) => reason.to_string(),
        LedgerlyError::NoValidTables => "Error processing PDF - No valid tables found".to_string(),
        other => format!("Error processing PDF: {other}"),
    }
}

/// Only `.pdf` uploads are accepted, in any letter case. Content is not
/// inspected.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Path separators become word breaks, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_` are
/// trimmed. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let flat = filename.replace(['/', '\\'], " ");
    let joined = flat.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}
