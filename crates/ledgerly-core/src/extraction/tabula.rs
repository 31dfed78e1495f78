use crate::error::LedgerlyError;
use crate::extraction::{RawTable, TableExtractor};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where to find the Java runtime and the tabula-java jar.
#[derive(Debug, Clone)]
pub struct TabulaConfig {
    pub java: PathBuf,
    pub jar: PathBuf,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        TabulaConfig {
            java: PathBuf::from("java"),
            jar: PathBuf::from("tabula.jar"),
        }
    }
}

/// Table extraction backend using tabula-java.
///
/// Runs lattice-mode detection on all pages with guessing disabled and asks
/// for JSON output, which carries no header inference: every detected row
/// comes back as plain cell text.
pub struct TabulaExtractor {
    config: TabulaConfig,
}

impl TabulaExtractor {
    pub fn new(config: TabulaConfig) -> Self {
        TabulaExtractor { config }
    }

    /// Check if the configured Java runtime can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.java)
            .arg("-version")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for TabulaExtractor {
    fn default() -> Self {
        Self::new(TabulaConfig::default())
    }
}

impl TableExtractor for TabulaExtractor {
    fn extract_tables(&self, pdf_path: &Path) -> Result<Vec<RawTable>, LedgerlyError> {
        if !self.config.jar.is_file() {
            return Err(LedgerlyError::Extraction(format!(
                "tabula jar not found at {}",
                self.config.jar.display()
            )));
        }

        let output = Command::new(&self.config.java)
            .arg("-jar")
            .arg(&self.config.jar)
            .args(["--lattice", "--pages", "all", "--format", "JSON", "--silent"])
            .arg(pdf_path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LedgerlyError::TabulaNotFound
                } else {
                    LedgerlyError::Extraction(format!("tabula failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(LedgerlyError::TabulaFailed { code, stderr });
        }

        let tables = parse_tabula_json(&output.stdout)?;
        tracing::debug!(
            pdf = %pdf_path.display(),
            tables = tables.len(),
            "tabula extraction finished"
        );
        Ok(tables)
    }

    fn backend_name(&self) -> &str {
        "tabula"
    }
}

#[derive(Debug, Deserialize)]
struct TabulaTable {
    #[serde(default, alias = "page")]
    page_number: usize,
    #[serde(default)]
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Debug, Deserialize)]
struct TabulaCell {
    #[serde(default)]
    text: String,
}

/// Parse tabula's `--format JSON` output into raw tables.
///
/// Cell text keeps tabula's embedded line breaks collapsed to single spaces.
fn parse_tabula_json(bytes: &[u8]) -> Result<Vec<RawTable>, LedgerlyError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }

    let tables: Vec<TabulaTable> = serde_json::from_slice(bytes)
        .map_err(|e| LedgerlyError::Extraction(format!("unreadable tabula output: {e}")))?;

    Ok(tables
        .into_iter()
        .map(|t| RawTable {
            page_number: t.page_number,
            rows: t
                .data
                .into_iter()
                .map(|row| row.into_iter().map(|c| collapse_lines(&c.text)).collect())
                .collect(),
        })
        .collect())
}

fn collapse_lines(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
