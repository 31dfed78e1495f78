//! Integration tests for the extract → normalize → aggregate → report pipeline.
//!
//! Uses a MockExtractor that returns pre-built RawTables without invoking
//! tabula, so these tests run without a Java runtime.

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::NaiveDate;
use ledgerly_core::error::LedgerlyError;
use ledgerly_core::extraction::{RawTable, TableExtractor};
use ledgerly_core::layout::LayoutClassifier;
use ledgerly_core::report::SHEET_NAMES;
use ledgerly_core::service::{Orchestrator, Response, Upload};
use ledgerly_core::{analyze_pdf, analyze_tables};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct MockExtractor {
    tables: Vec<RawTable>,
    seen: Mutex<Option<(PathBuf, Vec<u8>)>>,
}

impl MockExtractor {
    fn new(tables: Vec<RawTable>) -> Self {
        MockExtractor {
            tables,
            seen: Mutex::new(None),
        }
    }
}

impl TableExtractor for MockExtractor {
    fn extract_tables(&self, pdf_path: &Path) -> Result<Vec<RawTable>, LedgerlyError> {
        let bytes = std::fs::read(pdf_path)?;
        *self.seen.lock().unwrap() = Some((pdf_path.to_path_buf(), bytes));
        Ok(self.tables.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct FailingExtractor;

impl TableExtractor for FailingExtractor {
    fn extract_tables(&self, _pdf_path: &Path) -> Result<Vec<RawTable>, LedgerlyError> {
        Err(LedgerlyError::TabulaFailed {
            code: 1,
            stderr: "not a PDF".into(),
        })
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn standard() -> LayoutClassifier {
    LayoutClassifier::preset("standard").unwrap()
}

/// Two statement pages plus a narrow totals footer.
fn statement_tables() -> Vec<RawTable> {
    vec![
        RawTable::new(
            1,
            vec![
                row(&[
                    "Transaction Date",
                    "Value Date",
                    "Transaction Details",
                    "Money Out",
                    "Money In",
                    "Ledger Balance",
                    "Bank Reference Number",
                ]),
                row(&["20.03.2024", "20.03.2024", "Groceries", "-$85.20", "", "$1,914.80", "R3"]),
                row(&["01.03.2024", "01.03.2024", "Salary", "", "$2,000.00", "$2,000.00", "R1"]),
                row(&["", "", "", "", "", "", ""]),
            ],
        ),
        RawTable::new(
            2,
            vec![
                row(&[
                    "Transaction Date",
                    "Value Date",
                    "Transaction Details",
                    "Money Out",
                    "Money In",
                    "Ledger Balance",
                    "Bank Reference Number",
                ]),
                row(&["02.04.2024", "03.04.2024", "Rent", "-$1,200.00", "", "$714.80", "R4"]),
                row(&["01.04.2024", "01.04.2024", "Salary", "", "$2,000.00", "$2,714.80", "R5"]),
                row(&["Page 2 of 2", "", "", "", "", "", ""]),
            ],
        ),
        RawTable::new(2, vec![row(&["Totals", "-1,285.20", "4,000.00", ""])]),
    ]
}

fn open_report(path: &Path) -> Xlsx<Cursor<Vec<u8>>> {
    let bytes = std::fs::read(path).unwrap();
    open_workbook_from_rs(Cursor::new(bytes)).unwrap()
}

fn float_at(range: &calamine::Range<Data>, pos: (u32, u32)) -> f64 {
    match range.get_value(pos) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        other => panic!("expected a number at {pos:?}, got {other:?}"),
    }
}

fn string_at(range: &calamine::Range<Data>, pos: (u32, u32)) -> String {
    match range.get_value(pos) {
        Some(Data::String(s)) => s.clone(),
        other => panic!("expected a string at {pos:?}, got {other:?}"),
    }
}

fn assert_date(range: &calamine::Range<Data>, pos: (u32, u32)) {
    match range.get_value(pos) {
        Some(Data::DateTime(_)) => {}
        other => panic!("expected a date at {pos:?}, got {other:?}"),
    }
}

fn assert_blank(range: &calamine::Range<Data>, pos: (u32, u32)) {
    match range.get_value(pos) {
        None | Some(Data::Empty) => {}
        other => panic!("expected a blank cell at {pos:?}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn narrow_footer_table_is_ignored() {
    let tables = vec![
        RawTable::new(
            1,
            vec![
                row(&["12.03.2024", "12.03.2024", "B", "-10.00", "", "90.00", "R2"]),
                row(&["10.03.2024", "10.03.2024", "A", "", "100.00", "100.00", "R1"]),
                row(&["14.03.2024", "14.03.2024", "C", "-5.00", "", "85.00", "R3"]),
            ],
        ),
        RawTable::new(1, vec![row(&["15.03.2024", "Total", "-15.00", "100.00"])]),
    ];

    let analysis = analyze_tables(&tables, &standard()).unwrap().unwrap();
    let details: Vec<&str> = analysis
        .ledger
        .transactions()
        .iter()
        .map(|t| t.details.as_str())
        .collect();
    assert_eq!(details, vec!["A", "B", "C"]);
}

#[test]
fn currency_strings_and_dates_are_parsed() {
    let tables = vec![RawTable::new(
        1,
        vec![row(&["15.03.2024", "15.03.2024", "Refund", "", "$1,234.56", "$5,000.00", "X"])],
    )];
    let analysis = analyze_tables(&tables, &standard()).unwrap().unwrap();
    let t = &analysis.ledger.transactions()[0];
    assert_eq!(t.transaction_date, date(2024, 3, 15));
    assert_eq!(t.money_in, Some(dec!(1234.56)));
}

#[test]
fn header_and_undated_rows_are_excluded() {
    let analysis = analyze_tables(&statement_tables(), &standard())
        .unwrap()
        .unwrap();
    assert_eq!(analysis.ledger.len(), 4);
    assert!(analysis
        .ledger
        .transactions()
        .iter()
        .all(|t| t.details != "Transaction Details" && !t.details.is_empty()));
}

#[test]
fn only_narrow_tables_means_no_result() {
    let tables = vec![RawTable::new(1, vec![row(&["Totals", "1", "2", "3"])])];
    assert!(analyze_tables(&tables, &standard()).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Aggregation over the full statement
// ---------------------------------------------------------------------------

#[test]
fn statement_aggregates() {
    let pdf = tempfile::NamedTempFile::new().unwrap();
    let extractor = MockExtractor::new(statement_tables());
    let analysis = analyze_pdf(pdf.path(), &extractor, &standard())
        .unwrap()
        .unwrap();

    let s = &analysis.summary;
    assert_eq!(s.total_money_in, dec!(4000));
    assert_eq!(s.total_money_out, dec!(-1285.20));
    assert_eq!(s.net_movement, dec!(2714.80));
    assert_eq!(s.largest_out, Some(dec!(-1200)));
    assert_eq!(s.first_date, Some(date(2024, 3, 1)));
    assert_eq!(s.last_date, Some(date(2024, 4, 2)));

    assert_eq!(analysis.daily.len(), 4);
    let counted: usize = analysis.daily.iter().map(|d| d.transaction_count).sum();
    assert_eq!(counted, analysis.ledger.len());

    let (grand, months) = analysis.monthly.split_last().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(
        grand.money_in,
        months.iter().map(|m| m.money_in).sum::<Decimal>()
    );
    assert_eq!(
        grand.net_movement,
        months.iter().map(|m| m.net_movement).sum::<Decimal>()
    );
    assert_eq!(months[0].money_in_growth_pct, None);
    assert_eq!(months[1].money_in_growth_pct, Some(dec!(0)));
    // (-1200 - -85.20) / -85.20 * 100
    assert_eq!(
        months[1].money_out_growth_pct,
        Some((dec!(-1200) - dec!(-85.20)) / dec!(-85.20) * dec!(100))
    );
    assert_eq!(months[1].running_total_in, dec!(4000));
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[test]
fn upload_produces_report_and_cleans_staged_input() {
    let staging = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new(statement_tables());
    let classifier = standard();
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging.path());

    let upload = Upload {
        filename: "March Statement.PDF".into(),
        bytes: b"%PDF-1.4 fake".to_vec(),
    };
    let download = match orchestrator.handle_upload(Some(&upload)) {
        Response::Download(d) => d,
        Response::Message(m) => panic!("unexpected message: {m}"),
    };

    assert_eq!(download.download_name, "March_Statement.xlsx");
    assert_eq!(
        download.content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let (staged_path, staged_bytes) = extractor.seen.lock().unwrap().clone().unwrap();
    assert_eq!(staged_bytes, b"%PDF-1.4 fake");
    assert!(staged_path.starts_with(staging.path()));
    assert!(!staged_path.exists(), "staged input must be removed");

    let mut workbook = open_report(download.path());
    assert_eq!(workbook.sheet_names(), SHEET_NAMES.to_vec());

    let transactions = workbook.worksheet_range("Transactions").unwrap();
    assert_eq!(string_at(&transactions, (0, 0)), "Transaction Date");
    assert_eq!(string_at(&transactions, (1, 2)), "Salary");
    assert_eq!(string_at(&transactions, (4, 2)), "Rent");
    assert_eq!(float_at(&transactions, (4, 3)), -1200.0);

    let summary = workbook.worksheet_range("Summary").unwrap();
    assert_eq!(string_at(&summary, (1, 0)), "Total Money In");
    assert_eq!(float_at(&summary, (1, 1)), 4000.0);
    assert_eq!(string_at(&summary, (10, 0)), "Largest Transaction Out");
    assert_eq!(float_at(&summary, (10, 1)), -1200.0);

    let daily = workbook.worksheet_range("Daily Totals").unwrap();
    assert_eq!(float_at(&daily, (1, 3)), 1.0);

    let monthly = workbook.worksheet_range("Monthly Analysis").unwrap();
    assert_eq!(string_at(&monthly, (1, 0)), "March 2024");
    assert_eq!(string_at(&monthly, (2, 0)), "April 2024");
    assert_eq!(string_at(&monthly, (3, 0)), "GRAND TOTAL");
    assert_eq!(float_at(&monthly, (3, 1)), 4000.0);

    let report_path = download.path().to_path_buf();
    drop(download);
    assert!(!report_path.exists(), "dropping the download removes it");
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[test]
fn report_cells_carry_their_types() {
    let staging = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new(statement_tables());
    let classifier = standard();
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging.path());

    let upload = Upload {
        filename: "statement.pdf".into(),
        bytes: vec![],
    };
    let download = orchestrator.process(Some(&upload)).unwrap();
    let mut workbook = open_report(download.path());

    let transactions = workbook.worksheet_range("Transactions").unwrap();
    for r in 1..=4 {
        assert_date(&transactions, (r, 0));
    }
    // value date passes through as printed
    assert_eq!(string_at(&transactions, (1, 1)), "01.03.2024");

    let summary = workbook.worksheet_range("Summary").unwrap();
    assert_eq!(string_at(&summary, (11, 0)), "First Transaction Date");
    assert_date(&summary, (11, 1));
    assert_date(&summary, (12, 1));
    assert_eq!(float_at(&summary, (4, 1)), 4.0);

    let daily = workbook.worksheet_range("Daily Totals").unwrap();
    for r in 1..=4 {
        assert_date(&daily, (r, 0));
    }

    let monthly = workbook.worksheet_range("Monthly Analysis").unwrap();
    // growth: blank for the first month and the grand total, numeric between
    for col in 6..=8 {
        assert_blank(&monthly, (1, col));
        assert_blank(&monthly, (3, col));
    }
    assert_eq!(float_at(&monthly, (2, 6)), 0.0);
    assert_eq!(float_at(&monthly, (2, 8)), 0.0);
    let out_growth = float_at(&monthly, (2, 7));
    assert!((out_growth - 1308.4507).abs() < 0.001, "{out_growth}");
    assert_eq!(float_at(&monthly, (3, 9)), 4000.0);
}

#[test]
fn persisted_download_survives() {
    let staging = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new(statement_tables());
    let classifier = standard();
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging.path());

    let upload = Upload {
        filename: "s.pdf".into(),
        bytes: vec![],
    };
    let download = orchestrator.process(Some(&upload)).unwrap();
    let dest = out.path().join(&download.download_name);
    download.persist(&dest).unwrap();
    assert!(dest.exists());
}

#[test]
fn download_persists_across_filesystems() {
    // /dev/shm is a separate tmpfs mount on Linux; the target dir is on disk.
    let shm = Path::new("/dev/shm");
    let staging = if shm.is_dir() {
        tempfile::tempdir_in(shm).unwrap()
    } else {
        tempfile::tempdir().unwrap()
    };
    let out = tempfile::tempdir_in(env!("CARGO_TARGET_TMPDIR")).unwrap();
    let extractor = MockExtractor::new(statement_tables());
    let classifier = standard();
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging.path());

    let upload = Upload {
        filename: "s.pdf".into(),
        bytes: vec![],
    };
    let download = orchestrator.process(Some(&upload)).unwrap();
    let staged = download.path().to_path_buf();
    let dest = out.path().join("s.xlsx");
    download.persist(&dest).unwrap();

    assert!(!staged.exists(), "staged report must not be left behind");
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
    let mut workbook = open_report(&dest);
    assert_eq!(workbook.sheet_names(), SHEET_NAMES.to_vec());
    let summary = workbook.worksheet_range("Summary").unwrap();
    assert_eq!(float_at(&summary, (1, 1)), 4000.0);
}

#[test]
fn oversized_amounts_become_a_message() {
    let staging = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new(vec![RawTable::new(
        1,
        vec![
            row(&["01.03.2024", "", "A", "", "50000000000000000000000000000", "", ""]),
            row(&["02.03.2024", "", "B", "", "50000000000000000000000000000", "", ""]),
        ],
    )]);
    let classifier = standard();
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging.path());

    let upload = Upload {
        filename: "statement.pdf".into(),
        bytes: vec![],
    };
    match orchestrator.handle_upload(Some(&upload)) {
        Response::Message(m) => {
            assert!(m.starts_with("Error processing PDF: transaction amounts are too large"))
        }
        Response::Download(_) => panic!("expected a message"),
    }
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[test]
fn rejected_uploads() {
    let staging = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new(statement_tables());
    let classifier = standard();
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging.path());

    let message = |upload: Option<&Upload>| match orchestrator.handle_upload(upload) {
        Response::Message(m) => m,
        Response::Download(_) => panic!("expected a rejection"),
    };

    assert_eq!(message(None), "No file part");
    let unnamed = Upload {
        filename: String::new(),
        bytes: vec![1],
    };
    assert_eq!(message(Some(&unnamed)), "No selected file");
    let spreadsheet = Upload {
        filename: "statement.xlsx".into(),
        bytes: vec![1],
    };
    assert_eq!(message(Some(&spreadsheet)), "Invalid file type");

    assert!(extractor.seen.lock().unwrap().is_none(), "nothing processed");
}

#[test]
fn no_valid_tables_message_and_cleanup() {
    let staging = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new(vec![RawTable::new(1, vec![row(&["a", "b"])])]);
    let classifier = standard();
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging.path());

    let upload = Upload {
        filename: "statement.pdf".into(),
        bytes: vec![0; 16],
    };
    match orchestrator.handle_upload(Some(&upload)) {
        Response::Message(m) => assert_eq!(m, "Error processing PDF - No valid tables found"),
        Response::Download(_) => panic!("expected a message"),
    }
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[test]
fn extraction_failure_message_and_cleanup() {
    let staging = tempfile::tempdir().unwrap();
    let extractor = FailingExtractor;
    let classifier = standard();
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging.path());

    let upload = Upload {
        filename: "statement.pdf".into(),
        bytes: vec![0; 16],
    };
    match orchestrator.handle_upload(Some(&upload)) {
        Response::Message(m) => {
            assert_eq!(
                m,
                "Error processing PDF: tabula failed with exit code 1: not a PDF"
            )
        }
        Response::Download(_) => panic!("expected a message"),
    }
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[test]
fn malformed_date_is_reported_not_skipped() {
    let staging = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new(vec![RawTable::new(
        1,
        vec![row(&["30.02.2024", "", "Ghost", "-1.00", "", "", ""])],
    )]);
    let classifier = standard();
    let orchestrator = Orchestrator::new(&extractor, &classifier, staging.path());

    let upload = Upload {
        filename: "statement.pdf".into(),
        bytes: vec![],
    };
    match orchestrator.handle_upload(Some(&upload)) {
        Response::Message(m) => assert!(m.contains("malformed transaction date '30.02.2024'")),
        Response::Download(_) => panic!("expected a message"),
    }
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}
