//! Spreadsheet rendering of a ledger and its aggregates.
//!
//! The workbook always has four sheets, in order: Transactions, Summary,
//! Daily Totals, Monthly Analysis. Every header row is bold on blue, and
//! frozen. Money is shown as `#,##0.00`, dates as `dd/mm/yyyy`, growth as a
//! number with a literal `%`. Net movement columns turn green when positive
//! and red when negative.

use crate::aggregate::{DailyTotal, MetricValue, MonthlyTotal, Period, SummaryRecord};
use crate::error::LedgerlyError;
use crate::model::Ledger;
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{
    Color, ConditionalFormatCell, ConditionalFormatCellRule, ExcelDateTime, Format, FormatAlign,
    FormatBorder, Workbook, Worksheet, XlsxError,
};
use std::io::{self, Read, Write};
use std::path::Path;

pub const TRANSACTIONS_SHEET: &str = "Transactions";
pub const SUMMARY_SHEET: &str = "Summary";
pub const DAILY_SHEET: &str = "Daily Totals";
pub const MONTHLY_SHEET: &str = "Monthly Analysis";

/// Sheet names in workbook order.
pub const SHEET_NAMES: [&str; 4] = [TRANSACTIONS_SHEET, SUMMARY_SHEET, DAILY_SHEET, MONTHLY_SHEET];

pub const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const GRAND_TOTAL_LABEL: &str = "GRAND TOTAL";

const TRANSACTION_HEADERS: [&str; 7] = [
    "Transaction Date",
    "Value Date",
    "Transaction Details",
    "Money Out",
    "Money In",
    "Ledger Balance",
    "Bank Reference Number",
];

const DAILY_HEADERS: [&str; 5] = [
    "Transaction Date",
    "Money In",
    "Money Out",
    "Transaction Count",
    "Net Movement",
];

const MONTHLY_HEADERS: [&str; 12] = [
    "Month",
    "Money In",
    "Money Out",
    "Transaction Count",
    "Net Movement",
    "Average Transaction Value",
    "Money In Growth %",
    "Money Out Growth %",
    "Transaction Count Growth %",
    "Running Total In",
    "Running Total Out",
    "Running Net Movement",
];

const NET_MOVEMENT_COL: u16 = 4;
const LAST_ROW: u32 = 1_048_575;

const DATE_WIDTH: f64 = 12.0;
const MONEY_WIDTH: f64 = 15.0;
const DETAILS_WIDTH: f64 = 50.0;
const REFERENCE_WIDTH: f64 = 20.0;
const RUNNING_TOTAL_WIDTH: f64 = 18.0;

const MONEY_FORMAT: &str = "#,##0.00";
const HEADER_BLUE: u32 = 0x4F81BD;

struct Formats {
    header: Format,
    money: Format,
    count: Format,
    percentage: Format,
    date: Format,
    text: Format,
    wrapped_text: Format,
    grand_total_text: Format,
    grand_total_money: Format,
    grand_total_count: Format,
    positive: Format,
    negative: Format,
}

impl Formats {
    fn new() -> Self {
        let grand_total = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(HEADER_BLUE))
            .set_font_color(Color::White)
            .set_border(FormatBorder::Thin);

        Formats {
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(HEADER_BLUE))
                .set_font_color(Color::White)
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            money: Format::new()
                .set_num_format(MONEY_FORMAT)
                .set_align(FormatAlign::Right),
            count: Format::new()
                .set_num_format("#,##0")
                .set_align(FormatAlign::Right),
            percentage: Format::new()
                .set_num_format("0.0\"%\"")
                .set_align(FormatAlign::Right),
            date: Format::new()
                .set_num_format("dd/mm/yyyy")
                .set_align(FormatAlign::Center),
            text: Format::new()
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter),
            wrapped_text: Format::new()
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap(),
            grand_total_money: grand_total.clone().set_num_format(MONEY_FORMAT),
            grand_total_count: grand_total.clone().set_num_format("#,##0"),
            grand_total_text: grand_total,
            positive: Format::new()
                .set_font_color(Color::Green)
                .set_num_format(MONEY_FORMAT),
            negative: Format::new()
                .set_font_color(Color::Red)
                .set_num_format(MONEY_FORMAT),
        }
    }
}

/// Lay out the four report sheets.
pub fn assemble(
    ledger: &Ledger,
    summary: &SummaryRecord,
    daily: &[DailyTotal],
    monthly: &[MonthlyTotal],
) -> Result<Workbook, LedgerlyError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    workbook.push_worksheet(transactions_sheet(ledger, &formats)?);
    workbook.push_worksheet(summary_sheet(summary, &formats)?);
    workbook.push_worksheet(daily_sheet(daily, &formats)?);
    workbook.push_worksheet(monthly_sheet(monthly, &formats)?);

    tracing::debug!(
        transactions = ledger.len(),
        days = daily.len(),
        months = monthly.len().saturating_sub(1),
        "assembled report workbook"
    );
    Ok(workbook)
}

/// Write the workbook to `dest` in one step.
///
/// The file is serialized in memory, written next to `dest` under a
/// temporary name and renamed into place, so `dest` either holds the whole
/// report or is untouched.
pub fn save_report(workbook: &mut Workbook, dest: &Path) -> Result<(), LedgerlyError> {
    let bytes = workbook.save_to_buffer()?;
    place_file(bytes.as_slice(), dest)?;
    tracing::info!(path = %dest.display(), bytes = bytes.len(), "report written");
    Ok(())
}

/// Copy `source` to a temporary file beside `dest`, then rename it over
/// `dest`. The rename never crosses a filesystem.
pub(crate) fn place_file(mut source: impl Read, dest: &Path) -> Result<u64, LedgerlyError> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".ledgerly-")
        .suffix(".xlsx")
        .tempfile_in(dir)?;
    let copied = io::copy(&mut source, &mut tmp)?;
    tmp.flush()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(copied)
}

fn transactions_sheet(ledger: &Ledger, f: &Formats) -> Result<Worksheet, XlsxError> {
    let mut ws = Worksheet::new();
    ws.set_name(TRANSACTIONS_SHEET)?;
    write_headers(&mut ws, &TRANSACTION_HEADERS, f)?;

    let widths = [
        DATE_WIDTH,
        DATE_WIDTH,
        DETAILS_WIDTH,
        MONEY_WIDTH,
        MONEY_WIDTH,
        MONEY_WIDTH,
        REFERENCE_WIDTH,
    ];
    set_widths(&mut ws, &widths)?;

    for (i, t) in ledger.transactions().iter().enumerate() {
        let row = i as u32 + 1;
        write_date(&mut ws, row, 0, Some(t.transaction_date), &f.date)?;
        ws.write_string_with_format(row, 1, &t.value_date, &f.date)?;
        ws.write_string_with_format(row, 2, &t.details, &f.wrapped_text)?;
        write_money(&mut ws, row, 3, t.money_out, &f.money)?;
        write_money(&mut ws, row, 4, t.money_in, &f.money)?;
        write_money(&mut ws, row, 5, t.ledger_balance, &f.money)?;
        ws.write_string_with_format(row, 6, &t.bank_reference, &f.wrapped_text)?;
    }

    ws.set_freeze_panes(1, 0)?;
    ws.autofilter(0, 0, ledger.len() as u32, TRANSACTION_HEADERS.len() as u16 - 1)?;
    Ok(ws)
}

fn summary_sheet(summary: &SummaryRecord, f: &Formats) -> Result<Worksheet, XlsxError> {
    let mut ws = Worksheet::new();
    ws.set_name(SUMMARY_SHEET)?;
    write_headers(&mut ws, &["Metric", "Value"], f)?;
    set_widths(&mut ws, &[30.0, 20.0])?;

    for (i, (name, value)) in summary.metrics().into_iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string_with_format(row, 0, name, &f.text)?;
        match value {
            MetricValue::Money(v) => write_money(&mut ws, row, 1, v, &f.money)?,
            MetricValue::Count(n) => {
                ws.write_number_with_format(row, 1, n as f64, &f.count)?;
            }
            MetricValue::Date(d) => write_date(&mut ws, row, 1, d, &f.date)?,
        }
    }

    ws.set_freeze_panes(1, 0)?;
    Ok(ws)
}

fn daily_sheet(daily: &[DailyTotal], f: &Formats) -> Result<Worksheet, XlsxError> {
    let mut ws = Worksheet::new();
    ws.set_name(DAILY_SHEET)?;
    write_headers(&mut ws, &DAILY_HEADERS, f)?;
    set_widths(&mut ws, &[DATE_WIDTH, MONEY_WIDTH, MONEY_WIDTH, MONEY_WIDTH, MONEY_WIDTH])?;

    for (i, d) in daily.iter().enumerate() {
        let row = i as u32 + 1;
        write_date(&mut ws, row, 0, Some(d.date), &f.date)?;
        write_money(&mut ws, row, 1, Some(d.money_in), &f.money)?;
        write_money(&mut ws, row, 2, Some(d.money_out), &f.money)?;
        ws.write_number_with_format(row, 3, d.transaction_count as f64, &f.count)?;
        write_money(&mut ws, row, 4, Some(d.net_movement), &f.money)?;
    }

    ws.set_freeze_panes(1, 0)?;
    highlight_net_movement(&mut ws, f)?;
    Ok(ws)
}

fn monthly_sheet(monthly: &[MonthlyTotal], f: &Formats) -> Result<Worksheet, XlsxError> {
    let mut ws = Worksheet::new();
    ws.set_name(MONTHLY_SHEET)?;
    write_headers(&mut ws, &MONTHLY_HEADERS, f)?;

    let mut widths = [MONEY_WIDTH; 12];
    widths[9..].fill(RUNNING_TOTAL_WIDTH);
    set_widths(&mut ws, &widths)?;

    for (i, m) in monthly.iter().enumerate() {
        let row = i as u32 + 1;
        let grand = m.period.is_grand_total();
        let (text, money, count, pct) = if grand {
            ws.set_row_format(row, &f.grand_total_text)?;
            (
                &f.grand_total_text,
                &f.grand_total_money,
                &f.grand_total_count,
                &f.grand_total_text,
            )
        } else {
            (&f.text, &f.money, &f.count, &f.percentage)
        };

        let label = match m.period {
            Period::Month(month) => month.to_string(),
            Period::GrandTotal => GRAND_TOTAL_LABEL.to_string(),
        };
        ws.write_string_with_format(row, 0, label, text)?;
        write_money(&mut ws, row, 1, Some(m.money_in), money)?;
        write_money(&mut ws, row, 2, Some(m.money_out), money)?;
        ws.write_number_with_format(row, 3, m.transaction_count as f64, count)?;
        write_money(&mut ws, row, 4, Some(m.net_movement), money)?;
        write_money(&mut ws, row, 5, m.average_transaction_value, money)?;
        write_money(&mut ws, row, 6, m.money_in_growth_pct, pct)?;
        write_money(&mut ws, row, 7, m.money_out_growth_pct, pct)?;
        write_money(&mut ws, row, 8, m.transaction_count_growth_pct, pct)?;
        write_money(&mut ws, row, 9, Some(m.running_total_in), money)?;
        write_money(&mut ws, row, 10, Some(m.running_total_out), money)?;
        write_money(&mut ws, row, 11, Some(m.running_net_movement), money)?;
    }

    ws.set_freeze_panes(1, 0)?;
    highlight_net_movement(&mut ws, f)?;
    Ok(ws)
}

fn write_headers(ws: &mut Worksheet, headers: &[&str], f: &Formats) -> Result<(), XlsxError> {
    for (col, name) in headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *name, &f.header)?;
    }
    Ok(())
}

fn set_widths(ws: &mut Worksheet, widths: &[f64]) -> Result<(), XlsxError> {
    for (col, width) in widths.iter().enumerate() {
        ws.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

fn highlight_net_movement(ws: &mut Worksheet, f: &Formats) -> Result<(), XlsxError> {
    let positive = ConditionalFormatCell::new()
        .set_rule(ConditionalFormatCellRule::GreaterThan(0))
        .set_format(&f.positive);
    let negative = ConditionalFormatCell::new()
        .set_rule(ConditionalFormatCellRule::LessThan(0))
        .set_format(&f.negative);

    ws.add_conditional_format(1, NET_MOVEMENT_COL, LAST_ROW, NET_MOVEMENT_COL, &positive)?;
    ws.add_conditional_format(1, NET_MOVEMENT_COL, LAST_ROW, NET_MOVEMENT_COL, &negative)?;
    Ok(())
}

/// Missing values still get the cell format, so styled rows stay unbroken.
fn write_money(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<Decimal>,
    format: &Format,
) -> Result<(), XlsxError> {
    match value.and_then(|v| v.to_f64()) {
        Some(v) => ws.write_number_with_format(row, col, v, format)?,
        None => ws.write_blank(row, col, format)?,
    };
    Ok(())
}

fn write_date(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<NaiveDate>,
    format: &Format,
) -> Result<(), XlsxError> {
    let Some(d) = value else {
        ws.write_blank(row, col, format)?;
        return Ok(());
    };
    let year = u16::try_from(d.year()).unwrap_or_default();
    match ExcelDateTime::from_ymd(year, d.month() as u8, d.day() as u8) {
        Ok(date) => ws.write_datetime_with_format(row, col, &date, format)?,
        // Outside the spreadsheet calendar; keep the value readable.
        Err(_) => ws.write_string_with_format(row, col, d.format("%d/%m/%Y").to_string(), format)?,
    };
    Ok(())
}
