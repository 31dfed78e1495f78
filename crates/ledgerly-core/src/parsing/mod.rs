pub mod money;

pub use money::parse_amount;

/// A cell is blank when it holds nothing but whitespace.
pub fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// A row is empty when every one of its cells is blank.
pub fn is_empty_row(row: &[String]) -> bool {
    row.iter().all(|c| is_blank(c))
}
