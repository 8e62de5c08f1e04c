use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::normalize::normalize;

static SEPARATOR_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[|\-:\s]+$").expect("hardcoded separator regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A trimmed cell and its comparison form, computed once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub raw: String,
    pub normalized: String,
}

impl Cell {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Self { raw, normalized }
    }

    /// True when the trimmed source text is empty. A cell holding only
    /// stripped punctuation is *not* blank even though it normalizes to "".
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

/// Parsed grid. Rows may differ in length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
}

impl Table {
    #[must_use]
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Cell::new).collect())
            .collect();
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row length; 0 for an empty table.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn get(&self, at: Coordinate) -> Option<&Cell> {
        self.rows.get(at.row).and_then(|row| row.get(at.col))
    }

    /// Row-major iteration over every cell with its position.
    pub fn cells(&self) -> impl Iterator<Item = (Coordinate, &Cell)> {
        self.rows.iter().enumerate().flat_map(|(row_index, row)| {
            row.iter()
                .enumerate()
                .map(move |(col_index, cell)| (Coordinate::new(row_index, col_index), cell))
        })
    }

    #[cfg(test)]
    fn raw_rows(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.raw.as_str()).collect())
            .collect()
    }
}

/// Parses pipe-delimited table text.
///
/// Only lines starting with `|` (after trimming) are kept. Alignment rows
/// such as `|---|:--:|` are dropped unless they are the first kept line.
/// Outer pipes are removed when the cell next to them is blank.
#[must_use]
pub fn parse_table(text: &str) -> Table {
    let table_lines = text
        .trim()
        .split('\n')
        .map(str::trim)
        .filter(|line| line.starts_with('|'));

    let rows = table_lines
        .enumerate()
        .filter(|(index, line)| *index == 0 || !SEPARATOR_ROW.is_match(line))
        .map(|(_, line)| split_row(line))
        .collect();

    Table { rows }
}

/// Byte-level entry point used by file-based callers.
pub fn parse_table_bytes(bytes: &[u8]) -> Result<Table, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(parse_table(text))
}

fn split_row(line: &str) -> Vec<Cell> {
    let mut cells = line.split('|').collect::<Vec<_>>();
    if cells.first().is_some_and(|cell| cell.trim().is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|cell| cell.trim().is_empty()) {
        cells.pop();
    }

    cells.into_iter().map(|cell| Cell::new(cell.trim())).collect()
}

#[cfg(test)]
mod tests {
    use super::{Coordinate, Table, parse_table, parse_table_bytes};

    #[test]
    fn parses_markdown_table_and_drops_alignment_row() {
        let table = parse_table("| Name | Age |\n|------|:---:|\n| Alice | 30 |\n");
        assert_eq!(table.raw_rows(), vec![vec!["Name", "Age"], vec!["Alice", "30"]]);
    }

    #[test]
    fn ignores_surrounding_prose() {
        let text = "Here is the table:\n\n  | a | b |  \nnot a row | x |\n| c | d |\nDone.";
        let table = parse_table(text);
        assert_eq!(table.raw_rows(), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn keeps_separator_in_first_position() {
        let table = parse_table("|---|---|\n| a | b |\n|---|---|");
        assert_eq!(table.raw_rows(), vec![vec!["---", "---"], vec!["a", "b"]]);
    }

    #[test]
    fn tolerates_missing_trailing_pipe_and_ragged_rows() {
        let table = parse_table("| a | b | c\n| d |\n|e|f|");
        assert_eq!(
            table.raw_rows(),
            vec![vec!["a", "b", "c"], vec!["d"], vec!["e", "f"]]
        );
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn keeps_inner_empty_cells() {
        let table = parse_table("| a |  | c |");
        assert_eq!(table.raw_rows(), vec![vec!["a", "", "c"]]);
        assert!(table.get(Coordinate::new(0, 1)).is_some_and(|cell| cell.is_blank()));
    }

    #[test]
    fn lone_pipe_yields_empty_row() {
        let table = parse_table("|");
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn text_without_pipes_is_empty() {
        assert!(parse_table("just some prose\nand more").is_empty());
        assert_eq!(Table::default().column_count(), 0);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let table = parse_table("| A | B |\r\n|---|---|\r\n| 1 | 2 |\r\n");
        assert_eq!(table.raw_rows(), vec![vec!["A", "B"], vec!["1", "2"]]);
    }

    #[test]
    fn cells_carry_normalized_text() {
        let table = parse_table("|  Hello,   World! |");
        let cell = table.get(Coordinate::new(0, 0)).expect("cell exists");
        assert_eq!(cell.raw, "Hello,   World!");
        assert_eq!(cell.normalized, "hello world");
    }

    #[test]
    fn rejects_invalid_utf8_bytes() {
        let err = parse_table_bytes(&[b'|', 0xff, b'|']).expect_err("invalid UTF-8 should fail");
        assert!(err.to_string().contains("UTF-8"));
    }
}
