//! Neighbor-based positional checks.
//!
//! A matched cell is considered correctly placed when the cells above and to
//! the left of it in `actual` resemble the cells above and to the left of its
//! counterpart in `expected`. Only up and left neighbors are consulted.

use std::collections::HashMap;

use tracing::debug;

use crate::matcher::exceeds;
use crate::models::{MetricResult, listed_reason};
use crate::options::EvalOptions;
use crate::table_parse::{Coordinate, Table};

pub const ALL_CELLS_POSITIONED: &str = "All cells correctly positioned";

/// Normalized text to its location in the expected table.
///
/// Built from non-blank cells in row-major order; when normalized texts
/// repeat, the last occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct ExpectedCellIndex<'a> {
    coordinates: HashMap<&'a str, Coordinate>,
}

impl<'a> ExpectedCellIndex<'a> {
    #[must_use]
    pub fn build(expected: &'a Table) -> Self {
        let coordinates = expected
            .cells()
            .filter(|(_, cell)| !cell.is_blank())
            .map(|(at, cell)| (cell.normalized.as_str(), at))
            .collect();
        Self { coordinates }
    }

    #[must_use]
    pub fn get(&self, normalized: &str) -> Option<Coordinate> {
        self.coordinates.get(normalized).copied()
    }

    fn len(&self) -> usize {
        self.coordinates.len()
    }
}

/// Normalized up and left neighbors that exist and are not blank.
#[must_use]
pub fn neighbors(table: &Table, at: Coordinate) -> Vec<&str> {
    let up = at.row.checked_sub(1).map(|row| Coordinate::new(row, at.col));
    let left = at.col.checked_sub(1).map(|col| Coordinate::new(at.row, col));

    [up, left]
        .into_iter()
        .flatten()
        .filter_map(|neighbor| table.get(neighbor))
        .filter(|cell| !cell.is_blank())
        .map(|cell| cell.normalized.as_str())
        .collect()
}

#[must_use]
pub fn evaluate_position(actual: &Table, expected: &Table, options: &EvalOptions) -> MetricResult {
    let index = ExpectedCellIndex::build(expected);

    let mut considered = 0_usize;
    let mut correct = 0_usize;
    let mut misplaced = Vec::new();

    for (actual_at, cell) in actual.cells() {
        if cell.normalized.is_empty() {
            continue;
        }
        let Some(expected_at) = index.get(&cell.normalized) else {
            continue;
        };

        considered += 1;
        let actual_neighbors = neighbors(actual, actual_at);
        let expected_neighbors = neighbors(expected, expected_at);

        let agreeing = actual_neighbors
            .iter()
            .filter(|actual_neighbor| {
                expected_neighbors.iter().any(|expected_neighbor| {
                    exceeds(actual_neighbor, expected_neighbor, options.fuzzy_threshold)
                })
            })
            .count();

        if agreeing >= expected_neighbors.len().min(2) {
            correct += 1;
        } else {
            misplaced.push(cell.raw.as_str());
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let score = if considered == 0 {
        1.0
    } else {
        correct as f64 / considered as f64
    };

    let reason = if misplaced.is_empty() {
        ALL_CELLS_POSITIONED.to_string()
    } else {
        listed_reason("Misplaced cells", &misplaced, options.max_listed)
    };

    debug!(
        score,
        indexed = index.len(),
        considered,
        misplaced = misplaced.len(),
        "position evaluated"
    );
    MetricResult::new(score, options.pass_threshold, reason)
}
