use std::collections::HashSet;

use tracing::debug;

use crate::matcher::similarity_above;
use crate::models::{MetricResult, listed_reason};
use crate::options::EvalOptions;
use crate::table_parse::{Cell, Table};

pub const ALL_CONTENT_FOUND: &str = "All expected content found";

/// Fraction of expected cells present anywhere in `actual`.
///
/// Exact normalized matches earn 1.0; otherwise the best fuzzy ratio above
/// the threshold is credited as a partial match. Blank and duplicate expected
/// cells each count toward the denominator.
#[must_use]
pub fn evaluate_content(actual: &Table, expected: &Table, options: &EvalOptions) -> MetricResult {
    let actual_cells = actual.cells().map(|(_, cell)| cell).collect::<Vec<_>>();
    let exact = actual_cells
        .iter()
        .map(|cell| cell.normalized.as_str())
        .collect::<HashSet<_>>();

    let mut expected_count = 0_usize;
    let mut credit = 0.0;
    let mut missing = Vec::new();

    for (_, expected_cell) in expected.cells() {
        expected_count += 1;
        if exact.contains(expected_cell.normalized.as_str()) {
            credit += 1.0;
        } else if let Some(ratio) = best_fuzzy_ratio(expected_cell, &actual_cells, options) {
            credit += ratio;
        } else {
            missing.push(expected_cell.raw.as_str());
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let score = if expected_count == 0 {
        1.0
    } else {
        credit / expected_count as f64
    };

    let reason = if missing.is_empty() {
        ALL_CONTENT_FOUND.to_string()
    } else {
        listed_reason("Missing content", &missing, options.max_listed)
    };

    debug!(
        score,
        expected_cells = expected_count,
        missing = missing.len(),
        "content evaluated"
    );
    MetricResult::new(score, options.pass_threshold, reason)
}

fn best_fuzzy_ratio(expected: &Cell, candidates: &[&Cell], options: &EvalOptions) -> Option<f64> {
    let mut best = None;
    for candidate in candidates {
        let floor = best.unwrap_or(options.fuzzy_threshold);
        if let Some(ratio) = similarity_above(&expected.normalized, &candidate.normalized, floor) {
            best = Some(ratio);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{ALL_CONTENT_FOUND, evaluate_content};
    use crate::options::EvalOptions;
    use crate::table_parse::Table;

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn exact_match_ignores_case_and_punctuation() {
        let actual = Table::from_rows([["ALICE.", "30"]]);
        let expected = Table::from_rows([["alice", "30"]]);
        let result = evaluate_content(&actual, &expected, &EvalOptions::default());
        assert!(approx(result.score, 1.0));
        assert!(result.passed);
        assert_eq!(result.reason, ALL_CONTENT_FOUND);
    }

    #[test]
    fn fuzzy_match_earns_partial_credit() {
        let actual = Table::from_rows([["apples"]]);
        let expected = Table::from_rows([["apple"]]);
        let result = evaluate_content(&actual, &expected, &EvalOptions::default());
        assert!(approx(result.score, 10.0 / 11.0));
        assert_eq!(result.reason, ALL_CONTENT_FOUND);
    }

    #[test]
    fn ratio_at_threshold_is_missing() {
        let actual = Table::from_rows([["abycd"]]);
        let expected = Table::from_rows([["abxcd"]]);
        let result = evaluate_content(&actual, &expected, &EvalOptions::default());
        assert!(approx(result.score, 0.0));
        assert_eq!(result.reason, "Missing content: abxcd");
    }

    #[test]
    fn picks_best_fuzzy_candidate() {
        let actual = Table::from_rows([["international", "internationally"]]);
        let expected = Table::from_rows([["internationa"]]);
        let result = evaluate_content(&actual, &expected, &EvalOptions::default());
        assert!(approx(result.score, 24.0 / 25.0));
    }

    #[test]
    fn lists_at_most_five_missing_cells() {
        let actual = Table::from_rows([["zzz"]]);
        let expected = Table::from_rows([["a1", "b2", "c3", "d4"], ["e5", "f6", "g7", "h8"]]);
        let result = evaluate_content(&actual, &expected, &EvalOptions::default());
        assert!(approx(result.score, 0.0));
        assert_eq!(result.reason, "Missing content: a1, b2, c3, d4, e5 and 3 more");
    }

    #[test]
    fn blank_expected_cells_count_in_denominator() {
        let actual = Table::from_rows([["a", "b"]]);
        let expected = Table::from_rows([vec!["a", ""]]);
        let result = evaluate_content(&actual, &expected, &EvalOptions::default());
        assert!(approx(result.score, 0.5));
        assert_eq!(result.reason, "Missing content: ");
    }

    #[test]
    fn empty_expected_is_vacuous_pass() {
        let actual = Table::from_rows([["a"]]);
        let expected = Table::from_rows([Vec::<String>::new()]);
        let result = evaluate_content(&actual, &expected, &EvalOptions::default());
        assert!(approx(result.score, 1.0));
    }
}
