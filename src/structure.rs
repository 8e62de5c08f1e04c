use tracing::debug;

use crate::models::MetricResult;
use crate::options::EvalOptions;
use crate::table_parse::Table;

/// Row and column fidelity. Extra rows or columns in `actual` are not
/// penalized; each ratio is capped at 1.0.
#[must_use]
pub fn evaluate_structure(actual: &Table, expected: &Table, options: &EvalOptions) -> MetricResult {
    let (actual_rows, expected_rows) = (actual.row_count(), expected.row_count());
    let (actual_cols, expected_cols) = (actual.column_count(), expected.column_count());

    let row_score = capped_ratio(actual_rows, expected_rows);
    let col_score = capped_ratio(actual_cols, expected_cols);
    let score = (row_score + col_score) / 2.0;

    debug!(row_score, col_score, "structure evaluated");
    MetricResult::new(
        score,
        options.pass_threshold,
        format!(
            "Row match: {actual_rows}/{expected_rows}, Column match: {actual_cols}/{expected_cols}"
        ),
    )
}

#[allow(clippy::cast_precision_loss)]
fn capped_ratio(actual: usize, expected: usize) -> f64 {
    if expected == 0 {
        return 0.0;
    }
    (actual as f64 / expected as f64).min(1.0)
}
