//! Grades a markdown table against an expected one.
//!
//! Both sides are parsed into grids and compared on three axes: whether the
//! expected text is present, whether the dimensions match, and whether
//! matched cells sit next to the right neighbors. The weighted combination
//! yields a pass/fail [`Verdict`].

pub mod content;
pub mod error;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod options;
pub mod position;
pub mod structure;
pub mod table_parse;

use serde_json::Value;
use tracing::{debug, warn};

pub use content::evaluate_content;
pub use error::{EvalError, ParseError};
pub use matcher::similarity_ratio;
pub use models::{EvaluationReport, FailureReport, MetricResult, NamedScores, Verdict};
pub use normalize::normalize;
pub use options::{EvalOptions, ScoreWeights};
pub use position::{ExpectedCellIndex, evaluate_position};
pub use structure::evaluate_structure;
pub use table_parse::{Cell, Coordinate, Table, parse_table, parse_table_bytes};

use crate::models::EXPECTED_CONTENT_VAR;

/// Grades `actual` against `expected` with the default weights and
/// thresholds.
#[must_use]
pub fn evaluate(actual: &str, expected: &str) -> Verdict {
    grade_tables(
        &parse_table(actual),
        &parse_table(expected),
        &EvalOptions::default(),
    )
}

pub fn evaluate_with_options(
    actual: &str,
    expected: &str,
    options: &EvalOptions,
) -> Result<Verdict, EvalError> {
    options.validate()?;
    Ok(grade_tables(
        &parse_table(actual),
        &parse_table(expected),
        options,
    ))
}

/// Like [`evaluate_with_options`] for raw file contents. Non-UTF-8 input is
/// graded as a parse failure.
pub fn evaluate_bytes(
    actual: &[u8],
    expected: &[u8],
    options: &EvalOptions,
) -> Result<Verdict, EvalError> {
    options.validate()?;
    let parsed = parse_table_bytes(actual)
        .and_then(|actual| parse_table_bytes(expected).map(|expected| (actual, expected)));

    Ok(match parsed {
        Ok((actual, expected)) => grade_tables(&actual, &expected, options),
        Err(error) => parse_failure(&error),
    })
}

/// Harness entry point: `context.vars.expected_content` holds the expected
/// table text.
pub fn assert_table(output: &str, context: &Value) -> Result<Verdict, EvalError> {
    assert_table_with_options(output, context, &EvalOptions::default())
}

pub fn assert_table_with_options(
    output: &str,
    context: &Value,
    options: &EvalOptions,
) -> Result<Verdict, EvalError> {
    assert_table_bytes(output.as_bytes(), context, options)
}

/// Harness entry point for raw output bytes. Non-UTF-8 output is graded as a
/// parse failure, like a non-string `expected_content`.
pub fn assert_table_bytes(
    output: &[u8],
    context: &Value,
    options: &EvalOptions,
) -> Result<Verdict, EvalError> {
    options.validate()?;
    let expected = context
        .get("vars")
        .and_then(|vars| vars.get(EXPECTED_CONTENT_VAR))
        .ok_or_else(|| EvalError::MissingVariable(EXPECTED_CONTENT_VAR.to_string()))?;

    let parsed = parse_table_bytes(output).and_then(|actual| {
        expected
            .as_str()
            .map(|expected| (actual, parse_table(expected)))
            .ok_or(ParseError::NotText {
                kind: json_kind(expected),
            })
    });

    Ok(match parsed {
        Ok((actual, expected)) => grade_tables(&actual, &expected, options),
        Err(error) => parse_failure(&error),
    })
}

/// Runs the three metrics on already parsed grids and combines them.
#[must_use]
pub fn grade_tables(actual: &Table, expected: &Table, options: &EvalOptions) -> Verdict {
    if actual.is_empty() || expected.is_empty() {
        warn!(
            actual_rows = actual.row_count(),
            expected_rows = expected.row_count(),
            "empty table detected"
        );
        return Verdict::Failure(FailureReport::empty_table());
    }

    debug!(
        actual_rows = actual.row_count(),
        actual_cols = actual.column_count(),
        expected_rows = expected.row_count(),
        expected_cols = expected.column_count(),
        "grading tables"
    );

    let content = evaluate_content(actual, expected, options);
    let structure = evaluate_structure(actual, expected, options);
    let position = evaluate_position(actual, expected, options);

    let overall = options
        .weights
        .combine(content.score, structure.score, position.score);
    let reason = format!(
        "Content: {:.2}, Structure: {:.2}, Positioning: {:.2}",
        content.score, structure.score, position.score
    );
    let named_scores = NamedScores {
        content_presence: content.score,
        structure_correctness: structure.score,
        cell_position_accuracy: position.score,
        table_match_score: overall,
    };

    debug!(overall, "tables graded");
    Verdict::Report(EvaluationReport {
        passed: overall >= options.pass_threshold,
        score: overall,
        reason,
        component_results: [content, structure, position],
        named_scores,
    })
}

fn parse_failure(error: &ParseError) -> Verdict {
    warn!(%error, "failed to parse tables");
    Verdict::Failure(FailureReport::parse_failure(error))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
