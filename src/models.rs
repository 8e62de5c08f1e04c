use std::fmt::Write;

use serde::{Deserialize, Serialize};

pub const EXPECTED_CONTENT_VAR: &str = "expected_content";
pub const EMPTY_TABLE_REASON: &str = "Empty table detected";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricResult {
    #[serde(rename = "pass")]
    pub passed: bool,
    pub score: f64,
    pub reason: String,
}

impl MetricResult {
    #[must_use]
    pub fn new(score: f64, pass_threshold: f64, reason: impl Into<String>) -> Self {
        Self {
            passed: score >= pass_threshold,
            score,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NamedScores {
    #[serde(rename = "ContentPresence")]
    pub content_presence: f64,
    #[serde(rename = "StructureCorrectness")]
    pub structure_correctness: f64,
    #[serde(rename = "CellPositionAccuracy")]
    pub cell_position_accuracy: f64,
    #[serde(rename = "TableMatchScore")]
    pub table_match_score: f64,
}

/// Full grading result with per-metric breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationReport {
    #[serde(rename = "pass")]
    pub passed: bool,
    pub score: f64,
    pub reason: String,
    #[serde(rename = "componentResults")]
    pub component_results: [MetricResult; 3],
    #[serde(rename = "namedScores")]
    pub named_scores: NamedScores,
}

impl EvaluationReport {
    #[must_use]
    pub fn content(&self) -> &MetricResult {
        &self.component_results[0]
    }

    #[must_use]
    pub fn structure(&self) -> &MetricResult {
        &self.component_results[1]
    }

    #[must_use]
    pub fn position(&self) -> &MetricResult {
        &self.component_results[2]
    }

    /// Content, structure and position, in that order.
    #[must_use]
    pub fn components(&self) -> &[MetricResult] {
        &self.component_results
    }
}

/// Short-circuit result for unparseable or empty input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailureReport {
    #[serde(rename = "pass")]
    pub passed: bool,
    pub score: f64,
    pub reason: String,
}

impl FailureReport {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            score: 0.0,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn empty_table() -> Self {
        Self::new(EMPTY_TABLE_REASON)
    }

    #[must_use]
    pub fn parse_failure(message: impl std::fmt::Display) -> Self {
        Self::new(format!("Failed to parse tables: {message}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Verdict {
    Report(EvaluationReport),
    Failure(FailureReport),
}

impl Verdict {
    #[must_use]
    pub fn passed(&self) -> bool {
        match self {
            Self::Report(report) => report.passed,
            Self::Failure(failure) => failure.passed,
        }
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        match self {
            Self::Report(report) => report.score,
            Self::Failure(failure) => failure.score,
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Report(report) => &report.reason,
            Self::Failure(failure) => &failure.reason,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&EvaluationReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Failure(_) => None,
        }
    }
}

/// Builds a reason of the form `"{prefix}: a, b, c and N more"`.
pub(crate) fn listed_reason(prefix: &str, items: &[&str], max_listed: usize) -> String {
    let shown = items.iter().take(max_listed).copied().collect::<Vec<_>>();
    let mut reason = format!("{prefix}: {}", shown.join(", "));
    if items.len() > max_listed {
        let _ = write!(reason, " and {} more", items.len() - max_listed);
    }
    reason
}
