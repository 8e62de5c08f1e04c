use std::str::Utf8Error;

use thiserror::Error;

/// Input that cannot be turned into a grid. Reported to graders as a failing
/// verdict rather than returned as an error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("table text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    #[error("expected table text, found {kind}")]
    NotText { kind: &'static str },
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("context is missing variable '{0}'")]
    MissingVariable(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
