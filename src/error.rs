use thiserror::Error;

/// Errors surfaced to callers of the loader and report writers.
///
/// Per-field problems (bad amounts, garbled dates, blank countries) never end
/// up here; they are absorbed by the coercion rules in `util`.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD, YYYY/MM/DD or MM/DD/YYYY with optional time")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
