//! Error taxonomy for the data pipeline.

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A malformed query parameter (month outside 1-12, inverted load
    /// span). Surfaced to the caller synchronously, never silently
    /// corrected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A per-(month, year) trip file is missing. Recoverable inside the
    /// multi-month loaders, which log and skip it.
    #[error("source not found: {0}")]
    SourceNotFound(String),

    /// A station document or trip file is missing an expected field.
    /// Fatal for the affected load call.
    #[error("schema error: {0}")]
    SchemaError(String),

    /// A multi-file load produced zero usable tables. The caller should
    /// present an empty state, not crash.
    #[error("no data available: {0}")]
    NoDataAvailable(String),

    /// The corpus configuration file is unreadable or invalid.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<String> for PipelineError {
    fn from(s: String) -> Self {
        PipelineError::SchemaError(s)
    }
}

impl From<&str> for PipelineError {
    fn from(s: &str) -> Self {
        PipelineError::SchemaError(s.to_string())
    }
}
