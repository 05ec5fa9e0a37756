// Error taxonomy for every toolkit operation.

use thiserror::Error;

/// Errors raised by the toolkit.
///
/// Nothing is retried internally; every variant is surfaced to the caller of
/// the operation that produced it.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// A caller-supplied name, key, token or value is malformed.
    #[error("{0}")]
    Validation(String),

    /// The caller asked for something the runner does not allow from a step.
    #[error("{0}")]
    Forbidden(String),

    /// The environment variable holding a file command path is missing or empty.
    #[error("File command `{command}` path is not defined!")]
    Configuration { command: String },

    /// The host environment holds a value that contradicts the runner contract.
    #[error("{0}")]
    Consistency(String),

    /// A required input, state or runner variable is not defined.
    #[error("{0}")]
    NotDefined(String),

    /// A parameter exists but cannot be parsed as the requested type.
    #[error("`{value}` ({source_name} `{key}`) is not a valid {expected}!")]
    Parse {
        value: String,
        source_name: &'static str,
        key: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, ToolkitError>;
