//! Generator error types

use shared::SharedError;
use thiserror::Error;

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Generator error types
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The run was stopped through its cancellation token. Not a failure.
    #[error("Generation cancelled")]
    Cancelled,

    #[error("Recipe store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("item {item} not found")]
    ItemNotFound { item: String },

    #[error("Oracle unreachable for {first} + {second}: {message}")]
    OracleUnreachable {
        first: String,
        second: String,
        message: String,
    },

    #[error("Malformed oracle response for {first} + {second}: {message}")]
    OracleMalformedResponse {
        first: String,
        second: String,
        message: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Task source closed before end of sequence after {received} tasks")]
    TaskSourceClosed { received: usize },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl GeneratorError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable { message: message.into() }
    }

    pub fn oracle_unreachable(first: &str, second: &str, message: impl Into<String>) -> Self {
        Self::OracleUnreachable {
            first: first.to_string(),
            second: second.to_string(),
            message: message.into(),
        }
    }

    pub fn oracle_malformed(first: &str, second: &str, message: impl Into<String>) -> Self {
        Self::OracleMalformedResponse {
            first: first.to_string(),
            second: second.to_string(),
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether a caller-level retry could succeed.
    ///
    /// Only network failures towards the oracle qualify; `ItemNotFound` never does.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OracleUnreachable { .. })
    }

    /// The pair that triggered an oracle error, if any
    pub fn pair(&self) -> Option<(&str, &str)> {
        match self {
            Self::OracleUnreachable { first, second, .. } | Self::OracleMalformedResponse { first, second, .. } => {
                Some((first.as_str(), second.as_str()))
            }
            _ => None,
        }
    }
}
