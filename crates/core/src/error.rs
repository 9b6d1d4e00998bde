//! Error types for Strata record references
//!
//! One error enum covers the store and the reference layer. We use `thiserror`
//! for automatic `Display` and `Error` trait implementations.
//!
//! `StrataError` is `Clone`: a single adapter fetch may be awaited by several
//! callers of the same identity, and every one of them receives the same error.

use thiserror::Error;

/// Result type alias for Strata operations
pub type StrataResult<T> = std::result::Result<T, StrataError>;

/// Error types for the record store and references
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrataError {
    /// The caller broke an API contract (e.g. loading a reference without an id)
    ///
    /// Not retriable.
    #[error("Invalid usage: {message}")]
    InvalidUsage {
        /// What was done wrong
        message: String,
    },

    /// The adapter has no record for the requested identity
    #[error("Record not found: {record_type}:{id}")]
    NotFound {
        /// Record type
        record_type: String,
        /// Record id
        id: String,
    },

    /// A pushed document could not be normalized into the identity map
    #[error("Normalization error: {message}")]
    Normalization {
        /// Why the document was rejected
        message: String,
    },

    /// The adapter failed to fetch a record
    #[error("Adapter error: {message}")]
    Adapter {
        /// Adapter-provided description
        message: String,
    },

    /// A fetch did not settle within the configured timeout
    #[error("Fetch of {record_type}:{id} timed out after {timeout_ms}ms")]
    Timeout {
        /// Record type
        record_type: String,
        /// Record id
        id: String,
        /// Configured timeout
        timeout_ms: u64,
    },

    /// Store configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// Internal invariant violation
    #[error("Internal error: {message}")]
    Internal {
        /// Description
        message: String,
    },
}

impl StrataError {
    /// Create an invalid-usage error
    pub fn invalid_usage(message: impl Into<String>) -> Self {
        StrataError::InvalidUsage {
            message: message.into(),
        }
    }

    /// Create a not-found error for `record_type:id`
    pub fn not_found(record_type: impl Into<String>, id: impl Into<String>) -> Self {
        StrataError::NotFound {
            record_type: record_type.into(),
            id: id.into(),
        }
    }

    /// Create a normalization error
    pub fn normalization(message: impl Into<String>) -> Self {
        StrataError::Normalization {
            message: message.into(),
        }
    }

    /// Create an adapter error
    pub fn adapter(message: impl Into<String>) -> Self {
        StrataError::Adapter {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        StrataError::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        StrataError::Internal {
            message: message.into(),
        }
    }

    /// Stable, machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            StrataError::InvalidUsage { .. } => "InvalidUsage",
            StrataError::NotFound { .. } => "NotFound",
            StrataError::Normalization { .. } => "Normalization",
            StrataError::Adapter { .. } => "Adapter",
            StrataError::Timeout { .. } => "Timeout",
            StrataError::Config { .. } => "Config",
            StrataError::Internal { .. } => "Internal",
        }
    }

    /// Whether retrying the same operation could succeed
    ///
    /// Contract violations and malformed input never become valid on retry.
    pub fn is_retriable(&self) -> bool {
        matches!(self, StrataError::Adapter { .. } | StrataError::Timeout { .. })
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(e: serde_json::Error) -> Self {
        StrataError::normalization(e.to_string())
    }
}

impl From<toml::de::Error> for StrataError {
    fn from(e: toml::de::Error) -> Self {
        StrataError::config(e.to_string())
    }
}
