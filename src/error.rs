//! Error types for the voting service
//!
//! Every library operation returns [`Result`], whose error side is the
//! [`VoteError`] taxonomy. Callers can branch on the variant or ask
//! [`VoteError::is_retryable`] whether repeating the request may succeed.

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, VoteError>;

/// Custom error types for voting, ranking and list submission
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VoteError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Invalid pair: {reason}")]
    InvalidPair { reason: String },

    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Concurrent update conflict: {message}")]
    Conflict { message: String },

    #[error("Service unavailable: {message}")]
    Unavailable { message: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl VoteError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn invalid_pair(reason: impl Into<String>) -> Self {
        Self::InvalidPair {
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Whether the same request may succeed if repeated later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Unavailable { .. })
    }

    /// Short machine-readable name, used for metric labels and API bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidPair { .. } => "invalid_pair",
            Self::Validation { .. } => "validation_error",
            Self::Conflict { .. } => "conflict",
            Self::Unavailable { .. } => "unavailable",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::Configuration { .. } => "configuration_error",
        }
    }
}
