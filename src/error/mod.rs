//! Error types for genie-bridge.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{last_error}")]
    RunFailed { last_error: String },

    #[error("No response from the assistant.")]
    NoResponse,

    #[error("Unrecognized result shape: {0}")]
    UnrecognizedResultShape(String),

    #[error("Backend message failed: {0}")]
    BackendMessageFailed(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Background worker unavailable: {0}")]
    WorkerUnavailable(String),
}

impl BridgeError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status and its body to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::Authentication(body.to_string()),
            404 => Self::NotFound(body.to_string()),
            429 => Self::RateLimited(body.to_string()),
            _ => Self::api(status, body),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited(_) => ErrorCategory::RateLimit,
            Self::Network(_) | Self::Io(_) => ErrorCategory::Transport,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) | Self::UnrecognizedResultShape(_) => {
                ErrorCategory::Serialization
            }
            Self::Api { status, .. } => match status {
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::NotFound(_) => ErrorCategory::Api,
            Self::RunFailed { .. } | Self::NoResponse => ErrorCategory::Agent,
            Self::BackendMessageFailed(_) => ErrorCategory::Backend,
            Self::ToolExecution { .. } | Self::InvalidArgument(_) => {
                ErrorCategory::ToolExecution
            }
            Self::WorkerUnavailable(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Transport | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit | ErrorCategory::Transport | ErrorCategory::Server => {
                RecoverySuggestion::RetryWithBackoff
            }
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Backend => RecoverySuggestion::RephraseQuestion,
            ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
            _ => RecoverySuggestion::ContactSupport,
        }
    }

    /// Render as the in-band reply shown to the user.
    pub fn to_reply(&self) -> String {
        format!("Error: {self}")
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BridgeError>;
