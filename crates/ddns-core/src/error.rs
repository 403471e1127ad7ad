//! Error types for the DDNS client
//!
//! Every discoverer and updater reports failures through [`Error`]. The variants
//! classify *what kind* of failure happened so the caller can tell a rejected
//! credential from a flaky network without parsing message text.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or connection failure during an HTTP request
    #[error("Transport error: {0}")]
    Transport(String),

    /// Hostname resolution failed or produced no address
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Credentials were rejected by the remote side
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The managed record does not exist at the provider
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A response did not contain the structure we expected
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider-reported failure, surfaced verbatim
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The provider rejected an input value (e.g. a hostname it does not manage)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short, stable name of the error kind (used as a structured log field)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Resolution(_) => "resolution",
            Self::Authentication(_) => "authentication",
            Self::NotFound(_) => "not_found",
            Self::Parse(_) => "parse",
            Self::Provider { .. } => "provider",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
        }
    }
}
