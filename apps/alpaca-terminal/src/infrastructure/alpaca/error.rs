//! Alpaca-specific error types.

use thiserror::Error;

use crate::application::ports::ProviderError;

/// Errors from the Alpaca adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlpacaError {
    /// Transport failure (connect, TLS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Credentials missing or rejected (401/403).
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited (429).
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Resource does not exist (404).
    #[error("Not found: {path}")]
    NotFound {
        /// Request path.
        path: String,
    },

    /// The request named a symbol the API rejects (400/422).
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Server-side failure (408, 5xx).
    #[error("Server error: {status} - {message}")]
    Server {
        /// HTTP status.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// API returned any other error.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// A base URL could not be turned into a request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl AlpacaError {
    /// Classify an error from a request about `symbol`.
    ///
    /// Not-found and invalid-symbol responses become
    /// [`ProviderError::NotFound`] naming the symbol.
    #[must_use]
    pub fn for_symbol(self, symbol: &str) -> ProviderError {
        match self {
            Self::NotFound { .. } | Self::InvalidSymbol(_) => ProviderError::NotFound {
                symbol: symbol.to_string(),
            },
            other => other.into(),
        }
    }
}

impl From<AlpacaError> for ProviderError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Network(message) | AlpacaError::JsonParse(message) => {
                Self::Transient { message }
            }
            AlpacaError::Server { status, message } => Self::Transient {
                message: format!("{status} {message}"),
            },
            AlpacaError::AuthenticationFailed => Self::Unauthorized,
            AlpacaError::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            AlpacaError::NotFound { path } => Self::Api {
                code: "404".to_string(),
                message: format!("not found: {path}"),
            },
            AlpacaError::InvalidSymbol(message) => Self::Api {
                code: "400".to_string(),
                message,
            },
            AlpacaError::Api { code, message } => Self::Api { code, message },
            AlpacaError::InvalidUrl(message) => Self::Api {
                code: "url".to_string(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for AlpacaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::JsonParse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AlpacaError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}
