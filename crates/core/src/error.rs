//! Error types for the transit-core library.
//!
//! Every failure is reported once through the same overlay channel as a
//! successful result, so each variant renders a message fit for a user-facing
//! tooltip. Nothing in this crate retries.

use thiserror::Error;

/// Errors that can occur within the transit-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required settings field is empty (API key, model or endpoint).
    #[error("{field} is not set in extension settings.")]
    Configuration {
        /// Human readable name of the missing field.
        field: &'static str,
    },

    /// A settings field is present but unusable, such as an endpoint that
    /// is not a URL.
    #[error("{field} is invalid in extension settings: {reason}")]
    InvalidSetting {
        /// Human readable name of the offending field.
        field: &'static str,
        /// Parser message.
        reason: String,
    },

    /// Environment values that could not be interpreted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered with a non-2xx status.
    #[error("API Request failed: Status: {status}{}", detail_suffix(.detail))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Upstream error body, when it could be read.
        detail: Option<String>,
    },

    /// The provider answered 2xx but without the expected text field.
    #[error("{provider} API: No translation found in response.")]
    ResponseFormat {
        /// Display name of the provider that produced the body.
        provider: &'static str,
    },

    /// The caller-imposed deadline elapsed before the provider answered.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A message could not be delivered to the other context.
    #[error("Message delivery failed: {0}")]
    Delivery(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(body) if !body.is_empty() => format!(" - {}", body),
        _ => String::new(),
    }
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a network error with the given message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Creates a delivery error with the given message.
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Returns the HTTP status for [`AppError::Api`] errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text shown inside the error tooltip.
    pub fn tooltip_message(&self) -> String {
        format!("Error: {}", self)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network("Request timeout - please try again".to_string())
        } else if e.is_connect() {
            Self::Network("please check your connection".to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
