//! Error handling for the catalog admin client

use std::fmt;
use thiserror::Error;

use crate::validation::FormErrors;

/// Unified error type for the catalog admin client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Session file errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend answered with a non-success status
    #[error("{message} (Status: {status})")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A form submission was rejected by the validation rules
    #[error("Validation failed: {0}")]
    Validation(FormErrors),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied arguments that cannot be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new invalid input error
    pub fn invalid_input<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidInput(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Whether this error came from the network layer rather than from
    /// the user's input.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Api { .. })
    }

    /// The message shown to the user in a notification.
    ///
    /// Backend and auth errors carry a message meant for humans already;
    /// everything else falls back to the `Display` output.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            Error::Auth(msg) | Error::Config(msg) | Error::InvalidInput(msg) | Error::General(msg) => {
                msg.clone()
            }
            Error::Validation(errors) => errors
                .first()
                .map(|(_, msg)| msg.to_string())
                .unwrap_or_else(|| "Validation failed".to_string()),
            other => other.to_string(),
        }
    }
}

/// Turns anything displayable into a notification string.
pub fn error_message<T: fmt::Display + ?Sized>(value: &T) -> String {
    value.to_string()
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
