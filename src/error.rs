//! Error types for the forecast pipeline

use thiserror::Error;

/// Main error type for the `skycast` pipeline
///
/// The `Display` text of each variant is what callers see in the
/// result envelope's `error` field.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Malformed coordinates, empty query, bad date range
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// No geocoding match, unresolvable landmark, no forecast data
    #[error("{message}")]
    NotFound { message: String },

    /// Non-2xx or undecodable response from an external service
    #[error("{message}")]
    Upstream {
        message: String,
        status: Option<u16>,
    },

    /// Timeout or connection failure
    #[error("Network error: {message}")]
    Network { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Location store errors
    #[error("Store error: {message}")]
    Store { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ForecastError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Upstream answered with a non-success status
    pub fn upstream_status(service: &str, status: u16) -> Self {
        Self::Upstream {
            message: format!("{service} error: {status}"),
            status: Some(status),
        }
    }

    /// Upstream answered 2xx but the body could not be used
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: format!("Processing error: {}", message.into()),
            status: None,
        }
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// HTTP status carried by an upstream failure, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    /// Get a user-friendly hint for terminal output
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::InvalidInput { message } => format!("Invalid input: {message}"),
            ForecastError::NotFound { message } => message.clone(),
            ForecastError::Upstream { status: Some(401), .. } => {
                "The weather provider rejected the API key. Please check your configuration."
                    .to_string()
            }
            ForecastError::Upstream { message, .. } => message.clone(),
            ForecastError::Network { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            ForecastError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            ForecastError::Store { .. } => {
                "Location store failed. You may need to clear the store directory.".to_string()
            }
            ForecastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<anyhow::Error> for ForecastError {
    fn from(err: anyhow::Error) -> Self {
        ForecastError::store(format!("{err:#}"))
    }
}
