//! Configuration-related errors.

use thiserror::Error;

/// Errors that can occur while assembling process configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// API base is not an absolute http(s) URL
    #[error("Invalid API base '{value}': {message}")]
    InvalidApiBase {
        /// The rejected value
        value: String,
        /// Description of the parse failure
        message: String,
    },

    /// Bind host could not be parsed as an IP address
    #[error("Invalid bind address '{value}': {message}")]
    InvalidBindAddress {
        /// The rejected value
        value: String,
        /// Description of the parse failure
        message: String,
    },

    /// Config validation error (invalid values)
    #[error("Config validation error for {field}: {message}")]
    ValidationError {
        /// Name of the field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

impl ConfigError {
    /// Create an API base error from a url parse error.
    pub fn from_url_error(value: &str, e: &url::ParseError) -> Self {
        Self::InvalidApiBase { value: value.to_string(), message: e.to_string() }
    }
}
