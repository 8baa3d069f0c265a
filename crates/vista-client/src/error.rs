//! Error types for the vision client.

use thiserror::Error;

/// Errors that can occur while opening or consuming a completion stream.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request could not be sent (DNS, TLS, connection refused, bad header).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server rejected the credential (401/403).
    #[error("Authentication rejected ({status}): {message}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Server returned 429 Too Many Requests.
    #[error("Rate limited (429){}: {message}", retry_suffix(.retry_after))]
    RateLimited {
        /// Seconds to wait before retrying, if provided by server.
        retry_after: Option<u64>,
        /// Error message from server.
        message: String,
    },

    /// Server returned any other non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Server sent an error object inside the event stream.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Server returned a chunk that could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transport failed while the stream was being read.
    #[error("Stream error: {0}")]
    Stream(String),
}

fn retry_suffix(retry_after: &Option<u64>) -> String {
    retry_after.map(|s| format!(", retry after {}s", s)).unwrap_or_default()
}

impl ClientError {
    /// Map a non-success HTTP status and its body to a typed error.
    pub(crate) fn from_status(status: u16, message: String, retry_after: Option<u64>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status, message },
            429 => Self::RateLimited { retry_after, message },
            _ => Self::Api { status, message },
        }
    }
}
