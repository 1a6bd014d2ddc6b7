/// Errors from the validation service client.
use serde::Deserialize;
use thiserror::Error;

/// Fallback when an error payload carries no message.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Errors that can occur while talking to the validation service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the request with an error payload.
    #[error("{message} (HTTP {status})")]
    Api {
        /// HTTP status code received.
        status: u16,
        /// Message extracted from the payload.
        message: String,
    },

    /// A success response whose body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorField>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Detailed { message: Option<String> },
    Plain(String),
}

/// Build a [`ClientError::Api`] from a non-success response body.
///
/// Accepts `{"error": {"message": ..}}`, `{"error": ".."}` and
/// `{"message": ..}`; anything else yields `Unknown error`.
#[must_use]
pub fn api_error(status: u16, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| match b.error {
            Some(ErrorField::Detailed { message }) => message,
            Some(ErrorField::Plain(message)) => Some(message),
            None => b.message,
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
    ClientError::Api { status, message }
}
