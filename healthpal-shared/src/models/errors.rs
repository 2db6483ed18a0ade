use serde::{Deserialize, Serialize};

/// Error body returned by the auth API on non-success responses.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human readable reason, shown to the user as-is.
    pub message: String,
    /// Optional additional details about the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Extracts the `message` of an error body, if the payload is one.
    ///
    /// Servers are not required to answer failures with JSON; anything that
    /// does not decode, or carries a blank message, yields `None`.
    #[must_use]
    pub fn message_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .map(|error| error.message)
            .filter(|message| !message.trim().is_empty())
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ErrorResponse {}
