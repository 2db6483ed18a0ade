//! # Auth Error Types

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for auth store operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Why an auth API call failed.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No response arrived: connection refused, DNS failure, timeout.
    #[error("Unable to connect to server: {message}")]
    Transport {
        message: String,
        timed_out: bool,
    },

    /// The server answered with a non-success status.
    #[error("{}", status_display(.status, .message))]
    Status {
        status: StatusCode,
        /// `message` field of the error body, when the server sent one.
        message: Option<String>,
    },

    /// A success response whose body is not what the endpoint promises.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// The endpoint URL could not be built.
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
}

fn status_display(status: &StatusCode, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("Request failed with status {status}"),
    }
}

impl AuthError {
    /// Create a status error, as produced for non-2xx responses.
    pub fn status(status: StatusCode, message: Option<impl Into<String>>) -> Self {
        Self::Status {
            status,
            message: message.map(Into::into),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Create a transport error for an elapsed request timeout.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: true,
        }
    }

    /// HTTP status, when the server answered at all.
    #[must_use]
    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message the server put in its error body.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: the server's own message when present,
    /// otherwise a description of the transport failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.server_message()
            .map_or_else(|| self.to_string(), ToString::to_string)
    }

    /// `true` when no response was received.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { timed_out: true, .. })
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if let Some(status) = err.status() {
            Self::status(status, None::<String>)
        } else {
            Self::transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_prefers_server_message() {
        let err = AuthError::status(StatusCode::UNAUTHORIZED, Some("Invalid credentials"));
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert_eq!(err.http_status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn status_error_without_body() {
        let err = AuthError::status(StatusCode::BAD_GATEWAY, None::<String>);
        assert_eq!(err.server_message(), None);
        assert_eq!(
            err.user_message(),
            "Request failed with status 502 Bad Gateway"
        );
    }

    #[test]
    fn transport_errors_have_no_status() {
        let err = AuthError::transport("connection refused");
        assert!(err.is_transport());
        assert!(!err.is_timeout());
        assert_eq!(err.http_status(), None);
        assert_eq!(
            err.user_message(),
            "Unable to connect to server: connection refused"
        );

        assert!(AuthError::timeout("deadline elapsed").is_timeout());
    }
}
