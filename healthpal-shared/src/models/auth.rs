use serde::{Deserialize, Serialize};

use super::UserProfile;

/// Credentials posted to `/api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful body of `/api/auth/login` and `/api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// Servers answer `success: true`; missing means success as well.
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: UserProfile,
    /// Bearer credential, when the server issues one besides the cookie.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Successful body of `/api/auth/check`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResponse {
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_response_minimal() {
        let response: AuthResponse =
            serde_json::from_value(json!({"user": {"name": "A"}, "token": "t1"})).unwrap();
        assert!(response.success);
        assert_eq!(response.user.name(), Some("A"));
        assert_eq!(response.token.as_deref(), Some("t1"));
        assert_eq!(response.message, None);
    }

    #[test]
    fn auth_response_cookie_only_session() {
        let response: AuthResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Logged in",
            "user": {"email": "a@b.com"}
        }))
        .unwrap();
        assert_eq!(response.token, None);
        assert_eq!(response.message.as_deref(), Some("Logged in"));
    }

    #[test]
    fn auth_response_requires_user() {
        let result = serde_json::from_value::<AuthResponse>(json!({"token": "t1"}));
        assert!(result.is_err());
    }

    #[test]
    fn check_response_requires_user() {
        assert!(serde_json::from_value::<CheckResponse>(json!({"success": true})).is_err());
        let check: CheckResponse =
            serde_json::from_value(json!({"user": {"name": "B"}})).unwrap();
        assert_eq!(check.user.name(), Some("B"));
    }
}
