use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

/// Account role chosen at registration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    /// Default for new accounts.
    #[default]
    Patient,
    /// Clinician account.
    Doctor,
    /// Administrative account.
    Admin,
}

impl Role {
    /// All roles, in the order the sign-up form offers them.
    pub const ALL: [Self; 3] = [Self::Patient, Self::Doctor, Self::Admin];

    /// Return the wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Doctor => "Doctor",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or("unknown role (expected Patient, Doctor or Admin)")
    }
}

/// Gender options offered by the sign-up form.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    /// Form default.
    #[default]
    Male,
    /// Female.
    Female,
    /// Transgender.
    Transgender,
}

impl Gender {
    /// All genders, in form order.
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Transgender];

    /// Return the wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Transgender => "Transgender",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|gender| gender.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or("unknown gender (expected Male, Female or Transgender)")
    }
}

/// Registration record posted to `/api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Full name.
    pub name: String,
    /// Date of birth, sent as `YYYY-MM-DD`.
    pub dob: NaiveDate,
    /// Account role; `Patient` unless chosen otherwise.
    pub role: Role,
    /// Gender; `Male` unless chosen otherwise.
    pub gender: Gender,
    /// Login email.
    pub email: String,
    /// Plain password, sent once over the wire and never stored.
    pub password: String,
}

/// The authenticated principal as returned by the API.
///
/// The client does not own this schema: the object is kept verbatim and
/// only a few well-known fields get typed accessors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    /// Raw field lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// The `name` field, when it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// The `email` field, when it is a string.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    /// Role, if the server reported one we recognise.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.get_str("role").and_then(|value| value.parse().ok())
    }

    /// Name to greet the user with; falls back to `"User"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("User")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: Value) -> UserProfile {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!("doctor".parse::<Role>(), Ok(Role::Doctor));
        assert_eq!(" Admin ".parse::<Role>(), Ok(Role::Admin));
        assert!("nurse".parse::<Role>().is_err());
    }

    #[test]
    fn gender_roundtrip() {
        for gender in Gender::ALL {
            assert_eq!(gender.to_string().parse::<Gender>(), Ok(gender));
        }
    }

    #[test]
    fn defaults_match_sign_up_form() {
        assert_eq!(Role::default(), Role::Patient);
        assert_eq!(Gender::default(), Gender::Male);
    }

    #[test]
    fn register_request_wire_format() {
        let request = RegisterRequest {
            name: "Ada".to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
            role: Role::Doctor,
            gender: Gender::Female,
            email: "ada@example.com".to_string(),
            password: "longenough1".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Ada",
                "dob": "1990-04-02",
                "role": "Doctor",
                "gender": "Female",
                "email": "ada@example.com",
                "password": "longenough1"
            })
        );
    }

    #[test]
    fn user_profile_keeps_unknown_fields() {
        let user = profile(json!({"name": "A", "_id": "65f0", "age": 41}));
        assert_eq!(user.name(), Some("A"));
        assert_eq!(user.get("age"), Some(&json!(41)));
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({"name": "A", "_id": "65f0", "age": 41})
        );
    }

    #[test]
    fn user_profile_accessors() {
        let user = profile(json!({"email": "a@b.com", "role": "Patient"}));
        assert_eq!(user.email(), Some("a@b.com"));
        assert_eq!(user.role(), Some(Role::Patient));
        assert_eq!(user.display_name(), "User");

        let named = profile(json!({"name": "Grace", "role": "Janitor"}));
        assert_eq!(named.display_name(), "Grace");
        assert_eq!(named.role(), None);
    }

    #[test]
    fn user_profile_rejects_non_objects() {
        assert!(serde_json::from_value::<UserProfile>(json!("A")).is_err());
        assert!(serde_json::from_value::<UserProfile>(json!(null)).is_err());
    }
}
