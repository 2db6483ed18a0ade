use serde::{Deserialize, Serialize};
use shared::models::UserProfile;
use std::fmt;

/// Lifecycle of the most recent auth operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Nothing has happened yet, or the last check found no session.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last login, registration or check succeeded.
    Success,
    /// The last login or registration failed.
    Error,
}

impl AuthStatus {
    /// Lowercase name, as used in logs.
    ///
    /// # Returns
    /// One of `idle`, `loading`, `success` or `error`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// `true` while a request is in flight.
    #[must_use]
    pub fn is_busy(self) -> bool {
        self == Self::Loading
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the auth store knows about the current session.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AuthState {
    /// Profile of the signed-in user.
    pub user: Option<UserProfile>,
    /// Token issued by the server at login or registration.
    pub token: Option<String>,
    /// Never `true` without a `user`.
    pub is_authenticated: bool,
    /// Lifecycle of the latest action; not persisted.
    pub status: AuthStatus,
}

impl AuthState {
    /// The part of the state that survives a restart.
    #[must_use]
    pub fn persisted(&self) -> PersistedAuth {
        PersistedAuth {
            user: self.user.clone(),
            token: self.token.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    /// Authenticated and holding a user.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.is_authenticated && self.user.is_some()
    }

    /// Drop the authenticated flag if there is no user to back it.
    pub(crate) fn enforce_invariants(&mut self) {
        if self.user.is_none() {
            self.is_authenticated = false;
        }
    }
}

impl From<PersistedAuth> for AuthState {
    fn from(persisted: PersistedAuth) -> Self {
        let mut state = Self {
            user: persisted.user,
            token: persisted.token,
            is_authenticated: persisted.is_authenticated,
            status: AuthStatus::Idle,
        };
        state.enforce_invariants();
        state
    }
}

/// Persisted subset of [`AuthState`]; `status` is never stored.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAuth {
    /// Stored as `user`.
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// Stored as `token`.
    #[serde(default)]
    pub token: Option<String>,
    /// Stored as `isAuthenticated`.
    #[serde(default)]
    pub is_authenticated: bool,
}

impl PersistedAuth {
    /// Nothing worth keeping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Current layout version of the stored entry.
pub const PERSIST_VERSION: u32 = 0;

/// On-disk shape of the stored entry: `{"state": {...}, "version": 0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistEnvelope {
    /// The persisted subset.
    pub state: PersistedAuth,
    /// Layout version; entries of another version are discarded.
    #[serde(default)]
    pub version: u32,
}

impl PersistEnvelope {
    /// Wrap `state` at [`PERSIST_VERSION`].
    ///
    /// # Arguments
    /// * `state` - The subset to store.
    #[must_use]
    pub fn new(state: PersistedAuth) -> Self {
        Self {
            state,
            version: PERSIST_VERSION,
        }
    }
}
