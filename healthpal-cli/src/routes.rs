use client::AuthState;
use std::fmt;

/// Pages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Register,
    Login,
}

impl Route {
    pub const ALL: [Self; 3] = [Self::Home, Self::Register, Self::Login];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Register => "/register",
            Self::Login => "/login",
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let normalized = format!("/{}", path.trim().trim_matches('/'));
        Self::ALL
            .into_iter()
            .find(|route| route.path() == normalized)
    }

    /// Only visible with a session.
    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Home)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// The route actually shown when `requested` is visited in `state`.
#[must_use]
pub fn resolve(requested: Route, state: &AuthState) -> Route {
    if requested.requires_auth() && !state.has_session() {
        Route::Login
    } else {
        requested
    }
}
