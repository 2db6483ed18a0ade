#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(clippy::pedantic)]

//! Client-side authentication for AI `HealthPal`.
//!
//! [`AuthStore`] holds the session, talks to the auth API through the
//! [`AuthApi`] seam and keeps a persisted copy in a [`SessionStorage`].

pub mod api;
pub mod cookies;
pub mod error;
pub mod state;
pub mod storage;
pub mod store;

pub use api::{AuthApi, HealthPalClient};
pub use error::{AuthError, AuthResult};
pub use state::{AuthState, AuthStatus, PersistedAuth};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::{AuthStore, SessionCheck};
