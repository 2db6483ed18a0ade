//! # Auth Store
//!
//! Single source of truth for authentication state. Every mutation goes
//! through [`AuthStore::commit`], which updates the in-memory state,
//! notifies subscribers and writes the persisted subset in one step.

use reqwest::cookie::Jar;
use shared::{
    config::ClientConfig,
    models::{AuthResponse, CheckResponse, LoginRequest, RegisterRequest, UserProfile},
};
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    api::{AuthApi, HealthPalClient},
    error::{AuthError, AuthResult},
    state::{AuthState, AuthStatus, PERSIST_VERSION, PersistEnvelope, PersistedAuth},
    storage::{FileStorage, SessionStorage, StorageError},
};

/// Outcome of a session check, keeping "not signed in" apart from
/// "could not ask".
#[derive(Debug)]
pub enum SessionCheck {
    /// The server recognised the session.
    Active(UserProfile),
    /// The server answered and there is no valid session.
    NoSession { status: reqwest::StatusCode },
    /// The server could not be asked or answered nonsense.
    Unreachable(AuthError),
}

impl SessionCheck {
    /// `true` for [`SessionCheck::Active`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

/// Sequence number drawn by an action when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket(u64);

/// Held by an action between `begin` and its commit. If the action's
/// future is dropped first, a `Loading` status it left behind falls back
/// to `Idle`.
struct InFlight<'a> {
    store: &'a AuthStore,
    ticket: Ticket,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.commit(Some(self.ticket), |state| {
            if state.status.is_busy() {
                state.status = AuthStatus::Idle;
            }
        });
    }
}

struct Inner {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn SessionStorage>,
    storage_key: String,
    state: watch::Sender<AuthState>,
    sequence: AtomicU64,
}

impl Inner {
    fn persist(&self, persisted: &PersistedAuth) {
        let result = if persisted.is_empty() {
            self.storage.remove(&self.storage_key)
        } else {
            serde_json::to_string(&PersistEnvelope::new(persisted.clone()))
                .map_err(StorageError::from)
                .and_then(|json| self.storage.save(&self.storage_key, &json))
        };
        if let Err(err) = result {
            warn!(error = %err, key = %self.storage_key, "failed to persist auth state");
        }
    }
}

/// Authentication state container.
///
/// Cheap to clone; clones share state. Actions may run concurrently: each
/// draws a ticket when it starts and its result is only applied if no
/// newer action has started since.
///
/// Dropping an action's future (e.g. under `tokio::time::timeout`) cancels
/// it: nothing is committed and results of older actions still in flight
/// stay discarded. The status returns to [`AuthStatus::Idle`] rather than
/// staying `Loading`.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthStore")
            .field("storage_key", &self.inner.storage_key)
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl AuthStore {
    /// Create a store, restoring the persisted subset from `storage`.
    pub fn new(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn SessionStorage>,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let initial = restore(storage.as_ref(), &storage_key);
        debug!(
            key = %storage_key,
            authenticated = initial.is_authenticated,
            "auth store initialised"
        );
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                api,
                storage,
                storage_key,
                state,
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Wire the HTTP API client and file-backed session storage described
    /// by `config`. `jar` carries the server session cookie.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig, jar: Arc<Jar>) -> AuthResult<Self> {
        let api = HealthPalClient::with_cookie_jar(config, jar)?;
        let storage = FileStorage::new(config.session_dir.clone());
        Ok(Self::new(
            Arc::new(api),
            Arc::new(storage),
            config.storage_key.clone(),
        ))
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.inner.state.borrow().user.clone()
    }

    /// Token returned by the last successful login or registration.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    /// `true` while a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    /// Lifecycle of the latest action.
    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.inner.state.borrow().status
    }

    /// Receive every committed change, starting from the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Override the status without touching session data.
    pub fn set_status(&self, status: AuthStatus) {
        self.commit(None, |state| state.status = status);
    }

    /// Sign in with email and password.
    ///
    /// Inputs are sent as given; validating them is the caller's job.
    ///
    /// # Errors
    /// Returns the transport or server error. The session is cleared and
    /// the status set to [`AuthStatus::Error`] first.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<AuthResponse> {
        let ticket = self.begin(true);
        let _in_flight = InFlight {
            store: self,
            ticket,
        };
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.inner.api.login(&request).await {
            Ok(response) => {
                self.commit(Some(ticket), |state| apply_auth_response(state, &response));
                info!("login succeeded");
                Ok(response)
            }
            Err(err) => {
                self.commit(Some(ticket), |state| {
                    *state = AuthState {
                        status: AuthStatus::Error,
                        ..AuthState::default()
                    };
                });
                warn!(error = %err, "login failed");
                Err(err)
            }
        }
    }

    /// Create an account; a successful registration signs the user in.
    ///
    /// # Errors
    /// Returns the transport or server error. Only the status changes (to
    /// [`AuthStatus::Error`]); an existing session is left as it was.
    pub async fn register(&self, request: &RegisterRequest) -> AuthResult<AuthResponse> {
        let ticket = self.begin(true);
        let _in_flight = InFlight {
            store: self,
            ticket,
        };

        match self.inner.api.register(request).await {
            Ok(response) => {
                self.commit(Some(ticket), |state| apply_auth_response(state, &response));
                info!(role = %request.role, "registration succeeded");
                Ok(response)
            }
            Err(err) => {
                self.commit(Some(ticket), |state| state.status = AuthStatus::Error);
                warn!(error = %err, "registration failed");
                Err(err)
            }
        }
    }

    /// End the session. The local session is cleared whatever the server
    /// says, including when it cannot be reached.
    pub async fn logout(&self) {
        let ticket = self.begin(false);

        if let Err(err) = self.inner.api.logout().await {
            warn!(error = %err, "logout request failed; clearing local session anyway");
        }

        self.commit(Some(ticket), |state| *state = AuthState::default());
        info!("signed out");
    }

    /// Ask the server whether the session is still valid.
    ///
    /// Returns `false` for every kind of failure; see
    /// [`AuthStore::check_session`] to tell them apart.
    pub async fn check_auth(&self) -> bool {
        self.check_session().await.is_active()
    }

    /// Ask the server whether the session is still valid.
    ///
    /// Failures never put the store in [`AuthStatus::Error`]: the user is
    /// dropped and the status returns to [`AuthStatus::Idle`].
    pub async fn check_session(&self) -> SessionCheck {
        let ticket = self.begin(true);
        let _in_flight = InFlight {
            store: self,
            ticket,
        };

        match self.inner.api.check().await {
            Ok(CheckResponse { user }) => {
                self.commit(Some(ticket), |state| {
                    state.user = Some(user.clone());
                    state.is_authenticated = true;
                    state.status = AuthStatus::Success;
                });
                SessionCheck::Active(user)
            }
            Err(err) => {
                self.commit(Some(ticket), |state| {
                    state.user = None;
                    state.is_authenticated = false;
                    state.status = AuthStatus::Idle;
                });
                match err.http_status() {
                    Some(status) => {
                        debug!(%status, "no active session");
                        SessionCheck::NoSession { status }
                    }
                    None => {
                        warn!(error = %err, timed_out = err.is_timeout(), "session check failed");
                        SessionCheck::Unreachable(err)
                    }
                }
            }
        }
    }

    /// Draw a ticket, optionally flagging the store as loading.
    fn begin(&self, mark_loading: bool) -> Ticket {
        let ticket = Ticket(self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1);
        if mark_loading {
            self.commit(Some(ticket), |state| state.status = AuthStatus::Loading);
        }
        ticket
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.inner.sequence.load(Ordering::SeqCst) == ticket.0
    }

    /// Apply `update` unless `ticket` has been superseded. Returns whether
    /// the update was applied.
    fn commit(&self, ticket: Option<Ticket>, update: impl FnOnce(&mut AuthState)) -> bool {
        let inner = &self.inner;
        let mut applied = false;

        inner.state.send_if_modified(|state| {
            if let Some(ticket) = ticket {
                if !self.is_current(ticket) {
                    debug!(ticket = ticket.0, "discarding superseded auth result");
                    return false;
                }
            }

            let previous = state.clone();
            update(state);
            state.enforce_invariants();
            applied = true;

            let persisted = state.persisted();
            if persisted != previous.persisted() {
                inner.persist(&persisted);
            }
            *state != previous
        });

        applied
    }
}

fn apply_auth_response(state: &mut AuthState, response: &AuthResponse) {
    state.user = Some(response.user.clone());
    state.token.clone_from(&response.token);
    state.is_authenticated = true;
    state.status = AuthStatus::Success;
}

/// Read the persisted entry; anything unreadable starts a fresh session.
fn restore(storage: &dyn SessionStorage, key: &str) -> AuthState {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return AuthState::default(),
        Err(err) => {
            warn!(error = %err, %key, "could not read persisted auth state");
            return AuthState::default();
        }
    };

    match serde_json::from_str::<PersistEnvelope>(&raw) {
        Ok(envelope) if envelope.version == PERSIST_VERSION => AuthState::from(envelope.state),
        Ok(envelope) => {
            warn!(version = envelope.version, %key, "ignoring persisted auth state of unknown version");
            AuthState::default()
        }
        Err(err) => {
            warn!(error = %err, %key, "ignoring corrupt persisted auth state");
            AuthState::default()
        }
    }
}
