use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use client::{
    AuthStore,
    cookies::{clear_cookie_jar, load_cookie_jar, persist_cookie_jar},
};
use reqwest::cookie::Jar;
use rpassword::prompt_password;
use shared::config::ClientConfig;
use tokio::task::JoinHandle;
use tracing::warn;

/// Everything a command needs to talk to the auth API: the store and the
/// cookie jar it shares with the HTTP client.
#[derive(Debug)]
pub struct Session {
    config: ClientConfig,
    jar: Arc<Jar>,
    store: AuthStore,
}

impl Session {
    /// Restore the cookie jar and the persisted auth state.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let origin = config.api_base();
        let jar = load_cookie_jar(&origin, &config.cookie_path())
            .context("failed to load session cookies")?;
        let store = AuthStore::from_config(&config, jar.clone())
            .context("failed to build HTTP client")?;
        Ok(Self { config, jar, store })
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    /// Write the cookie jar back so the next run presents the same server
    /// session. Failures are logged; the auth state is already persisted.
    pub fn save_cookies(&self) {
        let path = self.config.cookie_path();
        if let Err(err) = persist_cookie_jar(&self.jar, &self.config.api_base(), &path) {
            warn!(error = %err, "failed to save session cookies");
        }
    }

    /// Forget the server session cookie.
    pub fn clear_cookies(&self) {
        if let Err(err) = clear_cookie_jar(&self.config.cookie_path()) {
            warn!(error = %err, "failed to remove session cookies");
        }
    }
}

/// Print `message` on stderr while the store is loading.
///
/// Returns a handle to abort once the action has finished.
pub fn show_progress(store: &AuthStore, message: &'static str) -> JoinHandle<()> {
    let mut updates = store.subscribe();
    tokio::spawn(async move {
        let mut shown = false;
        loop {
            let busy = updates.borrow_and_update().status.is_busy();
            if busy && !shown {
                eprintln!("{message}");
                shown = true;
            } else if !busy {
                shown = false;
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    })
}

pub fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        bail!("input must not be empty");
    }
    Ok(trimmed)
}

/// Use the password given on the command line, otherwise ask for it
/// without echo.
pub fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt_password("Password: ").context("failed to read password"),
    }
}
