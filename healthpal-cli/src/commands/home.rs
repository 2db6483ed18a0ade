use std::process::ExitCode;

use client::AuthState;

use super::session::Session;
use crate::routes::{Route, resolve};

/// Text of the home page for a signed-in user.
pub fn render(state: &AuthState) -> String {
    let Some(user) = state.user.as_ref() else {
        return "Welcome User!\nYou are now authenticated.".to_string();
    };
    let mut page = format!("Welcome {}!\nYou are now authenticated.", user.display_name());
    match (user.email(), user.role()) {
        (Some(email), Some(role)) => page.push_str(&format!("\nSigned in as {email} ({role}).")),
        (Some(email), None) => page.push_str(&format!("\nSigned in as {email}.")),
        _ => {}
    }
    page
}

/// Show the home page, or redirect to the login page without a session.
pub fn show(state: &AuthState) -> ExitCode {
    match resolve(Route::Home, state) {
        Route::Home => {
            println!("{}", render(state));
            ExitCode::SUCCESS
        }
        route => {
            eprintln!("Not signed in; redirecting to {route}. Run `healthpal sign-in` first.");
            ExitCode::FAILURE
        }
    }
}

/// `healthpal open <path>`: visit a page as the router would.
pub fn open(session: &Session, path: &str) -> ExitCode {
    let Some(requested) = Route::from_path(path) else {
        eprintln!("No page at {path}.");
        return ExitCode::FAILURE;
    };
    let state = session.store().snapshot();
    match requested {
        Route::Home => show(&state),
        Route::Login => {
            println!("{requested}: run `healthpal sign-in` to sign in.");
            ExitCode::SUCCESS
        }
        Route::Register => {
            println!("{requested}: run `healthpal sign-up` to create an account.");
            ExitCode::SUCCESS
        }
    }
}

/// `healthpal home`. With `verify`, the server is asked first.
pub async fn run(session: &Session, verify: bool) -> ExitCode {
    let store = session.store();
    if verify && store.check_auth().await {
        session.save_cookies();
    }
    show(&store.snapshot())
}
