//! Sign-in, sign-up, logout and session check.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use client::SessionCheck;
use shared::models::{Gender, RegisterRequest, Role};

use super::{
    home,
    session::{Session, password_or_prompt, prompt, show_progress},
};
use crate::validation::{
    ValidationError, parse_dob, validate_email, validate_name, validate_password,
};

#[derive(Args, Debug)]
pub struct SignInArgs {
    /// Account email; prompted for when omitted
    #[arg(long, short)]
    pub email: Option<String>,

    /// Account password; prompted for without echo when omitted
    #[arg(long, short)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct SignUpArgs {
    /// Full name
    #[arg(long, short)]
    pub name: String,

    /// Date of birth as YYYY-MM-DD
    #[arg(long)]
    pub dob: String,

    /// Account role (Patient, Doctor or Admin)
    #[arg(long, short, default_value_t = Role::Patient)]
    pub role: Role,

    /// Gender (Male, Female or Transgender)
    #[arg(long, short, default_value_t = Gender::Male)]
    pub gender: Gender,

    /// Account email; prompted for when omitted
    #[arg(long, short)]
    pub email: Option<String>,

    /// Account password; prompted for without echo when omitted
    #[arg(long, short)]
    pub password: Option<String>,
}

fn rejected(err: &ValidationError) -> ExitCode {
    eprintln!("{err}");
    ExitCode::FAILURE
}

fn email_or_prompt(email: Option<String>) -> Result<String> {
    match email {
        Some(email) => Ok(email.trim().to_string()),
        None => prompt("Email: "),
    }
}

pub async fn sign_in(session: &Session, args: SignInArgs) -> Result<ExitCode> {
    let email = email_or_prompt(args.email)?;
    if let Err(err) = validate_email(&email) {
        return Ok(rejected(&err));
    }
    let password = password_or_prompt(args.password)?;
    if let Err(err) = validate_password(&password) {
        return Ok(rejected(&err));
    }

    let store = session.store();
    let progress = show_progress(store, "Signing in...");
    let result = store.login(&email, &password).await;
    progress.abort();
    drop(password);

    match result {
        Ok(_) => {
            session.save_cookies();
            println!("Login successful!");
            Ok(home::show(&store.snapshot()))
        }
        Err(err) => {
            eprintln!("Login Error: {}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn sign_up(session: &Session, args: SignUpArgs) -> Result<ExitCode> {
    if let Err(err) = validate_name(&args.name) {
        return Ok(rejected(&err));
    }
    let dob = match parse_dob(&args.dob) {
        Ok(dob) => dob,
        Err(err) => return Ok(rejected(&err)),
    };
    let email = email_or_prompt(args.email)?;
    if let Err(err) = validate_email(&email) {
        return Ok(rejected(&err));
    }
    let password = password_or_prompt(args.password)?;
    if let Err(err) = validate_password(&password) {
        return Ok(rejected(&err));
    }

    let request = RegisterRequest {
        name: args.name.trim().to_string(),
        dob,
        role: args.role,
        gender: args.gender,
        email,
        password,
    };

    let store = session.store();
    let progress = show_progress(store, "Creating account...");
    let result = store.register(&request).await;
    progress.abort();
    drop(request);

    match result {
        Ok(_) => {
            session.save_cookies();
            println!("Register successful!");
            Ok(home::show(&store.snapshot()))
        }
        Err(err) => {
            eprintln!("Register failed: {}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Never fails: the local session is cleared even when the server is gone.
pub async fn logout(session: &Session) -> ExitCode {
    session.store().logout().await;
    session.clear_cookies();
    println!("Signed out.");
    ExitCode::SUCCESS
}

pub async fn check(session: &Session) -> ExitCode {
    match session.store().check_session().await {
        SessionCheck::Active(user) => {
            session.save_cookies();
            println!("Session active for {}.", user.display_name());
            ExitCode::SUCCESS
        }
        SessionCheck::NoSession { status } => {
            println!("No active session (server answered {status}).");
            ExitCode::FAILURE
        }
        SessionCheck::Unreachable(err) if err.is_transport() => {
            eprintln!("{err}. Try again once the server is reachable.");
            ExitCode::FAILURE
        }
        SessionCheck::Unreachable(err) => {
            eprintln!("Could not verify session: {err}");
            ExitCode::FAILURE
        }
    }
}
