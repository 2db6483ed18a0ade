//! Form checks run before anything is sent to the server.

use chrono::{Local, NaiveDate};
use thiserror::Error;

/// Shortest password the forms accept.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    #[error("Name is required")]
    MissingName,

    #[error("Date of birth must be a date like 1990-04-02")]
    InvalidDob,

    #[error("Date of birth cannot be in the future")]
    DobInFuture,
}

/// Email shape check; the server does the real verification.
///
/// # Errors
/// [`ValidationError::InvalidEmail`] when there is no `@`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// # Errors
/// [`ValidationError::PasswordTooShort`] below [`MIN_PASSWORD_LEN`] characters.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ValidationError::PasswordTooShort)
    }
}

/// # Errors
/// [`ValidationError::MissingName`] for blank names.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::MissingName)
    } else {
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date of birth that is not after `today`.
///
/// # Errors
/// Returns an error for unparseable or future dates.
pub fn parse_dob_on(value: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let dob = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDob)?;
    if dob > today {
        return Err(ValidationError::DobInFuture);
    }
    Ok(dob)
}

/// [`parse_dob_on`] against the local calendar.
///
/// # Errors
/// Returns an error for unparseable or future dates.
pub fn parse_dob(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_dob_on(value, Local::now().date_naive())
}
