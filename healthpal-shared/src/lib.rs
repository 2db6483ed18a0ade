#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(clippy::pedantic)]

//! Wire models and configuration shared by the AI `HealthPal` client crates.

pub mod config;
pub mod models;
