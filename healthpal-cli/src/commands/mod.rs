pub mod auth;
pub mod completion;
pub mod config;
pub mod home;
pub mod session;
