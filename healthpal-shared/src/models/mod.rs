pub mod auth;
pub mod errors;
pub mod user;

pub use auth::{AuthResponse, CheckResponse, LoginRequest};
pub use errors::ErrorResponse;
pub use user::{Gender, RegisterRequest, Role, UserProfile};
