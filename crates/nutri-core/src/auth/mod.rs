//! Session, credential and authorization layer.
//!
//! - [`credentials`]: Argon2 password hashing and verification
//! - [`authorization`]: the single capability check used by views and mutators
//! - [`session`]: route reachability and per-tab access for the current user

pub mod authorization;
pub mod credentials;
pub mod session;

pub use authorization::{authorize, check, AccessDecision, AccessReason, Action};
pub use credentials::{verify_password, CredentialHasher};
pub use session::{landing_route, resolve, tab_access, Route, RouteDecision, Tab, TabAccess};

use thiserror::Error;

/// Authentication and authorization errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No active session")]
    NotAuthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
