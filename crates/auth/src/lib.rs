// Core modules
mod error;
mod jwt;
mod password;

// Store-backed services
pub mod account;
pub mod model;
pub mod service;

// Re-export error types
pub use error::{AuthError, Result, TokenError};

// Re-export crypto primitives
pub use jwt::{Claims, TOKEN_TTL, TokenIssuer, TokenVerifier};
pub use password::PasswordHasher;

pub use account::AccountService;
pub use model::AuthenticatedIdentity;
pub use service::CredentialService;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AccountService, AuthError, AuthenticatedIdentity, CredentialService, PasswordHasher,
        Result, TokenError, TokenIssuer, TokenVerifier,
    };
}
