use storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Stored password hash is malformed")]
    MalformedHash,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("Token generation failed: {0}")]
    TokenGenerationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reasons a bearer token fails verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token subject is missing or invalid")]
    InvalidSubject,

    #[error("Malformed token: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
