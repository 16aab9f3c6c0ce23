//! Storage module for user accounts
//!
//! Provides:
//! - The `Account` record
//! - The `UserStore` capability used by the service layer
//! - An in-memory adapter for local runs and tests
//! - A PostgreSQL adapter (feature `postgres`)

pub mod memory;
pub mod model;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryUserStore;
pub use model::{Account, DEFAULT_ROLE};
#[cfg(feature = "postgres")]
pub use postgres::PostgresUserStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("account not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence capability for account records.
///
/// Implementations own their connection handling and must tolerate concurrent
/// calls for the same account; last write wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new account. Fails with `DuplicateEmail` if the email is taken.
    async fn create(&self, account: &Account) -> Result<()>;

    /// Fetch an account by its exact email.
    async fn get_by_email(&self, email: &str) -> Result<Account>;

    /// Fetch an account by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Account>;

    /// Remove an account. Fails with `NotFound` if nothing was removed.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Replace the stored password hash. Fails with `NotFound` if nothing was updated.
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()>;

    /// All accounts ordered by creation time, then id.
    async fn list(&self) -> Result<Vec<Account>>;
}
