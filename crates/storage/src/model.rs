use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Role assigned to newly registered accounts.
pub const DEFAULT_ROLE: &str = "user";

/// Persisted user account.
///
/// The password hash is carried so credential checks can run against it, but it
/// is never serialized and is redacted from `Debug` output.
#[derive(Clone, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a fresh id and the default role
    ///
    /// # Arguments
    /// * `email` - Email address, stored exactly as given
    /// * `password_hash` - Self-contained hash string produced by the password hasher
    pub fn new(email: String, password_hash: String) -> Self {
        Self::new_with_role(email, password_hash, DEFAULT_ROLE.to_string())
    }

    /// Create a new account with an explicit role
    pub fn new_with_role(email: String, password_hash: String, role: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}
