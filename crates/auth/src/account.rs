use std::sync::Arc;
use storage::{Account, UserStore};
use tracing::info;
use uuid::Uuid;

use crate::{error::Result, password::PasswordHasher};

/// Account management for already authenticated callers
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.store.delete(id).await?;
        info!(user_id = %id, "Deleted account");
        Ok(())
    }

    /// Hash `new_password` and replace the stored hash
    pub async fn update_password(&self, id: Uuid, new_password: &str) -> Result<()> {
        let password_hash = self.hasher.hash(new_password)?;
        self.store.update_password_hash(id, &password_hash).await?;
        info!(user_id = %id, "Updated password");
        Ok(())
    }

    /// All accounts, oldest first. An empty store yields an empty list.
    pub async fn list(&self) -> Result<Vec<Account>> {
        Ok(self.store.list().await?)
    }
}
