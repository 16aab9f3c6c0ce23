use chrono::Utc;
use std::sync::Arc;
use storage::{Account, StoreError, UserStore};
use tracing::{debug, error, info};

use crate::{
    error::{AuthError, Result},
    jwt::TokenIssuer,
    password::PasswordHasher,
};

/// Registration and login against a `UserStore`.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
}

impl CredentialService {
    /// Create a new CredentialService
    ///
    /// # Arguments
    /// * `store` - Account persistence
    /// * `hasher` - Password hasher used for new registrations
    /// * `issuer` - Signs tokens handed out on login
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, issuer: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            issuer,
        }
    }

    /// Register a new account with the default role
    ///
    /// Store errors (for example a duplicate email) are returned unchanged.
    pub async fn register(&self, email: &str, password: &str) -> Result<Account> {
        let password_hash = self.hasher.hash(password)?;
        let account = Account::new(email.to_string(), password_hash);

        self.store.create(&account).await?;

        info!(user_id = %account.id, "Registered account");
        Ok(account)
    }

    /// Login and return a signed token
    ///
    /// An unknown email and a wrong password produce the same
    /// `InvalidCredentials` error.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let account = match self.store.get_by_email(email).await {
            Ok(account) => account,
            Err(StoreError::NotFound) => {
                self.hasher.verify_decoy(password);
                debug!("Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        let matches = self
            .hasher
            .verify(&account.password_hash, password)
            .inspect_err(|e| error!(user_id = %account.id, error = %e, "Stored hash unusable"))?;
        if !matches {
            debug!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issuer.issue(account.id, &account.role, Utc::now())?;
        info!(user_id = %account.id, "Login succeeded");
        Ok(token)
    }
}
