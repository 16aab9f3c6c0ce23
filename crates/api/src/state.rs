use auth::{AccountService, CredentialService, PasswordHasher, TokenIssuer, TokenVerifier};
use std::sync::Arc;
use storage::UserStore;

/// Application state shared across all handlers
pub struct AppState {
    pub credentials: CredentialService,
    pub accounts: AccountService,
    pub tokens: TokenVerifier,
}

impl AppState {
    pub fn new(credentials: CredentialService, accounts: AccountService, tokens: TokenVerifier) -> Self {
        Self {
            credentials,
            accounts,
            tokens,
        }
    }

    /// Wire both services and the token verifier around one store and secret
    pub fn from_store(store: Arc<dyn UserStore>, jwt_secret: &[u8], hasher: PasswordHasher) -> Self {
        let credentials = CredentialService::new(
            store.clone(),
            hasher.clone(),
            TokenIssuer::new(jwt_secret),
        );
        let accounts = AccountService::new(store, hasher);

        Self::new(credentials, accounts, TokenVerifier::new(jwt_secret))
    }
}
