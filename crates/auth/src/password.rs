use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use std::sync::{Arc, OnceLock};

use crate::error::{AuthError, Result};

/// Salted Argon2id password hashing.
///
/// The cost parameters only apply to new hashes. Verification always uses the
/// parameters embedded in the stored PHC string, so raising the cost keeps old
/// hashes verifiable but changes the format of everything hashed afterwards.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a fixed password at this hasher's cost, verified against when
    /// there is no stored hash so both login paths pay the same price.
    decoy: Arc<OnceLock<Option<String>>>,
}

const DECOY_PASSWORD: &str = "decoy-password-never-matches";

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::from_params(Params::default())
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher with explicit Argon2 cost parameters
    ///
    /// # Arguments
    /// * `memory_kib` - Memory cost in KiB
    /// * `iterations` - Number of passes
    /// * `parallelism` - Degree of parallelism (lanes)
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(Self::from_params(params))
    }

    fn from_params(params: Params) -> Self {
        Self {
            params,
            decoy: Arc::new(OnceLock::new()),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    /// Verify a password against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch. Errors only when the stored hash cannot be
    /// parsed or carries parameters Argon2 refuses.
    pub fn verify(&self, hash: &str, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::MalformedHash)?;

        // Output comparison inside the verifier is constant time.
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::MalformedHash),
        }
    }

    /// Burn one verification at this hasher's cost without a stored hash
    ///
    /// Used when the account does not exist. The result is discarded.
    pub fn verify_decoy(&self, password: &str) {
        let decoy = self.decoy.get_or_init(|| self.hash(DECOY_PASSWORD).ok());
        if let Some(hash) = decoy {
            let _ = self.verify(hash, password);
        }
    }

    #[cfg(test)]
    pub(crate) fn decoy_hash(&self) -> Option<&str> {
        self.decoy.get().and_then(|h| h.as_deref())
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::with_cost(1024, 1, 1).unwrap()
}
