use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::error::{AuthError, Result, TokenError};
use crate::model::AuthenticatedIdentity;

/// Lifetime of every issued token.
pub const TOKEN_TTL: Duration = Duration::hours(24);

/// Algorithms accepted on verification. Anything else, including `none` and
/// every asymmetric algorithm, is refused before the signature is looked at.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Account role
    pub role: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `subject` issued at `now` and valid for `TOKEN_TTL`
    pub fn new(subject: Uuid, role: &str, now: DateTime<Utc>) -> Self {
        Self {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + TOKEN_TTL).timestamp(),
        }
    }
}

/// Signs HS256 tokens with the configured secret.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
        }
    }

    /// Generate a signed token for an account
    ///
    /// # Arguments
    /// * `subject` - The account identifier
    /// * `role` - The account's role
    /// * `now` - Issue instant; the token expires at `now + TOKEN_TTL`
    pub fn issue(&self, subject: Uuid, role: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims::new(subject, role, now);

        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }
}

/// Checks tokens produced by a `TokenIssuer` sharing the same secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

#[derive(Deserialize)]
struct RawClaims {
    sub: Option<Value>,
    role: Option<Value>,
    exp: Option<Value>,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked against the caller's clock below.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Validate a token and return the identity it carries
    ///
    /// # Arguments
    /// * `token` - Compact JWT string
    /// * `now` - Instant the token must still be valid at
    pub fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<AuthenticatedIdentity, TokenError> {
        check_algorithm(token)?;

        let data = decode::<RawClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::UnsupportedAlgorithm(e.to_string())
                }
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;
        let claims = data.claims;

        let exp = claims
            .exp
            .as_ref()
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .ok_or_else(|| TokenError::Malformed("missing or non-numeric exp".to_string()))?;
        if exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        let id = claims
            .sub
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or(TokenError::InvalidSubject)?;

        // Absent or non-string role means no elevated role.
        let role = claims
            .role
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(AuthenticatedIdentity { id, role })
    }
}

fn check_algorithm(token: &str) -> std::result::Result<(), TokenError> {
    let mut segments = token.split('.');
    let (Some(header), Some(_), Some(_), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(TokenError::Malformed("expected three segments".to_string()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| TokenError::Malformed(format!("header: {}", e)))?;
    let header: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("header: {}", e)))?;

    match header.alg.as_str() {
        "HS256" | "HS384" | "HS512" => Ok(()),
        other => Err(TokenError::UnsupportedAlgorithm(other.to_string())),
    }
}
