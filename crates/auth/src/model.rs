use serde::Serialize;
use uuid::Uuid;

/// Identity established from a verified bearer token.
///
/// Lives only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedIdentity {
    pub id: Uuid,
    pub role: String,
}
