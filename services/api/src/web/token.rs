//! services/api/src/web/token.rs
//!
//! Issues and verifies the signed session credential. The token is a
//! self-contained HS256 JWT carrying only the owning user's id and an
//! expiry; the server keeps no session state, so rotation of the signing
//! secret is the only way to revoke outstanding tokens.

use aidoctor_core::ports::{PortError, PortResult};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Name of the HTTP-only cookie carrying the token.
pub const SESSION_COOKIE: &str = "session";

/// Token and cookie lifetime: one year.
pub const SESSION_TTL_SECONDS: u64 = 31_536_000;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub exp: usize,
}

/// Produces a signed token binding solely to `user_id`.
pub fn issue(secret: &str, user_id: &str) -> PortResult<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .as_secs();
    let claims = Claims {
        user_id: user_id.to_owned(),
        exp: (now + SESSION_TTL_SECONDS) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| PortError::Unexpected(e.to_string()))
}

/// Decodes a token and returns the embedded user id.
///
/// Every failure mode (bad signature, malformed structure, expiry) collapses
/// into the same opaque `Unauthorized` so callers learn nothing about why
/// verification failed.
pub fn verify(secret: &str, token: &str) -> PortResult<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims.user_id)
    .map_err(|_| PortError::Unauthorized)
}
