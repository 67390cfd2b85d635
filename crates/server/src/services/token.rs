use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Session tokens are valid for a fixed window from issuance. There is no
/// revocation list; a leaked token stays valid until expiry.
const TOKEN_TTL_HOURS: i64 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

/// Signs a session token for `user_id`, expiring `TOKEN_TTL_HOURS` from now.
pub fn issue(user_id: &str, secret: &str) -> Result<String> {
    let exp = Utc::now()
        .checked_add_signed(chrono::Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal("token expiry overflow".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
}

/// Checks signature integrity and expiry, returning the owning user id.
/// Expired and invalid are distinguishable so callers can log them apart,
/// but both mean the same thing to the client: rejected.
pub fn verify(token: &str, secret: &str) -> std::result::Result<String, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}
