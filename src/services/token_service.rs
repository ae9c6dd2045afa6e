use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::models::UserRow;

const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub unique_name: String,
    pub email: String,
    pub exp: i64,
}

pub fn create_token(user: &UserRow, key: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user.id.clone(),
        unique_name: user.username.clone(),
        email: user.email.clone(),
        exp: (Utc::now() + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))
}

pub fn validate_token(token: &str, key: &str) -> Option<Claims> {
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(key.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!(error = %e, "rejected bearer token");
            None
        }
    }
}
