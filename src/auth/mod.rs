use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::types::UserRole;

/// Session token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, name: String, role: UserRole) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            name,
            role,
            exp,
            iat: now.timestamp(),
        }
    }

    /// Seconds until expiry, as returned by the login endpoint
    pub fn expires_in(&self) -> i64 {
        self.exp - self.iat
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

fn secret() -> Result<&'static str, AuthError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    Ok(secret.as_str())
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(format!("Invalid JWT token: {}", e)))?;

    Ok(token_data.claims)
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, config::config().security.bcrypt_cost)?)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "ada@example.com".into(), "Ada".into(), UserRole::Instructor);
        let token = generate_jwt(&claims).unwrap();

        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.sub, id);
        assert_eq!(decoded.role, UserRole::Instructor);
        assert_eq!(decoded.email, "ada@example.com");
        assert!(decoded.expires_in() > 0);
    }

    #[test]
    fn rejects_tampered_and_expired_tokens() {
        let claims = Claims::new(Uuid::new_v4(), "a@b.co".into(), "A".into(), UserRole::Student);
        let token = generate_jwt(&claims).unwrap();
        assert!(matches!(validate_jwt(&format!("{}x", token)), Err(AuthError::InvalidToken(_))));

        let mut expired = claims.clone();
        expired.iat -= 7200;
        expired.exp = expired.iat + 60;
        let token = generate_jwt(&expired).unwrap();
        assert!(validate_jwt(&token).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));
    }
}
