//! Authentication: argon2 password hashing and JWT bearer tokens.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use openlot_core::User;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// User email
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    pub jti: String,
}

/// Signs and validates bearer tokens.
pub struct AuthKeys {
    secret: String,
    lifetime_secs: i64,
}

impl AuthKeys {
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        AuthKeys {
            secret,
            lifetime_secs,
        }
    }

    /// Issues a token for a user.
    pub fn issue_token(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.lifetime_secs)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
    }

    /// Validates a token and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ApiError::Unauthorized("invalid or expired token".to_string()))
    }
}

/// Hashes a password with argon2 and a random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to hash password: {e}")))
}

/// Verifies a password against a stored hash.
///
/// An unparsable stored hash counts as a failed verification, not an error;
/// login must not reveal which part failed.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

        let claims = state.auth.verify_token(token)?;
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "user-1".to_string(),
            name: "Test User".to_string(),
            email: "buyer@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let keys = AuthKeys::new("test-secret".to_string(), 3600);
        let token = keys.issue_token(&sample_user()).unwrap();
        let claims = keys.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "buyer@example.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let keys = AuthKeys::new("test-secret".to_string(), 3600);
        let token = keys.issue_token(&sample_user()).unwrap();

        let other = AuthKeys::new("other-secret".to_string(), 3600);
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative lifetime backdates the expiry past the validation leeway
        let keys = AuthKeys::new("test-secret".to_string(), -120);
        let token = keys.issue_token(&sample_user()).unwrap();
        assert!(keys.verify_token(&token).is_err());
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
