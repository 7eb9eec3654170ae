use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;

use crate::{
    config::AppConfig,
    dto::auth::Claims,
    error::{AppError, AppResult},
};

/// Password hashing and session-token signing, built once from configuration.
#[derive(Clone)]
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl CredentialService {
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let ttl = Duration::try_hours(config.jwt_expires_in_hours).unwrap_or(Duration::MAX);
        Self::new(&config.jwt_secret, ttl)
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
            .to_string();
        Ok(hash)
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn issue_token(&self, user_id: i64, role: &str) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp().max(0) as usize,
            exp: expiration.timestamp().max(0) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Not authorized, token failed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CredentialService {
        CredentialService::new("test-secret", Duration::hours(1))
    }

    #[test]
    fn password_hash_round_trip() {
        let credentials = service();
        let hash = credentials.hash_password("password1").unwrap();
        assert_ne!(hash, "password1");
        assert!(credentials.verify_password("password1", &hash).unwrap());
        assert!(!credentials.verify_password("password2", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let credentials = service();
        let a = credentials.hash_password("password1").unwrap();
        let b = credentials.hash_password("password1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn token_carries_subject_and_role() {
        let credentials = service();
        let token = credentials.issue_token(42, "lawyer").unwrap();
        let claims = credentials.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "lawyer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = CredentialService::new("other", Duration::hours(1))
            .issue_token(1, "client")
            .unwrap();
        assert!(matches!(
            service().verify_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = CredentialService::new("test-secret", Duration::hours(-2));
        let token = expired.issue_token(1, "client").unwrap();
        assert!(service().verify_token(&token).is_err());
    }

    #[test]
    fn oversized_ttl_from_config_does_not_panic() {
        let config = AppConfig {
            database_url: "postgres://unused".into(),
            database_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 3000,
            jwt_secret: "test-secret".into(),
            jwt_expires_in_hours: i64::MAX,
        };
        let credentials = CredentialService::from_config(&config);
        assert!(credentials.issue_token(1, "client").is_err());
    }
}
