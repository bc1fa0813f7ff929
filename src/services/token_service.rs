use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::messages::INVALID_CREDENTIALS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    VerifyAccount,
    VerifyOrganization,
    PasswordReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    secret: Arc<str>,
    session_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, session_ttl_hours: i64) -> Self {
        Self {
            secret: Arc::from(secret),
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    fn ttl(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::Session => self.session_ttl,
            TokenPurpose::VerifyAccount | TokenPurpose::VerifyOrganization => Duration::hours(24),
            TokenPurpose::PasswordReset => Duration::minutes(15),
        }
    }

    pub fn issue(&self, sub: &str, email: &str, purpose: TokenPurpose) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            purpose,
            iat: now.timestamp(),
            exp: (now + self.ttl(purpose)).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))
    }

    /// Signature, expiry and purpose all have to hold; every failure reads the same.
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<Claims> {
        let claims = self.decode_any(token)?;
        if claims.purpose != purpose {
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        Ok(claims)
    }

    pub fn decode_any(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| Error::Unauthorized(INVALID_CREDENTIALS.to_string()))
    }
}
