use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))
}

pub fn verify_password(plain: &str, hashed: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hashed)
        .map_err(|e| Error::Internal(format!("stored password hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn otp_matches(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.trim().as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("Abcdef12").unwrap();
        assert!(verify_password("Abcdef12", &hash).unwrap());
        assert!(!verify_password("Abcdef13", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_panic() {
        assert!(verify_password("Abcdef12", "not-a-phc-string").is_err());
    }

    #[test]
    fn otp_comparison() {
        assert!(otp_matches("012345", "012345"));
        assert!(otp_matches("012345", " 012345 "));
        assert!(!otp_matches("012345", "012346"));
        assert!(!otp_matches("012345", "12345"));
    }
}
