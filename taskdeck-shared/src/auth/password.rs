//! Password hashing using Argon2id
//!
//! Plaintext passwords never leave this module: callers validate the raw
//! value with [`validate_password_rules`], then persist only the PHC string
//! produced by [`hash_password`].
//!
//! # Security
//!
//! - **Algorithm**: Argon2id
//! - **Memory**: 64 MB (65536 KB)
//! - **Iterations**: 3 passes
//! - **Parallelism**: 4 lanes
//! - **Salt**: 16 random bytes per hash
//!
//! # Example
//!
//! ```
//! use taskdeck_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("red-lantern-42")?;
//!
//! assert!(verify_password("red-lantern-42", &hash)?);
//! assert!(!verify_password("blue-lantern-42", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 7;

/// Substring that may not appear anywhere in a password (case-insensitive)
const FORBIDDEN_SUBSTRING: &str = "password";

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password using Argon2id
///
/// Returns the PHC string (algorithm, parameters, salt and hash), e.g.
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored PHC hash
///
/// Returns `Ok(false)` on a mismatch and `Err` only when the stored hash
/// cannot be parsed or verification itself fails.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters are embedded in the hash
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Checks a (trimmed) password against the account password rules
///
/// - At least [`MIN_PASSWORD_LENGTH`] characters
/// - Must not contain "password" in any letter case
///
/// ```
/// use taskdeck_shared::auth::password::validate_password_rules;
///
/// assert!(validate_password_rules("vinhpass").is_ok());
/// assert!(validate_password_rules("short").is_err());
/// assert!(validate_password_rules("MyPassWord1").is_err());
/// ```
pub fn validate_password_rules(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.to_lowercase().contains(FORBIDDEN_SUBSTRING) {
        return Err("Password cannot contain \"password\"".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("userTestPass").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password("vinhpass").expect("Hash should succeed");

        assert_ne!(hash, "vinhpass");
        assert!(!hash.contains("vinhpass"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same-secret").expect("Hash 1 should succeed");
        let hash2 = hash_password("same-secret").expect("Hash 2 should succeed");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password("correct-horse").expect("Hash should succeed");

        assert!(verify_password("correct-horse", &hash).unwrap());
        assert!(!verify_password("wrong-horse", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("anything", "invalid_hash").is_err());
        assert!(verify_password("anything", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_validate_password_rules_length() {
        assert!(validate_password_rules("abcdef").is_err());
        assert!(validate_password_rules("abcdefg").is_ok());

        let err = validate_password_rules("abc").unwrap_err();
        assert!(err.contains("at least 7 characters"));
    }

    #[test]
    fn test_validate_password_rules_counts_characters_not_bytes() {
        // 6 characters, 18 bytes
        assert!(validate_password_rules("密码密码密码").is_err());
        assert!(validate_password_rules("密码密码密码密").is_ok());
    }

    #[test]
    fn test_validate_password_rules_forbidden_substring() {
        for candidate in ["password", "myPassword1", "PASSWORD!!", "xxpAsSwOrDxx"] {
            let err = validate_password_rules(candidate).unwrap_err();
            assert!(err.contains("password"), "{} should be rejected", candidate);
        }
    }
}
