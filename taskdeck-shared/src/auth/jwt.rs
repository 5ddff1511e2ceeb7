//! Session token signing and validation
//!
//! Session tokens are HS256-signed JWTs that bind a user ID (`sub`) and a
//! unique token ID (`jti`). They carry no expiry: a token stays valid for as
//! long as its `jti` is present in the user's session set, which is what
//! logout removes. Signature checks happen here; the session-set lookup lives
//! in [`crate::auth::session`].
//!
//! # Example
//!
//! ```
//! use taskdeck_shared::auth::jwt::{create_token, validate_token, SessionClaims};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user_id = Uuid::new_v4();
//! let claims = SessionClaims::new(user_id);
//!
//! let token = create_token(&claims, "a-signing-secret-of-at-least-32-bytes")?;
//! let validated = validate_token(&token, "a-signing-secret-of-at-least-32-bytes")?;
//! assert_eq!(validated.sub, user_id);
//! assert_eq!(validated.jti, claims.jti);
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into and required from every token
pub const ISSUER: &str = "taskdeck";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim validation failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Token ID, the key of the session entry
    pub jti: Uuid,

    /// Issuer - Always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl SessionClaims {
    /// Creates claims for a fresh session of `user_id`
    pub fn new(user_id: Uuid) -> Self {
        Self {
            sub: user_id,
            jti: Uuid::new_v4(),
            iss: ISSUER.to_string(),
            iat: Utc::now().timestamp(),
        }
    }
}

/// Signs claims into a token string using HS256
pub fn create_token(claims: &SessionClaims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies signature and issuer, then returns the claims
///
/// Expiry is not checked; session tokens never expire on their own.
pub fn validate_token(token: &str, secret: &str) -> Result<SessionClaims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["sub", "iss"]);
    validation.validate_exp = false;
    validation.validate_nbf = false;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
                expected: ISSUER.to_string(),
            },
            _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
        }
    })?;

    Ok(token_data.claims)
}
