//! Login, token issue and token resolution
//!
//! A session is a signed token plus an entry in the user's session set.
//! Revoking removes the entry; the signature stays valid but the token no
//! longer resolves.

use tracing::{debug, warn};
use uuid::Uuid;

use super::jwt::{create_token, validate_token, JwtError, SessionClaims};
use super::password::verify_password;
use crate::models::{normalize_email, User};
use crate::store::{Store, StoreError};

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Unable to login")]
    InvalidCredentials,

    /// Token is malformed, badly signed, revoked, or its user is gone
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token could not be signed
    #[error("Failed to issue token: {0}")]
    Token(#[from] JwtError),

    /// Stored hash could not be checked
    #[error("Password verification failed: {0}")]
    Password(String),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A user resolved from a presented token
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub user: User,
    pub token_id: Uuid,
}

/// Checks an email/password pair and returns the matching user
pub async fn verify_credentials(
    store: &dyn Store,
    email: &str,
    password: &str,
) -> Result<User, SessionError> {
    let email = normalize_email(email);

    let Some(user) = store.find_user_by_email(&email).await? else {
        debug!("Login attempt for unknown email");
        return Err(SessionError::InvalidCredentials);
    };

    let matches = verify_password(password, &user.password_hash).map_err(|e| {
        warn!(user_id = %user.id, error = %e, "Stored password hash is unusable");
        SessionError::Password(e.to_string())
    })?;

    if !matches {
        debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(SessionError::InvalidCredentials);
    }

    Ok(user)
}

/// Signs a fresh token for `user` and adds it to their session set
pub async fn issue_token(
    store: &dyn Store,
    user: &User,
    secret: &str,
) -> Result<String, SessionError> {
    let claims = SessionClaims::new(user.id);
    let token = create_token(&claims, secret)?;

    store.add_session(claims.jti, user.id, &token).await?;
    debug!(user_id = %user.id, token_id = %claims.jti, "Issued session token");

    Ok(token)
}

/// Removes one session; false if it was already gone
pub async fn revoke_token(
    store: &dyn Store,
    user_id: Uuid,
    token_id: Uuid,
) -> Result<bool, SessionError> {
    Ok(store.remove_session(token_id, user_id).await?)
}

/// Removes every session of a user, returning how many there were
pub async fn revoke_all_tokens(store: &dyn Store, user_id: Uuid) -> Result<u64, SessionError> {
    Ok(store.remove_all_sessions(user_id).await?)
}

/// Resolves a presented token to its user
///
/// Fails with [`SessionError::InvalidToken`] if the signature or issuer is
/// wrong, the user no longer exists, or the token was revoked.
pub async fn resolve_token(
    store: &dyn Store,
    token: &str,
    secret: &str,
) -> Result<ResolvedSession, SessionError> {
    let claims =
        validate_token(token, secret).map_err(|e| SessionError::InvalidToken(e.to_string()))?;

    let user = store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| SessionError::InvalidToken("User no longer exists".to_string()))?;

    if !store.session_exists(claims.jti, user.id).await? {
        return Err(SessionError::InvalidToken("Token has been revoked".to_string()));
    }

    Ok(ResolvedSession {
        user,
        token_id: claims.jti,
    })
}
