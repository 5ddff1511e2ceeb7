//! Bearer-token authentication for Axum
//!
//! [`authenticate`] turns the request headers into an [`AuthContext`]; the
//! API's auth layer calls it and stores the context in the request
//! extensions. Handlers then take [`AuthContext`] as a parameter.
//!
//! # Example
//!
//! ```
//! use taskdeck_shared::auth::middleware::AuthContext;
//!
//! async fn me(auth: AuthContext) -> String {
//!     format!("Hello, {}!", auth.user.name)
//! }
//! ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use super::session::{resolve_token, SessionError};
use crate::models::User;
use crate::store::Store;

/// Authenticated caller, attached to the request by the auth layer
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The user the token belongs to
    pub user: User,

    /// The token exactly as presented
    pub token: String,

    /// Session ID (`jti`) of the presented token
    pub token_id: Uuid,
}

/// Error type for authentication
#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    InvalidFormat(String),

    /// Token did not resolve to a live session
    InvalidToken(String),

    /// Store failure while resolving
    DatabaseError(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Missing credentials"),
            AuthError::InvalidFormat(msg) => write!(f, "Invalid authorization header: {}", msg),
            AuthError::InvalidToken(msg) => write!(f, "{}", msg),
            AuthError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::DatabaseError(msg) => {
                error!("Authentication failed on store error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            _ => {
                debug!("Authentication rejected: {}", self);
                (
                    StatusCode::UNAUTHORIZED,
                    "Please authenticate.".to_string(),
                )
            }
        };

        let error = if status == StatusCode::UNAUTHORIZED {
            "unauthorized"
        } else {
            "internal_error"
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Extracts the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Resolves the request's bearer token to an [`AuthContext`]
pub async fn authenticate(
    store: &dyn Store,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let session = resolve_token(store, token, secret)
        .await
        .map_err(|e| match e {
            SessionError::Store(e) => AuthError::DatabaseError(e.to_string()),
            other => AuthError::InvalidToken(other.to_string()),
        })?;

    Ok(AuthContext {
        user: session.user,
        token: token.to_string(),
        token_id: session.token_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::session::{issue_token, revoke_token};
    use crate::models::CreateUser;
    use crate::store::{MemoryStore, UserStore};
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")).unwrap(), "abc.def");
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            bearer_token(&headers_with("Bearer ")),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidToken("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::DatabaseError("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = MemoryStore::new();
        let user = store
            .create_user(CreateUser {
                name: "Vinh".to_string(),
                email: "vinh@example.com".to_string(),
                password_hash: hash_password("vinhpass").unwrap(),
                age: 0,
            })
            .await
            .unwrap();
        let token = issue_token(&store, &user, SECRET).await.unwrap();
        let headers = headers_with(&format!("Bearer {}", token));

        let auth = authenticate(&store, SECRET, &headers).await.unwrap();
        assert_eq!(auth.user.id, user.id);
        assert_eq!(auth.token, token);

        revoke_token(&store, user.id, auth.token_id).await.unwrap();
        assert!(matches!(
            authenticate(&store, SECRET, &headers).await,
            Err(AuthError::InvalidToken(_))
        ));
    }
}
