//! Account endpoints
//!
//! - `POST /users` - Sign up, returns the user and a first token
//! - `POST /users/login` - Log in, returns the user and a new token
//! - `POST /users/logout` - Revoke the presented token
//! - `POST /users/logoutAll` - Revoke every token of the user
//! - `GET|PATCH|DELETE /users/me` - Read, update or delete the profile
//! - `POST|DELETE /users/me/avatar` - Upload or remove the avatar
//! - `GET /users/:id/avatar` - Public avatar image (PNG)

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{middleware::AuthContext, password, session},
    avatar::{self, AvatarError, AVATAR_MAX_BYTES},
    models::{normalize_email, CreateUser, UpdateUser, User},
};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// Multipart field carrying the avatar file
const AVATAR_FIELD: &str = "avatar";

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name (trimmed, required)
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Email address (trimmed, lowercased)
    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    /// Plaintext password (trimmed, checked against the password rules)
    pub password: String,

    /// Age in years
    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,
}

impl SignupRequest {
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password.trim().to_string(),
            age: self.age,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update request
///
/// Only these fields may be changed; any other field fails the request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,

    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,

    pub password: Option<String>,

    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,
}

impl UpdateUserRequest {
    fn normalized(self) -> Self {
        Self {
            name: self.name.map(|name| name.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
            password: self.password.map(|password| password.trim().to_string()),
            age: self.age,
        }
    }
}

/// Signup and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Applies the password rules and hashes the password
fn hash_checked_password(password: &str) -> ApiResult<String> {
    password::validate_password_rules(password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail::new("password", message)])
    })?;

    Ok(password::hash_password(password)?)
}

/// Sign up
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// { "name": "Vinh", "email": "vinh@example.com", "password": "vinhpass" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or email already in use
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let req = req.normalized();
    req.validate()?;

    let password_hash = hash_checked_password(&req.password)?;

    let user = state
        .store
        .create_user(CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            age: req.age.unwrap_or(0),
        })
        .await?;

    let token = session::issue_token(state.store.as_ref(), &user, state.jwt_secret()).await?;

    state.mailer.send_welcome(&user.email, &user.name);
    info!(user_id = %user.id, "User signed up");

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// Log in
///
/// Unknown email, wrong password and an unreadable body all answer `400`
/// with an empty body.
pub async fn login(
    State(state): State<AppState>,
    req: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(req) = req.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Unreadable login request");
        ApiError::InvalidCredentials
    })?;

    let user =
        session::verify_credentials(state.store.as_ref(), &req.email, req.password.trim()).await?;

    let token = session::issue_token(state.store.as_ref(), &user, state.jwt_secret()).await?;
    debug!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse { user, token }))
}

/// Log out the presented token only
pub async fn logout(State(state): State<AppState>, auth: AuthContext) -> ApiResult<StatusCode> {
    session::revoke_token(state.store.as_ref(), auth.user.id, auth.token_id).await?;
    debug!(user_id = %auth.user.id, token_id = %auth.token_id, "Session revoked");

    Ok(StatusCode::OK)
}

/// Log out every session of the user
pub async fn logout_all(State(state): State<AppState>, auth: AuthContext) -> ApiResult<StatusCode> {
    let revoked = session::revoke_all_tokens(state.store.as_ref(), auth.user.id).await?;
    debug!(user_id = %auth.user.id, revoked, "All sessions revoked");

    Ok(StatusCode::OK)
}

/// Current user's profile
pub async fn me(auth: AuthContext) -> Json<User> {
    Json(auth.user)
}

/// Update name, email, password or age
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let req = req.normalized();
    req.validate()?;

    let password_hash = match req.password.as_deref() {
        Some(password) => Some(hash_checked_password(password)?),
        None => None,
    };

    let update = UpdateUser {
        name: req.name,
        email: req.email,
        password_hash,
        age: req.age,
    };

    if update.is_empty() {
        return Ok(Json(auth.user));
    }

    let user = state
        .store
        .update_user(auth.user.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Delete the account with its tasks and sessions
pub async fn delete_me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<User>> {
    let user = state
        .store
        .delete_user(auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    state.mailer.send_cancellation(&user.email, &user.name);
    info!(user_id = %user.id, "User deleted");

    Ok(Json(user))
}

/// Upload an avatar
///
/// # Endpoint
///
/// ```text
/// POST /users/me/avatar
/// Content-Type: multipart/form-data; boundary=...
///
/// avatar=<me.jpg>
/// ```
///
/// The image is cropped to 250×250 and stored as PNG.
///
/// # Errors
///
/// - `400 Bad Request`: Missing field, not a jpg/jpeg/png, over 1 MB, or unreadable
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthContext,
    mut multipart: Multipart,
) -> ApiResult<StatusCode> {
    let mut upload = None;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default();
        if !avatar::is_allowed_filename(filename) {
            return Err(AvatarError::UnsupportedType.into());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if bytes.len() + chunk.len() > AVATAR_MAX_BYTES {
                return Err(AvatarError::TooLarge.into());
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some(bytes);
        break;
    }

    let bytes = upload.ok_or_else(|| ApiError::from(AvatarError::UnsupportedType))?;

    let png = tokio::task::spawn_blocking(move || avatar::process_avatar(&bytes))
        .await
        .map_err(|e| ApiError::InternalError(format!("Avatar task failed: {}", e)))??;

    state.store.set_avatar(auth.user.id, Some(png)).await?;
    debug!(user_id = %auth.user.id, "Avatar updated");

    Ok(StatusCode::OK)
}

/// Remove the avatar
pub async fn delete_avatar(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<StatusCode> {
    state.store.set_avatar(auth.user.id, None).await?;

    Ok(StatusCode::OK)
}

/// Public avatar image
///
/// Answers `404` when the ID is malformed, the user doesn't exist, or they
/// have no avatar.
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let not_found = || ApiError::NotFound("Avatar not found".to_string());

    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let png = state.store.find_avatar(id).await?.ok_or_else(not_found)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_normalization() {
        let req = SignupRequest {
            name: "  Vinh ".to_string(),
            email: " Vinh@Example.com ".to_string(),
            password: " vinhpass ".to_string(),
            age: None,
        }
        .normalized();

        assert_eq!(req.name, "Vinh");
        assert_eq!(req.email, "vinh@example.com");
        assert_eq!(req.password, "vinhpass");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_signup_request_validation() {
        let req = SignupRequest {
            name: "   ".to_string(),
            email: "not-an-email".to_string(),
            password: "vinhpass".to_string(),
            age: Some(-1),
        }
        .normalized();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("age"));
    }

    #[test]
    fn test_update_request_rejects_unknown_fields() {
        let result: Result<UpdateUserRequest, _> =
            serde_json::from_str(r#"{"name": "Vinh", "role": "admin"}"#);
        assert!(result.is_err());

        let req: UpdateUserRequest = serde_json::from_str(r#"{"age": 30}"#).unwrap();
        assert_eq!(req.age, Some(30));
        assert!(req.name.is_none());
    }

    #[test]
    fn test_password_rules_are_enforced() {
        assert!(matches!(
            hash_checked_password("short"),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            hash_checked_password("myPassword123"),
            Err(ApiError::ValidationError(_))
        ));
    }
}
