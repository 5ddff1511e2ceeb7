//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdeck_api::{app::{build_router, AppState}, config::Config};
//! use taskdeck_mailer::providers::DisabledProvider;
//! use taskdeck_shared::store::MemoryStore;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let (mailer, _worker) = taskdeck_mailer::spawn(
//!     Arc::new(DisabledProvider),
//!     config.mail.from.clone(),
//!     CancellationToken::new(),
//! );
//! let state = AppState::new(Arc::new(MemoryStore::new()), mailer, config);
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use taskdeck_mailer::NotificationDispatcher;
use taskdeck_shared::{auth::middleware::authenticate, store::Store};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// User, session and task storage
    pub store: Arc<dyn Store>,

    /// Queue handle for account emails
    pub mailer: NotificationDispatcher,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, mailer: NotificationDispatcher, config: Config) -> Self {
        Self {
            store,
            mailer,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /health                 public
/// ├── POST   /users                  public, signup
/// ├── POST   /users/login            public
/// ├── GET    /users/:id/avatar       public
/// ├── POST   /users/logout           auth
/// ├── POST   /users/logoutAll        auth
/// ├── GET    /users/me               auth
/// ├── PATCH  /users/me               auth
/// ├── DELETE /users/me               auth
/// ├── POST   /users/me/avatar        auth, multipart
/// ├── DELETE /users/me/avatar        auth
/// ├── POST   /tasks                  auth
/// ├── GET    /tasks                  auth, ?completed&sortBy&page&size
/// ├── GET    /tasks/:id              auth
/// ├── PATCH  /tasks/:id              auth
/// └── DELETE /tasks/:id              auth
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/users", post(routes::users::signup))
        .route("/users/login", post(routes::users::login))
        .route("/users/:id/avatar", get(routes::users::get_avatar));

    let user_routes = Router::new()
        .route("/users/logout", post(routes::users::logout))
        .route("/users/logoutAll", post(routes::users::logout_all))
        .route(
            "/users/me",
            get(routes::users::me)
                .patch(routes::users::update_me)
                .delete(routes::users::delete_me),
        )
        .route(
            "/users/me/avatar",
            post(routes::users::upload_avatar).delete(routes::users::delete_avatar),
        );

    let task_routes = Router::new()
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let protected_routes = Router::new()
        .merge(user_routes)
        .merge(task_routes)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_gate,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Authentication layer for protected routes
///
/// Resolves the bearer token and injects the `AuthContext` into request
/// extensions; handlers take it as a parameter.
async fn auth_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(state.store.as_ref(), state.jwt_secret(), req.headers()).await?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
