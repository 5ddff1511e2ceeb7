//! Common test utilities for integration tests
//!
//! Every test gets its own in-memory store and a recording mail provider, so
//! the suite needs no database or network. The context is seeded with one
//! user who already holds one session token.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use taskdeck_mailer::providers::{EmailMessage, RecordingProvider};
use taskdeck_shared::auth::{password::hash_password, session::issue_token};
use taskdeck_shared::models::{normalize_email, CreateUser, User};
use taskdeck_shared::store::{MemoryStore, UserStore};
use tokio_util::sync::CancellationToken;
use tower::Service as _;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const SEED_EMAIL: &str = "userTest@example.com";
pub const SEED_PASSWORD: &str = "userTestPass";

const BOUNDARY: &str = "taskdeck-test-boundary";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub mail: RecordingProvider,
    pub config: Config,
    pub user: User,
    pub token: String,
    shutdown: CancellationToken,
}

impl TestContext {
    /// Creates a fresh app with the seeded user
    pub async fn new() -> anyhow::Result<Self> {
        let vars: HashMap<&str, &str> =
            HashMap::from([("DATABASE_URL", "memory://"), ("JWT_SECRET", JWT_SECRET)]);
        let config = Config::from_vars(|key| vars.get(key).map(|v| v.to_string()))?;

        let store = Arc::new(MemoryStore::new());

        let user = store
            .create_user(CreateUser {
                name: "Test User".to_string(),
                email: normalize_email(SEED_EMAIL),
                password_hash: hash_password(SEED_PASSWORD)?,
                age: 0,
            })
            .await?;
        let token = issue_token(store.as_ref(), &user, JWT_SECRET).await?;

        let mail = RecordingProvider::new();
        let shutdown = CancellationToken::new();
        let (mailer, _worker) = taskdeck_mailer::spawn(
            Arc::new(mail.clone()),
            config.mail.from.clone(),
            shutdown.clone(),
        );

        let state = AppState::new(store.clone(), mailer, config.clone());
        let app = build_router(state);

        Ok(TestContext {
            app,
            store,
            mail,
            config,
            user,
            token,
            shutdown,
        })
    }

    /// Returns authorization header value for the seeded user
    pub fn auth_header(&self) -> String {
        bearer(&self.token)
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            content_type,
            body,
        }
    }

    /// Sends a JSON request, authenticated when `token` is given
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, bearer(token));
        }

        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Sends a bodiless request, authenticated when `token` is given
    pub async fn empty(&self, method: Method, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, bearer(token));
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Uploads one multipart file field as the given user
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        filename: &str,
        data: &[u8],
    ) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, bearer(token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(field, filename, data)))
            .unwrap();

        self.send(request).await
    }

    /// Signs up a user and returns (user JSON, token)
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> (Value, String) {
        let response = self
            .json(
                Method::POST,
                "/users",
                None,
                serde_json::json!({ "name": name, "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());

        let body = response.json();
        let token = body["token"].as_str().unwrap().to_string();
        (body["user"].clone(), token)
    }

    /// Waits until the mail worker has delivered `count` messages
    pub async fn wait_for_mail(&self, count: usize) -> Vec<EmailMessage> {
        let mail = self.mail.clone();
        wait_for(move || {
            let mail = mail.clone();
            async move { mail.messages().len() >= count }
        }, 5)
        .await
        .unwrap();

        self.mail.messages()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Buffered response
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("body is not JSON ({}): {}", e, self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Single-field multipart/form-data body using [`BOUNDARY`]
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Encodes a solid-color JPEG of the given size
pub fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([30, 120, 200]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    buf
}

/// Helper to wait for condition with timeout
pub async fn wait_for<F, Fut>(condition: F, timeout_secs: u64) -> anyhow::Result<()>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_secs(timeout_secs);

    loop {
        if condition().await {
            return Ok(());
        }

        if start.elapsed() > timeout {
            anyhow::bail!("Condition not met within {} seconds", timeout_secs);
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    }
}
