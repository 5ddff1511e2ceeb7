//! # Taskdeck API Server
//!
//! Multi-user task tracking over HTTP: accounts with bearer-token sessions,
//! per-user tasks, avatars, and account emails.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=memory:// JWT_SECRET=$(openssl rand -hex 32) cargo run -p taskdeck-api
//! ```

use std::sync::Arc;

use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_mailer::providers::{DisabledProvider, EmailProvider, SendGridProvider};
use taskdeck_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{create_pool, DatabaseConfig},
    },
    store::{MemoryStore, PgStore, Store},
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "Taskdeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let store = create_store(&config).await?;

    let provider: Arc<dyn EmailProvider> = match &config.mail.sendgrid_api_key {
        Some(key) => Arc::new(SendGridProvider::new(key.clone())),
        None => {
            tracing::warn!("SENDGRID_API_KEY not set, account emails are disabled");
            Arc::new(DisabledProvider)
        }
    };

    let shutdown = CancellationToken::new();
    let (mailer, mail_worker) =
        taskdeck_mailer::spawn(provider, config.mail.from.clone(), shutdown.clone());

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, mailer, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, flushing mail queue");
    shutdown.cancel();
    mail_worker.await?;

    Ok(())
}

/// Installs the global subscriber; `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskdeck_api=debug,taskdeck_mailer=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn create_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    if config.database.is_memory() {
        tracing::warn!("Using in-memory store, data will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    ensure_database_exists(&config.database.url).await?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    Ok(Arc::new(PgStore::new(pool)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
