//! Configuration management for the API server
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 8080)
//! - `API_CORS_ORIGINS`: Comma-separated allowed origins (default: *)
//! - `DATABASE_URL`: PostgreSQL connection string, or `memory://` (required)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `JWT_SECRET`: Secret key for token signing, at least 32 characters (required)
//! - `SENDGRID_API_KEY`: SendGrid key; email delivery is disabled when unset
//! - `MAIL_FROM`: Sender address (default: no-reply@taskdeck.dev)
//! - `RUST_LOG` / `LOG_FORMAT`: Log filter and `json` output, read by the binary
//!
//! # Example
//!
//! ```no_run
//! use taskdeck_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use std::env;

/// `DATABASE_URL` value selecting the in-memory store
pub const MEMORY_DATABASE_URL: &str = "memory://";

const DEFAULT_MAIL_FROM: &str = "no-reply@taskdeck.dev";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, or [`MEMORY_DATABASE_URL`]
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// True when the in-memory store is selected
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// Must be kept secret and be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Outgoing email configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SendGrid API key; None disables delivery
    pub sendgrid_api_key: Option<String>,

    /// Sender address
    pub from: String,
}

impl Config {
    /// Loads configuration from environment variables (and `.env`, if present)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric variable doesn't parse
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds configuration from any variable source
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = var("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let cors_origins = var("API_CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let sendgrid_api_key = var("SENDGRID_API_KEY").filter(|key| !key.trim().is_empty());
        let mail_from = var("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            mail: MailConfig {
                sendgrid_api_key,
                from: mail_from,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
