//! Core provider trait and message type
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use taskdeck_mailer::providers::{EmailMessage, EmailProvider, MailResult};
//!
//! struct StdoutProvider;
//!
//! #[async_trait]
//! impl EmailProvider for StdoutProvider {
//!     fn name(&self) -> &str {
//!         "stdout"
//!     }
//!
//!     async fn send(&self, message: &EmailMessage) -> MailResult<()> {
//!         println!("To: {}\nSubject: {}\n\n{}", message.to, message.subject, message.text);
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Mail error types
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Could not reach the provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success status
    #[error("Provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Worker is gone and the message could not be queued
    #[error("Mail queue is closed")]
    QueueClosed,
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        MailError::Transport(err.to_string())
    }
}

/// Mail result type alias
pub type MailResult<T> = Result<T, MailError>;

/// Plain-text email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text: String,
}

/// Delivers rendered messages
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    async fn send(&self, message: &EmailMessage) -> MailResult<()>;
}

/// Provider used when no API key is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProvider;

#[async_trait]
impl EmailProvider for DisabledProvider {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn send(&self, message: &EmailMessage) -> MailResult<()> {
        tracing::debug!(
            to = %message.to,
            subject = %message.subject,
            "Email delivery disabled, dropping message"
        );
        Ok(())
    }
}
