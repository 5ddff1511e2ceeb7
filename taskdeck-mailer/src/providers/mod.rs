//! Email delivery providers
//!
//! - [`EmailProvider`]: the delivery contract
//! - [`SendGridProvider`]: SendGrid v3 HTTP API
//! - [`DisabledProvider`]: logs and drops (no API key configured)
//! - [`RecordingProvider`]: keeps messages in memory for tests

pub mod provider;
pub mod recording;
pub mod sendgrid;

pub use provider::{DisabledProvider, EmailMessage, EmailProvider, MailError, MailResult};
pub use recording::RecordingProvider;
pub use sendgrid::SendGridProvider;
