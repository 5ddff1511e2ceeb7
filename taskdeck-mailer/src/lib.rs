//! # Taskdeck Mailer
//!
//! Transactional email for account events: welcome on signup and goodbye on
//! account deletion. Notifications are queued and delivered by a background
//! worker, so request handlers never wait on the email provider.
//!
//! ## Modules
//!
//! - `providers`: delivery backends (SendGrid, disabled, recording)
//! - `templates`: notification kinds and their rendered text
//! - `dispatcher`: the queue handle and the background worker

pub mod dispatcher;
pub mod providers;
pub mod templates;

pub use dispatcher::{spawn, MailWorker, NotificationDispatcher};
pub use providers::{EmailMessage, EmailProvider};
pub use templates::Notification;
