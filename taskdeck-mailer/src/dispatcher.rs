//! Fire-and-forget notification dispatch
//!
//! Request handlers hold a [`NotificationDispatcher`] and submit
//! notifications without waiting. A single [`MailWorker`] task renders and
//! delivers them in submission order. Delivery failures are logged and
//! dropped; nothing is retried.
//!
//! # Shutdown
//!
//! ```text
//! shutdown_token.cancel()
//!   ├─> worker stops waiting for new notifications
//!   ├─> delivers whatever is still queued
//!   └─> returns
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdeck_mailer::dispatcher::spawn;
//! use taskdeck_mailer::providers::DisabledProvider;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let shutdown = CancellationToken::new();
//! let (mailer, handle) = spawn(Arc::new(DisabledProvider), "no-reply@taskdeck.dev", shutdown.clone());
//!
//! mailer.send_welcome("vinh@example.com", "Vinh");
//!
//! shutdown.cancel();
//! handle.await.unwrap();
//! # }
//! ```

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::providers::{EmailProvider, MailError, MailResult};
use crate::templates::Notification;

/// Handle for submitting notifications
///
/// Cheap to clone; all clones feed the same worker.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotificationDispatcher {
    /// Queues a notification; fails only if the worker has stopped
    pub fn submit(&self, notification: Notification) -> MailResult<()> {
        self.tx
            .send(notification)
            .map_err(|_| MailError::QueueClosed)
    }

    /// Queues the signup email
    pub fn send_welcome(&self, email: &str, name: &str) {
        self.submit_or_log(Notification::Welcome {
            email: email.to_string(),
            name: name.to_string(),
        });
    }

    /// Queues the account-deleted email
    pub fn send_cancellation(&self, email: &str, name: &str) {
        self.submit_or_log(Notification::Cancellation {
            email: email.to_string(),
            name: name.to_string(),
        });
    }

    fn submit_or_log(&self, notification: Notification) {
        let kind = notification.kind();
        if let Err(e) = self.submit(notification) {
            tracing::warn!(kind, error = %e, "Dropping notification");
        }
    }
}

/// Background task that delivers queued notifications
pub struct MailWorker {
    rx: mpsc::UnboundedReceiver<Notification>,
    provider: Arc<dyn EmailProvider>,
    from: String,
    shutdown_token: CancellationToken,
}

impl MailWorker {
    /// Creates a worker and the dispatcher feeding it
    pub fn new(
        provider: Arc<dyn EmailProvider>,
        from: impl Into<String>,
        shutdown_token: CancellationToken,
    ) -> (NotificationDispatcher, Self) {
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = MailWorker {
            rx,
            provider,
            from: from.into(),
            shutdown_token,
        };

        (NotificationDispatcher { tx }, worker)
    }

    /// Delivers notifications until shutdown or until every dispatcher is dropped
    pub async fn run(mut self) {
        tracing::info!(provider = %self.provider.name(), "Mail worker starting");

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Shutdown requested, draining mail queue");
                    self.rx.close();
                    while let Some(notification) = self.rx.recv().await {
                        self.deliver(notification).await;
                    }
                    break;
                }
                next = self.rx.recv() => match next {
                    Some(notification) => self.deliver(notification).await,
                    None => break,
                },
            }
        }

        tracing::info!("Mail worker shut down");
    }

    async fn deliver(&self, notification: Notification) {
        let message = notification.render(&self.from);

        match self.provider.send(&message).await {
            Ok(()) => {
                tracing::debug!(kind = notification.kind(), to = %message.to, "Email sent");
            }
            Err(e) => {
                tracing::warn!(
                    kind = notification.kind(),
                    to = %message.to,
                    provider = %self.provider.name(),
                    error = %e,
                    "Email delivery failed"
                );
            }
        }
    }
}

/// Starts a mail worker on the runtime and returns its dispatcher
pub fn spawn(
    provider: Arc<dyn EmailProvider>,
    from: impl Into<String>,
    shutdown_token: CancellationToken,
) -> (NotificationDispatcher, JoinHandle<()>) {
    let (dispatcher, worker) = MailWorker::new(provider, from, shutdown_token);
    let handle = tokio::spawn(worker.run());
    (dispatcher, handle)
}
