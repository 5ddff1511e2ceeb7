//! In-memory provider for tests
//!
//! Records every message it is asked to send. It can be switched into a
//! failing mode to check that delivery errors stay contained.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::provider::{EmailMessage, EmailProvider, MailError, MailResult};

/// Provider that keeps sent messages in memory
///
/// Clones share the same record, so a test can keep one handle and give
/// another to the worker.
#[derive(Debug, Clone, Default)]
pub struct RecordingProvider {
    messages: Arc<Mutex<Vec<EmailMessage>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail (or succeed again)
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages delivered so far, in send order
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: &EmailMessage) -> MailResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Transport("recording provider set to fail".to_string()));
        }

        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.clone());
        }
        Ok(())
    }
}
