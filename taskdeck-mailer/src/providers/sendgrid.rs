//! SendGrid provider
//!
//! Sends through the v3 `mail/send` endpoint with a bearer API key. SendGrid
//! answers 202 Accepted with an empty body on success.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use super::provider::{EmailMessage, EmailProvider, MailError, MailResult};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// SendGrid v3 API client
#[derive(Debug, Clone)]
pub struct SendGridProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SendGridProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: SENDGRID_SEND_URL.to_string(),
        }
    }

    /// Points the client at another endpoint (sandbox or local stub)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Request body for a single plain-text message
pub fn build_payload(message: &EmailMessage) -> JsonValue {
    json!({
        "personalizations": [
            { "to": [{ "email": message.to }] }
        ],
        "from": { "email": message.from },
        "subject": message.subject,
        "content": [
            { "type": "text/plain", "value": message.text }
        ]
    })
}

#[async_trait]
impl EmailProvider for SendGridProvider {
    fn name(&self) -> &str {
        "sendgrid"
    }

    async fn send(&self, message: &EmailMessage) -> MailResult<()> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&build_payload(message))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
