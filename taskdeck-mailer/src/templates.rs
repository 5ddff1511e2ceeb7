//! Notification messages

use crate::providers::EmailMessage;

/// An account event that warrants an email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Sent after signup
    Welcome { email: String, name: String },

    /// Sent after the account is deleted
    Cancellation { email: String, name: String },
}

impl Notification {
    /// Short kind name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Welcome { .. } => "welcome",
            Notification::Cancellation { .. } => "cancellation",
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Notification::Welcome { email, .. } | Notification::Cancellation { email, .. } => email,
        }
    }

    /// Renders the message sent from `from`
    pub fn render(&self, from: &str) -> EmailMessage {
        let (subject, text) = match self {
            Notification::Welcome { name, .. } => (
                "Thanks for joining in!",
                format!(
                    "Welcome to the app, {}. Let me know how you get along with the app.",
                    name
                ),
            ),
            Notification::Cancellation { name, .. } => (
                "Cancelation",
                format!("Goodbye! {}.", name),
            ),
        };

        EmailMessage {
            to: self.recipient().to_string(),
            from: from.to_string(),
            subject: subject.to_string(),
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_welcome() {
        let message = Notification::Welcome {
            email: "vinh@example.com".to_string(),
            name: "Vinh".to_string(),
        }
        .render("no-reply@taskdeck.dev");

        assert_eq!(message.to, "vinh@example.com");
        assert_eq!(message.from, "no-reply@taskdeck.dev");
        assert_eq!(message.subject, "Thanks for joining in!");
        assert_eq!(
            message.text,
            "Welcome to the app, Vinh. Let me know how you get along with the app."
        );
    }

    #[test]
    fn test_render_cancellation() {
        let notification = Notification::Cancellation {
            email: "vinh@example.com".to_string(),
            name: "Vinh".to_string(),
        };
        let message = notification.render("no-reply@taskdeck.dev");

        assert_eq!(notification.kind(), "cancellation");
        assert_eq!(message.subject, "Cancelation");
        assert_eq!(message.text, "Goodbye! Vinh.");
    }
}
