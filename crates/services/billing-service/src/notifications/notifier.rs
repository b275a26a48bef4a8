//! Sends account emails without ever failing the caller.

use std::sync::Arc;

use super::mailer::{Email, Mailer};
use super::templates::{password_reset_email, welcome_email, Branding};

/// Renders templates and hands them to the configured mailer.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    brand: Branding,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, brand: Branding) -> Self {
        Self { mailer, brand }
    }

    /// Returns whether the message was handed off.
    pub async fn send_welcome(&self, name: &str, email: &str, password: &str) -> bool {
        self.deliver(welcome_email(&self.brand, name, email, password))
            .await
    }

    /// Returns whether the message was handed off.
    pub async fn send_password_reset(&self, name: &str, email: &str, password: &str) -> bool {
        self.deliver(password_reset_email(&self.brand, name, email, password))
            .await
    }

    async fn deliver(&self, email: Email) -> bool {
        match self.mailer.send(&email).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(to = %email.to, error = %e, "Failed to send email");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::MockMailer;
    use common::AppError;

    fn notifier(mailer: MockMailer) -> Notifier {
        Notifier::new(
            Arc::new(mailer),
            Branding::new("OptimalMD", "http://localhost:3000"),
        )
    }

    #[tokio::test]
    async fn test_welcome_is_sent_to_user() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| email.to == "jane@example.com" && email.text.contains("Secret123"))
            .times(1)
            .returning(|_| Ok(()));

        assert!(notifier(mailer).send_welcome("Jane", "jane@example.com", "Secret123").await);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .returning(|_| Err(AppError::mail("connection refused")));

        assert!(!notifier(mailer).send_password_reset("Jane", "jane@example.com", "pw").await);
    }
}
