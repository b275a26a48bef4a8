//! Email background job.
//!
//! The API pushes [`Email`] payloads when `EMAIL_DELIVERY=queue`. The worker
//! delivers them through SMTP, or logs them when SMTP is not configured.

use std::sync::Arc;

use apalis::prelude::Data;

use crate::notifications::{Email, Mailer};
use common::AppError;

/// Email job handler - delivers one queued message
pub async fn deliver_email(job: Email, mailer: Data<Arc<dyn Mailer>>) -> Result<(), AppError> {
    tracing::info!(to = %job.to, subject = %job.subject, "Processing email job");

    mailer.send(&job).await.map_err(|e| {
        tracing::error!(to = %job.to, error = %e, "Email job failed");
        e
    })?;

    tracing::info!(to = %job.to, "Email processed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::MockMailer;

    fn job() -> Email {
        Email {
            to: "jane@example.com".to_string(),
            subject: "Welcome".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: "Hi".to_string(),
            from: None,
        }
    }

    #[tokio::test]
    async fn test_job_delivers_through_mailer() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(1).returning(|_| Ok(()));
        let mailer: Arc<dyn Mailer> = Arc::new(mailer);

        assert!(deliver_email(job(), Data::new(mailer)).await.is_ok());
    }

    #[tokio::test]
    async fn test_job_failure_is_reported_for_retry() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .returning(|_| Err(AppError::mail("smtp down")));
        let mailer: Arc<dyn Mailer> = Arc::new(mailer);

        assert!(deliver_email(job(), Data::new(mailer)).await.is_err());
    }
}
