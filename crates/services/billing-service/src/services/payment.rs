//! Payment confirmation seam.
//!
//! Activation only asks whether a payment reference is good. Wiring a real
//! processor means implementing [`PaymentVerifier`] and handing it to the
//! service container.

use async_trait::async_trait;

use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Confirms that a payment reference was settled by the processor.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// `Ok(false)` rejects the payment, `Err` means the check itself failed.
    async fn verify(&self, payment_id: &str, payment_method: &str) -> AppResult<bool>;
}

/// Accepts any non-blank payment reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceCheck;

#[async_trait]
impl PaymentVerifier for ReferenceCheck {
    async fn verify(&self, payment_id: &str, payment_method: &str) -> AppResult<bool> {
        let accepted = !payment_id.trim().is_empty();
        tracing::debug!(payment_method, accepted, "Checked payment reference");
        Ok(accepted)
    }
}
