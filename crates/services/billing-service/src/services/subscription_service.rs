//! Subscription service - Subscription lifecycle and payment activation.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{SubscriptionChanges, UserSubscription, DEFAULT_PAYMENT_METHOD};

use super::membership;
use super::payment::PaymentVerifier;
use crate::infra::UnitOfWork;

/// Payment reference submitted for a pending subscription.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub subscription_id: Uuid,
    pub payment_id: String,
    pub payment_method: Option<String>,
}

/// Result of a successful payment verification
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyPaymentResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Payment verified and subscription activated")]
    pub message: String,
    pub subscription: UserSubscription,
}

/// Subscription service trait for dependency injection.
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    /// The user's most recently created subscription
    async fn get_current_subscription(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>>;

    /// Start a pending subscription and enroll the user in the plan
    async fn create_subscription(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        payment_id: Option<String>,
        payment_method: Option<String>,
    ) -> AppResult<UserSubscription>;

    /// Confirm a payment and activate the subscription.
    ///
    /// Only the subscriber or an admin may confirm.
    async fn verify_payment(
        &self,
        payment: PaymentConfirmation,
        requester_id: Uuid,
        requester_is_admin: bool,
    ) -> AppResult<VerifyPaymentResponse>;

    /// Admin partial update; status changes move plan membership
    async fn update_subscription(
        &self,
        id: Uuid,
        changes: SubscriptionChanges,
    ) -> AppResult<UserSubscription>;

    /// Expire active subscriptions past their end date. Returns how many.
    async fn expire_overdue(&self) -> AppResult<usize>;
}

/// Concrete implementation of SubscriptionService using Unit of Work.
pub struct SubscriptionManager<U: UnitOfWork> {
    uow: Arc<U>,
    verifier: Arc<dyn PaymentVerifier>,
}

impl<U: UnitOfWork> SubscriptionManager<U> {
    pub fn new(uow: Arc<U>, verifier: Arc<dyn PaymentVerifier>) -> Self {
        Self { uow, verifier }
    }
}

#[async_trait]
impl<U: UnitOfWork> SubscriptionService for SubscriptionManager<U> {
    async fn get_current_subscription(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>> {
        self.uow
            .repos()
            .subscriptions()
            .find_latest_for_user(user_id)
            .await
    }

    async fn create_subscription(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        payment_id: Option<String>,
        payment_method: Option<String>,
    ) -> AppResult<UserSubscription> {
        self.uow
            .transaction(move |repos| {
                Box::pin(async move {
                    membership::start_subscription(
                        repos,
                        user_id,
                        plan_id,
                        payment_id,
                        payment_method,
                    )
                    .await
                })
            })
            .await
    }

    async fn verify_payment(
        &self,
        payment: PaymentConfirmation,
        requester_id: Uuid,
        requester_is_admin: bool,
    ) -> AppResult<VerifyPaymentResponse> {
        let repos = self.uow.repos();
        let subscription = repos
            .subscriptions()
            .find_by_id(payment.subscription_id)
            .await?
            .ok_or_not_found()?;

        if subscription.user_id != requester_id && !requester_is_admin {
            return Err(AppError::Forbidden);
        }

        repos
            .plans()
            .find_by_id(subscription.plan_id)
            .await?
            .ok_or_not_found()?;

        let payment_method = payment
            .payment_method
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

        if !self
            .verifier
            .verify(&payment.payment_id, &payment_method)
            .await?
        {
            tracing::warn!(
                subscription_id = %payment.subscription_id,
                payment_method = %payment_method,
                "Payment verification rejected"
            );
            return Err(AppError::bad_request("Payment verification failed"));
        }

        let subscription_id = payment.subscription_id;
        let payment_id = payment.payment_id;
        let subscription = self
            .uow
            .transaction(move |repos| {
                Box::pin(async move {
                    membership::activate_subscription(
                        repos,
                        subscription_id,
                        payment_id,
                        payment_method,
                    )
                    .await
                })
            })
            .await?;

        Ok(VerifyPaymentResponse {
            success: true,
            message: "Payment verified and subscription activated".to_string(),
            subscription,
        })
    }

    async fn update_subscription(
        &self,
        id: Uuid,
        changes: SubscriptionChanges,
    ) -> AppResult<UserSubscription> {
        self.uow
            .transaction(move |repos| {
                Box::pin(async move { membership::change_subscription(repos, id, changes).await })
            })
            .await
    }

    async fn expire_overdue(&self) -> AppResult<usize> {
        let overdue = self
            .uow
            .repos()
            .subscriptions()
            .list_overdue(Utc::now())
            .await?;

        let mut expired = 0;
        for subscription in overdue {
            let id = subscription.id;
            let result = self
                .uow
                .transaction(move |repos| {
                    Box::pin(async move { membership::expire_subscription(repos, id).await })
                })
                .await;

            match result {
                Ok(Some(_)) => expired += 1,
                Ok(None) => {}
                Err(e) => tracing::error!(subscription_id = %id, error = %e, "Failed to expire subscription"),
            }
        }

        tracing::info!(expired, "Expired overdue subscriptions");
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::testing::{MockRepos, TestUnitOfWork};
    use crate::services::payment::MockPaymentVerifier;
    use chrono::Duration;
    use domain::{NewPlan, SubscriptionPlan, SubscriptionStatus};
    use mockall::predicate::eq;

    fn plan() -> SubscriptionPlan {
        SubscriptionPlan::new(
            NewPlan {
                plan_name: "Weekly".to_string(),
                subtitle: None,
                plan_type: Default::default(),
                duration_type: domain::DurationType::Weeks,
                plan_duration: 2,
                price: 5.0,
                benefits: vec![],
                additional_info: None,
                models: vec![],
            },
            None,
        )
    }

    fn accepting_verifier() -> Arc<dyn PaymentVerifier> {
        let mut verifier = MockPaymentVerifier::new();
        verifier.expect_verify().returning(|_, _| Ok(true));
        Arc::new(verifier)
    }

    fn manager(repos: MockRepos, verifier: Arc<dyn PaymentVerifier>) -> SubscriptionManager<TestUnitOfWork> {
        SubscriptionManager::new(Arc::new(TestUnitOfWork::new(repos)), verifier)
    }

    fn confirmation(subscription_id: Uuid) -> PaymentConfirmation {
        PaymentConfirmation {
            subscription_id,
            payment_id: "pi_123".to_string(),
            payment_method: None,
        }
    }

    #[tokio::test]
    async fn test_verify_payment_activates_for_plan_period() {
        let plan = plan();
        let user_id = Uuid::new_v4();
        let subscription = UserSubscription::pending(user_id, plan.id, None, None);
        let sub_id = subscription.id;

        let mut repos = MockRepos::new();
        repos
            .subscriptions
            .expect_find_by_id()
            .with(eq(sub_id))
            .returning(move |_| Ok(Some(subscription.clone())));
        repos
            .plans
            .expect_find_by_id()
            .returning(move |_| Ok(Some(plan.clone())));
        repos.subscriptions.expect_update().returning(|s| Ok(s));
        repos
            .plans
            .expect_update()
            .withf(move |p| p.has_user(user_id))
            .returning(|p| Ok(p));
        repos.users.expect_find_by_id().returning(|_| Ok(None));

        let mut verifier = MockPaymentVerifier::new();
        verifier
            .expect_verify()
            .withf(|payment_id, method| payment_id == "pi_123" && method == DEFAULT_PAYMENT_METHOD)
            .times(1)
            .returning(|_, _| Ok(true));

        let response = manager(repos, Arc::new(verifier))
            .verify_payment(confirmation(sub_id), user_id, false)
            .await
            .unwrap();

        assert!(response.success);
        let sub = response.subscription;
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.payment_method.as_deref(), Some("stripe"));
        assert_eq!(sub.end_date.unwrap() - sub.start_date.unwrap(), Duration::days(14));
    }

    #[tokio::test]
    async fn test_verify_payment_rejects_other_users() {
        let subscription = UserSubscription::pending(Uuid::new_v4(), Uuid::new_v4(), None, None);
        let sub_id = subscription.id;

        let mut repos = MockRepos::new();
        repos
            .subscriptions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(subscription.clone())));

        let result = manager(repos, accepting_verifier())
            .verify_payment(confirmation(sub_id), Uuid::new_v4(), false)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_verify_payment_rejected_by_processor() {
        let plan = plan();
        let user_id = Uuid::new_v4();
        let subscription = UserSubscription::pending(user_id, plan.id, None, None);
        let sub_id = subscription.id;

        let mut repos = MockRepos::new();
        repos
            .subscriptions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(subscription.clone())));
        repos
            .plans
            .expect_find_by_id()
            .returning(move |_| Ok(Some(plan.clone())));
        repos.subscriptions.expect_update().never();

        let mut verifier = MockPaymentVerifier::new();
        verifier.expect_verify().returning(|_, _| Ok(false));

        let result = manager(repos, Arc::new(verifier))
            .verify_payment(confirmation(sub_id), user_id, false)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_verify_payment_missing_plan() {
        let user_id = Uuid::new_v4();
        let subscription = UserSubscription::pending(user_id, Uuid::new_v4(), None, None);
        let sub_id = subscription.id;

        let mut repos = MockRepos::new();
        repos
            .subscriptions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(subscription.clone())));
        repos.plans.expect_find_by_id().returning(|_| Ok(None));

        let result = manager(repos, accepting_verifier())
            .verify_payment(confirmation(sub_id), Uuid::new_v4(), true)
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_current_subscription_absent() {
        let mut repos = MockRepos::new();
        repos
            .subscriptions
            .expect_find_latest_for_user()
            .returning(|_| Ok(None));

        let current = manager(repos, accepting_verifier())
            .get_current_subscription(Uuid::new_v4())
            .await
            .unwrap();

        assert!(current.is_none());
    }

    #[tokio::test]
    async fn test_expire_overdue_counts_expired() {
        let mut overdue = UserSubscription::pending(Uuid::new_v4(), Uuid::new_v4(), None, None);
        overdue.activate(
            "pi_1".into(),
            "stripe".into(),
            Duration::days(1),
            Utc::now() - Duration::days(3),
        )
        .unwrap();
        let listed = overdue.clone();

        let mut repos = MockRepos::new();
        repos
            .subscriptions
            .expect_list_overdue()
            .returning(move |_| Ok(vec![listed.clone()]));
        repos
            .subscriptions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(overdue.clone())));
        repos
            .subscriptions
            .expect_update()
            .withf(|s| s.status == SubscriptionStatus::Expired)
            .returning(|s| Ok(s));
        repos.users.expect_find_by_id().returning(|_| Ok(None));
        repos.plans.expect_find_by_id().returning(|_| Ok(None));

        let expired = manager(repos, accepting_verifier())
            .expire_overdue()
            .await
            .unwrap();

        assert_eq!(expired, 1);
    }

    #[tokio::test]
    async fn test_expire_overdue_skips_renewed_subscription() {
        let mut overdue = UserSubscription::pending(Uuid::new_v4(), Uuid::new_v4(), None, None);
        overdue
            .activate(
                "pi_1".into(),
                "stripe".into(),
                Duration::days(1),
                Utc::now() - Duration::days(3),
            )
            .unwrap();
        let mut renewed = overdue.clone();
        renewed.end_date = Some(Utc::now() + Duration::days(30));

        let mut repos = MockRepos::new();
        repos
            .subscriptions
            .expect_list_overdue()
            .returning(move |_| Ok(vec![overdue.clone()]));
        repos
            .subscriptions
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(renewed.clone())));
        repos.subscriptions.expect_update().never();
        repos.plans.expect_find_by_id().never();

        let expired = manager(repos, accepting_verifier())
            .expire_overdue()
            .await
            .unwrap();

        assert_eq!(expired, 0);
    }
}
