//! Service Container - Centralized service access.
//!
//! Handlers depend on service traits through [`ServiceContainer`], never on
//! the managers directly.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, OrganizationManager, OrganizationService, PaymentVerifier,
    PlanManager, PlanService, ReferenceCheck, SubscriptionManager, SubscriptionService,
};
use crate::config::Config;
use crate::infra::Persistence;
use crate::notifications::{templates::Branding, Mailer, Notifier};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn plans(&self) -> Arc<dyn PlanService>;

    fn subscriptions(&self) -> Arc<dyn SubscriptionService>;

    fn organizations(&self) -> Arc<dyn OrganizationService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    plan_service: Arc<dyn PlanService>,
    subscription_service: Arc<dyn SubscriptionService>,
    organization_service: Arc<dyn OrganizationService>,
}

impl Services {
    /// Create a service container from already-built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        plan_service: Arc<dyn PlanService>,
        subscription_service: Arc<dyn SubscriptionService>,
        organization_service: Arc<dyn OrganizationService>,
    ) -> Self {
        Self {
            auth_service,
            plan_service,
            subscription_service,
            organization_service,
        }
    }

    /// Wire every service over one database connection pool.
    ///
    /// Payments are checked with [`ReferenceCheck`].
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self::with_verifier(db, config, mailer, Arc::new(ReferenceCheck))
    }

    /// Like [`Services::from_connection`] with a custom payment verifier
    pub fn with_verifier(
        db: sea_orm::DatabaseConnection,
        config: Config,
        mailer: Arc<dyn Mailer>,
        verifier: Arc<dyn PaymentVerifier>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let notifier = Notifier::new(
            mailer,
            Branding::new(config.app_name.clone(), config.app_url.clone()),
        );

        Self {
            auth_service: Arc::new(Authenticator::new(
                uow.clone(),
                config,
                notifier,
                verifier.clone(),
            )),
            plan_service: Arc::new(PlanManager::new(uow.clone())),
            subscription_service: Arc::new(SubscriptionManager::new(uow.clone(), verifier)),
            organization_service: Arc::new(OrganizationManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn plans(&self) -> Arc<dyn PlanService> {
        self.plan_service.clone()
    }

    fn subscriptions(&self) -> Arc<dyn SubscriptionService> {
        self.subscription_service.clone()
    }

    fn organizations(&self) -> Arc<dyn OrganizationService> {
        self.organization_service.clone()
    }
}
