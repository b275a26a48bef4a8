//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::infra::{Cache, Database};
use crate::notifications::Mailer;
use crate::services::{
    AuthService, OrganizationService, PlanService, ServiceContainer, Services, SubscriptionService,
};

/// Application state containing all services (DI container).
///
/// Cache and database are optional so routers can be exercised with mock
/// services. Without a cache, rate limiting and plan caching are skipped.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub plan_service: Arc<dyn PlanService>,
    pub subscription_service: Arc<dyn SubscriptionService>,
    pub organization_service: Arc<dyn OrganizationService>,
    /// Redis cache
    pub cache: Option<Arc<Cache>>,
    /// Database connection, pinged by the health check
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Build every service over the database connection.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        config: crate::config::Config,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let container = Services::from_connection(database.get_connection(), config, mailer);

        Self::from_container(&container)
            .with_cache(cache)
            .with_database(database)
    }

    /// Take every service from a container. No infrastructure attached.
    pub fn from_container(container: &dyn ServiceContainer) -> Self {
        Self {
            auth_service: container.auth(),
            plan_service: container.plans(),
            subscription_service: container.subscriptions(),
            organization_service: container.organizations(),
            cache: None,
            database: None,
        }
    }

    /// Create application state with manually injected services.
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
            cache: None,
            database: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::infra::testing::{MockRepos, TestUnitOfWork};
    use crate::notifications::{templates::Branding, LogMailer, Notifier};
    use crate::services::{
        Authenticator, MockServiceContainer, OrganizationManager, PlanManager, ReferenceCheck,
        SubscriptionManager,
    };

    #[test]
    fn test_state_takes_every_service_from_container() {
        let uow = Arc::new(TestUnitOfWork::new(MockRepos::new()));
        let auth: Arc<dyn AuthService> = Arc::new(Authenticator::new(
            uow.clone(),
            Config::for_tests(),
            Notifier::new(Arc::new(LogMailer), Branding::new("Test", "http://localhost")),
            Arc::new(ReferenceCheck),
        ));
        let plans: Arc<dyn PlanService> = Arc::new(PlanManager::new(uow.clone()));
        let subscriptions: Arc<dyn SubscriptionService> =
            Arc::new(SubscriptionManager::new(uow.clone(), Arc::new(ReferenceCheck)));
        let organizations: Arc<dyn OrganizationService> = Arc::new(OrganizationManager::new(uow));

        let mut container = MockServiceContainer::new();
        container.expect_auth().times(1).return_const(auth);
        container.expect_plans().times(1).return_const(plans);
        container
            .expect_subscriptions()
            .times(1)
            .return_const(subscriptions);
        container
            .expect_organizations()
            .times(1)
            .return_const(organizations);

        let state = AppState::from_container(&container);

        assert!(state.cache.is_none());
        assert!(state.database.is_none());
    }
}
