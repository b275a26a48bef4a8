//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! Every store is generic over its [`DbHandle`] so the same code serves
//! pooled reads and transactional writes.

mod base;
mod credential_repository;
pub(crate) mod entities;
mod group_repository;
mod model_repository;
mod organization_repository;
mod plan_repository;
mod subscription_repository;
mod user_repository;

pub use base::DbHandle;
pub use credential_repository::{CredentialRepository, CredentialStore};
pub use group_repository::{GroupRepository, GroupStore};
pub use model_repository::{ModelRepository, ModelStore};
pub use organization_repository::{OrganizationRepository, OrganizationStore};
pub use plan_repository::{PlanRepository, PlanStore};
pub use subscription_repository::{SubscriptionRepository, SubscriptionStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use credential_repository::MockCredentialRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use group_repository::MockGroupRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use model_repository::MockModelRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use organization_repository::MockOrganizationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use plan_repository::MockPlanRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use subscription_repository::MockSubscriptionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

/// Every repository, bound to one connection or transaction.
pub trait Repositories: Send + Sync {
    fn plans(&self) -> &dyn PlanRepository;
    fn subscriptions(&self) -> &dyn SubscriptionRepository;
    fn groups(&self) -> &dyn GroupRepository;
    fn models(&self) -> &dyn ModelRepository;
    fn organizations(&self) -> &dyn OrganizationRepository;
    fn users(&self) -> &dyn UserRepository;
    fn credentials(&self) -> &dyn CredentialRepository;
}

/// The SeaORM stores sharing one handle.
pub struct Stores<H> {
    plans: PlanStore<H>,
    subscriptions: SubscriptionStore<H>,
    groups: GroupStore<H>,
    models: ModelStore<H>,
    organizations: OrganizationStore<H>,
    users: UserStore<H>,
    credentials: CredentialStore<H>,
}

impl<H: DbHandle + Clone> Stores<H> {
    pub fn new(db: H) -> Self {
        Self {
            plans: PlanStore::new(db.clone()),
            subscriptions: SubscriptionStore::new(db.clone()),
            groups: GroupStore::new(db.clone()),
            models: ModelStore::new(db.clone()),
            organizations: OrganizationStore::new(db.clone()),
            users: UserStore::new(db.clone()),
            credentials: CredentialStore::new(db),
        }
    }
}

impl<H: DbHandle> Repositories for Stores<H> {
    fn plans(&self) -> &dyn PlanRepository {
        &self.plans
    }

    fn subscriptions(&self) -> &dyn SubscriptionRepository {
        &self.subscriptions
    }

    fn groups(&self) -> &dyn GroupRepository {
        &self.groups
    }

    fn models(&self) -> &dyn ModelRepository {
        &self.models
    }

    fn organizations(&self) -> &dyn OrganizationRepository {
        &self.organizations
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn credentials(&self) -> &dyn CredentialRepository {
        &self.credentials
    }
}
