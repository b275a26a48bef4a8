//! Test doubles for the persistence layer.
//!
//! `MockRepos` bundles one mockall mock per repository and `TestUnitOfWork`
//! runs "transactions" straight against it.

use async_trait::async_trait;

use super::repositories::{
    CredentialRepository, GroupRepository, MockCredentialRepository, MockGroupRepository,
    MockModelRepository, MockOrganizationRepository, MockPlanRepository,
    MockSubscriptionRepository, MockUserRepository, ModelRepository, OrganizationRepository,
    PlanRepository, Repositories, SubscriptionRepository, UserRepository,
};
use super::unit_of_work::{TxFuture, UnitOfWork};
use common::AppResult;

/// One mock per repository. Set expectations on the fields directly.
#[derive(Default)]
pub struct MockRepos {
    pub plans: MockPlanRepository,
    pub subscriptions: MockSubscriptionRepository,
    pub groups: MockGroupRepository,
    pub models: MockModelRepository,
    pub organizations: MockOrganizationRepository,
    pub users: MockUserRepository,
    pub credentials: MockCredentialRepository,
}

impl MockRepos {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repositories for MockRepos {
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

/// Unit of work without a database. Transactions run on the mocks.
pub struct TestUnitOfWork {
    pub repos: MockRepos,
}

impl TestUnitOfWork {
    pub fn new(repos: MockRepos) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn repos(&self) -> &dyn Repositories {
        &self.repos
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn Repositories) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        f(&self.repos).await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn Repositories) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        f(&self.repos).await
    }
}
