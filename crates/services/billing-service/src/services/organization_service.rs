//! Organization service - Organization management and signup gating.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    normalize_org_code, NewOrganization, Organization, OrganizationChanges, OrganizationSignupInfo,
};

use crate::infra::UnitOfWork;

/// Organization service trait for dependency injection.
#[async_trait]
pub trait OrganizationService: Send + Sync {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>>;

    /// Create an organization. The code must be unused.
    async fn create_organization(&self, org: NewOrganization) -> AppResult<Organization>;

    async fn get_organization(&self, id: Uuid) -> AppResult<Organization>;

    /// Lookup by code, case-insensitive
    async fn get_organization_by_code(&self, code: &str) -> AppResult<Organization>;

    /// Partial update. A changed code is checked for uniqueness again.
    async fn update_organization(
        &self,
        id: Uuid,
        changes: OrganizationChanges,
    ) -> AppResult<Organization>;

    async fn add_users(&self, id: Uuid, user_ids: Vec<Uuid>) -> AppResult<Organization>;

    async fn remove_users(&self, id: Uuid, user_ids: Vec<Uuid>) -> AppResult<Organization>;

    async fn add_plans(&self, id: Uuid, plan_ids: Vec<Uuid>) -> AppResult<Organization>;

    async fn remove_plans(&self, id: Uuid, plan_ids: Vec<Uuid>) -> AppResult<Organization>;

    async fn delete_organization(&self, id: Uuid) -> AppResult<()>;

    /// Public signup page data; fails unless the organization accepts signups
    async fn signup_info(&self, code: &str) -> AppResult<OrganizationSignupInfo>;
}

/// Concrete implementation of OrganizationService using Unit of Work.
pub struct OrganizationManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrganizationManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Load, mutate with `f`, and persist only when `f` reports a change.
    async fn modify<F>(&self, id: Uuid, f: F) -> AppResult<Organization>
    where
        F: FnOnce(&mut Organization) -> usize + Send + 'static,
    {
        self.uow
            .transaction(move |repos| {
                Box::pin(async move {
                    let organizations = repos.organizations();
                    let mut org = organizations.find_by_id(id).await?.ok_or_not_found()?;

                    if f(&mut org) == 0 {
                        return Ok(org);
                    }
                    organizations.update(org).await
                })
            })
            .await
    }
}

#[async_trait]
impl<U: UnitOfWork> OrganizationService for OrganizationManager<U> {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        self.uow.repos().organizations().list().await
    }

    async fn create_organization(&self, form: NewOrganization) -> AppResult<Organization> {
        let org = Organization::new(form)?;
        let organizations = self.uow.repos().organizations();

        if organizations.find_by_code(&org.org_code).await?.is_some() {
            return Err(AppError::conflict("Organization code"));
        }

        let org = organizations.create(org).await?;
        tracing::info!(org_id = %org.id, org_code = %org.org_code, "Organization created");
        Ok(org)
    }

    async fn get_organization(&self, id: Uuid) -> AppResult<Organization> {
        self.uow
            .repos()
            .organizations()
            .find_by_id(id)
            .await?
            .ok_or_not_found()
    }

    async fn get_organization_by_code(&self, code: &str) -> AppResult<Organization> {
        let code = normalize_org_code(code)?;
        self.uow
            .repos()
            .organizations()
            .find_by_code(&code)
            .await?
            .ok_or_not_found()
    }

    async fn update_organization(
        &self,
        id: Uuid,
        changes: OrganizationChanges,
    ) -> AppResult<Organization> {
        self.uow
            .transaction(move |repos| {
                Box::pin(async move {
                    let organizations = repos.organizations();
                    let mut org = organizations.find_by_id(id).await?.ok_or_not_found()?;

                    org.apply(changes)?;

                    if let Some(existing) = organizations.find_by_code(&org.org_code).await? {
                        if existing.id != org.id {
                            return Err(AppError::conflict("Organization code"));
                        }
                    }

                    organizations.update(org).await
                })
            })
            .await
    }

    async fn add_users(&self, id: Uuid, user_ids: Vec<Uuid>) -> AppResult<Organization> {
        self.modify(id, move |org| org.add_users(&user_ids)).await
    }

    async fn remove_users(&self, id: Uuid, user_ids: Vec<Uuid>) -> AppResult<Organization> {
        self.modify(id, move |org| org.remove_users(&user_ids)).await
    }

    async fn add_plans(&self, id: Uuid, plan_ids: Vec<Uuid>) -> AppResult<Organization> {
        self.modify(id, move |org| org.add_plans(&plan_ids)).await
    }

    async fn remove_plans(&self, id: Uuid, plan_ids: Vec<Uuid>) -> AppResult<Organization> {
        self.modify(id, move |org| org.remove_plans(&plan_ids)).await
    }

    async fn delete_organization(&self, id: Uuid) -> AppResult<()> {
        self.uow.repos().organizations().delete(id).await?;
        tracing::info!(org_id = %id, "Organization deleted");
        Ok(())
    }

    async fn signup_info(&self, code: &str) -> AppResult<OrganizationSignupInfo> {
        let org = self.get_organization_by_code(code).await?;
        org.ensure_accepts_signups()?;
        Ok(org.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::testing::{MockRepos, TestUnitOfWork};
    use domain::OrganizationStatus;

    fn org(code: &str) -> Organization {
        Organization::new(NewOrganization {
            org_code: code.to_string(),
            org_name: "Acme Health".to_string(),
            status: None,
            signup_enabled: None,
            plans: vec![],
        })
        .unwrap()
    }

    fn manager(repos: MockRepos) -> OrganizationManager<TestUnitOfWork> {
        OrganizationManager::new(Arc::new(TestUnitOfWork::new(repos)))
    }

    #[tokio::test]
    async fn test_create_normalizes_code() {
        let mut repos = MockRepos::new();
        repos
            .organizations
            .expect_find_by_code()
            .withf(|code| code == "ACME-01")
            .returning(|_| Ok(None));
        repos
            .organizations
            .expect_create()
            .returning(|o| Ok(o));

        let created = manager(repos)
            .create_organization(NewOrganization {
                org_code: " acme-01 ".to_string(),
                org_name: "Acme".to_string(),
                status: None,
                signup_enabled: None,
                plans: vec![],
            })
            .await
            .unwrap();

        assert_eq!(created.org_code, "ACME-01");
        assert!(created.signup_enabled);
        assert_eq!(created.status, OrganizationStatus::Active);
    }

    #[tokio::test]
    async fn test_create_duplicate_code_conflicts() {
        let existing = org("ACME");
        let mut repos = MockRepos::new();
        repos
            .organizations
            .expect_find_by_code()
            .returning(move |_| Ok(Some(existing.clone())));
        repos.organizations.expect_create().never();

        let result = manager(repos)
            .create_organization(NewOrganization {
                org_code: "acme".to_string(),
                org_name: "Other".to_string(),
                status: None,
                signup_enabled: None,
                plans: vec![],
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_invalid_code() {
        let result = manager(MockRepos::new())
            .create_organization(NewOrganization {
                org_code: "no spaces!".to_string(),
                org_name: "Bad".to_string(),
                status: None,
                signup_enabled: None,
                plans: vec![],
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_code_taken_by_another() {
        let target = org("ALPHA");
        let target_id = target.id;
        let other = org("BETA");

        let mut repos = MockRepos::new();
        repos
            .organizations
            .expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        repos
            .organizations
            .expect_find_by_code()
            .returning(move |_| Ok(Some(other.clone())));
        repos.organizations.expect_update().never();

        let result = manager(repos)
            .update_organization(
                target_id,
                OrganizationChanges {
                    org_code: Some("beta".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_keeping_own_code() {
        let target = org("ALPHA");
        let target_id = target.id;
        let same = target.clone();

        let mut repos = MockRepos::new();
        repos
            .organizations
            .expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        repos
            .organizations
            .expect_find_by_code()
            .returning(move |_| Ok(Some(same.clone())));
        repos.organizations.expect_update().returning(|o| Ok(o));

        let updated = manager(repos)
            .update_organization(
                target_id,
                OrganizationChanges {
                    org_name: Some("Alpha Clinics".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.org_name, "Alpha Clinics");
    }

    #[tokio::test]
    async fn test_add_users_skips_write_when_nothing_changes() {
        let member = Uuid::new_v4();
        let mut existing = org("ACME");
        existing.add_users(&[member]);
        let id = existing.id;

        let mut repos = MockRepos::new();
        repos
            .organizations
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repos.organizations.expect_update().never();

        let org = manager(repos).add_users(id, vec![member]).await.unwrap();
        assert_eq!(org.users, vec![member]);
    }

    #[tokio::test]
    async fn test_remove_plans() {
        let plan_id = Uuid::new_v4();
        let mut existing = org("ACME");
        existing.add_plans(&[plan_id]);
        let id = existing.id;

        let mut repos = MockRepos::new();
        repos
            .organizations
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repos
            .organizations
            .expect_update()
            .withf(|o| o.plans.is_empty())
            .times(1)
            .returning(|o| Ok(o));

        let org = manager(repos).remove_plans(id, vec![plan_id]).await.unwrap();
        assert!(org.plans.is_empty());
    }

    #[tokio::test]
    async fn test_signup_info_gating() {
        let mut closed = org("CLOSED");
        closed.signup_enabled = false;
        let mut suspended = org("SUSP");
        suspended.status = OrganizationStatus::Suspended;
        let open = org("OPEN");

        let mut repos = MockRepos::new();
        repos.organizations.expect_find_by_code().returning(move |code| {
            Ok(match code {
                "CLOSED" => Some(closed.clone()),
                "SUSP" => Some(suspended.clone()),
                "OPEN" => Some(open.clone()),
                _ => None,
            })
        });
        let service = manager(repos);

        assert!(matches!(service.signup_info("closed").await, Err(AppError::Denied(_))));
        assert!(matches!(service.signup_info("susp").await, Err(AppError::Denied(_))));
        assert!(matches!(service.signup_info("nope").await, Err(AppError::NotFound)));

        let info = service.signup_info("open").await.unwrap();
        assert_eq!(info.org_code, "OPEN");
        assert_eq!(info.org_name, "Acme Health");
    }
}
