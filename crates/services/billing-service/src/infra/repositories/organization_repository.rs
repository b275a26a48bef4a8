//! Organization repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::base::{ensure_deleted, lockable, update_error, DbHandle};
use super::entities::organization::{self, ActiveModel, Entity as OrganizationEntity};
use common::{AppError, AppResult};
use domain::Organization;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// All organizations ordered by code
    async fn list(&self) -> AppResult<Vec<Organization>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Organization>>;

    /// Lookup by normalized (uppercase) code
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Organization>>;

    async fn create(&self, organization: Organization) -> AppResult<Organization>;

    async fn update(&self, organization: Organization) -> AppResult<Organization>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct OrganizationStore<H> {
    db: H,
}

impl<H: DbHandle> OrganizationStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> OrganizationRepository for OrganizationStore<H> {
    async fn list(&self) -> AppResult<Vec<Organization>> {
        let models = OrganizationEntity::find()
            .order_by_asc(organization::Column::OrgCode)
            .all(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Organization::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Organization>> {
        let result = lockable(OrganizationEntity::find_by_id(id), &self.db)
            .one(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Organization::from))
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Organization>> {
        let select = OrganizationEntity::find().filter(organization::Column::OrgCode.eq(code));
        let result = lockable(select, &self.db)
            .one(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Organization::from))
    }

    async fn create(&self, organization: Organization) -> AppResult<Organization> {
        let model = ActiveModel::from(organization)
            .insert(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(Organization::from(model))
    }

    async fn update(&self, organization: Organization) -> AppResult<Organization> {
        let model = ActiveModel::from(organization)
            .update(self.db.conn())
            .await
            .map_err(update_error)?;

        Ok(Organization::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = OrganizationEntity::delete_by_id(id)
            .exec(self.db.conn())
            .await
            .map_err(AppError::from)?;

        ensure_deleted(result.rows_affected)
    }
}
