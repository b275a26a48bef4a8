//! Subscription plan repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::base::{ensure_deleted, lockable, update_error, DbHandle};
use super::entities::plan::{self, ActiveModel, Entity as PlanEntity};
use common::{AppError, AppResult};
use domain::SubscriptionPlan;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>>;

    /// Plans open for purchase, newest first
    async fn list_active(&self) -> AppResult<Vec<SubscriptionPlan>>;

    /// Every plan including inactive ones, newest first
    async fn list_all(&self) -> AppResult<Vec<SubscriptionPlan>>;

    async fn create(&self, plan: SubscriptionPlan) -> AppResult<SubscriptionPlan>;

    /// Persist the whole plan row
    async fn update(&self, plan: SubscriptionPlan) -> AppResult<SubscriptionPlan>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed plan repository
pub struct PlanStore<H> {
    db: H,
}

impl<H: DbHandle> PlanStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> PlanRepository for PlanStore<H> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>> {
        let result = lockable(PlanEntity::find_by_id(id), &self.db)
            .one(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(SubscriptionPlan::from))
    }

    async fn list_active(&self) -> AppResult<Vec<SubscriptionPlan>> {
        let models = PlanEntity::find()
            .filter(plan::Column::IsActive.eq(true))
            .order_by_desc(plan::Column::CreatedAt)
            .all(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(SubscriptionPlan::from).collect())
    }

    async fn list_all(&self) -> AppResult<Vec<SubscriptionPlan>> {
        let models = PlanEntity::find()
            .order_by_desc(plan::Column::CreatedAt)
            .all(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(SubscriptionPlan::from).collect())
    }

    async fn create(&self, plan: SubscriptionPlan) -> AppResult<SubscriptionPlan> {
        let model = ActiveModel::from(plan)
            .insert(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(SubscriptionPlan::from(model))
    }

    async fn update(&self, plan: SubscriptionPlan) -> AppResult<SubscriptionPlan> {
        let model = ActiveModel::from(plan)
            .update(self.db.conn())
            .await
            .map_err(update_error)?;

        Ok(SubscriptionPlan::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = PlanEntity::delete_by_id(id)
            .exec(self.db.conn())
            .await
            .map_err(AppError::from)?;

        ensure_deleted(result.rows_affected)
    }
}
