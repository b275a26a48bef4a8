//! User subscription repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::base::{lockable, update_error, DbHandle};
use super::entities::subscription::{self, ActiveModel, Entity as SubscriptionEntity};
use common::{AppError, AppResult};
use domain::{SubscriptionStatus, UserSubscription};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserSubscription>>;

    /// Most recently created subscription of a user
    async fn find_latest_for_user(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>>;

    async fn create(&self, subscription: UserSubscription) -> AppResult<UserSubscription>;

    /// Persist the whole subscription row
    async fn update(&self, subscription: UserSubscription) -> AppResult<UserSubscription>;

    /// Active subscriptions whose period ended before `now`
    async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<UserSubscription>>;
}

/// SeaORM-backed subscription repository
pub struct SubscriptionStore<H> {
    db: H,
}

impl<H: DbHandle> SubscriptionStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> SubscriptionRepository for SubscriptionStore<H> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserSubscription>> {
        let result = lockable(SubscriptionEntity::find_by_id(id), &self.db)
            .one(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(UserSubscription::from))
    }

    async fn find_latest_for_user(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>> {
        let result = SubscriptionEntity::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .order_by_desc(subscription::Column::CreatedAt)
            .one(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(UserSubscription::from))
    }

    async fn create(&self, subscription: UserSubscription) -> AppResult<UserSubscription> {
        let model = ActiveModel::from(subscription)
            .insert(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(UserSubscription::from(model))
    }

    async fn update(&self, subscription: UserSubscription) -> AppResult<UserSubscription> {
        let model = ActiveModel::from(subscription)
            .update(self.db.conn())
            .await
            .map_err(update_error)?;

        Ok(UserSubscription::from(model))
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<UserSubscription>> {
        let models = SubscriptionEntity::find()
            .filter(subscription::Column::Status.eq(SubscriptionStatus::Active.as_str()))
            .filter(subscription::Column::EndDate.lt(now))
            .all(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(UserSubscription::from).collect())
    }
}
