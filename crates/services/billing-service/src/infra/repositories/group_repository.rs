//! Access-control group repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait};
use uuid::Uuid;

use super::base::{ensure_deleted, lockable, update_error, DbHandle};
use super::entities::group::{ActiveModel, Entity as GroupEntity};
use common::{AppError, AppResult};
use domain::Group;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Group>>;

    async fn create(&self, group: Group) -> AppResult<Group>;

    async fn update(&self, group: Group) -> AppResult<Group>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct GroupStore<H> {
    db: H,
}

impl<H: DbHandle> GroupStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> GroupRepository for GroupStore<H> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Group>> {
        let result = lockable(GroupEntity::find_by_id(id), &self.db)
            .one(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Group::from))
    }

    async fn create(&self, group: Group) -> AppResult<Group> {
        let model = ActiveModel::from(group)
            .insert(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(Group::from(model))
    }

    async fn update(&self, group: Group) -> AppResult<Group> {
        let model = ActiveModel::from(group)
            .update(self.db.conn())
            .await
            .map_err(update_error)?;

        Ok(Group::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = GroupEntity::delete_by_id(id)
            .exec(self.db.conn())
            .await
            .map_err(AppError::from)?;

        ensure_deleted(result.rows_affected)
    }
}
