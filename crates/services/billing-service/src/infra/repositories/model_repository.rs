//! AI model repository. Only the access-control bookkeeping plans need.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait};

use super::base::{lockable, update_error, DbHandle};
use super::entities::model::{ActiveModel, Entity as ModelEntity};
use common::{AppError, AppResult};
use domain::AiModel;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ModelRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<AiModel>>;

    async fn create(&self, model: AiModel) -> AppResult<AiModel>;

    async fn update(&self, model: AiModel) -> AppResult<AiModel>;
}

pub struct ModelStore<H> {
    db: H,
}

impl<H: DbHandle> ModelStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> ModelRepository for ModelStore<H> {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<AiModel>> {
        let result = lockable(ModelEntity::find_by_id(id.to_string()), &self.db)
            .one(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AiModel::from))
    }

    async fn create(&self, model: AiModel) -> AppResult<AiModel> {
        let model = ActiveModel::from(model)
            .insert(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(AiModel::from(model))
    }

    async fn update(&self, model: AiModel) -> AppResult<AiModel> {
        let model = ActiveModel::from(model)
            .update(self.db.conn())
            .await
            .map_err(update_error)?;

        Ok(AiModel::from(model))
    }
}
