//! Credential repository. Password hashes never leave this layer except
//! for verification.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::base::DbHandle;
use super::entities::credential::{self, ActiveModel, Entity as CredentialEntity};
use common::{AppError, AppResult};
use domain::Credential;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Credential>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>>;

    async fn create(&self, credential: Credential) -> AppResult<Credential>;

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;
}

pub struct CredentialStore<H> {
    db: H,
}

impl<H: DbHandle> CredentialStore<H> {
    pub fn new(db: H) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<H: DbHandle> CredentialRepository for CredentialStore<H> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Credential>> {
        let result = CredentialEntity::find_by_id(id)
            .one(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Credential::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        let result = CredentialEntity::find()
            .filter(credential::Column::Email.eq(email))
            .one(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Credential::from))
    }

    async fn create(&self, credential: Credential) -> AppResult<Credential> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(credential.id),
            email: Set(credential.email),
            password_hash: Set(credential.password_hash),
            active: Set(credential.active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(self.db.conn())
            .await
            .map_err(AppError::from)?;

        Ok(Credential::from(model))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let found = CredentialEntity::find_by_id(id)
            .one(self.db.conn())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = found.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(chrono::Utc::now());

        active.update(self.db.conn()).await.map_err(AppError::from)?;
        Ok(())
    }
}
