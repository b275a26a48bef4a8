//! AI model entity. Plans grant read access to these.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{AccessControl, AiModel};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "models")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub base_model_id: Option<String>,
    pub name: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub meta: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub params: Json,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub access_control: Option<Json>,
    pub owner_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AiModel {
    fn from(model: Model) -> Self {
        AiModel {
            id: model.id,
            base_model_id: model.base_model_id,
            name: model.name,
            meta: model.meta,
            params: model.params,
            access_control: model.access_control.map(AccessControl::from_value),
            owner_id: model.owner_id,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<AiModel> for ActiveModel {
    fn from(model: AiModel) -> Self {
        ActiveModel {
            id: Set(model.id),
            base_model_id: Set(model.base_model_id),
            name: Set(model.name),
            meta: Set(model.meta),
            params: Set(model.params),
            access_control: Set(model.access_control.map(AccessControl::into_value)),
            owner_id: Set(model.owner_id),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}
