//! Access-control group entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::UuidList;
use domain::Group;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub user_ids: UuidList,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Group {
    fn from(model: Model) -> Self {
        Group {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            user_ids: model.user_ids.0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Group> for ActiveModel {
    fn from(group: Group) -> Self {
        ActiveModel {
            id: Set(group.id),
            owner_id: Set(group.owner_id),
            name: Set(group.name),
            description: Set(group.description),
            user_ids: Set(group.user_ids.into()),
            created_at: Set(group.created_at),
            updated_at: Set(group.updated_at),
        }
    }
}
