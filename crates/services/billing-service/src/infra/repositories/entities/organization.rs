//! Organization entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::UuidList;
use domain::{Organization, OrganizationStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub org_code: String,
    pub org_name: String,
    pub status: String,
    pub signup_enabled: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub users: UuidList,
    #[sea_orm(column_type = "JsonBinary")]
    pub plans: UuidList,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Organization {
    fn from(model: Model) -> Self {
        Organization {
            id: model.id,
            org_code: model.org_code,
            org_name: model.org_name,
            status: OrganizationStatus::from(model.status.as_str()),
            signup_enabled: model.signup_enabled,
            users: model.users.0,
            plans: model.plans.0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Organization> for ActiveModel {
    fn from(org: Organization) -> Self {
        ActiveModel {
            id: Set(org.id),
            org_code: Set(org.org_code),
            org_name: Set(org.org_name),
            status: Set(org.status.as_str().to_string()),
            signup_enabled: Set(org.signup_enabled),
            users: Set(org.users.into()),
            plans: Set(org.plans.into()),
            created_at: Set(org.created_at),
            updated_at: Set(org.updated_at),
        }
    }
}
