//! User profile entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{SubscriptionStatus, User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
    pub subscription_id: Option<Uuid>,
    pub subscription_status: Option<String>,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            email: model.email,
            name: model.name,
            role: UserRole::from(model.role.as_str()),
            phone: model.phone,
            date_of_birth: model.date_of_birth,
            subscription_id: model.subscription_id,
            subscription_status: model
                .subscription_status
                .as_deref()
                .map(SubscriptionStatus::from),
            organization_id: model.organization_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        ActiveModel {
            id: Set(user.id),
            email: Set(user.email),
            name: Set(user.name),
            role: Set(user.role.as_str().to_string()),
            phone: Set(user.phone),
            date_of_birth: Set(user.date_of_birth),
            subscription_id: Set(user.subscription_id),
            subscription_status: Set(user.subscription_status.map(|s| s.as_str().to_string())),
            organization_id: Set(user.organization_id),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
    }
}
