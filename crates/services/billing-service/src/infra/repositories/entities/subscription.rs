//! User subscription entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{SubscriptionStatus, UserSubscription};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: String,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub start_date: Option<DateTimeUtc>,
    pub end_date: Option<DateTimeUtc>,
    pub auto_renew: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserSubscription {
    fn from(model: Model) -> Self {
        UserSubscription {
            id: model.id,
            user_id: model.user_id,
            plan_id: model.plan_id,
            status: SubscriptionStatus::from(model.status.as_str()),
            payment_id: model.payment_id,
            payment_method: model.payment_method,
            start_date: model.start_date,
            end_date: model.end_date,
            auto_renew: model.auto_renew,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<UserSubscription> for ActiveModel {
    fn from(sub: UserSubscription) -> Self {
        ActiveModel {
            id: Set(sub.id),
            user_id: Set(sub.user_id),
            plan_id: Set(sub.plan_id),
            status: Set(sub.status.as_str().to_string()),
            payment_id: Set(sub.payment_id),
            payment_method: Set(sub.payment_method),
            start_date: Set(sub.start_date),
            end_date: Set(sub.end_date),
            auto_renew: Set(sub.auto_renew),
            created_at: Set(sub.created_at),
            updated_at: Set(sub.updated_at),
        }
    }
}
