//! Subscription plan entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::{StringList, UuidList};
use domain::{DurationType, PlanType, SubscriptionPlan};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subscription_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plan_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub subtitle: Option<String>,
    pub plan_type: String,
    pub duration_type: String,
    pub plan_duration: i64,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    #[sea_orm(column_type = "JsonBinary")]
    pub benefits: StringList,
    #[sea_orm(column_type = "Text", nullable)]
    pub additional_info: Option<String>,
    pub group_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub models: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub users: UuidList,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SubscriptionPlan {
    fn from(model: Model) -> Self {
        SubscriptionPlan {
            id: model.id,
            plan_name: model.plan_name,
            subtitle: model.subtitle,
            plan_type: PlanType::from(model.plan_type.as_str()),
            duration_type: DurationType::from(model.duration_type.as_str()),
            plan_duration: model.plan_duration,
            price: model.price,
            benefits: model.benefits.0,
            additional_info: model.additional_info,
            group_id: model.group_id,
            models: model.models.0,
            users: model.users.0,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<SubscriptionPlan> for ActiveModel {
    fn from(plan: SubscriptionPlan) -> Self {
        ActiveModel {
            id: Set(plan.id),
            plan_name: Set(plan.plan_name),
            subtitle: Set(plan.subtitle),
            plan_type: Set(plan.plan_type.as_str().to_string()),
            duration_type: Set(plan.duration_type.as_str().to_string()),
            plan_duration: Set(plan.plan_duration),
            price: Set(plan.price),
            benefits: Set(plan.benefits.into()),
            additional_info: Set(plan.additional_info),
            group_id: Set(plan.group_id),
            models: Set(plan.models.into()),
            users: Set(plan.users.into()),
            is_active: Set(plan.is_active),
            created_at: Set(plan.created_at),
            updated_at: Set(plan.updated_at),
        }
    }
}
