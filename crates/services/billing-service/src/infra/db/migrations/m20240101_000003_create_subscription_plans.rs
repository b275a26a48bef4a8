//! Migration: Create subscription_plans table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlans::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubscriptionPlans::PlanName).string().not_null())
                    .col(ColumnDef::new(SubscriptionPlans::Subtitle).text().null())
                    .col(
                        ColumnDef::new(SubscriptionPlans::PlanType)
                            .string()
                            .not_null()
                            .default("premium"),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::DurationType)
                            .string()
                            .not_null()
                            .default("months"),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::PlanDuration)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(SubscriptionPlans::Price).double().not_null())
                    .col(
                        ColumnDef::new(SubscriptionPlans::Benefits)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(SubscriptionPlans::AdditionalInfo).text().null())
                    .col(ColumnDef::new(SubscriptionPlans::GroupId).uuid().null())
                    .col(
                        ColumnDef::new(SubscriptionPlans::Models)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Users)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_plans_is_active")
                    .table(SubscriptionPlans::Table)
                    .col(SubscriptionPlans::IsActive)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_plans_plan_type")
                    .table(SubscriptionPlans::Table)
                    .col(SubscriptionPlans::PlanType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SubscriptionPlans::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SubscriptionPlans {
    Table,
    Id,
    PlanName,
    Subtitle,
    PlanType,
    DurationType,
    PlanDuration,
    Price,
    Benefits,
    AdditionalInfo,
    GroupId,
    Models,
    Users,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
