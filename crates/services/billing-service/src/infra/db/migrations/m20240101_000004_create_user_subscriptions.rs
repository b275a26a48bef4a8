//! Migration: Create user_subscriptions table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSubscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserSubscriptions::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserSubscriptions::PlanId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserSubscriptions::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(UserSubscriptions::PaymentId).string().null())
                    .col(ColumnDef::new(UserSubscriptions::PaymentMethod).string().null())
                    .col(
                        ColumnDef::new(UserSubscriptions::StartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::AutoRenew)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_user_subscriptions_user_id", UserSubscriptions::UserId),
            ("idx_user_subscriptions_plan_id", UserSubscriptions::PlanId),
            ("idx_user_subscriptions_status", UserSubscriptions::Status),
            ("idx_user_subscriptions_end_date", UserSubscriptions::EndDate),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(UserSubscriptions::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserSubscriptions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserSubscriptions {
    Table,
    Id,
    UserId,
    PlanId,
    Status,
    PaymentId,
    PaymentMethod,
    StartDate,
    EndDate,
    AutoRenew,
    CreatedAt,
    UpdatedAt,
}
