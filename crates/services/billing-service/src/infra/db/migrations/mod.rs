//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_auth_tables;
mod m20240101_000002_create_groups_and_models;
mod m20240101_000003_create_subscription_plans;
mod m20240101_000004_create_user_subscriptions;
mod m20240101_000005_create_organizations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_auth_tables::Migration),
            Box::new(m20240101_000002_create_groups_and_models::Migration),
            Box::new(m20240101_000003_create_subscription_plans::Migration),
            Box::new(m20240101_000004_create_user_subscriptions::Migration),
            Box::new(m20240101_000005_create_organizations::Migration),
        ]
    }
}
