//! Subscriptions command - scheduled maintenance.
//!
//! Meant to run from cron:
//!
//! ```bash
//! billing-service subscriptions expire
//! ```

use std::sync::Arc;

use crate::cli::args::{SubscriptionsAction, SubscriptionsArgs};
use crate::config::Config;
use crate::infra::{Database, Persistence};
use crate::services::{ReferenceCheck, SubscriptionManager, SubscriptionService};
use common::AppResult;

/// Execute the subscriptions command
pub async fn execute(args: SubscriptionsArgs, config: Config) -> AppResult<()> {
    match args.action {
        SubscriptionsAction::Expire => expire(&config).await,
    }
}

async fn expire(config: &Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(config).await?;
    let service = SubscriptionManager::new(
        Arc::new(Persistence::new(db.get_connection())),
        Arc::new(ReferenceCheck),
    );

    let expired = service.expire_overdue().await?;
    println!("Expired {} subscription(s).", expired);

    Ok(())
}
