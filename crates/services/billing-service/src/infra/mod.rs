//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Caching and rate limiting (Redis)
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    CredentialRepository, GroupRepository, ModelRepository, OrganizationRepository,
    PlanRepository, Repositories, Stores, SubscriptionRepository, UserRepository,
};
pub use unit_of_work::{Persistence, TxFuture, UnitOfWork};
