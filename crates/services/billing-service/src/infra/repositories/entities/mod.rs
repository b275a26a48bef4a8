//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod credential;
pub mod group;
mod lists;
pub mod model;
pub mod organization;
pub mod plan;
pub mod subscription;
pub mod user;

pub use lists::{StringList, UuidList};
