//! HTTP request handlers.

pub mod auth_handler;
pub mod organization_handler;
pub mod plan_handler;
pub mod subscription_handler;

pub use auth_handler::{auth_protected_routes, auth_routes};
pub use organization_handler::{organization_public_routes, organization_routes};
pub use plan_handler::{plan_admin_routes, plan_routes};
pub use subscription_handler::subscription_routes;
