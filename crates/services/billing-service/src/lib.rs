//! Billing service
//!
//! Subscription plans, user subscriptions with payment activation,
//! organizations with signup gating, accounts and transactional email.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **services**: Use cases over the Unit of Work
//! - **infra**: Database, migrations, repositories and Redis
//! - **notifications**: SMTP delivery and email templates
//! - **jobs**: Background email delivery
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//!
//! Domain entities live in the `domain` crate, errors in `common`.
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -p billing-service -- serve
//!
//! # Run migrations
//! cargo run -p billing-service -- migrate up
//!
//! # Expire overdue subscriptions
//! cargo run -p billing-service -- subscriptions expire
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod infra;
pub mod jobs;
pub mod notifications;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use common::{AppError, AppResult};
pub use config::Config;
pub use infra::{Cache, Database};
