//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. Multi-table sequences run inside one
//! Unit of Work transaction.

mod auth_service;
pub mod container;
mod membership;
mod organization_service;
mod payment;
mod plan_service;
mod subscription_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AddedUser, AuthService, Authenticator, Claims, NewAccount, PasswordResetResponse, Signup,
    TokenResponse,
};
pub use organization_service::{OrganizationManager, OrganizationService};
pub use payment::{PaymentVerifier, ReferenceCheck};
pub use plan_service::{PlanManager, PlanService};
pub use subscription_service::{
    PaymentConfirmation, SubscriptionManager, SubscriptionService, VerifyPaymentResponse,
};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use payment::MockPaymentVerifier;
