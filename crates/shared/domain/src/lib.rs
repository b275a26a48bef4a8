//! Domain layer - Core billing and organization entities.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! plans, subscriptions, organizations, users, and the access-control
//! documents attached to AI models.

pub mod access_control;
pub mod constants;
pub mod error;
pub mod group;
pub mod model;
pub mod organization;
pub mod password;
pub mod plan;
pub mod subscription;
pub mod user;

pub use access_control::AccessControl;
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use group::Group;
pub use model::AiModel;
pub use organization::{
    normalize_org_code, NewOrganization, Organization, OrganizationChanges, OrganizationSignupInfo,
    OrganizationStatus,
};
pub use password::{generate_temporary_password, Password};
pub use plan::{DurationType, NewPlan, PlanChanges, PlanType, PublicPlan, SubscriptionPlan};
pub use subscription::{
    membership_change, MembershipChange, SubscriptionChanges, SubscriptionStatus, UserSubscription,
};
pub use user::{parse_date_of_birth, Credential, User, UserResponse, UserRole};
