//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to self-registered users
pub const ROLE_USER: &str = "user";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// Role for accounts awaiting approval
pub const ROLE_PENDING: &str = "pending";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of generated temporary passwords
pub const TEMPORARY_PASSWORD_LENGTH: usize = 12;

/// Date format accepted for date of birth
pub const DATE_OF_BIRTH_FORMAT: &str = "%Y-%m-%d";

/// Organization code length bounds
pub const MIN_ORG_CODE_LENGTH: usize = 2;
pub const MAX_ORG_CODE_LENGTH: usize = 32;

// =============================================================================
// Plans & Subscriptions
// =============================================================================

/// Default plan duration amount
pub const DEFAULT_PLAN_DURATION: i64 = 1;

/// Days counted per duration unit
pub const DAYS_PER_WEEK: i64 = 7;
pub const DAYS_PER_MONTH: i64 = 30;
pub const DAYS_PER_YEAR: i64 = 365;

/// Longest billing period a plan may define, in days (100 years)
pub const MAX_PLAN_PERIOD_DAYS: i64 = 36_500;

/// Payment method assumed when none is given
pub const DEFAULT_PAYMENT_METHOD: &str = "stripe";

/// Profile image assigned to placeholder models
pub const PLACEHOLDER_MODEL_IMAGE: &str = "/static/favicon.png";

/// Description of the access-control group created for a plan
pub fn plan_group_description(plan_name: &str) -> String {
    format!("Group for {} plan subscribers", plan_name)
}

/// Description of a placeholder model created on demand
pub fn placeholder_model_description(model_id: &str) -> String {
    format!("Model {}", model_id)
}

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
