//! User domain entity and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DATE_OF_BIRTH_FORMAT, ROLE_ADMIN, ROLE_PENDING, ROLE_USER};
use crate::subscription::SubscriptionStatus;

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
    Pending,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::User => ROLE_USER,
            UserRole::Pending => ROLE_PENDING,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            ROLE_PENDING => UserRole::Pending,
            _ => UserRole::User,
        }
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        UserRole::from(s.as_str())
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub subscription_id: Option<Uuid>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given role
    pub fn new(id: Uuid, email: String, name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            name,
            role,
            phone: None,
            date_of_birth: None,
            subscription_id: None,
            subscription_status: None,
            organization_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Stamp the subscription the user most recently touched.
    ///
    /// An active subscription promotes a pending account to `user`.
    pub fn set_subscription(&mut self, subscription_id: Uuid, status: SubscriptionStatus) {
        self.subscription_id = Some(subscription_id);
        self.subscription_status = Some(status);
        if status == SubscriptionStatus::Active && self.role == UserRole::Pending {
            self.role = UserRole::User;
        }
        self.updated_at = Utc::now();
    }
}

/// Sign-in credentials paired 1:1 with a user
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub active: bool,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("active", &self.active)
            .finish()
    }
}

/// Parse a `YYYY-MM-DD` date of birth.
pub fn parse_date_of_birth(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_OF_BIRTH_FORMAT).ok()
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// User email address
    pub email: String,
    /// User display name
    pub name: String,
    /// User role
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.to_string(),
            phone: user.phone,
            date_of_birth: user.date_of_birth,
            subscription_id: user.subscription_id,
            subscription_status: user.subscription_status,
            organization_id: user.organization_id,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_strings() {
        assert_eq!(UserRole::from("admin"), UserRole::Admin);
        assert_eq!(UserRole::from("pending"), UserRole::Pending);
        assert_eq!(UserRole::from("anything"), UserRole::User);
        assert_eq!(UserRole::Pending.to_string(), "pending");
    }

    #[test]
    fn test_date_of_birth_parsing() {
        assert_eq!(
            parse_date_of_birth("1990-04-17"),
            NaiveDate::from_ymd_opt(1990, 4, 17)
        );
        assert_eq!(parse_date_of_birth("17/04/1990"), None);
        assert_eq!(parse_date_of_birth("1990-02-30"), None);
    }

    #[test]
    fn test_credential_debug_hides_hash() {
        let credential = Credential {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            password_hash: "secret-hash".to_string(),
            active: true,
        };

        assert!(!format!("{:?}", credential).contains("secret-hash"));
    }

    #[test]
    fn test_subscription_stamp() {
        let mut user = User::new(Uuid::new_v4(), "a@b.com".into(), "A".into(), UserRole::Pending);
        let sub = Uuid::new_v4();

        user.set_subscription(sub, SubscriptionStatus::Pending);
        assert_eq!(user.subscription_id, Some(sub));
        assert_eq!(user.role, UserRole::Pending);

        user.set_subscription(sub, SubscriptionStatus::Active);
        assert_eq!(user.subscription_status, Some(SubscriptionStatus::Active));
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn test_expiry_does_not_demote() {
        let mut user = User::new(Uuid::new_v4(), "a@b.com".into(), "A".into(), UserRole::Admin);
        user.set_subscription(Uuid::new_v4(), SubscriptionStatus::Active);
        user.set_subscription(Uuid::new_v4(), SubscriptionStatus::Expired);

        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.subscription_status, Some(SubscriptionStatus::Expired));
    }
}
