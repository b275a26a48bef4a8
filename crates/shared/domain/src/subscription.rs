//! User subscription entity and lifecycle rules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Subscription lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Pending,
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the status ends the subscriber's access.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubscriptionStatus::Expired | SubscriptionStatus::Cancelled)
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(s: &str) -> Self {
        match s {
            "active" => SubscriptionStatus::Active,
            "expired" => SubscriptionStatus::Expired,
            "cancelled" => SubscriptionStatus::Cancelled,
            _ => SubscriptionStatus::Pending,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effect of a status change on plan and group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Grant,
    Revoke,
    Keep,
}

/// Decide how membership follows a status transition.
///
/// Ending a subscription revokes membership. Entering `active` from any
/// other status grants it. Everything else leaves membership alone.
pub fn membership_change(previous: SubscriptionStatus, next: SubscriptionStatus) -> MembershipChange {
    if next.is_terminal() {
        MembershipChange::Revoke
    } else if next == SubscriptionStatus::Active && previous != SubscriptionStatus::Active {
        MembershipChange::Grant
    } else {
        MembershipChange::Keep
    }
}

/// User subscription entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSubscription {
    /// Create a pending subscription awaiting payment.
    pub fn pending(
        user_id: Uuid,
        plan_id: Uuid,
        payment_id: Option<String>,
        payment_method: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            plan_id,
            status: SubscriptionStatus::Pending,
            payment_id,
            payment_method,
            start_date: None,
            end_date: None,
            auto_renew: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a verified payment and start the billing period at `now`.
    ///
    /// # Errors
    /// Fails, leaving the subscription untouched, when the end date is not
    /// representable.
    pub fn activate(
        &mut self,
        payment_id: String,
        payment_method: String,
        period: Duration,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let end_date = now
            .checked_add_signed(period)
            .ok_or_else(|| DomainError::validation("Subscription end date is out of range"))?;

        self.status = SubscriptionStatus::Active;
        self.payment_id = Some(payment_id);
        self.payment_method = Some(payment_method);
        self.start_date = Some(now);
        self.end_date = Some(end_date);
        self.updated_at = now;
        Ok(())
    }

    /// Active subscription whose period ended before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date.is_some_and(|end| end < now)
    }

    /// Apply a partial update and return the previous status.
    pub fn apply(&mut self, changes: SubscriptionChanges) -> SubscriptionStatus {
        let previous = self.status;
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(payment_id) = changes.payment_id {
            self.payment_id = Some(payment_id);
        }
        if let Some(end_date) = changes.end_date {
            self.end_date = Some(end_date);
        }
        if let Some(auto_renew) = changes.auto_renew {
            self.auto_renew = auto_renew;
        }
        self.updated_at = Utc::now();
        previous
    }
}

/// Partial subscription update (admin)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionChanges {
    pub status: Option<SubscriptionStatus>,
    pub payment_id: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub auto_renew: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubscriptionStatus::*;

    #[test]
    fn test_membership_change_table() {
        assert_eq!(membership_change(Pending, Active), MembershipChange::Grant);
        assert_eq!(membership_change(Expired, Active), MembershipChange::Grant);
        assert_eq!(membership_change(Active, Active), MembershipChange::Keep);
        assert_eq!(membership_change(Active, Cancelled), MembershipChange::Revoke);
        assert_eq!(membership_change(Pending, Expired), MembershipChange::Revoke);
        assert_eq!(membership_change(Active, Pending), MembershipChange::Keep);
    }

    #[test]
    fn test_activate_sets_period() {
        let mut sub = UserSubscription::pending(Uuid::new_v4(), Uuid::new_v4(), None, None);
        let now = Utc::now();
        sub.activate("pay_1".to_string(), "stripe".to_string(), Duration::days(30), now)
            .unwrap();

        assert_eq!(sub.status, Active);
        assert_eq!(sub.start_date, Some(now));
        assert_eq!(sub.end_date, Some(now + Duration::days(30)));
        assert_eq!(sub.payment_id.as_deref(), Some("pay_1"));
    }

    #[test]
    fn test_activate_rejects_unrepresentable_end_date() {
        let mut sub = UserSubscription::pending(Uuid::new_v4(), Uuid::new_v4(), None, None);

        let result = sub.activate(
            "pay_1".to_string(),
            "stripe".to_string(),
            Duration::days(36_500),
            DateTime::<Utc>::MAX_UTC - Duration::days(1),
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(sub.status, Pending);
        assert_eq!(sub.end_date, None);
    }

    #[test]
    fn test_overdue_only_when_active_and_past_end() {
        let now = Utc::now();
        let mut sub = UserSubscription::pending(Uuid::new_v4(), Uuid::new_v4(), None, None);
        sub.end_date = Some(now - Duration::days(1));
        assert!(!sub.is_overdue(now));

        sub.status = Active;
        assert!(sub.is_overdue(now));

        sub.end_date = Some(now + Duration::days(1));
        assert!(!sub.is_overdue(now));
    }

    #[test]
    fn test_apply_returns_previous_status() {
        let mut sub = UserSubscription::pending(Uuid::new_v4(), Uuid::new_v4(), None, None);
        let previous = sub.apply(SubscriptionChanges {
            status: Some(Cancelled),
            auto_renew: Some(false),
            ..Default::default()
        });

        assert_eq!(previous, Pending);
        assert_eq!(sub.status, Cancelled);
        assert!(!sub.auto_renew);
    }
}
