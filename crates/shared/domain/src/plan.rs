//! Subscription plan entity and related types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    DAYS_PER_MONTH, DAYS_PER_WEEK, DAYS_PER_YEAR, DEFAULT_PLAN_DURATION, MAX_PLAN_PERIOD_DAYS,
};
use crate::error::{DomainError, DomainResult};

/// Plan tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    #[default]
    Premium,
    Free,
    Enterprise,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Premium => "premium",
            PlanType::Free => "free",
            PlanType::Enterprise => "enterprise",
        }
    }
}

impl From<&str> for PlanType {
    fn from(s: &str) -> Self {
        match s {
            "free" => PlanType::Free,
            "enterprise" => PlanType::Enterprise,
            _ => PlanType::Premium,
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit in which a plan's billing period is counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DurationType {
    Days,
    Weeks,
    #[default]
    Months,
    Years,
}

impl DurationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationType::Days => "days",
            DurationType::Weeks => "weeks",
            DurationType::Months => "months",
            DurationType::Years => "years",
        }
    }

    pub fn days_per_unit(&self) -> i64 {
        match self {
            DurationType::Days => 1,
            DurationType::Weeks => DAYS_PER_WEEK,
            DurationType::Months => DAYS_PER_MONTH,
            DurationType::Years => DAYS_PER_YEAR,
        }
    }

    /// Length of `amount` units. Months and years use fixed day counts.
    ///
    /// # Errors
    /// Fails when the period is longer than [`MAX_PLAN_PERIOD_DAYS`].
    pub fn period(&self, amount: i64) -> DomainResult<Duration> {
        amount
            .max(1)
            .checked_mul(self.days_per_unit())
            .filter(|days| *days <= MAX_PLAN_PERIOD_DAYS)
            .and_then(Duration::try_days)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "Plan period of {} {} exceeds {} days",
                    amount,
                    self.as_str(),
                    MAX_PLAN_PERIOD_DAYS
                ))
            })
    }
}

impl From<&str> for DurationType {
    fn from(s: &str) -> Self {
        match s {
            "days" => DurationType::Days,
            "weeks" => DurationType::Weeks,
            "years" => DurationType::Years,
            _ => DurationType::Months,
        }
    }
}

impl std::fmt::Display for DurationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription plan entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub plan_name: String,
    pub subtitle: Option<String>,
    pub plan_type: PlanType,
    pub duration_type: DurationType,
    pub plan_duration: i64,
    pub price: f64,
    pub benefits: Vec<String>,
    pub additional_info: Option<String>,
    /// Access-control group holding the plan's subscribers
    pub group_id: Option<Uuid>,
    /// Model IDs this plan grants access to
    pub models: Vec<String>,
    /// Subscribed users
    pub users: Vec<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionPlan {
    /// Build a new active plan linked to `group_id`.
    pub fn new(plan: NewPlan, group_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            plan_name: plan.plan_name,
            subtitle: plan.subtitle,
            plan_type: plan.plan_type,
            duration_type: plan.duration_type,
            plan_duration: plan.plan_duration,
            price: plan.price,
            benefits: plan.benefits,
            additional_info: plan.additional_info,
            group_id,
            models: dedup(plan.models),
            users: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Length of one billing period.
    pub fn period(&self) -> DomainResult<Duration> {
        self.duration_type.period(self.plan_duration)
    }

    pub fn has_user(&self, user_id: Uuid) -> bool {
        self.users.contains(&user_id)
    }

    /// Add a subscriber. Returns `true` if the user list changed.
    pub fn add_user(&mut self, user_id: Uuid) -> bool {
        if self.has_user(user_id) {
            return false;
        }
        self.users.push(user_id);
        self.updated_at = Utc::now();
        true
    }

    /// Remove a subscriber. Returns `true` if the user list changed.
    pub fn remove_user(&mut self, user_id: Uuid) -> bool {
        let before = self.users.len();
        self.users.retain(|id| *id != user_id);
        let changed = self.users.len() != before;
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Current models missing from `next`.
    pub fn dropped_models(&self, next: &[String]) -> Vec<String> {
        self.models
            .iter()
            .filter(|id| !next.contains(id))
            .cloned()
            .collect()
    }

    /// Apply a partial update. Absent fields keep their value.
    pub fn apply(&mut self, changes: PlanChanges) {
        if let Some(plan_name) = changes.plan_name {
            self.plan_name = plan_name;
        }
        if let Some(subtitle) = changes.subtitle {
            self.subtitle = Some(subtitle);
        }
        if let Some(plan_type) = changes.plan_type {
            self.plan_type = plan_type;
        }
        if let Some(duration_type) = changes.duration_type {
            self.duration_type = duration_type;
        }
        if let Some(plan_duration) = changes.plan_duration {
            self.plan_duration = plan_duration;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(benefits) = changes.benefits {
            self.benefits = benefits;
        }
        if let Some(additional_info) = changes.additional_info {
            self.additional_info = Some(additional_info);
        }
        if let Some(models) = changes.models {
            self.models = dedup(models);
        }
        if let Some(users) = changes.users {
            self.users = dedup(users);
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

/// Catalogue view of a plan for unauthenticated callers. The subscriber
/// list is left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PublicPlan {
    pub id: Uuid,
    pub plan_name: String,
    pub subtitle: Option<String>,
    pub plan_type: PlanType,
    pub duration_type: DurationType,
    pub plan_duration: i64,
    pub price: f64,
    pub benefits: Vec<String>,
    pub additional_info: Option<String>,
    pub group_id: Option<Uuid>,
    pub models: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionPlan> for PublicPlan {
    fn from(plan: SubscriptionPlan) -> Self {
        Self {
            id: plan.id,
            plan_name: plan.plan_name,
            subtitle: plan.subtitle,
            plan_type: plan.plan_type,
            duration_type: plan.duration_type,
            plan_duration: plan.plan_duration,
            price: plan.price,
            benefits: plan.benefits,
            additional_info: plan.additional_info,
            group_id: plan.group_id,
            models: plan.models,
            is_active: plan.is_active,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

/// Plan creation data
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
    pub plan_name: String,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub plan_type: PlanType,
    #[serde(default)]
    pub duration_type: DurationType,
    #[serde(default = "default_plan_duration")]
    pub plan_duration: i64,
    pub price: f64,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub additional_info: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
}

/// Partial plan update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanChanges {
    pub plan_name: Option<String>,
    pub subtitle: Option<String>,
    pub plan_type: Option<PlanType>,
    pub duration_type: Option<DurationType>,
    pub plan_duration: Option<i64>,
    pub price: Option<f64>,
    pub benefits: Option<Vec<String>>,
    pub additional_info: Option<String>,
    pub models: Option<Vec<String>>,
    pub users: Option<Vec<Uuid>>,
    pub is_active: Option<bool>,
}

fn default_plan_duration() -> i64 {
    DEFAULT_PLAN_DURATION
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_plan(models: Vec<&str>) -> NewPlan {
        NewPlan {
            plan_name: "Gold".to_string(),
            subtitle: None,
            plan_type: PlanType::Premium,
            duration_type: DurationType::Months,
            plan_duration: 1,
            price: 9.99,
            benefits: vec!["Priority support".to_string()],
            additional_info: None,
            models: models.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_period_per_duration_type() {
        assert_eq!(DurationType::Days.period(10).unwrap(), Duration::days(10));
        assert_eq!(DurationType::Weeks.period(2).unwrap(), Duration::days(14));
        assert_eq!(DurationType::Months.period(3).unwrap(), Duration::days(90));
        assert_eq!(DurationType::Years.period(1).unwrap(), Duration::days(365));
    }

    #[test]
    fn test_period_floors_at_one_unit() {
        assert_eq!(DurationType::Weeks.period(0).unwrap(), Duration::days(7));
        assert_eq!(DurationType::Days.period(-3).unwrap(), Duration::days(1));
    }

    #[test]
    fn test_period_upper_bound() {
        assert_eq!(
            DurationType::Days.period(MAX_PLAN_PERIOD_DAYS).unwrap(),
            Duration::days(MAX_PLAN_PERIOD_DAYS)
        );
        assert_eq!(DurationType::Years.period(100).unwrap(), Duration::days(36_500));

        assert!(matches!(
            DurationType::Days.period(MAX_PLAN_PERIOD_DAYS + 1),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            DurationType::Years.period(1_000_000),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            DurationType::Years.period(i64::MAX),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_new_plan_defaults() {
        let plan = SubscriptionPlan::new(new_plan(vec!["a", "b", "a"]), None);

        assert!(plan.is_active);
        assert!(plan.users.is_empty());
        assert_eq!(plan.models, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(plan.period().unwrap(), Duration::days(30));
    }

    #[test]
    fn test_user_membership_is_idempotent() {
        let mut plan = SubscriptionPlan::new(new_plan(vec![]), None);
        let user = Uuid::new_v4();

        assert!(plan.add_user(user));
        assert!(!plan.add_user(user));
        assert_eq!(plan.users, vec![user]);
        assert!(plan.remove_user(user));
        assert!(!plan.remove_user(user));
    }

    #[test]
    fn test_dropped_models() {
        let plan = SubscriptionPlan::new(new_plan(vec!["a", "b", "c"]), None);
        let dropped = plan.dropped_models(&["b".to_string(), "d".to_string()]);

        assert_eq!(dropped, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let mut plan = SubscriptionPlan::new(new_plan(vec!["a"]), None);
        plan.apply(PlanChanges {
            price: Some(19.0),
            is_active: Some(false),
            ..Default::default()
        });

        assert_eq!(plan.price, 19.0);
        assert!(!plan.is_active);
        assert_eq!(plan.plan_name, "Gold");
        assert_eq!(plan.models, vec!["a".to_string()]);
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(PlanType::from("enterprise"), PlanType::Enterprise);
        assert_eq!(PlanType::from("unknown"), PlanType::Premium);
        assert_eq!(DurationType::from("weeks").to_string(), "weeks");
        assert_eq!(DurationType::from("fortnights"), DurationType::Months);
    }
}
