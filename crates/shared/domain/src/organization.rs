//! Organization entity, signup gating and membership rules.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_ORG_CODE_LENGTH, MIN_ORG_CODE_LENGTH};
use crate::error::{DomainError, DomainResult};

static ORG_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9_-]+$").expect("organization code pattern is valid"));

/// Normalize an organization code to its stored form.
///
/// Codes are case-insensitive and stored uppercase.
pub fn normalize_org_code(code: &str) -> DomainResult<String> {
    let code = code.trim().to_uppercase();
    let length = code.chars().count();

    if !(MIN_ORG_CODE_LENGTH..=MAX_ORG_CODE_LENGTH).contains(&length) {
        return Err(DomainError::validation(format!(
            "Organization code must be between {} and {} characters",
            MIN_ORG_CODE_LENGTH, MAX_ORG_CODE_LENGTH
        )));
    }
    if !ORG_CODE_PATTERN.is_match(&code) {
        return Err(DomainError::validation(
            "Organization code may only contain letters, digits, '-' and '_'",
        ));
    }

    Ok(code)
}

/// Organization status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum OrganizationStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl OrganizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationStatus::Active => "active",
            OrganizationStatus::Inactive => "inactive",
            OrganizationStatus::Suspended => "suspended",
        }
    }
}

impl From<&str> for OrganizationStatus {
    fn from(s: &str) -> Self {
        match s {
            "active" => OrganizationStatus::Active,
            "suspended" => OrganizationStatus::Suspended,
            _ => OrganizationStatus::Inactive,
        }
    }
}

impl std::fmt::Display for OrganizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organization entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Organization {
    pub id: Uuid,
    pub org_code: String,
    pub org_name: String,
    pub status: OrganizationStatus,
    pub signup_enabled: bool,
    pub users: Vec<Uuid>,
    pub plans: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Build a new organization from validated input.
    pub fn new(org: NewOrganization) -> DomainResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            org_code: normalize_org_code(&org.org_code)?,
            org_name: org.org_name,
            status: org.status.unwrap_or_default(),
            signup_enabled: org.signup_enabled.unwrap_or(true),
            users: Vec::new(),
            plans: dedup(org.plans),
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether members may self-register with this organization's code.
    pub fn accepts_signups(&self) -> bool {
        self.signup_enabled && self.status == OrganizationStatus::Active
    }

    /// Fail with a caller-visible reason when signup is closed.
    pub fn ensure_accepts_signups(&self) -> DomainResult<()> {
        if self.accepts_signups() {
            Ok(())
        } else {
            Err(DomainError::denied(
                "Signup is not available for this organization",
            ))
        }
    }

    /// Add members. Returns the number of users actually added.
    pub fn add_users(&mut self, user_ids: &[Uuid]) -> usize {
        let added = merge(&mut self.users, user_ids);
        self.touch_if(added > 0);
        added
    }

    /// Remove members. Returns the number of users actually removed.
    pub fn remove_users(&mut self, user_ids: &[Uuid]) -> usize {
        let removed = subtract(&mut self.users, user_ids);
        self.touch_if(removed > 0);
        removed
    }

    /// Offer plans to members. Returns the number of plans actually added.
    pub fn add_plans(&mut self, plan_ids: &[Uuid]) -> usize {
        let added = merge(&mut self.plans, plan_ids);
        self.touch_if(added > 0);
        added
    }

    /// Withdraw plans. Returns the number of plans actually removed.
    pub fn remove_plans(&mut self, plan_ids: &[Uuid]) -> usize {
        let removed = subtract(&mut self.plans, plan_ids);
        self.touch_if(removed > 0);
        removed
    }

    /// Apply a partial update. The code is re-normalized when present.
    pub fn apply(&mut self, changes: OrganizationChanges) -> DomainResult<()> {
        if let Some(code) = changes.org_code {
            self.org_code = normalize_org_code(&code)?;
        }
        if let Some(name) = changes.org_name {
            self.org_name = name;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(signup_enabled) = changes.signup_enabled {
            self.signup_enabled = signup_enabled;
        }
        if let Some(users) = changes.users {
            self.users = dedup(users);
        }
        if let Some(plans) = changes.plans {
            self.plans = dedup(plans);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn touch_if(&mut self, changed: bool) {
        if changed {
            self.updated_at = Utc::now();
        }
    }
}

/// Organization creation data
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrganization {
    pub org_code: String,
    pub org_name: String,
    pub status: Option<OrganizationStatus>,
    pub signup_enabled: Option<bool>,
    #[serde(default)]
    pub plans: Vec<Uuid>,
}

/// Partial organization update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationChanges {
    pub org_code: Option<String>,
    pub org_name: Option<String>,
    pub status: Option<OrganizationStatus>,
    pub signup_enabled: Option<bool>,
    pub users: Option<Vec<Uuid>>,
    pub plans: Option<Vec<Uuid>>,
}

/// Public view of an organization shown on its signup page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OrganizationSignupInfo {
    pub id: Uuid,
    pub org_name: String,
    pub org_code: String,
    pub plans: Vec<Uuid>,
}

impl From<Organization> for OrganizationSignupInfo {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            org_name: org.org_name,
            org_code: org.org_code,
            plans: org.plans,
        }
    }
}

fn merge(target: &mut Vec<Uuid>, ids: &[Uuid]) -> usize {
    let before = target.len();
    for id in ids {
        if !target.contains(id) {
            target.push(*id);
        }
    }
    target.len() - before
}

fn subtract(target: &mut Vec<Uuid>, ids: &[Uuid]) -> usize {
    let before = target.len();
    target.retain(|id| !ids.contains(id));
    before - target.len()
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut unique = Vec::with_capacity(ids.len());
    merge(&mut unique, &ids);
    unique
}
