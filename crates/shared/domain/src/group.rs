//! Access-control group entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::plan_group_description;

/// User group referenced by model access-control documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub user_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Create the group that tracks subscribers of a plan.
    pub fn for_plan(plan_name: &str, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: plan_name.to_string(),
            description: plan_group_description(plan_name),
            user_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a member. Returns `true` if the member list changed.
    pub fn add_member(&mut self, user_id: Uuid) -> bool {
        if self.user_ids.contains(&user_id) {
            return false;
        }
        self.user_ids.push(user_id);
        self.updated_at = Utc::now();
        true
    }

    /// Remove a member. Returns `true` if the member list changed.
    pub fn remove_member(&mut self, user_id: Uuid) -> bool {
        let before = self.user_ids.len();
        self.user_ids.retain(|id| *id != user_id);
        let changed = self.user_ids.len() != before;
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_group_naming() {
        let group = Group::for_plan("Gold", Uuid::new_v4());

        assert_eq!(group.name, "Gold");
        assert_eq!(group.description, "Group for Gold plan subscribers");
        assert!(group.user_ids.is_empty());
    }

    #[test]
    fn test_membership_is_a_set() {
        let mut group = Group::for_plan("Gold", Uuid::new_v4());
        let user = Uuid::new_v4();

        assert!(group.add_member(user));
        assert!(!group.add_member(user));
        assert_eq!(group.user_ids.len(), 1);
        assert!(group.remove_member(user));
        assert!(!group.remove_member(user));
    }
}
