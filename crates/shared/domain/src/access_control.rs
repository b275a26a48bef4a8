//! Access-control document attached to AI models.
//!
//! The document is stored as free-form JSON shaped like
//! `{"read": {"group_ids": [], "user_ids": []}, "write": {...}}`.
//! Rows written by other tools may be partial or malformed, so mutations
//! repair the `read` section in place and leave every other key untouched.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const READ: &str = "read";
const GROUP_IDS: &str = "group_ids";
const USER_IDS: &str = "user_ids";

/// JSON access-control document of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessControl(Value);

impl AccessControl {
    /// Document granting read access to nobody.
    pub fn restricted() -> Self {
        Self(json!({ READ: { GROUP_IDS: [], USER_IDS: [] } }))
    }

    /// Wrap a stored JSON value.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Group IDs with read access. Malformed sections read as empty.
    pub fn read_group_ids(&self) -> Vec<String> {
        self.0
            .get(READ)
            .and_then(|read| read.get(GROUP_IDS))
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the group has read access.
    pub fn has_read_group(&self, group_id: &str) -> bool {
        self.read_group_ids().iter().any(|id| id == group_id)
    }

    /// Grant read access to a group.
    ///
    /// Returns `true` if the document changed.
    pub fn grant_read_group(&mut self, group_id: &str) -> bool {
        let mut root = match std::mem::take(&mut self.0) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut read = match root.remove(READ) {
            Some(Value::Object(map)) => map,
            _ => empty_permission(),
        };
        let mut ids = match read.remove(GROUP_IDS) {
            Some(Value::Array(ids)) => ids,
            _ => Vec::new(),
        };

        let changed = !ids.iter().any(|id| id.as_str() == Some(group_id));
        if changed {
            ids.push(Value::String(group_id.to_string()));
        }

        read.insert(GROUP_IDS.to_string(), Value::Array(ids));
        root.insert(READ.to_string(), Value::Object(read));
        self.0 = Value::Object(root);
        changed
    }

    /// Revoke read access from a group.
    ///
    /// Returns `true` if the document changed. Documents without a
    /// well-formed read list are left as they are.
    pub fn revoke_read_group(&mut self, group_id: &str) -> bool {
        let Some(ids) = self
            .0
            .get_mut(READ)
            .and_then(|read| read.get_mut(GROUP_IDS))
            .and_then(Value::as_array_mut)
        else {
            return false;
        };

        let before = ids.len();
        ids.retain(|id| id.as_str() != Some(group_id));
        ids.len() != before
    }
}

fn empty_permission() -> Map<String, Value> {
    let mut permission = Map::new();
    permission.insert(GROUP_IDS.to_string(), Value::Array(Vec::new()));
    permission.insert(USER_IDS.to_string(), Value::Array(Vec::new()));
    permission
}

impl From<Value> for AccessControl {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<AccessControl> for Value {
    fn from(access: AccessControl) -> Self {
        access.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_adds_group_once() {
        let mut access = AccessControl::restricted();

        assert!(access.grant_read_group("g1"));
        assert!(!access.grant_read_group("g1"));
        assert_eq!(access.read_group_ids(), vec!["g1".to_string()]);
    }

    #[test]
    fn test_grant_repairs_missing_read_section() {
        let mut access = AccessControl::from_value(json!({ "write": { "group_ids": ["w"] } }));

        assert!(access.grant_read_group("g1"));
        assert_eq!(access.read_group_ids(), vec!["g1".to_string()]);
        assert_eq!(access.as_value()["write"]["group_ids"][0], "w");
        assert_eq!(access.as_value()["read"]["user_ids"], json!([]));
    }

    #[test]
    fn test_grant_repairs_non_list_group_ids() {
        let mut access = AccessControl::from_value(json!({ "read": { "group_ids": "oops" } }));

        assert!(access.grant_read_group("g1"));
        assert_eq!(access.as_value()["read"]["group_ids"], json!(["g1"]));
    }

    #[test]
    fn test_grant_replaces_non_object_document() {
        let mut access = AccessControl::from_value(json!("public"));

        assert!(access.grant_read_group("g1"));
        assert!(access.has_read_group("g1"));
    }

    #[test]
    fn test_revoke_removes_only_given_group() {
        let mut access =
            AccessControl::from_value(json!({ "read": { "group_ids": ["g1", "g2"], "user_ids": [] } }));

        assert!(access.revoke_read_group("g1"));
        assert_eq!(access.read_group_ids(), vec!["g2".to_string()]);
        assert!(!access.revoke_read_group("g1"));
    }

    #[test]
    fn test_revoke_on_malformed_document_is_noop() {
        let mut access = AccessControl::from_value(json!({ "read": "everyone" }));

        assert!(!access.revoke_read_group("g1"));
        assert_eq!(access.as_value(), &json!({ "read": "everyone" }));
    }
}
