//! JSON list columns.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `jsonb` array of strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

/// `jsonb` array of UUIDs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct UuidList(pub Vec<Uuid>);

impl From<Vec<String>> for StringList {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

impl From<Vec<Uuid>> for UuidList {
    fn from(items: Vec<Uuid>) -> Self {
        Self(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_serialize_as_plain_arrays() {
        let id = Uuid::nil();
        let users = UuidList(vec![id]);
        let models = StringList(vec!["gpt-4o".to_string()]);

        assert_eq!(
            serde_json::to_value(&users).unwrap(),
            serde_json::json!([id.to_string()])
        );
        assert_eq!(serde_json::to_string(&models).unwrap(), r#"["gpt-4o"]"#);
    }
}
