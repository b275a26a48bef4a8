//! AI model catalogue entry.
//!
//! Plans grant access to models by adding their group to the model's
//! read access list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access_control::AccessControl;
use crate::constants::{placeholder_model_description, PLACEHOLDER_MODEL_IMAGE};

/// AI model entry. `access_control = None` means the model is public.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiModel {
    pub id: String,
    pub base_model_id: Option<String>,
    pub name: String,
    pub meta: Value,
    pub params: Value,
    pub access_control: Option<AccessControl>,
    pub owner_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AiModel {
    /// Model created on demand when a plan references an unknown ID.
    pub fn placeholder(id: &str, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            base_model_id: None,
            name: id.to_string(),
            meta: json!({
                "profile_image_url": PLACEHOLDER_MODEL_IMAGE,
                "description": placeholder_model_description(id),
            }),
            params: json!({}),
            access_control: Some(AccessControl::restricted()),
            owner_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Grant read access to a group. Returns `true` if the model changed.
    pub fn grant_group(&mut self, group_id: Uuid) -> bool {
        let changed = self
            .access_control
            .get_or_insert_with(AccessControl::restricted)
            .grant_read_group(&group_id.to_string());
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Revoke read access from a group. Returns `true` if the model changed.
    pub fn revoke_group(&mut self, group_id: Uuid) -> bool {
        let changed = match self.access_control.as_mut() {
            Some(access) => access.revoke_read_group(&group_id.to_string()),
            None => false,
        };
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}
