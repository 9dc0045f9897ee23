//! # Group Aggregate
//!
//! A resident group within a community (e.g. a block committee or an
//! interest group). Groups are the unit of persistence for the group
//! repository; announcements reference them by identifier only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::GroupId;

/// Maximum length for the group name and description fields.
const MAX_FIELD_LEN: usize = 255;

/// A resident group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group, validating its descriptive fields.
    ///
    /// The name is required and must not be blank; both fields are capped
    /// at 255 characters. The name is stored trimmed.
    pub fn new(name: String, description: Option<String>) -> Result<Self, ValidationError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::field("name", "Group name cannot be empty"));
        }
        if name.len() > MAX_FIELD_LEN {
            return Err(ValidationError::field(
                "name",
                format!("Group name must not exceed {MAX_FIELD_LEN} characters"),
            ));
        }
        if let Some(desc) = &description {
            if desc.len() > MAX_FIELD_LEN {
                return Err(ValidationError::field(
                    "description",
                    format!("Group description must not exceed {MAX_FIELD_LEN} characters"),
                ));
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: GroupId::new(),
            name,
            description,
            created_at: now,
            updated_at: now,
        })
    }
}
