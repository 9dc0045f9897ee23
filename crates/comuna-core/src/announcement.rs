//! # Announcement Aggregate
//!
//! A community announcement addressed to one resident group. Announcements
//! start as drafts and are published exactly once; publishing an already
//! published announcement is rejected as an invalid state transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::identity::{AnnouncementId, GroupId};

/// Maximum length for the announcement title.
const MAX_TITLE_LEN: usize = 255;
/// Maximum length for the announcement body.
const MAX_BODY_LEN: usize = 4000;

/// Lifecycle state of an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementStatus {
    Draft,
    Published,
}

impl AnnouncementStatus {
    /// Stable string form used in storage and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

/// State machine violations for announcements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementError {
    /// The announcement has already been published.
    #[error("announcement {id} is already published")]
    AlreadyPublished { id: AnnouncementId },
}

/// A community announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub group_id: GroupId,
    pub title: String,
    pub body: String,
    pub status: AnnouncementStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Create a new draft announcement for a group.
    pub fn new(group_id: GroupId, title: String, body: String) -> Result<Self, ValidationError> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::field(
                "title",
                "Announcement title cannot be empty",
            ));
        }
        if title.len() > MAX_TITLE_LEN {
            return Err(ValidationError::field(
                "title",
                format!("Announcement title must not exceed {MAX_TITLE_LEN} characters"),
            ));
        }
        if body.len() > MAX_BODY_LEN {
            return Err(ValidationError::field(
                "body",
                format!("Announcement body must not exceed {MAX_BODY_LEN} characters"),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: AnnouncementId::new(),
            group_id,
            title,
            body,
            status: AnnouncementStatus::Draft,
            published_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Transition the announcement from draft to published.
    pub fn publish(&mut self, now: DateTime<Utc>) -> Result<(), AnnouncementError> {
        match self.status {
            AnnouncementStatus::Draft => {
                self.status = AnnouncementStatus::Published;
                self.published_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            AnnouncementStatus::Published => {
                Err(AnnouncementError::AlreadyPublished { id: self.id })
            }
        }
    }
}
