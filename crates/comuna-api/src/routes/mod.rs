//! # API Route Modules
//!
//! - `groups` — resident group creation and retrieval.
//! - `announcements` — announcement drafting, publication, and retrieval.
//!
//! Route handlers deserialize, dispatch a command through the mediator (for
//! writes) or read through a repository scope, and translate success into a
//! response. They never map errors themselves — that is the envelope
//! middleware's job — and they carry no business validation.

pub mod announcements;
pub mod groups;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Body returned by every create endpoint, alongside a `Location` header.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}
