//! # Command Handlers
//!
//! One handler per write operation. Every handler follows the same shape:
//! construct the aggregate through its validating constructor (or load it
//! and apply a transition), then persist through a fresh unit of work.
//! Validation failures return before any repository call.

pub mod announcements;
pub mod groups;
