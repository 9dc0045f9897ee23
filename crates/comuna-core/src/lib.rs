//! # comuna-core — Domain Model for the Comuna Platform
//!
//! Core domain types for the residential-community management backend:
//! identifier newtypes, the [`Group`] and [`Announcement`] aggregates, and
//! the validation errors their constructors raise.
//!
//! This crate is transport- and storage-agnostic. HTTP mapping lives in
//! `comuna-api`; persistence contracts live in `comuna-app`.

pub mod announcement;
pub mod error;
pub mod group;
pub mod identity;

pub use announcement::{Announcement, AnnouncementError, AnnouncementStatus};
pub use error::ValidationError;
pub use group::Group;
pub use identity::{AnnouncementId, GroupId};
