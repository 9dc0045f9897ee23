//! # Persistence Contracts
//!
//! One repository trait per aggregate, plus the [`UnitOfWork`] scope that
//! batches writes and commits them atomically. Each request obtains its own
//! scope from a [`Store`]; scopes are never shared across requests.
//!
//! `add`/`update` stage a write inside the scope; nothing hits the backing
//! store until [`UnitOfWork::commit`]. Reads see committed state only.

use async_trait::async_trait;

use comuna_core::{Announcement, AnnouncementId, Group, GroupId};

use crate::error::AppError;

/// Persistence access for the [`Group`] aggregate.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Stage a new group for insertion.
    async fn add(&self, group: Group) -> Result<(), AppError>;

    /// Fetch a group by identifier.
    async fn get(&self, id: GroupId) -> Result<Option<Group>, AppError>;

    /// List all groups, newest first.
    async fn list(&self) -> Result<Vec<Group>, AppError>;
}

/// Persistence access for the [`Announcement`] aggregate.
#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Stage a new announcement for insertion.
    async fn add(&self, announcement: Announcement) -> Result<(), AppError>;

    /// Stage an update of an existing announcement.
    async fn update(&self, announcement: Announcement) -> Result<(), AppError>;

    /// Fetch an announcement by identifier.
    async fn get(&self, id: AnnouncementId) -> Result<Option<Announcement>, AppError>;

    /// List the announcements addressed to one group, newest first.
    async fn list_for_group(&self, group_id: GroupId) -> Result<Vec<Announcement>, AppError>;
}

/// A per-request transactional scope over the repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn groups(&self) -> &dyn GroupRepository;

    fn announcements(&self) -> &dyn AnnouncementRepository;

    /// Persist every staged write as one atomic unit. Consumes the scope;
    /// a scope that is dropped without committing discards its writes.
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

/// Factory handing each request its own [`UnitOfWork`].
pub trait Store: Send + Sync {
    fn begin(&self) -> Box<dyn UnitOfWork>;
}
