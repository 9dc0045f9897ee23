//! Test double: a store that counts every repository call.
//!
//! Used to verify the validate-then-persist ordering — a rejected command
//! must record zero calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use comuna_core::{Announcement, AnnouncementId, Group, GroupId};

use crate::error::AppError;
use crate::store::{AnnouncementRepository, GroupRepository, Store, UnitOfWork};

/// A store whose repositories record every invocation.
pub(crate) struct SpyStore {
    calls: Arc<AtomicUsize>,
}

impl SpyStore {
    pub(crate) fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Total repository calls recorded across all scopes.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Store for SpyStore {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(SpyUnitOfWork {
            calls: self.calls.clone(),
        })
    }
}

struct SpyUnitOfWork {
    calls: Arc<AtomicUsize>,
}

impl SpyUnitOfWork {
    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GroupRepository for SpyUnitOfWork {
    async fn add(&self, _group: Group) -> Result<(), AppError> {
        self.record();
        Ok(())
    }

    async fn get(&self, _id: GroupId) -> Result<Option<Group>, AppError> {
        self.record();
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Group>, AppError> {
        self.record();
        Ok(Vec::new())
    }
}

#[async_trait]
impl AnnouncementRepository for SpyUnitOfWork {
    async fn add(&self, _announcement: Announcement) -> Result<(), AppError> {
        self.record();
        Ok(())
    }

    async fn update(&self, _announcement: Announcement) -> Result<(), AppError> {
        self.record();
        Ok(())
    }

    async fn get(&self, _id: AnnouncementId) -> Result<Option<Announcement>, AppError> {
        self.record();
        Ok(None)
    }

    async fn list_for_group(&self, _group_id: GroupId) -> Result<Vec<Announcement>, AppError> {
        self.record();
        Ok(Vec::new())
    }
}

#[async_trait]
impl UnitOfWork for SpyUnitOfWork {
    fn groups(&self) -> &dyn GroupRepository {
        self
    }

    fn announcements(&self) -> &dyn AnnouncementRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.record();
        Ok(())
    }
}
