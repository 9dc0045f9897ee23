//! # In-Memory Store
//!
//! The store used in development and tests, and by deployments that run
//! without a database. All clones share the same maps via `Arc`; a unit of
//! work stages writes locally and applies them under the write locks on
//! commit.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use comuna_core::{Announcement, AnnouncementId, Group, GroupId};

use crate::error::AppError;
use crate::store::{AnnouncementRepository, GroupRepository, Store, UnitOfWork};

struct Inner {
    groups: RwLock<HashMap<Uuid, Group>>,
    announcements: RwLock<HashMap<Uuid, Announcement>>,
}

/// Shared in-memory store. Cheaply cloneable; all clones see the same data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                groups: RwLock::new(HashMap::new()),
                announcements: RwLock::new(HashMap::new()),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(MemoryUnitOfWork {
            store: self.clone(),
            pending: Mutex::new(Vec::new()),
        })
    }
}

/// A staged write awaiting commit.
enum Pending {
    AddGroup(Group),
    AddAnnouncement(Announcement),
    UpdateAnnouncement(Announcement),
}

/// Unit of work over the in-memory maps.
pub struct MemoryUnitOfWork {
    store: MemoryStore,
    pending: Mutex<Vec<Pending>>,
}

#[async_trait]
impl GroupRepository for MemoryUnitOfWork {
    async fn add(&self, group: Group) -> Result<(), AppError> {
        self.pending.lock().push(Pending::AddGroup(group));
        Ok(())
    }

    async fn get(&self, id: GroupId) -> Result<Option<Group>, AppError> {
        Ok(self.store.inner.groups.read().get(id.as_uuid()).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, AppError> {
        let mut groups: Vec<Group> = self.store.inner.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(groups)
    }
}

#[async_trait]
impl AnnouncementRepository for MemoryUnitOfWork {
    async fn add(&self, announcement: Announcement) -> Result<(), AppError> {
        self.pending
            .lock()
            .push(Pending::AddAnnouncement(announcement));
        Ok(())
    }

    async fn update(&self, announcement: Announcement) -> Result<(), AppError> {
        self.pending
            .lock()
            .push(Pending::UpdateAnnouncement(announcement));
        Ok(())
    }

    async fn get(&self, id: AnnouncementId) -> Result<Option<Announcement>, AppError> {
        Ok(self
            .store
            .inner
            .announcements
            .read()
            .get(id.as_uuid())
            .cloned())
    }

    async fn list_for_group(&self, group_id: GroupId) -> Result<Vec<Announcement>, AppError> {
        let mut announcements: Vec<Announcement> = self
            .store
            .inner
            .announcements
            .read()
            .values()
            .filter(|a| a.group_id == group_id)
            .cloned()
            .collect();
        announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(announcements)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn groups(&self) -> &dyn GroupRepository {
        self
    }

    fn announcements(&self) -> &dyn AnnouncementRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let pending = self.pending.into_inner();
        // Hold both write locks for the whole batch so no reader observes
        // a half-applied commit.
        let mut groups = self.store.inner.groups.write();
        let mut announcements = self.store.inner.announcements.write();

        // Check every update target up front so a failed commit applies
        // nothing. An update may target a row staged earlier in the batch.
        let mut known: HashSet<Uuid> = announcements.keys().copied().collect();
        for write in &pending {
            match write {
                Pending::AddAnnouncement(announcement) => {
                    known.insert(*announcement.id.as_uuid());
                }
                Pending::UpdateAnnouncement(announcement)
                    if !known.contains(announcement.id.as_uuid()) =>
                {
                    return Err(AppError::not_found(format!(
                        "announcement {} not found",
                        announcement.id
                    )));
                }
                _ => {}
            }
        }

        for write in pending {
            match write {
                Pending::AddGroup(group) => {
                    groups.insert(*group.id.as_uuid(), group);
                }
                Pending::AddAnnouncement(announcement)
                | Pending::UpdateAnnouncement(announcement) => {
                    announcements.insert(*announcement.id.as_uuid(), announcement);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str) -> Group {
        Group::new(name.to_string(), None).unwrap()
    }

    #[tokio::test]
    async fn staged_writes_are_invisible_before_commit() {
        let store = MemoryStore::new();
        let uow = store.begin();
        let g = group("Block A");
        let id = g.id;
        uow.groups().add(g).await.unwrap();

        let reader = store.begin();
        assert!(reader.groups().get(id).await.unwrap().is_none());

        uow.commit().await.unwrap();
        assert!(reader.groups().get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn dropped_scope_discards_writes() {
        let store = MemoryStore::new();
        let g = group("Block B");
        let id = g.id;
        {
            let uow = store.begin();
            uow.groups().add(g).await.unwrap();
            // Dropped without commit.
        }
        let reader = store.begin();
        assert!(reader.groups().get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_spans_both_repositories() {
        let store = MemoryStore::new();
        let g = group("Block C");
        let group_id = g.id;
        let ann = Announcement::new(group_id, "Notice".to_string(), "body".to_string()).unwrap();
        let ann_id = ann.id;

        let uow = store.begin();
        uow.groups().add(g).await.unwrap();
        uow.announcements().add(ann).await.unwrap();
        uow.commit().await.unwrap();

        let reader = store.begin();
        assert!(reader.groups().get(group_id).await.unwrap().is_some());
        assert!(reader.announcements().get(ann_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let store = MemoryStore::new();
        let uow = store.begin();
        let older = group("Older");
        // Force distinct timestamps without sleeping.
        let mut newer = group("Newer");
        newer.created_at = older.created_at + chrono::Duration::seconds(1);
        uow.groups().add(older).await.unwrap();
        uow.groups().add(newer).await.unwrap();
        uow.commit().await.unwrap();

        let listed = store.begin().groups().list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Newer");
    }

    #[tokio::test]
    async fn update_of_missing_announcement_fails_whole_commit() {
        let store = MemoryStore::new();
        let g = group("Block E");
        let group_id = g.id;
        let ghost =
            Announcement::new(group_id, "Ghost".to_string(), "never stored".to_string()).unwrap();

        let uow = store.begin();
        uow.groups().add(g).await.unwrap();
        uow.announcements().update(ghost).await.unwrap();
        let err = uow.commit().await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::NotFound(_)));

        // The failed commit applied nothing, not even the group.
        assert!(store.begin().groups().get(group_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_announcement() {
        let store = MemoryStore::new();
        let g = group("Block D");
        let mut ann = Announcement::new(g.id, "Draft".to_string(), "body".to_string()).unwrap();
        let ann_id = ann.id;

        let uow = store.begin();
        uow.groups().add(g).await.unwrap();
        uow.announcements().add(ann.clone()).await.unwrap();
        uow.commit().await.unwrap();

        ann.publish(chrono::Utc::now()).unwrap();
        let uow = store.begin();
        uow.announcements().update(ann).await.unwrap();
        uow.commit().await.unwrap();

        let stored = store
            .begin()
            .announcements()
            .get(ann_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, comuna_core::AnnouncementStatus::Published);
    }
}
