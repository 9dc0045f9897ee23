//! # Postgres Store
//!
//! [`Store`] implementation backed by the connection pool. A unit of work
//! stages its writes locally and flushes them inside a single transaction
//! on commit; reads bypass the staging buffer and see committed rows only.

use async_trait::async_trait;
use parking_lot::Mutex;
use sqlx::PgPool;

use comuna_app::error::AppError;
use comuna_app::store::{AnnouncementRepository, GroupRepository, Store, UnitOfWork};
use comuna_core::{Announcement, AnnouncementId, Group, GroupId};

use crate::db;

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Database(e.to_string())
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Store for PgStore {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(PgUnitOfWork {
            pool: self.pool.clone(),
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

/// Unit of work over a Postgres transaction.
///
/// The transaction itself is not opened until [`UnitOfWork::commit`], so a
/// scope that only reads never touches transaction state.
pub struct PgUnitOfWork {
    pool: PgPool,
    pending: Mutex<Vec<Pending>>,
}

#[async_trait]
impl GroupRepository for PgUnitOfWork {
    async fn add(&self, group: Group) -> Result<(), AppError> {
        self.pending.lock().push(Pending::AddGroup(group));
        Ok(())
    }

    async fn get(&self, id: GroupId) -> Result<Option<Group>, AppError> {
        db::groups::get_by_id(&self.pool, id).await.map_err(db_err)
    }

    async fn list(&self) -> Result<Vec<Group>, AppError> {
        db::groups::list(&self.pool).await.map_err(db_err)
    }
}

#[async_trait]
impl AnnouncementRepository for PgUnitOfWork {
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
        db::announcements::get_by_id(&self.pool, id)
            .await
            .map_err(db_err)
    }

    async fn list_for_group(&self, group_id: GroupId) -> Result<Vec<Announcement>, AppError> {
        db::announcements::list_for_group(&self.pool, group_id)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn groups(&self) -> &dyn GroupRepository {
        self
    }

    fn announcements(&self) -> &dyn AnnouncementRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let pending = self.pending.into_inner();
        if pending.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for write in &pending {
            match write {
                Pending::AddGroup(group) => {
                    db::groups::insert(&mut *tx, group).await.map_err(db_err)?;
                }
                Pending::AddAnnouncement(announcement) => {
                    db::announcements::insert(&mut *tx, announcement)
                        .await
                        .map_err(db_err)?;
                }
                Pending::UpdateAnnouncement(announcement) => {
                    let updated = db::announcements::update(&mut *tx, announcement)
                        .await
                        .map_err(db_err)?;
                    // Dropping the transaction rolls back earlier writes.
                    if !updated {
                        return Err(AppError::not_found(format!(
                            "announcement {} not found",
                            announcement.id
                        )));
                    }
                }
            }
        }
        tx.commit().await.map_err(db_err)
    }
}
