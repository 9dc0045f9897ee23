//! Announcement persistence operations.
//!
//! Status is stored as a plain string column and parsed leniently on read:
//! an unknown status value is logged and treated as a draft rather than
//! failing the whole query.

use chrono::{DateTime, Utc};
use comuna_core::{Announcement, AnnouncementId, AnnouncementStatus, GroupId};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a new announcement record.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    announcement: &Announcement,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO announcements (id, group_id, title, body, status, published_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(announcement.id.as_uuid())
    .bind(announcement.group_id.as_uuid())
    .bind(&announcement.title)
    .bind(&announcement.body)
    .bind(announcement.status.as_str())
    .bind(announcement.published_at)
    .bind(announcement.created_at)
    .bind(announcement.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Update an existing announcement's mutable columns.
pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    announcement: &Announcement,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE announcements
         SET title = $1, body = $2, status = $3, published_at = $4, updated_at = $5
         WHERE id = $6",
    )
    .bind(&announcement.title)
    .bind(&announcement.body)
    .bind(announcement.status.as_str())
    .bind(announcement.published_at)
    .bind(announcement.updated_at)
    .bind(announcement.id.as_uuid())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch an announcement by ID.
pub async fn get_by_id(
    pool: &PgPool,
    id: AnnouncementId,
) -> Result<Option<Announcement>, sqlx::Error> {
    let row = sqlx::query_as::<_, AnnouncementRow>(
        "SELECT id, group_id, title, body, status, published_at, created_at, updated_at
         FROM announcements WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(AnnouncementRow::into_announcement))
}

/// List announcements for a group, newest first.
pub async fn list_for_group(
    pool: &PgPool,
    group_id: GroupId,
) -> Result<Vec<Announcement>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AnnouncementRow>(
        "SELECT id, group_id, title, body, status, published_at, created_at, updated_at
         FROM announcements WHERE group_id = $1 ORDER BY created_at DESC",
    )
    .bind(group_id.as_uuid())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AnnouncementRow::into_announcement).collect())
}

/// Count announcements grouped by status. Used by the metrics scrape.
pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as("SELECT status, COUNT(*) FROM announcements GROUP BY status")
        .fetch_all(pool)
        .await
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct AnnouncementRow {
    id: Uuid,
    group_id: Uuid,
    title: String,
    body: String,
    status: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AnnouncementRow {
    fn into_announcement(self) -> Announcement {
        let status = match self.status.as_str() {
            "draft" => AnnouncementStatus::Draft,
            "published" => AnnouncementStatus::Published,
            other => {
                tracing::warn!(
                    id = %self.id,
                    status = %other,
                    "unknown announcement status in database, defaulting to draft"
                );
                AnnouncementStatus::Draft
            }
        };

        Announcement {
            id: AnnouncementId::from_uuid(self.id),
            group_id: GroupId::from_uuid(self.group_id),
            title: self.title,
            body: self.body,
            status,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
