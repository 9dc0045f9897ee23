//! Group persistence operations.
//!
//! Write functions take any `PgExecutor` so a unit of work can flush its
//! staged writes inside a single transaction. Reads go straight to the pool.

use chrono::{DateTime, Utc};
use comuna_core::{Group, GroupId};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a new group record.
pub async fn insert<'e>(executor: impl PgExecutor<'e>, group: &Group) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO groups (id, name, description, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(group.id.as_uuid())
    .bind(&group.name)
    .bind(&group.description)
    .bind(group.created_at)
    .bind(group.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Fetch a group by ID.
pub async fn get_by_id(pool: &PgPool, id: GroupId) -> Result<Option<Group>, sqlx::Error> {
    let row = sqlx::query_as::<_, GroupRow>(
        "SELECT id, name, description, created_at, updated_at
         FROM groups WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(GroupRow::into_group))
}

/// List all groups, newest first.
pub async fn list(pool: &PgPool) -> Result<Vec<Group>, sqlx::Error> {
    let rows = sqlx::query_as::<_, GroupRow>(
        "SELECT id, name, description, created_at, updated_at
         FROM groups ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(GroupRow::into_group).collect())
}

/// Count all groups. Used by the metrics scrape.
pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self) -> Group {
        Group {
            id: GroupId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
