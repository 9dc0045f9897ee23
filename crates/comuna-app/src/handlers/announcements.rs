//! Announcement write operations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use comuna_core::{Announcement, AnnouncementId, GroupId};

use crate::error::AppError;
use crate::mediator::{Command, CommandHandler};
use crate::store::Store;

/// Create a draft announcement for a group.
#[derive(Debug, Clone)]
pub struct CreateAnnouncementCommand {
    pub group_id: GroupId,
    pub title: String,
    pub body: String,
}

impl Command for CreateAnnouncementCommand {
    type Output = AnnouncementId;
}

pub struct CreateAnnouncementHandler {
    store: Arc<dyn Store>,
}

impl CreateAnnouncementHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler<CreateAnnouncementCommand> for CreateAnnouncementHandler {
    async fn handle(&self, command: CreateAnnouncementCommand) -> Result<AnnouncementId, AppError> {
        let announcement = Announcement::new(command.group_id, command.title, command.body)?;
        let id = announcement.id;

        let uow = self.store.begin();
        if uow.groups().get(command.group_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "group {} not found",
                command.group_id
            )));
        }
        uow.announcements().add(announcement).await?;
        uow.commit().await?;

        tracing::info!(announcement_id = %id, group_id = %command.group_id, "announcement created");
        Ok(id)
    }
}

/// Publish a draft announcement.
#[derive(Debug, Clone)]
pub struct PublishAnnouncementCommand {
    pub id: AnnouncementId,
}

impl Command for PublishAnnouncementCommand {
    type Output = ();
}

pub struct PublishAnnouncementHandler {
    store: Arc<dyn Store>,
}

impl PublishAnnouncementHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler<PublishAnnouncementCommand> for PublishAnnouncementHandler {
    async fn handle(&self, command: PublishAnnouncementCommand) -> Result<(), AppError> {
        let uow = self.store.begin();
        let mut announcement = uow
            .announcements()
            .get(command.id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("announcement {} not found", command.id))
            })?;

        announcement.publish(Utc::now())?;

        uow.announcements().update(announcement).await?;
        uow.commit().await?;

        tracing::info!(announcement_id = %command.id, "announcement published");
        Ok(())
    }
}
