//! Group write operations.

use std::sync::Arc;

use async_trait::async_trait;

use comuna_core::{Group, GroupId};

use crate::error::AppError;
use crate::mediator::{Command, CommandHandler};
use crate::store::Store;

/// Create a resident group.
#[derive(Debug, Clone)]
pub struct CreateGroupCommand {
    pub name: String,
    pub description: Option<String>,
}

impl Command for CreateGroupCommand {
    type Output = GroupId;
}

pub struct CreateGroupHandler {
    store: Arc<dyn Store>,
}

impl CreateGroupHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler<CreateGroupCommand> for CreateGroupHandler {
    async fn handle(&self, command: CreateGroupCommand) -> Result<GroupId, AppError> {
        // Validation happens in the constructor, before the scope is opened.
        let group = Group::new(command.name, command.description)?;
        let id = group.id;

        let uow = self.store.begin();
        uow.groups().add(group).await?;
        uow.commit().await?;

        tracing::info!(group_id = %id, "group created");
        Ok(id)
    }
}
