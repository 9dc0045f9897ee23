//! # comuna-app — Application Layer
//!
//! The write path of the Comuna backend:
//!
//! - [`error::AppError`] — the error taxonomy every handler and repository
//!   raises; translated to HTTP exactly once, in `comuna-api`.
//! - [`mediator::Mediator`] — an explicit command-to-handler registry
//!   assembled at startup. No runtime scanning: each command type is
//!   registered against its handler when the application boots.
//! - [`store`] — repository traits scoped to one aggregate each, plus the
//!   [`store::UnitOfWork`] scope that commits all staged writes atomically.
//! - [`memory`] — the in-memory store used in development and tests.
//! - [`handlers`] — one handler per write operation: validate first, then
//!   persist through a fresh unit of work. A rejected command never touches
//!   a repository.

pub mod error;
pub mod handlers;
pub mod mediator;
pub mod memory;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use error::AppError;
pub use mediator::{Command, CommandHandler, Mediator};
pub use store::{AnnouncementRepository, GroupRepository, Store, UnitOfWork};

use handlers::announcements::{
    CreateAnnouncementCommand, CreateAnnouncementHandler, PublishAnnouncementCommand,
    PublishAnnouncementHandler,
};
use handlers::groups::{CreateGroupCommand, CreateGroupHandler};

/// Wire every command to its handler against the given store.
///
/// This is the single place dispatch is defined; a command type without a
/// registration here cannot be sent.
pub fn mediator(store: Arc<dyn Store>) -> Mediator {
    Mediator::builder()
        .register::<CreateGroupCommand>(Arc::new(CreateGroupHandler::new(store.clone())))
        .register::<CreateAnnouncementCommand>(Arc::new(CreateAnnouncementHandler::new(
            store.clone(),
        )))
        .register::<PublishAnnouncementCommand>(Arc::new(PublishAnnouncementHandler::new(store)))
        .build()
}
