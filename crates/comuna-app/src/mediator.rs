//! # Command Dispatch
//!
//! One immutable command per write operation, one handler per command, and
//! an explicit registry mapping command types to handlers. The registry is
//! assembled once at startup via [`MediatorBuilder`]; dispatch is a typed
//! lookup, so there is no reflection and no runtime handler scanning.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;

/// A write operation's input, carried from the API layer to its handler.
///
/// Commands are immutable value objects constructed from the request body;
/// they are never persisted.
pub trait Command: Send + 'static {
    /// What a successful handling produces (typically the new identifier).
    type Output: Send;
}

/// Handles one command type: validate, mutate the aggregate, persist.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C) -> Result<C::Output, AppError>;
}

/// Explicit command-to-handler registry.
///
/// Internally a `TypeId → Arc<dyn CommandHandler<C>>` map; the `Any`
/// indirection is only to store differently-typed handlers side by side.
/// [`Mediator::send`] recovers the concrete handler with a downcast that
/// cannot fail for a registered command type.
pub struct Mediator {
    handlers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Mediator {
    /// Start assembling the registry.
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder {
            handlers: HashMap::new(),
        }
    }

    /// Dispatch a command to its registered handler.
    ///
    /// An unregistered command type is a wiring bug and surfaces as an
    /// Internal error rather than a panic.
    pub async fn send<C: Command>(&self, command: C) -> Result<C::Output, AppError> {
        let handler = self
            .handlers
            .get(&TypeId::of::<C>())
            .and_then(|h| h.downcast_ref::<Arc<dyn CommandHandler<C>>>())
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "no handler registered for command {}",
                    std::any::type_name::<C>()
                ))
            })?;
        handler.handle(command).await
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("registered", &self.handlers.len())
            .finish()
    }
}

/// Builder collecting handler registrations before the application starts
/// serving requests.
pub struct MediatorBuilder {
    handlers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MediatorBuilder {
    /// Register the handler for a command type. A second registration for
    /// the same command type replaces the first.
    pub fn register<C: Command>(mut self, handler: Arc<dyn CommandHandler<C>>) -> Self {
        self.handlers.insert(TypeId::of::<C>(), Box::new(handler));
        self
    }

    pub fn build(self) -> Mediator {
        Mediator {
            handlers: self.handlers,
        }
    }
}
