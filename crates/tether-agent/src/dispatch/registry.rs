//! Mapping from command type to handler.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{CommandHandler, CommandType};

/// Handlers keyed by command type.
///
/// Built in full during startup, then published through [`SharedRegistry`].
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, replacing any previous entry.
    pub fn register(&mut self, kind: CommandType, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(kind.as_str().to_owned(), handler);
    }

    /// Finds the handler for an exact command type.
    #[must_use]
    pub fn lookup(&self, kind: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(kind).cloned()
    }

    /// Registered command types in sorted order.
    #[must_use]
    pub fn command_types(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.handlers.keys().cloned().collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerRegistry")
            .field("commands", &self.command_types())
            .finish()
    }
}

/// Registry slot shared between startup, dispatch and teardown.
///
/// Startup swaps a fully built registry in; lookups clone the handler so a
/// concurrent clear never pulls a handler out from under a running command.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: Mutex<Arc<HandlerRegistry>>,
}

impl SharedRegistry {
    fn lock(&self) -> MutexGuard<'_, Arc<HandlerRegistry>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes `registry`, replacing the current one.
    pub fn install(&self, registry: HandlerRegistry) {
        *self.lock() = Arc::new(registry);
    }

    /// Drops every handler.
    pub fn clear(&self) {
        *self.lock() = Arc::new(HandlerRegistry::new());
    }

    /// Finds the handler for `kind` in the current registry.
    #[must_use]
    pub fn lookup(&self, kind: &str) -> Option<Arc<dyn CommandHandler>> {
        self.lock().lookup(kind)
    }

    /// Sorted command types of the current registry.
    #[must_use]
    pub fn command_types(&self) -> Vec<String> {
        self.lock().command_types()
    }
}
