use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::types::Account;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PermissionEvent {
    PermissionChanged { account: Account, new_status: bool },
}

impl PermissionEvent {
    #[must_use]
    pub const fn changed(account: Account, new_status: bool) -> Self {
        Self::PermissionChanged {
            account,
            new_status,
        }
    }

    #[must_use]
    pub const fn account(&self) -> Account {
        match self {
            Self::PermissionChanged { account, .. } => *account,
        }
    }
}

pub trait PermissionEventHandler: Send + Sync {
    fn handle(&self, event: &PermissionEvent);
}

/// Delivers each event to every handler, in registration order.
pub struct PermissionEventEmitter {
    handlers: Vec<Arc<dyn PermissionEventHandler>>,
}

impl PermissionEventEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn PermissionEventHandler>) {
        self.handlers.push(handler);
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn emit(&self, event: &PermissionEvent) {
        for handler in &self.handlers {
            handler.handle(event);
        }
    }

    pub fn emit_changed(&self, account: Account, new_status: bool) {
        self.emit(&PermissionEvent::changed(account, new_status));
    }
}

impl Default for PermissionEventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory ordered record of delivered events.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<PermissionEvent>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<PermissionEvent> {
        self.events.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl PermissionEventHandler for EventLog {
    fn handle(&self, event: &PermissionEvent) {
        self.events.lock().push(*event);
    }
}

pub struct TracingAuditHandler;

impl PermissionEventHandler for TracingAuditHandler {
    fn handle(&self, event: &PermissionEvent) {
        match event {
            PermissionEvent::PermissionChanged {
                account,
                new_status,
            } => {
                tracing::info!(%account, new_status, "Harness admin permission changed");
            }
        }
    }
}
