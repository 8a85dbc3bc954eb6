//! Migration progress events and event handling

use tracing::{error, info, warn};

use crate::migration::types::MigrationState;

/// Events that can occur during migration
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationEvent {
    Started { content_name: String },
    StepBegun { step: MigrationState },
    StepCompleted { step: MigrationState, duration_ms: u64 },
    Warning { message: String },
    Error { step: MigrationState, message: String },
    Completed { success: bool },
}

/// Event handler for migration events
pub trait MigrationEventHandler: Send + Sync {
    fn handle_event(&self, event: MigrationEvent);
}

/// Composite event handler that forwards events to multiple handlers
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn MigrationEventHandler>>,
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler<H: MigrationEventHandler + 'static>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }

    pub fn with_handler<H: MigrationEventHandler + 'static>(mut self, handler: H) -> Self {
        self.add_handler(handler);
        self
    }
}

impl MigrationEventHandler for CompositeEventHandler {
    fn handle_event(&self, event: MigrationEvent) {
        for handler in &self.handlers {
            handler.handle_event(event.clone());
        }
    }
}

/// Simple logging event handler
pub struct LoggingEventHandler;

impl MigrationEventHandler for LoggingEventHandler {
    fn handle_event(&self, event: MigrationEvent) {
        match event {
            MigrationEvent::Started { content_name } => {
                info!("[Event] Migration of '{}' started", content_name);
            }
            MigrationEvent::StepBegun { step } => {
                info!("[Event] Step begun: {}", step);
            }
            MigrationEvent::StepCompleted { step, duration_ms } => {
                info!("[Event] Step completed: {} ({}ms)", step, duration_ms);
            }
            MigrationEvent::Warning { message } => {
                warn!("[Event] Warning: {}", message);
            }
            MigrationEvent::Error { step, message } => {
                error!("[Event] Error in {}: {}", step, message);
            }
            MigrationEvent::Completed { success } => {
                if success {
                    info!("[Event] Migration completed successfully");
                } else {
                    error!("[Event] Migration failed");
                }
            }
        }
    }
}
