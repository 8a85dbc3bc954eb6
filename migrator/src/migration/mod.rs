//! Migration pipeline
//!
//! A run moves through `MigrationState` in a fixed order: authenticate the
//! source and destination appliances, resolve the content item by name,
//! wrap it in a freshly named package, export that package into a per-run
//! working directory and import the repacked archive on the destination.

pub mod orchestrator;
pub mod progress;
pub mod steps;
pub mod types;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_support;

pub use orchestrator::MigrationOrchestrator;
pub use progress::{CompositeEventHandler, LoggingEventHandler, MigrationEvent, MigrationEventHandler};
pub use types::*;
pub use workspace::WorkingDirectory;
