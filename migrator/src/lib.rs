//! This crate contains the vRA content migration pipeline shared by the CLI.

pub mod migration;
pub use migration::{MigrationOrchestrator, MigrationReport, MigrationRequest, MigrationState};

pub mod services;
pub mod utils;
