// Service layer: HTTP access to vRA, local archive handling, configuration and errors

pub mod archive;
pub mod client;
pub mod config;
pub mod errors;

pub use config::MigrationConfig;
pub use errors::{MigrationError, MigrationResult};
