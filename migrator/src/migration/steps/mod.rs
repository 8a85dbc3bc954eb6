//! One module per pipeline stage

pub mod auth;
pub mod content;
pub mod export;
pub mod import;
pub mod package;

pub use auth::authenticate;
pub use content::{find_content, resolve_content};
pub use export::export_package;
pub use import::import_package;
pub use package::build_export_package;
