//! Content-management service operations
//!
//! Every function takes the `VraClient` as first parameter and performs one request:
//! - Content listing
//! - Package lifecycle (create, list, dry export, export, dry import, import)

pub mod content;
pub use content::*;

pub mod packages;
pub use packages::*;

/// Root of the content-management service API
pub const CONTENT_MANAGEMENT_API: &str = "/content-management-service/api";
