// Client-side access to vRA appliances
//
// This module provides:
// - Token authentication against the identity service
// - Content and package operations on the content-management service
// - The `VraApi` seam the migration steps are written against
// - Transport-level retry, restricted to refused connections for non-idempotent calls

pub mod api;
pub mod auth;
pub mod errors;
pub mod retry;
pub mod traits;
pub mod types;
pub mod vra_client;

#[cfg(test)]
pub(crate) mod test_server;

// Re-export core types for easy access
pub use types::{
    ContentEntry,
    CreatePackageRequest,
    Credential,
    OperationReport,
    PackageEntry,
    ResponseFormat,
    VraSession,
    FAILED_OPERATION_STATUS,
};

pub use errors::{ClientError, ClientResult};
pub use retry::{with_connect_retry, with_transport_retry};
pub use traits::VraApi;
pub use vra_client::VraClient;
