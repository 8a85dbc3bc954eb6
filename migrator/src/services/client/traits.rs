//! Seam between the migration steps and the vRA REST API

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use super::errors::ClientResult;
use super::types::{
    ContentEntry, CreatePackageRequest, Credential, OperationReport, PackageEntry, VraSession,
};

/// Calls the migration pipeline makes against a vRA appliance.
///
/// `VraClient` is the HTTP implementation; every method is a single request.
#[async_trait]
pub trait VraApi: Send + Sync {
    /// `POST /identity/api/tokens`, returning the bearer token
    async fn create_token(&self, credential: &Credential, tenant: &str) -> ClientResult<String>;

    /// `GET /content-management-service/api/contents?limit=<limit>`
    async fn list_contents(&self, session: &VraSession, limit: u32) -> ClientResult<Vec<ContentEntry>>;

    /// `POST /content-management-service/api/packages` with a JSON body
    async fn create_package(
        &self,
        session: &VraSession,
        request: &CreatePackageRequest,
    ) -> ClientResult<()>;

    /// `GET /content-management-service/api/packages?limit=<limit>`
    async fn list_packages(&self, session: &VraSession, limit: u32) -> ClientResult<Vec<PackageEntry>>;

    /// `GET /content-management-service/api/packages/{id}/validate`
    async fn validate_export(&self, session: &VraSession, package_id: &str) -> ClientResult<OperationReport>;

    /// `GET /content-management-service/api/packages/{id}` as `application/zip`
    async fn download_package(&self, session: &VraSession, package_id: &str) -> ClientResult<Bytes>;

    /// `POST /content-management-service/api/packages/validate` with the archive as multipart `file`
    async fn validate_import(&self, session: &VraSession, archive: &Path) -> ClientResult<OperationReport>;

    /// `POST /content-management-service/api/packages` with the archive as multipart `file`
    async fn upload_package(&self, session: &VraSession, archive: &Path) -> ClientResult<()>;
}
