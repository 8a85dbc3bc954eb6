use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, error, instrument};

use super::errors::{ClientError, ClientResult};
use super::traits::VraApi;
use super::types::*;
use crate::services::config::HttpConfig;

/// HTTP client for the vRA identity and content-management services
#[derive(Clone)]
pub struct VraClient {
    pub(crate) http_client: Client,
}

impl VraClient {
    /// Create a new client; one instance serves both source and destination hosts
    pub fn new(config: &HttpConfig) -> ClientResult<Self> {
        let http_client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ClientError::Setup {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { http_client })
    }

    /// Absolute URL for `path` on `host`.
    ///
    /// Bare hostnames are reached over https; a host given with an explicit
    /// scheme is used as-is.
    pub fn endpoint(host: &str, path: &str) -> String {
        let host = host.trim().trim_end_matches('/');
        if host.starts_with("https://") || host.starts_with("http://") {
            format!("{}{}", host, path)
        } else {
            format!("https://{}{}", host, path)
        }
    }

    /// Send a request and turn non-success statuses into `ClientError::Api`
    pub(crate) async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> ClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(operation, e))?;

        let status = response.status();
        if status.is_success() {
            debug!("{} answered with HTTP {}", operation, status.as_u16());
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
        error!("{} failed with status {}: {}", operation, status, body);

        Err(ClientError::Api {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    /// Send a request and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let response = self.send(operation, request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(operation, e))?;

        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse {
            operation,
            message: format!("{} (body: {})", e, text),
        })
    }

    /// Send a request and keep status plus raw body for an operation report
    pub(crate) async fn send_for_report(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> ClientResult<OperationReport> {
        let response = self.send(operation, request).await?;
        let http_status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(operation, e))?;

        Ok(OperationReport::from_body(http_status, body))
    }
}

#[async_trait]
impl VraApi for VraClient {
    #[instrument(skip(self, credential), fields(host = %credential.host, username = %credential.username), err)]
    async fn create_token(&self, credential: &Credential, tenant: &str) -> ClientResult<String> {
        crate::services::client::auth::create_token_impl(self, credential, tenant).await
    }

    #[instrument(skip(self), err)]
    async fn list_contents(&self, session: &VraSession, limit: u32) -> ClientResult<Vec<ContentEntry>> {
        crate::services::client::api::list_contents_impl(self, session, limit).await
    }

    #[instrument(skip(self), err)]
    async fn create_package(
        &self,
        session: &VraSession,
        request: &CreatePackageRequest,
    ) -> ClientResult<()> {
        crate::services::client::api::create_package_impl(self, session, request).await
    }

    #[instrument(skip(self), err)]
    async fn list_packages(&self, session: &VraSession, limit: u32) -> ClientResult<Vec<PackageEntry>> {
        crate::services::client::api::list_packages_impl(self, session, limit).await
    }

    #[instrument(skip(self), err)]
    async fn validate_export(&self, session: &VraSession, package_id: &str) -> ClientResult<OperationReport> {
        crate::services::client::api::validate_export_impl(self, session, package_id).await
    }

    #[instrument(skip(self), err)]
    async fn download_package(&self, session: &VraSession, package_id: &str) -> ClientResult<Bytes> {
        crate::services::client::api::download_package_impl(self, session, package_id).await
    }

    #[instrument(skip(self), err)]
    async fn validate_import(&self, session: &VraSession, archive: &Path) -> ClientResult<OperationReport> {
        crate::services::client::api::validate_import_impl(self, session, archive).await
    }

    #[instrument(skip(self), err)]
    async fn upload_package(&self, session: &VraSession, archive: &Path) -> ClientResult<()> {
        crate::services::client::api::upload_package_impl(self, session, archive).await
    }
}
