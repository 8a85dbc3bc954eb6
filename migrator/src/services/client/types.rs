use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{ClientError, ClientResult};

/// Operation status value that marks a failed dry export/import
pub const FAILED_OPERATION_STATUS: &str = "FAILED";

/// Username/password pair for one vRA appliance
#[derive(Clone)]
pub struct Credential {
    pub host: String,
    pub username: String,
    secret: String,
}

impl Credential {
    pub fn new(host: impl Into<String>, username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /identity/api/tokens`
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub tenant: &'a str,
}

/// Token issued by the identity service; `id` is the bearer token itself
#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub id: String,
}

/// Media type a call expects back from the appliance.
///
/// The format is passed with every request instead of being stored on the
/// session, so a download can never leak its `Accept` header into a JSON call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Zip,
}

impl ResponseFormat {
    pub fn accept_value(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::Zip => "application/zip",
        }
    }
}

/// Authenticated context for one vRA host.
///
/// The bearer token is fixed at construction and never refreshed.
#[derive(Clone)]
pub struct VraSession {
    host: String,
    bearer_token: String,
}

impl VraSession {
    pub fn new(host: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            bearer_token: bearer_token.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Value of the `Authorization` header sent with every call to this host
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }

    /// Headers for a single request expecting `format` back
    pub fn headers(&self, format: ResponseFormat) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(&self.authorization_value()).map_err(|e| {
            ClientError::Setup {
                message: format!("Bearer token is not a valid header value: {}", e),
            }
        })?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static(format.accept_value()));
        Ok(headers)
    }
}

impl fmt::Debug for VraSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VraSession")
            .field("host", &self.host)
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

/// Paged listing wrapper used by the content-management service
#[derive(Deserialize, Debug, Clone)]
pub struct Listing<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

/// One entry of `GET /content-management-service/api/contents`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ContentEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "contentTypeId", default)]
    pub content_type_id: Option<String>,
}

/// One entry of `GET /content-management-service/api/packages`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PackageEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /content-management-service/api/packages`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreatePackageRequest {
    pub name: String,
    pub description: String,
    pub contents: Vec<String>,
}

/// Outcome of a dry export or dry import call
#[derive(Debug, Clone, PartialEq)]
pub struct OperationReport {
    pub http_status: u16,
    pub operation_status: Option<String>,
    pub body: String,
}

impl OperationReport {
    /// Build a report from a raw response body.
    ///
    /// A body that is not JSON or lacks `operationStatus` yields `None`, which
    /// callers treat as a pass.
    pub fn from_body(http_status: u16, body: String) -> Self {
        let operation_status = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| {
                json.get("operationStatus")
                    .and_then(|s| s.as_str())
                    .map(|s| s.to_string())
            });

        Self {
            http_status,
            operation_status,
            body,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.operation_status.as_deref() == Some(FAILED_OPERATION_STATUS)
    }
}
