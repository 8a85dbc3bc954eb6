//! In-memory `VraApi` double shared by the step and orchestrator tests

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::services::archive::build_archive;
use crate::services::client::{
    ClientError, ClientResult, ContentEntry, CreatePackageRequest, Credential, OperationReport,
    PackageEntry, VraApi, VraSession,
};
use crate::services::config::{MigrationConfig, RetryConfig};

/// Number of calls made per operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create_token: u32,
    pub list_contents: u32,
    pub create_package: u32,
    pub list_packages: u32,
    pub validate_export: u32,
    pub download_package: u32,
    pub validate_import: u32,
    pub upload_package: u32,
}

impl CallCounts {
    pub fn total(&self) -> u32 {
        self.create_token
            + self.list_contents
            + self.create_package
            + self.list_packages
            + self.validate_export
            + self.download_package
            + self.validate_import
            + self.upload_package
    }
}

struct MockState {
    counts: CallCounts,
    refused_connections: HashMap<&'static str, u32>,
    timeouts_after_commit: HashMap<&'static str, u32>,
    invalid_responses: HashSet<&'static str>,
    rejections: HashMap<&'static str, (u16, String)>,
    auth_rejected: HashSet<String>,
    contents: Vec<ContentEntry>,
    created: Vec<CreatePackageRequest>,
    /// Listings that miss the new package before it shows up; `None` hides it forever
    visible_after: Option<u32>,
    lookups_since_create: u32,
    export_status: String,
    import_status: String,
    archive: Vec<u8>,
    uploads: Vec<(String, PathBuf)>,
    remove_archive_dir_on_upload: bool,
}

impl MockState {
    fn record(&mut self, operation: &'static str) -> ClientResult<()> {
        let counts = &mut self.counts;
        match operation {
            "create_token" => counts.create_token += 1,
            "list_contents" => counts.list_contents += 1,
            "create_package" => counts.create_package += 1,
            "list_packages" => counts.list_packages += 1,
            "validate_export" => counts.validate_export += 1,
            "download_package" => counts.download_package += 1,
            "validate_import" => counts.validate_import += 1,
            "upload_package" => counts.upload_package += 1,
            other => panic!("unknown operation {}", other),
        }

        if let Some(remaining) = self.refused_connections.get_mut(operation) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ClientError::Connect {
                    operation,
                    message: "connection refused".to_string(),
                });
            }
        }

        if self.invalid_responses.contains(operation) {
            return Err(ClientError::InvalidResponse {
                operation,
                message: "expected value at line 1 column 1".to_string(),
            });
        }

        if let Some((status, body)) = self.rejections.get(operation) {
            return Err(ClientError::Api {
                operation,
                status: *status,
                body: body.clone(),
            });
        }

        Ok(())
    }

    /// Outcome reported after the call took effect on the appliance
    fn committed(&mut self, operation: &'static str) -> ClientResult<()> {
        if let Some(remaining) = self.timeouts_after_commit.get_mut(operation) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ClientError::Transport {
                    operation,
                    message: "operation timed out".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn report(status: &str) -> OperationReport {
    OperationReport::from_body(200, json!({ "operationStatus": status }).to_string())
}

pub struct MockVraApi {
    state: Mutex<MockState>,
}

impl MockVraApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                counts: CallCounts::default(),
                refused_connections: HashMap::new(),
                timeouts_after_commit: HashMap::new(),
                invalid_responses: HashSet::new(),
                rejections: HashMap::new(),
                auth_rejected: HashSet::new(),
                contents: Vec::new(),
                created: Vec::new(),
                visible_after: Some(0),
                lookups_since_create: 0,
                export_status: "SUCCESS".to_string(),
                import_status: "SUCCESS".to_string(),
                archive: build_archive(&[("a.txt", b"x"), ("b/c.txt", b"y")]).unwrap(),
                uploads: Vec::new(),
                remove_archive_dir_on_upload: false,
            }),
        }
    }

    fn configure(mut self, f: impl FnOnce(&mut MockState)) -> Self {
        f(self.state.get_mut().unwrap());
        self
    }

    pub fn with_content(self, id: &str, name: &str) -> Self {
        self.configure(|state| {
            state.contents.push(ContentEntry {
                id: id.to_string(),
                name: name.to_string(),
                content_type_id: Some("composite-blueprint".to_string()),
            })
        })
    }

    /// Answer token requests for `host` with HTTP 401
    pub fn reject_auth_for(self, host: &str) -> Self {
        self.configure(|state| {
            state.auth_rejected.insert(host.to_string());
        })
    }

    /// Refuse the connection for the next `times` calls of `operation`
    pub fn refuse_connections(self, operation: &'static str, times: u32) -> Self {
        self.configure(|state| {
            state.refused_connections.insert(operation, times);
        })
    }

    /// Apply the next `times` calls of `operation`, then time out before answering
    pub fn time_out_after_commit(self, operation: &'static str, times: u32) -> Self {
        self.configure(|state| {
            state.timeouts_after_commit.insert(operation, times);
        })
    }

    /// Answer `operation` with a body that cannot be decoded
    pub fn invalid_response(self, operation: &'static str) -> Self {
        self.configure(|state| {
            state.invalid_responses.insert(operation);
        })
    }

    /// Delete the directory holding the uploaded archive once the upload is accepted
    pub fn remove_archive_dir_on_upload(self) -> Self {
        self.configure(|state| state.remove_archive_dir_on_upload = true)
    }

    /// Answer every call of `operation` with `status` and `body`
    pub fn reject(self, operation: &'static str, status: u16, body: &str) -> Self {
        self.configure(|state| {
            state.rejections.insert(operation, (status, body.to_string()));
        })
    }

    pub fn package_visible_after(self, lookups: u32) -> Self {
        self.configure(|state| state.visible_after = Some(lookups))
    }

    pub fn package_never_visible(self) -> Self {
        self.configure(|state| state.visible_after = None)
    }

    pub fn with_export_status(self, status: &str) -> Self {
        self.configure(|state| state.export_status = status.to_string())
    }

    pub fn with_import_status(self, status: &str) -> Self {
        self.configure(|state| state.import_status = status.to_string())
    }

    /// Bytes served by `download_package`
    pub fn with_archive(self, bytes: Vec<u8>) -> Self {
        self.configure(|state| state.archive = bytes)
    }

    pub fn counts(&self) -> CallCounts {
        self.state.lock().unwrap().counts.clone()
    }

    pub fn created_packages(&self) -> Vec<CreatePackageRequest> {
        self.state.lock().unwrap().created.clone()
    }

    /// `(host, archive path)` of every accepted upload
    pub fn uploads(&self) -> Vec<(String, PathBuf)> {
        self.state.lock().unwrap().uploads.clone()
    }
}

#[async_trait]
impl VraApi for MockVraApi {
    async fn create_token(&self, credential: &Credential, _tenant: &str) -> ClientResult<String> {
        let mut state = self.state.lock().unwrap();
        state.record("create_token")?;
        if state.auth_rejected.contains(&credential.host) {
            return Err(ClientError::Api {
                operation: "create_token",
                status: 401,
                body: "{\"errors\":[{\"message\":\"Invalid credentials\"}]}".to_string(),
            });
        }
        Ok(format!("token-{}", credential.host))
    }

    async fn list_contents(&self, _session: &VraSession, _limit: u32) -> ClientResult<Vec<ContentEntry>> {
        let mut state = self.state.lock().unwrap();
        state.record("list_contents")?;
        Ok(state.contents.clone())
    }

    async fn create_package(
        &self,
        _session: &VraSession,
        request: &CreatePackageRequest,
    ) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        state.record("create_package")?;
        if state.created.iter().any(|created| created.name == request.name) {
            return Err(ClientError::Api {
                operation: "create_package",
                status: 400,
                body: "Package name already exists".to_string(),
            });
        }
        state.created.push(request.clone());
        state.lookups_since_create = 0;
        state.committed("create_package")
    }

    async fn list_packages(&self, _session: &VraSession, _limit: u32) -> ClientResult<Vec<PackageEntry>> {
        let mut state = self.state.lock().unwrap();
        state.record("list_packages")?;
        state.lookups_since_create += 1;

        let mut listed = vec![PackageEntry {
            id: "pkg-existing".to_string(),
            name: "Unrelated-00000000".to_string(),
            description: None,
        }];
        let visible = state
            .visible_after
            .is_some_and(|after| state.lookups_since_create > after);
        if visible {
            listed.extend(state.created.iter().enumerate().map(|(i, request)| PackageEntry {
                id: format!("pkg-{}", i + 1),
                name: request.name.clone(),
                description: Some(request.description.clone()),
            }));
        }
        Ok(listed)
    }

    async fn validate_export(&self, _session: &VraSession, _package_id: &str) -> ClientResult<OperationReport> {
        let mut state = self.state.lock().unwrap();
        state.record("validate_export")?;
        Ok(report(&state.export_status))
    }

    async fn download_package(&self, _session: &VraSession, _package_id: &str) -> ClientResult<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.record("download_package")?;
        Ok(Bytes::from(state.archive.clone()))
    }

    async fn validate_import(&self, _session: &VraSession, _archive: &Path) -> ClientResult<OperationReport> {
        let mut state = self.state.lock().unwrap();
        state.record("validate_import")?;
        Ok(report(&state.import_status))
    }

    async fn upload_package(&self, session: &VraSession, archive: &Path) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        state.record("upload_package")?;
        state.uploads.push((session.host().to_string(), archive.to_path_buf()));
        if state.remove_archive_dir_on_upload {
            if let Some(dir) = archive.parent() {
                std::fs::remove_dir_all(dir).unwrap();
            }
        }
        state.committed("upload_package")
    }
}

/// Default configuration without backoff delays
pub fn test_config() -> MigrationConfig {
    MigrationConfig {
        retry: RetryConfig::immediate(),
        base_dir: std::env::temp_dir(),
        ..MigrationConfig::default()
    }
}
