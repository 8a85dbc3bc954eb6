// Core types for the migration pipeline
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::client::Credential;

/// Pipeline position. Transitions are strictly linear; `Failed` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationState {
    Start,
    AuthSource,
    AuthDestination,
    ResolveContent,
    BuildPackage,
    Export,
    Import,
    Done,
    Failed,
}

impl MigrationState {
    /// Every state in pipeline order, excluding `Failed`
    pub const PIPELINE: [MigrationState; 8] = [
        MigrationState::Start,
        MigrationState::AuthSource,
        MigrationState::AuthDestination,
        MigrationState::ResolveContent,
        MigrationState::BuildPackage,
        MigrationState::Export,
        MigrationState::Import,
        MigrationState::Done,
    ];

    /// The state following this one on success
    pub fn next(self) -> MigrationState {
        match self {
            MigrationState::Start => MigrationState::AuthSource,
            MigrationState::AuthSource => MigrationState::AuthDestination,
            MigrationState::AuthDestination => MigrationState::ResolveContent,
            MigrationState::ResolveContent => MigrationState::BuildPackage,
            MigrationState::BuildPackage => MigrationState::Export,
            MigrationState::Export => MigrationState::Import,
            MigrationState::Import => MigrationState::Done,
            MigrationState::Done => MigrationState::Done,
            MigrationState::Failed => MigrationState::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MigrationState::Done | MigrationState::Failed)
    }

    pub fn can_transition_to(self, target: MigrationState) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == MigrationState::Failed || target == self.next()
    }

    pub fn label(self) -> &'static str {
        match self {
            MigrationState::Start => "start",
            MigrationState::AuthSource => "authenticate source",
            MigrationState::AuthDestination => "authenticate destination",
            MigrationState::ResolveContent => "resolve content",
            MigrationState::BuildPackage => "build package",
            MigrationState::Export => "export package",
            MigrationState::Import => "import package",
            MigrationState::Done => "done",
            MigrationState::Failed => "failed",
        }
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Content item resolved on the source appliance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub name: String,
    pub id: String,
}

/// Export package created on the source appliance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub id: String,
}

/// Canonical archive produced by the exporter
#[derive(Debug, Clone)]
pub struct ExportedArchive {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub file_count: usize,
}

/// Input of a single migration run
#[derive(Clone)]
pub struct MigrationRequest {
    pub source_host: String,
    pub destination_host: String,
    pub username: String,
    password: String,
    pub content_name: String,
}

impl MigrationRequest {
    pub fn new(
        source_host: impl Into<String>,
        destination_host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        content_name: impl Into<String>,
    ) -> Self {
        Self {
            source_host: source_host.into(),
            destination_host: destination_host.into(),
            username: username.into(),
            password: password.into(),
            content_name: content_name.into(),
        }
    }

    pub fn source_credential(&self) -> Credential {
        Credential::new(&self.source_host, &self.username, &self.password)
    }

    pub fn destination_credential(&self) -> Credential {
        Credential::new(&self.destination_host, &self.username, &self.password)
    }

    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("source host", &self.source_host),
            ("destination host", &self.destination_host),
            ("username", &self.username),
            ("content name", &self.content_name),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", field));
            }
        }
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Debug for MigrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRequest")
            .field("source_host", &self.source_host)
            .field("destination_host", &self.destination_host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("content_name", &self.content_name)
            .finish()
    }
}

/// Summary of a completed migration
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub source_host: String,
    pub destination_host: String,
    pub content: ContentItem,
    pub package: Package,
    pub archive_bytes: u64,
    pub archive_files: usize,
    pub duration: Duration,
}
