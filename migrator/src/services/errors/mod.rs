use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::migration::types::MigrationState;
use crate::services::archive::ArchiveError;
use crate::services::client::ClientError;

/// Which dry run rejected the package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Export,
    Import,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationKind::Export => write!(f, "export"),
            ValidationKind::Import => write!(f, "import"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Authentication against {host} failed: {source}")]
    Authentication {
        stage: MigrationState,
        host: String,
        #[source]
        source: ClientError,
    },

    #[error("Network error during {stage}: {source}")]
    Transport {
        stage: MigrationState,
        #[source]
        source: ClientError,
    },

    #[error("Content listing on {host} failed: {source}")]
    ContentLookup {
        host: String,
        #[source]
        source: ClientError,
    },

    #[error("Content with name '{name}' was not found on {host}")]
    ContentNotFound { host: String, name: String },

    #[error("Package creation on {host} failed: {source}")]
    PackageCreation {
        host: String,
        #[source]
        source: ClientError,
    },

    #[error("Generated package '{name}' was not found on {host} after {attempts} lookups")]
    PackageNotFound {
        host: String,
        name: String,
        attempts: u32,
    },

    #[error("Dry {kind} failed on {host} (HTTP {status}): {body}")]
    Validation {
        kind: ValidationKind,
        host: String,
        status: u16,
        body: String,
    },

    #[error("Export of package '{package}' failed: {reason}")]
    Export { package: String, reason: String },

    #[error("Import on {host} failed: {reason}")]
    Import {
        host: String,
        reason: String,
        status: Option<u16>,
    },

    #[error("Working directory error at {path}: {source}")]
    Workspace {
        stage: MigrationState,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type MigrationResult<T> = Result<T, MigrationError>;

impl MigrationError {
    /// Route a client failure: transport problems keep their own variant,
    /// answers from the appliance go through `rejected`.
    pub fn from_client(
        stage: MigrationState,
        err: ClientError,
        rejected: impl FnOnce(ClientError) -> MigrationError,
    ) -> Self {
        if err.is_transient() {
            MigrationError::Transport { stage, source: err }
        } else {
            rejected(err)
        }
    }

    pub fn archive(package: &str, err: ArchiveError) -> Self {
        MigrationError::Export {
            package: package.to_string(),
            reason: err.to_string(),
        }
    }

    /// Pipeline stage the error was raised in
    pub fn stage(&self) -> MigrationState {
        match self {
            MigrationError::Authentication { stage, .. }
            | MigrationError::Transport { stage, .. }
            | MigrationError::Workspace { stage, .. } => *stage,
            MigrationError::ContentLookup { .. } | MigrationError::ContentNotFound { .. } => {
                MigrationState::ResolveContent
            }
            MigrationError::PackageCreation { .. } | MigrationError::PackageNotFound { .. } => {
                MigrationState::BuildPackage
            }
            MigrationError::Validation { kind, .. } => match kind {
                ValidationKind::Export => MigrationState::Export,
                ValidationKind::Import => MigrationState::Import,
            },
            MigrationError::Export { .. } => MigrationState::Export,
            MigrationError::Import { .. } => MigrationState::Import,
            MigrationError::Configuration { .. } => MigrationState::Start,
        }
    }

    /// HTTP status attached to the failure, when the appliance answered
    pub fn status(&self) -> Option<u16> {
        match self {
            MigrationError::Authentication { source, .. }
            | MigrationError::ContentLookup { source, .. }
            | MigrationError::PackageCreation { source, .. } => source.status(),
            MigrationError::Validation { status, .. } => Some(*status),
            MigrationError::Import { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, MigrationError::Transport { .. })
    }
}
