//! Per-run scratch space for archive extraction and repackaging

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::MigrationState;
use crate::services::archive::CANONICAL_ARCHIVE_NAME;
use crate::services::errors::{MigrationError, MigrationResult};

/// Directory under the base dir that holds every run's scratch space
pub const PACKAGES_DIR: &str = "packages";

/// Working directory owned by exactly one migration run.
///
/// Layout: `<base>/packages/<run-id>/{extracted/, package.zip}`.
#[derive(Debug)]
pub struct WorkingDirectory {
    root: PathBuf,
}

impl WorkingDirectory {
    /// Create a fresh directory for `run_id`, discarding leftovers from an earlier run with the same id
    pub fn create(base_dir: &Path, run_id: &str) -> MigrationResult<Self> {
        let root = base_dir.join(PACKAGES_DIR).join(run_id);

        if root.exists() {
            warn!("Removing stale working directory {}", root.display());
            fs::remove_dir_all(&root).map_err(|source| MigrationError::Workspace {
                stage: MigrationState::Export,
                path: root.clone(),
                source,
            })?;
        }

        fs::create_dir_all(&root).map_err(|source| MigrationError::Workspace {
            stage: MigrationState::Export,
            path: root.clone(),
            source,
        })?;

        info!("Created working directory {}", root.display());
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Where the downloaded archive is unpacked
    pub fn extraction_dir(&self) -> PathBuf {
        self.root.join("extracted")
    }

    /// Canonical archive handed to the importer
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(CANONICAL_ARCHIVE_NAME)
    }

    /// Delete this run's directory, and the shared `packages` parent once it is empty
    pub fn remove(self) -> MigrationResult<()> {
        fs::remove_dir_all(&self.root).map_err(|source| MigrationError::Workspace {
            stage: MigrationState::Import,
            path: self.root.clone(),
            source,
        })?;

        if let Some(parent) = self.root.parent() {
            // Fails while other runs still own a directory there
            if fs::remove_dir(parent).is_ok() {
                debug!("Removed {}", parent.display());
            }
        }

        info!("Deleted working directory {}", self.root.display());
        Ok(())
    }
}
