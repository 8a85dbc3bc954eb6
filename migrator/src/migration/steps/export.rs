//! Export step: dry export, download and repackage

use tracing::{info, instrument, warn};

use crate::migration::types::{ExportedArchive, MigrationState, Package};
use crate::migration::workspace::WorkingDirectory;
use crate::services::archive;
use crate::services::client::{with_transport_retry, ClientError, VraApi, VraSession};
use crate::services::config::MigrationConfig;
use crate::services::errors::{MigrationError, MigrationResult, ValidationKind};

/// A rejected dry export is a validation failure; an unusable answer is an export failure
fn dry_export_error(host: &str, package: &Package, source: ClientError) -> MigrationError {
    match (source.status(), source.body()) {
        (Some(status), Some(body)) => MigrationError::Validation {
            kind: ValidationKind::Export,
            host: host.to_string(),
            status,
            body: body.to_string(),
        },
        _ => MigrationError::Export {
            package: package.name.clone(),
            reason: source.to_string(),
        },
    }
}

/// Validate, download and repackage `package` into `workdir`.
///
/// Nothing is downloaded when the dry export fails.
#[instrument(skip(api, session, workdir, config), fields(host = %session.host()), err)]
pub async fn export_package(
    api: &dyn VraApi,
    session: &VraSession,
    package: &Package,
    workdir: &WorkingDirectory,
    config: &MigrationConfig,
) -> MigrationResult<ExportedArchive> {
    let package_id = package.id.as_str();

    let report = with_transport_retry(&config.retry, "validate_export", move || {
        api.validate_export(session, package_id)
    })
    .await
    .map_err(|err| {
        MigrationError::from_client(MigrationState::Export, err, |source| {
            dry_export_error(session.host(), package, source)
        })
    })?;

    if report.is_failed() {
        return Err(MigrationError::Validation {
            kind: ValidationKind::Export,
            host: session.host().to_string(),
            status: report.http_status,
            body: report.body,
        });
    }
    if report.operation_status.is_none() {
        warn!("Dry export of {} returned no operation status, continuing", package.name);
    }
    info!("Dry export of package {} passed", package.name);

    let bytes = with_transport_retry(&config.retry, "download_package", move || {
        api.download_package(session, package_id)
    })
    .await
    .map_err(|err| {
        MigrationError::from_client(MigrationState::Export, err, |source| MigrationError::Export {
            package: package.name.clone(),
            reason: source.to_string(),
        })
    })?;

    if bytes.is_empty() {
        return Err(MigrationError::Export {
            package: package.name.clone(),
            reason: "downloaded archive is empty".to_string(),
        });
    }

    let archive_path = workdir.archive_path();
    let (file_count, size_bytes) = archive::repackage(&bytes, &workdir.extraction_dir(), &archive_path)
        .map_err(|err| MigrationError::archive(&package.name, err))?;

    info!(
        "Package {} exported to {} ({} files, {} bytes)",
        package.name,
        archive_path.display(),
        file_count,
        size_bytes
    );

    Ok(ExportedArchive {
        path: archive_path,
        size_bytes,
        file_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::test_support::{test_config, MockVraApi};
    use std::fs;

    fn package() -> Package {
        Package {
            name: "Blueprint1-a1b2c3d4".to_string(),
            id: "pkg-1".to_string(),
        }
    }

    fn session() -> VraSession {
        VraSession::new("a.example", "token-a.example")
    }

    #[tokio::test]
    async fn test_export_writes_canonical_archive() {
        let base = tempfile::tempdir().unwrap();
        let workdir = WorkingDirectory::create(base.path(), "run1").unwrap();
        let api = MockVraApi::new();

        let exported = export_package(&api, &session(), &package(), &workdir, &test_config())
            .await
            .unwrap();

        assert_eq!(exported.path, workdir.archive_path());
        assert_eq!(exported.file_count, 2);
        assert_eq!(exported.size_bytes, fs::metadata(&exported.path).unwrap().len());
        assert!(workdir.extraction_dir().join("b").join("c.txt").is_file());

        let counts = api.counts();
        assert_eq!(counts.validate_export, 1);
        assert_eq!(counts.download_package, 1);
    }

    #[tokio::test]
    async fn test_failed_dry_export_stops_before_download() {
        let base = tempfile::tempdir().unwrap();
        let workdir = WorkingDirectory::create(base.path(), "run1").unwrap();
        let api = MockVraApi::new().with_export_status("FAILED");

        let err = export_package(&api, &session(), &package(), &workdir, &test_config())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MigrationError::Validation {
                kind: ValidationKind::Export,
                status: 200,
                ..
            }
        ));
        assert!(err.to_string().contains("FAILED"));
        assert_eq!(api.counts().download_package, 0);
        assert!(!workdir.archive_path().exists());
    }

    #[tokio::test]
    async fn test_rejected_dry_export_is_validation_error() {
        let base = tempfile::tempdir().unwrap();
        let workdir = WorkingDirectory::create(base.path(), "run1").unwrap();
        let api = MockVraApi::new().reject("validate_export", 404, "no such package");

        let err = export_package(&api, &session(), &package(), &workdir, &test_config())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("no such package"));
        assert_eq!(api.counts().download_package, 0);
    }

    #[tokio::test]
    async fn test_warning_status_still_exports() {
        let base = tempfile::tempdir().unwrap();
        let workdir = WorkingDirectory::create(base.path(), "run1").unwrap();
        let api = MockVraApi::new().with_export_status("WARNING");

        let exported = export_package(&api, &session(), &package(), &workdir, &test_config()).await;

        assert!(exported.is_ok());
        assert_eq!(api.counts().download_package, 1);
    }

    #[tokio::test]
    async fn test_corrupt_download_is_export_error() {
        let base = tempfile::tempdir().unwrap();
        let workdir = WorkingDirectory::create(base.path(), "run1").unwrap();
        let api = MockVraApi::new().with_archive(b"not a zip".to_vec());

        let err = export_package(&api, &session(), &package(), &workdir, &test_config())
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Export { .. }));
        assert_eq!(err.stage(), MigrationState::Export);
    }

    #[tokio::test]
    async fn test_undecodable_dry_export_is_export_error() {
        let base = tempfile::tempdir().unwrap();
        let workdir = WorkingDirectory::create(base.path(), "run1").unwrap();
        let api = MockVraApi::new().invalid_response("validate_export");

        let err = export_package(&api, &session(), &package(), &workdir, &test_config())
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Export { .. }));
        assert_eq!(err.status(), None);
        assert!(!err.to_string().contains("HTTP 0"));
        assert_eq!(api.counts().download_package, 0);
    }
}
