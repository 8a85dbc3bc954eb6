//! Import step: dry import, then upload

use std::path::Path;
use tracing::{info, instrument, warn};

use crate::migration::types::MigrationState;
use crate::services::archive;
use crate::services::client::{with_connect_retry, with_transport_retry, VraApi, VraSession};
use crate::services::config::MigrationConfig;
use crate::services::errors::{MigrationError, MigrationResult, ValidationKind};

/// Validate `archive_path` against the destination and import it.
///
/// The upload is skipped when the dry import fails, and is only repeated
/// when the appliance could not be reached at all.
#[instrument(skip(api, session, config), fields(host = %session.host()), err)]
pub async fn import_package(
    api: &dyn VraApi,
    session: &VraSession,
    archive_path: &Path,
    config: &MigrationConfig,
) -> MigrationResult<()> {
    let host = session.host().to_string();

    let size = archive::ensure_archive_ready(archive_path).map_err(|err| MigrationError::Import {
        host: host.clone(),
        reason: err.to_string(),
        status: None,
    })?;
    info!("Importing {} ({} bytes) into {}", archive_path.display(), size, host);

    let report = with_transport_retry(&config.retry, "validate_import", move || {
        api.validate_import(session, archive_path)
    })
    .await
    .map_err(|err| {
        MigrationError::from_client(MigrationState::Import, err, |source| {
            match (source.status(), source.body()) {
                (Some(status), Some(body)) => MigrationError::Validation {
                    kind: ValidationKind::Import,
                    host: host.clone(),
                    status,
                    body: body.to_string(),
                },
                _ => MigrationError::Import {
                    host: host.clone(),
                    reason: source.to_string(),
                    status: None,
                },
            }
        })
    })?;

    if report.is_failed() {
        return Err(MigrationError::Validation {
            kind: ValidationKind::Import,
            host,
            status: report.http_status,
            body: report.body,
        });
    }
    if report.operation_status.is_none() {
        warn!("Dry import on {} returned no operation status, continuing", host);
    }
    info!("Dry import on {} passed", host);

    with_connect_retry(&config.retry, "upload_package", move || {
        api.upload_package(session, archive_path)
    })
    .await
    .map_err(|err| {
        MigrationError::from_client(MigrationState::Import, err, |source| MigrationError::Import {
            host: host.clone(),
            status: source.status(),
            reason: source.to_string(),
        })
    })?;

    info!("Package imported into {}", host);
    Ok(())
}
