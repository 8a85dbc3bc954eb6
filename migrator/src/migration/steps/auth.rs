//! Authentication step - one bearer token per appliance

use tracing::{info, instrument};

use crate::migration::types::MigrationState;
use crate::services::client::{with_transport_retry, Credential, VraApi, VraSession};
use crate::services::config::MigrationConfig;
use crate::services::errors::{MigrationError, MigrationResult};

/// Obtain a session for `credential.host`.
///
/// `stage` tells errors whether the source or the destination was being authenticated.
#[instrument(skip(api, credential, config), fields(host = %credential.host), err)]
pub async fn authenticate(
    api: &dyn VraApi,
    credential: &Credential,
    config: &MigrationConfig,
    stage: MigrationState,
) -> MigrationResult<VraSession> {
    let tenant = config.tenant.as_str();

    let token = with_transport_retry(&config.retry, "create_token", move || {
        api.create_token(credential, tenant)
    })
    .await
    .map_err(|err| {
        MigrationError::from_client(stage, err, |source| MigrationError::Authentication {
            stage,
            host: credential.host.clone(),
            source,
        })
    })?;

    info!("Authenticated {} against {}", credential.username, credential.host);
    Ok(VraSession::new(&credential.host, token))
}
