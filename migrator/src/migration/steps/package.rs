//! Export package creation on the source appliance

use tracing::{debug, info, instrument, warn};

use crate::migration::types::{ContentItem, MigrationState, Package};
use crate::services::client::{
    with_connect_retry, with_transport_retry, ClientError, CreatePackageRequest, VraApi,
    VraSession,
};
use crate::services::config::MigrationConfig;
use crate::services::errors::{MigrationError, MigrationResult};
use crate::utils::package_name;

fn package_description(content_name: &str) -> String {
    format!("auto generated package containing {}", content_name)
}

/// Create a package holding `content` and return it with the id the service assigned.
///
/// Creation does not return the id, so the package listing is polled by name
/// until the new package shows up or the lookup budget runs out. The create
/// request is never sent twice once it may have reached the appliance.
#[instrument(skip(api, session, config), fields(host = %session.host()), err)]
pub async fn build_export_package(
    api: &dyn VraApi,
    session: &VraSession,
    content: &ContentItem,
    config: &MigrationConfig,
) -> MigrationResult<Package> {
    let request = CreatePackageRequest {
        name: package_name(&content.name),
        description: package_description(&content.name),
        contents: vec![content.id.clone()],
    };
    let host = session.host().to_string();
    let rejected = |source: ClientError| MigrationError::PackageCreation {
        host: host.clone(),
        source,
    };

    let create = &request;
    let unconfirmed = match with_connect_retry(&config.retry, "create_package", move || {
        api.create_package(session, create)
    })
    .await
    {
        Ok(()) => {
            info!("Package {} created", request.name);
            None
        }
        // The request was sent; the listing tells whether it took effect
        Err(err) if err.is_transient() && !err.is_connect() => {
            warn!(
                "No answer to creation of package {}, checking the package listing: {}",
                request.name, err
            );
            Some(err)
        }
        Err(err) => {
            return Err(MigrationError::from_client(
                MigrationState::BuildPackage,
                err,
                rejected,
            ))
        }
    };

    let attempts = config.retry.package_lookup_attempts;
    let limit = config.listing.package_limit;

    for attempt in 1..=attempts {
        if attempt > 1 {
            tokio::time::sleep(config.retry.lookup_delay(attempt - 1)).await;
        }

        let packages = with_transport_retry(&config.retry, "list_packages", move || {
            api.list_packages(session, limit)
        })
        .await
        .map_err(|err| MigrationError::from_client(MigrationState::BuildPackage, err, rejected))?;

        if let Some(entry) = packages.iter().find(|p| p.name == request.name) {
            info!("Package id resolved: {} ({})", entry.name, entry.id);
            return Ok(Package {
                name: entry.name.clone(),
                id: entry.id.clone(),
            });
        }

        debug!(
            "Package {} not listed yet ({} of {} lookups)",
            request.name, attempt, attempts
        );
    }

    warn!("Package {} never appeared in the listing", request.name);
    match unconfirmed {
        Some(source) => Err(MigrationError::Transport {
            stage: MigrationState::BuildPackage,
            source,
        }),
        None => Err(MigrationError::PackageNotFound {
            host,
            name: request.name,
            attempts,
        }),
    }
}
