//! Content resolution step

use tracing::{info, instrument};

use crate::migration::types::{ContentItem, MigrationState};
use crate::services::client::{with_transport_retry, ContentEntry, VraApi, VraSession};
use crate::services::config::MigrationConfig;
use crate::services::errors::{MigrationError, MigrationResult};

/// First listing entry whose name equals `content_name` exactly (case-sensitive)
pub fn find_content<'a>(entries: &'a [ContentEntry], content_name: &str) -> Option<&'a ContentEntry> {
    entries.iter().find(|entry| entry.name == content_name)
}

/// Look up `content_name` in the source appliance's content listing
#[instrument(skip(api, config), err)]
pub async fn resolve_content(
    api: &dyn VraApi,
    session: &VraSession,
    content_name: &str,
    config: &MigrationConfig,
) -> MigrationResult<ContentItem> {
    let limit = config.listing.content_limit;

    let entries = with_transport_retry(&config.retry, "list_contents", move || {
        api.list_contents(session, limit)
    })
    .await
    .map_err(|err| {
        MigrationError::from_client(MigrationState::ResolveContent, err, |source| {
            MigrationError::ContentLookup {
                host: session.host().to_string(),
                source,
            }
        })
    })?;

    info!("Searching {} content entries for '{}'", entries.len(), content_name);

    match find_content(&entries, content_name) {
        Some(entry) => {
            info!("Content found: {} ({})", entry.name, entry.id);
            Ok(ContentItem {
                name: entry.name.clone(),
                id: entry.id.clone(),
            })
        }
        None => Err(MigrationError::ContentNotFound {
            host: session.host().to_string(),
            name: content_name.to_string(),
        }),
    }
}
