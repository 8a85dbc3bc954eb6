use tracing::{info, instrument};

use super::CONTENT_MANAGEMENT_API;
use crate::services::client::errors::ClientResult;
use crate::services::client::types::{ContentEntry, Listing, ResponseFormat, VraSession};
use crate::services::client::VraClient;

/// Retrieve the content listing of `session`'s host, at most `limit` entries
#[instrument(skip(client), err)]
pub async fn list_contents_impl(
    client: &VraClient,
    session: &VraSession,
    limit: u32,
) -> ClientResult<Vec<ContentEntry>> {
    info!("Retrieving all content from {}", session.host());

    let url = VraClient::endpoint(
        session.host(),
        &format!("{}/contents?limit={}", CONTENT_MANAGEMENT_API, limit),
    );

    let request = client
        .http_client
        .get(url)
        .headers(session.headers(ResponseFormat::Json)?);

    let listing: Listing<ContentEntry> = client.send_json("list_contents", request).await?;

    info!("Received {} content entries", listing.content.len());
    Ok(listing.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::test_server::{CannedResponse, TestServer};
    use crate::services::client::ClientError;
    use crate::services::config::HttpConfig;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_contents_request() {
        let server = TestServer::start(vec![CannedResponse::json(
            200,
            json!({"content": [{"id": "c-1", "name": "Blueprint1", "contentTypeId": "composite-blueprint"}]}),
        )]);
        let client = VraClient::new(&HttpConfig::default()).unwrap();
        let session = VraSession::new(server.url(), "tok");

        let entries = list_contents_impl(&client, &session, 1000).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Blueprint1");
        let captured = server.finish();
        assert_eq!(captured[0].method, "GET");
        assert_eq!(captured[0].path, "/content-management-service/api/contents?limit=1000");
        assert_eq!(captured[0].header("authorization"), Some("Bearer tok"));
        assert_eq!(captured[0].header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_unparseable_listing_is_invalid_response() {
        let server = TestServer::start(vec![CannedResponse::json(200, json!(["not", "a", "listing"]))]);
        let client = VraClient::new(&HttpConfig::default()).unwrap();
        let session = VraSession::new(server.url(), "tok");

        let err = list_contents_impl(&client, &session, 1000).await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidResponse { .. }));
        server.finish();
    }
}
