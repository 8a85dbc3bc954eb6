use tracing::{info, instrument};

use crate::services::client::errors::{ClientError, ClientResult};
use crate::services::client::types::{Credential, TokenRequest, TokenResponse};
use crate::services::client::VraClient;

/// Identity service path that issues bearer tokens
pub const TOKEN_PATH: &str = "/identity/api/tokens";

/// Request a bearer token for `credential` from the identity service.
///
/// One attempt; a non-success status comes back as `ClientError::Api`.
#[instrument(skip(client, credential), fields(host = %credential.host), err)]
pub async fn create_token_impl(
    client: &VraClient,
    credential: &Credential,
    tenant: &str,
) -> ClientResult<String> {
    info!(
        "Getting authentication token for {} to {}",
        credential.username, credential.host
    );

    let body = TokenRequest {
        username: &credential.username,
        password: credential.secret(),
        tenant,
    };

    let request = client
        .http_client
        .post(VraClient::endpoint(&credential.host, TOKEN_PATH))
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&body);

    let token: TokenResponse = client.send_json("create_token", request).await?;

    if token.id.trim().is_empty() {
        return Err(ClientError::InvalidResponse {
            operation: "create_token",
            message: "identity service returned an empty token".to_string(),
        });
    }

    info!("Authentication token issued for {}", credential.host);
    Ok(token.id)
}
