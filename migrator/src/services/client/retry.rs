use std::future::Future;
use tracing::warn;

use super::errors::{ClientError, ClientResult};
use crate::services::config::RetryConfig;

async fn retry_while<T, F, Fut>(
    policy: &RetryConfig,
    operation: &str,
    retryable: fn(&ClientError) -> bool,
    mut call: F,
) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let mut retries = 0;

    loop {
        match call().await {
            Err(e) if retryable(&e) && retries < policy.transport_retries => {
                retries += 1;
                warn!(
                    "{} failed with a transport error (retry {}/{}): {}",
                    operation, retries, policy.transport_retries, e
                );
                tokio::time::sleep(policy.transport_backoff * retries).await;
            }
            result => return result,
        }
    }
}

/// Run `call`, repeating it only while it fails at the transport level.
///
/// Answers from the appliance (any HTTP status) are returned as-is; at most
/// `policy.transport_retries` extra attempts are made.
pub async fn with_transport_retry<T, F, Fut>(
    policy: &RetryConfig,
    operation: &str,
    call: F,
) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    retry_while(policy, operation, ClientError::is_transient, call).await
}

/// Like `with_transport_retry`, but only repeats calls that never reached the appliance.
///
/// For requests that must not be applied twice (package creation, import).
pub async fn with_connect_retry<T, F, Fut>(
    policy: &RetryConfig,
    operation: &str,
    call: F,
) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    retry_while(policy, operation, ClientError::is_connect, call).await
}
