//! Package lifecycle operations for the content-management service

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::{debug, info, instrument};

use super::CONTENT_MANAGEMENT_API;
use crate::services::archive::{self, CANONICAL_ARCHIVE_NAME};
use crate::services::client::errors::{ClientError, ClientResult};
use crate::services::client::types::{
    CreatePackageRequest, Listing, OperationReport, PackageEntry, ResponseFormat, VraSession,
};
use crate::services::client::VraClient;

/// Upper bound on the buffer reserved up front from `Content-Length`
const MAX_PREALLOCATION: usize = 64 * 1024 * 1024;

/// Initial download buffer size; the advertised length is not trusted beyond the cap
fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length
        .and_then(|len| usize::try_from(len).ok())
        .map_or(0, |len| len.min(MAX_PREALLOCATION))
}

fn packages_url(session: &VraSession, suffix: &str) -> String {
    VraClient::endpoint(
        session.host(),
        &format!("{}/packages{}", CONTENT_MANAGEMENT_API, suffix),
    )
}

/// Build the multipart body for an archive upload.
///
/// The file is read inside this call and released before the request is sent.
async fn archive_form(operation: &'static str, archive: &Path) -> ClientResult<Form> {
    let data = archive::read_archive(archive)
        .await
        .map_err(|source| ClientError::Archive {
            path: archive.to_path_buf(),
            source,
        })?;

    debug!("{}: attaching {} archive bytes", operation, data.len());

    let file_name = archive
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| CANONICAL_ARCHIVE_NAME.to_string());

    let part = Part::bytes(data)
        .file_name(file_name)
        .mime_str(ResponseFormat::Zip.accept_value())
        .map_err(|e| ClientError::from_reqwest(operation, e))?;

    Ok(Form::new().part("file", part))
}

/// Create a package wrapping the content ids in `request`.
///
/// The service does not return the new package id; callers re-list to find it.
#[instrument(skip(client), err)]
pub async fn create_package_impl(
    client: &VraClient,
    session: &VraSession,
    request: &CreatePackageRequest,
) -> ClientResult<()> {
    info!("Creating package {} containing content...", request.name);

    let builder = client
        .http_client
        .post(packages_url(session, ""))
        .headers(session.headers(ResponseFormat::Json)?)
        .json(request);

    client.send("create_package", builder).await?;
    Ok(())
}

#[instrument(skip(client), err)]
pub async fn list_packages_impl(
    client: &VraClient,
    session: &VraSession,
    limit: u32,
) -> ClientResult<Vec<PackageEntry>> {
    let builder = client
        .http_client
        .get(packages_url(session, &format!("?limit={}", limit)))
        .headers(session.headers(ResponseFormat::Json)?);

    let listing: Listing<PackageEntry> = client.send_json("list_packages", builder).await?;

    debug!("Received {} packages from {}", listing.content.len(), session.host());
    Ok(listing.content)
}

/// Dry export: ask the source appliance whether the package can be exported
#[instrument(skip(client), err)]
pub async fn validate_export_impl(
    client: &VraClient,
    session: &VraSession,
    package_id: &str,
) -> ClientResult<OperationReport> {
    info!("Performing dry export of package {}...", package_id);

    let builder = client
        .http_client
        .get(packages_url(session, &format!("/{}/validate", package_id)))
        .headers(session.headers(ResponseFormat::Json)?);

    client.send_for_report("validate_export", builder).await
}

/// Download the package archive, accumulating the streamed body
#[instrument(skip(client), err)]
pub async fn download_package_impl(
    client: &VraClient,
    session: &VraSession,
    package_id: &str,
) -> ClientResult<Bytes> {
    info!("Exporting package {} from {}", package_id, session.host());

    let builder = client
        .http_client
        .get(packages_url(session, &format!("/{}", package_id)))
        .headers(session.headers(ResponseFormat::Zip)?);

    let response = client.send("download_package", builder).await?;

    let mut buffer = BytesMut::with_capacity(initial_capacity(response.content_length()));

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ClientError::from_reqwest("download_package", e))?;
        buffer.extend_from_slice(&chunk);
    }

    info!("Package {} downloaded: {} bytes", package_id, buffer.len());
    Ok(buffer.freeze())
}

/// Dry import: submit the archive to the destination's validation endpoint
#[instrument(skip(client), err)]
pub async fn validate_import_impl(
    client: &VraClient,
    session: &VraSession,
    archive: &Path,
) -> ClientResult<OperationReport> {
    info!("Performing dry import of package on {}...", session.host());

    let form = archive_form("validate_import", archive).await?;
    let builder = client
        .http_client
        .post(packages_url(session, "/validate"))
        .headers(session.headers(ResponseFormat::Json)?)
        .multipart(form);

    client.send_for_report("validate_import", builder).await
}

/// Import the archive into the destination appliance
#[instrument(skip(client), err)]
pub async fn upload_package_impl(
    client: &VraClient,
    session: &VraSession,
    archive: &Path,
) -> ClientResult<()> {
    info!("Importing package on {}...", session.host());

    let form = archive_form("upload_package", archive).await?;
    let builder = client
        .http_client
        .post(packages_url(session, ""))
        .headers(session.headers(ResponseFormat::Json)?)
        .multipart(form);

    client.send("upload_package", builder).await?;
    Ok(())
}
