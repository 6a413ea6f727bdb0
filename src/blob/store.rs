//! Blob store abstraction and its Azure implementation

use async_trait::async_trait;
use azure_core::error::ErrorKind;
use azure_core::StatusCode;
use azure_storage_blobs::container::PublicAccess;
use azure_storage_blobs::prelude::*;
use futures::TryStreamExt;
use std::num::NonZeroU32;
use std::path::Path;
use tracing::{debug, info};

use crate::blob::connection::StorageConnection;
use crate::blob::models::{BlobEntry, BlobPage, PublicAccessLevel, UploadedBlob};
use crate::error::{QuickblobError, Result};

/// Operations the quickstart performs against blob storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Create a container with the given anonymous access level
    async fn create_container(&self, container: &str, access: PublicAccessLevel) -> Result<()>;

    /// Delete a container and every blob in it. Returns `false` when the
    /// container did not exist.
    async fn delete_container_if_exists(&self, container: &str) -> Result<bool>;

    /// Upload a local file as a block blob
    async fn upload_file(&self, container: &str, blob: &str, source: &Path) -> Result<UploadedBlob>;

    /// List every blob in the container, one `BlobPage` per service response
    async fn list_blobs(&self, container: &str, page_size: Option<u32>) -> Result<Vec<BlobPage>>;

    /// Download a blob into `destination`, replacing any existing file.
    /// Returns the number of bytes written.
    async fn download_to_file(&self, container: &str, blob: &str, destination: &Path) -> Result<u64>;
}

/// `BlobStore` backed by Azure Blob Storage
pub struct AzureBlobStore {
    service: BlobServiceClient,
    account: String,
}

impl AzureBlobStore {
    /// Create a store for the given connection
    pub fn new(connection: &StorageConnection) -> Result<Self> {
        debug!(
            "Using blob endpoint {} ({:?} credentials)",
            connection.blob_endpoint(),
            connection.credential_kind()
        );
        Ok(Self {
            service: connection.client_builder().blob_service_client(),
            account: connection.account().to_string(),
        })
    }

    /// Get the storage account name
    pub fn account(&self) -> &str {
        &self.account
    }
}

fn is_not_found(error: &azure_core::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::HttpResponse {
            status: StatusCode::NotFound,
            ..
        }
    )
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn create_container(&self, container: &str, access: PublicAccessLevel) -> Result<()> {
        let public_access = match access {
            PublicAccessLevel::None => PublicAccess::None,
            PublicAccessLevel::Blob => PublicAccess::Blob,
            PublicAccessLevel::Container => PublicAccess::Container,
        };

        self.service
            .container_client(container)
            .create()
            .public_access(public_access)
            .await
            .map_err(|e| QuickblobError::service(format!("Failed to create container '{container}': {e}")))?;

        info!("Created container {} with {} access", container, access);
        Ok(())
    }

    async fn delete_container_if_exists(&self, container: &str) -> Result<bool> {
        match self.service.container_client(container).delete().await {
            Ok(_) => {
                info!("Deleted container {}", container);
                Ok(true)
            }
            Err(e) if is_not_found(&e) => {
                debug!("Container {} did not exist", container);
                Ok(false)
            }
            Err(e) => Err(QuickblobError::service(format!(
                "Failed to delete container '{container}': {e}"
            ))),
        }
    }

    async fn upload_file(&self, container: &str, blob: &str, source: &Path) -> Result<UploadedBlob> {
        let content = tokio::fs::read(source).await?;
        let size = content.len() as u64;
        let content_type = mime_guess::from_path(blob)
            .first_or_octet_stream()
            .to_string();

        let response = self
            .service
            .container_client(container)
            .blob_client(blob)
            .put_block_blob(content)
            .content_type(content_type.clone())
            .await
            .map_err(|e| QuickblobError::service(format!("Failed to upload blob: {e}")))?;

        info!("Uploaded {} bytes to {}/{}", size, container, blob);
        Ok(UploadedBlob {
            name: blob.to_string(),
            size,
            content_type,
            etag: response.etag.to_string(),
        })
    }

    async fn list_blobs(&self, container: &str, page_size: Option<u32>) -> Result<Vec<BlobPage>> {
        let container_client = self.service.container_client(container);

        let mut list_builder = container_client.list_blobs();
        if let Some(size) = page_size.and_then(NonZeroU32::new) {
            list_builder = list_builder.max_results(size);
        }

        // The SDK stream follows NextMarker until the service stops returning one
        let mut stream = list_builder.into_stream();
        let mut pages = Vec::new();

        while let Some(page) = stream
            .try_next()
            .await
            .map_err(|e| QuickblobError::service(format!("Failed to list blobs: {e}")))?
        {
            let mut entries = Vec::new();
            for blob_item in page.blobs.blobs() {
                let url = container_client
                    .blob_client(&blob_item.name)
                    .url()
                    .map_err(|e| QuickblobError::service(format!("Failed to build blob URL: {e}")))?;
                entries.push(BlobEntry {
                    name: blob_item.name.clone(),
                    url: url.to_string(),
                    size: blob_item.properties.content_length,
                });
            }

            let continuation = page.next_marker.as_ref().map(|m| m.as_str().to_string());
            debug!(
                "Listed page {} of {} with {} blobs (more: {})",
                pages.len() + 1,
                container,
                entries.len(),
                continuation.is_some()
            );
            pages.push(BlobPage {
                entries,
                continuation,
            });
        }

        Ok(pages)
    }

    async fn download_to_file(&self, container: &str, blob: &str, destination: &Path) -> Result<u64> {
        let blob_client = self.service.container_client(container).blob_client(blob);

        let properties = blob_client
            .get_properties()
            .await
            .map_err(|e| QuickblobError::service(format!("Failed to get blob properties: {e}")))?;

        // get_content() fails with 416 Range Not Satisfiable for 0-byte blobs
        let content = if properties.blob.properties.content_length == 0 {
            Vec::new()
        } else {
            blob_client
                .get_content()
                .await
                .map_err(|e| QuickblobError::service(format!("Failed to download blob: {e}")))?
        };

        tokio::fs::write(destination, &content).await?;
        info!("Downloaded {} bytes to {}", content.len(), destination.display());
        Ok(content.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_store_for_emulator() {
        let store = AzureBlobStore::new(&StorageConnection::emulator()).unwrap();
        assert_eq!(store.account(), "devstoreaccount1");
    }

    fn http_error(status: StatusCode, message: &'static str) -> azure_core::Error {
        azure_core::Error::message(
            ErrorKind::HttpResponse {
                status,
                error_code: None,
            },
            message,
        )
    }

    #[test]
    fn test_not_found_status_is_not_found() {
        let err = http_error(StatusCode::NotFound, "The specified container does not exist.");
        assert!(is_not_found(&err));
    }

    #[test]
    fn test_not_found_ignores_message_text() {
        let err = http_error(
            StatusCode::Conflict,
            "The specified container is being deleted. RequestId:7d3f4041-a404-4e1e-8404-000000000404",
        );
        assert!(!is_not_found(&err));

        let err = http_error(StatusCode::Forbidden, "404 not found");
        assert!(!is_not_found(&err));

        let err = azure_core::Error::message(ErrorKind::Io, "container not found");
        assert!(!is_not_found(&err));
    }
}
