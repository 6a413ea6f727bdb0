//! The quickstart sequence: create, upload, list, download, clean up

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::blob::{BlobStore, PublicAccessLevel};
use crate::config::Config;
use crate::error::{QuickblobError, Result};
use crate::quickstart::report::RunReport;
use crate::utils::interactive::Pause;
use crate::utils::naming;

/// Inputs of a single run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub local_dir: PathBuf,
    pub container_prefix: String,
    pub file_prefix: String,
    pub file_content: String,
    pub public_access: PublicAccessLevel,
    pub page_size: Option<u32>,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            local_dir: config.resolve_local_dir(),
            container_prefix: config.container_prefix.clone(),
            file_prefix: config.file_prefix.clone(),
            file_content: config.file_content.clone(),
            public_access: config.public_access,
            page_size: config.page_size,
        }
    }
}

pub struct Quickstart<'a> {
    store: &'a dyn BlobStore,
    pause: &'a dyn Pause,
    settings: RunSettings,
}

impl<'a> Quickstart<'a> {
    pub fn new(store: &'a dyn BlobStore, pause: &'a dyn Pause, settings: RunSettings) -> Self {
        Self {
            store,
            pause,
            settings,
        }
    }

    /// Run every step, then clean up.
    ///
    /// A service error ends the steps early but still yields a report.
    /// Any other error is returned, after cleanup has run.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();
        let mut held_error = None;

        match self.process(&mut report).await {
            Ok(()) => {}
            Err(QuickblobError::ServiceError(message)) => {
                warn!("Service error during quickstart: {}", message);
                println!("Error returned from the service: {message}");
                report.service_error = Some(message);
            }
            Err(e) => {
                error!("Quickstart step failed: {}", e);
                held_error = Some(e);
            }
        }

        let cleanup_result = self.clean_up(&mut report).await;

        if let Some(e) = held_error {
            return Err(e);
        }
        cleanup_result?;

        Ok(report)
    }

    async fn process(&self, report: &mut RunReport) -> Result<()> {
        let container = naming::container_name(&self.settings.container_prefix);
        report.container = Some(container.clone());
        self.store
            .create_container(&container, self.settings.public_access)
            .await?;
        println!("Created container '{container}'");
        println!();

        let blob_name = naming::source_file_name(&self.settings.file_prefix);
        tokio::fs::create_dir_all(&self.settings.local_dir).await?;
        let source = self.settings.local_dir.join(&blob_name);
        report.source_file = Some(source.clone());
        report.blob_name = Some(blob_name.clone());
        tokio::fs::write(&source, &self.settings.file_content).await?;

        println!("Temp file = {}", source.display());
        println!("Uploading to Blob storage as blob '{blob_name}'");
        println!();
        let uploaded = self.store.upload_file(&container, &blob_name, &source).await?;
        debug!("Upload etag {}", uploaded.etag);
        report.uploaded = Some(uploaded);

        println!("Listing blobs in container.");
        let pages = self
            .store
            .list_blobs(&container, self.settings.page_size)
            .await?;
        report.pages = pages.len();
        for page in pages {
            if !page.is_last() {
                debug!("More blobs follow, continuation token {:?}", page.continuation);
            }
            for entry in page.entries {
                println!("{}", entry.url);
                report.listed.push(entry);
            }
        }
        println!();

        let destination = naming::downloaded_path(&source);
        report.destination_file = Some(destination.clone());
        println!("Downloading blob to {}", destination.display());
        println!();
        let bytes = self
            .store
            .download_to_file(&container, &blob_name, &destination)
            .await?;
        report.downloaded_bytes = Some(bytes);

        let matches = files_match(&source, &destination).await?;
        report.content_matches = Some(matches);
        if matches {
            println!("Downloaded file matches the uploaded file ({bytes} bytes)");
        } else {
            warn!("Downloaded file {} differs from {}", destination.display(), source.display());
            println!("Downloaded file differs from the uploaded file");
        }
        println!();

        Ok(())
    }

    /// Delete the container and both local files. Every step is attempted;
    /// the first failure is returned afterwards.
    async fn clean_up(&self, report: &mut RunReport) -> Result<()> {
        if let Err(e) = self
            .pause
            .wait("Press any key to delete the sample files and example container.")
            .await
        {
            warn!("Continuing with cleanup: {}", e);
        }

        let mut first_error = None;

        println!("Deleting the container and any blobs it contains");
        if let Some(container) = report.container.clone() {
            match self.store.delete_container_if_exists(&container).await {
                Ok(deleted) => report.cleanup.container_deleted = deleted,
                Err(e) => {
                    error!("Failed to delete container {}: {}", container, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        println!("Deleting the local source file and local downloaded files");
        println!();
        for path in report.local_files() {
            match remove_file_if_exists(&path).await {
                Ok(true) => report.cleanup.removed_files.push(path),
                Ok(false) => debug!("{} was never created", path.display()),
                Err(e) => {
                    error!("Failed to delete {}: {}", path.display(), e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        info!(
            "Cleanup finished (container deleted: {}, files removed: {})",
            report.cleanup.container_deleted,
            report.cleanup.removed_files.len()
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn files_match(left: &Path, right: &Path) -> Result<bool> {
    let left = tokio::fs::read(left).await?;
    let right = tokio::fs::read(right).await?;
    Ok(left == right)
}

async fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
