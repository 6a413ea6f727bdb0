//! The blob storage quickstart
//!
//! Creates a uniquely named container, uploads a small text file, lists the
//! container, downloads the blob next to the source file and removes
//! everything again.

pub mod report;
pub mod runner;

pub use report::{CleanupReport, RunReport};
pub use runner::{Quickstart, RunSettings};

use tracing::info;

use crate::blob::{BlobStore, StorageConnection};
use crate::config::Config;
use crate::error::Result;
use crate::utils::interactive::Pause;

/// Resolve the connection, build a store for it with `connect` and run the
/// quickstart.
///
/// A missing or invalid connection string fails before `connect` is called,
/// so no client exists and nothing goes over the network.
pub async fn execute<S, F>(config: &Config, pause: &dyn Pause, connect: F) -> Result<RunReport>
where
    S: BlobStore,
    F: FnOnce(&StorageConnection) -> Result<S>,
{
    let connection = config.storage_connection()?;
    config.validate()?;

    info!(
        "Running quickstart against account {} ({})",
        connection.account(),
        connection.blob_endpoint()
    );
    let store = connect(&connection)?;

    let quickstart = Quickstart::new(&store, pause, RunSettings::from_config(config));
    quickstart.run().await
}
