//! Azure Blob Storage access
//!
//! Connection string parsing, the `BlobStore` seam the quickstart runs
//! against, and the Azure-backed implementation of it.

pub mod connection;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use connection::{BlobLocation, CredentialKind, StorageConnection};
pub use models::*;
pub use store::{AzureBlobStore, BlobStore};
