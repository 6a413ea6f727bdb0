//! quickblob - Azure Blob Storage quickstart
//!
//! Parses a storage connection string, creates a container, uploads a file,
//! lists the container, downloads the file again and cleans everything up.

pub mod blob;
pub mod cli;
pub mod config;
pub mod error;
pub mod quickstart;
pub mod utils;

// Re-export commonly used types
pub use error::{QuickblobError, Result};
