//! Data models for blob storage operations
//!
//! These are the values exchanged through the `BlobStore` seam. They carry
//! only what the quickstart prints or verifies, not the full SDK responses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QuickblobError, Result};

/// Anonymous read access granted on a new container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicAccessLevel {
    /// Private container, no anonymous access
    None,
    /// Anonymous read access to blobs only
    #[default]
    Blob,
    /// Anonymous read access to blobs and container listing
    Container,
}

impl FromStr for PublicAccessLevel {
    type Err = QuickblobError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" | "private" => Ok(Self::None),
            "blob" => Ok(Self::Blob),
            "container" => Ok(Self::Container),
            other => Err(QuickblobError::invalid_argument(format!(
                "Unknown public access level '{other}' (expected none, blob or container)"
            ))),
        }
    }
}

impl fmt::Display for PublicAccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Blob => "blob",
            Self::Container => "container",
        };
        f.write_str(s)
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedBlob {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub etag: String,
}

/// One blob as returned by a listing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobEntry {
    pub name: String,
    pub url: String,
    pub size: u64,
}

/// One page of a listing, with the continuation token the service
/// returned alongside it (`None` on the last page)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlobPage {
    pub entries: Vec<BlobEntry>,
    pub continuation: Option<String>,
}

impl BlobPage {
    /// Whether the service reported no further pages after this one
    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }
}
