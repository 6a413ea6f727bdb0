//! What a quickstart run did
//!
//! The report doubles as the run state: resource names and paths are
//! recorded before the resource is created, so cleanup sees everything a
//! failed step may have left behind.

use serde::Serialize;
use std::path::PathBuf;

use crate::blob::{BlobEntry, UploadedBlob};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupReport {
    /// The container existed and was deleted
    pub container_deleted: bool,
    /// Local files that existed and were removed
    pub removed_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub container: Option<String>,
    pub blob_name: Option<String>,
    pub source_file: Option<PathBuf>,
    pub destination_file: Option<PathBuf>,
    pub uploaded: Option<UploadedBlob>,
    pub listed: Vec<BlobEntry>,
    pub pages: usize,
    pub downloaded_bytes: Option<u64>,
    pub content_matches: Option<bool>,
    /// Message of the service error that ended the run early, if any
    pub service_error: Option<String>,
    pub cleanup: CleanupReport,
}

impl RunReport {
    /// Every step ran and the downloaded file matched the upload
    pub fn succeeded(&self) -> bool {
        self.service_error.is_none() && self.content_matches == Some(true)
    }

    /// The uploaded blob showed up in the listing
    pub fn blob_listed(&self) -> bool {
        match &self.blob_name {
            Some(name) => self.listed.iter().any(|entry| &entry.name == name),
            None => false,
        }
    }

    /// Local files the run created
    pub fn local_files(&self) -> Vec<PathBuf> {
        [&self.source_file, &self.destination_file]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_listed() {
        let mut report = RunReport {
            blob_name: Some("QuickStart_1.txt".to_string()),
            ..Default::default()
        };
        assert!(!report.blob_listed());

        report.listed.push(BlobEntry {
            name: "QuickStart_1.txt".to_string(),
            url: "https://acct.blob.core.windows.net/c/QuickStart_1.txt".to_string(),
            size: 13,
        });
        assert!(report.blob_listed());
    }

    #[test]
    fn test_succeeded_requires_matching_download() {
        let mut report = RunReport::default();
        assert!(!report.succeeded());

        report.content_matches = Some(true);
        assert!(report.succeeded());

        report.service_error = Some("boom".to_string());
        assert!(!report.succeeded());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = RunReport {
            container: Some("quickstartblobs-x".to_string()),
            source_file: Some(PathBuf::from("/tmp/a.txt")),
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["container"], "quickstartblobs-x");
        assert_eq!(json["source_file"], "/tmp/a.txt");
        assert_eq!(json["cleanup"]["container_deleted"], false);
        assert_eq!(report.local_files(), vec![PathBuf::from("/tmp/a.txt")]);
    }
}
