//! Container, blob and local file naming
//!
//! Containers get a UUID suffix so repeated runs never collide. The local
//! file name doubles as the blob name.

use regex::Regex;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{QuickblobError, Result};

/// Length of a hyphenated UUID
const UUID_LEN: usize = 36;
const MIN_CONTAINER_NAME_LEN: usize = 3;
const MAX_CONTAINER_NAME_LEN: usize = 63;
const SOURCE_EXTENSION: &str = ".txt";
const DOWNLOADED_SUFFIX: &str = "_DOWNLOADED.txt";

/// Check Azure container naming rules: 3-63 characters, lowercase letters,
/// digits and single hyphens, starting and ending with a letter or digit.
pub fn validate_container_name(name: &str) -> Result<()> {
    if name.len() < MIN_CONTAINER_NAME_LEN || name.len() > MAX_CONTAINER_NAME_LEN {
        return Err(QuickblobError::invalid_argument(format!(
            "Container name '{name}' must be between {MIN_CONTAINER_NAME_LEN} and {MAX_CONTAINER_NAME_LEN} characters"
        )));
    }

    let re = Regex::new(r"^[a-z0-9](?:[a-z0-9]|-[a-z0-9])*$")?;
    if !re.is_match(name) {
        return Err(QuickblobError::invalid_argument(format!(
            "Container name '{name}' may only contain lowercase letters, digits and single hyphens, \
             and must start and end with a letter or digit"
        )));
    }

    Ok(())
}

/// Check that a prefix still yields a valid container name once a UUID is
/// appended to it
pub fn validate_container_prefix(prefix: &str) -> Result<()> {
    if prefix.len() + UUID_LEN > MAX_CONTAINER_NAME_LEN {
        return Err(QuickblobError::config(format!(
            "Container prefix '{prefix}' is too long; at most {} characters are allowed",
            MAX_CONTAINER_NAME_LEN - UUID_LEN
        )));
    }

    let sample = container_name_with(prefix, Uuid::nil());
    validate_container_name(&sample).map_err(|e| {
        QuickblobError::config(format!("Container prefix '{prefix}' is not usable: {e}"))
    })
}

/// Check that a file prefix is a plain file name fragment
pub fn validate_file_prefix(prefix: &str) -> Result<()> {
    if prefix.trim().is_empty() {
        return Err(QuickblobError::config("File prefix cannot be empty"));
    }
    if prefix.contains(['/', '\\']) || prefix.contains("..") {
        return Err(QuickblobError::config(format!(
            "File prefix '{prefix}' must not contain path separators"
        )));
    }
    Ok(())
}

/// New unique container name, e.g. `quickstartblobs1b4e28ba-2fa1-11d2-883f-0016d3cca427`
pub fn container_name(prefix: &str) -> String {
    container_name_with(prefix, Uuid::new_v4())
}

fn container_name_with(prefix: &str, id: Uuid) -> String {
    format!("{}{}", prefix, id.hyphenated())
}

/// New unique local file name, also used as the blob name
pub fn source_file_name(prefix: &str) -> String {
    format!("{}{}{}", prefix, Uuid::new_v4().hyphenated(), SOURCE_EXTENSION)
}

/// Sibling path the blob is downloaded to: `name.txt` becomes
/// `name_DOWNLOADED.txt`
pub fn downloaded_path(source: &Path) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let downloaded = match file_name.strip_suffix(SOURCE_EXTENSION) {
        Some(stem) => format!("{stem}{DOWNLOADED_SUFFIX}"),
        None => format!("{file_name}{DOWNLOADED_SUFFIX}"),
    };

    source.with_file_name(downloaded)
}
