//! Configuration settings management
//!
//! This module handles loading configuration from multiple sources and
//! validating it before the sample runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::blob::{PublicAccessLevel, StorageConnection};
use crate::error::{QuickblobError, Result};
use crate::utils::naming::{validate_container_prefix, validate_file_prefix};

/// Environment variable holding the storage connection string
pub const CONNECTION_STRING_ENV: &str = "storageconnectionstring";
/// Conventional Azure variable, consulted when the one above is not set
pub const FALLBACK_CONNECTION_STRING_ENV: &str = "AZURE_STORAGE_CONNECTION_STRING";

/// Upper bound the service accepts for `maxresults`
pub const MAX_PAGE_SIZE: u32 = 5000;

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    #[serde(skip_serializing)]
    pub connection_string: Option<String>,
    pub container_prefix: String,
    pub file_prefix: String,
    pub file_content: String,
    pub local_dir: Option<PathBuf>,
    pub public_access: PublicAccessLevel,
    pub page_size: Option<u32>,
    pub interactive: bool,
    pub output_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            connection_string: None,
            container_prefix: "quickstartblobs".to_string(),
            file_prefix: "QuickStart_".to_string(),
            file_content: "Hello, World!".to_string(),
            local_dir: None,
            public_access: PublicAccessLevel::Blob,
            page_size: None,
            interactive: true,
            output_json: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("debug", &self.debug)
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("container_prefix", &self.container_prefix)
            .field("file_prefix", &self.file_prefix)
            .field("file_content", &self.file_content)
            .field("local_dir", &self.local_dir)
            .field("public_access", &self.public_access)
            .field("page_size", &self.page_size)
            .field("interactive", &self.interactive)
            .field("output_json", &self.output_json)
            .finish()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        validate_container_prefix(&self.container_prefix)?;
        validate_file_prefix(&self.file_prefix)?;

        if let Some(size) = self.page_size {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(QuickblobError::config(format!(
                    "Page size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
                )));
            }
        }

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        // Use XDG Base Directory specification on Linux and macOS
        // On Windows, use the platform-appropriate config directory
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            use std::env;
            let config_dir = if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
                PathBuf::from(xdg_config_home)
            } else {
                let home_dir = env::var("HOME")
                    .map_err(|_| QuickblobError::config("HOME environment variable not set"))?;
                PathBuf::from(home_dir).join(".config")
            };
            Ok(config_dir.join("quickblob").join("quickblob.toml"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            let config_dir = dirs::config_dir()
                .ok_or_else(|| QuickblobError::config("Unable to determine config directory"))?;
            Ok(config_dir.join("quickblob").join("quickblob.toml"))
        }
    }

    /// Parse the configured connection string.
    ///
    /// No network access happens here; a failure means the sample must stop
    /// before any client is created.
    pub fn storage_connection(&self) -> Result<StorageConnection> {
        match self.connection_string.as_deref() {
            Some(value) if !value.trim().is_empty() => StorageConnection::parse(value),
            _ => Err(QuickblobError::MissingConnectionString),
        }
    }

    /// Directory the sample file is written to: the configured directory,
    /// otherwise the user's documents folder, home directory or temp dir.
    pub fn resolve_local_dir(&self) -> PathBuf {
        if let Some(dir) = &self.local_dir {
            return dir.clone();
        }

        dirs::document_dir()
            .filter(|dir| dir.is_dir())
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Load configuration from multiple sources with priority order:
/// 1. Command-line flags (applied by the caller)
/// 2. Environment variables
/// 3. Configuration file
/// 4. Default values
///
/// An explicit path must exist; the default path is optional.
pub async fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(QuickblobError::config(format!(
                    "Configuration file {} does not exist",
                    path.display()
                )));
            }
            config = load_from_file(path).await?;
        }
        None => {
            let config_path = Config::get_config_path()?;
            if config_path.exists() {
                config = load_from_file(&config_path).await?;
            }
        }
    }

    load_from_env(&mut config);

    Ok(config)
}

pub async fn load_from_file(path: &Path) -> Result<Config> {
    debug!("Loading configuration from {}", path.display());
    let contents = tokio::fs::read_to_string(path).await?;

    // Try to parse as TOML first, then JSON as fallback
    if let Ok(config) = toml::from_str::<Config>(&contents) {
        return Ok(config);
    }

    let config = serde_json::from_str::<Config>(&contents)?;
    Ok(config)
}

pub fn load_from_env(config: &mut Config) {
    apply_env(config, |key| std::env::var(key).ok());
}

/// Apply environment overrides using `lookup` to read variables
pub fn apply_env<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("DEBUG") {
        config.debug = value.to_lowercase() == "true" || value == "1";
    }

    if let Some(value) = lookup(CONNECTION_STRING_ENV).or_else(|| lookup(FALLBACK_CONNECTION_STRING_ENV)) {
        config.connection_string = Some(value);
    }

    if let Some(value) = lookup("QUICKBLOB_CONTAINER_PREFIX") {
        config.container_prefix = value;
    }

    if let Some(value) = lookup("QUICKBLOB_LOCAL_DIR") {
        config.local_dir = Some(PathBuf::from(value));
    }

    if let Some(value) = lookup("QUICKBLOB_PAGE_SIZE") {
        match value.parse::<u32>() {
            Ok(size) => config.page_size = Some(size),
            Err(_) => warn!("Ignoring QUICKBLOB_PAGE_SIZE={}: not a number", value),
        }
    }

    if let Some(value) = lookup("QUICKBLOB_PUBLIC_ACCESS") {
        match value.parse::<PublicAccessLevel>() {
            Ok(level) => config.public_access = level,
            Err(e) => warn!("Ignoring QUICKBLOB_PUBLIC_ACCESS: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_sample() {
        let config = Config::default();
        assert_eq!(config.container_prefix, "quickstartblobs");
        assert_eq!(config.file_prefix, "QuickStart_");
        assert_eq!(config.file_content, "Hello, World!");
        assert_eq!(config.public_access, PublicAccessLevel::Blob);
        assert!(config.interactive);
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env(
            &mut config,
            env_of(&[
                ("storageconnectionstring", "UseDevelopmentStorage=true"),
                ("AZURE_STORAGE_CONNECTION_STRING", "ignored"),
                ("DEBUG", "1"),
                ("QUICKBLOB_CONTAINER_PREFIX", "demo"),
                ("QUICKBLOB_LOCAL_DIR", "/tmp/quickblob"),
                ("QUICKBLOB_PAGE_SIZE", "2"),
                ("QUICKBLOB_PUBLIC_ACCESS", "none"),
            ]),
        );

        assert!(config.debug);
        assert_eq!(config.connection_string.as_deref(), Some("UseDevelopmentStorage=true"));
        assert_eq!(config.container_prefix, "demo");
        assert_eq!(config.local_dir, Some(PathBuf::from("/tmp/quickblob")));
        assert_eq!(config.page_size, Some(2));
        assert_eq!(config.public_access, PublicAccessLevel::None);
    }

    #[test]
    fn test_fallback_connection_string_env() {
        let mut config = Config::default();
        apply_env(
            &mut config,
            env_of(&[("AZURE_STORAGE_CONNECTION_STRING", "UseDevelopmentStorage=true")]),
        );
        assert_eq!(config.connection_string.as_deref(), Some("UseDevelopmentStorage=true"));
    }

    #[test]
    fn test_unparsable_env_values_are_ignored() {
        let mut config = Config::default();
        apply_env(
            &mut config,
            env_of(&[("QUICKBLOB_PAGE_SIZE", "lots"), ("QUICKBLOB_PUBLIC_ACCESS", "everyone")]),
        );
        assert_eq!(config.page_size, None);
        assert_eq!(config.public_access, PublicAccessLevel::Blob);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.page_size = Some(0);
        assert!(config.validate().is_err());

        config.page_size = Some(MAX_PAGE_SIZE + 1);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.container_prefix = "Not_Valid".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.file_prefix = "../".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_connection_requires_value() {
        let mut config = Config::default();
        assert!(matches!(
            config.storage_connection(),
            Err(QuickblobError::MissingConnectionString)
        ));

        config.connection_string = Some("  ".to_string());
        assert!(matches!(
            config.storage_connection(),
            Err(QuickblobError::MissingConnectionString)
        ));

        config.connection_string = Some("garbage".to_string());
        assert!(matches!(
            config.storage_connection(),
            Err(QuickblobError::InvalidConnectionString { .. })
        ));

        config.connection_string = Some("UseDevelopmentStorage=true".to_string());
        assert_eq!(config.storage_connection().unwrap().account(), "devstoreaccount1");
    }

    #[test]
    fn test_debug_redacts_connection_string() {
        let mut config = Config::default();
        config.connection_string = Some("AccountName=acct;AccountKey=secret".to_string());
        let rendered = format!("{config:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_resolve_local_dir_prefers_configured() {
        let mut config = Config::default();
        config.local_dir = Some(PathBuf::from("/data/samples"));
        assert_eq!(config.resolve_local_dir(), PathBuf::from("/data/samples"));

        config.local_dir = None;
        assert!(!config.resolve_local_dir().as_os_str().is_empty());
    }
}
