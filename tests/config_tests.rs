//! Integration tests for configuration file loading

use quickblob::blob::PublicAccessLevel;
use quickblob::config::{load_config, load_from_file, Config};
use quickblob::error::QuickblobError;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::test]
async fn test_load_toml_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quickblob.toml");
    fs::write(
        &path,
        r#"
container_prefix = "demo-"
file_content = "Some other text"
local_dir = "/srv/samples"
public_access = "none"
page_size = 100
interactive = false
"#,
    )
    .unwrap();

    let config = load_from_file(&path).await.unwrap();

    assert_eq!(config.container_prefix, "demo-");
    assert_eq!(config.file_content, "Some other text");
    assert_eq!(config.local_dir, Some(PathBuf::from("/srv/samples")));
    assert_eq!(config.public_access, PublicAccessLevel::None);
    assert_eq!(config.page_size, Some(100));
    assert!(!config.interactive);
    // Unset keys keep their defaults
    assert_eq!(config.file_prefix, "QuickStart_");
    config.validate().unwrap();
}

#[tokio::test]
async fn test_load_json_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quickblob.json");
    fs::write(&path, r#"{ "container_prefix": "jsonblobs", "output_json": true }"#).unwrap();

    let config = load_from_file(&path).await.unwrap();

    assert_eq!(config.container_prefix, "jsonblobs");
    assert!(config.output_json);
}

#[tokio::test]
async fn test_unparsable_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "container_prefix = [").unwrap();

    let err = load_from_file(&path).await.unwrap_err();
    assert!(matches!(err, QuickblobError::JsonError(_)));
}

#[tokio::test]
async fn test_explicit_config_path_must_exist() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = load_config(Some(&missing)).await.unwrap_err();
    assert!(matches!(err, QuickblobError::ConfigError(_)));
}

#[test]
fn test_connection_string_is_never_serialized() {
    let mut config = Config::default();
    config.connection_string = Some("AccountName=acct;AccountKey=c2VjcmV0".to_string());

    let rendered = toml::to_string(&config).unwrap();
    assert!(!rendered.contains("AccountKey"));
    assert!(rendered.contains("container_prefix"));
}
