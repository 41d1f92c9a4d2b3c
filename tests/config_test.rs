//! 設定ファイルの読み書き

use orgchart_viewer::config::{validate_api_url, Config, DEFAULT_API_URL};
use tempfile::tempdir;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("none.json")).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.api_base_url, DEFAULT_API_URL);
    assert_eq!(config.timeout_seconds, 60);
}

#[test]
fn test_save_and_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set_api_url("https://org.example.com/api/".into()).unwrap();
    config.default_table_id = Some(12);
    config.org_mode = true;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.default_table_id, Some(12));
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"timeout_seconds": 5}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.timeout_seconds, 5);
    assert_eq!(config.api_base_url, DEFAULT_API_URL);
    assert!(!config.org_mode);
}

#[test]
fn test_set_api_url_rejects_other_schemes() {
    let mut config = Config::default();
    assert!(config.set_api_url("ftp://example.com".into()).is_err());
    assert_eq!(config.api_base_url, DEFAULT_API_URL);
}

#[test]
fn test_validate_api_url_leaves_config_untouched() {
    assert_eq!(validate_api_url("  https://org.example.com/ ").unwrap(), "https://org.example.com/");
    assert!(validate_api_url("localhost:5000").is_err());
    assert!(validate_api_url("").is_err());
}
