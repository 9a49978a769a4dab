//! Integration tests for ConfigManager and the persisted permission memory
//!
//! These tests verify:
//! - Config directory creation
//! - Booth config defaults, save/load round trip and validation
//! - Permission memory persistence through the manager
//! - Error handling for malformed YAML

use camino::Utf8PathBuf;
use my4cuts::ConfigManager;
use my4cuts::models::{BoothConfig, DevicePosition, FlashMode, Resource};
use my4cuts::services::PermissionMemory;
use std::fs;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_dir)
}

#[test]
fn test_config_directory_creation() {
    let (_temp_dir, base) = create_test_config_dir();
    let nested = base.join("My4Cuts Data").join("profiles");

    let manager = ConfigManager::new(&nested).unwrap();

    assert!(nested.exists());
    assert_eq!(manager.config_dir(), nested);
    assert_eq!(
        manager.booth_config_path(),
        nested.join("My4Cuts Config.yaml")
    );
}

#[test]
fn test_load_default_booth_config() {
    let (_temp_dir, config_dir) = create_test_config_dir();
    let manager = ConfigManager::new(&config_dir).unwrap();

    let config = manager.load_booth_config().unwrap();

    assert_eq!(config.booth.splash_delay_ms, 2000);
    assert_eq!(config.booth.countdown_seconds, 3);
    assert_eq!(config.booth.max_selection, 4);
    assert_eq!(config.booth.default_camera, DevicePosition::Back);
}

#[test]
fn test_save_and_load_booth_config() {
    let (_temp_dir, config_dir) = create_test_config_dir();
    let manager = ConfigManager::new(&config_dir).unwrap();

    let mut config = BoothConfig::default();
    config.booth.countdown_seconds = 5;
    config.booth.flash_mode = FlashMode::Off;
    config.booth.countdown_enabled = false;
    manager.save_booth_config(&config).unwrap();

    let loaded = manager.load_booth_config().unwrap();
    assert_eq!(loaded.booth.countdown_seconds, 5);
    assert_eq!(loaded.booth.flash_mode, FlashMode::Off);
    assert!(!loaded.booth.countdown_enabled);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let (_temp_dir, config_dir) = create_test_config_dir();
    let manager = ConfigManager::new(&config_dir).unwrap();
    fs::write(
        manager.booth_config_path(),
        "booth:\n  default_camera: front\n",
    )
    .unwrap();

    let loaded = manager.load_booth_config().unwrap();

    assert_eq!(loaded.booth.default_camera, DevicePosition::Front);
    assert_eq!(loaded.booth.processing_delay_ms, 2000);
    assert!(loaded.booth.countdown_enabled);
}

#[test]
fn test_ensure_booth_config_does_not_overwrite() {
    let (_temp_dir, config_dir) = create_test_config_dir();
    let manager = ConfigManager::new(&config_dir).unwrap();

    manager.ensure_booth_config().unwrap();
    assert!(manager.booth_config_path().exists());

    let mut config = BoothConfig::default();
    config.booth.countdown_seconds = 10;
    manager.save_booth_config(&config).unwrap();
    manager.ensure_booth_config().unwrap();

    assert_eq!(manager.load_booth_config().unwrap().booth.countdown_seconds, 10);
}

#[test]
fn test_invalid_yaml_handling() {
    let (_temp_dir, config_dir) = create_test_config_dir();
    let manager = ConfigManager::new(&config_dir).unwrap();
    fs::write(manager.booth_config_path(), "booth: [unclosed").unwrap();

    assert!(manager.load_booth_config().is_err());
}

#[test]
fn test_permission_memory_persists_through_manager() {
    let (_temp_dir, config_dir) = create_test_config_dir();
    let manager = ConfigManager::new(&config_dir).unwrap();

    let memory = manager.permission_memory().unwrap();
    memory.record_denial(Resource::Camera).unwrap();
    drop(memory);

    let reopened = manager.permission_memory().unwrap();
    assert!(reopened.was_denied(Resource::Camera));
    assert!(!reopened.was_denied(Resource::Library));
    assert_eq!(
        reopened.path(),
        config_dir.join("Permission Memory.yaml")
    );
}
