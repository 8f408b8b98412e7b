// Integration tests for client configuration
// Config file persistence and the environment override

use std::env;
use std::fs;

use bak_clinic::models::settings::AppConfig;
use bak_clinic::scheduling::{DragController, GridGeometry};
use bak_clinic::services::settings::{ConfigService, API_URL_ENV};
use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_settings_persistence() {
    env::remove_var(API_URL_ENV);
    let dir = TempDir::new().unwrap();
    let service = ConfigService::new(dir.path().join("config.toml"));

    let mut config = AppConfig::default();
    config.api_base_url = "https://api.bak.cl".to_string();
    config.dashboard_refresh_secs = 30;
    config.schedule.start_hour = 7;
    config.schedule.end_hour = 20;
    config.schedule.snap_interval_minutes = 30;
    service.save(&config).unwrap();

    let loaded = service.load().unwrap();
    assert_eq!(loaded, config);

    let controller = DragController::from_config(&loaded.schedule);
    assert_eq!(controller.geometry(), &GridGeometry::new(7, 20, 30, 1.0));
    assert_eq!(controller.rooms().len(), 4);
}

#[test]
#[serial]
fn test_env_overrides_base_url() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "api_base_url = \"https://api.bak.cl\"\n").unwrap();

    env::set_var(API_URL_ENV, "http://10.0.0.5:3001/");
    let loaded = ConfigService::new(&path).load();
    env::remove_var(API_URL_ENV);

    assert_eq!(loaded.unwrap().api_base_url, "http://10.0.0.5:3001");
}

#[test]
#[serial]
fn test_invalid_grid_falls_back_to_defaults() {
    env::remove_var(API_URL_ENV);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[schedule]\nstart_hour = 18\nend_hour = 9\n").unwrap();

    let service = ConfigService::new(&path);
    assert!(service.load().is_err());
    assert_eq!(service.load_or_default(), AppConfig::default());
}
