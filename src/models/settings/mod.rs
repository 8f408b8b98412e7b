// Settings module
// Client configuration persisted as TOML in the platform config directory

use serde::{Deserialize, Serialize};

/// Operating rooms shown as grid columns when the config does not list any
pub const DEFAULT_OPERATING_ROOMS: [&str; 4] = ["Pabellón 1", "Pabellón 2", "Pabellón 3", "Emergencias"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Dashboard auto-refresh period
    pub dashboard_refresh_secs: u64,
    /// Session token re-validation period
    pub session_check_secs: u64,
    pub schedule: ScheduleConfig,
}

/// Layout of the surgery scheduling grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub start_hour: u32,
    pub end_hour: u32,
    pub snap_interval_minutes: u32,
    pub pixels_per_minute: f32,
    pub operating_rooms: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".to_string(),
            request_timeout_secs: 20,
            dashboard_refresh_secs: 10,
            session_check_secs: 60,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 24,
            snap_interval_minutes: 15,
            pixels_per_minute: 1.0,
            operating_rooms: DEFAULT_OPERATING_ROOMS
                .iter()
                .map(|room| room.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err("API base URL must start with http:// or https://".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be at least one second".to_string());
        }

        if self.dashboard_refresh_secs == 0 || self.session_check_secs == 0 {
            return Err("Polling intervals must be at least one second".to_string());
        }

        self.schedule.validate()
    }

    /// Base URL with any trailing slash removed
    pub fn normalized_base_url(&self) -> String {
        self.api_base_url.trim().trim_end_matches('/').to_string()
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.end_hour > 24 || self.start_hour >= self.end_hour {
            return Err("Grid hours must satisfy start < end <= 24".to_string());
        }

        if self.snap_interval_minutes == 0 || 60 % self.snap_interval_minutes != 0 {
            return Err("Snap interval must divide an hour evenly".to_string());
        }

        if self.pixels_per_minute <= 0.0 {
            return Err("Grid scale must be positive".to_string());
        }

        if self.operating_rooms.is_empty() {
            return Err("At least one operating room is required".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_grid_hours() {
        let mut config = AppConfig::default();
        config.schedule.start_hour = 20;
        config.schedule.end_hour = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_uneven_snap_interval() {
        let mut config = AppConfig::default();
        config.schedule.snap_interval_minutes = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("api_base_url = \"https://api.bak.cl/\"").unwrap();
        assert_eq!(config.normalized_base_url(), "https://api.bak.cl");
        assert_eq!(config.dashboard_refresh_secs, 10);
        assert_eq!(config.schedule.operating_rooms.len(), 4);
    }
}
