//! Startup configuration for the device layer.
//!
//! Every field has a default, so an empty JSON object (or no file at all) yields a
//! platform-default window and the usual controller deadzones.

use std::fs;
use std::path::Path;

use glam::IVec2;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_TITLE: &str = "FPI";

/// Trigger activation threshold used by common controller drivers (30 of 255).
pub const DEFAULT_TRIGGER_THRESHOLD: f32 = 30.0 / 255.0;
pub const DEFAULT_LEFT_STICK_DEADZONE: f32 = 7849.0 / 32767.0;
pub const DEFAULT_RIGHT_STICK_DEADZONE: f32 = 8689.0 / 32767.0;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    pub window: WindowConfig,
    pub controller: ControllerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// All-zero means "let the platform decide"; see `WindowPlacement::resolve`.
    pub position: [i32; 2],
    pub size: [i32; 2],
    pub centered: bool,
    /// Create a presentation surface for `Device::push` to swap.
    pub graphics: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            position: [0, 0],
            size: [0, 0],
            centered: false,
            graphics: true,
        }
    }
}

impl WindowConfig {
    pub fn position(&self) -> IVec2 {
        IVec2::from_array(self.position)
    }

    pub fn size(&self) -> IVec2 {
        IVec2::from_array(self.size)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    pub index: usize,
    pub trigger_threshold: f32,
    pub left_stick_deadzone: f32,
    pub right_stick_deadzone: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            index: 0,
            trigger_threshold: DEFAULT_TRIGGER_THRESHOLD,
            left_stick_deadzone: DEFAULT_LEFT_STICK_DEADZONE,
            right_stick_deadzone: DEFAULT_RIGHT_STICK_DEADZONE,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<DeviceConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: DeviceConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &DeviceConfig) -> Result<(), ConfigError> {
    let window = &config.window;
    if window.size[0] < 0 || window.size[1] < 0 {
        return Err(ConfigError::Invalid(format!(
            "window size {:?} has a negative component",
            window.size
        )));
    }

    let controller = &config.controller;
    for (name, value) in [
        ("trigger_threshold", controller.trigger_threshold),
        ("left_stick_deadzone", controller.left_stick_deadzone),
        ("right_stick_deadzone", controller.right_stick_deadzone),
    ] {
        if !(0.0..1.0).contains(&value) {
            return Err(ConfigError::Invalid(format!(
                "{name} must be in [0, 1), got {value}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "fpi_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn empty_object_uses_defaults() {
        let config: DeviceConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, DeviceConfig::default());
        assert_eq!(config.window.title, DEFAULT_TITLE);
        assert_eq!(config.window.size(), IVec2::ZERO);
        assert!(config.window.graphics);
        assert_eq!(config.controller.trigger_threshold, DEFAULT_TRIGGER_THRESHOLD);
    }

    #[test]
    fn load_config_parses_partial_json() {
        let path = temp_file_path("partial");
        fs::write(
            &path,
            r#"{ "window": { "title": "Demo", "size": [960, 540], "centered": true } }"#,
        )
        .expect("write temp file");

        let config = load_config_from_path(&path).expect("should parse");
        assert_eq!(config.window.title, "Demo");
        assert_eq!(config.window.size(), IVec2::new(960, 540));
        assert!(config.window.centered);
        assert_eq!(config.window.position(), IVec2::ZERO);
        assert_eq!(config.controller, ControllerConfig::default());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_config_rejects_negative_size() {
        let path = temp_file_path("negative");
        fs::write(&path, r#"{ "window": { "size": [-1, 100] } }"#).expect("write temp file");
        let err = load_config_from_path(&path).expect_err("negative size should fail");
        assert!(err.to_string().contains("negative"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn validate_rejects_threshold_out_of_range() {
        let mut config = DeviceConfig::default();
        config.controller.left_stick_deadzone = 1.5;
        let err = validate_config(&config).expect_err("deadzone 1.5 should fail");
        assert!(err.to_string().contains("left_stick_deadzone"));
    }

    #[test]
    fn load_config_reports_missing_file() {
        let path = temp_file_path("missing");
        let err = load_config_from_path(&path).expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
