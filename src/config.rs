// src/config.rs - Rover configuration
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::safety::{SafetyError, SafetyThresholds};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Main configuration struct for safety thresholds, drive defaults, and the
/// simulation switch.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoverConfig {
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default = "default_simulation")]
    pub simulation: bool,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            safety: SafetyConfig::default(),
            drive: DriveConfig::default(),
            simulation: default_simulation(),
        }
    }
}

/// Collision-avoidance thresholds and sampling cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SafetyConfig {
    /// Below this distance movement is unsafe (warning zone).
    #[serde(default = "default_min_distance_cm")]
    pub min_distance_cm: u16,
    /// Below this distance an immediate stop is forced.
    #[serde(default = "default_emergency_distance_cm")]
    pub emergency_distance_cm: u16,
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            min_distance_cm: default_min_distance_cm(),
            emergency_distance_cm: default_emergency_distance_cm(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl SafetyConfig {
    /// Validated threshold pair. Fails when the emergency distance does not
    /// sit strictly below the minimum distance.
    pub fn thresholds(&self) -> Result<SafetyThresholds, SafetyError> {
        SafetyThresholds::new(self.min_distance_cm, self.emergency_distance_cm)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

/// Defaults applied to movement commands that do not spell out their own
/// speed, steering angle, or duration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriveConfig {
    /// Drive speed percentage (0-100).
    #[serde(default = "default_speed")]
    pub default_speed: u8,
    /// Steering angle magnitude in degrees.
    #[serde(default = "default_turn_angle")]
    pub default_turn_angle: u8,
    #[serde(default = "default_forward_duration_secs")]
    pub forward_duration_secs: f64,
    #[serde(default = "default_turn_duration_secs")]
    pub turn_duration_secs: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            default_speed: default_speed(),
            default_turn_angle: default_turn_angle(),
            forward_duration_secs: default_forward_duration_secs(),
            turn_duration_secs: default_turn_duration_secs(),
        }
    }
}

impl DriveConfig {
    pub fn forward_duration(&self) -> Duration {
        Duration::from_secs_f64(self.forward_duration_secs)
    }

    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs_f64(self.turn_duration_secs)
    }
}

// Default value functions
fn default_simulation() -> bool { true }
fn default_min_distance_cm() -> u16 { 20 }
fn default_emergency_distance_cm() -> u16 { 10 }
fn default_sample_interval_ms() -> u64 { 100 }
fn default_speed() -> u8 { 30 }
fn default_turn_angle() -> u8 { 30 }
fn default_forward_duration_secs() -> f64 { 2.0 }
fn default_turn_duration_secs() -> f64 { 1.5 }

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<RoverConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            Err(ConfigError::Io(e))
        }
    }
}

/// Like [`load_config`], but a missing file falls back to defaults so the
/// supervisor can run unconfigured. Unreadable or malformed files still fail.
pub fn load_or_default(path: &str) -> Result<RoverConfig, ConfigError> {
    if std::path::Path::new(path).exists() {
        load_config(path)
    } else {
        tracing::info!("No config file at '{}', using defaults", path);
        Ok(RoverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = RoverConfig::default();
        assert_eq!(config.safety.min_distance_cm, 20);
        assert_eq!(config.safety.emergency_distance_cm, 10);
        assert_eq!(config.safety.sample_interval_ms, 100);
        assert_eq!(config.drive.default_speed, 30);
        assert_eq!(config.drive.default_turn_angle, 30);
        assert!(config.simulation);
        assert!(config.safety.thresholds().is_ok());
    }

    #[test]
    fn test_load_config_success() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("rover.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            "simulation = false\n[safety]\nmin_distance_cm = 35\n[drive]\ndefault_speed = 50"
        )
        .unwrap();
        file.flush().unwrap();
        let config = load_config(file_path.to_str().unwrap()).unwrap();
        assert_eq!(config.safety.min_distance_cm, 35);
        assert_eq!(config.drive.default_speed, 50);
        assert!(!config.simulation);
        // Defaults for missing fields
        assert_eq!(config.safety.emergency_distance_cm, 10);
        assert_eq!(config.drive.turn_duration_secs, 1.5);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent_file.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = load_or_default("nonexistent_file.toml").unwrap();
        assert_eq!(config.safety.min_distance_cm, 20);
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "not a valid toml").unwrap();
        file.flush().unwrap();
        let result = load_config(file_path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_incoherent_thresholds_rejected() {
        let config = SafetyConfig {
            min_distance_cm: 10,
            emergency_distance_cm: 20,
            sample_interval_ms: 100,
        };
        assert!(config.thresholds().is_err());
    }
}
