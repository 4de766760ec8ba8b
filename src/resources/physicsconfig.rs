//! Physics configuration resource.
//!
//! Manages simulation settings loaded from an INI configuration file.
//! Provides defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! tick_hz = 60
//! time_scale = 1.0
//!
//! [collision]
//! ; exact | hysteresis
//! policy = exact
//!
//! [viewport]
//! offset_x = 0
//! offset_y = 0
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::Vec2;
use log::{info, warn};

/// Default safe values for startup
const DEFAULT_TICK_HZ: u32 = 60;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// How a tracked collision pair decides it has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactPolicy {
    /// Enter, stay and exit all use the exact shape test.
    #[default]
    Exact,
    /// Enter uses the exact shape test; a tracked pair stays until the
    /// coarse bounding-width check fails, giving a wider exit band.
    Hysteresis,
}

impl ContactPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactPolicy::Exact => "exact",
            ContactPolicy::Hysteresis => "hysteresis",
        }
    }
}

impl fmt::Display for ContactPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(ContactPolicy::Exact),
            "hysteresis" => Ok(ContactPolicy::Hysteresis),
            other => Err(format!("Unknown collision policy '{}'", other)),
        }
    }
}

/// Physics configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct PhysicsConfig {
    /// Target tick rate. Only the driver's pacing depends on it.
    pub tick_hz: u32,
    /// Multiplier applied to the wall-clock delta recorded in `WorldTime`.
    pub time_scale: f32,
    /// Exit rule for tracked collision pairs.
    pub contact_policy: ContactPolicy,
    /// Initial viewport offset handed to the renderer.
    pub viewport_offset: Vec2,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            tick_hz: DEFAULT_TICK_HZ,
            time_scale: DEFAULT_TIME_SCALE,
            contact_policy: ContactPolicy::default(),
            viewport_offset: Vec2::ZERO,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn with_policy(mut self, policy: ContactPolicy) -> Self {
        self.contact_policy = policy;
        self
    }

    /// Wall-clock duration of one tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz.max(1) as f64)
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [simulation] section
        if let Some(hz) = config.getuint("simulation", "tick_hz").ok().flatten() {
            if hz > 0 {
                self.tick_hz = hz as u32;
            } else {
                warn!("Ignoring tick_hz = 0, keeping {}", self.tick_hz);
            }
        }
        if let Some(scale) = config.getfloat("simulation", "time_scale").ok().flatten() {
            self.time_scale = scale as f32;
        }

        // [collision] section
        if let Some(policy) = config.get("collision", "policy") {
            match policy.parse() {
                Ok(policy) => self.contact_policy = policy,
                Err(e) => warn!("{}, keeping '{}'", e, self.contact_policy),
            }
        }

        // [viewport] section
        if let Some(x) = config.getfloat("viewport", "offset_x").ok().flatten() {
            self.viewport_offset.x = x as f32;
        }
        if let Some(y) = config.getfloat("viewport", "offset_y").ok().flatten() {
            self.viewport_offset.y = y as f32;
        }

        info!(
            "Loaded config: tick_hz={}, time_scale={}, policy={}, viewport_offset=({}, {})",
            self.tick_hz,
            self.time_scale,
            self.contact_policy,
            self.viewport_offset.x,
            self.viewport_offset.y
        );
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("simulation", "tick_hz", Some(self.tick_hz.to_string()));
        config.set("simulation", "time_scale", Some(self.time_scale.to_string()));
        config.set(
            "collision",
            "policy",
            Some(self.contact_policy.as_str().to_string()),
        );
        config.set("viewport", "offset_x", Some(self.viewport_offset.x.to_string()));
        config.set("viewport", "offset_y", Some(self.viewport_offset.y.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PhysicsConfig::new();
        assert_eq!(config.tick_hz, 60);
        assert_eq!(config.contact_policy, ContactPolicy::Exact);
        assert_eq!(config.viewport_offset, Vec2::ZERO);
    }

    #[test]
    fn test_load_from_str_overrides_present_values() {
        let mut config = PhysicsConfig::new();
        config
            .load_from_str(
                "[simulation]\ntick_hz = 30\n\n[collision]\npolicy = Hysteresis\n\n[viewport]\noffset_x = -640\n",
            )
            .unwrap();
        assert_eq!(config.tick_hz, 30);
        assert_eq!(config.contact_policy, ContactPolicy::Hysteresis);
        assert_eq!(config.viewport_offset, Vec2::new(-640.0, 0.0));
        assert_eq!(config.time_scale, 1.0);
    }

    #[test]
    fn test_unknown_policy_keeps_current() {
        let mut config = PhysicsConfig::new();
        config
            .load_from_str("[collision]\npolicy = sometimes\n")
            .unwrap();
        assert_eq!(config.contact_policy, ContactPolicy::Exact);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut config = PhysicsConfig::with_path("./definitely/not/here.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config.tick_hz, 60);
    }

    #[test]
    fn test_tick_interval() {
        let config = PhysicsConfig::new();
        let interval = config.tick_interval();
        assert!(interval.as_secs_f64() > 0.0166 && interval.as_secs_f64() < 0.0167);
    }
}
