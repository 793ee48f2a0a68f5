//! Session configuration
//!
//! One instance per session, passed into `Session::start` and never mutated
//! afterwards. Persisted as JSON next to the song library.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Health model constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTuning {
    /// Starting and maximum health
    pub max_hp: f32,
    /// Health lost per missed bounce
    pub miss_penalty: f32,
    /// Health restored per confirmed hit
    pub hit_heal: f32,
}

impl Default for HealthTuning {
    fn default() -> Self {
        Self {
            max_hp: 1.0,
            miss_penalty: 0.1,
            hit_heal: 0.008,
        }
    }
}

/// Knobs for the built-in path generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathTuning {
    /// Square travel speed in world units per second
    pub square_speed: f32,
    /// Probability (0-1) that a bounce flips the other axis than usual
    pub change_dir_chance: f64,
    /// Notes closer than this to the previous kept note are merged away
    pub bounce_min_spacing_ms: f64,
    /// Maps with more bounces than this are rejected as too large
    pub max_events: usize,
}

impl Default for PathTuning {
    fn default() -> Self {
        Self {
            square_speed: 600.0,
            change_dir_chance: 0.3,
            bounce_min_spacing_ms: 50.0,
            max_events: 5000,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed threaded into path generation and cosmetics
    pub seed: u64,

    // === Timing ===
    /// Signed latency compensation added to playback-relative time
    pub music_offset_ms: f64,
    /// Pre-roll before any bounce is live
    pub start_delay_ms: f64,
    /// Built-in hit confirmation window when no collision verdict is given
    pub hit_window_ms: f64,
    /// Tail after the last bounce before the song counts as finished
    pub outro_ms: f64,

    // === Modes ===
    /// Passive playback: clock and path run, nothing is judged
    pub theatre_mode: bool,

    // === Tuning ===
    pub health: HealthTuning,
    pub path: PathTuning,

    // === Cosmetics ===
    /// Particles spawned on death
    pub death_burst: usize,
    /// Leave a particle trail behind the square
    pub particle_trail: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,

            music_offset_ms: 0.0,
            start_delay_ms: 3000.0,
            hit_window_ms: 150.0,
            outro_ms: 1000.0,

            theatre_mode: false,

            health: HealthTuning::default(),
            path: PathTuning::default(),

            death_burst: 100,
            particle_trail: true,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a config file
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Read a config file, falling back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                log::info!("Loaded session config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default session config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reject values the timing model cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.music_offset_ms.is_finite() {
            return Err(ConfigError::Invalid("music_offset_ms must be finite".into()));
        }
        if !(self.start_delay_ms.is_finite() && self.start_delay_ms >= 0.0) {
            return Err(ConfigError::Invalid("start_delay_ms must be >= 0".into()));
        }
        if !(self.hit_window_ms.is_finite() && self.hit_window_ms > 0.0) {
            return Err(ConfigError::Invalid("hit_window_ms must be > 0".into()));
        }
        if !(self.outro_ms.is_finite() && self.outro_ms >= 0.0) {
            return Err(ConfigError::Invalid("outro_ms must be >= 0".into()));
        }
        let health = &self.health;
        if !(health.max_hp > 0.0 && health.miss_penalty >= 0.0 && health.hit_heal >= 0.0) {
            return Err(ConfigError::Invalid(
                "health: max_hp must be > 0, penalty and heal >= 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.path.change_dir_chance) {
            return Err(ConfigError::Invalid("path.change_dir_chance must be in [0, 1]".into()));
        }
        if !(self.path.square_speed.is_finite() && self.path.square_speed > 0.0) {
            return Err(ConfigError::Invalid("path.square_speed must be > 0".into()));
        }
        Ok(())
    }

    pub fn hit_window_s(&self) -> f64 {
        self.hit_window_ms / 1000.0
    }

    pub fn outro_s(&self) -> f64 {
        self.outro_ms / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SessionConfig::from_json(r#"{ "seed": 7, "theatre_mode": true }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert!(config.theatre_mode);
        assert_eq!(config.start_delay_ms, 3000.0);
        assert_eq!(config.health, HealthTuning::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = SessionConfig {
            seed: 42,
            music_offset_ms: -35.0,
            ..Default::default()
        };
        let back = SessionConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("square-sync-{}.json", std::process::id()));
        let config = SessionConfig {
            seed: 7,
            theatre_mode: true,
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = SessionConfig::try_load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.unwrap(), config);
    }

    #[test]
    fn test_rejects_negative_delay() {
        let err = SessionConfig::from_json(r#"{ "start_delay_ms": -1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = SessionConfig::from_json("{ seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = SessionConfig::load("/definitely/not/here/square-sync.json");
        assert_eq!(config, SessionConfig::default());
    }
}
