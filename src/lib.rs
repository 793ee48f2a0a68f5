//! Square Sync - timing and scoring core for a beat-bouncing square
//!
//! Core modules:
//! - `sim`: Deterministic session simulation (clock, timeline, judge, score)
//! - `path`: Bounce path generation from note times
//! - `platform`: Wall clock and input abstraction
//! - `audio`: Playback start/stop seam
//! - `settings`: Per-session configuration

pub mod audio;
pub mod error;
pub mod path;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, GenerationError, StartError, TimelineError};
pub use settings::{HealthTuning, PathTuning, SessionConfig};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (120 Hz)
    pub const SIM_DT: f64 = 1.0 / 120.0;

    /// Presses earlier than this (playback-relative seconds) are pre-roll noise
    pub const PRESS_GRACE_S: f64 = -0.2;

    /// Countdown "0.0s" fade window after playback reaches zero
    pub const COUNTDOWN_FADE_S: f64 = 0.5;

    /// Duration of the bounce squash animation
    pub const SQUASH_DURATION_S: f64 = 0.25;

    /// Lifetime of a hit/miss marker in seconds
    pub const MARKER_LIFETIME_S: f32 = 0.6;

    /// Maximum cosmetic particles alive at once
    pub const MAX_PARTICLES: usize = 512;
}

/// Round to two decimal places
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamp a percentage to [0, 100]
#[inline]
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
