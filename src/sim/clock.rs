//! Playback clock
//!
//! World time runs from session start. Playback-relative time subtracts the
//! pre-roll and adds the configured music offset; every judgment is measured
//! on that axis. The clock decides when the song must start and records the
//! measured startup lag exactly once.

use serde::{Deserialize, Serialize};

use crate::consts::COUNTDOWN_FADE_S;

/// Session clock derived from raw wall-clock readings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackClock {
    /// Raw reading (ms) at session start
    start_raw_ms: f64,
    /// Seconds since session start, never decreasing
    world_time: f64,
    music_offset_s: f64,
    start_delay_s: f64,
    music_started: bool,
    /// Measured audio startup lag in seconds, once known
    lag_s: Option<f64>,
}

impl PlaybackClock {
    pub fn new(start_raw_ms: f64, music_offset_ms: f64, start_delay_ms: f64) -> Self {
        Self {
            start_raw_ms,
            world_time: 0.0,
            music_offset_s: music_offset_ms / 1000.0,
            start_delay_s: start_delay_ms / 1000.0,
            music_started: false,
            lag_s: None,
        }
    }

    /// Update world time from a raw reading. Readings earlier than the last
    /// one are ignored.
    pub fn tick(&mut self, raw_ms: f64) {
        let t = (raw_ms - self.start_raw_ms) / 1000.0;
        if t > self.world_time {
            self.world_time = t;
        }
    }

    pub fn world_time(&self) -> f64 {
        self.world_time
    }

    /// The single time axis all judging uses
    pub fn playback_time(&self) -> f64 {
        self.world_time - self.start_delay_s + self.music_offset_s
    }

    pub fn music_started(&self) -> bool {
        self.music_started
    }

    /// Startup lag in seconds, once the song has started
    pub fn lag_s(&self) -> Option<f64> {
        self.lag_s
    }

    /// True on the frame the song must be started
    pub fn should_start_music(&self) -> bool {
        !self.music_started && self.world_time - self.music_offset_s > self.start_delay_s
    }

    /// Record the song as started, with raw readings taken immediately
    /// before and after the blocking play call.
    ///
    /// Returns the lag in seconds the first time only; the caller shifts the
    /// pending bounces by exactly that amount. Later calls return `None`.
    pub fn mark_music_started(&mut self, before_raw_ms: f64, after_raw_ms: f64) -> Option<f64> {
        if self.music_started {
            return None;
        }
        self.music_started = true;
        let lag = ((after_raw_ms - before_raw_ms) / 1000.0).max(0.0);
        self.lag_s = Some(lag);
        Some(lag)
    }

    pub fn countdown(&self) -> Option<Countdown> {
        countdown(self.playback_time())
    }
}

/// Pre-roll countdown label
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    pub text: String,
    /// Opacity in [0, 1]
    pub alpha: f32,
}

/// Countdown for a playback-relative time
///
/// Negative times show the remaining magnitude truncated to one decimal.
/// The first half second after zero shows a fading "0.0s".
pub fn countdown(playback_time: f64) -> Option<Countdown> {
    if playback_time < 0.0 {
        // Truncate the tenths so -1.234 reads 1.2 and -0.04 reads 0.0
        let tenths = (playback_time.abs() * 10.0 + 1e-9).floor() / 10.0;
        Some(Countdown {
            text: format!("{:.1}s", tenths),
            alpha: 1.0,
        })
    } else if playback_time < COUNTDOWN_FADE_S {
        Some(Countdown {
            text: "0.0s".to_string(),
            alpha: ((COUNTDOWN_FADE_S - playback_time) * 2.0).clamp(0.0, 1.0) as f32,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_time_before_start_is_negative() {
        let mut clock = PlaybackClock::new(1000.0, 0.0, 3000.0);
        clock.tick(1500.0);
        assert!((clock.world_time() - 0.5).abs() < 1e-9);
        assert!((clock.playback_time() + 2.5).abs() < 1e-9);
        assert!(!clock.should_start_music());
    }

    #[test]
    fn test_offset_shifts_playback_time() {
        let mut clock = PlaybackClock::new(0.0, 120.0, 1000.0);
        clock.tick(1000.0);
        assert!((clock.playback_time() - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_world_time_monotonic() {
        let mut clock = PlaybackClock::new(0.0, 0.0, 0.0);
        clock.tick(2000.0);
        clock.tick(1500.0);
        assert_eq!(clock.world_time(), 2.0);
    }

    #[test]
    fn test_music_start_boundary() {
        let mut clock = PlaybackClock::new(0.0, 0.0, 1000.0);
        clock.tick(1000.0);
        assert!(!clock.should_start_music());
        clock.tick(1001.0);
        assert!(clock.should_start_music());
    }

    #[test]
    fn test_negative_offset_delays_music_start() {
        let mut clock = PlaybackClock::new(0.0, -200.0, 1000.0);
        clock.tick(900.0);
        assert!(clock.should_start_music());

        let mut clock = PlaybackClock::new(0.0, 200.0, 1000.0);
        clock.tick(1100.0);
        assert!(!clock.should_start_music());
        clock.tick(1250.0);
        assert!(clock.should_start_music());
    }

    #[test]
    fn test_lag_recorded_once() {
        let mut clock = PlaybackClock::new(0.0, 0.0, 0.0);
        clock.tick(10.0);
        assert_eq!(clock.mark_music_started(10.0, 50.0), Some(0.04));
        assert!(clock.music_started());
        assert!(!clock.should_start_music());
        assert_eq!(clock.mark_music_started(60.0, 500.0), None);
        assert_eq!(clock.lag_s(), Some(0.04));
    }

    #[test]
    fn test_countdown_truncates_magnitude() {
        assert_eq!(countdown(-1.234).unwrap().text, "1.2s");
        assert_eq!(countdown(-2.99).unwrap().text, "2.9s");
        assert_eq!(countdown(-0.04).unwrap().text, "0.0s");
        assert_eq!(countdown(-1.234).unwrap().alpha, 1.0);
    }

    #[test]
    fn test_countdown_fades_after_zero() {
        let start = countdown(0.0).unwrap();
        assert_eq!(start.text, "0.0s");
        assert_eq!(start.alpha, 1.0);

        let mid = countdown(0.25).unwrap();
        assert!((mid.alpha - 0.5).abs() < 1e-6);

        assert!(countdown(0.5).is_none());
        assert!(countdown(3.0).is_none());
    }
}
