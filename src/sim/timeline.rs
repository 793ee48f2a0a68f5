//! Bounce timeline: resolved past, pending future
//!
//! The generated event order is never changed. A single cursor splits the
//! sequence into `past` and `future`; on death the pending tail is moved
//! behind a second boundary into `abandoned`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

/// A scheduled direction change of the square
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceEvent {
    /// Playback-relative time in seconds
    pub time: f64,
    /// Where the square is when it bounces
    pub position: Vec2,
}

impl BounceEvent {
    pub fn new(time: f64, position: Vec2) -> Self {
        Self { time, position }
    }
}

/// How a bounce left the future partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Consumed by a confirmed press
    Hit,
    /// Became due with no confirmed press
    Miss,
    /// Passed while nothing was being judged (theatre mode)
    Passive,
}

/// Ordered bounce events split into past / future / abandoned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    events: Vec<BounceEvent>,
    /// One entry per past event
    resolutions: Vec<Resolution>,
    /// Start of the future partition
    cursor: usize,
    /// End of the future partition; everything after is abandoned
    live_end: usize,
}

impl Timeline {
    /// Build from generator output; times must be finite and strictly increasing
    pub fn new(events: Vec<BounceEvent>) -> Result<Self, TimelineError> {
        for (index, event) in events.iter().enumerate() {
            if !event.time.is_finite() {
                return Err(TimelineError::NonFinite { index });
            }
            if index > 0 {
                let previous = events[index - 1].time;
                if event.time <= previous {
                    return Err(TimelineError::OutOfOrder {
                        index,
                        previous,
                        time: event.time,
                    });
                }
            }
        }
        let len = events.len();
        Ok(Self {
            events,
            resolutions: Vec::with_capacity(len),
            cursor: 0,
            live_end: len,
        })
    }

    /// Resolved events, oldest first
    pub fn past(&self) -> &[BounceEvent] {
        &self.events[..self.cursor]
    }

    /// Resolution of each past event, parallel to `past()`
    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    /// Pending events, earliest first
    pub fn future(&self) -> &[BounceEvent] {
        &self.events[self.cursor..self.live_end]
    }

    /// Events dropped when the session ended early
    pub fn abandoned(&self) -> &[BounceEvent] {
        &self.events[self.live_end..]
    }

    /// Size of the full sequence; constant for the session
    pub fn total(&self) -> usize {
        self.events.len()
    }

    pub fn past_len(&self) -> usize {
        self.cursor
    }

    pub fn future_len(&self) -> usize {
        self.live_end - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.live_end
    }

    /// Earliest pending event
    pub fn head(&self) -> Option<&BounceEvent> {
        self.future().first()
    }

    /// Event at `index` in the full sequence, whatever its partition
    pub fn get(&self, index: usize) -> Option<&BounceEvent> {
        self.events.get(index)
    }

    /// Most recently resolved event with its resolution
    pub fn last_resolved(&self) -> Option<(&BounceEvent, Resolution)> {
        let index = self.cursor.checked_sub(1)?;
        Some((&self.events[index], self.resolutions[index]))
    }

    /// Time of the final event of the song (abandoned or not)
    pub fn last_time(&self) -> Option<f64> {
        self.events.last().map(|e| e.time)
    }

    /// Move the head event into the past. Returns its index and value.
    pub fn resolve_head(&mut self, resolution: Resolution) -> Option<(usize, BounceEvent)> {
        if self.is_exhausted() {
            return None;
        }
        let index = self.cursor;
        self.resolutions.push(resolution);
        self.cursor += 1;
        Some((index, self.events[index]))
    }

    /// Delay every pending event by `delta` seconds
    pub fn shift_future(&mut self, delta: f64) {
        for event in &mut self.events[self.cursor..self.live_end] {
            event.time += delta;
        }
    }

    /// Drop all pending events. Returns how many were abandoned.
    pub fn abandon_future(&mut self) -> usize {
        let dropped = self.future_len();
        self.live_end = self.cursor;
        dropped
    }
}
