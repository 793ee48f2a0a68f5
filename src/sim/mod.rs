//! Deterministic session simulation
//!
//! All timing and scoring logic lives here. This module must stay
//! deterministic and single-threaded:
//! - Time only from raw readings passed in by the caller
//! - Seeded RNG only (cosmetics)
//! - Bounces resolved strictly in sequence order
//! - No rendering or device dependencies

pub mod clock;
pub mod geometry;
pub mod judge;
pub mod score;
pub mod session;
pub mod state;
pub mod timeline;

pub use clock::{Countdown, PlaybackClock, countdown};
pub use geometry::Rect;
pub use judge::{HitWindow, IgnoreReason, Judge, Judgment, PressOutcome};
pub use score::{ScoreState, SessionReport};
pub use session::{InputResponse, Readout, Session, SessionEvent};
pub use state::{Effects, HitMarker, Particle, SessionPhase, Square};
pub use timeline::{BounceEvent, Resolution, Timeline};
