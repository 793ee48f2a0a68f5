//! Bounce path generation
//!
//! Turns note times into an ordered bounce sequence plus the corridor the
//! square travels through. Deterministic for a given seed.

pub mod generator;

use std::ops::ControlFlow;

use crate::error::GenerationError;
use crate::sim::geometry::Rect;
use crate::sim::timeline::BounceEvent;

pub use generator::BeatPathGenerator;

/// Output of a path generator
#[derive(Debug, Clone, Default)]
pub struct GeneratedPath {
    /// Bounces in strictly increasing time order
    pub events: Vec<BounceEvent>,
    /// Static corridor geometry, render/physics only
    pub safe_areas: Vec<Rect>,
}

/// Progress callback: receives completion in [0, 1], breaks to cancel
pub type Progress<'a> = dyn FnMut(f32) -> ControlFlow<()> + 'a;

/// Produces a bounce path from note times
pub trait PathGenerator {
    fn generate(
        &mut self,
        notes: &[f64],
        seed: u64,
        progress: &mut Progress<'_>,
    ) -> Result<GeneratedPath, GenerationError>;
}

/// Progress callback that never cancels
pub fn no_progress(_: f32) -> ControlFlow<()> {
    ControlFlow::Continue(())
}
