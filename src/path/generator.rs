//! Built-in diagonal bounce path generator
//!
//! The square travels diagonally at constant speed and reflects off an
//! imaginary wall at every kept note, alternating axes. A seeded coin flip
//! sometimes reflects the other axis instead, which varies the shape between
//! seeds while staying reproducible within one.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{GeneratedPath, PathGenerator, Progress};
use crate::error::GenerationError;
use crate::settings::PathTuning;
use crate::sim::geometry::Rect;
use crate::sim::timeline::BounceEvent;

/// Side length of the square, used to pad the corridor
pub const SQUARE_SIZE: f32 = 20.0;

/// Paths that wander further than this from the origin are rejected
pub const WORLD_LIMIT: f32 = 1.0e7;

#[derive(Debug, Clone)]
pub struct BeatPathGenerator {
    tuning: PathTuning,
}

impl BeatPathGenerator {
    pub fn new(tuning: PathTuning) -> Self {
        Self { tuning }
    }

    /// Sort notes and merge ones closer than the minimum spacing
    fn keep_notes(&self, notes: &[f64]) -> Result<Vec<f64>, GenerationError> {
        if let Some(index) = notes.iter().position(|t| !t.is_finite()) {
            return Err(GenerationError::Failed(format!(
                "note {} has an invalid time",
                index
            )));
        }

        let mut sorted = notes.to_vec();
        sorted.sort_by(f64::total_cmp);

        let spacing = self.tuning.bounce_min_spacing_ms / 1000.0;
        let mut kept: Vec<f64> = Vec::with_capacity(sorted.len());
        for t in sorted {
            match kept.last() {
                Some(&last) if t - last < spacing || t <= last => {}
                _ => kept.push(t),
            }
        }
        Ok(kept)
    }
}

impl Default for BeatPathGenerator {
    fn default() -> Self {
        Self::new(PathTuning::default())
    }
}

impl PathGenerator for BeatPathGenerator {
    fn generate(
        &mut self,
        notes: &[f64],
        seed: u64,
        progress: &mut Progress<'_>,
    ) -> Result<GeneratedPath, GenerationError> {
        let kept = self.keep_notes(notes)?;
        if kept.len() > self.tuning.max_events {
            return Err(GenerationError::Failed(format!(
                "Map too large: {} bounces (limit {}). Try a larger bounce spacing.",
                kept.len(),
                self.tuning.max_events
            )));
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let speed = self.tuning.square_speed;
        let total = kept.len().max(1) as f32;

        let mut path = GeneratedPath {
            events: Vec::with_capacity(kept.len()),
            safe_areas: Vec::with_capacity(kept.len()),
        };

        let mut pos = Vec2::ZERO;
        let mut dir = Vec2::ONE.normalize();
        let mut flip_x_next = true;
        let mut prev_time = None;

        for (i, &t) in kept.iter().enumerate() {
            if progress(i as f32 / total).is_break() {
                log::info!("Path generation cancelled at {}/{}", i, kept.len());
                return Err(GenerationError::Cancelled);
            }

            if let Some(prev) = prev_time {
                let elapsed = (t - prev) as f32;
                let next = pos + dir * speed * elapsed;
                if !next.is_finite() || next.abs().max_element() > WORLD_LIMIT {
                    return Err(GenerationError::Failed(
                        "Path left the playable area. Try a lower square speed.".to_string(),
                    ));
                }
                path.safe_areas
                    .push(Rect::from_corners(pos, next).inflate(Vec2::splat(SQUARE_SIZE * 2.0)));
                pos = next;

                let flip_x = if rng.random_bool(self.tuning.change_dir_chance.clamp(0.0, 1.0)) {
                    !flip_x_next
                } else {
                    flip_x_next
                };
                if flip_x {
                    dir.x = -dir.x;
                } else {
                    dir.y = -dir.y;
                }
                flip_x_next = !flip_x_next;
            }

            path.events.push(BounceEvent::new(t, pos));
            prev_time = Some(t);
        }

        if progress(1.0).is_break() {
            return Err(GenerationError::Cancelled);
        }

        log::info!(
            "Generated {} bounces ({} notes dropped) for seed {}",
            path.events.len(),
            notes.len() - kept.len(),
            seed
        );
        Ok(path)
    }
}
