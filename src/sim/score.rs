//! Health, misses and accuracy bookkeeping

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::settings::HealthTuning;
use crate::{clamp_percent, round2};

/// Health below this counts as empty
const HP_EPSILON: f32 = 1e-5;

/// Score state for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreState {
    hp: f32,
    misses: u32,
    hits: u32,
    died: bool,
    past_bounce_count: usize,
    total_bounce_count: usize,
    tuning: HealthTuning,
}

/// Final numbers shown on the death / results screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub accuracy: f64,
    pub total_accuracy: f64,
    pub misses: u32,
    pub hits: u32,
    pub resolved: usize,
    pub total: usize,
}

/// Percentage of non-missed bounces, rounded to 2 decimals and clamped
fn accuracy_ratio(bounces: usize, misses: u32) -> Result<f64, ScoreError> {
    if bounces == 0 {
        return Err(ScoreError::DivisionUndefined);
    }
    let bounces = bounces as f64;
    Ok(clamp_percent(round2((bounces - misses as f64) / bounces * 100.0)))
}

impl ScoreState {
    pub fn new(total_bounce_count: usize, tuning: HealthTuning) -> Self {
        Self {
            hp: tuning.max_hp,
            misses: 0,
            hits: 0,
            died: false,
            past_bounce_count: 0,
            total_bounce_count,
            tuning,
        }
    }

    pub fn hp(&self) -> f32 {
        self.hp
    }

    pub fn max_hp(&self) -> f32 {
        self.tuning.max_hp
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn died(&self) -> bool {
        self.died
    }

    pub fn past_bounce_count(&self) -> usize {
        self.past_bounce_count
    }

    pub fn total_bounce_count(&self) -> usize {
        self.total_bounce_count
    }

    /// Count one more bounce as resolved
    pub fn record_bounce(&mut self) {
        self.past_bounce_count = (self.past_bounce_count + 1).min(self.total_bounce_count);
    }

    pub fn apply_miss(&mut self) {
        self.misses += 1;
        if self.died {
            self.hp = 0.0;
            return;
        }
        let hp = self.hp - self.tuning.miss_penalty;
        // Repeated f32 subtraction leaves crumbs; treat them as empty
        self.hp = if hp <= HP_EPSILON { 0.0 } else { hp };
    }

    pub fn apply_hit(&mut self) {
        self.hits += 1;
        if self.died {
            return;
        }
        self.hp = (self.hp + self.tuning.hit_heal).min(self.tuning.max_hp);
    }

    /// Health is gone but the death transition has not run yet
    pub fn should_die(&self) -> bool {
        self.hp <= 0.0 && !self.died
    }

    /// One-way switch into the dead state; hp is pinned to zero.
    /// Returns false if already dead.
    pub fn mark_died(&mut self) -> bool {
        if self.died {
            return false;
        }
        self.died = true;
        self.hp = 0.0;
        true
    }

    /// Accuracy over resolved bounces; `None` until one has resolved
    pub fn current_accuracy(&self) -> Option<f64> {
        accuracy_ratio(self.past_bounce_count, self.misses).ok()
    }

    /// Accuracy over the whole song; `None` for a song with no bounces
    pub fn total_accuracy(&self) -> Option<f64> {
        accuracy_ratio(self.total_bounce_count, self.misses).ok()
    }

    /// Terminal numbers with denominators floored to 1
    pub fn report(&self) -> SessionReport {
        let resolved = self.past_bounce_count.max(1);
        let total = self.total_bounce_count.max(1);
        SessionReport {
            accuracy: accuracy_ratio(resolved, self.misses).unwrap_or(0.0),
            total_accuracy: accuracy_ratio(total, self.misses).unwrap_or(0.0),
            misses: self.misses,
            hits: self.hits,
            resolved: self.past_bounce_count,
            total: self.total_bounce_count,
        }
    }
}
