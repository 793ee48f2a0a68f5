//! Press judging and bounce promotion
//!
//! Whether a press lands on the bounce is decided by the caller, either from
//! collision state or from the built-in time window. The judge only does the
//! bookkeeping: which event is consumed, which become misses, and when.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::score::ScoreState;
use super::timeline::{BounceEvent, Resolution, Timeline};
use crate::consts::PRESS_GRACE_S;

/// One bounce leaving the future partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// Index into the full bounce sequence
    pub index: usize,
    /// Scheduled (lag-corrected) bounce time
    pub time: f64,
    pub position: Vec2,
    pub resolution: Resolution,
    /// Playback time at which it was resolved
    pub resolved_at: f64,
}

impl Judgment {
    fn new(index: usize, event: BounceEvent, resolution: Resolution, resolved_at: f64) -> Self {
        Self {
            index,
            time: event.time,
            position: event.position,
            resolution,
            resolved_at,
        }
    }
}

/// Why a press had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not an accepted trigger key
    NotTrigger,
    /// Pressed during the pre-roll
    PreRoll,
    /// Nothing left to judge
    NoPendingEvent,
    /// Theatre mode, death or session over
    Inactive,
}

/// Result of a single press
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressOutcome {
    /// The head bounce was struck
    Hit(Judgment),
    /// The press did not land on the head bounce; it stays pending
    Stray,
    Ignored(IgnoreReason),
}

/// How a press is confirmed when no collision verdict is supplied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitWindow {
    /// Half-width of the window in seconds
    pub half_width: f64,
}

impl HitWindow {
    pub fn new(half_width: f64) -> Self {
        Self { half_width }
    }

    pub fn confirms(&self, event: &BounceEvent, playback_time: f64) -> bool {
        (event.time - playback_time).abs() <= self.half_width
    }
}

/// Bookkeeping for presses and due bounces
#[derive(Debug, Clone)]
pub struct Judge {
    window: HitWindow,
}

impl Judge {
    pub fn new(window: HitWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> HitWindow {
        self.window
    }

    /// Judge a press by time proximity to the head bounce
    pub fn record_key_press(
        &self,
        timeline: &mut Timeline,
        score: &mut ScoreState,
        playback_time: f64,
    ) -> PressOutcome {
        let confirmed = timeline
            .head()
            .is_some_and(|head| self.window.confirms(head, playback_time));
        self.record_confirmed_press(timeline, score, playback_time, confirmed)
    }

    /// Judge a press whose landing was decided by the collision layer
    pub fn record_confirmed_press(
        &self,
        timeline: &mut Timeline,
        score: &mut ScoreState,
        playback_time: f64,
        confirmed: bool,
    ) -> PressOutcome {
        if playback_time < PRESS_GRACE_S {
            return PressOutcome::Ignored(IgnoreReason::PreRoll);
        }
        if timeline.is_exhausted() {
            return PressOutcome::Ignored(IgnoreReason::NoPendingEvent);
        }
        if !confirmed {
            return PressOutcome::Stray;
        }
        match timeline.resolve_head(Resolution::Hit) {
            Some((index, event)) => {
                score.record_bounce();
                score.apply_hit();
                PressOutcome::Hit(Judgment::new(index, event, Resolution::Hit, playback_time))
            }
            None => PressOutcome::Ignored(IgnoreReason::NoPendingEvent),
        }
    }

    /// Move every bounce due at `playback_time` into the past, in order.
    ///
    /// With `scoring` each one is a miss; otherwise it passes unjudged and
    /// the score is left untouched.
    pub fn promote_due(
        &self,
        timeline: &mut Timeline,
        score: &mut ScoreState,
        playback_time: f64,
        scoring: bool,
    ) -> Vec<Judgment> {
        let mut judged = Vec::new();
        let resolution = if scoring {
            Resolution::Miss
        } else {
            Resolution::Passive
        };

        while timeline.head().is_some_and(|e| e.time <= playback_time) {
            let Some((index, event)) = timeline.resolve_head(resolution) else {
                break;
            };
            if scoring {
                score.record_bounce();
                score.apply_miss();
            }
            judged.push(Judgment::new(index, event, resolution, playback_time));
        }

        judged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::HealthTuning;

    fn setup(times: &[f64]) -> (Judge, Timeline, ScoreState) {
        let events = times
            .iter()
            .map(|&t| BounceEvent::new(t, Vec2::new(t as f32, 0.0)))
            .collect();
        let timeline = Timeline::new(events).unwrap();
        let score = ScoreState::new(timeline.total(), HealthTuning::default());
        (Judge::new(HitWindow::new(0.15)), timeline, score)
    }

    #[test]
    fn test_press_during_preroll_ignored() {
        let (judge, mut timeline, mut score) = setup(&[0.0, 0.5]);
        let outcome = judge.record_confirmed_press(&mut timeline, &mut score, -0.3, true);
        assert_eq!(outcome, PressOutcome::Ignored(IgnoreReason::PreRoll));
        assert_eq!(score.misses(), 0);
        assert_eq!(timeline.past_len(), 0);
    }

    #[test]
    fn test_press_at_grace_boundary_is_judged() {
        let (judge, mut timeline, mut score) = setup(&[-0.1, 0.5]);
        let outcome = judge.record_confirmed_press(&mut timeline, &mut score, PRESS_GRACE_S, true);
        assert!(matches!(outcome, PressOutcome::Hit(j) if j.index == 0));
        assert_eq!(score.hits(), 1);

        let (judge, mut timeline, mut score) = setup(&[-0.1, 0.5]);
        let outcome =
            judge.record_confirmed_press(&mut timeline, &mut score, PRESS_GRACE_S - 1e-9, true);
        assert_eq!(outcome, PressOutcome::Ignored(IgnoreReason::PreRoll));
    }

    #[test]
    fn test_press_just_inside_grace_is_judged() {
        let (judge, mut timeline, mut score) = setup(&[-0.1, 0.5]);
        let outcome = judge.record_key_press(&mut timeline, &mut score, -0.15);
        assert!(matches!(outcome, PressOutcome::Hit(j) if j.index == 0));
    }

    #[test]
    fn test_press_with_no_pending_event() {
        let (judge, mut timeline, mut score) = setup(&[]);
        let outcome = judge.record_key_press(&mut timeline, &mut score, 1.0);
        assert_eq!(outcome, PressOutcome::Ignored(IgnoreReason::NoPendingEvent));
        assert_eq!(score.misses(), 0);
        assert_eq!(score.hits(), 0);
    }

    #[test]
    fn test_window_press_consumes_head() {
        let (judge, mut timeline, mut score) = setup(&[1.0, 2.0]);
        let outcome = judge.record_key_press(&mut timeline, &mut score, 0.95);
        let PressOutcome::Hit(judgment) = outcome else {
            panic!("expected hit, got {:?}", outcome);
        };
        assert_eq!(judgment.index, 0);
        assert_eq!(judgment.resolution, Resolution::Hit);
        assert_eq!(timeline.past_len(), 1);
        assert_eq!(score.hits(), 1);
        assert_eq!(score.past_bounce_count(), 1);

        // Consumed early, so it is not judged again when it becomes due
        let judged = judge.promote_due(&mut timeline, &mut score, 1.05, true);
        assert!(judged.is_empty());
        assert_eq!(score.misses(), 0);
    }

    #[test]
    fn test_press_outside_window_is_stray() {
        let (judge, mut timeline, mut score) = setup(&[1.0]);
        let outcome = judge.record_key_press(&mut timeline, &mut score, 0.5);
        assert_eq!(outcome, PressOutcome::Stray);
        assert_eq!(timeline.future_len(), 1);
        assert_eq!(score.misses(), 0);
    }

    #[test]
    fn test_collision_verdict_overrides_window() {
        let (judge, mut timeline, mut score) = setup(&[1.0]);
        let outcome = judge.record_confirmed_press(&mut timeline, &mut score, 0.99, false);
        assert_eq!(outcome, PressOutcome::Stray);
        let outcome = judge.record_confirmed_press(&mut timeline, &mut score, 0.2, true);
        assert!(matches!(outcome, PressOutcome::Hit(_)));
    }

    #[test]
    fn test_promote_due_in_order_as_misses() {
        let (judge, mut timeline, mut score) = setup(&[0.5, 1.0, 1.5, 2.0]);
        let judged = judge.promote_due(&mut timeline, &mut score, 1.5, true);
        let indices: Vec<_> = judged.iter().map(|j| j.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(judged.iter().all(|j| j.resolution == Resolution::Miss));
        assert_eq!(score.misses(), 3);
        assert_eq!(timeline.past_len() + timeline.future_len(), timeline.total());
    }

    #[test]
    fn test_promote_passive_does_not_score() {
        let (judge, mut timeline, mut score) = setup(&[0.5, 1.0]);
        let judged = judge.promote_due(&mut timeline, &mut score, 5.0, false);
        assert_eq!(judged.len(), 2);
        assert!(judged.iter().all(|j| j.resolution == Resolution::Passive));
        assert_eq!(score.misses(), 0);
        assert_eq!(score.hp(), score.max_hp());
        assert_eq!(score.past_bounce_count(), 0);
        assert_eq!(score.current_accuracy(), None);
    }

    #[test]
    fn test_promote_nothing_due() {
        let (judge, mut timeline, mut score) = setup(&[0.5]);
        assert!(judge.promote_due(&mut timeline, &mut score, 0.49, true).is_empty());
        assert_eq!(timeline.future_len(), 1);
    }
}
