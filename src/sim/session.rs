//! Per-session orchestrator
//!
//! Owns the clock, timeline, judge and score for one played song. The outer
//! render/input loop calls `advance` once per frame and funnels every input
//! event through `on_input` / `on_pointer` on the same thread.

use serde::Serialize;

use super::clock::{Countdown, PlaybackClock};
use super::geometry::Rect;
use super::judge::{HitWindow, IgnoreReason, Judge, Judgment, PressOutcome};
use super::score::{ScoreState, SessionReport};
use super::state::{Effects, SessionPhase, Square};
use super::timeline::{BounceEvent, Resolution, Timeline};
use crate::audio::AudioSink;
use crate::consts::MAX_PARTICLES;
use crate::error::StartError;
use crate::path::{GeneratedPath, PathGenerator, Progress};
use crate::platform::{Key, PointerLatch, TimeSource};
use crate::settings::SessionConfig;

/// Notifications for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Song playback began; pending bounces were delayed by `lag_ms`
    MusicStarted { lag_ms: f64 },
    /// A bounce left the future partition
    Resolved(Judgment),
    Died,
    Finished,
    Exited,
}

/// Response to a key event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputResponse {
    Press(PressOutcome),
    /// Escape: the session is over, return to the menu
    Exit,
}

/// Values the HUD reads each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readout {
    pub playback_time: f64,
    pub hp: f32,
    pub current_accuracy: Option<f64>,
    pub total_accuracy: Option<f64>,
    pub misses: u32,
    pub died: bool,
    pub phase: SessionPhase,
}

/// One played song
pub struct Session<A: AudioSink, C: TimeSource> {
    config: SessionConfig,
    clock: PlaybackClock,
    timeline: Timeline,
    judge: Judge,
    score: ScoreState,
    square: Square,
    effects: Effects,
    safe_areas: Vec<Rect>,
    phase: SessionPhase,
    pointer: PointerLatch,
    audio: A,
    time: C,
    audio_stopped: bool,
    last_raw_ms: f64,
    frames: u64,
    events: Vec<SessionEvent>,
}

impl<A: AudioSink, C: TimeSource> Session<A, C> {
    /// Generate the path for `notes` and start a session on it.
    ///
    /// Nothing is created when generation is cancelled or fails.
    pub fn start<G>(
        config: SessionConfig,
        notes: &[f64],
        generator: &mut G,
        audio: A,
        time: C,
        progress: &mut Progress<'_>,
    ) -> Result<Self, StartError>
    where
        G: PathGenerator + ?Sized,
    {
        Self::validate(&config)?;
        let path = generator.generate(notes, config.seed, progress)?;
        Self::build(config, path, audio, time)
    }

    /// Start a session on an already generated path
    pub fn from_path(
        config: SessionConfig,
        path: GeneratedPath,
        audio: A,
        time: C,
    ) -> Result<Self, StartError> {
        Self::validate(&config)?;
        Self::build(config, path, audio, time)
    }

    fn validate(config: &SessionConfig) -> Result<(), StartError> {
        config
            .validate()
            .map_err(|e| StartError::Failed(e.to_string()))
    }

    fn build(
        config: SessionConfig,
        path: GeneratedPath,
        audio: A,
        time: C,
    ) -> Result<Self, StartError> {
        let timeline = Timeline::new(path.events)?;
        let score = ScoreState::new(timeline.total(), config.health);
        let start_pos = timeline.head().map(|e| e.position).unwrap_or_default();
        let start_raw_ms = time.now_ms();

        log::info!(
            "Session start: {} bounces, seed {}, offset {}ms, delay {}ms{}",
            timeline.total(),
            config.seed,
            config.music_offset_ms,
            config.start_delay_ms,
            if config.theatre_mode { ", theatre mode" } else { "" }
        );

        Ok(Self {
            clock: PlaybackClock::new(start_raw_ms, config.music_offset_ms, config.start_delay_ms),
            judge: Judge::new(HitWindow::new(config.hit_window_s())),
            effects: Effects::new(config.seed, MAX_PARTICLES),
            square: Square::new(start_pos),
            safe_areas: path.safe_areas,
            phase: SessionPhase::PreRoll,
            pointer: PointerLatch::default(),
            audio,
            time,
            audio_stopped: false,
            last_raw_ms: start_raw_ms,
            frames: 0,
            events: Vec::new(),
            timeline,
            score,
            config,
        })
    }

    /// Advance one frame to the raw wall-clock reading `raw_ms`
    pub fn advance(&mut self, raw_ms: f64) {
        let dt = ((raw_ms - self.last_raw_ms) / 1000.0).max(0.0) as f32;
        self.last_raw_ms = self.last_raw_ms.max(raw_ms);
        self.frames += 1;

        if self.phase.is_over() {
            // Cosmetics keep settling on the death / results screen
            self.clock.tick(raw_ms);
            self.effects.update(dt);
            return;
        }

        // 1. Clock, and the one-time song start
        self.clock.tick(raw_ms);
        if self.clock.should_start_music() {
            self.start_music();
        }
        let t = self.clock.playback_time();

        // 2. Promote due bounces
        let scoring = !self.config.theatre_mode;
        let judged = self
            .judge
            .promote_due(&mut self.timeline, &mut self.score, t, scoring);
        for judgment in judged {
            self.on_resolved(judgment);
        }

        // 3. Death
        if scoring && self.score.should_die() {
            self.die();
        }

        // Square motion and cosmetics
        if !self.square.died {
            let from = self.timeline.last_resolved().map(|(e, _)| *e);
            let to = self.timeline.head().copied();
            self.square.follow(from.as_ref(), to.as_ref(), t);
            if self.config.particle_trail && self.frames % 2 == 0 {
                self.effects.trail(self.square.pos);
            }
        }
        self.effects.update(dt);

        // Normal song end
        if !self.phase.is_over() && self.clock.music_started() && self.timeline.is_exhausted() {
            let end = self.timeline.last_time().unwrap_or(0.0) + self.config.outro_s();
            if t >= end {
                self.finish();
            }
        }
    }

    /// Key-down from the input layer
    pub fn on_input(&mut self, key: Key, raw_ms: f64) -> InputResponse {
        if key == Key::Escape {
            self.exit();
            return InputResponse::Exit;
        }
        if !key.is_trigger() {
            log::debug!("Ignoring non-trigger key {:?}", key);
            return InputResponse::Press(PressOutcome::Ignored(IgnoreReason::NotTrigger));
        }
        InputResponse::Press(self.press(raw_ms, None))
    }

    /// Key-down whose landing was decided by the collision layer
    pub fn on_collision_input(&mut self, key: Key, raw_ms: f64, confirmed: bool) -> InputResponse {
        if key == Key::Escape {
            self.exit();
            return InputResponse::Exit;
        }
        if !key.is_trigger() {
            return InputResponse::Press(PressOutcome::Ignored(IgnoreReason::NotTrigger));
        }
        InputResponse::Press(self.press(raw_ms, Some(confirmed)))
    }

    /// Polled pointer button state; a held button counts once
    pub fn on_pointer(&mut self, pressed: bool, raw_ms: f64) -> Option<PressOutcome> {
        if self.pointer.update(pressed) {
            Some(self.press(raw_ms, None))
        } else {
            None
        }
    }

    fn press(&mut self, raw_ms: f64, confirmed: Option<bool>) -> PressOutcome {
        if self.config.theatre_mode || self.phase.is_over() {
            return PressOutcome::Ignored(IgnoreReason::Inactive);
        }
        self.clock.tick(raw_ms);
        let t = self.clock.playback_time();
        let outcome = match confirmed {
            Some(confirmed) => {
                self.judge
                    .record_confirmed_press(&mut self.timeline, &mut self.score, t, confirmed)
            }
            None => self
                .judge
                .record_key_press(&mut self.timeline, &mut self.score, t),
        };
        match outcome {
            PressOutcome::Hit(judgment) => self.on_resolved(judgment),
            PressOutcome::Stray => log::debug!("Stray press at {:.3}s", t),
            PressOutcome::Ignored(reason) => log::debug!("Press at {:.3}s ignored: {:?}", t, reason),
        }
        outcome
    }

    /// Leave the song early
    pub fn exit(&mut self) {
        if self.phase.is_over() {
            return;
        }
        self.stop_audio();
        self.phase = SessionPhase::Exited;
        self.events.push(SessionEvent::Exited);
        log::info!("Session exited at {:.2}s", self.clock.playback_time());
    }

    /// Start the song, measuring how long the backend blocks.
    ///
    /// Pending bounces are delayed by the measured lag. Returns the lag in
    /// seconds, or `None` if the song was already started.
    fn start_music(&mut self) -> Option<f64> {
        if self.clock.music_started() {
            return None;
        }
        let before = self.time.now_ms();
        self.audio.play();
        let after = self.time.now_ms();

        let lag = self.clock.mark_music_started(before, after)?;
        self.timeline.shift_future(lag);
        if self.phase == SessionPhase::PreRoll {
            self.phase = SessionPhase::Playing;
        }
        log::info!(
            "Music started at world {:.3}s, startup lag {:.1}ms",
            self.clock.world_time(),
            lag * 1000.0
        );
        self.events.push(SessionEvent::MusicStarted { lag_ms: lag * 1000.0 });
        Some(lag)
    }

    fn stop_audio(&mut self) {
        if self.audio_stopped {
            return;
        }
        self.audio_stopped = true;
        self.audio.stop();
    }

    fn on_resolved(&mut self, judgment: Judgment) {
        log::debug!(
            "Bounce {} at {:.3}s -> {:?} (resolved at {:.3}s)",
            judgment.index,
            judgment.time,
            judgment.resolution,
            judgment.resolved_at
        );
        let event = BounceEvent::new(judgment.time, judgment.position);
        let next = self.timeline.get(judgment.index + 1).copied();
        self.square.bounce(&event, next.as_ref());
        if judgment.resolution != Resolution::Passive {
            self.effects.mark(judgment.position, judgment.resolution);
        }
        self.events.push(SessionEvent::Resolved(judgment));
    }

    fn die(&mut self) {
        if !self.score.mark_died() {
            return;
        }
        let abandoned = self.timeline.abandon_future();
        self.square.kill();
        self.stop_audio();
        self.effects.burst(self.square.pos, self.config.death_burst);
        self.phase = SessionPhase::Died;
        self.events.push(SessionEvent::Died);

        let report = self.score.report();
        log::info!(
            "Died at {:.2}s: {} misses, {} bounces abandoned, accuracy {}% / total {}%",
            self.clock.playback_time(),
            report.misses,
            abandoned,
            report.accuracy,
            report.total_accuracy
        );
    }

    fn finish(&mut self) {
        self.stop_audio();
        self.phase = SessionPhase::Finished;
        self.events.push(SessionEvent::Finished);
        match self.report() {
            Some(report) => log::info!(
                "Song finished: {} hits, {} misses, total accuracy {}%",
                report.hits,
                report.misses,
                report.total_accuracy
            ),
            None => log::info!("Theatre playback finished"),
        }
    }

    /// Take the notifications produced since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// HUD values; accuracies are `None` while unscored (theatre mode)
    pub fn readout(&self) -> Readout {
        let scoring = !self.config.theatre_mode;
        Readout {
            playback_time: self.clock.playback_time(),
            hp: self.score.hp(),
            current_accuracy: self.score.current_accuracy().filter(|_| scoring),
            total_accuracy: self.score.total_accuracy().filter(|_| scoring),
            misses: self.score.misses(),
            died: self.score.died(),
            phase: self.phase,
        }
    }

    /// Pre-roll countdown; hidden in theatre mode
    pub fn countdown(&self) -> Option<Countdown> {
        if self.config.theatre_mode {
            return None;
        }
        self.clock.countdown()
    }

    /// Squash for the square at the current time
    pub fn square_squash(&self) -> Option<glam::Vec2> {
        self.square.squash(self.clock.playback_time())
    }

    /// Results screen numbers; theatre playback has none
    pub fn report(&self) -> Option<SessionReport> {
        if self.config.theatre_mode {
            return None;
        }
        Some(self.score.report())
    }

    /// Whether `point` lies inside the corridor of any path segment
    pub fn in_safe_area(&self, point: glam::Vec2) -> bool {
        self.safe_areas.iter().any(|area| area.contains(point))
    }

    pub fn playback_time(&self) -> f64 {
        self.clock.playback_time()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn square(&self) -> &Square {
        &self.square
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn safe_areas(&self) -> &[Rect] {
        &self.safe_areas
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}
