//! Session entity types
//!
//! The square and the cosmetic feedback around it. Nothing here affects
//! scoring; it only follows the timeline.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::timeline::{BounceEvent, Resolution};
use crate::consts::{MARKER_LIFETIME_S, SQUASH_DURATION_S};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Counting down, song not yet playing
    PreRoll,
    /// Song playing, bounces live
    Playing,
    /// Health ran out
    Died,
    /// All bounces resolved and the outro elapsed
    Finished,
    /// Player left mid-song
    Exited,
}

impl SessionPhase {
    /// No further frames change the outcome
    pub fn is_over(&self) -> bool {
        matches!(self, SessionPhase::Died | SessionPhase::Finished | SessionPhase::Exited)
    }
}

/// The bouncing square
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Square {
    pub pos: Vec2,
    /// Unit-ish travel direction, zero when stopped
    pub dir: Vec2,
    /// Playback time of the latest bounce
    pub last_bounce_time: f64,
    /// Whether the latest bounce reversed horizontal travel
    pub last_bounce_horizontal: bool,
    pub died: bool,
}

impl Square {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            dir: Vec2::ZERO,
            last_bounce_time: f64::NEG_INFINITY,
            last_bounce_horizontal: false,
            died: false,
        }
    }

    /// Snap onto a bounce and aim at the next one
    pub fn bounce(&mut self, event: &BounceEvent, next: Option<&BounceEvent>) {
        let incoming = self.dir;
        self.pos = event.position;
        self.last_bounce_time = event.time;
        self.dir = next
            .map(|n| (n.position - event.position).normalize_or_zero())
            .unwrap_or(incoming);
        // A flipped x component means the square hit a vertical wall
        self.last_bounce_horizontal = incoming.x * self.dir.x < 0.0;
    }

    /// Interpolate between the last bounce and the next one
    pub fn follow(&mut self, from: Option<&BounceEvent>, to: Option<&BounceEvent>, t: f64) {
        if self.died {
            return;
        }
        match (from, to) {
            (Some(a), Some(b)) if b.time > a.time => {
                let frac = ((t - a.time) / (b.time - a.time)).clamp(0.0, 1.0) as f32;
                self.pos = a.position.lerp(b.position, frac);
                self.dir = (b.position - a.position).normalize_or_zero();
            }
            (None, Some(b)) => {
                self.pos = b.position;
            }
            _ => {}
        }
    }

    /// Squash inflation (width, height) for the frames after a bounce.
    /// An early hit records a bounce that has not happened yet; nothing
    /// squashes until playback reaches it.
    pub fn squash(&self, t: f64) -> Option<Vec2> {
        let since = t - SQUASH_DURATION_S;
        if t < self.last_bounce_time || since >= self.last_bounce_time {
            return None;
        }
        let lerp = ((since - self.last_bounce_time).abs() * 5.0).powi(2) as f32;
        Some(if self.last_bounce_horizontal {
            Vec2::new(lerp * 5.0, -10.0 * lerp)
        } else {
            Vec2::new(-10.0 * lerp, lerp * 5.0)
        })
    }

    pub fn kill(&mut self) {
        self.died = true;
        self.dir = Vec2::ZERO;
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

impl Particle {
    pub fn step(&mut self, dt: f32) {
        self.pos += self.vel * dt * 60.0;
        self.vel *= 0.98;
        self.life -= dt;
        self.size *= 0.995;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Marker drawn where a bounce was resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitMarker {
    pub pos: Vec2,
    pub resolution: Resolution,
    /// Seconds remaining
    pub ttl: f32,
}

impl HitMarker {
    pub fn new(pos: Vec2, resolution: Resolution) -> Self {
        Self {
            pos,
            resolution,
            ttl: MARKER_LIFETIME_S,
        }
    }

    /// Fade level for rendering
    pub fn alpha(&self) -> f32 {
        (self.ttl / MARKER_LIFETIME_S).clamp(0.0, 1.0)
    }
}

/// Cosmetic feedback, pruned each frame with a retain pass
#[derive(Debug, Clone)]
pub struct Effects {
    rng: Pcg32,
    max_particles: usize,
    pub particles: Vec<Particle>,
    pub markers: Vec<HitMarker>,
}

impl Effects {
    pub fn new(seed: u64, max_particles: usize) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            max_particles,
            particles: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Radial burst; velocity components drawn from [-3, 3]
    pub fn burst(&mut self, pos: Vec2, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let vel = Vec2::new(
                self.rng.random_range(-3..=3) as f32,
                self.rng.random_range(-3..=3) as f32,
            );
            self.particles.push(Particle {
                pos,
                vel,
                life: 1.0,
                size: 6.0,
            });
        }
    }

    /// Single slow-drifting trail particle
    pub fn trail(&mut self, pos: Vec2) {
        if self.particles.len() >= self.max_particles {
            return;
        }
        let vel = Vec2::new(
            self.rng.random_range(-10..=10) as f32 / 20.0,
            self.rng.random_range(-10..=10) as f32 / 20.0,
        );
        self.particles.push(Particle {
            pos,
            vel,
            life: 0.5,
            size: 4.0,
        });
    }

    pub fn mark(&mut self, pos: Vec2, resolution: Resolution) {
        self.markers.push(HitMarker::new(pos, resolution));
    }

    /// Age everything and drop what has expired
    pub fn update(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.step(dt);
        }
        self.particles.retain(Particle::is_alive);

        for marker in &mut self.markers {
            marker.ttl -= dt;
        }
        self.markers.retain(|m| m.ttl > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_interpolates() {
        let a = BounceEvent::new(1.0, Vec2::new(0.0, 0.0));
        let b = BounceEvent::new(2.0, Vec2::new(100.0, 50.0));
        let mut square = Square::new(Vec2::ZERO);
        square.follow(Some(&a), Some(&b), 1.5);
        assert_eq!(square.pos, Vec2::new(50.0, 25.0));
        square.follow(Some(&a), Some(&b), 9.0);
        assert_eq!(square.pos, b.position);
    }

    #[test]
    fn test_bounce_records_direction_flip() {
        let a = BounceEvent::new(1.0, Vec2::new(100.0, 100.0));
        let b = BounceEvent::new(2.0, Vec2::new(0.0, 200.0));
        let mut square = Square::new(Vec2::ZERO);
        square.dir = Vec2::new(1.0, 1.0).normalize();
        square.bounce(&a, Some(&b));
        assert_eq!(square.pos, a.position);
        assert_eq!(square.last_bounce_time, 1.0);
        assert!(square.last_bounce_horizontal);

        let c = BounceEvent::new(3.0, Vec2::new(-100.0, 100.0));
        square.bounce(&b, Some(&c));
        assert!(!square.last_bounce_horizontal);
    }

    #[test]
    fn test_squash_window() {
        let mut square = Square::new(Vec2::ZERO);
        assert!(square.squash(0.0).is_none());

        square.last_bounce_time = 1.0;
        square.last_bounce_horizontal = true;
        // Right at the bounce: maximum squash
        let s = square.squash(1.0).unwrap();
        assert!((s.x - 7.8125).abs() < 1e-4);
        assert!((s.y + 15.625).abs() < 1e-4);
        // Window closes 0.25 s after the bounce
        assert!(square.squash(1.25).is_none());
    }

    #[test]
    fn test_no_squash_before_bounce() {
        let mut square = Square::new(Vec2::ZERO);
        square.last_bounce_time = 0.5;
        assert!(square.squash(0.4).is_none());
        assert!(square.squash(0.4999).is_none());
        assert!(square.squash(0.5).is_some());
    }

    #[test]
    fn test_dead_square_does_not_move() {
        let a = BounceEvent::new(1.0, Vec2::ZERO);
        let b = BounceEvent::new(2.0, Vec2::splat(10.0));
        let mut square = Square::new(Vec2::new(3.0, 3.0));
        square.kill();
        square.follow(Some(&a), Some(&b), 1.5);
        assert_eq!(square.pos, Vec2::new(3.0, 3.0));
        assert_eq!(square.dir, Vec2::ZERO);
    }

    #[test]
    fn test_burst_is_deterministic_and_capped() {
        let mut a = Effects::new(7, 64);
        let mut b = Effects::new(7, 64);
        a.burst(Vec2::ZERO, 100);
        b.burst(Vec2::ZERO, 100);
        assert_eq!(a.particles.len(), 64);
        for (pa, pb) in a.particles.iter().zip(&b.particles) {
            assert_eq!(pa.vel, pb.vel);
            assert!(pa.vel.x.abs() <= 3.0 && pa.vel.y.abs() <= 3.0);
        }
    }

    #[test]
    fn test_update_prunes_expired() {
        let mut fx = Effects::new(1, 64);
        fx.burst(Vec2::ZERO, 5);
        fx.mark(Vec2::ZERO, Resolution::Hit);
        fx.update(0.5);
        assert_eq!(fx.particles.len(), 5);
        assert_eq!(fx.markers.len(), 1);
        fx.update(0.6);
        assert!(fx.particles.is_empty());
        assert!(fx.markers.is_empty());
    }

    #[test]
    fn test_phase_is_over() {
        assert!(!SessionPhase::PreRoll.is_over());
        assert!(!SessionPhase::Playing.is_over());
        assert!(SessionPhase::Died.is_over());
        assert!(SessionPhase::Finished.is_over());
        assert!(SessionPhase::Exited.is_over());
    }
}
