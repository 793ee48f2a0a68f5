//! Axis-aligned geometry for safe areas and bounce pegs

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (min inclusive, max exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Rectangle spanning two arbitrary corners
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Grow (or shrink, with negative values) by `amount` on each axis total
    pub fn inflate(&self, amount: Vec2) -> Self {
        Self::from_center(self.center(), self.size() + amount)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let r = Rect::from_corners(Vec2::new(10.0, -5.0), Vec2::new(-2.0, 4.0));
        assert_eq!(r.min, Vec2::new(-2.0, -5.0));
        assert_eq!(r.max, Vec2::new(10.0, 4.0));
    }

    #[test]
    fn test_contains_edges() {
        let r = Rect::from_corners(Vec2::ZERO, Vec2::splat(10.0));
        assert!(r.contains(Vec2::ZERO));
        assert!(r.contains(Vec2::new(9.9, 9.9)));
        assert!(!r.contains(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn test_inflate_keeps_center() {
        let r = Rect::from_center(Vec2::new(3.0, 4.0), Vec2::splat(10.0));
        let squashed = r.inflate(Vec2::new(5.0, -10.0));
        assert_eq!(squashed.center(), r.center());
        assert_eq!(squashed.size(), Vec2::new(15.0, 0.0));
    }
}
