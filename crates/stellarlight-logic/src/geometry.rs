//! Plane geometry shared by the generation pipeline and the router.

use serde::{Deserialize, Serialize};

/// A position in the galactic plane.
///
/// Generated galaxies live roughly inside the unit disc scaled by
/// `1 + core_radius`; nothing in the pipeline depends on that range.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a point from polar coordinates (angle in radians).
    pub fn from_polar(radius: f64, angle: f64) -> Self {
        Self {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        }
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounds of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Bounds of `points`, or `None` for an empty slice.
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in &points[1..] {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_polar() {
        let p = Point::from_polar(2.0, std::f64::consts::FRAC_PI_2);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
        assert!((p.length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds() {
        let points = [
            Point::new(-1.0, 2.0),
            Point::new(3.0, -4.0),
            Point::new(0.5, 0.5),
        ];
        let b = Bounds::of(&points).unwrap();
        assert_eq!(b.min, Point::new(-1.0, -4.0));
        assert_eq!(b.max, Point::new(3.0, 2.0));
        assert!((b.width() - 4.0).abs() < 1e-12);
        assert!((b.height() - 6.0).abs() < 1e-12);
        assert!(Bounds::of(&[]).is_none());
    }
}
