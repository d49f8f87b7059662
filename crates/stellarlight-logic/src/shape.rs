//! Point-field sampling for galaxy shapes.
//!
//! Spiral galaxies are built arm by arm: the i-th accepted point is assigned
//! to arm `i % arms`, its radius grows with `i`, and its angle follows the
//! arm plus a twist term. Jitter shrinks towards the rim so the core is
//! dense and messy while the outer arms stay clean. A small fraction of
//! outer points is dropped halfway between two arms.

use std::f64::consts::PI;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Galaxy shapes the generator knows how to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GalaxyShape {
    Spiral,
}

impl GalaxyShape {
    pub fn name(self) -> &'static str {
        match self {
            GalaxyShape::Spiral => "spiral",
        }
    }
}

impl FromStr for GalaxyShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spiral" => Ok(GalaxyShape::Spiral),
            other => Err(other.to_string()),
        }
    }
}

/// Tuning for the spiral sampler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpiralParams {
    /// Number of spiral arms.
    pub arms: u32,
    /// Radial jitter scale, as a fraction of the radius.
    pub arm_spread: f64,
    /// Radius of the empty-ish core, added to every sampled radius.
    pub core_radius: f64,
    /// Half-turns of twist from core to rim.
    pub twist: f64,
    /// Minimum distance between any two accepted points.
    pub min_distance: f64,
    /// Chance that an outer point lands between two arms.
    pub interarm_chance: f64,
    /// Candidate budget per requested point.
    pub attempt_factor: usize,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            arms: 2,
            arm_spread: 0.5,
            core_radius: 0.2,
            twist: 2.0,
            min_distance: 0.01,
            interarm_chance: 0.02,
            attempt_factor: 200,
        }
    }
}

/// Sample up to `count` points in a spiral.
///
/// Best effort: if the candidate budget (`count * attempt_factor`) runs out
/// before `count` points pass the minimum-distance check, the points
/// accepted so far are returned and the caller decides what to do.
pub fn generate_spiral_points(count: usize, params: &SpiralParams, rng: &mut impl Rng) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::with_capacity(count);
    if count == 0 {
        return points;
    }

    let arms = params.arms.max(1);
    let arm_width = 2.0 * PI / arms as f64;
    let min_dist_sq = params.min_distance * params.min_distance;
    let max_attempts = count.saturating_mul(params.attempt_factor.max(1));
    let mut attempts = 0;

    while points.len() < count && attempts < max_attempts {
        attempts += 1;
        let i = points.len();

        let frac = (params.core_radius + i as f64 / count as f64) / (1.0 + params.core_radius);
        let biased = frac.powf(1.5);
        let radius = params.core_radius + biased;
        let twist = biased * params.twist * PI;

        let angle = if biased > 0.5 && rng.gen::<f64>() < params.interarm_chance {
            let arm = rng.gen_range(0..arms);
            twist + arm as f64 * arm_width + arm_width / 2.0
        } else {
            let arm = i as u32 % arms;
            twist + arm as f64 * arm_width
        };

        let jitter = 1.0 - biased;
        let jitter_angle = angle + (rng.gen::<f64>() - 0.5) * arm_width * jitter;
        let jitter_radius =
            radius + (rng.gen::<f64>() - 0.5) * params.arm_spread * (jitter + 0.1) * radius;
        let candidate = Point::from_polar(jitter_radius, jitter_angle);
        if !candidate.is_finite() {
            continue;
        }

        let too_close = points
            .iter()
            .any(|p| p.distance_squared(&candidate) < min_dist_sq);
        if !too_close {
            points.push(candidate);
        }
    }

    if points.len() < count {
        log::debug!(
            "Spiral sampler accepted {}/{} points after {} candidates",
            points.len(),
            count,
            attempts
        );
    }

    points
}

/// Sample points for `shape`.
pub fn generate_points(
    shape: GalaxyShape,
    count: usize,
    params: &SpiralParams,
    rng: &mut impl Rng,
) -> Vec<Point> {
    match shape {
        GalaxyShape::Spiral => generate_spiral_points(count, params, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_full_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let points = generate_spiral_points(500, &SpiralParams::default(), &mut rng);
        assert_eq!(points.len(), 500);
        assert!(points.iter().all(Point::is_finite));
    }

    #[test]
    fn test_min_distance_respected() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let params = SpiralParams {
            min_distance: 0.05,
            ..Default::default()
        };
        let points = generate_spiral_points(200, &params, &mut rng);
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                assert!(a.distance(b) >= 0.05);
            }
        }
    }

    #[test]
    fn test_short_result_when_space_runs_out() {
        // Galaxy radius stays under ~2, so a min distance of 10 leaves room
        // for exactly one point.
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let params = SpiralParams {
            min_distance: 10.0,
            attempt_factor: 20,
            ..Default::default()
        };
        let points = generate_spiral_points(50, &params, &mut rng);
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_zero_points() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(generate_spiral_points(0, &SpiralParams::default(), &mut rng).is_empty());
    }

    #[test]
    fn test_deterministic_for_seed() {
        let params = SpiralParams::default();
        let a = generate_spiral_points(100, &params, &mut ChaCha8Rng::seed_from_u64(9));
        let b = generate_spiral_points(100, &params, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_radius_bounded() {
        let params = SpiralParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let points = generate_spiral_points(300, &params, &mut rng);
        // radius <= core + 1, jitter adds at most spread * 1.1 / 2 of it.
        let limit = (params.core_radius + 1.0) * (1.0 + params.arm_spread * 1.1 / 2.0);
        assert!(points.iter().all(|p| p.length() <= limit + 1e-9));
    }

    #[test]
    fn test_non_finite_candidates_dropped() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let params = SpiralParams {
            core_radius: -0.5,
            attempt_factor: 5,
            ..Default::default()
        };
        let points = generate_spiral_points(100, &params, &mut rng);
        assert!(points.len() < 100);
        assert!(points.iter().all(Point::is_finite));
    }

    /// Angle of every accepted point relative to its arm, for a sampler run
    /// with no radial jitter and no spacing so point `i` is candidate `i`.
    fn arm_offsets(params: &SpiralParams, count: usize, seed: u64) -> Vec<(f64, f64, usize)> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = generate_spiral_points(count, params, &mut rng);
        assert_eq!(points.len(), count);
        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let frac = (params.core_radius + i as f64 / count as f64) / (1.0 + params.core_radius);
                let biased = frac.powf(1.5);
                let twist = biased * params.twist * PI;
                (p.y.atan2(p.x) - twist, biased, i)
            })
            .collect()
    }

    fn angle_gap(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(2.0 * PI);
        d.min(2.0 * PI - d)
    }

    #[test]
    fn test_interarm_leak() {
        let params = SpiralParams {
            arm_spread: 0.0,
            min_distance: 0.0,
            interarm_chance: 1.0,
            ..Default::default()
        };
        let arm_width = 2.0 * PI / params.arms as f64;
        let offsets = arm_offsets(&params, 200, 11);
        let mut leaked = 0;
        for (offset, biased, i) in offsets {
            let max_jitter = arm_width * (1.0 - biased) / 2.0 + 1e-9;
            if biased > 0.5 {
                // Halfway between two arms, whichever pair was drawn.
                let between = (offset - arm_width / 2.0).rem_euclid(arm_width);
                assert!(between.min(arm_width - between) <= max_jitter, "point {}", i);
                leaked += 1;
            } else {
                let arm = (i % params.arms as usize) as f64;
                assert!(angle_gap(offset, arm * arm_width) <= max_jitter, "point {}", i);
            }
        }
        assert!(leaked > 0);
    }

    #[test]
    fn test_no_leak_without_chance() {
        let params = SpiralParams {
            arm_spread: 0.0,
            min_distance: 0.0,
            interarm_chance: 0.0,
            ..Default::default()
        };
        let arm_width = 2.0 * PI / params.arms as f64;
        for (offset, biased, i) in arm_offsets(&params, 200, 12) {
            let arm = (i % params.arms as usize) as f64;
            let max_jitter = arm_width * (1.0 - biased) / 2.0 + 1e-9;
            assert!(angle_gap(offset, arm * arm_width) <= max_jitter, "point {}", i);
        }
    }

    #[test]
    fn test_shape_from_str() {
        assert_eq!("spiral".parse::<GalaxyShape>(), Ok(GalaxyShape::Spiral));
        assert_eq!(" Spiral ".parse::<GalaxyShape>(), Ok(GalaxyShape::Spiral));
        assert_eq!("ring".parse::<GalaxyShape>(), Err("ring".to_string()));
        assert_eq!(GalaxyShape::Spiral.name(), "spiral");
    }
}
