//! Scatter placement for hive members.
//!
//! Rejection sampling inside a rectangle centered on the origin. The spacing
//! constraint is soft: once a point has used up its attempts it is placed anywhere
//! in the rectangle, so the caller always gets exactly the number of points asked for.

use bevy::log::{debug, warn};
use bevy::math::Vec2;
use rand::Rng;

/// Fraction of the rectangle area a disc packing can realistically fill with random
/// sequential placement before rejection sampling starts failing.
const RANDOM_PACKING_DENSITY: f32 = 0.547;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementGenerator {
    /// Unscaled rectangle size (full width / height).
    pub area: Vec2,
    pub min_distance: f32,
    pub max_attempts: u32,
}

impl PlacementGenerator {
    pub fn new(area: Vec2, min_distance: f32, max_attempts: u32) -> Self {
        Self {
            area: area.max(Vec2::ZERO),
            min_distance: min_distance.max(0.0),
            max_attempts,
        }
    }

    /// Rough check whether `count` points at `min_distance` fit in the scaled area.
    pub fn is_feasible(&self, count: usize, scale: f32) -> bool {
        if count <= 1 || self.min_distance <= 0.0 {
            return true;
        }
        let scaled = self.area * scale.abs();
        let disc = std::f32::consts::PI * (self.min_distance * 0.5).powi(2);
        disc * count as f32 <= scaled.x * scaled.y * RANDOM_PACKING_DENSITY
    }

    /// Returns exactly `count` positions inside `area * scale`.
    pub fn scatter<R: Rng + ?Sized>(&self, count: usize, scale: f32, rng: &mut R) -> Vec<Vec2> {
        if count == 0 {
            return Vec::new();
        }
        if !self.is_feasible(count, scale) {
            warn!(
                target: "hive_placement",
                "min_distance {} too large for {} members in {:?} at scale {scale}; spacing is best-effort",
                self.min_distance,
                count,
                self.area
            );
        }
        let half = self.area * scale.abs() * 0.5;
        let min_d2 = self.min_distance * self.min_distance;
        let mut points: Vec<Vec2> = Vec::with_capacity(count);
        let mut relaxed = 0usize;

        for _ in 0..count {
            let mut accepted = None;
            for _ in 0..self.max_attempts {
                let candidate = sample_in(half, rng);
                if points.iter().all(|p| p.distance_squared(candidate) >= min_d2) {
                    accepted = Some(candidate);
                    break;
                }
            }
            let point = match accepted {
                Some(p) => p,
                None => {
                    relaxed += 1;
                    sample_in(half, rng)
                }
            };
            points.push(point);
        }

        if relaxed > 0 {
            debug!(target: "hive_placement", "scatter placed {relaxed}/{count} points without spacing");
        }
        points
    }
}

fn sample_axis<R: Rng + ?Sized>(half: f32, rng: &mut R) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..half)
    } else {
        0.0
    }
}

fn sample_in<R: Rng + ?Sized>(half: Vec2, rng: &mut R) -> Vec2 {
    Vec2::new(sample_axis(half.x, rng), sample_axis(half.y, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator(min_distance: f32) -> PlacementGenerator {
        PlacementGenerator::new(Vec2::new(240.0, 120.0), min_distance, 100)
    }

    #[test]
    fn zero_count_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generator(9.0).scatter(0, 1.0, &mut rng).is_empty());
    }

    #[test]
    fn returns_exact_count_when_spacing_is_impossible() {
        let mut rng = StdRng::seed_from_u64(2);
        let g = PlacementGenerator::new(Vec2::new(10.0, 10.0), 50.0, 8);
        assert!(!g.is_feasible(40, 1.0));
        let pts = g.scatter(40, 1.0, &mut rng);
        assert_eq!(pts.len(), 40);
        for p in pts {
            assert!(p.x.abs() <= 5.0 && p.y.abs() <= 5.0);
        }
    }

    #[test]
    fn respects_spacing_when_feasible() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = generator(9.0);
        let pts = g.scatter(50, 1.0, &mut rng);
        assert_eq!(pts.len(), 50);
        for (i, a) in pts.iter().enumerate() {
            for b in &pts[i + 1..] {
                assert!(a.distance(*b) >= 9.0 - 1e-4);
            }
        }
    }

    #[test]
    fn scale_widens_the_rectangle() {
        let mut rng = StdRng::seed_from_u64(4);
        let pts = generator(0.0).scatter(200, 1.5, &mut rng);
        assert!(pts.iter().all(|p| p.x.abs() <= 180.0 && p.y.abs() <= 90.0));
        assert!(pts.iter().any(|p| p.x.abs() > 120.0));
    }

    #[test]
    fn degenerate_area_and_zero_attempts() {
        let mut rng = StdRng::seed_from_u64(5);
        let g = PlacementGenerator::new(Vec2::ZERO, 5.0, 0);
        let pts = g.scatter(3, 1.0, &mut rng);
        assert_eq!(pts, vec![Vec2::ZERO; 3]);
    }
}
