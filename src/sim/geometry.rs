//! Spatial helpers
//!
//! Everything collides as circles, segments, or sectors. Nothing here needs
//! a physics engine.

use glam::Vec2;
use rand::Rng;

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::normalize_angle;

/// Whether two circles touch or overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

/// Closest point to `p` on the segment `a`-`b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let line_vec = b - a;
    let line_len_sq = line_vec.length_squared();
    if line_len_sq < 0.0001 {
        // Degenerate segment
        return a;
    }
    let t = ((p - a).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    a + line_vec * t
}

/// Distance from `p` to the segment `a`-`b`
#[inline]
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

/// Whether `p` lies inside the circular sector at `origin` facing `facing`
///
/// The angular test uses the absolute wrapped angle difference, so sectors
/// straddling ±π behave like any other.
pub fn in_sector(p: Vec2, origin: Vec2, facing: f32, half_span: f32, range: f32) -> bool {
    let offset = p - origin;
    let dist_sq = offset.length_squared();
    if dist_sq > range * range {
        return false;
    }
    if dist_sq < 0.0001 {
        // Standing on the apex counts as inside
        return true;
    }
    let angle = offset.y.atan2(offset.x);
    normalize_angle(angle - facing).abs() <= half_span
}

/// Clamp a position so a circle of `radius` stays inside the world
pub fn clamp_to_world(pos: Vec2, radius: f32) -> Vec2 {
    let r = radius.min(WORLD_WIDTH / 2.0).min(WORLD_HEIGHT / 2.0).max(0.0);
    Vec2::new(
        pos.x.clamp(r, WORLD_WIDTH - r),
        pos.y.clamp(r, WORLD_HEIGHT - r),
    )
}

/// Whether a point is inside the world inflated by `margin` on every side
#[inline]
pub fn within_world(pos: Vec2, margin: f32) -> bool {
    pos.x >= -margin && pos.x <= WORLD_WIDTH + margin && pos.y >= -margin && pos.y <= WORLD_HEIGHT + margin
}

/// Uniform point on the annulus `[r_min, r_max]` around `center`
pub fn random_point_on_annulus<R: Rng>(rng: &mut R, center: Vec2, r_min: f32, r_max: f32) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let radius = if r_max > r_min {
        rng.random_range(r_min..r_max)
    } else {
        r_min
    };
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Pick one item with probability proportional to its weight
///
/// Non-positive weights never win. Returns `None` when nothing can be picked.
pub fn weighted_pick<T: Copy, R: Rng>(rng: &mut R, items: &[(T, f32)]) -> Option<T> {
    let total: f32 = items.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.random_range(0.0..total);
    let mut last = None;
    for &(item, weight) in items {
        if weight <= 0.0 {
            continue;
        }
        if roll < weight {
            return Some(item);
        }
        roll -= weight;
        last = Some(item);
    }
    // Float drift can leave a sliver past the last bucket
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.1, 0.0), 5.0));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(100.0, 0.0);
        assert!((distance_to_segment(Vec2::new(50.0, 30.0), a, b) - 30.0).abs() < 1e-4);
        // Past the end uses the endpoint
        assert!((distance_to_segment(Vec2::new(103.0, 4.0), a, b) - 5.0).abs() < 1e-4);
        // Degenerate segment falls back to point distance
        assert!((distance_to_segment(Vec2::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_sector_wraparound() {
        let origin = Vec2::ZERO;
        // Facing left (π); a point just below the negative x axis is at -π + ε
        let p = Vec2::new(-100.0, -5.0);
        assert!(in_sector(p, origin, PI, 0.2, 200.0));
        assert!(!in_sector(Vec2::new(100.0, 0.0), origin, PI, 0.2, 200.0));
        // Out of range
        assert!(!in_sector(Vec2::new(-300.0, 0.0), origin, PI, 0.2, 200.0));
    }

    #[test]
    fn test_clamp_to_world() {
        let p = clamp_to_world(Vec2::new(-50.0, WORLD_HEIGHT + 50.0), 10.0);
        assert_eq!(p, Vec2::new(10.0, WORLD_HEIGHT - 10.0));
    }

    #[test]
    fn test_weighted_pick_skips_zero_weights() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let pick = weighted_pick(&mut rng, &[(1, 0.0), (2, 1.0), (3, -4.0)]);
            assert_eq!(pick, Some(2));
        }
        assert_eq!(weighted_pick::<u8, _>(&mut rng, &[]), None);
        assert_eq!(weighted_pick(&mut rng, &[(9, 0.0)]), None);
    }

    #[test]
    fn test_annulus_distance() {
        let mut rng = Pcg32::seed_from_u64(3);
        let center = Vec2::new(500.0, 500.0);
        for _ in 0..50 {
            let d = random_point_on_annulus(&mut rng, center, 100.0, 150.0).distance(center);
            assert!((100.0 - 1e-3..=150.0 + 1e-3).contains(&d));
        }
    }
}
