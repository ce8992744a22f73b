//! Seeded random boundaries for property tests, benches and the CLI demo.
//!
//! A boundary is the convex hull of `vertices` points placed around the unit
//! circle with jittered angle and radius; `rescale_to_area` then gives it a
//! real-world size and position. `ReplayToken` is also what the random plot
//! placer seeds from.

use geo::{Area, Centroid, ConvexHull, Coord, MapCoords, MultiPoint, Point, Polygon};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// Jittered-circle boundary shape.
#[derive(Clone, Copy, Debug)]
pub struct RadialCfg {
    /// Points drawn before taking the hull (at least 3).
    pub vertices: usize,
    /// Angular jitter as a fraction of the spacing `2π / vertices`, clamped to [0, 0.49].
    pub angle_jitter: f64,
    /// Radius is `1 + u` with `u` uniform in `[-radial_jitter, radial_jitter]`.
    pub radial_jitter: f64,
    pub random_phase: bool,
}

impl Default for RadialCfg {
    fn default() -> Self {
        Self {
            vertices: 12,
            angle_jitter: 0.3,
            radial_jitter: 0.25,
            random_phase: true,
        }
    }
}

/// `(seed, index)` pair naming one reproducible random stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    /// RNG for this token; equal tokens give equal streams.
    pub fn to_std_rng(self) -> StdRng {
        let key = self.seed.rotate_left(29) ^ self.index.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        StdRng::seed_from_u64(key)
    }
}

/// Convex boundary around the origin, roughly of unit radius.
///
/// `None` when the drawn points are degenerate (fewer than three hull vertices).
pub fn draw_boundary_radial(cfg: RadialCfg, tok: ReplayToken) -> Option<Polygon<f64>> {
    let mut rng = tok.to_std_rng();
    let n = cfg.vertices.max(3);
    let spacing = TAU / n as f64;
    let jitter = cfg.angle_jitter.clamp(0.0, 0.49) * spacing;
    let spread = cfg.radial_jitter.max(0.0);
    let phase = if cfg.random_phase { rng.gen_range(0.0..TAU) } else { 0.0 };

    let points: Vec<Point<f64>> = (0..n)
        .map(|k| {
            let theta = phase + k as f64 * spacing + jitter * rng.gen_range(-1.0..=1.0);
            let r = (1.0 + spread * rng.gen_range(-1.0..=1.0)).max(1e-6);
            Point::new(r * theta.cos(), r * theta.sin())
        })
        .collect();
    let hull = MultiPoint::from(points).convex_hull();
    (hull.exterior().0.len() >= 4 && hull.unsigned_area() > 0.0).then_some(hull)
}

/// Scale about the area centroid to `target_area`, then move the centroid to `origin`.
pub fn rescale_to_area(poly: &Polygon<f64>, target_area: f64, origin: Coord<f64>) -> Option<Polygon<f64>> {
    let current = poly.unsigned_area();
    if !(target_area.is_finite() && target_area > 0.0) || current <= 0.0 {
        return None;
    }
    let centre = poly.centroid()?;
    let s = (target_area / current).sqrt();
    Some(poly.map_coords(|p| Coord {
        x: (p.x - centre.x()) * s + origin.x,
        y: (p.y - centre.y()) * s + origin.y,
    }))
}
