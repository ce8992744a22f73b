//! Planar primitives the partitioner and the placer consume.
//!
//! Area, bounding box, containment and boolean clipping come from `geo`;
//! cut sides are expressed as `Hs2` half-spaces and turned into a convex clip
//! region before handing them to `BooleanOps`.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BooleanOps, BoundingRect, Contains, Coord, Line, LineString, MultiPolygon, Point, Polygon, Rect};
use nalgebra::Vector2;

use super::types::{CutLine, GeomCfg, Hs2};
use crate::error::{GeometryError, Result};

/// Unsigned planar area (holes subtracted).
#[inline]
pub fn area(poly: &Polygon<f64>) -> f64 {
    poly.unsigned_area()
}

/// Axis-aligned bounding box, `None` for an empty polygon.
#[inline]
pub fn bounding_box(poly: &Polygon<f64>) -> Option<Rect<f64>> {
    poly.bounding_rect()
}

/// Strict interior containment of a coordinate.
#[inline]
pub fn contains(poly: &Polygon<f64>, c: Coord<f64>) -> bool {
    poly.contains(&Point::from(c))
}

/// Sutherland–Hodgman step: clip a convex ring (no closing vertex) by one half-space.
fn clip_convex(ring: &[Vector2<f64>], hs: &Hs2) -> Vec<Vector2<f64>> {
    let mut out = Vec::with_capacity(ring.len() + 1);
    for k in 0..ring.len() {
        let p = ring[k];
        let q = ring[(k + 1) % ring.len()];
        let sp = hs.slack(p);
        let sq = hs.slack(q);
        if sp >= 0.0 {
            out.push(p);
        }
        if (sp >= 0.0) != (sq >= 0.0) {
            let t = sp / (sp - sq);
            out.push(p + (q - p) * t);
        }
    }
    out.dedup_by(|a, b| (*a - *b).norm() < 1e-12);
    if out.len() > 1 && (out[0] - out[out.len() - 1]).norm() < 1e-12 {
        out.pop();
    }
    out
}

/// `poly ∩ hs` as connected components (each a polygon with its own holes).
///
/// The half-space is bounded to a padded copy of the polygon's bounding box,
/// which keeps the clip region finite without changing the result.
pub fn clip_halfplane(poly: &Polygon<f64>, hs: &Hs2) -> MultiPolygon<f64> {
    let Some(bb) = bounding_box(poly) else {
        return MultiPolygon(Vec::new());
    };
    let pad = bb.width().max(bb.height()) + 1.0;
    let (lo, hi) = (bb.min(), bb.max());
    let corners = [
        Vector2::new(lo.x - pad, lo.y - pad),
        Vector2::new(hi.x + pad, lo.y - pad),
        Vector2::new(hi.x + pad, hi.y + pad),
        Vector2::new(lo.x - pad, hi.y + pad),
    ];
    if corners.iter().all(|&c| hs.satisfies_eps(c, 0.0)) {
        return MultiPolygon(vec![poly.clone()]);
    }
    let region = clip_convex(&corners, hs);
    if region.len() < 3 {
        return MultiPolygon(Vec::new());
    }
    let ring: Vec<Coord<f64>> = region.iter().map(|v| Coord { x: v.x, y: v.y }).collect();
    let clip = Polygon::new(LineString::from(ring), Vec::new());
    poly.intersection(&clip)
}

/// Area of `poly` on the closed side `hs`.
pub fn side_area(poly: &Polygon<f64>, hs: &Hs2) -> f64 {
    clip_halfplane(poly, hs).unsigned_area()
}

/// Connected pieces on the lower side followed by those on the upper side.
///
/// Slivers at or below `cfg.eps_area * area(poly)` are discarded.
pub fn split_pieces(poly: &Polygon<f64>, cut: &CutLine, cfg: &GeomCfg) -> Vec<Polygon<f64>> {
    let floor = cfg.eps_area * area(poly);
    let lower = clip_halfplane(poly, &cut.lower());
    let upper = clip_halfplane(poly, &cut.upper());
    lower
        .0
        .into_iter()
        .chain(upper.0)
        .filter(|p| area(p) > floor)
        .collect()
}

/// Reject rings that a partition cannot meaningfully work on.
///
/// Checks: finite coordinates, at least three distinct exterior vertices,
/// positive area, simple rings, holes inside the exterior and rings not
/// touching each other.
pub fn validate(poly: &Polygon<f64>, cfg: &GeomCfg) -> Result<()> {
    let rings: Vec<&LineString<f64>> = std::iter::once(poly.exterior()).chain(poly.interiors()).collect();
    if rings
        .iter()
        .flat_map(|r| r.0.iter())
        .any(|c| !(c.x.is_finite() && c.y.is_finite()))
    {
        return Err(GeometryError::invalid("non-finite coordinate"));
    }
    let distinct = distinct_vertices(poly.exterior(), cfg.eps_coord);
    if distinct < 3 {
        return Err(GeometryError::invalid(format!(
            "exterior ring has {distinct} distinct vertices, need at least 3"
        )));
    }
    if area(poly) <= 0.0 {
        return Err(GeometryError::invalid("zero-area polygon"));
    }
    let segments: Vec<Vec<Line<f64>>> = rings.iter().map(|r| ring_segments(r, cfg.eps_coord)).collect();
    for (k, segs) in segments.iter().enumerate() {
        if let Some((i, j)) = self_crossing(segs) {
            return Err(GeometryError::invalid(format!(
                "ring {k} self-intersects (segments {i} and {j})"
            )));
        }
    }
    let shell = Polygon::new(poly.exterior().clone(), Vec::new());
    for (k, hole) in poly.interiors().iter().enumerate() {
        let inside = hole.0.first().is_some_and(|&c| contains(&shell, c));
        if !inside {
            return Err(GeometryError::invalid(format!("hole {k} lies outside the exterior ring")));
        }
    }
    for a in 0..segments.len() {
        for b in (a + 1)..segments.len() {
            let touching = segments[a]
                .iter()
                .any(|sa| segments[b].iter().any(|sb| line_intersection(*sa, *sb).is_some()));
            if touching {
                return Err(GeometryError::invalid(format!("rings {a} and {b} intersect")));
            }
        }
    }
    Ok(())
}

fn distinct_vertices(ring: &LineString<f64>, eps: f64) -> usize {
    let mut pts: Vec<Coord<f64>> = ring.0.clone();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup_by(|a, b| (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps);
    pts.len()
}

/// Ring edges with zero-length segments (repeated vertices) removed.
fn ring_segments(ring: &LineString<f64>, eps: f64) -> Vec<Line<f64>> {
    ring.lines()
        .filter(|l| (l.end.x - l.start.x).abs() > eps || (l.end.y - l.start.y).abs() > eps)
        .collect()
}

/// First pair of edges that cross, overlap, or touch away from their shared vertex.
fn self_crossing(segs: &[Line<f64>]) -> Option<(usize, usize)> {
    let m = segs.len();
    for i in 0..m {
        for j in (i + 1)..m {
            let adjacent = j == i + 1 || (i == 0 && j == m - 1);
            match line_intersection(segs[i], segs[j]) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return Some((i, j)),
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::SinglePoint { .. }) => return Some((i, j)),
            }
        }
    }
    None
}
