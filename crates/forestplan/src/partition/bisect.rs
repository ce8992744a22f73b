use geo::Polygon;

use super::split::split_sides;
use crate::geom2::{area, bounding_box, side_area, CutAxis, CutLine, GeomCfg};

/// Upper bound on area-search iterations per cut.
const MAX_SEARCH_ITERS: usize = 64;

/// Offsets tried per axis by `connected_cuts`.
const SCAN_OFFSETS: usize = 64;

/// Midpoint cut: vertical through the bounding-box centre first, horizontal
/// second, whichever leaves positive area on both sides.
///
/// The target fraction is not used to place the line; repeated midpoint cuts
/// approach equal pieces over the recursion instead of solving each cut
/// exactly. `None` means the polygon cannot be bisected this way.
pub fn find_cut(poly: &Polygon<f64>, _target_area_fraction: f64, cfg: &GeomCfg) -> Option<CutLine> {
    let bb = bounding_box(poly)?;
    let floor = cfg.eps_area * area(poly);
    let centre = bb.center();
    [CutLine::vertical(centre.x), CutLine::horizontal(centre.y)]
        .into_iter()
        .find(|cut| side_area(poly, &cut.lower()) > floor && side_area(poly, &cut.upper()) > floor)
}

/// Cut along `axis` whose lower side holds `fraction` of the polygon area.
///
/// Bisection search over the bounding-box extent; stops when the lower-side
/// area is within `1e-9` of the total from the target or after a fixed number
/// of iterations. `None` for a fraction outside (0, 1) or an empty polygon.
pub fn find_balanced_cut(
    poly: &Polygon<f64>,
    fraction: f64,
    axis: CutAxis,
    cfg: &GeomCfg,
) -> Option<CutLine> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return None;
    }
    let bb = bounding_box(poly)?;
    let total = area(poly);
    if total <= 0.0 {
        return None;
    }
    let target = fraction * total;
    let (mut lo, mut hi) = match axis {
        CutAxis::Vertical => (bb.min().x, bb.max().x),
        CutAxis::Horizontal => (bb.min().y, bb.max().y),
    };
    let mut cut = CutLine::new(axis, 0.5 * (lo + hi));
    for _ in 0..MAX_SEARCH_ITERS {
        cut.offset = 0.5 * (lo + hi);
        let below = side_area(poly, &cut.lower());
        if (below - target).abs() <= 1e-9 * total {
            break;
        }
        if below < target {
            lo = cut.offset;
        } else {
            hi = cut.offset;
        }
    }
    let floor = cfg.eps_area * total;
    let ok = side_area(poly, &cut.lower()) > floor && side_area(poly, &cut.upper()) > floor;
    ok.then_some(cut)
}

/// Cuts along `axis` that leave exactly one connected piece on each side,
/// each paired with the lower side's share of the area.
///
/// Offsets are the cell centres of an even subdivision of the bounding box,
/// in increasing order.
pub fn connected_cuts(poly: &Polygon<f64>, axis: CutAxis, cfg: &GeomCfg) -> Vec<(CutLine, f64)> {
    let (Some(bb), total) = (bounding_box(poly), area(poly)) else {
        return Vec::new();
    };
    if total <= 0.0 {
        return Vec::new();
    }
    let (start, extent) = match axis {
        CutAxis::Vertical => (bb.min().x, bb.width()),
        CutAxis::Horizontal => (bb.min().y, bb.height()),
    };
    (0..SCAN_OFFSETS)
        .filter_map(|i| {
            let offset = start + extent * (i as f64 + 0.5) / SCAN_OFFSETS as f64;
            let cut = CutLine::new(axis, offset);
            let (lower, upper) = split_sides(poly, &cut, cfg);
            match (lower.as_slice(), upper.as_slice()) {
                ([below], [_]) => Some((cut, area(below) / total)),
                _ => None,
            }
        })
        .collect()
}
