use geo::Polygon;

use crate::geom2::{area, clip_halfplane, split_pieces, CutLine, GeomCfg, Hs2};

/// Apply `cut` and keep the first two connected pieces (lower side first).
///
/// Extra fragments are dropped with a warning. When the cut leaves fewer than
/// two pieces the original polygon comes back with `None`.
pub fn split(poly: &Polygon<f64>, cut: &CutLine, cfg: &GeomCfg) -> (Polygon<f64>, Option<Polygon<f64>>) {
    let mut pieces = split_pieces(poly, cut, cfg).into_iter();
    match (pieces.next(), pieces.next()) {
        (Some(first), Some(second)) => {
            let dropped: Vec<Polygon<f64>> = pieces.collect();
            if !dropped.is_empty() {
                let lost: f64 = dropped.iter().map(area).sum();
                tracing::warn!(
                    fragments = dropped.len(),
                    dropped_area = lost,
                    axis = ?cut.axis,
                    offset = cut.offset,
                    "split produced more than two pieces; extra fragments dropped"
                );
            }
            (first, Some(second))
        }
        _ => (poly.clone(), None),
    }
}

/// Connected pieces on each side of `cut`, slivers removed.
pub fn split_sides(
    poly: &Polygon<f64>,
    cut: &CutLine,
    cfg: &GeomCfg,
) -> (Vec<Polygon<f64>>, Vec<Polygon<f64>>) {
    let floor = cfg.eps_area * area(poly);
    let keep = |hs: Hs2| -> Vec<Polygon<f64>> {
        clip_halfplane(poly, &hs)
            .0
            .into_iter()
            .filter(|p| area(p) > floor)
            .collect()
    };
    (keep(cut.lower()), keep(cut.upper()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2::tests::{square, u_shape};

    #[test]
    fn square_splits_into_two_halves() {
        let (left, right) = split(&square(10.0), &CutLine::vertical(5.0), &GeomCfg::default());
        let right = right.expect("two pieces");
        assert!((area(&left) - 50.0).abs() < 1e-9);
        assert!((area(&right) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn cut_outside_returns_original() {
        let sq = square(10.0);
        let (same, none) = split(&sq, &CutLine::vertical(20.0), &GeomCfg::default());
        assert!(none.is_none());
        assert_eq!(same, sq);
    }

    #[test]
    fn third_fragment_is_dropped() {
        let u = u_shape();
        let (first, second) = split(&u, &CutLine::horizontal(10.0), &GeomCfg::default());
        let second = second.expect("two pieces");
        assert!((area(&first) - 250.0).abs() < 1e-9);
        assert!((area(&second) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn sides_keep_components_apart() {
        let (lower, upper) = split_sides(&u_shape(), &CutLine::horizontal(10.0), &GeomCfg::default());
        assert_eq!(lower.len(), 1);
        assert_eq!(upper.len(), 2);
    }
}
