//! Worklist traversal for the recursive bisection.

use geo::Polygon;

use super::bisect::{connected_cuts, find_balanced_cut, find_cut};
use super::split::{split, split_sides};
use super::{compartment_id, AreaDeviation, Compartment, Partition, PartitionCfg, PartitionStrategy};
use crate::error::{GeometryError, Result};
use crate::geom2::{area, bounding_box, split_pieces, validate, CutAxis, CutLine, GeomCfg};

/// Validate `poly` and cut it into `n` (or, for `Midpoint`, at most `n`) compartments.
pub fn partition(poly: &Polygon<f64>, n: usize, cfg: &PartitionCfg) -> Result<Partition> {
    if n < 1 {
        return Err(GeometryError::InvalidCount(n));
    }
    validate(poly, &cfg.geom)?;
    let total = area(poly);
    let target_area = total / n as f64;
    tracing::info!(
        num_compartments = n,
        total_area = total,
        target_area,
        strategy = ?cfg.strategy,
        "partitioning boundary"
    );

    let mut compartments = PartitionRunner::new(n, target_area, cfg).run(poly.clone());
    for (k, c) in compartments.iter_mut().enumerate() {
        debug_assert_eq!(c.id, compartment_id(k + 1));
        c.id = compartment_id(k + 1);
    }
    if compartments.len() != n {
        tracing::warn!(
            requested = n,
            produced = compartments.len(),
            "compartment count differs from request"
        );
    }
    let deviations = area_deviations(&compartments, cfg.balance_tolerance);
    Ok(Partition {
        compartments,
        deviations,
        target_area,
    })
}

/// Shorthand for `partition(poly, n, &PartitionCfg::default())`.
pub fn partition_with_defaults(poly: &Polygon<f64>, n: usize) -> Result<Partition> {
    partition(poly, n, &PartitionCfg::default())
}

/// Compartments whose area deviates from the mean by more than `tolerance × mean`.
///
/// Every hit is logged at `warn`; nothing is rejected.
pub fn area_deviations(compartments: &[Compartment], tolerance: f64) -> Vec<AreaDeviation> {
    if compartments.is_empty() {
        return Vec::new();
    }
    let mean = compartments.iter().map(|c| c.area).sum::<f64>() / compartments.len() as f64;
    let tol = tolerance * mean;
    let out: Vec<AreaDeviation> = compartments
        .iter()
        .filter_map(|c| {
            let deviation = (c.area - mean).abs();
            (deviation > tol).then(|| AreaDeviation {
                id: c.id.clone(),
                area: c.area,
                deviation,
                tolerance: tol,
            })
        })
        .collect();
    for d in &out {
        tracing::warn!(
            compartment = %d.id,
            deviation = d.deviation,
            tolerance = d.tolerance,
            "compartment area outside balance tolerance"
        );
    }
    tracing::info!(mean_area = mean, outliers = out.len(), "compartment validation complete");
    out
}

/// Pending piece: polygon, depth, and the number of compartments it owes
/// (`Balanced` only; `Midpoint` ignores it).
struct Node {
    poly: Polygon<f64>,
    depth: usize,
    owed: usize,
}

/// Traversal context carrying the request parameters and the accumulator.
struct PartitionRunner<'a> {
    cfg: &'a PartitionCfg,
    n: usize,
    target_area: f64,
    out: Vec<Compartment>,
    stack: Vec<Node>,
}

impl<'a> PartitionRunner<'a> {
    fn new(n: usize, target_area: f64, cfg: &'a PartitionCfg) -> Self {
        Self {
            cfg,
            n,
            target_area,
            out: Vec::with_capacity(n),
            stack: Vec::new(),
        }
    }

    /// Depth-first, left before right: children are pushed right first.
    ///
    /// `Midpoint` stops as soon as `n` compartments exist; `Balanced` drains the
    /// stack so every piece ends up in a compartment.
    fn run(mut self, root: Polygon<f64>) -> Vec<Compartment> {
        self.stack.push(Node {
            poly: root,
            depth: 0,
            owed: self.n,
        });
        while let Some(node) = self.stack.pop() {
            if self.cfg.strategy == PartitionStrategy::Midpoint && self.out.len() >= self.n {
                break;
            }
            match self.cfg.strategy {
                PartitionStrategy::Midpoint => self.visit_midpoint(node),
                PartitionStrategy::Balanced => self.visit_balanced(node),
            }
        }
        self.out
    }

    fn accept(&mut self, poly: Polygon<f64>, depth: usize) {
        let c = Compartment::new(self.out.len() + 1, poly);
        tracing::debug!(compartment = %c.id, area = c.area, depth, "compartment accepted");
        self.out.push(c);
    }

    /// Queue `(piece, owed)` children so the first one is visited next.
    fn push_children(&mut self, children: Vec<(Polygon<f64>, usize)>, depth: usize) {
        for (poly, owed) in children.into_iter().rev() {
            self.stack.push(Node { poly, depth, owed });
        }
    }

    fn visit_midpoint(&mut self, node: Node) {
        let Node { poly, depth, .. } = node;
        let a = area(&poly);
        if (a - self.target_area).abs() < self.target_area * self.cfg.accept_frac
            || depth > self.cfg.max_depth
        {
            self.accept(poly, depth);
            return;
        }
        let Some(cut) = find_cut(&poly, self.target_area / a, &self.cfg.geom) else {
            self.accept(poly, depth);
            return;
        };
        match split(&poly, &cut, &self.cfg.geom) {
            (left, Some(right)) => self.push_children(vec![(left, 1), (right, 1)], depth + 1),
            // Same outcome as recursing until the depth cap.
            (same, None) => self.accept(same, depth),
        }
    }

    fn visit_balanced(&mut self, node: Node) {
        let Node { poly, depth, owed } = node;
        if owed <= 1 || depth > self.cfg.max_depth {
            if owed > 1 {
                tracing::warn!(owed, depth, "depth cap reached; piece accepted as one compartment");
            }
            self.accept(poly, depth);
            return;
        }
        let cfg = self.cfg;
        let geom = &cfg.geom;
        let k_left = owed.div_ceil(2);
        let fraction = k_left as f64 / owed as f64;
        let axes = self.axis_order(&poly);

        for axis in axes {
            let Some(cut) = find_balanced_cut(&poly, fraction, axis, geom) else {
                continue;
            };
            if let Some((l, r)) = connected_pair(&poly, &cut, geom) {
                self.push_children(vec![(l, k_left), (r, owed - k_left)], depth + 1);
                return;
            }
        }

        // Sampled cut with connected sides whose share best fits whole leaves.
        let best = axes
            .iter()
            .flat_map(|&axis| connected_cuts(&poly, axis, geom))
            .map(|(cut, share)| {
                let k = ((share * owed as f64).round() as usize).clamp(1, owed - 1);
                (cut, k, (share - k as f64 / owed as f64).abs())
            })
            .min_by(|a, b| a.2.total_cmp(&b.2));
        if let Some((cut, k, _)) = best {
            if let Some((l, r)) = connected_pair(&poly, &cut, geom) {
                tracing::debug!(owed, depth, left = k, offset = cut.offset, "uneven cut with connected sides");
                self.push_children(vec![(l, k), (r, owed - k)], depth + 1);
                return;
            }
        }

        // Every sampled cut disconnects a side: keep all pieces of the midpoint cut.
        if let Some(cut) = find_cut(&poly, fraction, geom) {
            let pieces = split_pieces(&poly, &cut, geom);
            if pieces.len() >= 2 {
                if pieces.len() > owed {
                    tracing::warn!(
                        pieces = pieces.len(),
                        owed,
                        "piece fell apart into more parts than it owes; each part becomes a compartment"
                    );
                }
                let areas: Vec<f64> = pieces.iter().map(area).collect();
                let leaves = share_leaves(&areas, owed);
                self.push_children(pieces.into_iter().zip(leaves).collect(), depth + 1);
                return;
            }
        }
        tracing::warn!(owed, depth, "piece could not be bisected; accepted as one compartment");
        self.accept(poly, depth);
    }

    /// Longer bounding-box side is cut first.
    fn axis_order(&self, poly: &Polygon<f64>) -> [CutAxis; 2] {
        let first = match bounding_box(poly) {
            Some(bb) if bb.height() > bb.width() => CutAxis::Horizontal,
            _ => CutAxis::Vertical,
        };
        [first, first.other()]
    }
}

/// Both sides of `cut` when each is a single connected piece.
fn connected_pair(
    poly: &Polygon<f64>,
    cut: &CutLine,
    cfg: &GeomCfg,
) -> Option<(Polygon<f64>, Polygon<f64>)> {
    let (mut lower, mut upper) = split_sides(poly, cut, cfg);
    if lower.len() == 1 && upper.len() == 1 {
        Some((lower.pop()?, upper.pop()?))
    } else {
        None
    }
}

/// Split `owed` leaves across pieces in proportion to area, at least one each.
///
/// With at least as many pieces as leaves every piece gets exactly one.
fn share_leaves(areas: &[f64], owed: usize) -> Vec<usize> {
    let total: f64 = areas.iter().sum();
    if areas.len() >= owed || total <= 0.0 {
        return vec![1; areas.len()];
    }
    let ideal: Vec<f64> = areas.iter().map(|a| owed as f64 * a / total).collect();
    let mut leaves: Vec<usize> = ideal.iter().map(|x| (x.floor() as usize).max(1)).collect();
    let mut assigned: usize = leaves.iter().sum();
    while assigned > owed {
        let surplus = (0..leaves.len())
            .filter(|&k| leaves[k] > 1)
            .max_by(|&a, &b| (leaves[a] as f64 - ideal[a]).total_cmp(&(leaves[b] as f64 - ideal[b])));
        let Some(k) = surplus else { break };
        leaves[k] -= 1;
        assigned -= 1;
    }
    while assigned < owed {
        let deficit = (0..leaves.len())
            .max_by(|&a, &b| (ideal[a] - leaves[a] as f64).total_cmp(&(ideal[b] - leaves[b] as f64)));
        let Some(k) = deficit else { break };
        leaves[k] += 1;
        assigned += 1;
    }
    leaves
}

#[cfg(test)]
mod tests {
    use super::share_leaves;

    #[test]
    fn leaves_follow_area() {
        assert_eq!(share_leaves(&[1.0, 1.0], 4), vec![2, 2]);
        assert_eq!(share_leaves(&[3.0, 1.0], 4), vec![3, 1]);
        assert_eq!(share_leaves(&[2.0, 1.0, 1.0], 5).iter().sum::<usize>(), 5);
    }

    #[test]
    fn every_piece_gets_a_leaf() {
        assert_eq!(share_leaves(&[0.1, 0.1, 2.8], 3), vec![1, 1, 1]);
        assert_eq!(share_leaves(&[0.1, 9.9], 3), vec![1, 2]);
        assert_eq!(share_leaves(&[1.0, 1.0, 1.0], 2), vec![1, 1, 1]);
    }
}
