//! Equal-area compartment partitioning by recursive axis-aligned bisection.
//!
//! Purpose
//! - Cut a validated boundary polygon into labeled compartments `C1..Ck` of
//!   roughly equal area.
//!
//! Structure
//! - `bisect`: chooses a cutting line (bounding-box midpoint, or an area search
//!   for a given fraction).
//! - `split`: applies a cut and returns the first two connected pieces.
//! - `runner`: worklist traversal carrying the accumulator, plus the
//!   post-hoc area balance report.
//!
//! Strategies
//! - `Midpoint` keeps the left-exhaustive, threshold-stopped traversal: every
//!   node first checks whether `n` compartments already exist, accepts a piece
//!   within `accept_frac` of the target area (or past `max_depth`), and
//!   otherwise bisects at the bounding-box midpoint.
//! - `Balanced` hands each node the number of leaves it owes and cuts at the
//!   area fraction `ceil(k/2)/k`. When that cut disconnects a side it takes
//!   the sampled cut with connected sides whose share best fits a whole number
//!   of leaves, and failing that keeps every piece of a midpoint cut. Area is
//!   never dropped; the count is exactly `n` unless a node falls apart into
//!   more pieces than it owes.

mod bisect;
mod runner;
mod split;

use geo::Polygon;

use crate::geom2::{area, GeomCfg};

pub use bisect::{connected_cuts, find_balanced_cut, find_cut};
pub use runner::{area_deviations, partition, partition_with_defaults};
pub use split::{split, split_sides};

/// One labeled piece of a partitioned boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Compartment {
    pub id: String,
    pub polygon: Polygon<f64>,
    pub area: f64,
}

impl Compartment {
    /// Compartment number `seq` (1-based), area computed from the polygon.
    pub fn new(seq: usize, polygon: Polygon<f64>) -> Self {
        let area = area(&polygon);
        Self {
            id: compartment_id(seq),
            polygon,
            area,
        }
    }
}

/// `C{seq}` label for the 1-based creation index.
#[inline]
pub fn compartment_id(seq: usize) -> String {
    format!("C{seq}")
}

/// Traversal strategy for the recursive bisection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// Bounding-box midpoint cuts, stop once `n` compartments exist.
    Midpoint,
    /// Area-fraction cuts with `ceil(k/2)` / `floor(k/2)` leaves per side.
    #[default]
    Balanced,
}

/// Partitioner configuration.
#[derive(Clone, Copy, Debug)]
pub struct PartitionCfg {
    pub strategy: PartitionStrategy,
    /// `Midpoint`: accept a piece whose area is within this fraction of the target.
    pub accept_frac: f64,
    /// Pieces deeper than this are accepted as they are.
    pub max_depth: usize,
    /// Post-hoc report threshold, relative to the mean compartment area.
    pub balance_tolerance: f64,
    pub geom: GeomCfg,
}

impl Default for PartitionCfg {
    fn default() -> Self {
        Self {
            strategy: PartitionStrategy::default(),
            accept_frac: 0.10,
            max_depth: 10,
            balance_tolerance: 0.05,
            geom: GeomCfg::default(),
        }
    }
}

/// A compartment whose area falls outside the balance tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaDeviation {
    pub id: String,
    pub area: f64,
    pub deviation: f64,
    pub tolerance: f64,
}

/// Partition result plus the balance report.
#[derive(Clone, Debug)]
pub struct Partition {
    pub compartments: Vec<Compartment>,
    pub deviations: Vec<AreaDeviation>,
    /// `total_area / n` for the request.
    pub target_area: f64,
}

impl Partition {
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.deviations.is_empty()
    }
}
