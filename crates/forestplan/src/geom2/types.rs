//! Basic 2D types and tolerances used by the cutting and clipping code.
//!
//! - `GeomCfg`: centralizes epsilons for area and coordinate comparisons.
//! - `Hs2`: closed half‑space `n·x <= c` with helper predicates.
//! - `CutAxis`, `CutLine`: an axis-aligned cutting line and its two sides.
//!
//! Code cross-refs: `ops::{clip_halfplane, split_pieces}`, `partition::bisect`

use nalgebra::Vector2;

/// Geometry configuration (tolerances).
#[derive(Clone, Copy, Debug)]
pub struct GeomCfg {
    /// Pieces with area at or below `eps_area * reference_area` count as empty.
    pub eps_area: f64,
    /// Two coordinates closer than this are the same vertex.
    pub eps_coord: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_area: 1e-12,
            eps_coord: 1e-12,
        }
    }
}

/// Closed half‑space `n · x <= c` (no normalization required here).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hs2 {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl Hs2 {
    #[inline]
    pub fn new(n: Vector2<f64>, c: f64) -> Self {
        Self { n, c }
    }
    /// Signed slack `c - n·p` (positive inside).
    #[inline]
    pub fn slack(&self, p: Vector2<f64>) -> f64 {
        self.c - self.n.dot(&p)
    }
    #[inline]
    pub fn satisfies_eps(&self, p: Vector2<f64>, eps: f64) -> bool {
        self.n.dot(&p) <= self.c + eps
    }
    /// The complementary closed half-space sharing the same boundary line.
    #[inline]
    pub fn flipped(&self) -> Hs2 {
        Hs2::new(-self.n, -self.c)
    }
}

/// Orientation of an axis-aligned cut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CutAxis {
    /// `x = offset`; the lower side is the left side.
    Vertical,
    /// `y = offset`; the lower side is the bottom side.
    Horizontal,
}

impl CutAxis {
    #[inline]
    pub fn other(self) -> CutAxis {
        match self {
            CutAxis::Vertical => CutAxis::Horizontal,
            CutAxis::Horizontal => CutAxis::Vertical,
        }
    }

    #[inline]
    fn normal(self) -> Vector2<f64> {
        match self {
            CutAxis::Vertical => Vector2::new(1.0, 0.0),
            CutAxis::Horizontal => Vector2::new(0.0, 1.0),
        }
    }
}

/// Straight cutting line `axis = offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutLine {
    pub axis: CutAxis,
    pub offset: f64,
}

impl CutLine {
    #[inline]
    pub fn new(axis: CutAxis, offset: f64) -> Self {
        Self { axis, offset }
    }
    #[inline]
    pub fn vertical(x: f64) -> Self {
        Self::new(CutAxis::Vertical, x)
    }
    #[inline]
    pub fn horizontal(y: f64) -> Self {
        Self::new(CutAxis::Horizontal, y)
    }
    /// Left (vertical) or bottom (horizontal) closed side.
    #[inline]
    pub fn lower(&self) -> Hs2 {
        Hs2::new(self.axis.normal(), self.offset)
    }
    /// Right (vertical) or top (horizontal) closed side.
    #[inline]
    pub fn upper(&self) -> Hs2 {
        self.lower().flipped()
    }
}
