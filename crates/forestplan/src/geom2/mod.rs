//! Planar geometry for boundary polygons.
//!
//! Purpose
//! - Wrap the handful of `geo` operations the partitioner and the placer rely
//!   on (area, bounding box, containment, half-plane clipping) behind small
//!   functions with explicit tolerances.
//! - Express cutting lines as `Hs2` half-spaces so both sides of a cut are the
//!   same object with a flipped normal.
//!
//! Code cross-refs: `partition::{bisect, split}`, `sampling::place`

mod ops;
pub mod rand;
mod types;

pub use ops::{area, bounding_box, clip_halfplane, contains, side_area, split_pieces, validate};
pub use types::{CutAxis, CutLine, GeomCfg, Hs2};
