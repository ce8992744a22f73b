//! Equal-area compartments and sample-plot placement for forest boundaries.
//!
//! A validated boundary polygon (planar, metric coordinates) is cut into
//! compartments `C1..Ck` of roughly equal area by recursive axis-aligned
//! bisection; each compartment then receives sample plots `SP-01, SP-02, …`
//! according to a sampling intensity with a per-compartment minimum.
//!
//! Layout
//! - `geom2`: planar primitives on top of `geo` (area, bbox, clipping, validation).
//! - `partition`: bisector, splitter and the worklist partitioner.
//! - `sampling`: plot planner and placer.
//! - `stats`: compartment and plot aggregates.
//! - `api`: the two request-level operations.

pub mod api;
pub mod error;
pub mod geom2;
pub mod partition;
pub mod sampling;
pub mod stats;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use api::{generate_samples, generate_samples_seeded, partition_boundary};
pub use error::GeometryError;
pub use geo::{Coord, LineString, Polygon};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::api::{generate_samples, generate_samples_seeded, partition_boundary};
    pub use crate::error::GeometryError;
    pub use crate::geom2::rand::{draw_boundary_radial, rescale_to_area, RadialCfg, ReplayToken};
    pub use crate::geom2::{CutAxis, CutLine, GeomCfg};
    pub use crate::partition::{Compartment, Partition, PartitionCfg, PartitionStrategy};
    pub use crate::sampling::{PlacementMethod, SamplePoint, SamplingCfg};
    pub use crate::stats::{compartment_stats, plot_stats};
    pub use geo::{Coord, Polygon};
}
