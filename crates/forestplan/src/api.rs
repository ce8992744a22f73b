//! The two request-level operations and a curated set of re-exports.
//!
//! `partition_boundary` and `generate_samples` are what boundary ingestion and
//! export code call; everything else is reachable through the modules.

pub use crate::error::{GeometryError, Result};
pub use crate::geom2::rand::ReplayToken;
pub use crate::partition::{
    partition, Compartment, Partition, PartitionCfg, PartitionStrategy,
};
pub use crate::sampling::{
    generate_samples_with, PlacementMethod, SampleRun, SamplePoint, SamplingCfg, Shortfall,
};
pub use crate::stats::{compartment_stats, plot_stats, CompartmentStats, PlotStats};

use geo::Polygon;

/// Cut `boundary` into `num_compartments` labeled compartments `C1..Ck`.
///
/// Fails with `InvalidGeometry` for self-intersecting, zero-area or
/// under-specified rings and with `InvalidCount` for a zero count.
pub fn partition_boundary(boundary: &Polygon<f64>, num_compartments: usize) -> Result<Vec<Compartment>> {
    Ok(partition(boundary, num_compartments, &PartitionCfg::default())?.compartments)
}

/// Place plots in every compartment; ids `SP-01..` run across the whole request.
///
/// Compartments that cannot hold their planned count get fewer plots; that is
/// logged, not returned as an error. `Random` placement draws a fresh seed on
/// every call (logged at `debug`); use [`generate_samples_seeded`] to replay.
pub fn generate_samples(
    compartments: &[Compartment],
    sampling_intensity: f64,
    minimum_per_compartment: usize,
    method: PlacementMethod,
) -> Result<Vec<SamplePoint>> {
    let seed: u64 = rand::random();
    tracing::debug!(seed, "sampling seed");
    generate_samples_seeded(compartments, sampling_intensity, minimum_per_compartment, method, seed)
}

/// [`generate_samples`] with a fixed seed: equal inputs give equal plots.
pub fn generate_samples_seeded(
    compartments: &[Compartment],
    sampling_intensity: f64,
    minimum_per_compartment: usize,
    method: PlacementMethod,
    seed: u64,
) -> Result<Vec<SamplePoint>> {
    let cfg = SamplingCfg {
        intensity: sampling_intensity,
        min_per_compartment: minimum_per_compartment,
        method,
        replay: ReplayToken::new(seed, 0),
        ..SamplingCfg::default()
    };
    Ok(generate_samples_with(compartments, &cfg)?.plots)
}
