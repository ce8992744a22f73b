//! Sample-plot planning and placement inside compartments.
//!
//! - `plan`: plots owed by a compartment (hectare-scaled intensity with a floor).
//! - `place`: systematic grid or rejection-sampled random points, numbered
//!   from one counter shared by every compartment of the request.
//!
//! Areas are taken as square metres; callers hand in compartments in a
//! planar metric projection.

mod place;
mod plan;

use geo::Coord;

use crate::error::{GeometryError, Result};
use crate::geom2::rand::ReplayToken;
use crate::partition::Compartment;

pub use place::Placer;
pub use plan::{plan, MAX_PLOTS_PER_COMPARTMENT, SQ_METRES_PER_HECTARE};

/// Point layout inside a compartment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlacementMethod {
    /// Cell centres of a `g × g` grid over the bounding box, `g = ⌊√count⌋ + 1`.
    #[default]
    Systematic,
    /// Uniform draws in the bounding box, kept when inside the compartment.
    Random,
}

/// Sampling request parameters.
#[derive(Clone, Copy, Debug)]
pub struct SamplingCfg {
    /// Fraction of the area (in hectares) turned into plots, e.g. 0.02.
    pub intensity: f64,
    pub min_per_compartment: usize,
    pub method: PlacementMethod,
    /// Random placement gives up after `attempts_factor × count` draws.
    pub attempts_factor: usize,
    /// Seeds the random placement.
    pub replay: ReplayToken,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            intensity: 0.02,
            min_per_compartment: 5,
            method: PlacementMethod::default(),
            attempts_factor: 10,
            replay: ReplayToken::default(),
        }
    }
}

/// One placed plot.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplePoint {
    pub id: String,
    pub compartment_id: String,
    pub position: Coord<f64>,
}

impl SamplePoint {
    #[inline]
    pub fn easting(&self) -> f64 {
        self.position.x
    }
    #[inline]
    pub fn northing(&self) -> f64 {
        self.position.y
    }
}

/// Request-wide plot numbering: `SP-01`, `SP-02`, …
#[derive(Clone, Debug, Default)]
pub struct PlotCounter {
    issued: usize,
}

impl PlotCounter {
    pub fn next_id(&mut self) -> String {
        self.issued += 1;
        format!("SP-{:02}", self.issued)
    }
    #[inline]
    pub fn issued(&self) -> usize {
        self.issued
    }
}

/// A compartment that received fewer plots than planned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shortfall {
    pub compartment_id: String,
    pub requested: usize,
    pub placed: usize,
}

/// Plots of one sampling request plus any shortfalls.
#[derive(Clone, Debug, Default)]
pub struct SampleRun {
    pub plots: Vec<SamplePoint>,
    pub shortfalls: Vec<Shortfall>,
}

/// Plan and place plots for every compartment, in order.
///
/// Every plan is checked against [`MAX_PLOTS_PER_COMPARTMENT`] before any
/// plot is placed.
pub fn generate_samples_with(compartments: &[Compartment], cfg: &SamplingCfg) -> Result<SampleRun> {
    if compartments.is_empty() {
        return Err(GeometryError::NoCompartments);
    }
    if !(cfg.intensity.is_finite() && cfg.intensity >= 0.0) {
        return Err(GeometryError::InvalidIntensity(cfg.intensity));
    }
    let counts: Vec<usize> = compartments
        .iter()
        .map(|c| plan(c.area, cfg.intensity, cfg.min_per_compartment))
        .collect();
    if let Some((c, &requested)) = compartments
        .iter()
        .zip(&counts)
        .find(|(_, n)| **n > MAX_PLOTS_PER_COMPARTMENT)
    {
        return Err(GeometryError::TooManyPlots {
            compartment_id: c.id.clone(),
            requested,
            limit: MAX_PLOTS_PER_COMPARTMENT,
        });
    }
    let mut placer = Placer::new(cfg);
    for (c, count) in compartments.iter().zip(counts) {
        placer.place(c, count);
    }
    let run = placer.finish();
    tracing::info!(
        compartments = compartments.len(),
        plots = run.plots.len(),
        shortfalls = run.shortfalls.len(),
        method = ?cfg.method,
        "generated sample plots"
    );
    Ok(run)
}

#[cfg(test)]
mod tests;
