use geo::{Coord, Rect};
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::Rng;

use super::{PlacementMethod, PlotCounter, SampleRun, SamplePoint, SamplingCfg, Shortfall};
use crate::geom2::{bounding_box, contains};
use crate::partition::Compartment;

/// Placement context for one sampling request: plot counter, RNG and output.
pub struct Placer {
    method: PlacementMethod,
    attempts_factor: usize,
    rng: StdRng,
    counter: PlotCounter,
    run: SampleRun,
}

impl Placer {
    pub fn new(cfg: &SamplingCfg) -> Self {
        Self {
            method: cfg.method,
            attempts_factor: cfg.attempts_factor,
            rng: cfg.replay.to_std_rng(),
            counter: PlotCounter::default(),
            run: SampleRun::default(),
        }
    }

    /// Place up to `count` plots in `compartment`; returns how many were placed.
    ///
    /// Falling short is recorded as a [`Shortfall`] and logged, never an error.
    pub fn place(&mut self, compartment: &Compartment, count: usize) -> usize {
        let Some(bb) = bounding_box(&compartment.polygon) else {
            self.record_shortfall(compartment, count, 0);
            return 0;
        };
        let points = match self.method {
            PlacementMethod::Systematic => systematic_points(compartment, &bb, count),
            PlacementMethod::Random => {
                random_points(compartment, &bb, count, self.attempts_factor, &mut self.rng)
            }
        };
        let placed = points.len();
        for position in points {
            self.run.plots.push(SamplePoint {
                id: self.counter.next_id(),
                compartment_id: compartment.id.clone(),
                position,
            });
        }
        if placed < count {
            self.record_shortfall(compartment, count, placed);
        }
        placed
    }

    #[inline]
    pub fn issued(&self) -> usize {
        self.counter.issued()
    }

    pub fn finish(self) -> SampleRun {
        self.run
    }

    fn record_shortfall(&mut self, compartment: &Compartment, requested: usize, placed: usize) {
        tracing::warn!(
            compartment = %compartment.id,
            requested,
            placed,
            method = ?self.method,
            "could not place the requested number of plots"
        );
        self.run.shortfalls.push(Shortfall {
            compartment_id: compartment.id.clone(),
            requested,
            placed,
        });
    }
}

/// Cell centres of a `g × g` grid, columns left to right and bottom to top
/// within a column, kept when inside the compartment.
fn systematic_points(compartment: &Compartment, bb: &Rect<f64>, count: usize) -> Vec<Coord<f64>> {
    if count == 0 {
        return Vec::new();
    }
    let g = (count as f64).sqrt().floor() as usize + 1;
    let origin = Vector2::new(bb.min().x, bb.min().y);
    let step = Vector2::new(bb.width(), bb.height()) / g as f64;
    let mut out = Vec::with_capacity(count.min(g.saturating_mul(g)));
    'grid: for i in 0..g {
        for j in 0..g {
            let cell = Vector2::new(i as f64 + 0.5, j as f64 + 0.5);
            let p = origin + step.component_mul(&cell);
            let c = Coord { x: p.x, y: p.y };
            if contains(&compartment.polygon, c) {
                out.push(c);
                if out.len() >= count {
                    break 'grid;
                }
            }
        }
    }
    out
}

/// Rejection sampling in the bounding box, at most `attempts_factor × count` draws.
fn random_points<R: Rng>(
    compartment: &Compartment,
    bb: &Rect<f64>,
    count: usize,
    attempts_factor: usize,
    rng: &mut R,
) -> Vec<Coord<f64>> {
    let max_attempts = count.saturating_mul(attempts_factor);
    let (lo, extent) = (bb.min(), Vector2::new(bb.width(), bb.height()));
    let mut out = Vec::new();
    let mut attempts = 0usize;
    while out.len() < count && attempts < max_attempts {
        let c = Coord {
            x: lo.x + rng.gen::<f64>() * extent.x,
            y: lo.y + rng.gen::<f64>() * extent.y,
        };
        if contains(&compartment.polygon, c) {
            out.push(c);
        }
        attempts += 1;
    }
    out
}
