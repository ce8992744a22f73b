//! Aggregate statistics over compartments and plots.
//!
//! Pure functions; empty input gives all-zero statistics.

use std::collections::BTreeMap;

use crate::partition::Compartment;
use crate::sampling::SamplePoint;

/// Area statistics of a partition (population variance and standard deviation).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompartmentStats {
    pub count: usize,
    pub total_area: f64,
    pub mean_area: f64,
    pub min_area: f64,
    pub max_area: f64,
    pub std_area: f64,
    pub variance: f64,
}

/// Plot counts of a sampling request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotStats {
    pub total_plots: usize,
    pub plots_per_compartment: BTreeMap<String, usize>,
    pub min: usize,
    pub max: usize,
    /// Plots per compartment that received at least one plot.
    pub average: f64,
}

pub fn compartment_stats(compartments: &[Compartment]) -> CompartmentStats {
    if compartments.is_empty() {
        return CompartmentStats::default();
    }
    let n = compartments.len() as f64;
    let total_area: f64 = compartments.iter().map(|c| c.area).sum();
    let mean_area = total_area / n;
    let variance = compartments
        .iter()
        .map(|c| (c.area - mean_area).powi(2))
        .sum::<f64>()
        / n;
    let (min_area, max_area) = compartments
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.area), hi.max(c.area))
        });
    CompartmentStats {
        count: compartments.len(),
        total_area,
        mean_area,
        min_area,
        max_area,
        std_area: variance.sqrt(),
        variance,
    }
}

pub fn plot_stats(plots: &[SamplePoint]) -> PlotStats {
    let mut per: BTreeMap<String, usize> = BTreeMap::new();
    for p in plots {
        *per.entry(p.compartment_id.clone()).or_default() += 1;
    }
    if per.is_empty() {
        return PlotStats::default();
    }
    let min = per.values().copied().min().unwrap_or(0);
    let max = per.values().copied().max().unwrap_or(0);
    PlotStats {
        total_plots: plots.len(),
        average: plots.len() as f64 / per.len() as f64,
        plots_per_compartment: per,
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2::tests::square;
    use geo::Coord;

    fn plot(seq: usize, owner: &str) -> SamplePoint {
        SamplePoint {
            id: format!("SP-{seq:02}"),
            compartment_id: owner.to_string(),
            position: Coord { x: 0.0, y: 0.0 },
        }
    }

    #[test]
    fn compartment_stats_population_moments() {
        let cs = vec![
            Compartment::new(1, square(2.0)),
            Compartment::new(2, square(4.0)),
        ];
        let s = compartment_stats(&cs);
        assert_eq!(s.count, 2);
        assert!((s.total_area - 20.0).abs() < 1e-12);
        assert!((s.mean_area - 10.0).abs() < 1e-12);
        assert!((s.min_area - 4.0).abs() < 1e-12);
        assert!((s.max_area - 16.0).abs() < 1e-12);
        assert!((s.variance - 36.0).abs() < 1e-9);
        assert!((s.std_area - 6.0).abs() < 1e-9);
    }

    #[test]
    fn square_partition_stats_within_five_percent() {
        let p = crate::partition::partition_with_defaults(&square(10.0), 4).unwrap();
        let s = compartment_stats(&p.compartments);
        assert_eq!(s.count, 4);
        assert!((s.total_area - 100.0).abs() < 1e-6);
        assert!(s.max_area - s.mean_area <= 0.05 * s.mean_area);
        assert!(s.mean_area - s.min_area <= 0.05 * s.mean_area);
    }

    #[test]
    fn plot_stats_groups_by_compartment() {
        let plots = vec![plot(1, "C1"), plot(2, "C1"), plot(3, "C1"), plot(4, "C2")];
        let s = plot_stats(&plots);
        assert_eq!(s.total_plots, 4);
        assert_eq!(s.plots_per_compartment.get("C1"), Some(&3));
        assert_eq!(s.plots_per_compartment.get("C2"), Some(&1));
        assert_eq!((s.min, s.max), (1, 3));
        assert!((s.average - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_give_zero_stats() {
        assert_eq!(compartment_stats(&[]), CompartmentStats::default());
        assert_eq!(plot_stats(&[]), PlotStats::default());
    }
}
