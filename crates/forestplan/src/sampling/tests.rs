use super::*;
use crate::geom2::contains;
use crate::geom2::rand::{draw_boundary_radial, rescale_to_area, RadialCfg};
use crate::geom2::tests::square;
use crate::partition::partition_with_defaults;
use geo::polygon;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn rect_compartment(seq: usize, w: f64, h: f64) -> Compartment {
    Compartment::new(
        seq,
        polygon![
            (x: 0.0, y: 0.0),
            (x: w, y: 0.0),
            (x: w, y: h),
            (x: 0.0, y: h),
            (x: 0.0, y: 0.0),
        ],
    )
}

fn assert_plot_sequence(plots: &[SamplePoint]) {
    for (k, p) in plots.iter().enumerate() {
        assert_eq!(p.id, format!("SP-{:02}", k + 1));
    }
}

#[test]
fn half_a_square_kilometre_gets_the_minimum() {
    let c = rect_compartment(1, 1000.0, 500.0);
    assert!((c.area - 500_000.0).abs() < 1e-6);
    let run = generate_samples_with(&[c.clone()], &SamplingCfg::default()).unwrap();
    assert_eq!(run.plots.len(), 5);
    assert!(run.shortfalls.is_empty());
    assert_plot_sequence(&run.plots);
    assert!(run.plots.iter().all(|p| p.compartment_id == "C1"));
    assert!(run.plots.iter().all(|p| contains(&c.polygon, p.position)));
}

#[test]
fn systematic_grid_order_and_cell_centres() {
    // count 5 → 3×3 grid of 10×10 cells; first column bottom to top, then the next column.
    let c = rect_compartment(1, 30.0, 30.0);
    let mut placer = Placer::new(&SamplingCfg::default());
    assert_eq!(placer.place(&c, 5), 5);
    assert_eq!(placer.issued(), 5);
    let got: Vec<(f64, f64)> = placer
        .finish()
        .plots
        .iter()
        .map(|p| (p.easting(), p.northing()))
        .collect();
    assert_eq!(
        got,
        vec![(5.0, 5.0), (5.0, 15.0), (5.0, 25.0), (15.0, 5.0), (15.0, 15.0)]
    );
}

#[test]
fn systematic_grid_exhaustion_returns_fewer() {
    // Right triangle x + y < 3: of the 3×3 centres only three are strictly inside.
    let tri = Compartment::new(
        1,
        polygon![(x: 0.0, y: 0.0), (x: 3.0, y: 0.0), (x: 0.0, y: 3.0), (x: 0.0, y: 0.0)],
    );
    let cfg = SamplingCfg {
        min_per_compartment: 8,
        ..SamplingCfg::default()
    };
    let run = generate_samples_with(&[tri], &cfg).unwrap();
    let got: Vec<(f64, f64)> = run.plots.iter().map(|p| (p.easting(), p.northing())).collect();
    assert_eq!(got, vec![(0.5, 0.5), (0.5, 1.5), (1.5, 0.5)]);
    assert_eq!(
        run.shortfalls,
        vec![Shortfall {
            compartment_id: "C1".into(),
            requested: 8,
            placed: 3
        }]
    );
}

#[test]
fn counter_runs_across_compartments() {
    let compartments = partition_with_defaults(&square(10.0), 4).unwrap().compartments;
    let plots = crate::generate_samples(&compartments, 0.02, 5, PlacementMethod::Systematic).unwrap();
    assert_eq!(plots.len(), 20);
    assert_plot_sequence(&plots);
    let by_id: BTreeMap<&str, &Compartment> = compartments.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut per: BTreeMap<&str, usize> = BTreeMap::new();
    for p in &plots {
        let owner = by_id[p.compartment_id.as_str()];
        assert!(contains(&owner.polygon, p.position), "{} outside {}", p.id, owner.id);
        *per.entry(owner.id.as_str()).or_default() += 1;
    }
    assert!(per.values().all(|&n| n >= 5));
    // Compartments are processed in order, so their plots are contiguous.
    assert_eq!(plots[0].compartment_id, "C1");
    assert_eq!(plots[19].compartment_id, "C4");
}

#[test]
fn random_placement_is_reproducible_and_contained() {
    let compartments = vec![rect_compartment(1, 200.0, 100.0), rect_compartment(2, 50.0, 400.0)];
    let cfg = SamplingCfg {
        method: PlacementMethod::Random,
        replay: ReplayToken::new(7, 0),
        ..SamplingCfg::default()
    };
    let a = generate_samples_with(&compartments, &cfg).unwrap();
    let b = generate_samples_with(&compartments, &cfg).unwrap();
    assert_eq!(a.plots, b.plots);
    assert_eq!(a.plots.len(), 10);
    assert_plot_sequence(&a.plots);
    for p in &a.plots {
        let owner = if p.compartment_id == "C1" { &compartments[0] } else { &compartments[1] };
        assert!(contains(&owner.polygon, p.position));
    }
    let other = SamplingCfg {
        replay: ReplayToken::new(8, 0),
        ..cfg
    };
    let c = generate_samples_with(&compartments, &other).unwrap();
    assert_ne!(a.plots, c.plots);
}

#[test]
fn random_attempt_budget_exhaustion_is_not_an_error() {
    let cfg = SamplingCfg {
        method: PlacementMethod::Random,
        attempts_factor: 0,
        ..SamplingCfg::default()
    };
    let run = generate_samples_with(&[rect_compartment(1, 10.0, 10.0)], &cfg).unwrap();
    assert!(run.plots.is_empty());
    assert_eq!(run.shortfalls.len(), 1);
    assert_eq!(run.shortfalls[0].placed, 0);
}

#[test]
fn request_errors() {
    assert_eq!(
        generate_samples_with(&[], &SamplingCfg::default()).unwrap_err(),
        GeometryError::NoCompartments
    );
    let cfg = SamplingCfg {
        intensity: -0.1,
        ..SamplingCfg::default()
    };
    assert!(matches!(
        generate_samples_with(&[rect_compartment(1, 1.0, 1.0)], &cfg),
        Err(GeometryError::InvalidIntensity(_))
    ));
}

#[test]
fn oversized_plans_are_rejected_before_placing() {
    let big = rect_compartment(1, 1000.0, 1000.0);
    let cfg = SamplingCfg {
        intensity: 1.0e30,
        ..SamplingCfg::default()
    };
    match generate_samples_with(&[big.clone()], &cfg) {
        Err(GeometryError::TooManyPlots {
            compartment_id,
            requested,
            limit,
        }) => {
            assert_eq!(compartment_id, "C1");
            assert_eq!(limit, MAX_PLOTS_PER_COMPARTMENT);
            assert!(requested > limit);
        }
        other => panic!("expected TooManyPlots, got {other:?}"),
    }

    // The floor alone can also exceed the limit, on any compartment of the request.
    let cfg = SamplingCfg {
        min_per_compartment: MAX_PLOTS_PER_COMPARTMENT + 1,
        ..SamplingCfg::default()
    };
    let small = rect_compartment(2, 1.0, 1.0);
    assert!(matches!(
        generate_samples_with(&[small, big], &cfg),
        Err(GeometryError::TooManyPlots { .. })
    ));
}

#[test]
fn plot_ids_pad_to_two_digits_only() {
    let mut counter = PlotCounter::default();
    let ids: Vec<String> = (0..100).map(|_| counter.next_id()).collect();
    assert_eq!(ids[0], "SP-01");
    assert_eq!(ids[8], "SP-09");
    assert_eq!(ids[9], "SP-10");
    assert_eq!(ids[99], "SP-100");
    assert_eq!(counter.issued(), 100);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn plots_are_contained_and_sequential(
        seed in 0u64..10_000,
        n in 1usize..8,
        random in any::<bool>(),
    ) {
        let raw = draw_boundary_radial(RadialCfg::default(), ReplayToken::new(seed, 1)).unwrap();
        let boundary = rescale_to_area(&raw, 4.0e6, geo::Coord { x: 0.0, y: 0.0 }).unwrap();
        let compartments = partition_with_defaults(&boundary, n).unwrap().compartments;
        let cfg = SamplingCfg {
            method: if random { PlacementMethod::Random } else { PlacementMethod::Systematic },
            replay: ReplayToken::new(seed, 2),
            ..SamplingCfg::default()
        };
        let run = generate_samples_with(&compartments, &cfg).unwrap();
        for (k, p) in run.plots.iter().enumerate() {
            prop_assert_eq!(&p.id, &format!("SP-{:02}", k + 1));
            let owner = compartments.iter().find(|c| c.id == p.compartment_id).unwrap();
            prop_assert!(contains(&owner.polygon, p.position));
        }
        for c in &compartments {
            let requested = plan(c.area, cfg.intensity, cfg.min_per_compartment);
            let placed = run.plots.iter().filter(|p| p.compartment_id == c.id).count();
            match run.shortfalls.iter().find(|s| s.compartment_id == c.id) {
                Some(s) => prop_assert_eq!((s.requested, s.placed), (requested, placed)),
                None => prop_assert_eq!(placed, requested),
            }
        }
    }
}
