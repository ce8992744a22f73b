pub const SQ_METRES_PER_HECTARE: f64 = 10_000.0;

/// Largest plot count a single compartment may be asked for.
pub const MAX_PLOTS_PER_COMPARTMENT: usize = 1_000_000;

/// Plots owed by a compartment: `max(minimum, round(area · intensity / 10 000))`.
///
/// Halves round to even. Negative or NaN products count as zero plots before
/// the floor is applied.
pub fn plan(area: f64, intensity: f64, minimum: usize) -> usize {
    let scaled = (area * intensity / SQ_METRES_PER_HECTARE).round_ties_even();
    // `as` saturates: NaN and negatives become 0.
    (scaled as usize).max(minimum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_wins_for_small_compartments() {
        assert_eq!(plan(500_000.0, 0.02, 5), 5);
        assert_eq!(plan(0.0, 0.02, 5), 5);
    }

    #[test]
    fn intensity_wins_for_large_compartments() {
        // 5 000 ha at 2% → 100 plots
        assert_eq!(plan(50_000_000.0, 0.02, 5), 100);
        assert_eq!(plan(50_000_000.0, 0.02, 0), 100);
    }

    #[test]
    fn halves_round_to_even() {
        // 2.5 → 2, 3.5 → 4
        assert_eq!(plan(1_250_000.0, 0.02, 0), 2);
        assert_eq!(plan(1_750_000.0, 0.02, 0), 4);
    }

    #[test]
    fn degenerate_inputs_fall_back_to_minimum() {
        assert_eq!(plan(-1.0e9, 0.02, 3), 3);
        assert_eq!(plan(f64::NAN, 0.02, 3), 3);
    }
}
