//! Component Combiner
//!
//! Pure capacitance arithmetic:
//! - Parallel: C = C1 + C2 + ... + Cn
//! - Series (two components): C = (C1 × C2) / (C1 + C2)

/// Total capacitance of components connected in parallel.
///
/// Returns 0.0 for an empty set of components.
pub fn parallel_sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Series combination of two capacitors.
///
/// Both operands must be positive. A zero operand (an empty parallel group)
/// is handled by the branch rule in [`crate::composer`], not here.
pub fn series(a: f64, b: f64) -> f64 {
    debug_assert!(a > 0.0 && b > 0.0, "series() requires positive operands");
    (a * b) / (a + b)
}

/// Relative equality used to collapse capacitances that differ only by
/// floating-point noise.
pub fn approx_eq(a: f64, b: f64, rel_epsilon: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= rel_epsilon * a.abs().max(b.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_sum() {
        assert_eq!(parallel_sum(&[]), 0.0);
        assert!((parallel_sum(&[5.0, 10.0, 15.0]) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_series_equal_values() {
        // Two equal capacitors in series halve the capacitance
        assert!((series(10.0, 10.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_series_below_smallest_operand() {
        let c = series(2.5, 50.0);
        assert!(c < 2.5, "Series result {} should be below both operands", c);
        assert!((c - 125.0 / 52.5).abs() < 1e-12);
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(0.1 + 0.2, 0.3, 1e-9));
        assert!(!approx_eq(1.0, 1.001, 1e-9));
        assert!(approx_eq(0.0, 0.0, 1e-9));
        assert!(!approx_eq(0.0, 1e-20, 1e-9));
    }
}
