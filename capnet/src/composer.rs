//! Branch Composer
//!
//! Turns every catalog entry into an achievable branch total: the fixed
//! capacitor in series with the parallel group.

use crate::catalog::{collapse_near_equal, BranchCatalog, ParallelComposition};
use crate::combiner::series;

/// One way to build a single branch.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchOption {
    /// Series combination of `fixed` and the parallel group.
    pub total: f64,
    pub group_sum: f64,
    pub composition: ParallelComposition,
}

impl BranchOption {
    /// Number of parallel capacitors this branch uses.
    pub fn component_count(&self) -> u32 {
        self.composition.total_count()
    }
}

/// Branch total for a given parallel-group sum.
///
/// An empty group leaves the fixed capacitor on its own.
pub fn branch_total(fixed: f64, group_sum: f64) -> f64 {
    if group_sum == 0.0 {
        fixed
    } else {
        series(fixed, group_sum)
    }
}

pub struct BranchComposer;

impl BranchComposer {
    /// Achievable branch totals for `fixed` over the catalog, ascending by
    /// total.
    pub fn compose(fixed: f64, catalog: &BranchCatalog, rel_epsilon: f64) -> Vec<BranchOption> {
        let mut options: Vec<BranchOption> = catalog
            .entries()
            .iter()
            .map(|entry| BranchOption {
                total: branch_total(fixed, entry.group_sum),
                group_sum: entry.group_sum,
                composition: entry.composition.clone(),
            })
            .collect();

        options.sort_by(|a, b| {
            a.total
                .total_cmp(&b.total)
                .then_with(|| a.composition.cmp(&b.composition))
        });
        let options = collapse_near_equal(options, |o| o.total, |o| &o.composition, rel_epsilon);

        tracing::debug!(
            "Composed {} branch options from {} catalog entries (fixed={})",
            options.len(),
            catalog.len(),
            fixed
        );
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SolverOptions;

    #[test]
    fn test_empty_group_keeps_fixed() {
        assert_eq!(branch_total(2.5, 0.0), 2.5);
    }

    #[test]
    fn test_branch_total_series() {
        assert!((branch_total(10.0, 10.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_compose_sorted_and_tagged() {
        let options = SolverOptions::default();
        let catalog = BranchCatalog::build(&[5.0, 10.0, 15.0], 3, &options).unwrap();
        let branches = BranchComposer::compose(10.0, &catalog, options.dedup_epsilon);

        assert_eq!(branches.len(), catalog.len());
        for pair in branches.windows(2) {
            assert!(pair[0].total < pair[1].total);
        }
        for option in &branches {
            let expected = branch_total(10.0, option.composition.group_sum(catalog.values()));
            assert_eq!(option.total, expected);
        }
    }

    #[test]
    fn test_fixed_alone_is_largest_below_limit() {
        // series(fixed, g) < fixed for every g > 0, so the empty group gives
        // the largest total
        let options = SolverOptions::default();
        let catalog = BranchCatalog::build(&[1.0, 2.0], 2, &options).unwrap();
        let branches = BranchComposer::compose(3.0, &catalog, options.dedup_epsilon);
        let last = branches.last().unwrap();
        assert!(last.composition.is_empty());
        assert_eq!(last.total, 3.0);
    }
}
