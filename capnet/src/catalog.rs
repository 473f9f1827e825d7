//! Branch Catalog
//!
//! Enumerates every distinct parallel-group sum reachable by picking up to
//! `max_parallel` capacitors (with repetition) from the available pool.
//!
//! Enumeration walks non-decreasing index sequences with an explicit
//! cursor, so each multiset is produced exactly once and neither the stack
//! nor a composition grows with the pool size. Sums that collapse within a relative
//! epsilon keep the lexicographically smallest count vector as their
//! canonical composition.

use std::cmp::Ordering;

use crate::combiner::approx_eq;
use crate::core::CapnetError;
use crate::options::SolverOptions;

/// Count of each distinct pool value used in one parallel group.
///
/// Only non-zero counts are stored, as `(value index, count)` pairs in
/// ascending index order, so a wide pool costs nothing for small groups.
/// Indices refer to the distinct values of the pool in caller order.
/// Ordering is that of the dense count vectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParallelComposition {
    distinct: usize,
    parts: Vec<(u32, u32)>,
}

impl ParallelComposition {
    /// The empty group (no parallel capacitors) over `distinct` pool values.
    pub fn empty(distinct: usize) -> Self {
        Self {
            distinct,
            parts: Vec::new(),
        }
    }

    pub fn from_counts(counts: Vec<u32>) -> Self {
        Self {
            distinct: counts.len(),
            parts: counts
                .iter()
                .enumerate()
                .filter(|(_, &c)| c > 0)
                .map(|(i, &c)| (i as u32, c))
                .collect(),
        }
    }

    /// Number of capacitors of the `index`-th distinct value.
    pub fn count(&self, index: usize) -> u32 {
        self.parts
            .binary_search_by_key(&(index as u32), |&(i, _)| i)
            .map_or(0, |pos| self.parts[pos].1)
    }

    /// Dense count vector, one entry per distinct value.
    pub fn to_counts(&self) -> Vec<u32> {
        (0..self.distinct).map(|i| self.count(i)).collect()
    }

    /// Total number of capacitors in the group.
    pub fn total_count(&self) -> u32 {
        self.parts.iter().map(|&(_, c)| c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Σ(value × count), folded in pool order.
    pub fn group_sum(&self, values: &[f64]) -> f64 {
        self.parts
            .iter()
            .fold(0.0, |sum, &(i, count)| sum + count as f64 * values[i as usize])
    }

    fn add_one(&mut self, index: u32) {
        match self.parts.last_mut() {
            Some((last, count)) if *last == index => *count += 1,
            _ => self.parts.push((index, 1)),
        }
    }

    /// Drop one capacitor of the highest used index, returning that index.
    fn remove_last(&mut self) -> Option<u32> {
        let (index, count) = self.parts.last_mut()?;
        let index = *index;
        *count -= 1;
        if *count == 0 {
            self.parts.pop();
        }
        Some(index)
    }
}

impl Ord for ParallelComposition {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.parts.iter().peekable();
        let mut b = other.parts.iter().peekable();
        loop {
            match (a.peek(), b.peek()) {
                (None, None) => return self.distinct.cmp(&other.distinct),
                // A stored index means a non-zero count where the other is 0
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some(&&(ia, ca)), Some(&&(ib, cb))) => {
                    if ia < ib {
                        return Ordering::Greater;
                    }
                    if ia > ib {
                        return Ordering::Less;
                    }
                    if ca != cb {
                        return ca.cmp(&cb);
                    }
                    a.next();
                    b.next();
                }
            }
        }
    }
}

impl PartialOrd for ParallelComposition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One achievable parallel-group sum and its canonical composition.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub group_sum: f64,
    pub composition: ParallelComposition,
}

/// All distinct parallel groups available to a single branch.
#[derive(Debug, Clone)]
pub struct BranchCatalog {
    values: Vec<f64>,
    entries: Vec<CatalogEntry>,
}

impl BranchCatalog {
    /// Build the catalog for `available` with at most `max_parallel`
    /// capacitors per group.
    ///
    /// Fails with [`CapnetError::SearchSpaceTooLarge`] when the number of
    /// candidate multisets exceeds `options.catalog_ceiling`, before any
    /// enumeration happens.
    pub fn build(
        available: &[f64],
        max_parallel: u32,
        options: &SolverOptions,
    ) -> Result<Self, CapnetError> {
        if available.is_empty() {
            return Err(CapnetError::InvalidInput(
                "Available capacitor list must not be empty".to_string(),
            ));
        }
        if let Some(bad) = available.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(CapnetError::InvalidInput(format!(
                "Available capacitor values must be positive, got {}",
                bad
            )));
        }

        let values = distinct_values(available, options.dedup_epsilon);
        let ceiling = u128::from(options.catalog_ceiling);
        let bound = composition_bound(values.len() as u128, max_parallel, ceiling);
        if bound > ceiling {
            return Err(CapnetError::SearchSpaceTooLarge {
                bound,
                ceiling: options.catalog_ceiling,
            });
        }

        let mut raw = Vec::with_capacity(bound as usize);
        enumerate(&values, max_parallel, &mut raw);

        raw.sort_by(|a, b| {
            a.group_sum
                .total_cmp(&b.group_sum)
                .then_with(|| a.composition.cmp(&b.composition))
        });
        let generated = raw.len();
        let entries = collapse_near_equal(
            raw,
            |e| e.group_sum,
            |e| &e.composition,
            options.dedup_epsilon,
        );

        tracing::debug!(
            "Branch catalog: {} distinct values, max_parallel={}, {} compositions, {} distinct sums",
            values.len(),
            max_parallel,
            generated,
            entries.len()
        );

        Ok(Self { values, entries })
    }

    /// Distinct pool values, in caller order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Entries in ascending group-sum order. The first entry is always the
    /// empty group.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collapse pool values equal within `rel_epsilon`, keeping the first
/// occurrence of each and the caller's order.
pub fn distinct_values(available: &[f64], rel_epsilon: f64) -> Vec<f64> {
    let mut order: Vec<usize> = (0..available.len()).collect();
    order.sort_by(|&a, &b| available[a].total_cmp(&available[b]).then(a.cmp(&b)));

    let mut keep = vec![false; available.len()];
    let mut start = 0;
    while start < order.len() {
        let anchor = available[order[start]];
        let mut end = start + 1;
        while end < order.len() && approx_eq(anchor, available[order[end]], rel_epsilon) {
            end += 1;
        }
        let first = order[start..end].iter().copied().fold(order[start], usize::min);
        keep[first] = true;
        start = end;
    }

    available
        .iter()
        .zip(&keep)
        .filter(|(_, &kept)| kept)
        .map(|(&v, _)| v)
        .collect()
}

/// Number of multisets of size 0..=k over n values, i.e. C(n + k, k).
///
/// Stops early and returns the partial value as soon as it exceeds
/// `stop_above`; saturates at `u128::MAX`.
pub fn composition_bound(n: u128, k: u32, stop_above: u128) -> u128 {
    let mut result: u128 = 1;
    for i in 1..=u128::from(k) {
        // C(n+i, i) = C(n+i-1, i-1) * (n+i) / i, exact in integers
        result = match result.checked_mul(n + i) {
            Some(v) => v / i,
            None => return u128::MAX,
        };
        if result > stop_above {
            return result;
        }
    }
    result
}

/// Walk every multiset of at most `max_parallel` picks as a non-decreasing
/// index sequence, without recursion.
fn enumerate(values: &[f64], max_parallel: u32, out: &mut Vec<CatalogEntry>) {
    let n = values.len() as u32;
    let mut current = ParallelComposition::empty(values.len());
    let mut size = 0u32;

    let emit = |composition: &ParallelComposition, out: &mut Vec<CatalogEntry>| {
        out.push(CatalogEntry {
            group_sum: composition.group_sum(values),
            composition: composition.clone(),
        });
    };

    emit(&current, out);
    if max_parallel == 0 || n == 0 {
        return;
    }
    current.add_one(0);
    size += 1;

    loop {
        emit(&current, out);

        if size < max_parallel {
            let last = current.parts.last().map_or(0, |&(i, _)| i);
            current.add_one(last);
            size += 1;
            continue;
        }

        // Bump the last pick; when it runs past the pool, drop it and bump
        // the one before.
        loop {
            let Some(last) = current.remove_last() else {
                return;
            };
            if last + 1 < n {
                current.add_one(last + 1);
                break;
            }
            size -= 1;
        }
    }
}

/// Collapse consecutive items of an ascending sequence whose values are
/// within `rel_epsilon` of the first item of their run. Each run is
/// represented by its lexicographically smallest composition.
pub(crate) fn collapse_near_equal<T>(
    sorted: Vec<T>,
    value: impl Fn(&T) -> f64,
    composition: impl Fn(&T) -> &ParallelComposition,
    rel_epsilon: f64,
) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(sorted.len());
    let mut anchor: Option<f64> = None;
    for item in sorted {
        let v = value(&item);
        let in_run = anchor.map_or(false, |a| approx_eq(a, v, rel_epsilon));
        if in_run {
            if let Some(rep) = out.last_mut() {
                if composition(&item) < composition(rep) {
                    *rep = item;
                }
                continue;
            }
        }
        anchor = Some(v);
        out.push(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sums(catalog: &BranchCatalog) -> Vec<f64> {
        catalog.entries().iter().map(|e| e.group_sum).collect()
    }

    #[test]
    fn test_zero_entry_always_present() {
        let catalog = BranchCatalog::build(&[5.0], 0, &SolverOptions::default()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].group_sum, 0.0);
        assert!(catalog.entries()[0].composition.is_empty());
    }

    #[test]
    fn test_multiples_of_five_group_sums() {
        let catalog =
            BranchCatalog::build(&[5.0, 10.0, 15.0], 3, &SolverOptions::default()).unwrap();
        // Every multiple of 5 from 0 to 45 is reachable with at most 3 picks
        let expected: Vec<f64> = (0..=9).map(|i| i as f64 * 5.0).collect();
        assert_eq!(sums(&catalog), expected);
    }

    #[test]
    fn test_dedup_keeps_lexicographically_smallest() {
        let catalog = BranchCatalog::build(&[5.0, 10.0], 2, &SolverOptions::default()).unwrap();
        // 10 is reachable as 2×5 ([2,0]) or 1×10 ([0,1])
        let entry = catalog
            .entries()
            .iter()
            .find(|e| e.group_sum == 10.0)
            .expect("10F group should exist");
        assert_eq!(entry.composition.to_counts(), vec![0, 1]);
    }

    #[test]
    fn test_duplicate_pool_values_collapse() {
        let catalog =
            BranchCatalog::build(&[10.0, 5.0, 10.0], 1, &SolverOptions::default()).unwrap();
        assert_eq!(catalog.values(), &[10.0, 5.0]);
        assert_eq!(sums(&catalog), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_compositions_respect_budget() {
        let catalog =
            BranchCatalog::build(&[1.0, 2.5, 7.0], 4, &SolverOptions::default()).unwrap();
        for entry in catalog.entries() {
            assert!(entry.composition.total_count() <= 4);
            let recomputed = entry.composition.group_sum(catalog.values());
            assert_eq!(recomputed, entry.group_sum);
        }
    }

    #[test]
    fn test_ceiling_exceeded() {
        let options = SolverOptions {
            catalog_ceiling: 100,
            ..SolverOptions::default()
        };
        let err = BranchCatalog::build(&[1.0, 2.0, 3.0, 4.0], 10, &options).unwrap_err();
        assert!(matches!(err, CapnetError::SearchSpaceTooLarge { ceiling: 100, .. }));
    }

    #[test]
    fn test_composition_bound() {
        assert_eq!(composition_bound(3, 3, u128::MAX), 20);
        assert_eq!(composition_bound(3, 20, u128::MAX), 1771);
        assert_eq!(composition_bound(1, 7, u128::MAX), 8);
        assert_eq!(composition_bound(5, 0, u128::MAX), 1);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let err = BranchCatalog::build(&[5.0, 0.0], 2, &SolverOptions::default()).unwrap_err();
        assert!(matches!(err, CapnetError::InvalidInput(_)));
    }

    #[test]
    fn test_enumerates_every_multiset() {
        // C(3 + 4, 4) multisets; distinct sums only collapse on real ties
        let values = [1.0, 10.0, 100.0];
        let mut raw = Vec::new();
        enumerate(&values, 4, &mut raw);
        assert_eq!(raw.len(), 35);

        let mut seen: Vec<Vec<u32>> = raw.iter().map(|e| e.composition.to_counts()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 35);
        assert!(seen.iter().all(|c| c.iter().sum::<u32>() <= 4));
    }

    #[test]
    fn test_wide_pool_without_budget() {
        let available: Vec<f64> = (1..=40_000).map(f64::from).collect();
        let catalog = BranchCatalog::build(&available, 0, &SolverOptions::default()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.entries()[0].composition.is_empty());

        let catalog = BranchCatalog::build(&available, 1, &SolverOptions::default()).unwrap();
        assert_eq!(catalog.len(), 40_001);
        assert_eq!(catalog.entries()[40_000].composition.count(39_999), 1);
    }

    #[test]
    fn test_deep_budget_single_value() {
        let catalog =
            BranchCatalog::build(&[1.0], 100_000, &SolverOptions::default()).unwrap();
        assert_eq!(catalog.len(), 100_001);
        assert_eq!(catalog.entries()[100_000].composition.total_count(), 100_000);
    }

    #[test]
    fn test_composition_order_matches_dense_vectors() {
        let dense = [vec![0, 0, 1], vec![0, 1, 0], vec![1, 0, 0], vec![0, 1, 1], vec![2, 0, 0]];
        for a in &dense {
            for b in &dense {
                let sparse = ParallelComposition::from_counts(a.clone())
                    .cmp(&ParallelComposition::from_counts(b.clone()));
                assert_eq!(sparse, a.cmp(b), "{:?} vs {:?}", a, b);
            }
        }
    }
}
