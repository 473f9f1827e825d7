//! Frontier nodes for the best-first search.

use std::cmp::Ordering;

/// A partial selection: the first `picks.len()` branches are placed.
#[derive(Debug, Clone)]
pub struct Node {
    /// Option indices chosen so far, non-decreasing.
    pub picks: Vec<u32>,
    /// Σ totals of the placed branches.
    pub sum: f64,
    /// Parallel capacitors used by the placed branches.
    pub components: u32,
    /// Lower bound on the final distance to target.
    pub bound: f64,
    /// Distance of `sum` from the proportional target for this depth.
    pub deviation: f64,
}

impl Node {
    pub fn depth(&self) -> usize {
        self.picks.len()
    }

    /// Smallest option index a child may use.
    pub fn next_index(&self) -> u32 {
        self.picks.last().copied().unwrap_or(0)
    }

    /// Ascending priority: tighter bound, then deeper, then closer to the
    /// proportional target, then fewer components, then earlier picks.
    pub fn priority_cmp(&self, other: &Node) -> Ordering {
        self.bound
            .total_cmp(&other.bound)
            .then_with(|| other.depth().cmp(&self.depth()))
            .then_with(|| self.deviation.total_cmp(&other.deviation))
            .then_with(|| self.components.cmp(&other.components))
            .then_with(|| self.picks.cmp(&other.picks))
    }
}

/// Distance from `target` to the interval of sums still reachable when
/// `remaining` branches each contribute between `min_total` and `max_total`.
pub fn lower_bound(target: f64, sum: f64, remaining: usize, min_total: f64, max_total: f64) -> f64 {
    let lo = sum + remaining as f64 * min_total;
    let hi = sum + remaining as f64 * max_total;
    if target < lo {
        lo - target
    } else if target > hi {
        target - hi
    } else {
        0.0
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.priority_cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    /// Reversed so `BinaryHeap` pops the best node first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority_cmp(self)
    }
}
