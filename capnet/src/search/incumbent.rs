//! Shared Incumbent
//!
//! Best complete configuration found so far, shared between search shards.
//! The best distance is mirrored in an atomic (as `f64` bits) so shards can
//! prune without taking the lock; the candidate itself lives behind a
//! `Mutex` and is the source of truth.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Mutex;

use crate::composer::BranchOption;

/// A complete selection of branch options.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Indices into the branch options, non-decreasing.
    pub picks: Vec<u32>,
    pub achieved: f64,
    pub distance: f64,
    /// Parallel capacitors used across all branches.
    pub components: u32,
}

impl Candidate {
    pub fn new(picks: Vec<u32>, options: &[BranchOption], target: f64) -> Self {
        let achieved = achieved_of(&picks, options);
        let components = picks
            .iter()
            .map(|&i| options[i as usize].component_count())
            .sum();
        Self {
            picks,
            achieved,
            distance: (target - achieved).abs(),
            components,
        }
    }

    /// Ranking used for every "is this better" decision: closer to target,
    /// then fewer parallel capacitors, then the lexicographically earliest
    /// per-branch count vectors.
    pub fn rank_cmp(&self, other: &Candidate, options: &[BranchOption]) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.components.cmp(&other.components))
            .then_with(|| {
                let composition = |&i: &u32| &options[i as usize].composition;
                self.picks
                    .iter()
                    .map(composition)
                    .cmp(other.picks.iter().map(composition))
            })
    }
}

/// Σ branch totals, folded in pick order.
pub fn achieved_of(picks: &[u32], options: &[BranchOption]) -> f64 {
    picks
        .iter()
        .fold(0.0, |sum, &i| sum + options[i as usize].total)
}

#[derive(Debug)]
pub struct SharedIncumbent<'a> {
    options: &'a [BranchOption],
    upper_bound: AtomicU64,
    best: Mutex<Option<Candidate>>,
}

impl<'a> SharedIncumbent<'a> {
    pub fn new(options: &'a [BranchOption]) -> Self {
        Self {
            options,
            upper_bound: AtomicU64::new(f64::INFINITY.to_bits()),
            best: Mutex::new(None),
        }
    }

    /// Distance of the incumbent, `f64::INFINITY` when none is installed.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        f64::from_bits(self.upper_bound.load(AtomicOrdering::Relaxed))
    }

    /// Install `candidate` if it ranks strictly better than the incumbent.
    pub fn try_install(&self, candidate: &Candidate) -> bool {
        if candidate.distance > self.upper_bound() {
            return false;
        }
        let mut best = self
            .best
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let better = best
            .as_ref()
            .map_or(true, |current| {
                candidate.rank_cmp(current, self.options) == Ordering::Less
            });
        if better {
            *best = Some(candidate.clone());
            self.upper_bound
                .store(candidate.distance.to_bits(), AtomicOrdering::Relaxed);
        }
        better
    }

    pub fn into_best(self) -> Option<Candidate> {
        self.best
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
