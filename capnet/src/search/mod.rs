//! Network Search
//!
//! Picks `branches` branch options (with repetition, order irrelevant) whose
//! totals sum as close as possible to the target capacitance.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │    Branch    │───▶│   Frontier   │───▶│  Incumbent   │
//! │   Options    │    │ (best-first) │◀───│ (best so far)│
//! └──────────────┘    └──────┬───────┘    └──────────────┘
//!                            │
//!                            ▼
//!                     ┌──────────────┐
//!                     │    Budget    │
//!                     │ (nodes/time) │
//!                     └──────────────┘
//! ```
//!
//! Selections are generated as non-decreasing option indices so every
//! multiset is visited once. The last branch of a selection is placed by
//! binary search over the sorted totals instead of being expanded.

pub mod budget;
pub mod frontier;
pub mod incumbent;
pub mod searcher;

pub use budget::{BudgetCommand, SearchBudget, StopReason};
pub use incumbent::{Candidate, SharedIncumbent};
pub use searcher::NetworkSearcher;

use std::time::Duration;

use crate::composer::BranchOption;

/// The branches of a network, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfiguration {
    pub branches: Vec<BranchOption>,
}

impl NetworkConfiguration {
    /// Σ branch totals.
    pub fn achieved(&self) -> f64 {
        self.branches.iter().fold(0.0, |sum, b| sum + b.total)
    }

    pub fn total_components(&self) -> u32 {
        self.branches.iter().map(|b| b.component_count()).sum()
    }
}

/// How the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A configuration within the match tolerance was found.
    ExactMatch,
    /// Every selection was either visited or pruned.
    Exhausted,
    NodeLimit,
    TimeLimit,
}

impl Termination {
    /// Whether the result is proven closest.
    pub fn is_optimal(&self) -> bool {
        matches!(self, Termination::ExactMatch | Termination::Exhausted)
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::ExactMatch => write!(f, "exact match"),
            Termination::Exhausted => write!(f, "search space exhausted"),
            Termination::NodeLimit => write!(f, "node limit reached"),
            Termination::TimeLimit => write!(f, "time limit reached"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    pub expansions: u64,
    pub nodes_generated: u64,
    pub nodes_pruned: u64,
    pub shards: usize,
    pub elapsed: Duration,
}

/// Best configuration found by [`NetworkSearcher`].
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub configuration: NetworkConfiguration,
    pub target: f64,
    pub achieved: f64,
    pub absolute_difference: f64,
    pub termination: Termination,
    pub stats: SearchStats,
}
