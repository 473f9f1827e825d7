//! Best-first branch-and-bound over branch selections.

use std::collections::BinaryHeap;
use std::time::Instant;

use crate::composer::BranchOption;
use crate::options::SolverOptions;
use crate::search::budget::{BudgetCommand, SearchBudget, StopReason};
use crate::search::frontier::{lower_bound, Node};
use crate::search::incumbent::{Candidate, SharedIncumbent};
use crate::search::{NetworkConfiguration, SearchResult, SearchStats, Termination};

/// Per-shard counters and outcome.
#[derive(Debug, Default)]
struct ShardReport {
    expansions: u64,
    generated: u64,
    pruned: u64,
    stopped: Option<StopReason>,
}

pub struct NetworkSearcher<'a> {
    options: &'a [BranchOption],
    totals: Vec<f64>,
    target: f64,
    branches: usize,
    settings: &'a SolverOptions,
}

impl<'a> NetworkSearcher<'a> {
    /// `options` must be sorted by ascending total and contain the empty
    /// group, as produced by [`crate::composer::BranchComposer::compose`].
    pub fn new(
        options: &'a [BranchOption],
        target: f64,
        branches: usize,
        settings: &'a SolverOptions,
    ) -> Self {
        debug_assert!(!options.is_empty());
        debug_assert!(branches >= 1);
        Self {
            options,
            totals: options.iter().map(|o| o.total).collect(),
            target,
            branches,
            settings,
        }
    }

    pub fn search(&self) -> SearchResult {
        let budget = SearchBudget::new(self.settings.max_nodes, self.settings.time_budget());
        self.search_within(&budget)
    }

    /// Search under an externally owned budget, e.g. one shared with a
    /// caller that may request a stop.
    pub fn search_within(&self, budget: &SearchBudget) -> SearchResult {
        let started = Instant::now();
        let tolerance = self.settings.match_tolerance;
        let incumbent = SharedIncumbent::new(self.options);

        incumbent.try_install(&self.fallback());
        incumbent.try_install(&self.greedy());

        let root = self.root();
        let reports = if incumbent.upper_bound() <= tolerance {
            Vec::new()
        } else if self.settings.threads > 1 && self.branches > 1 {
            self.run_sharded(root, &incumbent, budget)
        } else {
            vec![self.run_shard(vec![root], &incumbent, budget)]
        };

        let best = incumbent.into_best().unwrap_or_else(|| self.fallback());
        let termination = if best.distance <= tolerance {
            Termination::ExactMatch
        } else {
            reports
                .iter()
                .find_map(|r| match r.stopped {
                    Some(StopReason::NodeLimit) => Some(Termination::NodeLimit),
                    Some(StopReason::TimeLimit) => Some(Termination::TimeLimit),
                    _ => None,
                })
                .unwrap_or(Termination::Exhausted)
        };

        let stats = SearchStats {
            expansions: reports.iter().map(|r| r.expansions).sum(),
            nodes_generated: reports.iter().map(|r| r.generated).sum(),
            nodes_pruned: reports.iter().map(|r| r.pruned).sum(),
            shards: reports.len(),
            elapsed: started.elapsed(),
        };

        if termination.is_optimal() {
            tracing::debug!(
                "Search finished ({}): distance={}, expansions={}, generated={}, pruned={}",
                termination,
                best.distance,
                stats.expansions,
                stats.nodes_generated,
                stats.nodes_pruned
            );
        } else {
            tracing::warn!(
                "Search stopped early ({}) after {:?}; returning best so far (distance={})",
                termination,
                stats.elapsed,
                best.distance
            );
        }

        let configuration = NetworkConfiguration {
            branches: best
                .picks
                .iter()
                .map(|&i| self.options[i as usize].clone())
                .collect(),
        };

        SearchResult {
            configuration,
            target: self.target,
            achieved: best.achieved,
            absolute_difference: best.distance,
            termination,
            stats,
        }
    }

    /// Every branch with an empty parallel group.
    fn fallback(&self) -> Candidate {
        let empty = self
            .options
            .iter()
            .position(|o| o.composition.is_empty())
            .unwrap_or(0) as u32;
        Candidate::new(vec![empty; self.branches], self.options, self.target)
    }

    /// Place each branch at the total nearest to an even share of what is
    /// still missing.
    fn greedy(&self) -> Candidate {
        let mut picks = Vec::with_capacity(self.branches);
        let mut sum = 0.0;
        for placed in 0..self.branches {
            let remaining = (self.branches - placed) as f64;
            let idx = self.nearest(0, (self.target - sum) / remaining);
            sum += self.totals[idx];
            picks.push(idx as u32);
        }
        picks.sort_unstable();
        Candidate::new(picks, self.options, self.target)
    }

    /// Index of the total closest to `want` among `totals[from..]`.
    fn nearest(&self, from: usize, want: f64) -> usize {
        let pos = from + self.totals[from..].partition_point(|&t| t < want);
        if pos == self.totals.len() {
            pos - 1
        } else if pos == from || self.totals[pos] - want < want - self.totals[pos - 1] {
            pos
        } else {
            pos - 1
        }
    }

    fn root(&self) -> Node {
        let max_total = self.totals[self.totals.len() - 1];
        Node {
            picks: Vec::new(),
            sum: 0.0,
            components: 0,
            bound: lower_bound(self.target, 0.0, self.branches, self.totals[0], max_total),
            deviation: 0.0,
        }
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let depth = node.depth() + 1;
        let remaining = self.branches - depth;
        let proportional = self.target * depth as f64 / self.branches as f64;
        let max_total = self.totals[self.totals.len() - 1];

        (node.next_index() as usize..self.totals.len())
            .map(|k| {
                let sum = node.sum + self.totals[k];
                let mut picks = Vec::with_capacity(depth);
                picks.extend_from_slice(&node.picks);
                picks.push(k as u32);
                Node {
                    picks,
                    sum,
                    components: node.components + self.options[k].component_count(),
                    bound: lower_bound(self.target, sum, remaining, self.totals[k], max_total),
                    deviation: (sum - proportional).abs(),
                }
            })
            .collect()
    }

    /// Place the final branch: only the totals on either side of the
    /// remaining gap can be closest.
    fn complete(&self, node: &Node) -> Vec<Candidate> {
        let from = node.next_index() as usize;
        let want = self.target - node.sum;
        let pos = from + self.totals[from..].partition_point(|&t| t < want);
        [
            pos.checked_sub(1).filter(|&i| i >= from),
            Some(pos).filter(|&i| i < self.totals.len()),
        ]
        .into_iter()
        .flatten()
        .map(|k| {
            let mut picks = Vec::with_capacity(node.depth() + 1);
            picks.extend_from_slice(&node.picks);
            picks.push(k as u32);
            Candidate::new(picks, self.options, self.target)
        })
        .collect()
    }

    fn run_shard(
        &self,
        seeds: Vec<Node>,
        incumbent: &SharedIncumbent<'_>,
        budget: &SearchBudget,
    ) -> ShardReport {
        let tolerance = self.settings.match_tolerance;
        let mut frontier: BinaryHeap<Node> = seeds.into_iter().collect();
        let mut report = ShardReport::default();

        while let Some(node) = frontier.pop() {
            if let BudgetCommand::Terminate(reason) = budget.check(report.expansions) {
                report.stopped = Some(reason);
                break;
            }
            if node.bound > incumbent.upper_bound() {
                report.pruned += 1;
                continue;
            }
            report.expansions += 1;

            if node.depth() + 1 == self.branches {
                let candidates = self.complete(&node);
                report.generated += candidates.len() as u64;
                budget.record_nodes(candidates.len() as u64);
                for candidate in &candidates {
                    incumbent.try_install(candidate);
                }
                if incumbent.upper_bound() <= tolerance {
                    budget.request_stop();
                    break;
                }
                continue;
            }

            let mut children = self.children(&node);
            children.sort_by(|a, b| {
                a.deviation
                    .total_cmp(&b.deviation)
                    .then_with(|| a.picks.cmp(&b.picks))
            });
            let upper_bound = incumbent.upper_bound();
            let mut pushed = 0u64;
            for child in children {
                if child.bound > upper_bound {
                    report.pruned += 1;
                } else {
                    frontier.push(child);
                    pushed += 1;
                }
            }
            report.generated += pushed;
            budget.record_nodes(pushed);
        }

        report
    }

    /// Deal the first-branch choices round-robin to scoped worker threads.
    fn run_sharded(
        &self,
        root: Node,
        incumbent: &SharedIncumbent<'_>,
        budget: &SearchBudget,
    ) -> Vec<ShardReport> {
        let children = self.children(&root);
        let threads = self.settings.threads.min(children.len()).max(1);
        budget.record_nodes(children.len() as u64);

        let mut shards: Vec<Vec<Node>> = (0..threads).map(|_| Vec::new()).collect();
        for (i, child) in children.into_iter().enumerate() {
            shards[i % threads].push(child);
        }
        tracing::debug!("Searching with {} shards", threads);

        let mut reports: Vec<ShardReport> = std::thread::scope(|scope| {
            let handles: Vec<_> = shards
                .into_iter()
                .map(|seeds| scope.spawn(move || self.run_shard(seeds, incumbent, budget)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });

        if let Some(first) = reports.first_mut() {
            first.expansions += 1;
        }
        reports
    }
}
