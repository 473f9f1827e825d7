//! Search Budget
//!
//! Node and wall-clock limits shared by every shard of one search. The clock
//! is only read every `clock_check_mask + 1` expansions so the check stays
//! cheap inside the frontier loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Why a shard stopped before exhausting its frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    NodeLimit,
    TimeLimit,
    /// Another shard asked everyone to stop.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetCommand {
    Continue,
    Terminate(StopReason),
}

#[derive(Debug)]
pub struct SearchBudget {
    max_nodes: u64,
    deadline: Option<Instant>,
    clock_check_mask: u64,
    nodes: AtomicU64,
    stop: AtomicBool,
}

impl SearchBudget {
    /// Check the clock every 64 expansions.
    const DEFAULT_CLOCK_CHECK_MASK: u64 = 0x3F;

    pub fn new(max_nodes: u64, time_budget: Option<Duration>) -> Self {
        Self::with_clock_check_mask(max_nodes, time_budget, Self::DEFAULT_CLOCK_CHECK_MASK)
    }

    pub fn with_clock_check_mask(
        max_nodes: u64,
        time_budget: Option<Duration>,
        clock_check_mask: u64,
    ) -> Self {
        Self {
            max_nodes,
            deadline: time_budget.map(|budget| Instant::now() + budget),
            clock_check_mask,
            nodes: AtomicU64::new(0),
            stop: AtomicBool::new(false),
        }
    }

    /// Account for freshly generated nodes.
    #[inline]
    pub fn record_nodes(&self, count: u64) {
        self.nodes.fetch_add(count, Ordering::Relaxed);
    }

    fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    /// Ask every shard to stop at its next check.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Decide whether the shard at expansion `step` may continue.
    #[inline]
    pub fn check(&self, step: u64) -> BudgetCommand {
        if self.is_stopped() {
            return BudgetCommand::Terminate(StopReason::Interrupted);
        }
        if self.nodes() >= self.max_nodes {
            return BudgetCommand::Terminate(StopReason::NodeLimit);
        }
        if (step & self.clock_check_mask) == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return BudgetCommand::Terminate(StopReason::TimeLimit);
                }
            }
        }
        BudgetCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_limit() {
        let budget = SearchBudget::new(10, None);
        assert_eq!(budget.check(1), BudgetCommand::Continue);
        budget.record_nodes(10);
        assert_eq!(
            budget.check(2),
            BudgetCommand::Terminate(StopReason::NodeLimit)
        );
    }

    #[test]
    fn test_time_limit_only_checked_on_mask() {
        let budget = SearchBudget::with_clock_check_mask(u64::MAX, Some(Duration::ZERO), 0x3);
        assert_eq!(budget.check(1), BudgetCommand::Continue);
        assert_eq!(
            budget.check(4),
            BudgetCommand::Terminate(StopReason::TimeLimit)
        );
    }

    #[test]
    fn test_interrupt() {
        let budget = SearchBudget::new(u64::MAX, None);
        budget.request_stop();
        assert_eq!(
            budget.check(1),
            BudgetCommand::Terminate(StopReason::Interrupted)
        );
    }
}
