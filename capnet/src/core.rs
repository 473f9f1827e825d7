//! Core solve pipeline shared by the CLI and the providers.
//! No transport or rendering dependencies.

use std::panic::{self, AssertUnwindSafe};

use crate::catalog::BranchCatalog;
use crate::composer::BranchComposer;
use crate::options::SolverOptions;
use crate::request::{FindConfigRequest, SolveParams};
use crate::response::{ConfigBuilder, ConfigReport, FindConfigResponse};
use crate::search::{NetworkSearcher, SearchResult};

#[derive(Debug, thiserror::Error)]
pub enum CapnetError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Search space too large: {bound} parallel-group combinations exceed the ceiling of {ceiling}")]
    SearchSpaceTooLarge { bound: u128, ceiling: u64 },
    #[error("Internal fault: {0}")]
    InternalFault(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Message returned for faults that carry no safe detail.
pub const INTERNAL_FAULT_MESSAGE: &str = "An unexpected server error occurred.";

/// A solved request: the search result plus what is needed to report it.
#[derive(Debug, Clone)]
pub struct Solution {
    pub params: SolveParams,
    /// Distinct pool values, in caller order.
    pub values: Vec<f64>,
    pub result: SearchResult,
}

impl Solution {
    pub fn report(&self) -> ConfigReport {
        ConfigBuilder::new(self.params.fixed, &self.values).build(&self.result)
    }
}

/// Solver entry points.
pub struct CapnetCore;

impl CapnetCore {
    /// Validate a request and run the full pipeline.
    pub fn solve(
        request: &FindConfigRequest,
        options: &SolverOptions,
    ) -> Result<Solution, CapnetError> {
        let params = request.validate(options)?;
        Self::solve_params(params, options)
    }

    /// Run catalog → composer → search on already validated parameters.
    pub fn solve_params(
        params: SolveParams,
        options: &SolverOptions,
    ) -> Result<Solution, CapnetError> {
        tracing::info!(
            "Solving: target={}, branches={}, fixed={}, max_parallel={}, available={:?}",
            params.target,
            params.branches,
            params.fixed,
            params.max_parallel,
            params.available
        );

        let catalog = BranchCatalog::build(&params.available, params.max_parallel, options)?;
        let branch_options = BranchComposer::compose(params.fixed, &catalog, options.dedup_epsilon);
        if branch_options.is_empty() {
            return Err(CapnetError::InternalFault(
                "branch catalog produced no options".to_string(),
            ));
        }

        let result =
            NetworkSearcher::new(&branch_options, params.target, params.branches, options).search();

        tracing::info!(
            "Achieved {} (difference {}, {}) in {:?}",
            result.achieved,
            result.absolute_difference,
            result.termination,
            result.stats.elapsed
        );

        Ok(Solution {
            values: catalog.values().to_vec(),
            params,
            result,
        })
    }

    /// Request in, response payload out. Every failure, including a panic
    /// inside the solver, becomes an error payload.
    pub fn respond(request: &FindConfigRequest, options: &SolverOptions) -> FindConfigResponse {
        match panic::catch_unwind(AssertUnwindSafe(|| Self::solve(request, options))) {
            Ok(Ok(solution)) => FindConfigResponse::Success(solution.report()),
            Ok(Err(CapnetError::InternalFault(detail))) => {
                tracing::error!("Internal fault while solving: {}", detail);
                FindConfigResponse::error(INTERNAL_FAULT_MESSAGE)
            }
            Ok(Err(e)) => {
                tracing::warn!("Rejected request: {}", e);
                FindConfigResponse::error(e.to_string())
            }
            Err(_) => {
                tracing::error!("Solver panicked for request {:?}", request);
                FindConfigResponse::error(INTERNAL_FAULT_MESSAGE)
            }
        }
    }

    /// Parse a JSON request body and respond, as the `/find_config`
    /// endpoint does.
    pub fn respond_json(body: &str, options: &SolverOptions) -> FindConfigResponse {
        match serde_json::from_str::<FindConfigRequest>(body) {
            Ok(request) => Self::respond(&request, options),
            Err(e) => FindConfigResponse::error(format!("Invalid input: malformed request body: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respond_success() {
        let response = CapnetCore::respond(&FindConfigRequest::default(), &SolverOptions::default());
        assert!(response.is_success());
    }

    #[test]
    fn test_respond_invalid_input() {
        let request = FindConfigRequest {
            branches: 0,
            ..Default::default()
        };
        match CapnetCore::respond(&request, &SolverOptions::default()) {
            FindConfigResponse::Error { message } => assert!(message.contains("branches")),
            other => panic!("expected error payload, got {:?}", other),
        }
    }

    #[test]
    fn test_respond_search_space_too_large() {
        let options = SolverOptions {
            catalog_ceiling: 10,
            ..SolverOptions::default()
        };
        match CapnetCore::respond(&FindConfigRequest::default(), &options) {
            FindConfigResponse::Error { message } => {
                assert!(message.contains("Search space too large"), "{}", message)
            }
            other => panic!("expected error payload, got {:?}", other),
        }
    }

    #[test]
    fn test_respond_json_malformed() {
        let response = CapnetCore::respond_json("{ not json", &SolverOptions::default());
        assert!(!response.is_success());
    }
}
