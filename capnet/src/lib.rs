//! capnet - capacitor network configuration solver
//!
//! Given a target capacitance, a number of parallel branches, the fixed
//! capacitor placed in series on each branch, and a pool of capacitor
//! values, capnet finds the network whose equivalent capacitance is
//! closest to the target.
//!
//! # Quick Start
//!
//! ```no_run
//! use capnet::{CapnetCore, FindConfigRequest, SolverOptions};
//!
//! let request = FindConfigRequest {
//!     target: 50.0,
//!     branches: 2,
//!     fixed: 10.0,
//!     max_parallel: 3,
//!     available: vec![5.0, 10.0, 15.0],
//! };
//! let solution = CapnetCore::solve(&request, &SolverOptions::default()).unwrap();
//! let report = solution.report();
//!
//! println!("achieved {} (off by {})", report.achieved_capacitance, report.absolute_difference);
//! for branch in &report.branches {
//!     println!("{:?} -> {}", branch.parallel_group_counts, branch.c_branch_total);
//! }
//! ```
//!
//! # Features
//!
//! - **Catalog**: every parallel group reachable within the per-branch budget
//! - **Search**: best-first branch-and-bound with node and time budgets
//! - **Contract**: `/find_config` request and response JSON
//! - **Providers**: in-process solver or a remote `/find_config` service

pub mod catalog;
pub mod combiner;
pub mod composer;
pub mod core;
pub mod form;
pub mod options;
pub mod request;
pub mod response;
pub mod search;
pub mod service;

// Re-export main types
pub use catalog::{BranchCatalog, ParallelComposition};
pub use composer::{BranchComposer, BranchOption};
pub use crate::core::{CapnetCore, CapnetError, Solution, INTERNAL_FAULT_MESSAGE};
pub use form::{ConfigForm, FormError};
pub use options::SolverOptions;
pub use request::{FindConfigRequest, SolveParams};
pub use response::{BranchReport, ConfigBuilder, ConfigReport, FindConfigResponse, ParallelCounts};
pub use search::{NetworkConfiguration, NetworkSearcher, SearchResult, SearchStats, Termination};
pub use service::{ConfigProvider, LocalSolver, ProviderError, RemoteSolver};

/// Solve a request with default options and package the response payload.
pub fn find_config(request: &FindConfigRequest) -> FindConfigResponse {
    CapnetCore::respond(request, &SolverOptions::default())
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BranchReport, CapnetCore, CapnetError, ConfigReport, FindConfigRequest,
        FindConfigResponse, SolverOptions, Termination,
    };
}
