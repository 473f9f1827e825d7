//! In-process solver provider.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{CapnetCore, CapnetError};
use crate::options::SolverOptions;
use crate::request::FindConfigRequest;
use crate::response::ConfigReport;
use crate::service::provider::{ConfigProvider, ProviderInfo};
use crate::service::ProviderError;

/// Runs the solver on the blocking thread pool so async callers stay
/// responsive while the CPU-bound search runs.
#[derive(Debug, Clone, Default)]
pub struct LocalSolver {
    options: Arc<SolverOptions>,
}

impl LocalSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }
}

#[async_trait]
impl ConfigProvider for LocalSolver {
    fn name(&self) -> &str {
        "local"
    }

    async fn find_config(
        &self,
        request: &FindConfigRequest,
    ) -> Result<ConfigReport, ProviderError> {
        let request = request.clone();
        let options = Arc::clone(&self.options);
        let solution = tokio::task::spawn_blocking(move || CapnetCore::solve(&request, &options))
            .await
            .map_err(|e| {
                tracing::error!("Solver task failed: {}", e);
                CapnetError::InternalFault(e.to_string())
            })??;
        Ok(solution.report())
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "local".to_string(),
            endpoint: "in-process".to_string(),
            is_local: true,
        }
    }
}
