//! Config Provider Trait
//!
//! Common interface for anything that answers find-config requests: the
//! in-process solver or a remote `/find_config` service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::service::ProviderError;
use crate::request::FindConfigRequest;
use crate::response::ConfigReport;

/// Information about a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "local", "remote")
    pub name: String,

    /// Where requests go: "in-process" or the service URL
    pub endpoint: String,

    /// Whether the solve runs in this process
    pub is_local: bool,
}

#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Solve a request, returning the success report or the classified
    /// failure
    async fn find_config(&self, request: &FindConfigRequest)
        -> Result<ConfigReport, ProviderError>;

    fn info(&self) -> ProviderInfo;
}
