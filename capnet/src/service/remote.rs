//! Remote `/find_config` client.
//!
//! Failures are kept apart so callers can report each one distinctly:
//! network failure, non-success HTTP status, a payload with
//! `"status": "error"`, and a payload with any other status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::request::FindConfigRequest;
use crate::response::ConfigReport;
use crate::service::provider::{ConfigProvider, ProviderInfo};
use crate::service::ProviderError;

/// Default request timeout, matching the service's own calculation limit.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct RemoteSolver {
    client: Client,
    base_url: String,
}

impl RemoteSolver {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of the find-config endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/find_config", self.base_url)
    }
}

/// Classify an HTTP status and body into a report or a [`ProviderError`].
pub fn interpret_response(status: u16, body: &str) -> Result<ConfigReport, ProviderError> {
    if !(200..300).contains(&status) {
        return Err(ProviderError::HttpStatus {
            status,
            body: body.to_string(),
        });
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    match value.get("status") {
        Some(Value::String(s)) if s == "success" => {
            serde_json::from_value(value).map_err(|e| ProviderError::Decode(e.to_string()))
        }
        Some(Value::String(s)) if s == "error" => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message")
                .to_string();
            Err(ProviderError::Server(message))
        }
        other => {
            tracing::error!("Unexpected server response: {}", value);
            let status = match other {
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
                None => "undefined".to_string(),
            };
            Err(ProviderError::UnexpectedStatus(status))
        }
    }
}

#[async_trait]
impl ConfigProvider for RemoteSolver {
    fn name(&self) -> &str {
        "remote"
    }

    async fn find_config(
        &self,
        request: &FindConfigRequest,
    ) -> Result<ConfigReport, ProviderError> {
        let url = self.endpoint();
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        interpret_response(status, &body)
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "remote".to_string(),
            endpoint: self.endpoint(),
            is_local: false,
        }
    }
}
