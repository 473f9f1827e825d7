//! Solver Options
//!
//! Process-wide search ceilings. Loaded once (defaults, optionally a JSON
//! file, then `CAPNET_*` environment overrides) and treated as read-only for
//! every request afterwards.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::CapnetError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Maximum number of parallel-group multisets the catalog may enumerate.
    pub catalog_ceiling: u64,
    /// Maximum number of search nodes generated per request.
    pub max_nodes: u64,
    /// Wall-clock budget per request in milliseconds; 0 disables it.
    pub time_budget_ms: u64,
    /// Distance at or below which a configuration counts as an exact match.
    pub match_tolerance: f64,
    /// Relative epsilon under which two capacitances are the same value.
    pub dedup_epsilon: f64,
    /// Worker threads per search; 1 keeps the search single-threaded.
    pub threads: usize,
    /// Largest accepted `branches` value.
    pub max_branches: u32,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            catalog_ceiling: 2_000_000,
            max_nodes: 500_000,
            time_budget_ms: 2_000,
            match_tolerance: 1e-9,
            dedup_epsilon: 1e-9,
            threads: 1,
            max_branches: 64,
        }
    }
}

impl SolverOptions {
    pub fn time_budget(&self) -> Option<Duration> {
        if self.time_budget_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.time_budget_ms))
        }
    }

    /// Load options from a JSON file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, CapnetError> {
        let content = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&content)
            .map_err(|e| CapnetError::Config(format!("Failed to parse {:?}: {}", path, e)))?;
        options.validate()?;
        tracing::info!("Loaded solver options from {:?}", path);
        Ok(options)
    }

    /// Apply `CAPNET_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, CapnetError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CapnetError> {
        fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, CapnetError> {
            raw.trim()
                .parse()
                .map_err(|_| CapnetError::Config(format!("Invalid value for {}: {:?}", key, raw)))
        }

        if let Some(raw) = lookup("CAPNET_CATALOG_CEILING") {
            self.catalog_ceiling = parse("CAPNET_CATALOG_CEILING", &raw)?;
        }
        if let Some(raw) = lookup("CAPNET_MAX_NODES") {
            self.max_nodes = parse("CAPNET_MAX_NODES", &raw)?;
        }
        if let Some(raw) = lookup("CAPNET_TIME_BUDGET_MS") {
            self.time_budget_ms = parse("CAPNET_TIME_BUDGET_MS", &raw)?;
        }
        if let Some(raw) = lookup("CAPNET_THREADS") {
            self.threads = parse("CAPNET_THREADS", &raw)?;
        }
        if let Some(raw) = lookup("CAPNET_MAX_BRANCHES") {
            self.max_branches = parse("CAPNET_MAX_BRANCHES", &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), CapnetError> {
        if self.catalog_ceiling == 0 || self.catalog_ceiling > u64::from(u32::MAX) {
            return Err(CapnetError::Config(format!(
                "catalog_ceiling must be between 1 and {}",
                u32::MAX
            )));
        }
        if self.max_nodes == 0 {
            return Err(CapnetError::Config("max_nodes must be positive".to_string()));
        }
        if self.threads == 0 {
            return Err(CapnetError::Config("threads must be at least 1".to_string()));
        }
        if self.max_branches == 0 {
            return Err(CapnetError::Config("max_branches must be positive".to_string()));
        }
        if !(self.match_tolerance >= 0.0 && self.match_tolerance.is_finite()) {
            return Err(CapnetError::Config(
                "match_tolerance must be a non-negative number".to_string(),
            ));
        }
        if !(self.dedup_epsilon >= 0.0 && self.dedup_epsilon < 1.0) {
            return Err(CapnetError::Config(
                "dedup_epsilon must be in [0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SolverOptions::default().validate().is_ok());
        assert_eq!(
            SolverOptions::default().time_budget(),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_zero_time_budget_disables_deadline() {
        let options = SolverOptions {
            time_budget_ms: 0,
            ..SolverOptions::default()
        };
        assert_eq!(options.time_budget(), None);
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "threads": 4, "max_nodes": 1000 }}"#).unwrap();

        let options = SolverOptions::from_file(file.path()).unwrap();
        assert_eq!(options.threads, 4);
        assert_eq!(options.max_nodes, 1000);
        assert_eq!(options.catalog_ceiling, SolverOptions::default().catalog_ceiling);
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = SolverOptions::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CapnetError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [("CAPNET_THREADS", "8"), ("CAPNET_TIME_BUDGET_MS", " 250 ")]
            .into_iter()
            .collect();
        let options = SolverOptions::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(options.threads, 8);
        assert_eq!(options.time_budget_ms, 250);
    }

    #[test]
    fn test_override_rejects_garbage() {
        let err = SolverOptions::default()
            .with_overrides(|key| (key == "CAPNET_MAX_NODES").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("CAPNET_MAX_NODES"));
    }

    #[test]
    fn test_override_validates() {
        let err = SolverOptions::default()
            .with_overrides(|key| (key == "CAPNET_THREADS").then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, CapnetError::Config(_)));
    }
}
