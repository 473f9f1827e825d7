//! `/find_config` request body and its validation.

use serde::{Deserialize, Serialize};

use crate::core::CapnetError;
use crate::options::SolverOptions;

/// Request body accepted by the solver. Missing fields take the service
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindConfigRequest {
    /// Target equivalent capacitance in farads.
    #[serde(default = "default_target")]
    pub target: f64,
    /// Number of parallel branches (must be positive).
    #[serde(default = "default_branches")]
    pub branches: i64,
    /// Fixed capacitor value in each branch (must be positive).
    #[serde(default = "default_fixed")]
    pub fixed: f64,
    /// Maximum number of parallel capacitors per branch.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: i64,
    /// Available parallel capacitor values (must be positive).
    #[serde(default = "default_available")]
    pub available: Vec<f64>,
}

fn default_target() -> f64 {
    75.0
}

fn default_branches() -> i64 {
    3
}

fn default_fixed() -> f64 {
    2.5
}

fn default_max_parallel() -> i64 {
    20
}

fn default_available() -> Vec<f64> {
    vec![5.0, 10.0, 50.0]
}

impl Default for FindConfigRequest {
    fn default() -> Self {
        Self {
            target: default_target(),
            branches: default_branches(),
            fixed: default_fixed(),
            max_parallel: default_max_parallel(),
            available: default_available(),
        }
    }
}

/// Validated solver input.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveParams {
    pub target: f64,
    pub branches: usize,
    pub fixed: f64,
    pub max_parallel: u32,
    pub available: Vec<f64>,
}

impl FindConfigRequest {
    /// Check ranges and convert into solver parameters.
    pub fn validate(&self, options: &SolverOptions) -> Result<SolveParams, CapnetError> {
        if !self.target.is_finite() {
            return Err(CapnetError::InvalidInput(
                "Target capacitance must be a finite number".to_string(),
            ));
        }
        if self.branches <= 0 {
            return Err(CapnetError::InvalidInput(
                "Number of branches must be positive".to_string(),
            ));
        }
        if self.branches > i64::from(options.max_branches) {
            return Err(CapnetError::InvalidInput(format!(
                "Number of branches must not exceed {}",
                options.max_branches
            )));
        }
        if !(self.fixed.is_finite() && self.fixed > 0.0) {
            return Err(CapnetError::InvalidInput(
                "Fixed capacitor value must be positive".to_string(),
            ));
        }
        if self.max_parallel < 0 {
            return Err(CapnetError::InvalidInput(
                "Max parallel capacitors cannot be negative".to_string(),
            ));
        }
        let max_parallel = u32::try_from(self.max_parallel).map_err(|_| {
            CapnetError::InvalidInput(format!(
                "Max parallel capacitors must not exceed {}",
                u32::MAX
            ))
        })?;
        if self.available.is_empty() {
            return Err(CapnetError::InvalidInput(
                "Available capacitor list must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .available
            .iter()
            .find(|v| !(v.is_finite() && **v > 0.0))
        {
            return Err(CapnetError::InvalidInput(format!(
                "Available capacitor values must be positive, got {}",
                bad
            )));
        }

        Ok(SolveParams {
            target: self.target,
            branches: self.branches as usize,
            fixed: self.fixed,
            max_parallel,
            available: self.available.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_body() {
        let request: FindConfigRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, FindConfigRequest::default());
        assert_eq!(request.available, vec![5.0, 10.0, 50.0]);
    }

    #[test]
    fn test_parse_full_body() {
        let request: FindConfigRequest = serde_json::from_str(
            r#"{"target": 50, "branches": 2, "fixed": 10, "max_parallel": 3, "available": [5, 10, 15]}"#,
        )
        .unwrap();
        let params = request.validate(&SolverOptions::default()).unwrap();
        assert_eq!(params.branches, 2);
        assert_eq!(params.max_parallel, 3);
        assert_eq!(params.available, vec![5.0, 10.0, 15.0]);
    }

    #[test]
    fn test_rejects_invalid_fields() {
        let options = SolverOptions::default();
        let cases = [
            FindConfigRequest { branches: 0, ..Default::default() },
            FindConfigRequest { fixed: 0.0, ..Default::default() },
            FindConfigRequest { fixed: f64::NAN, ..Default::default() },
            FindConfigRequest { max_parallel: -1, ..Default::default() },
            FindConfigRequest { available: vec![], ..Default::default() },
            FindConfigRequest { available: vec![5.0, -1.0], ..Default::default() },
            FindConfigRequest { target: f64::INFINITY, ..Default::default() },
            FindConfigRequest { branches: 1000, ..Default::default() },
        ];
        for request in cases {
            let err = request.validate(&options).unwrap_err();
            assert!(
                matches!(err, CapnetError::InvalidInput(_)),
                "{:?} should be invalid input",
                request
            );
        }
    }

    #[test]
    fn test_zero_max_parallel_is_valid() {
        let request = FindConfigRequest {
            max_parallel: 0,
            ..Default::default()
        };
        assert_eq!(request.validate(&SolverOptions::default()).unwrap().max_parallel, 0);
    }
}
