//! Client-side form validation.
//!
//! Raw text fields are checked before any request is sent: every numeric
//! field must start with a number (trailing text such as a unit is
//! ignored), the comma-separated capacitor list must contain at least one
//! such value, and the range rules below must hold.
//! Anything rejected here never reaches a solver.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::FindConfigRequest;

/// Form fields exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigForm {
    pub target: String,
    pub branches: String,
    pub fixed: String,
    pub max_parallel: String,
    /// Comma-separated list, e.g. `"5, 10, 50"`.
    pub available: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all fields with valid numbers/list.")]
    NotANumber,
    #[error("Number of branches must be positive.")]
    NonPositiveBranches,
    #[error("Max parallel capacitors cannot be negative.")]
    NegativeMaxParallel,
    #[error("Capacitor values (fixed and available) must be positive.")]
    NonPositiveCapacitor,
}

/// Split a comma-separated list, dropping tokens without a numeric prefix.
pub fn parse_available_list(input: &str) -> Vec<f64> {
    input
        .split(',')
        .filter_map(|token| parse_float(token))
        .collect()
}

/// Leading decimal number of `raw`, ignoring anything after it, so `"10uF"`
/// reads as 10 and `"4.7 F"` as 4.7.
fn parse_float(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first().copied(), Some(b'+' | b'-')) {
        end += 1;
    }
    if text[end..].starts_with("Infinity") {
        return Some(if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let int_end = digits_from(end);
    let mut mantissa_end = int_end;
    if bytes.get(int_end) == Some(&b'.') {
        mantissa_end = digits_from(int_end + 1);
    }
    // Need at least one digit before or after the point
    if mantissa_end - end - usize::from(mantissa_end > int_end) == 0 {
        return None;
    }
    end = mantissa_end;

    if matches!(bytes.get(end).copied(), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp).copied(), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok()
}

/// Leading integer of `raw` (sign and digits), so `"3.7"` reads as 3.
/// Values beyond `i64` saturate.
fn parse_int(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let sign = usize::from(matches!(bytes.first().copied(), Some(b'+' | b'-')));
    let digits = bytes[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let number = &text[..sign + digits];
    Some(number.parse::<i64>().unwrap_or(if bytes[0] == b'-' {
        i64::MIN
    } else {
        i64::MAX
    }))
}

impl ConfigForm {
    pub fn validate(&self) -> Result<FindConfigRequest, FormError> {
        let target = parse_float(&self.target);
        let branches = parse_int(&self.branches);
        let fixed = parse_float(&self.fixed);
        let max_parallel = parse_int(&self.max_parallel);
        let available = parse_available_list(&self.available);

        let (Some(target), Some(branches), Some(fixed), Some(max_parallel)) =
            (target, branches, fixed, max_parallel)
        else {
            return Err(FormError::NotANumber);
        };
        if available.is_empty() {
            return Err(FormError::NotANumber);
        }
        if branches <= 0 {
            return Err(FormError::NonPositiveBranches);
        }
        if max_parallel < 0 {
            return Err(FormError::NegativeMaxParallel);
        }
        if fixed <= 0.0 || available.iter().any(|&v| v <= 0.0) {
            return Err(FormError::NonPositiveCapacitor);
        }

        Ok(FindConfigRequest {
            target,
            branches,
            fixed,
            max_parallel,
            available,
        })
    }
}
