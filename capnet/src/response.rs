//! Response contract and ConfigBuilder.
//!
//! The JSON shape is consumed by existing front-ends, so field names are
//! fixed:
//!
//! ```json
//! { "status": "success",
//!   "target_capacitance": 75.0, "achieved_capacitance": 7.5,
//!   "absolute_difference": 67.5,
//!   "branches": [ { "c_fixed": 2.5,
//!                   "parallel_group_counts": { "5F": 0, "10F": 0, "50F": 0 },
//!                   "total_parallel_caps_in_group": 0,
//!                   "c_parallel_group": 0.0,
//!                   "c_branch_total": 2.5 } ] }
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::search::SearchResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FindConfigResponse {
    Success(ConfigReport),
    Error { message: String },
}

impl FindConfigResponse {
    pub fn error(message: impl Into<String>) -> Self {
        FindConfigResponse::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FindConfigResponse::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigReport {
    pub target_capacitance: f64,
    pub achieved_capacitance: f64,
    pub absolute_difference: f64,
    pub branches: Vec<BranchReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchReport {
    pub c_fixed: f64,
    pub parallel_group_counts: ParallelCounts,
    pub total_parallel_caps_in_group: u32,
    pub c_parallel_group: f64,
    pub c_branch_total: f64,
}

/// Capacitor count per value, keyed `"<value>F"` and kept in pool order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallelCounts(pub Vec<(String, u32)>);

impl ParallelCounts {
    pub fn get(&self, key: &str) -> Option<u32> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// Entries with a non-zero count.
    pub fn used(&self) -> impl Iterator<Item = (&str, u32)> {
        self.iter().filter(|(_, c)| *c > 0)
    }
}

impl Serialize for ParallelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, count) in &self.0 {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParallelCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = ParallelCounts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of capacitor value to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, count)) = access.next_entry::<String, u32>()? {
                    entries.push((key, count));
                }
                Ok(ParallelCounts(entries))
            }
        }

        deserializer.deserialize_map(CountsVisitor)
    }
}

/// Display key for a capacitor value: shortest round-trip decimal plus `F`.
pub fn value_key(value: f64) -> String {
    format!("{}F", value)
}

/// Packages a [`SearchResult`] into the response contract.
pub struct ConfigBuilder<'a> {
    fixed: f64,
    values: &'a [f64],
}

impl<'a> ConfigBuilder<'a> {
    /// `values` are the distinct pool values the compositions index into.
    pub fn new(fixed: f64, values: &'a [f64]) -> Self {
        Self { fixed, values }
    }

    pub fn build(&self, result: &SearchResult) -> ConfigReport {
        let branches: Vec<BranchReport> = result
            .configuration
            .branches
            .iter()
            .map(|branch| {
                let counts = self
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, &value)| (value_key(value), branch.composition.count(i)))
                    .collect();
                BranchReport {
                    c_fixed: self.fixed,
                    parallel_group_counts: ParallelCounts(counts),
                    total_parallel_caps_in_group: branch.component_count(),
                    c_parallel_group: branch.group_sum,
                    c_branch_total: branch.total,
                }
            })
            .collect();

        let achieved = branches.iter().fold(0.0, |sum, b| sum + b.c_branch_total);
        ConfigReport {
            target_capacitance: result.target,
            achieved_capacitance: achieved,
            absolute_difference: (result.target - achieved).abs(),
            branches,
        }
    }
}
