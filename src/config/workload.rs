//! Workload generator definition structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution used to pick existing keys for queries and updates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyDistribution {
    Uniform,
    Zipf { theta: f64 },
    Beta { alpha: f64, beta: f64 },
}

impl Default for KeyDistribution {
    fn default() -> Self {
        Self::Uniform
    }
}

impl fmt::Display for KeyDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyDistribution::Uniform => write!(f, "uniform"),
            KeyDistribution::Zipf { theta } => write!(f, "zipf (theta={})", theta),
            KeyDistribution::Beta { alpha, beta } => {
                write!(f, "beta (alpha={}, beta={})", alpha, beta)
            }
        }
    }
}

/// Synthetic workload shape: a load phase of inserts, then point queries and
/// updates interleaved over the loaded keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Insert records in the load phase
    pub inserts: u64,
    /// Point queries in the mixed phase
    #[serde(default)]
    pub point_queries: u64,
    /// Updates in the mixed phase
    #[serde(default)]
    pub updates: u64,
    /// Fixed key prefix
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Digits in the random numeric key suffix
    #[serde(default = "default_key_digits")]
    pub key_digits: usize,
    /// Insert value length in bytes
    #[serde(default = "default_value_len")]
    pub value_len: usize,
    /// Update value length in bytes
    #[serde(default = "default_update_value_len")]
    pub update_value_len: usize,
    /// How mixed-phase operations select keys
    #[serde(default)]
    pub selection: KeyDistribution,
    /// RNG seed; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_key_prefix() -> String {
    "usertable:user".to_string()
}

fn default_key_digits() -> usize {
    19
}

fn default_value_len() -> usize {
    1090
}

fn default_update_value_len() -> usize {
    128
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            inserts: 1_000_000,
            point_queries: 500_000,
            updates: 500_000,
            key_prefix: default_key_prefix(),
            key_digits: default_key_digits(),
            value_len: default_value_len(),
            update_value_len: default_update_value_len(),
            selection: KeyDistribution::default(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Total records the generator will write
    pub fn total_operations(&self) -> u64 {
        self.inserts + self.point_queries + self.updates
    }
}
