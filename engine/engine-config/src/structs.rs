//! Configuration struct definitions.
//!
//! Every field falls back to config.defaults.toml when absent from the file.

use crate::defaults;
use serde::Deserialize;
use std::time::Duration;

// Field defaults for serde, backed by the embedded defaults file

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_time_budget() -> f64 {
    defaults::time_budget_secs()
}
fn d_seed() -> u64 {
    defaults::seed()
}

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    /// UCT exploration coefficient
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    /// Wall-clock budget per search in seconds. Zero or negative disables it.
    #[serde(default = "d_time_budget")]
    pub time_budget_secs: f64,
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl MctsConfig {
    /// The configured deadline as a `Duration`, if any.
    pub fn time_budget(&self) -> Option<Duration> {
        if self.time_budget_secs.is_finite() && self.time_budget_secs > 0.0 {
            Some(Duration::from_secs_f64(self.time_budget_secs))
        } else {
            None
        }
    }
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            exploration: defaults::exploration(),
            time_budget_secs: defaults::time_budget_secs(),
            seed: defaults::seed(),
        }
    }
}
