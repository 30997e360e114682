//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so every binary linking
//! this crate agrees on the same values.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// config.defaults.toml at the workspace root
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    exploration: f64,
    time_budget_secs: f64,
    seed: u64,
}

/// Default `tracing` filter directive.
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn exploration() -> f64 {
    DEFAULTS.mcts.exploration
}
pub fn time_budget_secs() -> f64 {
    DEFAULTS.mcts.time_budget_secs
}
pub fn seed() -> u64 {
    DEFAULTS.mcts.seed
}
