//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! across the workspace (search driver, benches, embedding applications).
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`SIMUL_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! SIMUL_<SECTION>_<KEY>=value
//!
//! Examples:
//!     SIMUL_COMMON_LOG_LEVEL=debug
//!     SIMUL_MCTS_NUM_SIMULATIONS=20000
//!     SIMUL_MCTS_EXPLORATION=1.0
//!     SIMUL_MCTS_TIME_BUDGET_SECS=2.5
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, find_config_file, load_config, load_from_path, CONFIG_PATH_VAR,
    CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;
