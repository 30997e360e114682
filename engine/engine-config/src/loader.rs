//! Locating, reading and overriding the central configuration.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "SIMUL_CONFIG";

/// Relative locations probed for config.toml, in order.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["config.toml", "../config.toml"];

/// Load the central configuration.
///
/// The file named by `SIMUL_CONFIG` wins; otherwise the first existing entry
/// of [`CONFIG_SEARCH_PATHS`] is used; otherwise the embedded defaults.
/// `SIMUL_<SECTION>_<KEY>` overrides are applied last in every case.
pub fn load_config() -> CentralConfig {
    match find_config_file() {
        Some(path) => load_from_path(&path),
        None => {
            debug!("no config.toml found, using embedded defaults");
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// The config file `load_config` would read, if any.
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_VAR) {
        let explicit = PathBuf::from(explicit);
        if explicit.is_file() {
            return Some(explicit);
        }
        warn!(path = %explicit.display(), "{CONFIG_PATH_VAR} does not name a file, probing defaults");
    }

    CONFIG_SEARCH_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

/// Load configuration from `path`, falling back to the embedded defaults if
/// the file cannot be read or parsed.
pub fn load_from_path(path: &Path) -> CentralConfig {
    let config = match read_config(path) {
        Ok(config) => {
            info!(path = %path.display(), "loaded config");
            config
        }
        Err(reason) => {
            warn!(path = %path.display(), %reason, "config unusable, using embedded defaults");
            CentralConfig::default()
        }
    };
    apply_env_overrides(config)
}

fn read_config(path: &Path) -> Result<CentralConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    toml::from_str(&text).map_err(|e| format!("parse failed: {e}"))
}

/// Replace `slot` with the parsed value of `var`, if it is set and parses.
fn override_from_env<T: FromStr>(var: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(var) else {
        return;
    };
    match raw.parse() {
        Ok(value) => {
            debug!(var, raw = %raw, "env override");
            *slot = value;
        }
        Err(_) => warn!(var, raw = %raw, "ignoring unparseable env override"),
    }
}

/// Apply `SIMUL_<SECTION>_<KEY>` environment overrides to `config`.
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    override_from_env("SIMUL_COMMON_LOG_LEVEL", &mut config.common.log_level);

    let mcts = &mut config.mcts;
    override_from_env("SIMUL_MCTS_NUM_SIMULATIONS", &mut mcts.num_simulations);
    override_from_env("SIMUL_MCTS_EXPLORATION", &mut mcts.exploration);
    override_from_env("SIMUL_MCTS_TIME_BUDGET_SECS", &mut mcts.time_budget_secs);
    override_from_env("SIMUL_MCTS_SEED", &mut mcts.seed);

    config
}
