//! Tests for the configuration module.

use super::*;
use std::sync::Mutex;
use std::time::Duration;

/// Serializes tests that touch process-wide environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.mcts.num_simulations, 5000);
    assert_eq!(config.mcts.seed, 42);
}

#[test]
fn test_mcts_defaults() {
    let config = CentralConfig::default();
    assert!((config.mcts.exploration - std::f64::consts::SQRT_2).abs() < 1e-12);
    assert!(config.mcts.time_budget().is_none());
}

#[test]
fn test_time_budget() {
    let mut config = MctsConfig::default();
    config.time_budget_secs = 1.5;
    assert_eq!(config.time_budget(), Some(Duration::from_millis(1500)));

    config.time_budget_secs = -1.0;
    assert!(config.time_budget().is_none());

    config.time_budget_secs = f64::NAN;
    assert!(config.time_budget().is_none());
}

#[test]
fn test_env_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap();
    std::env::set_var("SIMUL_COMMON_LOG_LEVEL", "debug");
    std::env::set_var("SIMUL_MCTS_NUM_SIMULATIONS", "7");
    std::env::set_var("SIMUL_MCTS_EXPLORATION", "0.5");

    let config = load_config();
    assert_eq!(config.common.log_level, "debug");
    assert_eq!(config.mcts.num_simulations, 7);
    assert!((config.mcts.exploration - 0.5).abs() < f64::EPSILON);

    std::env::remove_var("SIMUL_COMMON_LOG_LEVEL");
    std::env::remove_var("SIMUL_MCTS_NUM_SIMULATIONS");
    std::env::remove_var("SIMUL_MCTS_EXPLORATION");
}

#[test]
fn test_unparseable_env_override_is_ignored() {
    let _guard = ENV_MUTEX.lock().unwrap();
    std::env::set_var("SIMUL_MCTS_SEED", "not-a-number");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.mcts.seed, 42);

    std::env::remove_var("SIMUL_MCTS_SEED");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
log_level = "trace"

[mcts]
num_simulations = 1600
exploration = 2.0
time_budget_secs = 0.25
seed = 7
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.log_level, "trace");
    assert_eq!(config.mcts.num_simulations, 1600);
    assert!((config.mcts.exploration - 2.0).abs() < f64::EPSILON);
    assert_eq!(config.mcts.time_budget(), Some(Duration::from_millis(250)));
    assert_eq!(config.mcts.seed, 7);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[mcts]
num_simulations = 100
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.mcts.num_simulations, 100);
    assert_eq!(config.mcts.seed, 42); // Default
    assert_eq!(config.common.log_level, "info"); // Default
}

#[test]
fn test_load_from_missing_path_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let config = load_from_path(std::path::Path::new("/nonexistent/config.toml"));
    assert_eq!(config.mcts.num_simulations, 5000);
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.common.log_level, cloned.common.log_level);
    assert_eq!(config.mcts.num_simulations, cloned.mcts.num_simulations);
}

#[test]
fn test_explicit_config_path() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let path = std::env::temp_dir().join(format!("simul-config-{}.toml", std::process::id()));
    std::fs::write(&path, "[mcts]\nnum_simulations = 321\n").unwrap();
    std::env::set_var(CONFIG_PATH_VAR, &path);

    assert_eq!(find_config_file(), Some(path.clone()));
    let config = load_config();
    assert_eq!(config.mcts.num_simulations, 321);
    assert_eq!(config.mcts.seed, 42);

    std::env::remove_var(CONFIG_PATH_VAR);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_unparseable_file_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let path = std::env::temp_dir().join(format!("simul-broken-{}.toml", std::process::id()));
    std::fs::write(&path, "[mcts\nnum_simulations = ").unwrap();

    let config = load_from_path(&path);
    assert_eq!(config.mcts.num_simulations, 5000);

    std::fs::remove_file(&path).unwrap();
}
