//! MCTS configuration parameters.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of simulations to run per search.
    pub num_simulations: u32,

    /// Exploration coefficient `C` of the UCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    /// The textbook value is sqrt(2).
    pub exploration: f64,

    /// Wall-clock budget per search. The search stops at whichever of
    /// `num_simulations` and this deadline comes first.
    pub time_budget: Option<Duration>,

    /// Seed for `rng()`, so a configured search is reproducible.
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self::from(&engine_config::MctsConfig::default())
    }
}

impl From<&engine_config::MctsConfig> for MctsConfig {
    fn from(config: &engine_config::MctsConfig) -> Self {
        Self {
            num_simulations: config.num_simulations,
            exploration: config.exploration,
            time_budget: config.time_budget(),
            seed: config.seed,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 200,
            exploration: std::f64::consts::SQRT_2,
            time_budget: None,
            seed: 42,
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set the exploration coefficient.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Builder pattern: set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fresh RNG seeded from `seed`.
    pub fn rng(&self) -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(self.seed)
    }

    /// Check that the values describe a search that can run.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_simulations == 0 {
            return Err("num_simulations must be at least 1".to_string());
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(format!(
                "exploration must be a finite non-negative number, got {}",
                self.exploration
            ));
        }
        Ok(())
    }
}
