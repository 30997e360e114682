//! Monte Carlo Tree Search (MCTS) for simultaneous-move stochastic games.
//!
//! This crate provides a game-agnostic UCT search that works with any game
//! implementing the `engine-core` contracts (`State`, `SimultaneousAction`,
//! `Simulator`).
//!
//! # Overview
//!
//! Both players choose at the same time, so a tree edge is a *joint* action.
//! Each simulation consists of four phases:
//!
//! 1. **Selection**: inside the known tree, each player picks the action with
//!    the best UCT value computed from marginal statistics (summed over every
//!    joint action sharing that player's component)
//! 2. **Chance**: states awaiting a random event are ordinary nodes whose
//!    children are the drawn outcomes; they never go through selection
//! 3. **Expansion + rollout**: the first unknown state gets a node, then the
//!    game is played out with uniformly random joint actions and its final
//!    state is registered
//! 4. **Backpropagation**: the terminal reward (positive favours max) is added
//!    to every node of the path, without negation
//!
//! States with equal keys share one node, whatever path reached them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use games_duel::{DuelConfig, DuelSimulator};
//! use mcts::{run_mcts, MctsConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let simulator = DuelSimulator::new(DuelConfig::new(
//!     vec![4, 6, 3, 2, 1],
//!     vec![3, 5, 2, 6, 1, 8, 9],
//!     2,
//! ));
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let result = run_mcts(simulator, MctsConfig::default(), &mut rng).unwrap();
//!
//! println!("Best joint action: {}", result.description);
//! if let Some(payoff) = result.payoff {
//!     println!("Expected payoff: {:.2} +/- {:.2}", payoff.average, payoff.std_dev);
//! }
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_simulations`: Number of simulations per search (default: 5000)
//! - `exploration`: Exploration constant of UCT (default: sqrt(2))
//! - `time_budget`: Optional wall-clock limit; the search stops at whichever
//!   bound comes first
//!
//! Defaults come from the central `engine-config` crate.
//!
//! # Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                          MctsSearch                          |
//! +--------------------------------------------------------------+
//! |  +--------------+   +--------------+   +------------------+  |
//! |  |   MctsTree   |   |  Simulator   |   | PayoffStatistics |  |
//! |  |   (arena +   |   |  (the game)  |   | (terminal nodes) |  |
//! |  |   registry)  |   |              |   |                  |  |
//! |  +------+-------+   +------+-------+   +--------+---------+  |
//! |         |                  |                    |            |
//! |         v                  v                    v            |
//! |  +--------------------------------------------------------+  |
//! |  |   select -> chance -> expand + rollout -> backprop      |  |
//! |  +--------------------------------------------------------+  |
//! +--------------------------------------------------------------+
//! ```

pub mod config;
pub mod node;
pub mod search;
pub mod stats;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export main types
pub use config::MctsConfig;
pub use node::{JointEntry, NodeId, SearchNode};
pub use search::{run_mcts, MctsSearch, SearchError, SearchResult};
pub use stats::{OutcomeFrequency, PayoffStatistics};
pub use tree::{MctsTree, NodeView, TreeStats};
