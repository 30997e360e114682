//! MCTS search implementation.
//!
//! One simulation drives the simulator from its initial state to a terminal
//! state while consulting the tree:
//! 1. Selection: inside the known tree, pick a joint action with per-player
//!    marginal UCT (every joint action is tried once first)
//! 2. Chance: states awaiting a chance event are registered and resolved by
//!    the simulator, never selected
//! 3. Expansion + rollout: the first unknown state gets a node, then a
//!    uniformly random playout runs to the end of the game, whose final
//!    state is registered too
//! 4. Backpropagation: the terminal reward is added to every node on the path
//!
//! The loop is explicit, so the stack stays flat however long the game is.

use std::time::{Duration, Instant};

use engine_core::{
    Action, HashKey, JointOf, Player, SimultaneousAction, Simulator, SimulatorError, State,
};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::MctsConfig;
use crate::node::SearchNode;
use crate::stats::PayoffStatistics;
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("UCT evaluated for {player} action {action} before it was visited (node visits: {node_visits})")]
    UnvisitedAction {
        player: Player,
        action: HashKey,
        node_visits: u32,
    },

    #[error("State {0} is not final but offers no legal joint action")]
    NoLegalJointActions(HashKey),

    #[error("No legal joint action combines max {max} and min {min}")]
    UnmatchedJointAction { max: HashKey, min: HashKey },

    #[error("Joint action {0} is not offered by the current state")]
    UnknownJointAction(HashKey),

    #[error("Simulator left its initial state without reporting the joint action")]
    MissingPreviousAction,

    #[error("No root joint action has been explored yet")]
    NothingExplored,

    #[error("Simulator error: {0}")]
    Simulator(#[from] SimulatorError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult<J> {
    /// Most visited joint action at the root
    pub action: J,

    /// Key of `action`
    pub action_key: HashKey,

    /// Human-readable description of `action`
    pub description: String,

    /// Visits of the child reached through `action`
    pub visits: u32,

    /// Outcome distribution over the visited terminal nodes
    pub payoff: Option<PayoffStatistics>,

    /// Number of simulations performed by this call
    pub simulations: u32,

    /// Wall-clock time spent by this call
    pub elapsed: Duration,
}

/// MCTS search state.
///
/// The tree persists across calls to `run_simulations`, so repeated calls
/// keep refining the same statistics.
pub struct MctsSearch<S: Simulator> {
    tree: MctsTree,
    simulator: S,
    root_state: S::State,
    config: MctsConfig,
    simulations_ran: u64,
}

impl<S: Simulator> MctsSearch<S> {
    /// Create a new search rooted at the simulator's initial state.
    pub fn new(mut simulator: S, config: MctsConfig) -> Result<Self, SearchError> {
        config.validate().map_err(SearchError::InvalidConfig)?;

        simulator.restart();
        let root_state = simulator.state();
        let tree = MctsTree::new(&root_state);

        Ok(Self {
            tree,
            simulator,
            root_state,
            config,
            simulations_ran: 0,
        })
    }

    /// Run the search with the configured simulation count and time budget.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchResult<JointOf<S>>, SearchError> {
        self.run_simulations(self.config.num_simulations, self.config.time_budget, rng)
    }

    /// Run up to `count` simulations, stopping early once `time_budget` has
    /// elapsed, then recommend the most visited root joint action.
    pub fn run_simulations(
        &mut self,
        count: u32,
        time_budget: Option<Duration>,
        rng: &mut ChaCha20Rng,
    ) -> Result<SearchResult<JointOf<S>>, SearchError> {
        let start = Instant::now();
        let deadline = time_budget.and_then(|budget| start.checked_add(budget));

        let mut ran = 0u32;
        while ran < count && deadline.map_or(true, |d| Instant::now() < d) {
            self.simulate(rng)?;
            ran += 1;
            self.simulations_ran += 1;
        }
        let elapsed = start.elapsed();

        self.simulator.restart();
        self.tree.back_to_root();

        if ran < count {
            warn!(
                ran,
                count,
                elapsed_ms = elapsed.as_millis() as u64,
                "Time budget exhausted before the simulation target"
            );
        }
        debug!(
            ran,
            total = self.simulations_ran,
            nodes = self.tree.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "MCTS search complete"
        );

        self.recommend(ran, elapsed, rng)
    }

    /// Total simulations run by this search across all calls.
    pub fn simulations_ran(&self) -> u64 {
        self.simulations_ran
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }

    /// Get the configuration in use.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    fn recommend(
        &self,
        simulations: u32,
        elapsed: Duration,
        rng: &mut ChaCha20Rng,
    ) -> Result<SearchResult<JointOf<S>>, SearchError> {
        let root = self.tree.get(self.tree.root());
        let (action_key, visits) =
            self.tree
                .most_visited_root_joint_action(rng)
                .ok_or_else(|| {
                    if root.legal.is_empty() {
                        SearchError::NoLegalJointActions(root.state_key)
                    } else {
                        SearchError::NothingExplored
                    }
                })?;

        let action = find_joint(&self.root_state, action_key)?;
        let description = self
            .tree
            .describe(action_key)
            .map(str::to_owned)
            .unwrap_or_else(|| action.describe());

        Ok(SearchResult {
            action,
            action_key,
            description,
            visits,
            payoff: PayoffStatistics::from_tree(&self.tree),
            simulations,
            elapsed,
        })
    }

    /// Run a single simulation from the initial state to the end of the game.
    /// Returns the terminal reward.
    fn simulate(&mut self, rng: &mut ChaCha20Rng) -> Result<f64, SearchError> {
        self.simulator.restart();
        self.tree.back_to_root();
        let mut rollout_steps = None;

        loop {
            if self.simulator.is_over() {
                let reward = self.simulator.reward();
                let state = self.simulator.state();
                match rollout_steps {
                    Some(steps) => self.descend_after_rollout(&state, steps)?,
                    None => self.descend_to(&state)?,
                }
                self.tree.update(reward);

                trace!(
                    node = self.tree.current().0,
                    reward,
                    rollout_steps = rollout_steps.unwrap_or(0),
                    "MCTS simulation complete"
                );
                return Ok(reward);
            }

            let state = self.simulator.state();

            if state.awaits_chance() {
                self.descend_to(&state)?;
                self.simulator.run_simultaneous_action(rng)?;
            } else if self.tree.has_state(&state) {
                self.descend_to(&state)?;
                let joint = self.select(&state, rng)?;
                self.simulator.choose(joint);
                if !self.simulator.state().awaits_chance() {
                    self.simulator.run_simultaneous_action(rng)?;
                }
            } else {
                self.descend_to(&state)?;
                rollout_steps = Some(self.rollout(rng)?);
                self.tree.add_rollout();
            }
        }
    }

    /// Move the cursor to the node of `state`, through the joint action that
    /// produced it. No-op if the cursor is already there.
    fn descend_to(&mut self, state: &S::State) -> Result<(), SearchError> {
        if self.tree.node_for(state) == Some(self.tree.current()) {
            return Ok(());
        }
        let previous = self
            .simulator
            .previous_simultaneous_action()
            .ok_or(SearchError::MissingPreviousAction)?;
        self.tree.go_to_child_state(&previous, state);
        Ok(())
    }

    /// Move the cursor from the expansion node to the final state the
    /// rollout reached.
    fn descend_after_rollout(&mut self, state: &S::State, steps: u32) -> Result<(), SearchError> {
        let last = self
            .simulator
            .previous_simultaneous_action()
            .ok_or(SearchError::MissingPreviousAction)?;
        self.tree.go_to_rollout_end(&last, state, steps);
        Ok(())
    }

    /// Pick the joint action to play from the cursor node.
    fn select(
        &self,
        state: &S::State,
        rng: &mut ChaCha20Rng,
    ) -> Result<JointOf<S>, SearchError> {
        let arena = self.tree.arena();
        let node = self.tree.get(self.tree.current());
        if node.legal.is_empty() {
            return Err(SearchError::NoLegalJointActions(node.state_key));
        }

        let unplayed = node.unplayed_joint_actions(arena);
        let key = match unplayed.choose(rng) {
            Some(&key) => key,
            None => {
                let max = self.best_marginal_action(node, state, Player::Max, rng)?;
                let min = self.best_marginal_action(node, state, Player::Min, rng)?;
                node.joint_action_for(max, min)?
            }
        };

        find_joint(state, key)
    }

    /// The action of `player` with the highest marginal UCT value, ties
    /// broken at random.
    fn best_marginal_action(
        &self,
        node: &SearchNode,
        state: &S::State,
        player: Player,
        rng: &mut ChaCha20Rng,
    ) -> Result<HashKey, SearchError> {
        let arena = self.tree.arena();
        let mut best: Vec<HashKey> = Vec::new();
        let mut best_value = f64::NEG_INFINITY;

        for action in state.player_actions(player) {
            let key = action.key();
            if best.contains(&key) {
                continue;
            }
            let value = node.marginal_uct(arena, player, key, self.config.exploration)?;
            if value > best_value {
                best_value = value;
                best.clear();
                best.push(key);
            } else if value == best_value {
                best.push(key);
            }
        }

        best.choose(rng)
            .copied()
            .ok_or(SearchError::NoLegalJointActions(node.state_key))
    }

    /// Play uniformly random legal joint actions until the game is over.
    /// The tree is not consulted. Returns the number of transitions played.
    fn rollout(&mut self, rng: &mut ChaCha20Rng) -> Result<u32, SearchError> {
        let mut steps = 0;
        while !self.simulator.is_over() {
            let state = self.simulator.state();
            if !state.awaits_chance() {
                let joint = state
                    .possible_simultaneous_actions()
                    .choose(rng)
                    .cloned()
                    .ok_or(SearchError::NoLegalJointActions(state.key()))?;
                self.simulator.choose(joint);
            }
            self.simulator.run_simultaneous_action(rng)?;
            steps += 1;
        }
        Ok(steps)
    }
}

/// The joint action of `state` with key `key`.
fn find_joint<T: State>(state: &T, key: HashKey) -> Result<T::Joint, SearchError> {
    state
        .possible_simultaneous_actions()
        .into_iter()
        .find(|joint| joint.key() == key)
        .ok_or(SearchError::UnknownJointAction(key))
}

/// Convenience function to run a single MCTS search.
pub fn run_mcts<S: Simulator>(
    simulator: S,
    config: MctsConfig,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult<JointOf<S>>, SearchError> {
    let mut search = MctsSearch::new(simulator, config)?;
    search.run(rng)
}
