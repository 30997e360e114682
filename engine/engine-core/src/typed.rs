//! Typed game contracts consumed by the search engine
//!
//! A game plugs into the search by implementing four small traits: one for a
//! single player's move, one for a joint move, one for a state snapshot and
//! one for the simulator that produces those snapshots. The search is generic
//! over this set and never sees a game-specific type.

use crate::key::HashKey;
use crate::player::Player;
use rand_chacha::ChaCha20Rng;
use std::fmt::Debug;

/// An atomic move available to one player.
pub trait Action: Clone + Debug {
    /// Display name, used in tree descriptions.
    fn name(&self) -> String;

    /// Stable content hash. Equal keys are interchangeable for statistics.
    fn key(&self) -> HashKey;
}

/// A joint move: one action per player, resolved in a single time step.
///
/// When a chance event is overlaid on top of the players' choices, the
/// resulting pseudo-action reports `is_chance() == true` and its key MUST
/// differ from the key of every other outcome of the same player choices.
/// Otherwise statistics for distinct chance branches would be merged.
pub trait SimultaneousAction: Clone + Debug {
    /// Single-player action type.
    type Action: Action;

    /// The component chosen by `player`.
    fn action(&self, player: Player) -> &Self::Action;

    /// Whether this represents a chance resolution rather than a decision.
    fn is_chance(&self) -> bool;

    /// Combined hash, unique per joint outcome (chance outcome included).
    fn key(&self) -> HashKey;

    /// Human-readable description.
    fn describe(&self) -> String {
        let base = format!(
            "{} / {}",
            self.action(Player::Max).name(),
            self.action(Player::Min).name()
        );
        if self.is_chance() {
            format!("{base} [chance]")
        } else {
            base
        }
    }
}

/// Shorthand for the joint action type of a simulator.
pub type JointOf<S> = <<S as Simulator>::State as State>::Joint;

/// A snapshot of the game at one point of a trajectory.
///
/// # Example
///
/// ```rust,ignore
/// impl State for DuelState {
///     type Joint = DuelMove;
///
///     fn key(&self) -> HashKey {
///         HashKey::of(&(&self.max_hand, &self.min_hand, self.turn, self.score))
///     }
///
///     fn possible_simultaneous_actions(&self) -> Vec<DuelMove> {
///         // cartesian product of both hands
///     }
///
///     fn player_actions(&self, player: Player) -> Vec<Card> {
///         // the player's hand
///     }
///
///     fn is_final(&self) -> bool { self.turn > self.max_turns }
///     fn awaits_chance(&self) -> bool { false }
/// }
/// ```
pub trait State: Clone + Debug {
    /// Joint action type produced and consumed in this state.
    type Joint: SimultaneousAction;

    /// Node identity. States with equal keys share one search node.
    fn key(&self) -> HashKey;

    /// Legal joint actions, including chance pseudo-actions when the state
    /// awaits a chance resolution.
    fn possible_simultaneous_actions(&self) -> Vec<Self::Joint>;

    /// Legal single-player actions for `player`.
    fn player_actions(
        &self,
        player: Player,
    ) -> Vec<<Self::Joint as SimultaneousAction>::Action>;

    /// Whether the game is over in this state.
    fn is_final(&self) -> bool;

    /// Whether an exogenous chance event must resolve before the next decision.
    fn awaits_chance(&self) -> bool;
}

/// Forward-only game runner.
///
/// The simulator is mutated in place by the search and restarted between
/// iterations. Randomness for chance events comes from the caller's RNG so
/// seeded searches are reproducible.
pub trait Simulator {
    /// State snapshot type.
    type State: State;

    /// Current state. A fresh snapshot on every call.
    fn state(&self) -> Self::State;

    /// The joint action that produced the current state, if any.
    ///
    /// After `choose`, this is the chosen joint action. After a chance
    /// resolution, this is the chance pseudo-action that was drawn.
    fn previous_simultaneous_action(&self) -> Option<<Self::State as State>::Joint>;

    /// Whether the game has ended.
    fn is_over(&self) -> bool;

    /// Record the players' intended move without advancing.
    fn choose(&mut self, joint: <Self::State as State>::Joint);

    /// Advance one step, applying the recorded choice and any pending chance
    /// resolution. Returns the new state.
    fn run_simultaneous_action(
        &mut self,
        rng: &mut ChaCha20Rng,
    ) -> Result<Self::State, SimulatorError>;

    /// Terminal signed payoff. Only meaningful once `is_over()`.
    fn reward(&self) -> f64;

    /// Return to the initial configuration.
    fn restart(&mut self);
}

/// Errors reported by simulators
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("No joint action has been chosen")]
    NoPendingAction,
    #[error("Illegal action: {0}")]
    IllegalAction(String),
    #[error("Game is already over")]
    GameOver,
}
