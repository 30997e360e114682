//! Core contracts between simultaneous-move games and the search engine
//!
//! This crate provides the abstractions the search consumes:
//! - `Player`: the two sides of a game and their payoff sign
//! - `HashKey`: stable identity used for actions and states
//! - `Action`, `SimultaneousAction`, `State`: hashable game vocabulary
//! - `Simulator`: forward-only game runner driven by the search

pub mod key;
pub mod player;
pub mod typed;

// Re-export main types for convenience
pub use key::HashKey;
pub use player::Player;
pub use typed::{Action, JointOf, SimultaneousAction, Simulator, SimulatorError, State};
