//! The two sides of a simultaneous-move game.

use serde::Serialize;
use std::fmt;

/// A player in a two-player game.
///
/// Payoffs are signed globally: a positive reward favours `Max`,
/// a negative one favours `Min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Player {
    Max,
    Min,
}

impl Player {
    /// Both players, in a fixed order.
    pub const BOTH: [Player; 2] = [Player::Max, Player::Min];

    /// Direction in which this player wants the global payoff to move.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Player::Max => 1.0,
            Player::Min => -1.0,
        }
    }

    /// The other player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Max => Player::Min,
            Player::Min => Player::Max,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Max => f.write_str("max"),
            Player::Min => f.write_str("min"),
        }
    }
}
