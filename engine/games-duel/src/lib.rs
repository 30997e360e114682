//! Card duel reference game for the search engine
//!
//! Both players hold a hand of numbered cards. Every turn each player plays
//! one card at the same time; the turn scores
//! `weight * (max card - min card)` where the weight falls by one every turn
//! (`max_turns` on the first turn, `1` on the last), so early plays matter
//! most. With the bonus die enabled, a chance event adds 0 or 1 to the turn
//! score after both players have committed their cards.
//!
//! The game ends when either hand is empty or the turn counter exceeds
//! `max_turns`. The reward is the accumulated score, positive for `Max`.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{Simulator, State};
//! use games_duel::{DuelConfig, DuelSimulator};
//!
//! let config = DuelConfig::new(vec![4, 6, 3, 2, 1], vec![3, 5, 2, 6, 1, 8, 9], 2);
//! let sim = DuelSimulator::new(config);
//! assert_eq!(sim.state().possible_simultaneous_actions().len(), 35);
//! ```

use engine_core::{Action, HashKey, Player, SimultaneousAction, Simulator, SimulatorError, State};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

/// Highest face of the bonus die (faces are `0..=BONUS_MAX`).
pub const BONUS_MAX: u32 = 1;

/// A card played by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card(pub u32);

impl Action for Card {
    fn name(&self) -> String {
        self.0.to_string()
    }

    fn key(&self) -> HashKey {
        HashKey::of(&("card", self.0))
    }
}

/// A joint play: one card per player, plus the die roll once it is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelMove {
    pub max: Card,
    pub min: Card,
    /// `Some` when this move carries a resolved bonus die.
    pub bonus: Option<u32>,
}

impl DuelMove {
    pub fn new(max: u32, min: u32) -> Self {
        Self {
            max: Card(max),
            min: Card(min),
            bonus: None,
        }
    }

    fn with_bonus(self, bonus: u32) -> Self {
        Self {
            bonus: Some(bonus),
            ..self
        }
    }
}

impl SimultaneousAction for DuelMove {
    type Action = Card;

    fn action(&self, player: Player) -> &Card {
        match player {
            Player::Max => &self.max,
            Player::Min => &self.min,
        }
    }

    fn is_chance(&self) -> bool {
        self.bonus.is_some()
    }

    fn key(&self) -> HashKey {
        HashKey::of(&("duel", self.max.0, self.min.0, self.bonus))
    }

    fn describe(&self) -> String {
        let base = format!("max draws {} / min draws {}", self.max.0, self.min.0);
        match self.bonus {
            Some(bonus) => format!("{base} (+{bonus} bonus)"),
            None => base,
        }
    }
}

/// Game parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelConfig {
    pub max_hand: Vec<u32>,
    pub min_hand: Vec<u32>,
    pub max_turns: u32,
    /// Roll a bonus die after every play.
    pub bonus_die: bool,
}

impl DuelConfig {
    pub fn new(max_hand: Vec<u32>, min_hand: Vec<u32>, max_turns: u32) -> Self {
        Self {
            max_hand,
            min_hand,
            max_turns,
            bonus_die: false,
        }
    }

    /// Builder pattern: enable the bonus die.
    pub fn with_bonus_die(mut self) -> Self {
        self.bonus_die = true;
        self
    }
}

/// Duel state snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelState {
    max_hand: Vec<u32>,
    min_hand: Vec<u32>,
    /// Current turn, starting at 1
    turn: u32,
    max_turns: u32,
    score: i64,
    bonus_die: bool,
    /// Cards committed by (max, min) but not yet played
    pending: Option<(u32, u32)>,
}

impl DuelState {
    fn new(config: &DuelConfig) -> Self {
        Self {
            max_hand: config.max_hand.clone(),
            min_hand: config.min_hand.clone(),
            turn: 1,
            max_turns: config.max_turns,
            score: 0,
            bonus_die: config.bonus_die,
            pending: None,
        }
    }

    pub fn hand(&self, player: Player) -> &[u32] {
        match player {
            Player::Max => &self.max_hand,
            Player::Min => &self.min_hand,
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Score weight of the current turn.
    fn weight(&self) -> i64 {
        (self.max_turns + 1).saturating_sub(self.turn) as i64
    }

    /// Play both cards and add the turn score.
    fn play(&mut self, max: u32, min: u32, bonus: u32) -> Result<(), SimulatorError> {
        let max_idx = self
            .max_hand
            .iter()
            .position(|&c| c == max)
            .ok_or_else(|| SimulatorError::IllegalAction(format!("max does not hold {max}")))?;
        let min_idx = self
            .min_hand
            .iter()
            .position(|&c| c == min)
            .ok_or_else(|| SimulatorError::IllegalAction(format!("min does not hold {min}")))?;

        self.max_hand.remove(max_idx);
        self.min_hand.remove(min_idx);
        self.score += self.weight() * (max as i64 - min as i64) + bonus as i64;
        self.turn += 1;
        Ok(())
    }
}

impl State for DuelState {
    type Joint = DuelMove;

    fn key(&self) -> HashKey {
        let pending = if self.bonus_die { self.pending } else { None };
        HashKey::of(&(
            &self.max_hand,
            &self.min_hand,
            self.turn,
            self.score,
            pending,
        ))
    }

    fn possible_simultaneous_actions(&self) -> Vec<DuelMove> {
        if self.is_final() {
            return Vec::new();
        }

        if let (true, Some((max, min))) = (self.awaits_chance(), self.pending) {
            return (0..=BONUS_MAX)
                .map(|bonus| DuelMove::new(max, min).with_bonus(bonus))
                .collect();
        }

        self.max_hand
            .iter()
            .flat_map(|&max| self.min_hand.iter().map(move |&min| DuelMove::new(max, min)))
            .collect()
    }

    fn player_actions(&self, player: Player) -> Vec<Card> {
        if self.is_final() {
            return Vec::new();
        }
        self.hand(player).iter().map(|&c| Card(c)).collect()
    }

    fn is_final(&self) -> bool {
        self.max_hand.is_empty() || self.min_hand.is_empty() || self.turn > self.max_turns
    }

    fn awaits_chance(&self) -> bool {
        self.bonus_die && self.pending.is_some()
    }
}

/// Simulator for the card duel.
#[derive(Debug, Clone)]
pub struct DuelSimulator {
    config: DuelConfig,
    state: DuelState,
    previous: Option<DuelMove>,
}

impl DuelSimulator {
    pub fn new(config: DuelConfig) -> Self {
        let state = DuelState::new(&config);
        Self {
            config,
            state,
            previous: None,
        }
    }

    pub fn config(&self) -> &DuelConfig {
        &self.config
    }
}

impl Simulator for DuelSimulator {
    type State = DuelState;

    fn state(&self) -> DuelState {
        self.state.clone()
    }

    fn previous_simultaneous_action(&self) -> Option<DuelMove> {
        self.previous
    }

    fn is_over(&self) -> bool {
        self.state.is_final()
    }

    fn choose(&mut self, joint: DuelMove) {
        self.state.pending = Some((joint.max.0, joint.min.0));
        self.previous = Some(joint);
    }

    fn run_simultaneous_action(
        &mut self,
        rng: &mut ChaCha20Rng,
    ) -> Result<DuelState, SimulatorError> {
        if self.is_over() {
            return Err(SimulatorError::GameOver);
        }
        let (max, min) = self
            .state
            .pending
            .take()
            .ok_or(SimulatorError::NoPendingAction)?;

        let bonus = if self.config.bonus_die {
            let bonus = rng.gen_range(0..=BONUS_MAX);
            self.previous = Some(DuelMove::new(max, min).with_bonus(bonus));
            bonus
        } else {
            self.previous = Some(DuelMove::new(max, min));
            0
        };

        self.state.play(max, min, bonus)?;
        Ok(self.state.clone())
    }

    fn reward(&self) -> f64 {
        self.state.score as f64
    }

    fn restart(&mut self) {
        self.state = DuelState::new(&self.config);
        self.previous = None;
    }
}
