//! Small fixture game shared by the unit tests.
//!
//! "Bit sum": every turn both players add a bit from `bits` to a running
//! total. Only the turn and the total are part of the state, so different
//! play orders transpose into the same node. The reward is
//! `total - turns` (positive favours max).

use engine_core::{Action, HashKey, Player, SimultaneousAction, Simulator, SimulatorError, State};
use rand_chacha::ChaCha20Rng;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bit(pub u8);

impl Action for Bit {
    fn name(&self) -> String {
        self.0.to_string()
    }

    fn key(&self) -> HashKey {
        HashKey::of(&("bit", self.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPair {
    pub max: Bit,
    pub min: Bit,
}

impl BitPair {
    pub fn new(max: u8, min: u8) -> Self {
        Self {
            max: Bit(max),
            min: Bit(min),
        }
    }
}

impl SimultaneousAction for BitPair {
    type Action = Bit;

    fn action(&self, player: Player) -> &Bit {
        match player {
            Player::Max => &self.max,
            Player::Min => &self.min,
        }
    }

    fn is_chance(&self) -> bool {
        false
    }

    fn key(&self) -> HashKey {
        HashKey::of(&("pair", self.max.0, self.min.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumState {
    pub turn: u32,
    pub turns: u32,
    pub total: u32,
    pub bits: Vec<u8>,
}

impl SumState {
    pub fn new(turn: u32, turns: u32, total: u32) -> Self {
        Self {
            turn,
            turns,
            total,
            bits: vec![0, 1],
        }
    }
}

impl State for SumState {
    type Joint = BitPair;

    fn key(&self) -> HashKey {
        HashKey::of(&("sum", self.turn, self.total))
    }

    fn possible_simultaneous_actions(&self) -> Vec<BitPair> {
        if self.is_final() {
            return Vec::new();
        }
        self.bits
            .iter()
            .flat_map(|&max| self.bits.iter().map(move |&min| BitPair::new(max, min)))
            .collect()
    }

    fn player_actions(&self, _player: Player) -> Vec<Bit> {
        if self.is_final() {
            return Vec::new();
        }
        self.bits.iter().map(|&b| Bit(b)).collect()
    }

    fn is_final(&self) -> bool {
        self.turn > self.turns
    }

    fn awaits_chance(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct SumSimulator {
    initial: SumState,
    state: SumState,
    pending: Option<BitPair>,
    previous: Option<BitPair>,
}

impl SumSimulator {
    pub fn new(turns: u32) -> Self {
        Self::with_bits(turns, vec![0, 1])
    }

    /// An empty `bits` list gives a game that never ends and offers no move.
    pub fn with_bits(turns: u32, bits: Vec<u8>) -> Self {
        let initial = SumState {
            bits,
            ..SumState::new(1, turns, 0)
        };
        Self {
            state: initial.clone(),
            initial,
            pending: None,
            previous: None,
        }
    }
}

impl Simulator for SumSimulator {
    type State = SumState;

    fn state(&self) -> SumState {
        self.state.clone()
    }

    fn previous_simultaneous_action(&self) -> Option<BitPair> {
        self.previous
    }

    fn is_over(&self) -> bool {
        self.state.is_final()
    }

    fn choose(&mut self, joint: BitPair) {
        self.pending = Some(joint);
        self.previous = Some(joint);
    }

    fn run_simultaneous_action(
        &mut self,
        _rng: &mut ChaCha20Rng,
    ) -> Result<SumState, SimulatorError> {
        if self.is_over() {
            return Err(SimulatorError::GameOver);
        }
        let joint = self.pending.take().ok_or(SimulatorError::NoPendingAction)?;
        self.state.total += (joint.max.0 + joint.min.0) as u32;
        self.state.turn += 1;
        Ok(self.state.clone())
    }

    fn reward(&self) -> f64 {
        self.state.total as f64 - self.state.turns as f64
    }

    fn restart(&mut self) {
        self.state = self.initial.clone();
        self.pending = None;
        self.previous = None;
    }
}

/// Route `tracing` output to the test harness at the configured
/// `[common] log_level`. `RUST_LOG` takes precedence. Safe to call repeatedly.
pub fn init_test_tracing() {
    let level = engine_config::load_config().common.log_level;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(&level))
        .with_test_writer()
        .try_init();
}

fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_filter_uses_configured_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(log_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter("error").max_level_hint(), Some(LevelFilter::ERROR));
    }
}
