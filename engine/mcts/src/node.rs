//! MCTS tree node representation.
//!
//! Each node represents one distinct game state (by state key) reached by the
//! search. Nodes store visit statistics and a snapshot of the legal joint
//! actions of their state, which is what per-player marginal statistics are
//! computed over.

use engine_core::{HashKey, Player, SimultaneousAction, State};
use serde::Serialize;

use crate::search::SearchError;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// Keys of one legal joint action: the joint key and each player's component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointEntry {
    pub key: HashKey,
    pub max: HashKey,
    pub min: HashKey,
    pub is_chance: bool,
}

impl JointEntry {
    pub fn from_joint<J: SimultaneousAction>(joint: &J) -> Self {
        use engine_core::Action;

        Self {
            key: joint.key(),
            max: joint.action(Player::Max).key(),
            min: joint.action(Player::Min).key(),
            is_chance: joint.is_chance(),
        }
    }

    /// Component key chosen by `player`.
    #[inline]
    pub fn component(&self, player: Player) -> HashKey {
        match player {
            Player::Max => self.max,
            Player::Min => self.min,
        }
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Parent node index (NONE for root). A transposed node keeps the
    /// parent that first attached it.
    pub parent: NodeId,

    /// Identity of the state this node stands for
    pub state_key: HashKey,

    /// Whether the state is terminal
    pub is_final: bool,

    /// Whether the state waits for a chance resolution
    pub awaits_chance: bool,

    /// Legal joint actions of the state, in the order the state listed them
    pub legal: Vec<JointEntry>,

    /// Children: (joint action key, NodeId) pairs, in attachment order
    pub children: Vec<(HashKey, NodeId)>,

    /// Number of completed trajectories that passed through this node
    pub visit_count: u32,

    /// Sum of terminal rewards of those trajectories.
    /// mean payoff = payoff_sum / visit_count
    pub payoff_sum: f64,

    /// Number of random playouts started at this node or below
    pub rollout_count: u32,
}

impl SearchNode {
    /// Create a new root node.
    pub fn new_root<S: State>(state: &S) -> Self {
        Self::new_child(NodeId::NONE, state)
    }

    /// Create a new child node for `state`.
    pub fn new_child<S: State>(parent: NodeId, state: &S) -> Self {
        Self {
            parent,
            state_key: state.key(),
            is_final: state.is_final(),
            awaits_chance: state.awaits_chance(),
            legal: state
                .possible_simultaneous_actions()
                .iter()
                .map(JointEntry::from_joint)
                .collect(),
            children: Vec::new(),
            visit_count: 0,
            payoff_sum: 0.0,
            rollout_count: 0,
        }
    }

    /// Mean payoff = payoff_sum / visit_count.
    /// Returns 0.0 if never visited.
    #[inline]
    pub fn mean_payoff(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.payoff_sum / self.visit_count as f64
        }
    }

    /// Check if this is a leaf node (nothing attached below it yet).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Child reached through the joint action `key`, if attached.
    #[inline]
    pub fn child(&self, key: HashKey) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, id)| *id)
    }

    fn child_visits(&self, arena: &[SearchNode], key: HashKey) -> u32 {
        self.child(key)
            .map(|id| arena[id.0 as usize].visit_count)
            .unwrap_or(0)
    }

    fn child_payoff(&self, arena: &[SearchNode], key: HashKey) -> f64 {
        self.child(key)
            .map(|id| arena[id.0 as usize].payoff_sum)
            .unwrap_or(0.0)
    }

    /// Legal joint actions with no child yet, or whose child was never visited.
    pub fn unplayed_joint_actions(&self, arena: &[SearchNode]) -> Vec<HashKey> {
        self.legal
            .iter()
            .filter(|entry| self.child_visits(arena, entry.key) == 0)
            .map(|entry| entry.key)
            .collect()
    }

    /// Sum of child visits over every legal joint action whose `player`
    /// component is `action`.
    pub fn marginal_visits(&self, arena: &[SearchNode], player: Player, action: HashKey) -> u32 {
        self.legal
            .iter()
            .filter(|entry| entry.component(player) == action)
            .map(|entry| self.child_visits(arena, entry.key))
            .sum()
    }

    /// Sum of child payoff over every legal joint action whose `player`
    /// component is `action`.
    pub fn marginal_payoff(&self, arena: &[SearchNode], player: Player, action: HashKey) -> f64 {
        self.legal
            .iter()
            .filter(|entry| entry.component(player) == action)
            .map(|entry| self.child_payoff(arena, entry.key))
            .sum()
    }

    /// UCT value of `action` for `player`, from marginal statistics:
    ///
    /// `sign(player) * payoff / visits + c * sqrt(log10(node_visits) / visits)`
    ///
    /// Fails if either the action or this node has never been visited.
    pub fn marginal_uct(
        &self,
        arena: &[SearchNode],
        player: Player,
        action: HashKey,
        exploration: f64,
    ) -> Result<f64, SearchError> {
        let visits = self.marginal_visits(arena, player, action);
        if visits == 0 || self.visit_count == 0 {
            return Err(SearchError::UnvisitedAction {
                player,
                action,
                node_visits: self.visit_count,
            });
        }

        let visits = visits as f64;
        let mean = self.marginal_payoff(arena, player, action) / visits;
        let bonus = exploration * ((self.visit_count as f64).log10() / visits).sqrt();
        Ok(player.sign() * mean + bonus)
    }

    /// The unique legal joint action made of `max` and `min`.
    pub fn joint_action_for(&self, max: HashKey, min: HashKey) -> Result<HashKey, SearchError> {
        self.legal
            .iter()
            .find(|entry| entry.max == max && entry.min == min)
            .map(|entry| entry.key)
            .ok_or(SearchError::UnmatchedJointAction { max, min })
    }
}
