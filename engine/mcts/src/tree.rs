//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for node storage. Nodes are stored in a
//! contiguous Vec and referenced by NodeId indices; parent and child links
//! are indices too. A registry maps state keys to nodes so that a state
//! reached through different joint-action sequences resolves to one node
//! (transposition).
//!
//! During one simulation the tree keeps a cursor (`current`) and the path of
//! nodes the cursor went through, which is what backpropagation walks.

use std::collections::HashMap;

use engine_core::{HashKey, SimultaneousAction, State};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use crate::node::{NodeId, SearchNode};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<SearchNode>,

    /// State key -> node
    index: HashMap<HashKey, NodeId>,

    /// Joint action key -> human-readable description (first one wins)
    descriptions: HashMap<HashKey, String>,

    /// Root node index (always 0)
    root: NodeId,

    /// Cursor of the running simulation
    current: NodeId,

    /// Nodes visited by the cursor since the last `back_to_root`
    path: Vec<NodeId>,
}

impl MctsTree {
    /// Create a new tree rooted at `root_state`.
    pub fn new<S: State>(root_state: &S) -> Self {
        let root = NodeId(0);
        let mut index = HashMap::new();
        index.insert(root_state.key(), root);

        Self {
            nodes: vec![SearchNode::new_root(root_state)],
            index,
            descriptions: HashMap::new(),
            root,
            current: root,
            path: vec![root],
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get the cursor node ID.
    #[inline]
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    fn allocate(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[SearchNode] {
        &self.nodes
    }

    /// Whether a node exists for `state`.
    pub fn has_state<S: State>(&self, state: &S) -> bool {
        self.index.contains_key(&state.key())
    }

    /// Node registered for `state`, if any.
    pub fn node_for<S: State>(&self, state: &S) -> Option<NodeId> {
        self.index.get(&state.key()).copied()
    }

    /// Move the cursor to the child reached through `joint`.
    ///
    /// Creates and registers a node for `state` the first time its key is
    /// seen, and reuses the registered node otherwise. The node is attached
    /// under the cursor with `joint`'s key unless a child with that key
    /// already exists. Returns the new cursor.
    pub fn go_to_child_state<J, S>(&mut self, joint: &J, state: &S) -> NodeId
    where
        J: SimultaneousAction,
        S: State,
    {
        let joint_key = joint.key();
        self.descriptions
            .entry(joint_key)
            .or_insert_with(|| joint.describe());

        let parent = self.current;
        let child_id = self.register(parent, state);

        let parent_node = self.get_mut(parent);
        if parent_node.child(joint_key).is_none() {
            parent_node.children.push((joint_key, child_id));
        }

        self.enter(child_id)
    }

    /// Move the cursor to the final state of a rollout of `steps` transitions
    /// started at the cursor, reached last through `joint`.
    ///
    /// The node is registered like any other state. It is attached under
    /// `joint` unless the rollout took more than one step and `joint` is also
    /// a legal joint action of the cursor: that child slot belongs to the
    /// state `joint` leads to from here.
    pub fn go_to_rollout_end<J, S>(&mut self, joint: &J, state: &S, steps: u32) -> NodeId
    where
        J: SimultaneousAction,
        S: State,
    {
        let joint_key = joint.key();
        let parent = self.current;
        let taken_elsewhere =
            steps > 1 && self.get(parent).legal.iter().any(|entry| entry.key == joint_key);
        if !taken_elsewhere {
            return self.go_to_child_state(joint, state);
        }

        self.descriptions
            .entry(joint_key)
            .or_insert_with(|| joint.describe());
        let child_id = self.register(parent, state);
        self.enter(child_id)
    }

    /// Node for `state`, allocated under `parent` the first time its key is seen.
    fn register<S: State>(&mut self, parent: NodeId, state: &S) -> NodeId {
        let key = state.key();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.allocate(SearchNode::new_child(parent, state));
        self.index.insert(key, id);
        id
    }

    fn enter(&mut self, id: NodeId) -> NodeId {
        self.current = id;
        self.path.push(id);
        id
    }

    /// Reset the cursor for the next simulation.
    pub fn back_to_root(&mut self) {
        self.current = self.root;
        self.path.clear();
        self.path.push(self.root);
    }

    /// Path of the running simulation with repeated nodes removed.
    fn distinct_path(&self) -> Vec<NodeId> {
        let mut seen = Vec::with_capacity(self.path.len());
        for &id in &self.path {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }

    /// Backpropagate `reward` from the cursor to the root.
    ///
    /// Every node the cursor went through gets one visit and `reward` added
    /// to its payoff, once, with no per-player negation.
    pub fn update(&mut self, reward: f64) {
        for id in self.distinct_path() {
            let node = self.get_mut(id);
            node.visit_count += 1;
            node.payoff_sum += reward;
        }
    }

    /// Credit one rollout to the cursor and its ancestors.
    pub fn add_rollout(&mut self) {
        for id in self.distinct_path() {
            self.get_mut(id).rollout_count += 1;
        }
    }

    /// The most visited root joint action with an attached child, as
    /// (key, visit_count). Ties are broken uniformly at random.
    /// Returns None if no root joint action has been tried.
    pub fn most_visited_root_joint_action(&self, rng: &mut ChaCha20Rng) -> Option<(HashKey, u32)> {
        let root = self.get(self.root);
        let candidates: Vec<(HashKey, u32)> = root
            .legal
            .iter()
            .filter_map(|entry| {
                root.child(entry.key)
                    .map(|id| (entry.key, self.get(id).visit_count))
            })
            .collect();

        let best = candidates.iter().map(|(_, visits)| *visits).max()?;
        let tied: Vec<(HashKey, u32)> = candidates
            .into_iter()
            .filter(|(_, visits)| *visits == best)
            .collect();
        tied.choose(rng).copied()
    }

    /// Description registered for a joint action key.
    pub fn describe(&self, key: HashKey) -> Option<&str> {
        self.descriptions.get(&key).map(String::as_str)
    }

    /// Joint action keys leading from the root to `id`, following parent links.
    pub fn action_path(&self, id: NodeId) -> Vec<HashKey> {
        let mut path = Vec::new();
        let mut current = id;

        while current.is_some() {
            let parent = self.get(current).parent;
            if parent.is_none() {
                break;
            }
            if let Some((key, _)) = self
                .get(parent)
                .children
                .iter()
                .find(|(_, child)| *child == current)
            {
                path.push(*key);
            }
            current = parent;
        }

        path.reverse();
        path
    }

    /// Descriptions of `action_path(id)`.
    pub fn action_path_descriptions(&self, id: NodeId) -> Vec<String> {
        self.action_path(id)
            .into_iter()
            .map(|key| {
                self.describe(key)
                    .map(str::to_owned)
                    .unwrap_or_else(|| key.to_string())
            })
            .collect()
    }

    /// Terminal nodes with their IDs, in allocation order.
    pub fn terminal_nodes(&self) -> impl Iterator<Item = (NodeId, &SearchNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_final)
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Children owned by `id`: those whose parent link points back at it.
    /// Following only owned children walks a proper tree even across
    /// transpositions.
    fn owned_children(&self, id: NodeId) -> impl Iterator<Item = (HashKey, NodeId)> + '_ {
        self.get(id)
            .children
            .iter()
            .filter(move |(_, child)| self.get(*child).parent == id)
            .copied()
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            terminal_nodes: self.terminal_nodes().count(),
            root_visits: root.visit_count,
            root_rollouts: root.rollout_count,
            root_payoff: root.mean_payoff(),
            max_depth: self.compute_max_depth(self.root),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId) -> u32 {
        let mut max_depth = 0;
        let mut stack = vec![(node_id, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.owned_children(id).map(|(_, child)| (child, depth + 1)));
        }
        max_depth
    }

    /// Recursive view of the tree for external diagnostics or export.
    pub fn inspect(&self) -> NodeView {
        self.view(self.root, None)
    }

    fn view(&self, id: NodeId, via: Option<HashKey>) -> NodeView {
        let node = self.get(id);
        NodeView {
            action: via.map(|key| {
                self.describe(key)
                    .map(str::to_owned)
                    .unwrap_or_else(|| key.to_string())
            }),
            state_key: node.state_key,
            visits: node.visit_count,
            rollouts: node.rollout_count,
            payoff: node.payoff_sum,
            is_final: node.is_final,
            awaits_chance: node.awaits_chance,
            children: self
                .owned_children(id)
                .map(|(key, child)| self.view(child, Some(key)))
                .collect(),
        }
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub terminal_nodes: usize,
    pub root_visits: u32,
    pub root_rollouts: u32,
    pub root_payoff: f64,
    pub max_depth: u32,
}

/// Serializable snapshot of one node and everything it owns.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    /// Description of the joint action leading here (None for the root)
    pub action: Option<String>,
    pub state_key: HashKey,
    pub visits: u32,
    pub rollouts: u32,
    pub payoff: f64,
    pub is_final: bool,
    pub awaits_chance: bool,
    pub children: Vec<NodeView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{BitPair, SumState};
    use rand::SeedableRng;

    #[test]
    fn test_new_tree() {
        let state = SumState::new(1, 2, 0);
        let tree = MctsTree::new(&state);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));
        assert_eq!(tree.current(), tree.root());
        assert!(tree.has_state(&state));
        assert_eq!(tree.node_for(&state), Some(NodeId(0)));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.state_key, state.key());
    }

    #[test]
    fn test_go_to_child_state() {
        let mut tree = MctsTree::new(&SumState::new(1, 2, 0));
        let child_state = SumState::new(2, 2, 1);

        let child_id = tree.go_to_child_state(&BitPair::new(1, 0), &child_state);

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));
        assert_eq!(tree.current(), child_id);
        assert!(tree.has_state(&child_state));

        let root = tree.get(tree.root());
        assert_eq!(root.children, vec![(BitPair::new(1, 0).key(), child_id)]);
        assert_eq!(tree.get(child_id).parent, tree.root());
        assert_eq!(tree.describe(BitPair::new(1, 0).key()), Some("1 / 0"));
    }

    #[test]
    fn test_transposition_reuses_node() {
        let mut tree = MctsTree::new(&SumState::new(1, 2, 0));
        let merged = SumState::new(2, 2, 1);

        let first = tree.go_to_child_state(&BitPair::new(1, 0), &merged);
        tree.back_to_root();
        let second = tree.go_to_child_state(&BitPair::new(0, 1), &merged);

        assert_eq!(first, second);
        assert_eq!(tree.len(), 2);
        let root = tree.get(tree.root());
        assert_eq!(root.child(BitPair::new(1, 0).key()), Some(first));
        assert_eq!(root.child(BitPair::new(0, 1).key()), Some(first));
        // The first parent to attach it stays the parent
        assert_eq!(tree.get(first).parent, tree.root());
    }

    #[test]
    fn test_rollout_end_attachment() {
        let mut tree = MctsTree::new(&SumState::new(1, 3, 0));
        let expanded = tree.go_to_child_state(&BitPair::new(1, 0), &SumState::new(2, 3, 1));

        // One step: the final state is a real successor
        let next = tree.go_to_rollout_end(&BitPair::new(1, 1), &SumState::new(3, 3, 3), 1);
        assert_eq!(tree.get(expanded).child(BitPair::new(1, 1).key()), Some(next));

        // Several steps ending in a joint action also legal at the cursor:
        // registered and entered, but not attached
        tree.back_to_root();
        tree.go_to_child_state(&BitPair::new(1, 0), &SumState::new(2, 3, 1));
        let end = tree.go_to_rollout_end(&BitPair::new(0, 0), &SumState::new(4, 3, 2), 2);
        assert_eq!(tree.current(), end);
        assert!(tree.has_state(&SumState::new(4, 3, 2)));
        assert_eq!(tree.get(end).parent, expanded);
        assert!(tree.get(expanded).child(BitPair::new(0, 0).key()).is_none());

        tree.update(2.0);
        assert_eq!(tree.get(end).visit_count, 1);
        assert_eq!(tree.get(expanded).visit_count, 1);
        assert_eq!(tree.get(tree.root()).visit_count, 1);
    }

    #[test]
    fn test_update_walks_path() {
        let mut tree = MctsTree::new(&SumState::new(1, 2, 0));
        let child = tree.go_to_child_state(&BitPair::new(1, 1), &SumState::new(2, 2, 2));
        let leaf = tree.go_to_child_state(&BitPair::new(1, 0), &SumState::new(3, 2, 3));

        tree.update(1.5);
        tree.add_rollout();

        for id in [tree.root(), child, leaf] {
            assert_eq!(tree.get(id).visit_count, 1);
            assert_eq!(tree.get(id).rollout_count, 1);
            // Payoff is not negated along the way
            assert!((tree.get(id).payoff_sum - 1.5).abs() < 1e-12);
        }

        tree.back_to_root();
        tree.go_to_child_state(&BitPair::new(1, 1), &SumState::new(2, 2, 2));
        tree.update(-0.5);

        assert_eq!(tree.get(tree.root()).visit_count, 2);
        assert_eq!(tree.get(child).visit_count, 2);
        assert_eq!(tree.get(leaf).visit_count, 1);
        assert!((tree.get(child).mean_payoff() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_update_counts_repeated_node_once() {
        let mut tree = MctsTree::new(&SumState::new(1, 2, 0));
        let child = tree.go_to_child_state(&BitPair::new(0, 0), &SumState::new(2, 2, 0));
        // Loop back into the same state
        tree.go_to_child_state(&BitPair::new(0, 0), &SumState::new(2, 2, 0));

        tree.update(1.0);
        assert_eq!(tree.get(child).visit_count, 1);
        assert_eq!(tree.get(tree.root()).visit_count, 1);
    }

    /// Same key as the wrapped pair, custom description.
    #[derive(Debug, Clone)]
    struct Labeled(BitPair, &'static str);

    impl SimultaneousAction for Labeled {
        type Action = crate::test_util::Bit;

        fn action(&self, player: engine_core::Player) -> &Self::Action {
            self.0.action(player)
        }

        fn is_chance(&self) -> bool {
            false
        }

        fn key(&self) -> HashKey {
            self.0.key()
        }

        fn describe(&self) -> String {
            self.1.to_string()
        }
    }

    #[test]
    fn test_first_description_wins() {
        let mut tree = MctsTree::new(&SumState::new(1, 2, 0));
        let pair = BitPair::new(1, 1);

        tree.go_to_child_state(&Labeled(pair, "first"), &SumState::new(2, 2, 2));
        tree.back_to_root();
        tree.go_to_child_state(&Labeled(pair, "second"), &SumState::new(2, 2, 2));

        assert_eq!(tree.describe(pair.key()), Some("first"));
        assert_eq!(tree.describe(HashKey(8)), None);
    }

    #[test]
    fn test_most_visited_root_joint_action() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut tree = MctsTree::new(&SumState::new(1, 2, 0));
        assert!(tree.most_visited_root_joint_action(&mut rng).is_none());

        let a = tree.go_to_child_state(&BitPair::new(0, 0), &SumState::new(2, 2, 0));
        tree.back_to_root();
        let b = tree.go_to_child_state(&BitPair::new(1, 1), &SumState::new(2, 2, 2));

        tree.get_mut(a).visit_count = 30;
        tree.get_mut(b).visit_count = 70;
        assert_eq!(
            tree.most_visited_root_joint_action(&mut rng),
            Some((BitPair::new(1, 1).key(), 70))
        );

        // Ties are broken among the tied set only
        tree.get_mut(a).visit_count = 70;
        let tied = [BitPair::new(0, 0).key(), BitPair::new(1, 1).key()];
        let mut seen = Vec::new();
        for _ in 0..64 {
            let (key, visits) = tree.most_visited_root_joint_action(&mut rng).unwrap();
            assert_eq!(visits, 70);
            assert!(tied.contains(&key));
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_action_path() {
        let mut tree = MctsTree::new(&SumState::new(1, 2, 0));
        tree.go_to_child_state(&BitPair::new(1, 0), &SumState::new(2, 2, 1));
        let leaf = tree.go_to_child_state(&BitPair::new(0, 1), &SumState::new(3, 2, 2));

        assert_eq!(
            tree.action_path(leaf),
            vec![BitPair::new(1, 0).key(), BitPair::new(0, 1).key()]
        );
        assert_eq!(tree.action_path_descriptions(leaf), vec!["1 / 0", "0 / 1"]);
        assert!(tree.action_path(tree.root()).is_empty());
    }

    #[test]
    fn test_tree_stats_and_inspect() {
        let mut tree = MctsTree::new(&SumState::new(1, 1, 0));
        tree.go_to_child_state(&BitPair::new(1, 1), &SumState::new(2, 1, 2));
        tree.update(1.0);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 2);
        assert_eq!(stats.terminal_nodes, 1);
        assert_eq!(stats.root_visits, 1);
        assert_eq!(stats.max_depth, 1);

        let view = tree.inspect();
        assert!(view.action.is_none());
        assert_eq!(view.visits, 1);
        assert_eq!(view.children.len(), 1);
        assert_eq!(view.children[0].action.as_deref(), Some("1 / 1"));
        assert!(view.children[0].is_final);
    }
}
