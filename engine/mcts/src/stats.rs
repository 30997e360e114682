//! Outcome statistics over the terminal nodes of a tree.
//!
//! Every visited terminal node is one observed outcome, weighted by its visit
//! count. The view is computed on demand and never cached, so it always
//! reflects the tree it was built from.

use engine_core::HashKey;
use serde::Serialize;

use crate::node::NodeId;
use crate::tree::MctsTree;

/// How often one payoff value was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeFrequency {
    pub payoff: f64,
    pub visits: u32,
}

/// Visit-weighted payoff distribution over terminal nodes.
#[derive(Debug, Clone, Serialize)]
pub struct PayoffStatistics {
    /// Terminal nodes with at least one visit
    pub terminal_nodes: usize,
    /// Sum of their visits
    pub total_visits: u32,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub variance: f64,
    pub std_dev: f64,
    /// Most visited terminal node (first allocated wins a tie)
    pub mode_node: NodeId,
    pub mode_payoff: f64,
    pub mode_visits: u32,
    /// Joint actions from the root to the mode node
    pub mode_path: Vec<HashKey>,
    pub mode_path_descriptions: Vec<String>,
    /// Distinct payoffs in ascending order with their summed visits
    pub frequencies: Vec<OutcomeFrequency>,
}

impl PayoffStatistics {
    /// Compute statistics for `tree`. Returns None if no terminal node has
    /// been visited yet.
    pub fn from_tree(tree: &MctsTree) -> Option<Self> {
        let outcomes: Vec<(NodeId, f64, u32)> = tree
            .terminal_nodes()
            .filter(|(_, node)| node.visit_count > 0)
            .map(|(id, node)| (id, node.mean_payoff(), node.visit_count))
            .collect();

        if outcomes.is_empty() {
            return None;
        }

        let total_visits: u32 = outcomes.iter().map(|(_, _, v)| *v).sum();
        let weight = total_visits as f64;

        let average = outcomes
            .iter()
            .map(|(_, payoff, visits)| payoff * *visits as f64)
            .sum::<f64>()
            / weight;
        let variance = outcomes
            .iter()
            .map(|(_, payoff, visits)| (payoff - average).powi(2) * *visits as f64)
            .sum::<f64>()
            / weight;

        let min = outcomes
            .iter()
            .map(|(_, payoff, _)| *payoff)
            .fold(f64::INFINITY, f64::min);
        let max = outcomes
            .iter()
            .map(|(_, payoff, _)| *payoff)
            .fold(f64::NEG_INFINITY, f64::max);

        // max_by_key keeps the last maximum, so scan for the first one
        let mut mode = outcomes[0];
        for &outcome in &outcomes[1..] {
            if outcome.2 > mode.2 {
                mode = outcome;
            }
        }
        let (mode_node, mode_payoff, mode_visits) = mode;

        Some(Self {
            terminal_nodes: outcomes.len(),
            total_visits,
            min,
            max,
            average,
            variance,
            std_dev: variance.sqrt(),
            mode_node,
            mode_payoff,
            mode_visits,
            mode_path: tree.action_path(mode_node),
            mode_path_descriptions: tree.action_path_descriptions(mode_node),
            frequencies: frequencies(&outcomes),
        })
    }
}

fn frequencies(outcomes: &[(NodeId, f64, u32)]) -> Vec<OutcomeFrequency> {
    let mut sorted: Vec<(f64, u32)> = outcomes.iter().map(|(_, p, v)| (*p, *v)).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out: Vec<OutcomeFrequency> = Vec::new();
    for (payoff, visits) in sorted {
        match out.last_mut() {
            Some(last) if last.payoff == payoff => last.visits += visits,
            _ => out.push(OutcomeFrequency { payoff, visits }),
        }
    }
    out
}
