//! MCTS search loop.
//!
//! Each iteration runs the four classic phases:
//! 1. Selection: descend from the root by UCB1 until a node without children
//! 2. Expansion: give that node one child per legal move of its mover
//! 3. Simulation: random playout from one new child (or the node itself)
//! 4. Backpropagation: update visits and scores up to the root
//!
//! A wall-clock budget, when set, is only checked between iterations so the
//! tree is never left half-updated.

use log::{debug, info};
use rand::Rng;
use std::time::{Duration, Instant};

use super::reward::terminal_reward;
use super::tree::{GameTree, NodeId};
use crate::config::{MctsConfig, RewardsConfig};
use crate::error::SolverError;
use crate::profile;
use crate::state::{AgentState, GameStatus};
use crate::types::Direction;

/// What a finished search did
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary {
    pub iterations: u32,
    pub elapsed: Duration,
    pub tree_nodes: usize,
}

pub struct MctsEngine<'a> {
    config: &'a MctsConfig,
    rewards: &'a RewardsConfig,
}

impl<'a> MctsEngine<'a> {
    pub fn new(config: &'a MctsConfig, rewards: &'a RewardsConfig) -> Self {
        MctsEngine { config, rewards }
    }

    /// Runs the iteration budget on `tree`, stopping early only between
    /// iterations when the time budget is spent
    pub fn search<R: Rng + ?Sized>(&self, tree: &mut GameTree, rng: &mut R) -> SearchSummary {
        let start = Instant::now();
        let deadline = match self.config.time_budget_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        let mut iterations = 0;
        while iterations < self.config.iterations {
            if let Some(budget) = deadline {
                if start.elapsed() >= budget {
                    debug!("MCTS time budget reached after {} iterations", iterations);
                    break;
                }
            }
            self.iterate(tree, rng);
            iterations += 1;
        }

        SearchSummary {
            iterations,
            elapsed: start.elapsed(),
            tree_nodes: tree.len(),
        }
    }

    /// One full select, expand, simulate, backpropagate round
    pub fn iterate<R: Rng + ?Sized>(&self, tree: &mut GameTree, rng: &mut R) {
        let leaf = self.select(tree);
        self.expand(tree, leaf);

        let explore = match tree.children(leaf) {
            [] => leaf,
            children => children[rng.random_range(0..children.len())],
        };

        let result = self.playout(&tree.get(explore).state, rng);
        profile!("mcts_backprop", {
            tree.backpropagate(explore, result);
        });
    }

    /// Descends by UCB1, always maximising
    pub fn select(&self, tree: &GameTree) -> NodeId {
        profile!("mcts_select", {
            let mut current = tree.root();
            while let Some(child) = tree.select_child(current, self.config.exploration_constant) {
                current = child;
            }
            current
        })
    }

    /// Adds one child per legal move of the node's mover. Does nothing for a
    /// terminal node or one that already has children.
    pub fn expand(&self, tree: &mut GameTree, id: NodeId) {
        profile!("mcts_expand", {
            let node = tree.get(id);
            if !node.is_leaf() || node.state.status().is_terminal() {
                return;
            }
            let successors = node.state.successors();
            for (dir, state) in successors {
                tree.add_child(id, dir, state);
            }
        })
    }

    /// Random playout until a terminal status. A mover without any legal
    /// move crashes; hitting the ply cap is scored as 0.
    pub fn playout<R: Rng + ?Sized>(&self, start: &AgentState, rng: &mut R) -> f64 {
        profile!("mcts_playout", {
            let mut state = start.clone();
            let mut plies = 0;
            loop {
                let status = state.status();
                if status.is_terminal() {
                    return terminal_reward(status, self.rewards);
                }
                if plies >= self.config.max_playout_plies {
                    return 0.0;
                }
                let moves = state.legal_moves();
                if moves.is_empty() {
                    return terminal_reward(GameStatus::Crashed(state.mover()), self.rewards);
                }
                let dir = moves[rng.random_range(0..moves.len())];
                state = state.apply(dir);
                plies += 1;
            }
        })
    }

    /// Searches, picks the robust child of the root and re-roots the tree
    /// there so the statistics carry over to the next call.
    ///
    /// # Returns
    /// * `Ok((Direction, GameTree))` - chosen move and the re-rooted tree
    /// * `Err(SolverError::NoLegalMove)` - the root never gained a child
    pub fn decide<R: Rng + ?Sized>(
        &self,
        mut tree: GameTree,
        rng: &mut R,
    ) -> Result<(Direction, GameTree), SolverError> {
        let summary = self.search(&mut tree, rng);
        let mover = tree.root_node().mover();

        let best = tree
            .best_child()
            .ok_or(SolverError::NoLegalMove { agent: mover })?;
        let chosen = tree.get(best);
        let dir = chosen
            .action
            .ok_or(SolverError::NoLegalMove { agent: mover })?;

        info!(
            "MCTS chose {} for {:?} ({} visits, mean {:.3}) after {} iterations, {} nodes, {}ms",
            dir,
            mover,
            chosen.visit_count,
            chosen.mean_score(),
            summary.iterations,
            summary.tree_nodes,
            summary.elapsed.as_millis()
        );

        Ok((dir, tree.reroot(best)))
    }
}
