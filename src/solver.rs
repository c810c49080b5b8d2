// Entry points used by drivers: plan a route, or pick one adversarial move.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::board::GridBoard;
use crate::config::Config;
use crate::error::SolverError;
use crate::mcts::{GameTree, MctsEngine};
use crate::search::{astar, extract_plan, ida_star, Plan};
use crate::state::AgentState;
use crate::types::{Agent, Coord, Direction, Snake};

/// Decision algorithm selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    AStar,
    IdaStar,
    Mcts,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::AStar => "astar",
            Algorithm::IdaStar => "idastar",
            Algorithm::Mcts => "mcts",
        }
    }

    /// Accepts the serialized names plus a few common spellings
    pub fn parse(s: &str) -> Result<Algorithm, String> {
        match s.to_ascii_lowercase().as_str() {
            "astar" | "a*" | "a-star" => Ok(Algorithm::AStar),
            "idastar" | "ida" | "ida*" | "ida-star" => Ok(Algorithm::IdaStar),
            "mcts" => Ok(Algorithm::Mcts),
            other => Err(format!("Unknown algorithm '{}'", other)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless facade over the planners and the tree search.
/// Holds only configuration; every call owns its own search state.
pub struct Solver {
    config: Config,
}

impl Solver {
    /// Creates a new Solver with the given configuration
    pub fn new(config: Config) -> Self {
        Solver { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Plans a route for `snake` to `fruit` on the given occupancy snapshot.
    ///
    /// `Algorithm::Mcts` has no route of its own, so it is planned with A*
    /// like the opponent snake in a versus game.
    ///
    /// # Returns
    /// * `Ok(Plan)` - ordered moves plus the per-cell lookup table
    /// * `Err(SolverError)` - `Unreachable`, `PlanningFailed` or
    ///   `InvariantViolation`
    pub fn plan_path(
        &self,
        board: &GridBoard,
        snake: &Snake,
        fruit: Coord,
        algorithm: Algorithm,
    ) -> Result<Plan, SolverError> {
        let result = match algorithm {
            Algorithm::AStar | Algorithm::Mcts => astar(board, snake, fruit)?,
            Algorithm::IdaStar => {
                let max_limit = self
                    .config
                    .search
                    .ida_max_limit(board.cols(), board.rows());
                ida_star(board, snake, fruit, max_limit)?
            }
        };

        let plan = extract_plan(&result.nodes, result.goal)?;
        debug!(
            "{} planned {} moves from {} to {} ({} expanded, {} enqueued, {} closed)",
            algorithm,
            plan.len(),
            snake.head(),
            fruit,
            result.stats.expanded,
            result.stats.enqueued,
            result.stats.closed
        );
        Ok(plan)
    }

    /// Picks the next move for `mover` with MCTS.
    ///
    /// The fruit is read from `board`. When `previous` holds the tree from the
    /// last call it is reused if its root, or one of the root's children, is
    /// the current position.
    ///
    /// # Returns
    /// * `Ok((Direction, GameTree))` - chosen move and the tree re-rooted at it
    /// * `Err(SolverError::NoLegalMove)` - the mover is boxed in
    /// * `Err(SolverError::NoFruit)` - the board has no fruit
    pub fn decide_move<R: Rng + ?Sized>(
        &self,
        board: &GridBoard,
        ai: &Snake,
        opponent: &Snake,
        mover: Agent,
        previous: Option<GameTree>,
        rng: &mut R,
    ) -> Result<(Direction, GameTree), SolverError> {
        let fruit = board.fruit().ok_or(SolverError::NoFruit)?;
        let state = AgentState::versus(
            Arc::new(board.clone()),
            ai.clone(),
            opponent.clone(),
            fruit,
            mover,
        );

        let tree = GameTree::reuse_or_new(previous, state);
        let reused = tree.root_node().visit_count;
        if reused > 0 {
            debug!("Reusing game tree with {} root visits", reused);
        }

        let engine = MctsEngine::new(&self.config.mcts, &self.config.rewards);
        let (dir, tree) = engine.decide(tree, rng)?;

        let stats = tree.stats();
        info!(
            "{:?} moves {} (subtree: {} nodes, depth {})",
            mover, dir, stats.total_nodes, stats.max_depth
        );
        Ok((dir, tree))
    }
}
