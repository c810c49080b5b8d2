// Failure taxonomy surfaced by the planners and the game-tree search.
// Every variant is recoverable by the caller: fall back to a random legal
// move, or end the round for the affected snake.

use thiserror::Error;

use crate::types::{Agent, Coord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// A* exhausted its frontier without reaching the fruit
    #[error("fruit is unreachable under the current occupancy")]
    Unreachable,

    /// IDA* ran past its iteration ceiling
    #[error("IDA* found no path within bound {limit}")]
    PlanningFailed { limit: usize },

    /// Parent chain contained a non-adjacent step
    #[error("corrupted plan: {cell} is not adjacent to its parent {parent}")]
    InvariantViolation { cell: Coord, parent: Coord },

    /// The board snapshot carries no fruit to play for
    #[error("board has no fruit")]
    NoFruit,

    /// The game-tree root has no legal first move
    #[error("no legal move for {agent:?}")]
    NoLegalMove { agent: Agent },
}
