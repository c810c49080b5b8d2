//! Single-agent path planning toward the fruit.
//!
//! Both planners grow an arena of [`SearchNode`]s. A node refers to its parent
//! by arena index only, so the chain can be walked back from the goal without
//! any node owning another. The arena is dropped once the plan is extracted.

pub mod astar;
pub mod ida_star;
pub mod plan;

pub use astar::astar;
pub use ida_star::ida_star;
pub use plan::{extract_plan, Plan};

use crate::types::{Coord, Direction, Snake};

/// Arena handle of a search node
pub type NodeIndex = usize;

/// One expanded (or frontier) position of the planning snake
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Arena index of the node this one was generated from
    pub parent: Option<NodeIndex>,
    pub snake: Snake,
    /// Steps taken from the start
    pub moves: usize,
    /// moves + heuristic
    pub priority: usize,
}

impl SearchNode {
    pub fn root(snake: Snake, fruit: &Coord) -> Self {
        let h = heuristic(&snake, fruit);
        SearchNode {
            parent: None,
            snake,
            moves: 0,
            priority: h,
        }
    }

    /// Node reached by moving the snake of `parent` one step in `dir`
    pub fn child(parent_index: NodeIndex, parent: &SearchNode, dir: Direction, fruit: &Coord) -> Self {
        let snake = parent.snake.advance(dir);
        let moves = parent.moves + 1;
        let priority = moves + heuristic(&snake, fruit);
        SearchNode {
            parent: Some(parent_index),
            snake,
            moves,
            priority,
        }
    }

    pub fn head(&self) -> Coord {
        self.snake.head()
    }
}

/// Manhattan distance from the snake's head to the fruit
pub fn heuristic(snake: &Snake, fruit: &Coord) -> usize {
    snake.head().manhattan(fruit) as usize
}

/// Counters gathered while planning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped and expanded (A*) or expanded depth-first (IDA*)
    pub expanded: usize,
    /// Nodes pushed onto the frontier
    pub enqueued: usize,
    /// Size of the closed set when the search finished
    pub closed: usize,
    /// One entry per deepening pass (IDA* only)
    pub iterations: Vec<IdaIteration>,
}

/// Record of a single IDA* pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdaIteration {
    pub limit: usize,
    pub expanded: usize,
    /// Largest heuristic of any node expanded during this pass
    pub max_expanded_heuristic: Option<usize>,
}

/// Goal node plus the arena it lives in
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub nodes: Vec<SearchNode>,
    pub goal: NodeIndex,
    pub stats: SearchStats,
}

impl SearchResult {
    pub fn goal_node(&self) -> &SearchNode {
        &self.nodes[self.goal]
    }
}
