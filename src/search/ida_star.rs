// Iterative-deepening search toward the fruit.
//
// Each pass runs a fixed-order depth-first search that refuses to expand any
// node whose heuristic is at least `limit - 1`. The limit starts at the
// start node's heuristic and grows by one per pass. Every pass gets a fresh
// visited grid: a cell cut off at a shallow limit may be reachable deeper.

use log::debug;

use super::{heuristic, IdaIteration, NodeIndex, SearchNode, SearchResult, SearchStats};
use crate::board::{GridBoard, VisitedGrid};
use crate::error::SolverError;
use crate::profile;
use crate::types::{Coord, Direction, Snake};

/// State of one deepening pass
struct Pass<'a> {
    board: &'a GridBoard,
    fruit: Coord,
    limit: usize,
    nodes: Vec<SearchNode>,
    visited: VisitedGrid,
    iteration: IdaIteration,
    enqueued: usize,
}

impl<'a> Pass<'a> {
    fn new(board: &'a GridBoard, start: &Snake, fruit: Coord, limit: usize) -> Self {
        Pass {
            board,
            fruit,
            limit,
            nodes: vec![SearchNode::root(start.clone(), &fruit)],
            visited: VisitedGrid::for_board(board),
            iteration: IdaIteration {
                limit,
                expanded: 0,
                max_expanded_heuristic: None,
            },
            enqueued: 1,
        }
    }

    /// Depth-first step. Returns the first goal found in E, W, N, S order.
    fn step(&mut self, index: NodeIndex) -> Option<NodeIndex> {
        let head = self.nodes[index].head();
        if head == self.fruit {
            return Some(index);
        }

        let h = heuristic(&self.nodes[index].snake, &self.fruit);
        if h + 1 >= self.limit {
            return None;
        }
        if !self.visited.mark(&head) {
            return None;
        }

        self.iteration.expanded += 1;
        self.iteration.max_expanded_heuristic =
            Some(self.iteration.max_expanded_heuristic.map_or(h, |m| m.max(h)));

        for dir in Direction::all() {
            let next = dir.apply(&head);
            if !self.board.in_bounds(&next)
                || self.board.is_blocked(&next)
                || self.visited.is_visited(&next)
            {
                continue;
            }

            let child = SearchNode::child(index, &self.nodes[index], dir, &self.fruit);
            let child_index = self.nodes.len();
            self.nodes.push(child);
            self.enqueued += 1;

            if let Some(goal) = self.step(child_index) {
                return Some(goal);
            }
        }
        None
    }
}

/// Runs IDA* from `start` to `fruit`, deepening up to `max_limit` inclusive.
///
/// # Returns
/// * `Ok(SearchResult)` - goal node plus one [`IdaIteration`] per pass
/// * `Err(SolverError::PlanningFailed)` - no pass up to `max_limit` succeeded
pub fn ida_star(
    board: &GridBoard,
    start: &Snake,
    fruit: Coord,
    max_limit: usize,
) -> Result<SearchResult, SolverError> {
    profile!("ida_star", {
        let mut stats = SearchStats::default();
        let first_limit = heuristic(start, &fruit);

        for limit in first_limit..=max_limit {
            let mut pass = Pass::new(board, start, fruit, limit);
            let found = pass.step(0);

            stats.expanded += pass.iteration.expanded;
            stats.enqueued += pass.enqueued;
            stats.closed = pass.visited.count();
            stats.iterations.push(pass.iteration.clone());

            if let Some(goal) = found {
                debug!(
                    "IDA* reached {} at limit {} in {} moves",
                    fruit, limit, pass.nodes[goal].moves
                );
                return Ok(SearchResult {
                    nodes: pass.nodes,
                    goal,
                    stats,
                });
            }
        }

        debug!(
            "IDA* gave up on {} after limits {}..={}",
            fruit, first_limit, max_limit
        );
        Err(SolverError::PlanningFailed { limit: max_limit })
    })
}
