// A* toward the fruit over a frozen occupancy snapshot

use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{NodeIndex, SearchNode, SearchResult, SearchStats};
use crate::board::{GridBoard, VisitedGrid};
use crate::error::SolverError;
use crate::profile;
use crate::types::{Coord, Direction, Snake};

/// Frontier entry. Lowest priority pops first; equal priorities pop in
/// insertion order.
#[derive(Debug, PartialEq, Eq)]
struct QueueEntry {
    priority: usize,
    seq: u64,
    node: NodeIndex,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs A* from `start` to `fruit`.
///
/// A cell is closed the first time it is popped and never expanded again.
/// Neighbours that are off the board are ignored; neighbours on a SnakeBody
/// tile are closed immediately. The snapshot is not updated as the planning
/// snake moves, so its own body stays blocked for the whole search.
///
/// # Returns
/// * `Ok(SearchResult)` - goal node whose head sits on the fruit
/// * `Err(SolverError::Unreachable)` - the frontier emptied first
pub fn astar(board: &GridBoard, start: &Snake, fruit: Coord) -> Result<SearchResult, SolverError> {
    profile!("astar", {
        let mut nodes = vec![SearchNode::root(start.clone(), &fruit)];
        let mut closed = VisitedGrid::for_board(board);
        let mut queue = BinaryHeap::new();
        let mut stats = SearchStats::default();
        let mut seq = 0u64;

        queue.push(QueueEntry {
            priority: nodes[0].priority,
            seq,
            node: 0,
        });
        stats.enqueued += 1;

        while let Some(QueueEntry { node: current, .. }) = queue.pop() {
            let head = nodes[current].head();

            if head == fruit {
                stats.closed = closed.count();
                debug!(
                    "A* reached {} in {} moves ({} expanded)",
                    fruit, nodes[current].moves, stats.expanded
                );
                return Ok(SearchResult {
                    nodes,
                    goal: current,
                    stats,
                });
            }

            if !closed.mark(&head) {
                continue;
            }
            stats.expanded += 1;

            for dir in Direction::all() {
                let next = dir.apply(&head);
                if !board.in_bounds(&next) {
                    continue;
                }
                if board.is_blocked(&next) {
                    closed.mark(&next);
                    continue;
                }
                if closed.is_visited(&next) {
                    continue;
                }

                let child = SearchNode::child(current, &nodes[current], dir, &fruit);
                seq += 1;
                queue.push(QueueEntry {
                    priority: child.priority,
                    seq,
                    node: nodes.len(),
                });
                nodes.push(child);
                stats.enqueued += 1;
            }
        }

        debug!(
            "A* frontier exhausted after {} expansions, {} unreachable from {}",
            stats.expanded,
            fruit,
            start.head()
        );
        Err(SolverError::Unreachable)
    })
}

/// Length of the shortest route A* finds, or None when unreachable
pub fn distance(board: &GridBoard, start: &Snake, fruit: Coord) -> Option<usize> {
    astar(board, start, fruit)
        .ok()
        .map(|result| result.goal_node().moves)
}
