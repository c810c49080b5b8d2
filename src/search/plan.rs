// Turning a solved search into something a driver can follow

use log::debug;
use std::collections::HashMap;

use super::{NodeIndex, SearchNode};
use crate::error::SolverError;
use crate::profile;
use crate::types::{Coord, Direction};

/// Route to the fruit.
///
/// `moves` is the ordered list for drivers that replay the whole route.
/// `steps` maps each cell on the route to the direction to take from it, for
/// drivers that look up the current head after every physical move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    start: Coord,
    moves: Vec<Direction>,
    steps: HashMap<Coord, Direction>,
}

impl Plan {
    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn moves(&self) -> &[Direction] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Direction out of the start cell
    pub fn first_move(&self) -> Option<Direction> {
        self.moves.first().copied()
    }

    /// Direction valid for a head currently at `cell`
    pub fn direction_at(&self, cell: &Coord) -> Option<Direction> {
        self.steps.get(cell).copied()
    }

    /// Like [`Plan::direction_at`] but consumes the entry, so a route that
    /// crosses back over a cell is not followed twice
    pub fn take_direction_at(&mut self, cell: &Coord) -> Option<Direction> {
        self.steps.remove(cell)
    }

    /// Cells visited by the route, start first, goal last
    pub fn cells(&self) -> Vec<Coord> {
        let mut cells = Vec::with_capacity(self.moves.len() + 1);
        let mut cell = self.start;
        cells.push(cell);
        for dir in &self.moves {
            cell = dir.apply(&cell);
            cells.push(cell);
        }
        cells
    }
}

/// Walks the parent chain from `goal` back to the root.
///
/// Each ancestor cell is mapped to the direction taken out of it toward the
/// goal, derived by comparing a node's head with its parent's.
///
/// # Returns
/// * `Err(SolverError::InvariantViolation)` if a node is not exactly one
///   orthogonal step from its parent
pub fn extract_plan(nodes: &[SearchNode], goal: NodeIndex) -> Result<Plan, SolverError> {
    profile!("plan_extract", {
        let mut moves = Vec::new();
        let mut steps = HashMap::new();
        let mut current = goal;

        while let Some(parent) = nodes[current].parent {
            let cell = nodes[current].head();
            let parent_cell = nodes[parent].head();
            let dir = Direction::between(&parent_cell, &cell).ok_or(
                SolverError::InvariantViolation {
                    cell,
                    parent: parent_cell,
                },
            )?;
            steps.insert(parent_cell, dir);
            moves.push(dir);
            current = parent;
        }
        moves.reverse();

        let start = nodes[current].head();
        debug!("Plan from {}: {} moves", start, moves.len());

        Ok(Plan {
            start,
            moves,
            steps,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Snake;

    fn chain(cells: &[Coord]) -> Vec<SearchNode> {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| SearchNode {
                parent: if i == 0 { None } else { Some(i - 1) },
                snake: Snake::new(vec![*c]),
                moves: i,
                priority: i,
            })
            .collect()
    }

    #[test]
    fn test_extracts_moves_and_lookup_table() {
        let nodes = chain(&[
            Coord::new(2, 2),
            Coord::new(3, 2),
            Coord::new(3, 1),
            Coord::new(2, 1),
        ]);
        let plan = extract_plan(&nodes, 3).unwrap();

        assert_eq!(
            plan.moves(),
            &[Direction::East, Direction::North, Direction::West]
        );
        assert_eq!(plan.first_move(), Some(Direction::East));
        assert_eq!(plan.direction_at(&Coord::new(3, 2)), Some(Direction::North));
        assert_eq!(plan.direction_at(&Coord::new(2, 1)), None);
        assert_eq!(plan.cells().last(), Some(&Coord::new(2, 1)));
    }

    #[test]
    fn test_rejects_non_adjacent_parent() {
        let nodes = chain(&[Coord::new(0, 0), Coord::new(2, 0)]);
        let err = extract_plan(&nodes, 1).unwrap_err();
        assert_eq!(
            err,
            SolverError::InvariantViolation {
                cell: Coord::new(2, 0),
                parent: Coord::new(0, 0),
            }
        );
    }

    #[test]
    fn test_root_goal_gives_empty_plan() {
        let nodes = chain(&[Coord::new(4, 4)]);
        let plan = extract_plan(&nodes, 0).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.first_move(), None);
        assert_eq!(plan.start(), Coord::new(4, 4));
    }

    #[test]
    fn test_take_direction_consumes_entry() {
        let nodes = chain(&[Coord::new(0, 0), Coord::new(0, 1)]);
        let mut plan = extract_plan(&nodes, 1).unwrap();
        assert_eq!(plan.take_direction_at(&Coord::new(0, 0)), Some(Direction::South));
        assert_eq!(plan.take_direction_at(&Coord::new(0, 0)), None);
    }
}
