// Snapshot of the snakes on a frozen board, with the agent to move
//
// States are cheap to derive from one another: the board is shared through
// an Arc and only the moving snake's body is cloned.

use std::sync::Arc;

use crate::board::GridBoard;
use crate::types::{Agent, Coord, Direction, Snake};

/// Outcome of evaluating a state after the last ply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    /// The agent's head reached the fruit
    ReachedFruit(Agent),
    /// The agent's head left the board, or the agent had nowhere to go
    Crashed(Agent),
    /// The agent's head landed on one of its own body segments
    SelfCollision(Agent),
    /// The agent's head landed on the other snake
    HitOpponent(Agent),
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

#[derive(Debug, Clone)]
pub struct AgentState {
    board: Arc<GridBoard>,
    snakes: Vec<Snake>,
    fruit: Coord,
    mover: Agent,
}

impl AgentState {
    /// Single-agent state; the lone snake is always the mover
    pub fn single(board: Arc<GridBoard>, snake: Snake, fruit: Coord) -> Self {
        AgentState {
            board,
            snakes: vec![snake],
            fruit,
            mover: Agent::Ai,
        }
    }

    /// Two-agent state with the AI snake first
    pub fn versus(
        board: Arc<GridBoard>,
        ai: Snake,
        opponent: Snake,
        fruit: Coord,
        mover: Agent,
    ) -> Self {
        AgentState {
            board,
            snakes: vec![ai, opponent],
            fruit,
            mover,
        }
    }

    pub fn board(&self) -> &GridBoard {
        &self.board
    }

    pub fn shared_board(&self) -> Arc<GridBoard> {
        Arc::clone(&self.board)
    }

    pub fn fruit(&self) -> Coord {
        self.fruit
    }

    pub fn mover(&self) -> Agent {
        self.mover
    }

    pub fn is_versus(&self) -> bool {
        self.snakes.len() == 2
    }

    pub fn snake(&self, agent: Agent) -> &Snake {
        let idx = agent.index().min(self.snakes.len() - 1);
        &self.snakes[idx]
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    /// Manhattan distance from the agent's head to the fruit
    pub fn heuristic(&self, agent: Agent) -> i32 {
        self.snake(agent).head().manhattan(&self.fruit)
    }

    /// Moves the mover one step and hands the turn to the other agent
    pub fn apply(&self, dir: Direction) -> AgentState {
        let idx = self.mover.index().min(self.snakes.len() - 1);
        let mut snakes = self.snakes.clone();
        snakes[idx] = snakes[idx].advance(dir);
        let mover = if self.is_versus() {
            self.mover.opponent()
        } else {
            self.mover
        };
        AgentState {
            board: Arc::clone(&self.board),
            snakes,
            fruit: self.fruit,
            mover,
        }
    }

    /// Moves available to the mover: the target must be on the board and
    /// not a SnakeBody tile of the frozen snapshot. Order is E, W, N, S.
    pub fn legal_moves(&self) -> Vec<Direction> {
        let head = self.snake(self.mover).head();
        Direction::all()
            .into_iter()
            .filter(|dir| {
                let next = dir.apply(&head);
                self.board.in_bounds(&next) && !self.board.is_blocked(&next)
            })
            .collect()
    }

    /// Successor states of the mover, one per legal move
    pub fn successors(&self) -> Vec<(Direction, AgentState)> {
        self.legal_moves()
            .into_iter()
            .map(|dir| (dir, self.apply(dir)))
            .collect()
    }

    /// Terminal-status check. Fruit is tested first for the AI then the
    /// opponent, followed by wall, own-body and opponent-body collisions.
    pub fn status(&self) -> GameStatus {
        let agents: &[Agent] = if self.is_versus() {
            &[Agent::Ai, Agent::Opponent]
        } else {
            &[Agent::Ai]
        };

        for &agent in agents {
            if self.snake(agent).head() == self.fruit {
                return GameStatus::ReachedFruit(agent);
            }
        }
        for &agent in agents {
            let head = self.snake(agent).head();
            if !self.board.in_bounds(&head) {
                return GameStatus::Crashed(agent);
            }
            if self.snake(agent).body_contains(&head) {
                return GameStatus::SelfCollision(agent);
            }
            if self.is_versus() && self.snake(agent.opponent()).contains(&head) {
                return GameStatus::HitOpponent(agent);
            }
        }
        GameStatus::InProgress
    }

    /// Same snakes and same mover. Boards are not compared: a reused tree
    /// keeps the snapshot it was built from.
    pub fn same_position(&self, other: &AgentState) -> bool {
        self.mover == other.mover && self.snakes == other.snakes && self.fruit == other.fruit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versus_state(ai: Snake, opponent: Snake, fruit: Coord, mover: Agent) -> AgentState {
        let board = GridBoard::from_snakes(10, 10, &[&ai, &opponent], Some(fruit));
        AgentState::versus(Arc::new(board), ai, opponent, fruit, mover)
    }

    #[test]
    fn test_apply_toggles_mover_in_versus_mode() {
        let ai = Snake::straight(Coord::new(2, 2), Direction::East, 3);
        let opp = Snake::straight(Coord::new(7, 7), Direction::West, 3);
        let state = versus_state(ai, opp, Coord::new(5, 0), Agent::Ai);

        let next = state.apply(Direction::North);
        assert_eq!(next.mover(), Agent::Opponent);
        assert_eq!(next.snake(Agent::Ai).head(), Coord::new(2, 1));
        assert_eq!(next.snake(Agent::Opponent).head(), Coord::new(7, 7));
    }

    #[test]
    fn test_legal_moves_skip_walls_and_bodies() {
        let ai = Snake::straight(Coord::new(0, 0), Direction::West, 3);
        let opp = Snake::straight(Coord::new(7, 7), Direction::West, 3);
        let state = versus_state(ai, opp, Coord::new(5, 5), Agent::Ai);

        // West and North are off-board, East is the neck
        assert_eq!(state.legal_moves(), vec![Direction::South]);
    }

    #[test]
    fn test_status_detects_fruit_and_collisions() {
        let ai = Snake::new(vec![Coord::new(3, 3), Coord::new(3, 4), Coord::new(4, 4)]);
        let opp = Snake::straight(Coord::new(7, 7), Direction::West, 3);
        let state = versus_state(ai.clone(), opp.clone(), Coord::new(3, 3), Agent::Opponent);
        assert_eq!(state.status(), GameStatus::ReachedFruit(Agent::Ai));

        let looped = Snake::new(vec![Coord::new(3, 4), Coord::new(3, 3), Coord::new(3, 4)]);
        let state = versus_state(looped, opp.clone(), Coord::new(0, 0), Agent::Opponent);
        assert_eq!(state.status(), GameStatus::SelfCollision(Agent::Ai));

        let rammer = Snake::new(vec![Coord::new(8, 7), Coord::new(8, 6)]);
        let state = versus_state(rammer, opp, Coord::new(0, 0), Agent::Opponent);
        assert_eq!(state.status(), GameStatus::HitOpponent(Agent::Ai));
    }

    #[test]
    fn test_single_agent_state_keeps_mover() {
        let snake = Snake::straight(Coord::new(5, 5), Direction::East, 2);
        let board = GridBoard::from_snakes(10, 10, &[&snake], Some(Coord::new(9, 9)));
        let state = AgentState::single(Arc::new(board), snake, Coord::new(9, 9));
        let next = state.apply(Direction::East);
        assert_eq!(next.mover(), Agent::Ai);
        assert_eq!(next.heuristic(Agent::Ai), 3 + 4);
        assert_eq!(state.status(), GameStatus::InProgress);
    }
}
