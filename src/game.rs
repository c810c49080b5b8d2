// Headless snake game: board bookkeeping, growth, fruit and scoring.
//
// The rules follow the classic single-player game. A snake grows by one cell
// per move until it is longer than the minimum length, after which its tail
// follows. An optional second snake shares the board in versus mode; both
// snakes obey the same movement rules and either one crashing ends the game.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::VecDeque;

use crate::board::{GameSnapshot, GridBoard};
use crate::config::{BoardConfig, GameConfig};
use crate::types::{Agent, Coord, Direction, Snake, TileKind};

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    /// The agent ran into a wall or a body
    Crashed(Agent),
    /// No free cell was left for the next fruit
    BoardFull,
    /// The driver stopped the game at its tick limit
    TickLimit,
}

/// What the head ran into during one move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// The snake did not move (no queued direction)
    Idle,
    Empty,
    Fruit,
    /// Wall, own body or the other snake
    Body,
}

pub struct SnakeGame {
    board: GridBoard,
    /// AI first, opponent second in versus mode
    snakes: Vec<Snake>,
    directions: VecDeque<Direction>,
    min_snake_length: usize,
    rules: GameConfig,
    score: u32,
    fruits_eaten: u32,
    opponent_fruits: u32,
    next_fruit_score: u32,
    ticks: u32,
    outcome: Option<GameOutcome>,
    rng: StdRng,
}

impl SnakeGame {
    /// Creates and resets a game. Fruit placement is driven by `seed`.
    pub fn new(board: &BoardConfig, rules: &GameConfig, versus: bool, seed: u64) -> Self {
        let mut game = SnakeGame {
            board: GridBoard::new(board.cols, board.rows),
            snakes: Vec::new(),
            directions: VecDeque::new(),
            min_snake_length: board.min_snake_length,
            rules: rules.clone(),
            score: 0,
            fruits_eaten: 0,
            opponent_fruits: 0,
            next_fruit_score: rules.initial_fruit_score,
            ticks: 0,
            outcome: None,
            rng: StdRng::seed_from_u64(seed),
        };
        game.reset(versus);
        game
    }

    /// Puts a one-cell AI snake at the centre (and the opponent at the
    /// upper-left quarter point in versus mode), clears the counters and
    /// spawns the first fruit
    pub fn reset(&mut self, versus: bool) {
        self.board.clear();
        self.snakes.clear();
        self.directions.clear();
        self.score = 0;
        self.fruits_eaten = 0;
        self.opponent_fruits = 0;
        self.ticks = 0;
        self.outcome = None;
        self.next_fruit_score = self.rules.initial_fruit_score;

        let head = self.board.center();
        self.board.set_tile(&head, TileKind::SnakeHead);
        self.snakes.push(Snake::new([head]));

        if versus {
            let opponent = Coord::new(self.board.cols() / 4, self.board.rows() / 4);
            self.board.set_tile(&opponent, TileKind::SnakeHead);
            self.snakes.push(Snake::new([opponent]));
        }

        self.spawn_fruit();
    }

    pub fn board(&self) -> &GridBoard {
        &self.board
    }

    pub fn snake(&self, agent: Agent) -> &Snake {
        let idx = agent.index().min(self.snakes.len() - 1);
        &self.snakes[idx]
    }

    pub fn is_versus(&self) -> bool {
        self.snakes.len() == 2
    }

    /// Current fruit. Absent only once the board is full.
    pub fn fruit(&self) -> Option<Coord> {
        self.board.fruit()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn fruits_eaten(&self) -> u32 {
        self.fruits_eaten
    }

    pub fn opponent_fruits(&self) -> u32 {
        self.opponent_fruits
    }

    pub fn next_fruit_score(&self) -> u32 {
        self.next_fruit_score
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Marks the game as stopped by the driver
    pub fn stop(&mut self, outcome: GameOutcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }

    pub fn queued_directions(&self) -> &VecDeque<Direction> {
        &self.directions
    }

    /// Queues a turn like a key press would. Refused when the queue is full
    /// or the turn is on the same axis as the last queued direction.
    pub fn enqueue(&mut self, dir: Direction) -> bool {
        if self.is_over() || self.directions.len() >= self.rules.max_directions {
            return false;
        }
        if let Some(last) = self.directions.back() {
            if *last == dir || *last == dir.opposite() {
                return false;
            }
        }
        self.directions.push_back(dir);
        true
    }

    /// Replaces the whole queue with one direction
    pub fn steer(&mut self, dir: Direction) {
        self.directions.clear();
        self.directions.push_back(dir);
    }

    /// Moves that do not immediately end the game for `agent`
    pub fn safe_moves(&self, agent: Agent) -> Vec<Direction> {
        let head = self.snake(agent).head();
        Direction::all()
            .into_iter()
            .filter(|dir| {
                let next = dir.apply(&head);
                matches!(
                    self.board.tile_at(&next),
                    TileKind::Empty | TileKind::Fruit
                )
            })
            .collect()
    }

    /// Snapshot of the position with `mover` to move
    pub fn snapshot(&self, mover: Agent) -> Option<GameSnapshot> {
        Some(GameSnapshot {
            cols: self.board.cols(),
            rows: self.board.rows(),
            fruit: self.board.fruit()?,
            snakes: self.snakes.clone(),
            mover,
        })
    }

    /// Advances the game by one tick: the AI follows the head of its
    /// direction queue, then the opponent (if any) moves in `opponent_move`.
    pub fn tick(&mut self, opponent_move: Option<Direction>) -> Option<GameOutcome> {
        if self.is_over() {
            return self.outcome;
        }
        self.ticks += 1;

        let collision = match self.directions.front().copied() {
            Some(dir) => {
                let hit = self.move_snake(Agent::Ai, dir);
                // The last direction stays queued so the snake keeps going
                if hit != Collision::Body && self.directions.len() > 1 {
                    self.directions.pop_front();
                }
                hit
            }
            None => Collision::Idle,
        };
        self.resolve(Agent::Ai, collision);

        if self.is_versus() && !self.is_over() {
            if let Some(dir) = opponent_move {
                let hit = self.move_snake(Agent::Opponent, dir);
                self.resolve(Agent::Opponent, hit);
            }
        }

        self.outcome
    }

    fn resolve(&mut self, agent: Agent, collision: Collision) {
        match collision {
            Collision::Fruit => {
                match agent {
                    Agent::Ai => {
                        self.fruits_eaten += 1;
                        self.score += self.next_fruit_score;
                        self.next_fruit_score = self.rules.initial_fruit_score;
                    }
                    Agent::Opponent => self.opponent_fruits += 1,
                }
                debug!("{:?} ate fruit at tick {}", agent, self.ticks);
                self.spawn_fruit();
            }
            Collision::Body => {
                debug!("{:?} crashed at tick {}", agent, self.ticks);
                self.outcome = Some(GameOutcome::Crashed(agent));
            }
            Collision::Empty if agent == Agent::Ai => {
                if self.next_fruit_score > self.rules.min_fruit_score {
                    self.next_fruit_score -= 1;
                }
            }
            Collision::Empty | Collision::Idle => {}
        }
    }

    /// Moves one snake a cell in `dir`, keeping the board in sync.
    ///
    /// Leaving the board counts as a body hit. Unless the target is the fruit,
    /// a snake longer than the minimum length drops its tail before the target
    /// is re-read, so following one's own tail is legal. On a body hit the
    /// snake does not move.
    fn move_snake(&mut self, agent: Agent, dir: Direction) -> Collision {
        let idx = agent.index();
        let head = dir.apply(&self.snakes[idx].head());
        if !self.board.in_bounds(&head) {
            return Collision::Body;
        }

        let mut target = self.board.tile_at(&head);
        if target != TileKind::Fruit && self.snakes[idx].len() > self.min_snake_length {
            if let Some(tail) = self.snakes[idx].pop_tail() {
                self.board.set_tile(&tail, TileKind::Empty);
            }
            target = self.board.tile_at(&head);
        }

        match target {
            TileKind::SnakeBody | TileKind::SnakeHead => Collision::Body,
            TileKind::Empty | TileKind::Fruit => {
                let old_head = self.snakes[idx].head();
                self.board.set_tile(&old_head, TileKind::SnakeBody);
                self.snakes[idx].push_head(head);
                self.board.set_tile(&head, TileKind::SnakeHead);
                if target == TileKind::Fruit {
                    Collision::Fruit
                } else {
                    Collision::Empty
                }
            }
        }
    }

    /// Places the fruit on the n-th free cell (x-major scan) for a random n
    fn spawn_fruit(&mut self) {
        let free = self.board.free_cells();
        if free == 0 {
            self.outcome = Some(GameOutcome::BoardFull);
            return;
        }
        let target = self.rng.random_range(0..free);

        let mut found = 0;
        for x in 0..self.board.cols() {
            for y in 0..self.board.rows() {
                let cell = Coord::new(x, y);
                if matches!(self.board.tile_at(&cell), TileKind::Empty | TileKind::Fruit) {
                    if found == target {
                        self.board.place_fruit(cell);
                        return;
                    }
                    found += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn solo_game(seed: u64) -> SnakeGame {
        let config = Config::default_hardcoded();
        let mut board = config.board.clone();
        board.cols = 10;
        board.rows = 10;
        SnakeGame::new(&board, &config.game, false, seed)
    }

    #[test]
    fn test_reset_places_snake_and_fruit() {
        let game = solo_game(1);
        assert_eq!(game.snake(Agent::Ai).to_vec(), vec![Coord::new(5, 5)]);
        assert_eq!(game.board().tile_at(&Coord::new(5, 5)), TileKind::SnakeHead);
        let fruit = game.fruit().expect("fruit spawned");
        assert_ne!(fruit, Coord::new(5, 5));
        assert_eq!(game.next_fruit_score(), 100);
        assert!(!game.is_over());
    }

    #[test]
    fn test_same_seed_same_fruit() {
        assert_eq!(solo_game(42).fruit(), solo_game(42).fruit());
    }

    #[test]
    fn test_enqueue_rejects_same_axis_and_full_queue() {
        let mut game = solo_game(1);
        assert!(game.enqueue(Direction::East));
        assert!(!game.enqueue(Direction::West));
        assert!(!game.enqueue(Direction::East));
        assert!(game.enqueue(Direction::North));
        assert!(game.enqueue(Direction::East));
        // max_directions is 3
        assert!(!game.enqueue(Direction::South));
        assert_eq!(game.queued_directions().len(), 3);
    }

    #[test]
    fn test_snake_grows_until_longer_than_minimum() {
        let mut game = solo_game(3);
        // Keep the fruit out of the way of a walk along row 5
        game.board.place_fruit(Coord::new(0, 0));
        game.steer(Direction::West);
        game.tick(None);
        game.steer(Direction::South);
        for _ in 0..3 {
            game.tick(None);
        }
        game.steer(Direction::East);
        for _ in 0..4 {
            game.tick(None);
        }
        assert!(!game.is_over());
        assert_eq!(game.snake(Agent::Ai).len(), 6);
        assert_eq!(game.snake(Agent::Ai).head(), Coord::new(8, 8));
        assert_eq!(game.board().free_cells(), 100 - 6);
        assert_eq!(game.next_fruit_score(), 92);
    }

    #[test]
    fn test_eating_scores_and_respawns() {
        let mut game = solo_game(5);
        game.board.place_fruit(Coord::new(6, 5));
        game.steer(Direction::East);
        game.tick(None);

        assert_eq!(game.fruits_eaten(), 1);
        assert_eq!(game.score(), 100);
        let fruit = game.fruit().expect("respawned");
        assert!(!game.snake(Agent::Ai).contains(&fruit));
    }

    #[test]
    fn test_wall_and_reverse_are_crashes() {
        let mut game = solo_game(2);
        game.board.place_fruit(Coord::new(0, 9));
        game.steer(Direction::North);
        for _ in 0..5 {
            game.tick(None);
        }
        assert!(!game.is_over());
        assert_eq!(game.snake(Agent::Ai).head(), Coord::new(5, 0));
        game.tick(None);
        assert_eq!(game.outcome(), Some(GameOutcome::Crashed(Agent::Ai)));

        let mut game = solo_game(2);
        game.board.place_fruit(Coord::new(0, 9));
        game.steer(Direction::East);
        game.tick(None);
        game.steer(Direction::West);
        game.tick(None);
        assert_eq!(game.outcome(), Some(GameOutcome::Crashed(Agent::Ai)));
    }

    #[test]
    fn test_versus_opponent_moves_after_ai() {
        let config = Config::default_hardcoded();
        let mut board = config.board.clone();
        board.cols = 12;
        board.rows = 12;
        let mut game = SnakeGame::new(&board, &config.game, true, 9);
        game.board.place_fruit(Coord::new(11, 11));

        assert_eq!(game.snake(Agent::Opponent).head(), Coord::new(3, 3));
        game.steer(Direction::North);
        game.tick(Some(Direction::East));
        assert_eq!(game.snake(Agent::Ai).head(), Coord::new(6, 5));
        assert_eq!(game.snake(Agent::Opponent).head(), Coord::new(4, 3));
        assert_eq!(game.safe_moves(Agent::Opponent).len(), 3);

        let snapshot = game.snapshot(Agent::Ai).expect("fruit present");
        assert_eq!(snapshot.snakes.len(), 2);
        assert_eq!(GridBoard::from_snapshot(&snapshot), *game.board());
    }

    #[test]
    fn test_opponent_fruit_keeps_ai_fruit_value() {
        let config = Config::default_hardcoded();
        let mut board = config.board.clone();
        board.cols = 12;
        board.rows = 12;
        let mut game = SnakeGame::new(&board, &config.game, true, 9);
        game.board.place_fruit(Coord::new(5, 3));

        game.steer(Direction::North);
        game.tick(Some(Direction::East));
        game.tick(Some(Direction::East));

        assert_eq!(game.opponent_fruits(), 1);
        assert_eq!(game.fruits_eaten(), 0);
        assert_eq!(game.next_fruit_score(), 98);

        game.reset(true);
        assert_eq!(game.next_fruit_score(), 100);
    }
}
