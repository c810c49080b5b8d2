// Occupancy grid consulted by every planner
//
// A search invocation takes one snapshot of the board and shares it read-only
// (behind an Arc) with all of its nodes. Only the small per-node snake bodies
// are copied as the search advances.

use serde::{Deserialize, Serialize};

use crate::types::{Coord, Snake, TileKind};

/// Fixed-size W x H grid of tiles plus the fruit location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridBoard {
    cols: i32,
    rows: i32,
    tiles: Vec<TileKind>,
    fruit: Option<Coord>,
}

impl GridBoard {
    /// Creates an empty board
    pub fn new(cols: i32, rows: i32) -> Self {
        GridBoard {
            cols,
            rows,
            tiles: vec![TileKind::Empty; (cols * rows) as usize],
            fruit: None,
        }
    }

    /// Builds occupancy from snake bodies and a fruit cell.
    /// Heads become SnakeHead, every other segment SnakeBody.
    pub fn from_snakes(cols: i32, rows: i32, snakes: &[&Snake], fruit: Option<Coord>) -> Self {
        let mut board = GridBoard::new(cols, rows);
        if let Some(f) = fruit {
            board.place_fruit(f);
        }
        for snake in snakes {
            for (i, cell) in snake.cells().enumerate() {
                if !board.in_bounds(cell) {
                    continue;
                }
                let kind = if i == 0 {
                    TileKind::SnakeHead
                } else {
                    TileKind::SnakeBody
                };
                board.set_tile(cell, kind);
            }
        }
        board
    }

    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        let snakes: Vec<&Snake> = snapshot.snakes.iter().collect();
        GridBoard::from_snakes(snapshot.cols, snapshot.rows, &snakes, Some(snapshot.fruit))
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn fruit(&self) -> Option<Coord> {
        self.fruit
    }

    /// Checks whether a coordinate lies on the board
    pub fn in_bounds(&self, cell: &Coord) -> bool {
        cell.x >= 0 && cell.x < self.cols && cell.y >= 0 && cell.y < self.rows
    }

    fn index(&self, cell: &Coord) -> usize {
        (cell.y * self.cols + cell.x) as usize
    }

    /// Tile at `cell`. Off-board cells read as SnakeBody so they are always
    /// treated as blocked, matching how the game scores a wall hit.
    pub fn tile_at(&self, cell: &Coord) -> TileKind {
        if !self.in_bounds(cell) {
            return TileKind::SnakeBody;
        }
        self.tiles[self.index(cell)]
    }

    /// Writes a tile in place. Writes outside the board are ignored.
    pub fn set_tile(&mut self, cell: &Coord, kind: TileKind) {
        if !self.in_bounds(cell) {
            return;
        }
        let idx = self.index(cell);
        if self.tiles[idx] == TileKind::Fruit && kind != TileKind::Fruit {
            self.fruit = None;
        }
        self.tiles[idx] = kind;
        if kind == TileKind::Fruit {
            self.fruit = Some(*cell);
        }
    }

    /// Copy of the board with one tile changed
    pub fn with_tile(&self, cell: &Coord, kind: TileKind) -> GridBoard {
        let mut next = self.clone();
        next.set_tile(cell, kind);
        next
    }

    /// Moves the single fruit to `cell`, clearing any previous one
    pub fn place_fruit(&mut self, cell: Coord) {
        if let Some(old) = self.fruit.take() {
            let idx = self.index(&old);
            if self.tiles[idx] == TileKind::Fruit {
                self.tiles[idx] = TileKind::Empty;
            }
        }
        self.set_tile(&cell, TileKind::Fruit);
    }

    pub fn is_blocked(&self, cell: &Coord) -> bool {
        self.tile_at(cell) == TileKind::SnakeBody
    }

    /// Resets every tile to Empty and forgets the fruit
    pub fn clear(&mut self) {
        self.tiles.iter_mut().for_each(|t| *t = TileKind::Empty);
        self.fruit = None;
    }

    /// Number of cells a fruit could be spawned on (Empty or Fruit)
    pub fn free_cells(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| matches!(t, TileKind::Empty | TileKind::Fruit))
            .count()
    }

    /// Number of cells on the board
    pub fn area(&self) -> usize {
        self.tiles.len()
    }

    pub fn center(&self) -> Coord {
        Coord::new(self.cols / 2, self.rows / 2)
    }
}

/// Serialisable picture of a position: dimensions, fruit, snakes (AI first)
/// and who is to move. Used by the recorder and the replay engine.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub cols: i32,
    pub rows: i32,
    pub fruit: Coord,
    pub snakes: Vec<Snake>,
    pub mover: crate::types::Agent,
}

impl GameSnapshot {
    /// Rejects snapshots a board cannot be built from: empty dimensions, no
    /// snakes, or a snake cell or fruit off the board
    pub fn validate(&self) -> Result<(), String> {
        if self.cols < 1 || self.rows < 1 {
            return Err(format!("Invalid board size {}x{}", self.cols, self.rows));
        }
        if self.snakes.is_empty() {
            return Err("Snapshot has no snakes".to_string());
        }
        let on_board = |c: &Coord| c.x >= 0 && c.x < self.cols && c.y >= 0 && c.y < self.rows;
        for (i, snake) in self.snakes.iter().enumerate() {
            if snake.is_empty() {
                return Err(format!("Snake {} has no head", i));
            }
            if let Some(cell) = snake.cells().find(|c| !on_board(*c)) {
                return Err(format!("Snake {} has cell {} off the board", i, cell));
            }
        }
        if !on_board(&self.fruit) {
            return Err(format!("Fruit {} is off the board", self.fruit));
        }
        Ok(())
    }
}

/// Boolean grid used as the closed/visited set by the planners
#[derive(Debug, Clone)]
pub struct VisitedGrid {
    cols: i32,
    cells: Vec<bool>,
    count: usize,
}

impl VisitedGrid {
    pub fn for_board(board: &GridBoard) -> Self {
        VisitedGrid {
            cols: board.cols,
            cells: vec![false; board.area()],
            count: 0,
        }
    }

    /// Callers only pass in-bounds cells
    pub fn is_visited(&self, cell: &Coord) -> bool {
        self.cells[(cell.y * self.cols + cell.x) as usize]
    }

    /// Marks a cell, returning true if it was not marked before
    pub fn mark(&mut self, cell: &Coord) -> bool {
        let idx = (cell.y * self.cols + cell.x) as usize;
        if self.cells[idx] {
            return false;
        }
        self.cells[idx] = true;
        self.count += 1;
        true
    }

    pub fn count(&self) -> usize {
        self.count
    }
}
