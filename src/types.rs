// Core grid types shared by the planners, the game tree and the driver

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// 2D coordinate on the board. North is y - 1, South is y + 1.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Calculates Manhattan distance between two coordinates
    pub fn manhattan(&self, other: &Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the four possible movement directions for a snake
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    East,
    West,
    North,
    South,
}

impl Direction {
    /// Returns all directions in expansion order
    pub fn all() -> [Direction; 4] {
        [
            Direction::East,
            Direction::West,
            Direction::North,
            Direction::South,
        ]
    }

    /// Converts direction to its lowercase string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::East => "east",
            Direction::West => "west",
            Direction::North => "north",
            Direction::South => "south",
        }
    }

    /// Parses a direction name, case-insensitively
    pub fn parse(s: &str) -> Result<Direction, String> {
        match s.to_lowercase().as_str() {
            "east" => Ok(Direction::East),
            "west" => Ok(Direction::West),
            "north" => Ok(Direction::North),
            "south" => Ok(Direction::South),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::East => Coord { x: coord.x + 1, y: coord.y },
            Direction::West => Coord { x: coord.x - 1, y: coord.y },
            Direction::North => Coord { x: coord.x, y: coord.y - 1 },
            Direction::South => Coord { x: coord.x, y: coord.y + 1 },
        }
    }

    /// Direction of a single orthogonal step from `from` to `to`.
    /// Returns None unless the two cells are exactly one unit apart.
    pub fn between(from: &Coord, to: &Coord) -> Option<Direction> {
        match (to.x - from.x, to.y - from.y) {
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of a single board cell
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileKind {
    #[default]
    Empty,
    SnakeBody,
    SnakeHead,
    Fruit,
}

/// Which side of the adversarial game a snake belongs to
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    /// The snake the engine decides for
    Ai,
    /// The competing snake
    Opponent,
}

impl Agent {
    pub fn opponent(&self) -> Agent {
        match self {
            Agent::Ai => Agent::Opponent,
            Agent::Opponent => Agent::Ai,
        }
    }

    /// Index of this agent's snake in a two-snake state
    pub fn index(&self) -> usize {
        match self {
            Agent::Ai => 0,
            Agent::Opponent => 1,
        }
    }
}

/// Ordered snake body, head first
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "Vec<Coord>", into = "Vec<Coord>")]
pub struct Snake {
    body: VecDeque<Coord>,
}

impl TryFrom<Vec<Coord>> for Snake {
    type Error = String;

    fn try_from(body: Vec<Coord>) -> Result<Self, Self::Error> {
        if body.is_empty() {
            return Err("snake body must contain a head".to_string());
        }
        Ok(Snake { body: body.into() })
    }
}

impl From<Snake> for Vec<Coord> {
    fn from(snake: Snake) -> Self {
        snake.body.into()
    }
}

impl Snake {
    /// Builds a snake from a head-first list of cells.
    /// An empty body is not a snake; callers always supply at least the head.
    pub fn new(body: impl IntoIterator<Item = Coord>) -> Self {
        let body: VecDeque<Coord> = body.into_iter().collect();
        debug_assert!(!body.is_empty(), "snake body must contain a head");
        Snake { body }
    }

    /// A straight snake of `length` cells whose head is at `head` and whose
    /// body trails away in the opposite direction of `facing`
    pub fn straight(head: Coord, facing: Direction, length: usize) -> Self {
        let back = facing.opposite();
        let mut cells = Vec::with_capacity(length);
        let mut cell = head;
        for _ in 0..length {
            cells.push(cell);
            cell = back.apply(&cell);
        }
        Snake::new(cells)
    }

    pub fn head(&self) -> Coord {
        self.body[0]
    }

    pub fn tail(&self) -> Coord {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Coord> {
        self.body.iter()
    }

    /// True if `cell` is covered by a segment other than the head
    pub fn body_contains(&self, cell: &Coord) -> bool {
        self.body.iter().skip(1).any(|c| c == cell)
    }

    pub fn contains(&self, cell: &Coord) -> bool {
        self.body.contains(cell)
    }

    /// Prepends a new head and drops the tail (no growth)
    pub fn advance(&self, dir: Direction) -> Snake {
        let mut next = self.clone();
        next.push_head(dir.apply(&self.head()));
        next.pop_tail();
        next
    }

    pub fn push_head(&mut self, cell: Coord) {
        self.body.push_front(cell);
    }

    pub fn pop_tail(&mut self) -> Option<Coord> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }

    pub fn to_vec(&self) -> Vec<Coord> {
        self.body.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_apply_uses_screen_orientation() {
        let c = Coord::new(3, 3);
        assert_eq!(Direction::North.apply(&c), Coord::new(3, 2));
        assert_eq!(Direction::South.apply(&c), Coord::new(3, 4));
        assert_eq!(Direction::East.apply(&c), Coord::new(4, 3));
        assert_eq!(Direction::West.apply(&c), Coord::new(2, 3));
    }

    #[test]
    fn test_between_rejects_non_adjacent_cells() {
        let a = Coord::new(2, 2);
        assert_eq!(Direction::between(&a, &Coord::new(3, 2)), Some(Direction::East));
        assert_eq!(Direction::between(&a, &Coord::new(2, 1)), Some(Direction::North));
        assert_eq!(Direction::between(&a, &Coord::new(4, 2)), None);
        assert_eq!(Direction::between(&a, &Coord::new(3, 3)), None);
        assert_eq!(Direction::between(&a, &a), None);
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!(Direction::parse("east").unwrap(), Direction::East);
        assert_eq!(Direction::parse("NORTH").unwrap(), Direction::North);
        assert!(Direction::parse("up").is_err());
    }

    #[test]
    fn test_snake_advance_keeps_length() {
        let snake = Snake::straight(Coord::new(5, 5), Direction::East, 3);
        assert_eq!(snake.to_vec(), vec![Coord::new(5, 5), Coord::new(4, 5), Coord::new(3, 5)]);

        let moved = snake.advance(Direction::North);
        assert_eq!(moved.head(), Coord::new(5, 4));
        assert_eq!(moved.len(), 3);
        assert_eq!(moved.tail(), Coord::new(4, 5));
        assert!(moved.body_contains(&Coord::new(5, 5)));
        assert!(!moved.body_contains(&Coord::new(5, 4)));
    }

    #[test]
    fn test_snake_json_needs_a_head() {
        let json = r#"[{"x":2,"y":3},{"x":1,"y":3}]"#;
        let snake: Snake = serde_json::from_str(json).unwrap();
        assert_eq!(snake.head(), Coord::new(2, 3));
        assert_eq!(serde_json::to_string(&snake).unwrap(), json);

        let err = serde_json::from_str::<Snake>("[]").unwrap_err();
        assert!(err.to_string().contains("must contain a head"));
    }
}
