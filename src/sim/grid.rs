//! Grid primitives: positions, directions, cell occupants, the board.

use serde::{Deserialize, Serialize};

/// A cell coordinate. `x` is the row axis (grows downward), `y` the
/// column axis (grows rightward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this position lies on a `size` x `size` grid.
    pub const fn in_bounds(self, size: i32) -> bool {
        self.x >= 0 && self.x < size && self.y >= 0 && self.y < size
    }

    /// The adjacent cell one step in `dir`. May be out of bounds.
    pub const fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.vector();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance to another cell.
    pub const fn manhattan_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// A heading on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// All headings, in a fixed order (used for uniform draws).
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Fixed unit-vector table: up=(-1,0), down=(+1,0), left=(0,-1),
    /// right=(0,+1).
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// What a board cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Occupant {
    #[default]
    Empty,
    Mountain,
    Indicator(Direction),
    Start,
    End,
}

/// The live grid. Owned exclusively by the simulation engine; the
/// actor is tracked separately and never stored in a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: i32,
    cells: Vec<Occupant>,
}

impl Board {
    /// A fresh all-empty board.
    pub fn new(size: i32) -> Self {
        assert!(size > 0, "board size must be positive");
        Self {
            size,
            cells: vec![Occupant::Empty; (size * size) as usize],
        }
    }

    pub const fn size(&self) -> i32 {
        self.size
    }

    fn index(&self, pos: Position) -> usize {
        debug_assert!(pos.in_bounds(self.size));
        (pos.x * self.size + pos.y) as usize
    }

    pub fn occupant(&self, pos: Position) -> Occupant {
        self.cells[self.index(pos)]
    }

    pub fn set(&mut self, pos: Position, occupant: Occupant) {
        let idx = self.index(pos);
        self.cells[idx] = occupant;
    }
}
