use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Add;

use super::action::Direction;
use super::config::GridOrigin;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move cell by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Add<Direction> for Cell {
    type Output = Cell;

    fn add(self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// Bounded square grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    origin: GridOrigin,
}

impl Grid {
    pub fn new(size: usize, origin: GridOrigin) -> Self {
        Self { size, origin }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn origin(&self) -> GridOrigin {
        self.origin
    }

    /// Smallest valid coordinate on either axis
    pub fn min_coord(&self) -> i32 {
        match self.origin {
            GridOrigin::Corner => 0,
            GridOrigin::Centered => -((self.size / 2) as i32),
        }
    }

    /// One past the largest valid coordinate on either axis
    pub fn end_coord(&self) -> i32 {
        self.min_coord() + self.size as i32
    }

    /// Check if a cell is within the grid bounds
    pub fn contains(&self, cell: Cell) -> bool {
        let range = self.min_coord()..self.end_coord();
        range.contains(&cell.x) && range.contains(&cell.y)
    }

    /// Total number of cells
    pub fn capacity(&self) -> usize {
        self.size * self.size
    }

    pub fn center(&self) -> Cell {
        let mid = self.min_coord() + (self.size / 2) as i32;
        Cell::new(mid, mid)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let (lo, hi) = (self.min_coord(), self.end_coord());
        (lo..hi).flat_map(move |y| (lo..hi).map(move |x| Cell::new(x, y)))
    }

    /// Draw a cell uniformly from the grid
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
        let lo = self.min_coord();
        let hi = self.end_coord();
        Cell::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi))
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Cell>,
}

impl Snake {
    /// Create a new snake whose body trails behind `head`, opposite to `direction`
    pub fn new(head: Cell, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        let back = direction.opposite();
        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev + back);
        }

        Self { body }
    }

    /// Build a snake from explicit segments, head first
    pub fn from_cells(body: Vec<Cell>) -> Self {
        Self { body }
    }

    /// Get the head position
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    /// Check if a cell is covered by any segment, tail included
    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Push a new head; drop the tail unless growing. Returns the dropped tail.
    pub fn advance(&mut self, new_head: Cell, grow: bool) -> Option<Cell> {
        self.body.insert(0, new_head);

        if grow { None } else { self.body.pop() }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Lifecycle of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    Title,
    Playing,
    Paused,
    GameOver,
}
