/// Snakes: body, heading, growth and death.
///
/// The body is head-first. Movement pushes a new head and drops the tail,
/// except on the move right after eating, when the tail is kept (+1 length).
/// A dead snake collapses to a single sentinel cell and stays there.

use std::collections::VecDeque;
use std::fmt;

use super::grid::{Cell, Direction, Grid};

/// Where a dead snake's body collapses to.
pub const DEAD_SENTINEL: Cell = Cell::new(0, 0);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Side {
    Human,
    Ai,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Human => f.write_str("Your snake"),
            Side::Ai => f.write_str("Enemy snake"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Snake {
    pub side: Side,
    pub body: VecDeque<Cell>,
    /// Latched heading, consulted at the start of the next move.
    pub direction: Direction,
    /// Heading of the last completed move. Reversal is judged against this.
    pub heading: Direction,
    pub pending_growth: bool,
    pub alive: bool,
}

impl Snake {
    /// `length` cells trailing one step to the left of `head`.
    pub fn new(side: Side, grid: &Grid, head: Cell, direction: Direction, length: usize) -> Self {
        let body = (0..length.max(1) as i32)
            .map(|i| Cell::new(head.x - i * grid.step, head.y))
            .collect();
        Snake { side, body, direction, heading: direction, pending_growth: false, alive: true }
    }

    pub fn head(&self) -> Cell {
        // Body is never empty: new() builds >= 1 cell, kill() leaves the sentinel.
        self.body.front().copied().unwrap_or(DEAD_SENTINEL)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Latch a new heading. Reversals of the last move are dropped.
    /// Returns true if latched; a later request overwrites an earlier one.
    pub fn request_direction(&mut self, dir: Direction) -> bool {
        if dir.is_opposite(self.heading) {
            return false;
        }
        self.direction = dir;
        true
    }

    /// One step along the latched heading. Returns the new head.
    pub fn advance(&mut self, grid: &Grid) -> Cell {
        let new_head = grid.neighbour(self.head(), self.direction);
        self.body.push_front(new_head);
        self.heading = self.direction;
        if self.pending_growth {
            self.pending_growth = false;
        } else {
            self.body.pop_back();
        }
        new_head
    }

    /// Mark food eaten; the next `advance` keeps its tail.
    pub fn grow(&mut self) {
        self.pending_growth = true;
    }

    pub fn kill(&mut self) {
        self.body.clear();
        self.body.push_back(DEAD_SENTINEL);
        self.pending_growth = false;
        self.alive = false;
    }
}
