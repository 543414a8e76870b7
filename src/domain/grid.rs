/// Grid model: cells, directions and the fixed playing field.
///
/// Cells live in world units. Every coordinate is a multiple of the grid
/// step, so one move = one `step` along a single axis.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[must_use]
pub const fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Screen-style axes: Up decreases y, Down increases it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Neighbour generation order used by the pathfinder.
    pub const fn all() -> [Direction; 4] {
        [Direction::Right, Direction::Left, Direction::Up, Direction::Down]
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        other == self.opposite()
    }

    /// Unit delta in grid steps.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Direction of a single step from `from` to `to`.
    /// The x axis wins; on an equal x, anything not below is treated as Up.
    pub fn between(from: Cell, to: Cell) -> Direction {
        if from.x < to.x {
            Direction::Right
        } else if from.x > to.x {
            Direction::Left
        } else if from.y < to.y {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        f.write_str(name)
    }
}

/// Fixed playing field: `cols` x `rows` cells of `step` world units each.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Grid {
    pub cols: i32,
    pub rows: i32,
    pub step: i32,
}

impl Grid {
    pub fn new(cols: i32, rows: i32, step: i32) -> Self {
        Grid { cols, rows, step: step.max(1) }
    }

    pub fn pixel_width(&self) -> i32 {
        self.cols * self.step
    }

    pub fn pixel_height(&self) -> i32 {
        self.rows * self.step
    }

    pub fn is_in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.pixel_width() && cell.y >= 0 && cell.y < self.pixel_height()
    }

    pub fn cells_equal(a: Cell, b: Cell) -> bool {
        a == b
    }

    pub fn cell_at(&self, col: i32, row: i32) -> Cell {
        Cell::new(col * self.step, row * self.step)
    }

    /// Column/row index of an in-bounds cell.
    pub fn index_of(&self, cell: Cell) -> Option<(usize, usize)> {
        if !self.is_in_bounds(cell) {
            return None;
        }
        Some(((cell.x / self.step) as usize, (cell.y / self.step) as usize))
    }

    pub fn neighbour(&self, cell: Cell, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta();
        Cell::new(cell.x + dx * self.step, cell.y + dy * self.step)
    }

    /// All cells, row-major.
    pub fn iter_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| self.cell_at(c, r)))
    }

    pub fn cell_count(&self) -> usize {
        (self.cols.max(0) * self.rows.max(0)) as usize
    }
}
