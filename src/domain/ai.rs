/// Opponent AI: greedy best-first search toward the food.
///
/// The frontier is ordered by Manhattan distance to the target alone; there is
/// no accumulated path cost, so routes are not guaranteed shortest.
///
/// Expansion rules:
///   - each frontier node remembers the direction it was entered with
///   - the reverse of that direction is never expanded (no U-turns)
///   - a neighbour is accepted if in bounds, not blocked, not yet visited
///   - cells are marked visited when generated, so nothing is enqueued twice
///   - equal priorities pop in discovery order (sequence number)

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::grid::{manhattan, Cell, Direction, Grid};

/// Frontier entry. Ordered as a min-heap on `(priority, seq)`.
#[derive(Clone, Copy, Debug)]
struct Node {
    priority: i32,
    seq: u64,
    cell: Cell,
    entered: Direction,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Route from `start` to `target`, both inclusive, or empty if unreachable.
///
/// `start_dir` is the current heading at `start`; its reverse is excluded from
/// the first expansion like every other node's. `blocked` is never entered
/// (obstacles and snake bodies); `start` itself may be in it.
pub fn find_path(
    grid: &Grid,
    start: Cell,
    start_dir: Direction,
    target: Cell,
    blocked: &HashSet<Cell>,
) -> Vec<Cell> {
    let mut frontier = BinaryHeap::with_capacity(64);
    let mut came_from: HashMap<Cell, Cell> = HashMap::with_capacity(256);
    let mut visited: HashSet<Cell> = HashSet::with_capacity(256);
    let mut seq = 0u64;

    visited.insert(start);
    frontier.push(Node { priority: manhattan(start, target), seq, cell: start, entered: start_dir });

    while let Some(Node { cell: current, entered, .. }) = frontier.pop() {
        if current == target {
            return reconstruct(&came_from, current);
        }

        for dir in Direction::all() {
            if dir == entered.opposite() { continue; }
            let next = grid.neighbour(current, dir);
            if !grid.is_in_bounds(next) || blocked.contains(&next) { continue; }
            if !visited.insert(next) { continue; }

            seq += 1;
            came_from.insert(next, current);
            frontier.push(Node { priority: manhattan(next, target), seq, cell: next, entered: dir });
        }
    }

    Vec::new()
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, end: Cell) -> Vec<Cell> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// What the opponent should do with its heading this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Steer {
    /// Turn (or keep going) toward the second cell of the route.
    Toward(Direction),
    /// No route exists; keep the current heading.
    NoPath,
    /// Already on the target; keep the current heading.
    Arrived,
}

/// Only the second cell of the route matters. When there is none the heading
/// is frozen rather than replaced by a fallback move.
pub fn decide_direction(
    grid: &Grid,
    head: Cell,
    heading: Direction,
    target: Cell,
    blocked: &HashSet<Cell>,
) -> Steer {
    let path = find_path(grid, head, heading, target, blocked);
    match path.get(1) {
        Some(&next) => Steer::Toward(Direction::between(head, next)),
        None if path.is_empty() => Steer::NoPath,
        None => Steer::Arrived,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(50, 50, 20)
    }

    fn cells(pts: &[(i32, i32)]) -> HashSet<Cell> {
        pts.iter().map(|&(x, y)| Cell::new(x, y)).collect()
    }

    fn assert_well_formed(g: &Grid, path: &[Cell], start: Cell, target: Cell) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&target));
        for pair in path.windows(2) {
            let dx = (pair[0].x - pair[1].x).abs();
            let dy = (pair[0].y - pair[1].y).abs();
            assert!(
                (dx == g.step && dy == 0) || (dx == 0 && dy == g.step),
                "non-adjacent step {} -> {}", pair[0], pair[1]
            );
        }
    }

    #[test]
    fn straight_line_to_the_right() {
        let g = grid();
        let path = find_path(&g, Cell::new(0, 0), Direction::Right, Cell::new(40, 0), &HashSet::new());
        assert_eq!(path, vec![Cell::new(0, 0), Cell::new(20, 0), Cell::new(40, 0)]);
    }

    #[test]
    fn enclosed_target_is_unreachable() {
        let g = grid();
        let target = Cell::new(200, 200);
        let walls = cells(&[(180, 200), (220, 200), (200, 180), (200, 220)]);
        let path = find_path(&g, Cell::new(0, 0), Direction::Right, target, &walls);
        assert!(path.is_empty());
    }

    #[test]
    fn blocked_target_is_unreachable() {
        let g = grid();
        let target = Cell::new(100, 100);
        let path = find_path(&g, Cell::new(0, 0), Direction::Down, target, &cells(&[(100, 100)]));
        assert!(path.is_empty());
    }

    #[test]
    fn start_on_target_is_single_cell() {
        let g = grid();
        let start = Cell::new(60, 60);
        let path = find_path(&g, start, Direction::Up, start, &HashSet::new());
        assert_eq!(path, vec![start]);
        assert_eq!(decide_direction(&g, start, Direction::Up, start, &HashSet::new()), Steer::Arrived);
    }

    #[test]
    fn target_behind_forces_detour() {
        // Heading Right with the food directly behind: first step can't be Left.
        let g = grid();
        let start = Cell::new(100, 100);
        let target = Cell::new(60, 100);
        let path = find_path(&g, start, Direction::Right, target, &HashSet::new());
        assert!(!path.is_empty());
        assert_ne!(Direction::between(start, path[1]), Direction::Left);
        assert_well_formed(&g, &path, start, target);
    }

    #[test]
    fn first_step_never_reverses() {
        let g = Grid::new(12, 12, 20);
        let blocked = cells(&[(60, 40), (60, 60), (60, 80), (100, 120)]);
        for dir in Direction::all() {
            for tc in 0..12 {
                for tr in 0..12 {
                    let start = g.cell_at(5, 5);
                    let target = g.cell_at(tc, tr);
                    if blocked.contains(&target) { continue; }
                    let path = find_path(&g, start, dir, target, &blocked);
                    if path.len() > 1 {
                        assert_ne!(Direction::between(start, path[1]), dir.opposite());
                        assert_well_formed(&g, &path, start, target);
                    }
                }
            }
        }
    }

    #[test]
    fn routes_around_a_wall() {
        let g = Grid::new(10, 10, 20);
        let wall = cells(&[(80, 0), (80, 20), (80, 40), (80, 60), (80, 80)]);
        let start = Cell::new(0, 40);
        let target = Cell::new(160, 40);
        let path = find_path(&g, start, Direction::Right, target, &wall);
        assert_well_formed(&g, &path, start, target);
        assert!(path.iter().all(|c| !wall.contains(c)));
    }

    #[test]
    fn identical_inputs_give_identical_paths() {
        let g = Grid::new(20, 20, 20);
        let blocked = cells(&[(100, 100), (120, 100), (140, 100), (100, 120), (40, 200)]);
        let start = Cell::new(20, 20);
        let target = Cell::new(300, 260);
        let first = find_path(&g, start, Direction::Down, target, &blocked);
        for _ in 0..20 {
            assert_eq!(find_path(&g, start, Direction::Down, target, &blocked), first);
        }
    }

    #[test]
    fn start_in_blocked_set_still_searches() {
        // The agent's own head is part of the blocked set.
        let g = grid();
        let start = Cell::new(100, 100);
        let body = cells(&[(100, 100), (80, 100), (60, 100)]);
        let dir = decide_direction(&g, start, Direction::Right, Cell::new(100, 200), &body);
        assert_eq!(dir, Steer::Toward(Direction::Down));
    }

    #[test]
    fn no_path_keeps_heading() {
        let g = Grid::new(3, 1, 20);
        // Heading Right at the east edge of a one-row grid; target to the west.
        let dir = decide_direction(&g, Cell::new(40, 0), Direction::Right, Cell::new(0, 0), &HashSet::new());
        assert_eq!(dir, Steer::NoPath);
    }
}
