/// Collision rules, truth-table driven.
///
/// Pure functions: they report what a head position means, they never kill.
///
/// ## Death Truth Table
///
/// Evaluated after a snake moves, against its new head. Every row is checked;
/// the first true row is the reported cause.
/// ┌───┬────────────────────────────────────┬──────────────┐
/// │ # │ Condition                          │ Cause        │
/// ├───┼────────────────────────────────────┼──────────────┤
/// │ 1 │ head outside the grid              │ OutOfBounds  │
/// │ 2 │ head on an obstacle cell           │ HitObstacle  │
/// │ 3 │ head on own body (head excluded)   │ HitSelf      │
/// │ 4 │ head on any opponent cell          │ HitOpponent  │
/// │   │ otherwise                          │ alive        │
/// └───┴────────────────────────────────────┴──────────────┘
///
/// A dead opponent is a single sentinel cell and still counts for row 4.

use std::collections::HashSet;
use std::fmt;

use super::grid::{Cell, Grid};
use super::snake::Snake;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DeathCause {
    OutOfBounds,
    HitObstacle,
    HitSelf,
    HitOpponent,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            DeathCause::OutOfBounds => "hit the boundary",
            DeathCause::HitObstacle => "hit an obstacle",
            DeathCause::HitSelf => "hit itself",
            DeathCause::HitOpponent => "hit the other snake",
        };
        f.write_str(msg)
    }
}

/// Read-only view of what a moving snake can run into.
pub struct Arena<'a> {
    pub grid: &'a Grid,
    pub obstacles: &'a HashSet<Cell>,
    pub opponent: Option<&'a Snake>,
}

/// Every cause that holds for `snake`'s head, in priority order.
pub fn collisions(arena: &Arena, snake: &Snake) -> Vec<DeathCause> {
    let head = snake.head();
    let mut causes = Vec::with_capacity(2);

    if !arena.grid.is_in_bounds(head) {
        causes.push(DeathCause::OutOfBounds);
    }
    if arena.obstacles.contains(&head) {
        causes.push(DeathCause::HitObstacle);
    }
    if snake.body.iter().skip(1).any(|&c| c == head) {
        causes.push(DeathCause::HitSelf);
    }
    if arena.opponent.map_or(false, |o| o.occupies(head)) {
        causes.push(DeathCause::HitOpponent);
    }

    causes
}

/// The reported cause of death, if any.
pub fn check_collision(arena: &Arena, snake: &Snake) -> Option<DeathCause> {
    collisions(arena, snake).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Direction;
    use crate::domain::snake::{Side, DEAD_SENTINEL};

    fn grid() -> Grid {
        Grid::new(10, 10, 20)
    }

    fn snake_at(side: Side, body: &[(i32, i32)]) -> Snake {
        let mut s = Snake::new(side, &grid(), Cell::new(0, 0), Direction::Right, 1);
        s.body = body.iter().map(|&(x, y)| Cell::new(x, y)).collect();
        s
    }

    fn obstacles(pts: &[(i32, i32)]) -> HashSet<Cell> {
        pts.iter().map(|&(x, y)| Cell::new(x, y)).collect()
    }

    #[test]
    fn clear_head_is_alive() {
        let g = grid();
        let obs = obstacles(&[(100, 100)]);
        let me = snake_at(Side::Human, &[(60, 60), (40, 60), (20, 60)]);
        let arena = Arena { grid: &g, obstacles: &obs, opponent: None };
        assert_eq!(check_collision(&arena, &me), None);
    }

    #[test]
    fn boundary_edges() {
        let g = grid();
        let obs = HashSet::new();
        for head in [(200, 0), (-20, 0), (0, 200), (0, -20)] {
            let me = snake_at(Side::Human, &[head]);
            let arena = Arena { grid: &g, obstacles: &obs, opponent: None };
            assert_eq!(check_collision(&arena, &me), Some(DeathCause::OutOfBounds));
        }
    }

    #[test]
    fn obstacle_hit() {
        let g = grid();
        let obs = obstacles(&[(60, 60)]);
        let me = snake_at(Side::Human, &[(60, 60), (40, 60)]);
        let arena = Arena { grid: &g, obstacles: &obs, opponent: None };
        assert_eq!(check_collision(&arena, &me), Some(DeathCause::HitObstacle));
    }

    #[test]
    fn out_of_bounds_outranks_obstacle() {
        let g = grid();
        let obs = obstacles(&[(200, 40)]);
        let me = snake_at(Side::Human, &[(200, 40), (180, 40)]);
        let arena = Arena { grid: &g, obstacles: &obs, opponent: None };
        assert_eq!(
            collisions(&arena, &me),
            vec![DeathCause::OutOfBounds, DeathCause::HitObstacle]
        );
        assert_eq!(check_collision(&arena, &me), Some(DeathCause::OutOfBounds));
    }

    #[test]
    fn self_hit_excludes_head() {
        let g = grid();
        let obs = HashSet::new();
        let arena = Arena { grid: &g, obstacles: &obs, opponent: None };
        let looped = snake_at(Side::Ai, &[(40, 40), (60, 40), (60, 60), (40, 60), (40, 40)]);
        assert_eq!(check_collision(&arena, &looped), Some(DeathCause::HitSelf));
        let single = snake_at(Side::Ai, &[(40, 40)]);
        assert_eq!(check_collision(&arena, &single), None);
    }

    #[test]
    fn opponent_hit_includes_their_head() {
        let g = grid();
        let obs = HashSet::new();
        let other = snake_at(Side::Ai, &[(80, 80), (60, 80)]);
        let me = snake_at(Side::Human, &[(80, 80), (80, 100)]);
        let arena = Arena { grid: &g, obstacles: &obs, opponent: Some(&other) };
        assert_eq!(check_collision(&arena, &me), Some(DeathCause::HitOpponent));
    }

    #[test]
    fn dead_opponent_sentinel_still_collides() {
        let g = grid();
        let obs = HashSet::new();
        let mut other = snake_at(Side::Ai, &[(80, 80)]);
        other.kill();
        let me = snake_at(Side::Human, &[(DEAD_SENTINEL.x, DEAD_SENTINEL.y), (20, 0)]);
        let arena = Arena { grid: &g, obstacles: &obs, opponent: Some(&other) };
        assert_eq!(check_collision(&arena, &me), Some(DeathCause::HitOpponent));
    }
}
