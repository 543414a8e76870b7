/// Random placement of obstacles and food.
///
/// Obstacles are rolled once per round. Food is uniform over every cell that
/// is not an obstacle. It is NOT kept off snake bodies: food can appear under
/// a snake and stays unreachable until that body moves away.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::grid::{Cell, Grid};

/// `count` distinct obstacle cells, none in `avoid`.
/// Stops early if the grid runs out of free cells.
pub fn spawn_obstacles<R: Rng + ?Sized>(
    grid: &Grid,
    count: usize,
    avoid: &HashSet<Cell>,
    rng: &mut R,
) -> Vec<Cell> {
    let free = grid.iter_cells().filter(|c| !avoid.contains(c)).count();
    let target = count.min(free);
    let mut placed: Vec<Cell> = Vec::with_capacity(target);
    let mut taken: HashSet<Cell> = HashSet::with_capacity(target);

    while placed.len() < target {
        let cell = grid.cell_at(rng.gen_range(0..grid.cols), rng.gen_range(0..grid.rows));
        if avoid.contains(&cell) || !taken.insert(cell) { continue; }
        placed.push(cell);
    }

    placed
}

/// A food cell chosen uniformly among non-obstacle cells.
/// `None` only when obstacles cover the whole grid.
pub fn spawn_food<R: Rng + ?Sized>(
    grid: &Grid,
    obstacles: &HashSet<Cell>,
    rng: &mut R,
) -> Option<Cell> {
    let mut free: Vec<Cell> = Vec::with_capacity(grid.cell_count());
    free.extend(grid.iter_cells().filter(|c| !obstacles.contains(c)));
    free.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn obstacles_are_distinct_and_avoid_spawn() {
        let g = Grid::new(10, 10, 20);
        let avoid: HashSet<Cell> = (0..10).map(|c| g.cell_at(c, 0)).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let obs = spawn_obstacles(&g, 30, &avoid, &mut rng);
        assert_eq!(obs.len(), 30);
        let unique: HashSet<Cell> = obs.iter().copied().collect();
        assert_eq!(unique.len(), 30);
        assert!(obs.iter().all(|c| g.is_in_bounds(*c) && !avoid.contains(c)));
    }

    #[test]
    fn obstacle_count_is_capped_by_free_cells() {
        let g = Grid::new(3, 3, 20);
        let avoid: HashSet<Cell> = [g.cell_at(0, 0)].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(spawn_obstacles(&g, 100, &avoid, &mut rng).len(), 8);
    }

    #[test]
    fn food_never_lands_on_obstacles() {
        let g = Grid::new(4, 4, 20);
        let obstacles: HashSet<Cell> = g.iter_cells().filter(|c| c.x != 40).collect();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let food = spawn_food(&g, &obstacles, &mut rng).unwrap();
            assert_eq!(food.x, 40);
            assert!(g.is_in_bounds(food));
        }
    }

    #[test]
    fn full_grid_has_no_food() {
        let g = Grid::new(2, 2, 20);
        let obstacles: HashSet<Cell> = g.iter_cells().collect();
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(spawn_food(&g, &obstacles, &mut rng), None);
    }

    #[test]
    fn same_seed_same_layout() {
        let g = Grid::new(50, 33, 20);
        let avoid = HashSet::new();
        let a = spawn_obstacles(&g, 20, &avoid, &mut StdRng::seed_from_u64(9));
        let b = spawn_obstacles(&g, 20, &avoid, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
