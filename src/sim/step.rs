/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Human movement (latched direction)
///   2. Human collision check
///   3. Opponent steering (pathfinder toward the food)
///   4. Opponent movement
///   5. Opponent collision check
///   6. Food resolution (growth, score, respawn)
///
/// Dead snakes are skipped in 1, 3, 4 and 6 but still block and collide.
/// In solo mode a death in step 2 ends the round immediately.
/// Time expiry is checked separately (`check_time`) by the round controller.

use log::{debug, info};
use rand::Rng;

use crate::config::Mode;
use crate::domain::ai::{self, Steer};
use crate::domain::grid::Grid;
use crate::domain::rules::{self, Arena, DeathCause};
use crate::domain::snake::Side;
use super::event::{EndReason, GameEvent};
use super::spawn;
use super::world::{Phase, WorldState};

/// Status line lifetime, in ticks.
const DEATH_MESSAGE_TICKS: u32 = 15;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng + ?Sized>(world: &mut WorldState, rng: &mut R) -> Vec<GameEvent> {
    if world.phase != Phase::Running { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }

    if world.human.alive {
        world.human.advance(&world.grid);
        if let Some(cause) = human_collision(world) {
            kill(world, Side::Human, cause, &mut events);
            if world.mode == Mode::Solo {
                events.extend(world.end_round(EndReason::Died(cause)));
                return events;
            }
        }
    }

    if world.ai.as_ref().map_or(false, |s| s.alive) {
        steer_ai(world, &mut events);
        if let Some(snake) = world.ai.as_mut() {
            snake.advance(&world.grid);
        }
        if let Some(cause) = ai_collision(world) {
            kill(world, Side::Ai, cause, &mut events);
        }
    }

    resolve_food(world, rng, &mut events);
    events
}

/// Ends the round once the elapsed time reaches the round duration.
pub fn check_time(world: &mut WorldState) -> Vec<GameEvent> {
    if world.phase != Phase::Running || world.elapsed < world.duration {
        return vec![];
    }
    world.end_round(EndReason::TimeExpired).into_iter().collect()
}

// ══════════════════════════════════════════════════════════════
// Collisions
// ══════════════════════════════════════════════════════════════

fn human_collision(world: &WorldState) -> Option<DeathCause> {
    let arena = Arena {
        grid: &world.grid,
        obstacles: &world.obstacles,
        opponent: world.ai.as_ref(),
    };
    rules::check_collision(&arena, &world.human)
}

fn ai_collision(world: &WorldState) -> Option<DeathCause> {
    let snake = world.ai.as_ref()?;
    let arena = Arena {
        grid: &world.grid,
        obstacles: &world.obstacles,
        opponent: Some(&world.human),
    };
    rules::check_collision(&arena, snake)
}

fn kill(world: &mut WorldState, side: Side, cause: DeathCause, events: &mut Vec<GameEvent>) {
    let (head, len) = match world.snake_mut(side) {
        Some(snake) => {
            let dying = (snake.head(), snake.len());
            snake.kill();
            dying
        }
        None => return,
    };
    match side {
        Side::Human => world.human_death = Some(cause),
        Side::Ai => world.ai_death = Some(cause),
    }
    info!("{side} died at {head} with length {len}: {cause}");
    world.set_message(&format!("{side} died because it {cause}."), DEATH_MESSAGE_TICKS);
    events.push(GameEvent::SnakeDied { side, cause });
}

// ══════════════════════════════════════════════════════════════
// Opponent steering
// ══════════════════════════════════════════════════════════════

fn steer_ai(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let Some(food) = world.food else { return; };
    let blocked = world.blocked_cells();
    let Some(snake) = world.ai.as_mut() else { return; };

    let head = snake.head();
    match ai::decide_direction(&world.grid, head, snake.heading, food, &blocked) {
        Steer::Toward(dir) => {
            snake.request_direction(dir);
        }
        Steer::NoPath => {
            debug!("no path from {head} to {food}; keeping {}", snake.heading);
            events.push(GameEvent::PathNotFound { from: head, to: food });
        }
        Steer::Arrived => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Food
// ══════════════════════════════════════════════════════════════

/// Both snakes are tested against the food cell as it was before either ate,
/// so a shared arrival scores for both and leaves exactly one new food.
pub(crate) fn resolve_food<R: Rng + ?Sized>(
    world: &mut WorldState,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) {
    let Some(food) = world.food else { return; };

    for side in [Side::Human, Side::Ai] {
        let Some(snake) = world.snake_mut(side) else { continue; };
        if !snake.alive || !Grid::cells_equal(snake.head(), food) { continue; }

        snake.grow();
        match side {
            Side::Human => world.human_score += 1,
            Side::Ai => world.ai_score += 1,
        }
        info!("{side} ate food at {food} (score {})", world.score(side));
        events.push(GameEvent::FoodEaten { side, at: food });

        world.food = spawn::spawn_food(&world.grid, &world.obstacles, rng);
        if let Some(at) = world.food {
            events.push(GameEvent::FoodSpawned { at });
        }
    }
}
