/// WorldState: the complete state of one round.
///
/// Owned by the round controller and passed by reference into the tick
/// logic; nothing here is global. The renderer reads it, never writes the
/// game fields (only the camera).
///
/// ## Camera / Viewport
///
/// Grid coordinates and screen coordinates are separate:
///   - `camera`: viewport into the grid (top-left cell + size), in cell indices
///   - Renderer maps: `screen(sx, sy) = grid(camera.x + sx, camera.y + sy)`
///   - Camera follows the human head with a dead-zone approach
///   - Grids smaller than the viewport are centered

use std::collections::HashSet;
use std::time::Duration;

use log::info;
use rand::Rng;

use super::event::{EndReason, GameEvent, Outcome};
use super::spawn;
use crate::config::{GameConfig, Mode};
use crate::domain::grid::{Cell, Direction, Grid};
use crate::domain::rules::DeathCause;
use crate::domain::snake::{Side, Snake};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    GameOver,
}

/// Spawn cells (column, row) and headings, laid out like the classic board.
const HUMAN_SPAWN: (i32, i32) = (5, 5);
const AI_SPAWN: (i32, i32) = (5, 10);
const HUMAN_HEADING: Direction = Direction::Right;
const AI_HEADING: Direction = Direction::Down;

/// Camera: a viewport into the grid.
///
/// `(x, y)` is the column/row of the top-left visible cell.
/// `(view_w, view_h)` is how many cells fit in the viewport.
/// These are computed from terminal size and set during `render()`.
#[derive(Clone, Debug, Default)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub view_w: i32,
    pub view_h: i32,
}

impl Camera {
    pub fn new() -> Self {
        Camera::default()
    }

    /// Scroll only when the target nears the viewport edge (20% margin).
    pub fn follow(&mut self, target_col: i32, target_row: i32, cols: i32, rows: i32) {
        if self.view_w <= 0 || self.view_h <= 0 { return; }
        self.x = follow_axis(self.x, target_col, self.view_w, cols);
        self.y = follow_axis(self.y, target_row, self.view_h, rows);
    }

    /// Convert a grid column/row to a viewport position, if visible.
    pub fn world_to_view(&self, col: i32, row: i32) -> Option<(usize, usize)> {
        let vx = col - self.x;
        let vy = row - self.y;
        if vx >= 0 && vx < self.view_w && vy >= 0 && vy < self.view_h {
            Some((vx as usize, vy as usize))
        } else {
            None
        }
    }
}

fn follow_axis(pos: i32, target: i32, view: i32, world: i32) -> i32 {
    if world <= view {
        return -((view - world) / 2);
    }
    let margin = view / 5;
    let mut pos = pos;
    if target < pos + margin {
        pos = target - margin;
    } else if target > pos + view - margin - 1 {
        pos = target - view + margin + 1;
    }
    pos.clamp(0, world - view)
}

pub struct WorldState {
    pub grid: Grid,
    pub mode: Mode,

    // ── Entities ──
    pub human: Snake,
    /// Absent in solo mode.
    pub ai: Option<Snake>,
    pub obstacles: HashSet<Cell>,
    pub food: Option<Cell>,

    // ── Round tracking ──
    pub human_score: u32,
    pub ai_score: u32,
    pub human_death: Option<DeathCause>,
    pub ai_death: Option<DeathCause>,
    pub elapsed: Duration,
    pub duration: Duration,
    pub phase: Phase,
    pub end: Option<(EndReason, Outcome)>,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub camera: Camera,
}

// ── Construction ──

impl WorldState {
    /// Fresh round: snakes at their spawns, obstacles rolled, first food placed.
    pub fn new_round<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let grid = config.grid.grid();
        let mode = config.round.mode;
        let length = config.round.snake_length;

        let human = Snake::new(
            Side::Human, &grid,
            grid.cell_at(HUMAN_SPAWN.0, HUMAN_SPAWN.1), HUMAN_HEADING, length,
        );
        let ai = match mode {
            Mode::Versus => Some(Snake::new(
                Side::Ai, &grid,
                grid.cell_at(AI_SPAWN.0, AI_SPAWN.1), AI_HEADING, length,
            )),
            Mode::Solo => None,
        };

        // Keep obstacles off the bodies and the first cell each snake moves into.
        let mut avoid: HashSet<Cell> = human.body.iter().copied().collect();
        avoid.insert(grid.neighbour(human.head(), human.direction));
        if let Some(ai) = &ai {
            avoid.extend(ai.body.iter().copied());
            avoid.insert(grid.neighbour(ai.head(), ai.direction));
        }
        let obstacles: HashSet<Cell> =
            spawn::spawn_obstacles(&grid, config.round.obstacle_count, &avoid, rng)
                .into_iter()
                .collect();
        let food = spawn::spawn_food(&grid, &obstacles, rng);

        info!(
            "new {:?} round: {}x{} grid, {} obstacles, food at {:?}",
            mode, grid.cols, grid.rows, obstacles.len(), food,
        );

        WorldState {
            grid,
            mode,
            human,
            ai,
            obstacles,
            food,
            human_score: 0,
            ai_score: 0,
            human_death: None,
            ai_death: None,
            elapsed: Duration::ZERO,
            duration: Duration::from_secs(config.round.duration_secs),
            phase: Phase::Running,
            end: None,
            tick: 0,
            message: String::new(),
            message_timer: 0,
            camera: Camera::new(),
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

// ── Queries ──

impl WorldState {
    pub fn snake(&self, side: Side) -> Option<&Snake> {
        match side {
            Side::Human => Some(&self.human),
            Side::Ai => self.ai.as_ref(),
        }
    }

    pub fn snake_mut(&mut self, side: Side) -> Option<&mut Snake> {
        match side {
            Side::Human => Some(&mut self.human),
            Side::Ai => self.ai.as_mut(),
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Human => self.human_score,
            Side::Ai => self.ai_score,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.duration.saturating_sub(self.elapsed).as_secs()
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Cells the opponent's search may not enter: obstacles and both bodies.
    /// Its own head is included; the search starts there regardless.
    pub fn blocked_cells(&self) -> HashSet<Cell> {
        let mut blocked = self.obstacles.clone();
        blocked.extend(self.human.body.iter().copied());
        if let Some(ai) = &self.ai {
            blocked.extend(ai.body.iter().copied());
        }
        blocked
    }

    /// Winner by score (versus) or by survival (solo).
    pub fn outcome_for(&self, reason: EndReason) -> Outcome {
        match (self.mode, reason) {
            (Mode::Solo, EndReason::Died(_)) => Outcome::Lose,
            (Mode::Solo, EndReason::TimeExpired) => Outcome::Win,
            (Mode::Versus, _) => match self.human_score.cmp(&self.ai_score) {
                std::cmp::Ordering::Greater => Outcome::Win,
                std::cmp::Ordering::Less => Outcome::Lose,
                std::cmp::Ordering::Equal => Outcome::Draw,
            },
        }
    }
}

// ── Termination ──

impl WorldState {
    /// Running → GameOver. Terminal: a second call is a no-op.
    pub fn end_round(&mut self, reason: EndReason) -> Option<GameEvent> {
        if self.phase == Phase::GameOver { return None; }
        let outcome = self.outcome_for(reason);
        self.phase = Phase::GameOver;
        self.end = Some((reason, outcome));
        info!(
            "round over ({:?}): {:?}, score {} vs {}",
            reason, outcome, self.human_score, self.ai_score,
        );
        Some(GameEvent::RoundOver { reason, outcome })
    }
}
