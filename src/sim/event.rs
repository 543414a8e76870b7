/// Events emitted while a round advances.
/// The presentation layer consumes these for status messages and logging.

use crate::domain::grid::Cell;
use crate::domain::rules::DeathCause;
use crate::domain::snake::Side;

/// Why the round ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EndReason {
    TimeExpired,
    /// Solo mode only: the lone snake died.
    Died(DeathCause),
}

/// Result from the human player's point of view.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    FoodEaten { side: Side, at: Cell },
    FoodSpawned { at: Cell },
    SnakeDied { side: Side, cause: DeathCause },
    /// Opponent found no route and kept its heading.
    PathNotFound { from: Cell, to: Cell },
    /// One step ran; `tick` is the world's tick counter after it.
    Ticked { tick: u64 },
    ClockUpdated { remaining_secs: u64 },
    RoundOver { reason: EndReason, outcome: Outcome },
}
