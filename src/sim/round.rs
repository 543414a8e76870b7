/// Round controller: owns the world, the timer queue and the RNG.
///
/// Two recurring timers drive a round:
///   - `Tick`  every `tick_rate_ms`: time check, then one `step`
///   - `Clock` every `clock_period_ms`: remaining-time update for the HUD
///
/// Both re-arm themselves after running and are cancelled together when the
/// round ends, so nothing fires after game-over. `now` is always time since
/// the round started; the caller owns the real clock.

use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::event::GameEvent;
use super::schedule::{Scheduler, TimerId};
use super::step;
use super::world::WorldState;
use crate::config::GameConfig;
use crate::domain::grid::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Task {
    Tick,
    Clock,
}

pub struct Round {
    pub world: WorldState,
    config: GameConfig,
    scheduler: Scheduler<Task>,
    rng: StdRng,
    /// Offset of this round's start on the caller's timeline.
    started: Duration,
    tick_timer: Option<TimerId>,
    clock_timer: Option<TimerId>,
}

impl Round {
    /// Seeded from the config when it carries a seed, from entropy otherwise.
    pub fn new(config: &GameConfig) -> Self {
        match config.round.seed {
            Some(seed) => Round::with_seed(config, seed),
            None => Round::start(config, StdRng::from_entropy(), Duration::ZERO),
        }
    }

    pub fn with_seed(config: &GameConfig, seed: u64) -> Self {
        Round::start(config, StdRng::seed_from_u64(seed), Duration::ZERO)
    }

    fn start(config: &GameConfig, mut rng: StdRng, started: Duration) -> Self {
        let world = WorldState::new_round(config, &mut rng);
        let mut round = Round {
            world,
            config: config.clone(),
            scheduler: Scheduler::new(),
            rng,
            started,
            tick_timer: None,
            clock_timer: None,
        };
        round.arm(Task::Tick, Duration::ZERO);
        round.arm(Task::Clock, Duration::ZERO);
        round
    }

    /// Start over with a fresh world at `now`, keeping the RNG stream.
    pub fn restart(&mut self, now: Duration) {
        self.cancel_timers();
        self.world = WorldState::new_round(&self.config, &mut self.rng);
        self.started = now;
        self.arm(Task::Tick, Duration::ZERO);
        self.arm(Task::Clock, Duration::ZERO);
        debug!("round restarted at {now:?}, {} timer(s) armed", self.pending_timers());
    }

    /// Forward a direction request to the human snake.
    /// Ignored after game-over and for a dead snake.
    pub fn request_direction(&mut self, dir: Direction) -> bool {
        if self.world.is_over() || !self.world.human.alive {
            return false;
        }
        self.world.human.request_direction(dir)
    }

    /// Run every timer due at or before `now`, in due order.
    /// Every tick that ran yields a `Ticked` event, so a caller that redraws
    /// on events sees each tick even when nothing else happened.
    pub fn advance(&mut self, now: Duration) -> Vec<GameEvent> {
        let local = now.saturating_sub(self.started);
        let mut events = Vec::new();

        while let Some((id, task)) = self.scheduler.pop_due(local) {
            // Fire at the scheduled time, not the poll time, so late polls
            // replay the exact tick sequence.
            let at = id.due();
            match task {
                Task::Tick => {
                    self.tick_timer = None;
                    self.on_tick(at, &mut events);
                }
                Task::Clock => {
                    self.clock_timer = None;
                    self.on_clock(at, &mut events);
                }
            }
        }

        events
    }

    /// When the next timer fires, on the caller's timeline.
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due().map(|due| self.started + due)
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn is_over(&self) -> bool {
        self.world.is_over()
    }

    // ── Timer handlers ──

    fn on_tick(&mut self, at: Duration, events: &mut Vec<GameEvent>) {
        self.world.elapsed = at.min(self.world.duration);
        events.extend(step::check_time(&mut self.world));
        if !self.world.is_over() {
            events.extend(step::step(&mut self.world, &mut self.rng));
            events.push(GameEvent::Ticked { tick: self.world.tick });
        }

        if self.world.is_over() {
            self.cancel_timers();
        } else {
            self.arm(Task::Tick, at + self.tick_rate());
        }
    }

    fn on_clock(&mut self, at: Duration, events: &mut Vec<GameEvent>) {
        self.world.elapsed = at.min(self.world.duration);
        events.push(GameEvent::ClockUpdated { remaining_secs: self.world.remaining_secs() });
        events.extend(step::check_time(&mut self.world));

        if self.world.is_over() {
            self.cancel_timers();
        } else {
            self.arm(Task::Clock, at + self.clock_period());
        }
    }

    // ── Timers ──

    fn arm(&mut self, task: Task, at: Duration) {
        let id = self.scheduler.schedule_after(at, Duration::ZERO, task);
        match task {
            Task::Tick => self.tick_timer = Some(id),
            Task::Clock => self.clock_timer = Some(id),
        }
    }

    fn cancel_timers(&mut self) {
        let mut cancelled = 0;
        for id in [self.tick_timer.take(), self.clock_timer.take()].into_iter().flatten() {
            if self.scheduler.cancel(id) { cancelled += 1; }
        }
        if cancelled > 0 {
            debug!("cancelled {cancelled} pending timer(s)");
        }
        if !self.scheduler.is_empty() {
            info!("dropping {} stray timer(s)", self.scheduler.len());
            self.scheduler.clear();
        }
    }

    fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.config.round.tick_rate_ms)
    }

    fn clock_period(&self) -> Duration {
        Duration::from_millis(self.config.round.clock_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::sim::event::EndReason;
    use crate::sim::world::Phase;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn short_config(mode: Mode) -> GameConfig {
        let mut cfg = GameConfig::default();
        cfg.round.mode = mode;
        cfg.round.duration_secs = 3;
        cfg.round.obstacle_count = 0;
        cfg
    }

    #[test]
    fn fresh_round_has_both_timers() {
        let round = Round::with_seed(&short_config(Mode::Versus), 1);
        assert_eq!(round.pending_timers(), 2);
        assert_eq!(round.next_due(), Some(Duration::ZERO));
        assert_eq!(round.world.phase, Phase::Running);
    }

    #[test]
    fn ticks_follow_the_tick_rate() {
        let mut round = Round::with_seed(&short_config(Mode::Versus), 1);
        round.world.food = None;
        round.advance(Duration::ZERO);
        assert_eq!(round.world.tick, 1);
        round.advance(ms(199));
        assert_eq!(round.world.tick, 1);
        round.advance(ms(200));
        assert_eq!(round.world.tick, 2);
        // A late poll catches up on every missed tick.
        round.advance(ms(1000));
        assert_eq!(round.world.tick, 6);
        assert_eq!(round.next_due(), Some(ms(1200)));
    }

    #[test]
    fn quiet_tick_is_reported() {
        let mut round = Round::with_seed(&short_config(Mode::Versus), 1);
        round.world.food = None;
        round.advance(Duration::ZERO);
        let before = round.world.human.head();

        let events = round.advance(ms(200));
        assert_ne!(round.world.human.head(), before);
        assert_eq!(events, vec![GameEvent::Ticked { tick: 2 }]);

        // Between ticks nothing fires.
        assert!(round.advance(ms(300)).is_empty());
    }

    #[test]
    fn config_seed_matches_explicit_seed() {
        let mut cfg = short_config(Mode::Versus);
        cfg.round.obstacle_count = 20;
        cfg.round.seed = Some(9);
        let a = Round::new(&cfg);
        let b = Round::with_seed(&cfg, 9);
        assert_eq!(a.world.obstacles, b.world.obstacles);
        assert_eq!(a.world.food, b.world.food);
    }

    #[test]
    fn clock_reports_remaining_time() {
        let mut round = Round::with_seed(&short_config(Mode::Versus), 2);
        round.world.food = None;
        let events = round.advance(secs(1));
        let clocks: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::ClockUpdated { remaining_secs } => Some(*remaining_secs),
                _ => None,
            })
            .collect();
        assert_eq!(clocks, vec![3, 2]);
    }

    #[test]
    fn round_ends_at_duration_and_stops_scheduling() {
        let mut cfg = short_config(Mode::Versus);
        cfg.grid.cols = 200;
        cfg.grid.rows = 200;
        let mut round = Round::with_seed(&cfg, 3);
        // Keep the human alive: steer in a square loop far from every edge.
        round.world.food = None;
        let turns = [Direction::Down, Direction::Left, Direction::Up, Direction::Right];
        let mut events = Vec::new();
        let mut t = Duration::ZERO;
        let mut i = 0;
        while t <= secs(3) {
            if i % 2 == 0 {
                round.request_direction(turns[(i / 2) % 4]);
            }
            events.extend(round.advance(t));
            t += ms(200);
            i += 1;
        }

        assert!(round.is_over());
        assert_eq!(round.pending_timers(), 0);
        assert_eq!(round.next_due(), None);
        let over: Vec<&GameEvent> =
            events.iter().filter(|e| matches!(e, GameEvent::RoundOver { .. })).collect();
        assert_eq!(over.len(), 1);
        assert!(matches!(over[0], GameEvent::RoundOver { reason: EndReason::TimeExpired, .. }));
        assert_eq!(round.world.remaining_secs(), 0);

        let ticks = round.world.tick;
        assert!(round.advance(secs(60)).is_empty());
        assert_eq!(round.world.tick, ticks);
    }

    #[test]
    fn solo_death_cancels_timers() {
        let mut round = Round::with_seed(&short_config(Mode::Solo), 4);
        round.world.food = None;
        // Human starts at column 5 heading Up: row 5 hits the top edge on tick 6.
        round.request_direction(Direction::Up);
        let events = round.advance(secs(2));
        assert!(round.is_over());
        assert!(events.iter().any(|e| matches!(e, GameEvent::RoundOver { reason: EndReason::Died(_), .. })));
        assert_eq!(round.pending_timers(), 0);
        assert_eq!(round.world.tick, 6);
    }

    #[test]
    fn requests_ignored_after_game_over() {
        let mut round = Round::with_seed(&short_config(Mode::Solo), 5);
        round.world.food = None;
        round.request_direction(Direction::Up);
        round.advance(secs(2));
        assert!(round.is_over());
        assert!(!round.request_direction(Direction::Left));
    }

    #[test]
    fn restart_begins_a_new_round() {
        let mut round = Round::with_seed(&short_config(Mode::Solo), 6);
        round.world.food = None;
        round.request_direction(Direction::Up);
        round.advance(secs(2));
        assert!(round.is_over());

        round.restart(secs(10));
        assert!(!round.is_over());
        assert_eq!(round.world.tick, 0);
        assert_eq!(round.pending_timers(), 2);
        assert_eq!(round.next_due(), Some(secs(10)));
        round.advance(secs(10));
        assert_eq!(round.world.tick, 1);
    }

    #[test]
    fn same_seed_same_round() {
        let cfg = {
            let mut c = GameConfig::default();
            c.round.duration_secs = 5;
            c
        };
        let mut a = Round::with_seed(&cfg, 42);
        let mut b = Round::with_seed(&cfg, 42);
        assert_eq!(a.world.obstacles, b.world.obstacles);
        assert_eq!(a.world.food, b.world.food);
        let ea = a.advance(secs(5));
        let eb = b.advance(secs(5));
        assert_eq!(ea, eb);
        assert_eq!(a.world.human.body, b.world.human.body);
        assert_eq!(a.world.ai.as_ref().map(|s| s.body.clone()), b.world.ai.as_ref().map(|s| s.body.clone()));
    }
}
