/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;

use config::GameConfig;
use sim::event::GameEvent;
use sim::round::Round;
use ui::gamepad::GamepadState;
use ui::input::{Command, InputState};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();

    let config = GameConfig::load();
    let mut round = Round::new(&config);

    let mut renderer = Renderer::new();
    renderer.init().wrap_err("terminal init failed")?;

    let result = game_loop(&mut round, &mut renderer, &config);

    // Restore the terminal before reporting anything.
    let cleanup = renderer.cleanup().wrap_err("terminal cleanup failed");
    result?;
    cleanup?;

    println!();
    println!("Thanks for playing Snake Duel!");
    println!("Your points: {}", round.world.human_score);
    if round.world.ai.is_some() {
        println!("Enemy points: {}", round.world.ai_score);
    }
    Ok(())
}

fn game_loop(round: &mut Round, renderer: &mut Renderer, config: &GameConfig) -> Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }
    let clock = Instant::now();
    let mut dirty = true;

    loop {
        kb.drain_events();
        let commands = kb.commands().into_iter().chain(gp.poll());

        for command in commands {
            match command {
                Command::Quit => {
                    info!("quit requested");
                    return Ok(());
                }
                Command::Restart if round.is_over() => {
                    round.restart(clock.elapsed());
                    dirty = true;
                }
                Command::Restart => {}
                Command::Turn(dir) => {
                    round.request_direction(dir);
                }
            }
        }

        // Every tick yields at least a `Ticked` event, so each one is drawn.
        let events = round.advance(clock.elapsed());
        if !events.is_empty() {
            log_events(&events);
            dirty = true;
        }

        if renderer.show_pad_help != gp.connected {
            renderer.show_pad_help = gp.connected;
            dirty = true;
        }

        if dirty {
            renderer.render(&mut round.world).wrap_err("render failed")?;
            dirty = false;
        }

        std::thread::sleep(idle_time(round.next_due(), clock.elapsed()));
    }
}

/// Sleep until the next timer, but never longer than a frame so input
/// stays responsive. Zero when a timer is already due.
fn idle_time(next_due: Option<Duration>, now: Duration) -> Duration {
    next_due
        .map_or(FRAME_SLEEP, |due| due.saturating_sub(now))
        .min(FRAME_SLEEP)
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::RoundOver { reason, outcome } => {
                info!("round finished: {reason:?} -> {outcome:?}");
            }
            GameEvent::Ticked { .. } => {}
            GameEvent::ClockUpdated { remaining_secs } => {
                log::trace!("{remaining_secs}s remaining");
            }
            other => log::trace!("{other:?}"),
        }
    }
}
