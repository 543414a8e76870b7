/// Keyboard input.
///
/// Direction changes are edge-triggered and order matters: every press
/// drained this frame is forwarded in arrival order, so several presses
/// between two ticks collapse to the last admissible one.
///
/// Release events (reported by terminals with keyboard enhancement) and
/// auto-repeat are ignored; holding a key does nothing extra.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::grid::Direction;

// ── Key Bindings ──

const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S'), KeyCode::Char('j')];
const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A'), KeyCode::Char('h')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D'), KeyCode::Char('l')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R'), KeyCode::Enter];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

/// What a key press asks the game to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Turn(Direction),
    Restart,
    Quit,
}

pub struct InputState {
    /// Key presses collected during the most recent drain, in arrival order.
    fresh_presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { fresh_presses: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before advancing the round.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Press {
                    self.fresh_presses.push(key);
                }
            }
        }
    }

    /// Commands for this frame's presses, in the order they were typed.
    pub fn commands(&self) -> Vec<Command> {
        self.fresh_presses.iter().filter_map(command_for).collect()
    }
}

impl Default for InputState {
    fn default() -> Self {
        InputState::new()
    }
}

/// Map one key press to a command. Ctrl+C always quits.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    let code = key.code;
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && (code == KeyCode::Char('c') || code == KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }
    if KEYS_UP.contains(&code) { return Some(Command::Turn(Direction::Up)); }
    if KEYS_DOWN.contains(&code) { return Some(Command::Turn(Direction::Down)); }
    if KEYS_LEFT.contains(&code) { return Some(Command::Turn(Direction::Left)); }
    if KEYS_RIGHT.contains(&code) { return Some(Command::Turn(Direction::Right)); }
    if KEYS_RESTART.contains(&code) { return Some(Command::Restart); }
    if KEYS_QUIT.contains(&code) { return Some(Command::Quit); }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_turn() {
        assert_eq!(command_for(&press(KeyCode::Up)), Some(Command::Turn(Direction::Up)));
        assert_eq!(command_for(&press(KeyCode::Char('a'))), Some(Command::Turn(Direction::Left)));
        assert_eq!(command_for(&press(KeyCode::Char('S'))), Some(Command::Turn(Direction::Down)));
        assert_eq!(command_for(&press(KeyCode::Right)), Some(Command::Turn(Direction::Right)));
    }

    #[test]
    fn meta_keys() {
        assert_eq!(command_for(&press(KeyCode::Char('r'))), Some(Command::Restart));
        assert_eq!(command_for(&press(KeyCode::Esc)), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(&ctrl_c), Some(Command::Quit));
        assert_eq!(command_for(&press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn presses_keep_arrival_order() {
        let mut input = InputState::new();
        input.fresh_presses = vec![press(KeyCode::Up), press(KeyCode::Char('x')), press(KeyCode::Left)];
        assert_eq!(
            input.commands(),
            vec![Command::Turn(Direction::Up), Command::Turn(Direction::Left)]
        );
    }
}
