/// Gamepad input using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Turn
///   Start                 →  Restart (after game over)
///   Select                →  Quit
///
/// Only edges count: a D-pad press or the stick crossing into a new
/// direction yields one turn. Holding does nothing further.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use super::input::Command;
use crate::config::GamepadConfig;
use crate::domain::grid::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers usable in config.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::Start],
            cancel:  vec![Btn::Select],
        }
    }
}

impl ActionMap {
    fn command_for(&self, btn: Btn) -> Option<Command> {
        if self.confirm.contains(&btn) { return Some(Command::Restart); }
        if self.cancel.contains(&btn) { return Some(Command::Quit); }
        None
    }
}

/// The stick's digital direction, or `None` inside the dead-zone.
/// The dominant axis wins; gilrs reports Y positive as up.
pub fn stick_direction(x: f32, y: f32) -> Option<Direction> {
    if x.abs() <= STICK_DEADZONE && y.abs() <= STICK_DEADZONE {
        return None;
    }
    if x.abs() >= y.abs() {
        Some(if x > 0.0 { Direction::Right } else { Direction::Left })
    } else {
        Some(if y > 0.0 { Direction::Up } else { Direction::Down })
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // Stick
    stick_x: f32,
    stick_y: f32,
    stick_dir: Option<Direction>,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::warn!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            stick_x: 0.0,
            stick_y: 0.0,
            stick_dir: None,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Empty or unknown lists keep defaults.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let map = &mut self.action_map;
        let cf = parse_list(&cfg.confirm);
        if !cf.is_empty() { map.confirm = cf; }
        let ca = parse_list(&cfg.cancel);
        if !ca.is_empty() { map.cancel = ca; }
    }

    #[cfg(not(feature = "gamepad"))]
    pub fn poll(&mut self) -> Vec<Command> {
        Vec::new()
    }

    /// Drain pending gamepad events into commands, in arrival order.
    #[cfg(feature = "gamepad")]
    pub fn poll(&mut self) -> Vec<Command> {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return Vec::new(),
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();
        let mut commands = Vec::new();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    commands.extend(self.button_command(btn));
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => continue,
                    }
                    commands.extend(self.stick_edge());
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                    self.stick_dir = None;
                }
                _ => {}
            }
        }

        commands
    }

    #[cfg(feature = "gamepad")]
    fn button_command(&self, btn: Button) -> Option<Command> {
        match btn {
            Button::DPadUp    => Some(Command::Turn(Direction::Up)),
            Button::DPadDown  => Some(Command::Turn(Direction::Down)),
            Button::DPadLeft  => Some(Command::Turn(Direction::Left)),
            Button::DPadRight => Some(Command::Turn(Direction::Right)),
            other => Btn::from_gilrs(other).and_then(|b| self.action_map.command_for(b)),
        }
    }

    /// A turn when the stick moves into a new direction.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn stick_edge(&mut self) -> Option<Command> {
        let dir = stick_direction(self.stick_x, self.stick_y);
        let changed = dir != self.stick_dir;
        self.stick_dir = dir;
        match dir {
            Some(d) if changed => Some(Command::Turn(d)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_mapping() {
        let mut pad = GamepadState::new();
        pad.load_button_config(&GamepadConfig {
            confirm: vec!["A".into(), "nonsense".into()],
            cancel: vec![],
        });
        assert_eq!(pad.action_map.command_for(Btn::A), Some(Command::Restart));
        assert_eq!(pad.action_map.command_for(Btn::Start), None);
        // An empty list keeps the default.
        assert_eq!(pad.action_map.command_for(Btn::Select), Some(Command::Quit));
    }

    #[test]
    fn stick_dead_zone_and_dominant_axis() {
        assert_eq!(stick_direction(0.1, -0.2), None);
        assert_eq!(stick_direction(0.9, 0.3), Some(Direction::Right));
        assert_eq!(stick_direction(-0.4, 0.1), Some(Direction::Left));
        assert_eq!(stick_direction(0.2, 0.8), Some(Direction::Up));
        assert_eq!(stick_direction(0.0, -0.5), Some(Direction::Down));
    }

    #[test]
    fn stick_turns_once_per_direction() {
        let mut pad = GamepadState::new();
        pad.stick_x = 0.9;
        assert_eq!(pad.stick_edge(), Some(Command::Turn(Direction::Right)));
        pad.stick_x = 0.95;
        assert_eq!(pad.stick_edge(), None);
        pad.stick_x = 0.0;
        assert_eq!(pad.stick_edge(), None);
        pad.stick_y = -0.7;
        assert_eq!(pad.stick_edge(), Some(Command::Turn(Direction::Down)));
    }
}
