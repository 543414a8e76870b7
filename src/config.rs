/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete.

use log::{info, warn};
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::grid::Grid;

// ── Public Config Struct ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Human vs AI. A death never ends the round; only time does.
    Versus,
    /// Human alone. A fatal collision ends the round.
    Solo,
}

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub round: RoundConfig,
    pub grid: GridConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct RoundConfig {
    pub mode: Mode,
    pub tick_rate_ms: u64,
    pub duration_secs: u64,
    pub clock_period_ms: u64,
    pub obstacle_count: usize,
    pub snake_length: usize,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct GridConfig {
    pub cols: i32,
    pub rows: i32,
    pub cell_size: i32,
}

impl GridConfig {
    pub fn grid(&self) -> Grid {
        Grid::new(self.cols, self.rows, self.cell_size)
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    round: TomlRound,
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlRound {
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_duration")]
    duration_secs: u64,
    #[serde(default = "default_clock_period")]
    clock_period_ms: u64,
    #[serde(default = "default_obstacle_count")]
    obstacle_count: usize,
    #[serde(default = "default_snake_length")]
    snake_length: usize,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_cols")]
    cols: i32,
    #[serde(default = "default_rows")]
    rows: i32,
    #[serde(default = "default_cell_size")]
    cell_size: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_mode() -> String { "versus".into() }
fn default_tick_rate() -> u64 { 200 }
fn default_duration() -> u64 { 300 }      // 5 minute round
fn default_clock_period() -> u64 { 1000 }
fn default_obstacle_count() -> usize { 20 }
fn default_snake_length() -> usize { 3 }
fn default_cols() -> i32 { 50 }
fn default_rows() -> i32 { 33 }
fn default_cell_size() -> i32 { 20 }

fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlRound {
    fn default() -> Self {
        TomlRound {
            mode: default_mode(),
            tick_rate_ms: default_tick_rate(),
            duration_secs: default_duration(),
            clock_period_ms: default_clock_period(),
            obstacle_count: default_obstacle_count(),
            snake_length: default_snake_length(),
            seed: None,
        }
    }
}

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid {
            cols: default_cols(),
            rows: default_rows(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

fn parse_mode(s: &str) -> Mode {
    match s.to_ascii_lowercase().as_str() {
        "solo" | "single" => Mode::Solo,
        "versus" | "vs" => Mode::Versus,
        other => {
            warn!("unknown mode {other:?} in config.toml, using versus");
            Mode::Versus
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        match read_config_text(&candidate_dirs()) {
            Some(text) => GameConfig::parse(&text),
            None => GameConfig::default(),
        }
    }

    /// Parse config text directly. Errors fall back to defaults.
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg),
            Err(e) => {
                warn!("config.toml parse error: {e}; using default settings");
                GameConfig::default()
            }
        }
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        GameConfig {
            round: RoundConfig {
                mode: parse_mode(&cfg.round.mode),
                tick_rate_ms: cfg.round.tick_rate_ms.max(1),
                duration_secs: cfg.round.duration_secs,
                clock_period_ms: cfg.round.clock_period_ms.max(1),
                obstacle_count: cfg.round.obstacle_count,
                snake_length: cfg.round.snake_length.clamp(1, 5),
                seed: cfg.round.seed,
            },
            grid: GridConfig {
                cols: cfg.grid.cols.max(8),
                rows: cfg.grid.rows.max(12),
                cell_size: cfg.grid.cell_size.max(1),
            },
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Text of the first readable config.toml in the candidate directories.
fn read_config_text(search_dirs: &[PathBuf]) -> Option<String> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                info!("loaded {}", path.display());
                return Some(text);
            }
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
            }
        }
    }
    None
}
