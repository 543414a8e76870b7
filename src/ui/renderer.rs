/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Glyph)
///   2. Compare each glyph with `back` buffer (previous frame)
///   3. Only emit terminal commands for glyphs that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Field layers are drawn obstacles, food, then live snakes; a later layer
/// overwrites an earlier one. Dead snakes are not drawn.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::Mode;
use crate::domain::grid::Cell;
use crate::domain::snake::{Side, Snake};
use crate::sim::event::{EndReason, Outcome};
use crate::sim::world::{Phase, WorldState};

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    /// Explicit dark background for every empty terminal cell, so the gap
    /// between rows matches on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Glyph = Glyph { ch: ' ', fg: Color::White, bg: Glyph::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    /// Different from any real glyph, so every position will be diff'd.
    const INVALID: Glyph = Glyph { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Glyph { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Glyph::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Glyph::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, g: Glyph) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = g;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Glyph::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Glyph::new(' ', Color::White, bg));
        }
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const FIELD_BG: Color = Color::Black;
const OBSTACLE: Color = Color::Rgb { r: 200, g: 60, b: 60 };
const FOOD: Color = Color::Rgb { r: 230, g: 80, b: 80 };
const HUMAN_BODY: Color = Color::Rgb { r: 40, g: 160, b: 40 };
const HUMAN_HEAD: Color = Color::Rgb { r: 90, g: 230, b: 90 };
const AI_BODY: Color = Color::Rgb { r: 200, g: 180, b: 30 };
const AI_HEAD: Color = Color::Rgb { r: 250, g: 230, b: 80 };

// ── Renderer ──

/// Each grid cell is 2 terminal columns wide to look roughly square.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Advertise the gamepad controls in the help row.
    pub show_pad_help: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            show_pad_help: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Glyph::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Glyph::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
        }

        // Viewport: terminal cols / CELL_W wide, terminal rows minus HUD,
        // message and help rows high, capped to the grid.
        let reserved_rows = MAP_ROW + 4;
        let max_view_h = self.term_h.saturating_sub(reserved_rows).max(1);
        world.camera.view_w = ((self.term_w / CELL_W) as i32).min(world.grid.cols);
        world.camera.view_h = (max_view_h as i32).min(world.grid.rows);

        let phase_changed = self.last_phase != Some(world.phase);
        if phase_changed {
            self.back.cells.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        if world.human.alive {
            if let Some((col, row)) = world.grid.index_of(world.human.head()) {
                world.camera.follow(col as i32, row as i32, world.grid.cols, world.grid.rows);
            }
        }

        self.front.clear();
        match world.phase {
            Phase::Running => self.compose_game(world),
            Phase::GameOver => self.compose_game_over(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Glyph::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors, never ResetColor: the terminal default may
        // differ from BASE_BG and leave line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Glyph::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let g = self.front.get(x, y);
                if g == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if g.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(g.fg))?;
                    last_fg = g.fg;
                }
                if g.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(g.bg))?;
                    last_bg = g.bg;
                }

                queue!(self.writer, Print(g.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        self.compose_hud(w);
        self.compose_field(w);

        let cam = &w.camera;
        let msg_row = MAP_ROW + cam.view_h.max(0) as usize + 1;
        if msg_row < self.front.height && !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        let help_row = msg_row + 2;
        if help_row < self.front.height {
            let help = help_line(self.show_pad_help);
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_hud(&mut self, w: &WorldState) {
        let hud = hud_line(w);
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    /// Obstacles, food and live snakes through the camera.
    fn compose_field(&mut self, w: &WorldState) {
        let cam = &w.camera;
        for vy in 0..cam.view_h.max(0) as usize {
            for vx in 0..cam.view_w.max(0) as usize {
                let col = cam.x + vx as i32;
                let row = cam.y + vy as i32;
                let inside = col >= 0 && row >= 0 && col < w.grid.cols && row < w.grid.rows;
                let bg = if inside { FIELD_BG } else { Glyph::BASE_BG };
                self.put_cell(vx, vy, ' ', Color::White, bg);
            }
        }

        for &cell in &w.obstacles {
            self.put_world(w, cell, '█', OBSTACLE);
        }
        if let Some(food) = w.food {
            self.put_world(w, food, '●', FOOD);
        }
        // Snakes last so they stay on top of food spawned under them.
        for snake in [Side::Human, Side::Ai].into_iter().filter_map(|side| w.snake(side)) {
            self.compose_snake(w, snake);
        }
    }

    fn compose_snake(&mut self, w: &WorldState, snake: &Snake) {
        if !snake.alive { return; }
        let (body, head) = match snake.side {
            Side::Human => (HUMAN_BODY, HUMAN_HEAD),
            Side::Ai => (AI_BODY, AI_HEAD),
        };
        for (i, &cell) in snake.body.iter().enumerate().rev() {
            let (ch, fg) = if i == 0 { ('◆', head) } else { ('■', body) };
            self.put_world(w, cell, ch, fg);
        }
    }

    fn put_world(&mut self, w: &WorldState, cell: Cell, ch: char, fg: Color) {
        let Some((col, row)) = w.grid.index_of(cell) else { return; };
        if let Some((vx, vy)) = w.camera.world_to_view(col as i32, row as i32) {
            self.put_cell(vx, vy, ch, fg, FIELD_BG);
        }
    }

    /// One grid cell = `CELL_W` terminal columns; the glyph goes in the first.
    fn put_cell(&mut self, vx: usize, vy: usize, ch: char, fg: Color, bg: Color) {
        let x = vx * CELL_W;
        let y = MAP_ROW + vy;
        self.front.set(x, y, Glyph::new(ch, fg, bg));
        let fill = if ch == '█' { '█' } else { ' ' };
        for dx in 1..CELL_W {
            self.front.set(x + dx, y, Glyph::new(fill, fg, bg));
        }
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        self.compose_hud(w);

        let Some((reason, outcome)) = w.end else { return; };
        let (title, color) = match outcome {
            Outcome::Win => ("★  YOU WIN  ★", Color::Rgb { r: 80, g: 255, b: 80 }),
            Outcome::Lose => ("✕  YOU LOSE  ✕", Color::Rgb { r: 255, g: 60, b: 60 }),
            Outcome::Draw => ("=  DRAW  =", Color::Rgb { r: 255, g: 220, b: 50 }),
        };
        let end_line = match reason {
            EndReason::TimeExpired => "Time's up!".to_string(),
            EndReason::Died(cause) => format!("Game Over! Your snake {cause}."),
        };

        let inner = 34;
        let top = format!("╔{}╗", "═".repeat(inner));
        let mid = format!("║{:^width$}║", title, width = inner);
        let bottom = format!("╚{}╝", "═".repeat(inner));
        for (i, l) in [top, mid, bottom].iter().enumerate() {
            self.front.put_str(6, 4 + i, l, color, Color::Reset);
        }

        let mut row = 8;
        self.front.put_str(8, row, &end_line, Color::White, Color::Reset);
        row += 2;
        match w.mode {
            Mode::Versus => {
                self.front.put_str(8, row, &format!("◈ Your points:  {}", w.human_score), Color::White, Color::Reset);
                self.front.put_str(8, row + 1, &format!("◈ Enemy points: {}", w.ai_score), Color::White, Color::Reset);
                row += 2;
            }
            Mode::Solo => {
                self.front.put_str(8, row, &format!("◈ Final Score: {}", w.human_score), Color::White, Color::Reset);
                row += 1;
            }
        }
        for (side, cause) in [(Side::Human, w.human_death), (Side::Ai, w.ai_death)] {
            if let Some(cause) = cause {
                let line = format!("  {side} died because it {cause}.");
                self.front.put_str(8, row, &line, Color::DarkGrey, Color::Reset);
                row += 1;
            }
        }

        row += 1;
        self.front.put_str(8, row, "▸ R / ENTER / Start: Play again", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
        self.front.put_str(8, row + 1, "▸ Q / ESC / Select:  Quit", Color::DarkGrey, Color::Reset);
    }
}

// ── Text lines ──

/// Scores and time, plus a marker for each dead snake that stays up for
/// the rest of the round.
fn hud_line(w: &WorldState) -> String {
    let mut hud = match w.mode {
        Mode::Versus => format!(
            " Score: {:<4}  Enemy Score: {:<4}  Time: {:>3}s ",
            w.human_score, w.ai_score, w.remaining_secs(),
        ),
        Mode::Solo => format!(" Score: {:<4}  Time: {:>3}s ", w.human_score, w.remaining_secs()),
    };
    if w.human_death.is_some() {
        hud.push_str(" Your Snake Died ");
    }
    if w.ai_death.is_some() {
        hud.push_str(" Enemy Snake Died ");
    }
    hud
}

fn help_line(pad: bool) -> &'static str {
    if pad {
        " ←↑↓→/WASD:Turn  Q/Esc:Quit  │  Pad: D-pad/Stick  Select:Quit"
    } else {
        " ←↑↓→/WASD:Turn  Q/Esc:Quit"
    }
}
