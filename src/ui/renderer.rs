/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The 600×800 world is scaled into a `Viewport` sized from the terminal.
/// A terminal cell is about twice as tall as it is wide, so the viewport
/// keeps `cols ≈ rows × 1.5` to preserve the world's proportions.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Rect;
use crate::domain::rules::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same explicit RGB for `Clear(ClearType::All)` and every
    /// cell's background keeps VTE inter-row gaps the same color as the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }

    /// Fill a rectangle of cells with a solid background.
    fn fill(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell::from_char(' ', Color::White, bg));
            }
        }
    }

    /// Fill one whole row with `bg`, then write `s` from the left edge.
    fn put_bar(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let w = self.width;
        self.fill(0, y, w, 1, bg);
        self.put_str(0, y, s, fg, bg);
    }
}

// ── Viewport: world units → terminal cells ──

/// Largest playfield height in rows; beyond this the field stops growing.
const MAX_VIEW_ROWS: usize = 40;

/// Vertical layout
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap above the field, gap + help bar below it.
const RESERVED_ROWS: usize = MAP_ROW + 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Viewport {
    /// Terminal column of the field's left edge.
    left: usize,
    /// Terminal row of the field's top edge.
    top: usize,
    cols: usize,
    rows: usize,
}

impl Viewport {
    fn fit(term_w: usize, term_h: usize) -> Self {
        let mut rows = term_h.saturating_sub(RESERVED_ROWS).clamp(1, MAX_VIEW_ROWS);
        let mut cols = rows * 3 / 2;
        if cols > term_w {
            cols = term_w.max(1);
            rows = (cols * 2 / 3).max(1);
        }
        Viewport {
            left: term_w.saturating_sub(cols) / 2,
            top: MAP_ROW,
            cols,
            rows,
        }
    }

    fn col_at(&self, x: f32) -> i64 {
        (x * self.cols as f32 / SCREEN_WIDTH).floor() as i64
    }

    fn row_at(&self, y: f32) -> i64 {
        (y * self.rows as f32 / SCREEN_HEIGHT).floor() as i64
    }

    /// Field-relative cell span covered by `rect`: (col, row, width, height).
    /// Every visible rect covers at least one cell. `None` when fully outside.
    fn span(&self, rect: &Rect) -> Option<(usize, usize, usize, usize)> {
        let c0 = self.col_at(rect.x);
        let r0 = self.row_at(rect.y);
        let c1 = (rect.right() * self.cols as f32 / SCREEN_WIDTH).ceil() as i64;
        let r1 = (rect.bottom() * self.rows as f32 / SCREEN_HEIGHT).ceil() as i64;
        let (c1, r1) = (c1.max(c0 + 1), r1.max(r0 + 1));

        let (c0, r0) = (c0.max(0), r0.max(0));
        let c1 = c1.min(self.cols as i64);
        let r1 = r1.min(self.rows as i64);
        if c0 >= c1 || r0 >= r1 {
            return None;
        }
        Some((c0 as usize, r0 as usize, (c1 - c0) as usize, (r1 - r0) as usize))
    }

    /// Terminal row for a world y inside the field, clamped to the field.
    fn screen_row(&self, y: f32) -> usize {
        self.top + (self.row_at(y).max(0) as usize).min(self.rows - 1)
    }
}

// ── Palette ──

const FIELD_BG: Color = Color::Black;
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const PLATFORM_BG: Color = Color::Rgb { r: 0, g: 117, b: 44 };
const PLAYER_BG: Color = Color::White;
const TITLE_FG: Color = Color::White;
const PROMPT_FG: Color = Color::Rgb { r: 130, g: 130, b: 130 };
const ACCENT_FG: Color = Color::Rgb { r: 255, g: 200, b: 50 };

const HELP_TEXT: &str =
    " SPACE:Jump  ←→/AD:Move  Esc/Q:Quit  │  Pad: A:Jump  D-pad:Move  Select:Quit";

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    keyboard_enhanced: bool,
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
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        // Release events make held movement keys exact where supported.
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }
        log::debug!("keyboard enhancement: {}", self.keyboard_enhanced);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    /// True when the terminal reports key Release events.
    pub fn reports_key_release(&self) -> bool {
        self.keyboard_enhanced
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.keyboard_enhanced = false;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.compose(world);

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // Do NOT use ResetColor here: it resets to the terminal's native
        // default, which may differ from BASE_BG and cause line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, w: &WorldState) {
        self.front.clear();
        let view = Viewport::fit(self.front.width, self.front.height);

        // Playfield background, shared by every screen.
        self.front.fill(view.left, view.top, view.cols, view.rows, FIELD_BG);

        match w.phase {
            Phase::Start => self.compose_start(&view),
            Phase::Playing => self.compose_game(w, &view),
            Phase::GameOver => self.compose_game_over(w, &view),
        }

        // ── Help bar ──
        let help_row = view.top + view.rows + 1;
        if help_row < self.front.height {
            self.front.put_str(0, help_row, HELP_TEXT, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_game(&mut self, w: &WorldState, view: &Viewport) {
        // ── HUD row ──
        let mut hud = format!(" Time: {:.2}   Best: {:.2}", w.survival_time, w.best_run);
        if !w.started {
            hud.push_str("   Jump to start falling!");
        }
        self.front.put_bar(HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Platforms ──
        for platform in &w.platforms {
            self.compose_rect(view, &platform.rect, PLATFORM_BG);
        }

        // ── Player (drawn last, on top) ──
        self.compose_rect(view, &w.player.rect, PLAYER_BG);
    }

    fn compose_rect(&mut self, view: &Viewport, rect: &Rect, bg: Color) {
        if let Some((col, row, cw, ch)) = view.span(rect) {
            self.front.fill(view.left + col, view.top + row, cw, ch, bg);
        }
    }

    // ── Static screens ──

    fn compose_start(&mut self, view: &Viewport) {
        let row = view.screen_row(200.0);
        self.put_centered(view, row, "ENDLESS FALLER", TITLE_FG);
        self.put_centered(view, (row + 2).max(view.screen_row(300.0)), "Press [SPACE] to Start", PROMPT_FG);
    }

    fn compose_game_over(&mut self, w: &WorldState, view: &Viewport) {
        let row = view.screen_row(200.0);
        self.put_centered(view, row, "GAME OVER", TITLE_FG);

        let time = format!("Time: {:.2}", w.last_run);
        let best = if w.last_run >= w.best_run && w.last_run > 0.0 {
            format!("Best: {:.2}  NEW!", w.best_run)
        } else {
            format!("Best: {:.2}", w.best_run)
        };
        self.put_centered(view, row + 2, &time, Color::White);
        self.put_centered(view, row + 3, &best, ACCENT_FG);
        self.put_centered(view, (row + 5).max(view.screen_row(300.0)), "Press [SPACE] to Retry", PROMPT_FG);
    }

    /// Centered text inside the playfield; rows past the field are dropped.
    fn put_centered(&mut self, view: &Viewport, row: usize, s: &str, fg: Color) {
        if row >= view.top + view.rows { return; }
        let len = s.chars().count();
        let x = view.left + view.cols.saturating_sub(len) / 2;
        self.front.put_str(x, row, s, fg, FIELD_BG);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    fn screen_contains(buf: &FrameBuffer, needle: &str) -> bool {
        (0..buf.height).any(|y| row_text(buf, y).contains(needle))
    }

    #[test]
    fn viewport_keeps_world_proportions() {
        let v = Viewport::fit(80, 24);
        assert_eq!((v.rows, v.cols), (20, 30));
        assert_eq!(v.left, 25);

        let v = Viewport::fit(200, 100);
        assert_eq!((v.rows, v.cols), (MAX_VIEW_ROWS, 60));

        // Narrow terminal: width limits the field.
        let v = Viewport::fit(30, 60);
        assert_eq!((v.cols, v.rows), (30, 20));
        assert_eq!(v.left, 0);
    }

    #[test]
    fn rect_span_scales_and_clips() {
        let v = Viewport::fit(200, 100); // 60×40: 10 world units per column, 20 per row
        let player = Rect::new(100.0, 750.0, 50.0, 50.0);
        assert_eq!(v.span(&player), Some((10, 37, 5, 3)));

        // Thin platform still covers one row.
        let plat = Rect::new(0.0, 20.0, 100.0, 20.0);
        assert_eq!(v.span(&plat), Some((0, 1, 10, 1)));

        // Recycled far right: off the field.
        let off = Rect::new(800.0, 10.0, 120.0, 20.0);
        assert_eq!(v.span(&off), None);

        // Straddling the right edge: clipped.
        let edge = Rect::new(550.0, 0.0, 150.0, 20.0);
        assert_eq!(v.span(&edge), Some((55, 0, 5, 1)));
    }

    #[test]
    fn start_screen_shows_title_and_prompt() {
        let mut r = renderer(80, 24);
        let w = WorldState::new(3);
        r.compose(&w);
        assert!(screen_contains(&r.front, "ENDLESS FALLER"));
        assert!(screen_contains(&r.front, "Press [SPACE] to Start"));
    }

    #[test]
    fn game_screen_draws_hud_player_and_platforms() {
        let mut r = renderer(80, 24);
        let mut w = WorldState::new(3);
        w.phase = Phase::Playing;
        w.survival_time = 12.345;
        w.started = true;
        r.compose(&w);

        assert!(row_text(&r.front, HUD_ROW).contains("Time: 12.35"));

        let view = Viewport::fit(80, 24);
        let (col, row, _, _) = view.span(&w.player.rect).unwrap();
        assert_eq!(r.front.get(view.left + col, view.top + row).bg, PLAYER_BG);

        let visible = w.platforms.iter().filter_map(|p| view.span(&p.rect)).next().unwrap();
        let (col, row, _, _) = visible;
        assert_eq!(r.front.get(view.left + col, view.top + row).bg, PLATFORM_BG);
    }

    #[test]
    fn game_over_screen_reports_run_and_best() {
        let mut r = renderer(80, 24);
        let mut w = WorldState::new(3);
        w.phase = Phase::Playing;
        w.survival_time = 4.5;
        w.end_run();
        r.compose(&w);
        assert!(screen_contains(&r.front, "GAME OVER"));
        assert!(screen_contains(&r.front, "Time: 4.50"));
        assert!(screen_contains(&r.front, "Best: 4.50"));
        assert!(screen_contains(&r.front, "Press [SPACE] to Retry"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut r = renderer(3, 2);
        let mut w = WorldState::new(3);
        for phase in [Phase::Start, Phase::Playing, Phase::GameOver] {
            w.phase = phase;
            r.compose(&w);
        }
    }
}
