//! GameView: maps board snapshots into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! A *panel* is one board: a title row, the bordered well and a side column
//! with the next piece and stats. Versus screens place two panels side by
//! side with an optional banner line underneath.

use crate::core::pieces::Shape;
use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Cell, PieceKind};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// One board plus the labels drawn around it.
#[derive(Debug, Clone, Copy)]
pub struct BoardPanel<'a> {
    pub title: &'a str,
    pub snap: &'a GameSnapshot,
    /// Text over the middle of the well, e.g. "WINNER"
    pub overlay: Option<&'a str>,
}

impl<'a> BoardPanel<'a> {
    pub fn new(title: &'a str, snap: &'a GameSnapshot) -> Self {
        Self {
            title,
            snap,
            overlay: None,
        }
    }

    pub fn with_overlay(mut self, overlay: Option<&'a str>) -> Self {
        self.overlay = overlay;
        self
    }
}

/// Columns used by the side column, including the gap to the well.
const SIDE_W: u16 = 12;
/// Columns between two panels.
const PANEL_GAP: u16 = 4;
/// Flash toggles during a line clear.
const CLEAR_FLASHES: f32 = 6.0;

const WELL_BG: Rgb = Rgb::new(30, 30, 40);
const GARBAGE_FG: Rgb = Rgb::new(128, 128, 128);

/// A lightweight terminal renderer for versus boards.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Size of the bordered well for a snapshot.
    pub fn well_size(&self, snap: &GameSnapshot) -> (u16, u16) {
        (
            u16::from(snap.width) * self.cell_w + 2,
            u16::from(snap.height) * self.cell_h + 2,
        )
    }

    /// Size of a full panel: title row, well and side column.
    pub fn panel_size(&self, snap: &GameSnapshot) -> (u16, u16) {
        let (w, h) = self.well_size(snap);
        (w + SIDE_W, h + 1)
    }

    /// Render a single board centered in the viewport.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.clear(viewport, fb);
        let (w, h) = self.panel_size(snap);
        let x = viewport.width.saturating_sub(w) / 2;
        let y = self.origin_y(viewport, h);
        let overlay = snap.game_over.then_some("GAME OVER");
        self.draw_panel(fb, x, y, BoardPanel::new("", snap).with_overlay(overlay));
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    /// Render two panels side by side with an optional banner below them.
    pub fn render_versus_into(
        &self,
        left: BoardPanel<'_>,
        right: BoardPanel<'_>,
        banner: Option<&str>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        self.clear(viewport, fb);

        let (lw, lh) = self.panel_size(left.snap);
        let (rw, rh) = self.panel_size(right.snap);
        let total_w = lw + PANEL_GAP + rw;
        let total_h = lh.max(rh) + 2;

        let x = viewport.width.saturating_sub(total_w) / 2;
        let y = self.origin_y(viewport, total_h);

        self.draw_panel(fb, x, y, left);
        self.draw_panel(fb, x + lw + PANEL_GAP, y, right);

        if let Some(text) = banner {
            let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
            let banner_y = y.saturating_add(lh.max(rh)).saturating_add(1);
            fb.put_str_centered(0, viewport.width, banner_y, text, style);
        }
    }

    pub fn render_versus(
        &self,
        left: BoardPanel<'_>,
        right: BoardPanel<'_>,
        banner: Option<&str>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_versus_into(left, right, banner, viewport, &mut fb);
        fb
    }

    /// Render centered text lines, used for lobby and waiting screens.
    pub fn render_message_into<S: AsRef<str>>(
        &self,
        lines: &[S],
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        self.clear(viewport, fb);
        let h = lines.len().min(u16::MAX as usize) as u16;
        let y = viewport.height.saturating_sub(h) / 2;
        let title = CellStyle::default().bold();
        let body = CellStyle::default();
        for (i, line) in lines.iter().enumerate() {
            let style = if i == 0 { title } else { body };
            fb.put_str_centered(0, viewport.width, y + i as u16, line.as_ref(), style);
        }
    }

    /// Draw one panel with its top-left corner at (`x`, `y`).
    pub fn draw_panel(&self, fb: &mut FrameBuffer, x: u16, y: u16, panel: BoardPanel<'_>) {
        let snap = panel.snap;
        let (frame_w, frame_h) = self.well_size(snap);

        let title = CellStyle::default().bold();
        fb.put_str_centered(x, frame_w, y, panel.title, title);

        let wx = x;
        let wy = y + 1;

        let bg = CellStyle::new(Rgb::new(80, 80, 90), WELL_BG);
        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.fill_rect(wx + 1, wy + 1, frame_w - 2, frame_h - 2, ' ', bg);
        fb.draw_box(wx, wy, frame_w, frame_h, border);

        let flash = clear_flash_on(snap.clear_fraction);

        for by in 0..snap.height as usize {
            let clearing = snap.is_clearing_row(by);
            for bx in 0..snap.width as usize {
                let (cx, cy) = (bx as u16, by as u16);
                if clearing && flash {
                    let style = CellStyle::new(Rgb::new(255, 255, 255), WELL_BG).bold();
                    self.fill_cell_rect(fb, wx, wy, cx, cy, '█', style);
                    continue;
                }
                match snap.cell(bx, by) {
                    Cell::Block(kind) => self.draw_block(fb, wx, wy, cx, cy, piece_color(kind)),
                    Cell::Garbage => self.draw_block(fb, wx, wy, cx, cy, GARBAGE_FG),
                    Cell::Empty => self.draw_empty_cell(fb, wx, wy, cx, cy),
                }
            }
        }

        if let (Some(active), Some(ghost_y)) = (snap.active.as_ref(), snap.ghost_row) {
            let ghost_style = CellStyle::new(Rgb::new(140, 140, 140), WELL_BG).dim();
            for (dx, dy) in active.shape.minos() {
                let gx = i16::from(active.x) + i16::from(dx);
                let gy = i16::from(ghost_y) + i16::from(dy);
                if let Some((cx, cy)) = in_well(snap, gx, gy) {
                    if !snap.active_covers(cx as usize, cy as usize) {
                        self.fill_cell_rect(fb, wx, wy, cx, cy, '░', ghost_style);
                    }
                }
            }
        }

        if let Some(active) = snap.active.as_ref() {
            let color = piece_color(active.kind);
            for (ax, ay) in active.cells() {
                if let Some((cx, cy)) = in_well(snap, ax, ay) {
                    self.draw_block(fb, wx, wy, cx, cy, color);
                }
            }
        }

        self.draw_side_column(fb, wx + frame_w + 2, wy, snap);

        if let Some(text) = panel.overlay {
            let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
            let mid_y = wy.saturating_add(frame_h / 2);
            fb.put_str_centered(wx, frame_w, mid_y, text, style);
        }
    }

    fn clear(&self, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));
    }

    fn origin_y(&self, viewport: Viewport, content_h: u16) -> u16 {
        match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(content_h) / 2,
            AnchorY::Top => 0,
        }
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, wx: u16, wy: u16, x: u16, y: u16) {
        let style = CellStyle::new(Rgb::new(90, 90, 100), WELL_BG).dim();
        self.fill_cell_rect(fb, wx, wy, x, y, '·', style);
    }

    fn draw_block(&self, fb: &mut FrameBuffer, wx: u16, wy: u16, x: u16, y: u16, fg: Rgb) {
        let style = CellStyle::new(fg, WELL_BG).bold();
        self.fill_cell_rect(fb, wx, wy, x, y, '█', style);
    }

    fn fill_cell_rect(
        &self,
        fb: &mut FrameBuffer,
        wx: u16,
        wy: u16,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: CellStyle,
    ) {
        let px = wx + 1 + cell_x * self.cell_w;
        let py = wy + 1 + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_column(&self, fb: &mut FrameBuffer, x: u16, y: u16, snap: &GameSnapshot) {
        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let mut y = y;
        fb.put_str(x, y, "NEXT", label);
        y += 1;
        if let Some(kind) = snap.next {
            let shape = Shape::base(kind);
            let style = CellStyle::new(piece_color(kind), Rgb::new(0, 0, 0)).bold();
            for (dx, dy) in shape.minos() {
                let px = x + dx as u16 * 2;
                let py = y + dy as u16;
                fb.put_str(px, py, "██", style);
            }
        }
        y += 5;

        for (name, v) in [("SCORE", snap.score), ("LEVEL", snap.level), ("LINES", snap.lines)] {
            fb.put_str(x, y, name, label);
            fb.put_u32(x, y + 1, v, value);
            y += 3;
        }

        if snap.pending_garbage > 0 {
            let warn = CellStyle::new(Rgb::new(230, 90, 90), Rgb::new(0, 0, 0)).bold();
            fb.put_str(x, y, "INCOMING", warn);
            fb.put_u32(x, y + 1, snap.pending_garbage, warn);
        }
    }
}

/// Whether clearing rows are drawn highlighted at this point of the animation.
///
/// `fraction` counts down from 1 to 0; the rows alternate between highlighted
/// and their normal look.
pub fn clear_flash_on(fraction: f32) -> bool {
    let elapsed = (1.0 - fraction.clamp(0.0, 1.0)) * CLEAR_FLASHES;
    (elapsed as u32) % 2 == 0
}

pub fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(80, 220, 220),
        PieceKind::O => Rgb::new(240, 220, 80),
        PieceKind::T => Rgb::new(200, 120, 220),
        PieceKind::S => Rgb::new(100, 220, 120),
        PieceKind::Z => Rgb::new(220, 80, 80),
        PieceKind::J => Rgb::new(80, 120, 220),
        PieceKind::L => Rgb::new(255, 165, 0),
    }
}

fn in_well(snap: &GameSnapshot, x: i16, y: i16) -> Option<(u16, u16)> {
    if x < 0 || y < 0 || x >= i16::from(snap.width) || y >= i16::from(snap.height) {
        return None;
    }
    Some((x as u16, y as u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_alternates_over_the_clear() {
        assert!(clear_flash_on(1.0));
        assert!(!clear_flash_on(0.8));
        assert!(clear_flash_on(0.6));
        assert!(!clear_flash_on(0.4));
    }

    #[test]
    fn panel_size_tracks_board_dimensions() {
        let view = GameView::default();
        let snap = GameSnapshot::empty(10, 20);
        assert_eq!(view.well_size(&snap), (22, 22));
        assert_eq!(view.panel_size(&snap), (22 + SIDE_W, 23));

        let small = GameSnapshot::empty(6, 8);
        assert_eq!(view.well_size(&small), (14, 10));
    }

    #[test]
    fn garbage_is_drawn_gray() {
        let view = GameView::default().with_anchor_y(AnchorY::Top);
        let mut snap = GameSnapshot::empty(4, 4);
        snap.cells[3 * 4] = Cell::Garbage;
        let mut fb = FrameBuffer::new(40, 10);
        view.draw_panel(&mut fb, 0, 0, BoardPanel::new("P1", &snap));

        // Title row, then the top border, then board rows.
        let cell = fb.get(1, 1 + 1 + 3);
        assert_eq!(cell.map(|c| c.ch), Some('█'));
        assert_eq!(cell.map(|c| c.style.fg), Some(GARBAGE_FG));
    }
}
