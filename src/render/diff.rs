//! Frame differ and ANSI emitter
//!
//! Keeps a shadow copy of the last frame it put on the wire and emits only
//! what changed: cursor moves are elided while writes stay contiguous, SGR
//! is re-emitted only when the run's style differs from the last one sent,
//! and wide pairs are always rewritten from their left half so the sink
//! never sees a torn glyph.
//!
//! A frame whose dimensions or generation differ from the shadow invalidates
//! the comparison entirely and forces a full repaint.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::core::cell::{Cell, Color, StyleFlags};
use crate::core::grid::Grid;
use crate::render::color::{downsample, ColorMode};

/// What one frame cost on the wire.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderStats {
    pub bytes: usize,
    pub cells_redrawn: usize,
    pub full_repaint: bool,
    pub duration: Duration,
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Style {
    fg: Color,
    bg: Color,
    flags: StyleFlags,
}

impl Style {
    fn of(cell: &Cell, mode: ColorMode) -> Self {
        Self {
            fg: downsample(cell.fg, mode),
            bg: downsample(cell.bg, mode),
            flags: cell.flags,
        }
    }
}

/// Incremental ANSI renderer with a shadow grid.
pub struct DiffRenderer {
    shadow: Grid,
    seen_generation: Option<u64>,
    mode: ColorMode,
    buf: String,
}

impl DiffRenderer {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            shadow: Grid::new(0, 0),
            seen_generation: None,
            mode,
            buf: String::with_capacity(8192),
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        self.mode
    }

    /// Discard the shadow so the next frame repaints everything.
    pub fn invalidate(&mut self) {
        self.seen_generation = None;
    }

    /// Diff `frame` against the shadow, write the delta to `out`, and adopt
    /// `frame` as the new shadow.
    pub fn render(&mut self, frame: &Grid, out: &mut impl Write) -> io::Result<RenderStats> {
        let started = Instant::now();
        let full = self.seen_generation != Some(frame.generation())
            || self.shadow.size() != frame.size();
        self.buf.clear();

        let mut cells_redrawn = 0;
        // Wire-side cursor and style; None until the first explicit emit.
        let mut pos: Option<(u16, u16)> = None;
        let mut style: Option<Style> = None;

        if full {
            self.buf.push_str("\x1b[H\x1b[2J");
            pos = Some((0, 0));
        }

        let (cols, rows) = frame.size();
        for y in 0..rows {
            let mut x = 0;
            while x < cols {
                let cell = match frame.cell(x, y) {
                    Some(c) => c,
                    None => break,
                };
                let span = if cell.is_wide_left() { 2 } else { 1 };
                let dirty = full || self.span_differs(frame, x, y, span);
                if dirty {
                    if pos != Some((x, y)) {
                        let _ = write!(self.buf, "\x1b[{};{}H", y + 1, x + 1);
                    }
                    let next = Style::of(cell, self.mode);
                    if style != Some(next) {
                        emit_sgr(&mut self.buf, &next);
                        style = Some(next);
                    }
                    self.buf.push_str(cell.display());
                    pos = Some((x + span, y));
                    cells_redrawn += span as usize;
                }
                x += span;
            }
            // The wire cursor is unreliable across line ends.
            if let Some((px, _)) = pos {
                if px >= cols {
                    pos = None;
                }
            }
        }

        if cells_redrawn > 0 {
            self.buf.push_str("\x1b[0m");
        }

        out.write_all(self.buf.as_bytes())?;
        self.shadow = frame.clone();
        self.seen_generation = Some(frame.generation());

        Ok(RenderStats {
            bytes: self.buf.len(),
            cells_redrawn,
            full_repaint: full,
            duration: started.elapsed(),
        })
    }

    /// True when any column of the span differs from the shadow, including a
    /// wide pair whose halves changed independently.
    fn span_differs(&self, frame: &Grid, x: u16, y: u16, span: u16) -> bool {
        for dx in 0..span {
            let new = frame.cell(x + dx, y);
            let old = self.shadow.cell(x + dx, y);
            if match (new, old) {
                (Some(n), Some(o)) => n != o,
                _ => true,
            } {
                return true;
            }
        }
        false
    }
}

/// Build a complete SGR from scratch: reset, flags, colors. Rebuilding keeps
/// the emitter stateless with respect to attribute inheritance.
fn emit_sgr(buf: &mut String, style: &Style) {
    buf.push_str("\x1b[0");
    let flag_codes: [(StyleFlags, &str); 7] = [
        (StyleFlags::BOLD, "1"),
        (StyleFlags::ITALIC, "3"),
        (StyleFlags::UNDERLINE, "4"),
        (StyleFlags::DOUBLE_UNDERLINE, "21"),
        (StyleFlags::INVERT, "7"),
        (StyleFlags::STRIKE, "9"),
        (StyleFlags::OVERLINE, "53"),
    ];
    for (flag, code) in flag_codes {
        if style.flags.contains(flag) {
            buf.push(';');
            buf.push_str(code);
        }
    }
    emit_color(buf, style.fg, true);
    emit_color(buf, style.bg, false);
    buf.push('m');
}

fn emit_color(buf: &mut String, color: Color, foreground: bool) {
    match color {
        Color::Default => {}
        Color::Indexed(i) if i < 8 => {
            let base = if foreground { 30 } else { 40 };
            let _ = write!(buf, ";{}", base + i as u16);
        }
        Color::Indexed(i) if i < 16 => {
            let base = if foreground { 90 } else { 100 };
            let _ = write!(buf, ";{}", base + (i as u16 - 8));
        }
        Color::Indexed(i) => {
            let _ = write!(buf, ";{};5;{}", if foreground { 38 } else { 48 }, i);
        }
        Color::Rgba(r, g, b, _) => {
            let _ = write!(buf, ";{};2;{};{};{}", if foreground { 38 } else { 48 }, r, g, b);
        }
    }
}
