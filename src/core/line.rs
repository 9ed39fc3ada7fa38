//! Logical input lines
//!
//! A `Line` is one logical line of the scrollback: a monotonically assigned
//! id, a one-row grid holding its text run, a recorded cursor-placement
//! program (the locus) replayed on reflow, and wrap/alignment/direction
//! flags. `bossid` names the line that visually owns this screen-row slot
//! when a wrapped line above covers it; the invariant `bossid <= id` holds
//! at all times.

use super::cell::{Brush, Cell};
use super::grid::Grid;

/// Horizontal text justification. Only `Left` affects layout in this core;
/// the other variants are carried for the embedding layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// One recorded cursor-placement step, replayed to re-derive the caret
/// after a reflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocusOp {
    /// Caret to line start.
    Home,
    /// Caret past the last printed cell.
    Eol,
    /// Absolute column within the line.
    Chx(u16),
    /// Relative column movement.
    Rel(i32),
}

#[derive(Clone, Debug)]
pub struct Line {
    id: u32,
    /// Id of the line owning this screen-row slot; `bossid <= id`.
    pub bossid: u32,
    grid: Grid,
    /// Printed length in cells; the grid may be wider after erasures.
    len: u16,
    locus: Vec<LocusOp>,
    pub wrap: bool,
    pub align: Align,
    /// Simplified direction flag; no bidi resolution is performed.
    pub rtl: bool,
}

impl Line {
    pub fn new(id: u32, brush: &Brush) -> Self {
        Self {
            id,
            bossid: id,
            grid: Grid::with_marker(0, 1, brush.blank()),
            len: 0,
            locus: Vec::new(),
            wrap: true,
            align: Align::Left,
            rtl: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Printed length in cells.
    pub fn len(&self) -> u16 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wrapped row height at the given viewport width. An exact multiple of
    /// the width does not consume the trailing row until a character is
    /// actually placed there (deferred wrap).
    pub fn height(&self, width: u16) -> u16 {
        if !self.wrap || width == 0 || self.len == 0 {
            return 1;
        }
        ((self.len as u32 + width as u32 - 1) / width as u32) as u16
    }

    /// Cells of wrapped row `row` at `width`, as stored. May be shorter than
    /// `width` on the last row.
    pub fn wrapped_row(&self, row: u16, width: u16) -> &[Cell] {
        let start = (row as u32 * width as u32).min(self.len as u32) as u16;
        let end = ((row as u32 + 1) * width as u32).min(self.len as u32) as u16;
        &self.grid.row(0)[start as usize..end as usize]
    }

    /// Overwrite cells at absolute column `x`, growing the line as needed.
    pub fn write_at(&mut self, x: u16, run: &[Cell]) {
        let needed = x as u32 + run.len() as u32;
        let needed = needed.min(u16::MAX as u32) as u16;
        self.grid.ensure_cols(self.grid.cols().max(needed));
        self.grid.splice(0, x, run);
        self.len = self.len.max(needed);
    }

    /// Insert blanks at `x`, shifting cells right within `[x, limit)`.
    /// Cells pushed past `limit` are discarded, not wrapped.
    pub fn insert_at(&mut self, x: u16, n: u16, limit: u16, fill: &Cell) {
        if x >= limit {
            return;
        }
        self.grid.ensure_cols(limit);
        self.grid.insert_span(0, x, n, limit, fill);
        if self.len < limit {
            self.len = self.len.max(x).saturating_add(n).min(limit);
        }
    }

    /// Delete cells at `x`, shifting cells left within `[x, limit)` and
    /// back-filling with `fill`.
    pub fn delete_at(&mut self, x: u16, n: u16, limit: u16, fill: &Cell) {
        if x >= limit {
            return;
        }
        self.grid.ensure_cols(limit);
        self.grid.delete_span(0, x, n, limit, fill);
        if self.len <= limit && x < self.len {
            self.len = self.len.saturating_sub(n.min(self.len - x)).max(x);
        }
    }

    /// Overwrite `n` cells at `x` with `fill` without moving the tail,
    /// extending the printed length over the painted blanks.
    pub fn erase_at(&mut self, x: u16, n: u16, fill: &Cell) {
        let end = x.saturating_add(n);
        self.grid.ensure_cols(end);
        self.grid.erase(0, x, n, fill);
        self.len = self.len.max(end);
    }

    /// Drop everything at and after column `x`, restyling the padding so the
    /// vacated cells compose in the erasing brush.
    pub fn truncate(&mut self, x: u16, brush: &Brush) {
        self.grid.set_marker(brush.blank());
        if x < self.len {
            let blank = brush.blank();
            let len = self.len;
            self.grid.erase(0, x, len - x, &blank);
            self.len = x;
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.grid.row(0)[..self.len as usize]
    }

    /// Fold a combining mark into the cell at column `x`.
    pub fn append_combining(&mut self, x: u16, ch: char) {
        if x < self.len {
            if let Some(cell) = self.grid.cell_mut(x, 0) {
                cell.cluster.push(ch);
            }
        }
    }

    /// The style used to pad this line's short rows during compose.
    pub fn marker(&self) -> &Cell {
        self.grid.marker()
    }

    /// Drop all content and restyle the padding from `brush`, keeping the
    /// id. Lines are destroyed only by eviction, never by erasure.
    pub fn clear_with(&mut self, brush: &Brush) {
        self.grid.set_marker(brush.blank());
        let len = self.len;
        if len > 0 {
            let blank = brush.blank();
            self.grid.erase(0, 0, len, &blank);
        }
        self.len = 0;
        self.locus.clear();
    }

    /// Record a cursor-placement step for reflow replay.
    pub fn push_locus(&mut self, op: LocusOp) {
        self.locus.push(op);
    }

    /// Replay the recorded placement program against a new width, returning
    /// the caret column it lands on.
    pub fn replay_locus(&self, width: u16) -> u16 {
        let mut x: u32 = self.len as u32;
        for op in &self.locus {
            match *op {
                LocusOp::Home => x = 0,
                LocusOp::Eol => x = self.len as u32,
                LocusOp::Chx(col) => x = col as u32,
                LocusOp::Rel(dx) => {
                    x = (x as i64 + dx as i64).max(0) as u32;
                }
            }
        }
        let limit = if self.wrap {
            self.len as u32
        } else {
            width.saturating_sub(1) as u32
        };
        x.min(limit) as u16
    }

    /// Commit pending state before the line stops being current.
    pub fn finalize(&mut self) {
        self.locus.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::WidthClass;

    fn text_run(brush: &Brush, s: &str) -> Vec<Cell> {
        s.chars()
            .map(|ch| brush.styled(&ch.to_string(), WidthClass::Narrow))
            .collect()
    }

    #[test]
    fn height_uses_deferred_wrap() {
        let brush = Brush::default();
        let mut line = Line::new(1, &brush);
        assert_eq!(line.height(80), 1);
        line.write_at(0, &text_run(&brush, &"x".repeat(80)));
        // Exactly one row worth of text does not claim a second row.
        assert_eq!(line.height(80), 1);
        line.write_at(80, &text_run(&brush, "y"));
        assert_eq!(line.height(80), 2);
    }

    #[test]
    fn unwrapped_lines_are_one_row_tall() {
        let brush = Brush::default();
        let mut line = Line::new(1, &brush);
        line.wrap = false;
        line.write_at(0, &text_run(&brush, &"x".repeat(200)));
        assert_eq!(line.height(80), 1);
    }

    #[test]
    fn truncate_shortens_printed_length() {
        let brush = Brush::default();
        let mut line = Line::new(1, &brush);
        line.write_at(0, &text_run(&brush, "hello world"));
        line.truncate(5, &brush);
        assert_eq!(line.len(), 5);
        assert_eq!(line.height(80), 1);
        assert_eq!(line.cells()[4].cluster, "o");
    }

    #[test]
    fn locus_replay_clamps_to_length() {
        let brush = Brush::default();
        let mut line = Line::new(1, &brush);
        line.write_at(0, &text_run(&brush, "abcdef"));
        line.push_locus(LocusOp::Home);
        line.push_locus(LocusOp::Rel(4));
        assert_eq!(line.replay_locus(80), 4);
        line.push_locus(LocusOp::Chx(100));
        assert_eq!(line.replay_locus(80), 6);
    }
}
