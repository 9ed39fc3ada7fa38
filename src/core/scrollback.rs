//! Scrollback store
//!
//! An ordered sequence of logical lines, appended at the tail and evicted at
//! the head once a caller-supplied capacity is exceeded. There is one line
//! per screen-row slot; a line whose wrapped height is `h` covers the `h-1`
//! slots below it, and the covered lines' `bossid` names the coverer. The
//! `basis` maps viewport row 0 to a line index and only moves forward as new
//! content is appended past the visible window.
//!
//! All caret movement, scrolling, erasure, and printing mutations live here;
//! the interpreter translates decoded VT commands into these calls.

use std::collections::VecDeque;

use super::cell::{Brush, Cell, WidthClass};
use super::grid::Grid;
use super::line::{Line, LocusOp};

/// 2-D caret in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Caret {
    pub x: u16,
    pub y: u16,
    /// Deferred wrap: the last column was filled but the wrap has not been
    /// taken yet.
    pub pending_wrap: bool,
}

/// Ordered line store with viewport mapping and scroll-region state.
#[derive(Debug)]
pub struct Store {
    lines: VecDeque<Line>,
    next_id: u32,
    basis: usize,
    width: u16,
    height: u16,
    /// Scroll region bounds, 1-based; 0 means "use the viewport edge".
    top: u16,
    bottom: u16,
    capacity: usize,
    caret: Caret,
}

impl Store {
    pub fn new(width: u16, height: u16, capacity: usize, brush: &Brush) -> Self {
        // Same floor as resize: a store always has at least one column and
        // one row.
        let width = width.max(1);
        let height = height.max(1);
        let mut store = Self {
            lines: VecDeque::new(),
            next_id: 0,
            basis: 0,
            width,
            height,
            top: 0,
            bottom: 0,
            capacity: capacity.max(height as usize),
            caret: Caret::default(),
        };
        for _ in 0..height {
            let line = store.fresh_line(brush);
            store.lines.push_back(line);
        }
        store
    }

    fn fresh_line(&mut self, brush: &Brush) -> Line {
        let id = self.next_id;
        self.next_id += 1;
        Line::new(id, brush)
    }

    pub fn count(&self) -> usize {
        self.lines.len()
    }

    pub fn basis(&self) -> usize {
        self.basis
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    fn slot(&self, y: u16) -> usize {
        self.basis + y as usize
    }

    /// Scroll-region bounds as 0-based viewport rows, clamped.
    pub fn region_rows(&self) -> (u16, u16) {
        let max = self.height.saturating_sub(1);
        let top = if self.top == 0 { 0 } else { (self.top - 1).min(max) };
        let bottom = if self.bottom == 0 { max } else { (self.bottom - 1).min(max) };
        if top <= bottom {
            (top, bottom)
        } else {
            (0, max)
        }
    }

    /// True when a scroll region narrower than the viewport is in force.
    fn region_defined(&self) -> bool {
        self.top != 0 || self.bottom != 0
    }

    /// Set the scroll region from 1-based DECSTBM arguments. A full-viewport
    /// or degenerate region resets to "undefined" so ordinary line feeds at
    /// the bottom grow the scrollback again.
    pub fn set_region(&mut self, top: u16, bottom: u16) {
        let top = top.min(self.height);
        let bottom = if bottom == 0 { self.height } else { bottom.min(self.height) };
        if top <= 1 && bottom >= self.height {
            self.top = 0;
            self.bottom = 0;
        } else if top < bottom {
            self.top = top.max(1);
            self.bottom = bottom;
        }
    }

    /// The index of the line owning `slot` (itself, unless covered by a
    /// wrapped line above).
    fn owner_index(&self, slot: usize) -> usize {
        let boss = self.lines[slot].bossid;
        if boss == self.lines[slot].id() {
            return slot;
        }
        let mut i = slot;
        while i > 0 {
            i -= 1;
            if self.lines[i].id() == boss {
                return i;
            }
        }
        // Stale bossid; self-ownership is the safe repair.
        tracing::warn!(slot, boss, "dangling row ownership repaired");
        slot
    }

    /// Recompute `bossid` for every slot from the boss covering `from`
    /// downward, so exactly one line owns each screen row.
    fn rebuild_ownership(&mut self, from: usize) {
        if self.lines.is_empty() {
            return;
        }
        let mut start = from.min(self.lines.len() - 1);
        while start > 0 && self.lines[start].bossid != self.lines[start].id() {
            start -= 1;
        }
        let mut j = start;
        while j < self.lines.len() {
            let id = self.lines[j].id();
            let h = self.lines[j].height(self.width) as usize;
            let extent = (j + h).min(self.lines.len());
            self.lines[j].bossid = id;
            for k in j + 1..extent {
                self.lines[k].bossid = id;
            }
            j = extent.max(j + 1);
        }
    }

    /// Append a fresh line at the tail, advancing the basis and evicting
    /// from the head once over capacity.
    fn push_line(&mut self, brush: &Brush) {
        let line = self.fresh_line(brush);
        self.lines.push_back(line);
        while self.lines.len() > self.capacity && self.lines.len() > self.height as usize {
            self.lines.pop_front();
        }
        self.basis = self.lines.len().saturating_sub(self.height as usize);
    }

    // ------------------------------------------------------------------
    // Caret movement
    // ------------------------------------------------------------------

    pub fn caret_up(&mut self, n: u16) {
        self.caret.y = self.caret.y.saturating_sub(n);
        self.caret.pending_wrap = false;
    }

    pub fn caret_down(&mut self, n: u16) {
        self.caret.y = self.caret.y.saturating_add(n).min(self.height.saturating_sub(1));
        self.caret.pending_wrap = false;
    }

    pub fn caret_right(&mut self, n: u16) {
        self.caret.x = self.caret.x.saturating_add(n).min(self.width.saturating_sub(1));
        self.caret.pending_wrap = false;
        self.record_locus(LocusOp::Rel(n as i32));
    }

    pub fn caret_left(&mut self, n: u16) {
        self.caret.x = self.caret.x.saturating_sub(n);
        self.caret.pending_wrap = false;
        self.record_locus(LocusOp::Rel(-(n as i32)));
    }

    /// Absolute column, 0-based.
    pub fn caret_chx(&mut self, x: u16) {
        self.caret.x = x.min(self.width.saturating_sub(1));
        self.caret.pending_wrap = false;
        self.record_locus(LocusOp::Chx(x));
    }

    /// Absolute row, 0-based.
    pub fn caret_chy(&mut self, y: u16) {
        self.caret.y = y.min(self.height.saturating_sub(1));
        self.caret.pending_wrap = false;
    }

    pub fn caret_home(&mut self) {
        self.caret.x = 0;
        self.caret.pending_wrap = false;
        self.record_locus(LocusOp::Home);
    }

    pub fn caret_eol(&mut self) {
        let line = &self.lines[self.cur_owner()];
        let len = line.len();
        self.caret.x = (len % self.width.max(1)).min(self.width.saturating_sub(1));
        self.caret.pending_wrap = false;
        self.record_locus(LocusOp::Eol);
    }

    pub fn caret_goto(&mut self, x: u16, y: u16) {
        self.caret_chy(y);
        self.caret_chx(x);
    }

    fn record_locus(&mut self, op: LocusOp) {
        let owner = self.cur_owner();
        self.lines[owner].push_locus(op);
    }

    fn cur_owner(&self) -> usize {
        let slot = self.slot(self.caret.y).min(self.lines.len().saturating_sub(1));
        self.owner_index(slot)
    }

    /// Absolute column within the owner line for the current caret.
    fn abs_column(&self) -> (usize, u16) {
        let slot = self.slot(self.caret.y).min(self.lines.len().saturating_sub(1));
        let owner = self.owner_index(slot);
        let row_within = (slot - owner) as u32;
        let abs = row_within * self.width as u32 + self.caret.x as u32;
        (owner, abs.min(u16::MAX as u32) as u16)
    }

    // ------------------------------------------------------------------
    // Vertical motion with scrolling
    // ------------------------------------------------------------------

    /// Line feed: caret down one row; at the bottom of a defined region the
    /// region scrolls, at the viewport bottom the scrollback grows.
    pub fn line_feed(&mut self, brush: &Brush) {
        let (_, rbot) = self.region_rows();
        self.caret.pending_wrap = false;
        if self.caret.y == rbot {
            if self.region_defined() {
                self.scroll(-1, brush);
            } else {
                self.push_line(brush);
            }
        } else if self.caret.y < self.height.saturating_sub(1) {
            self.caret.y += 1;
        }
    }

    /// Reverse index: caret up one row, scrolling the region down at its top
    /// boundary. Never creates or evicts lines beyond what scrolling does.
    pub fn reverse_index(&mut self, brush: &Brush) {
        let (rtop, _) = self.region_rows();
        if self.caret.y == rtop {
            self.scroll(1, brush);
        } else {
            self.caret_up(1);
        }
    }

    /// Move the region band by `n` slots: positive scrolls content down
    /// (vacating the top of the band), negative scrolls content up. Vacated
    /// slots are filled with blank lines carrying the previous occupant's
    /// owning id until the ownership rebuild settles them.
    pub fn scroll(&mut self, n: i32, brush: &Brush) {
        let (rtop, rbot) = self.region_rows();
        self.scroll_rows(rtop, rbot, n, brush);
    }

    fn scroll_rows(&mut self, rtop: u16, rbot: u16, n: i32, brush: &Brush) {
        if n == 0 || rtop > rbot {
            return;
        }
        let a = self.slot(rtop);
        let b = self.slot(rbot);
        if b >= self.lines.len() {
            return;
        }
        let span = b - a + 1;
        let shift = (n.unsigned_abs() as usize).min(span);
        let inherited = if n > 0 {
            self.lines[a].bossid
        } else {
            self.lines[b].bossid
        };
        if n > 0 {
            // Content moves down: the bottom of the band falls off.
            self.lines.drain(b + 1 - shift..=b);
            for _ in 0..shift {
                let mut blank = self.fresh_line(brush);
                blank.bossid = inherited.min(blank.id());
                self.lines.insert(a, blank);
            }
        } else {
            // Content moves up: the top of the band falls off.
            self.lines.drain(a..a + shift);
            for i in 0..shift {
                let mut blank = self.fresh_line(brush);
                blank.bossid = inherited.min(blank.id());
                self.lines.insert(b + 1 - shift + i, blank);
            }
        }
        self.caret.pending_wrap = false;
        self.rebuild_ownership(a);
    }

    /// Insert `n` blank rows at the caret by narrowing the scroll region to
    /// start at the caret row and scrolling down. Caret column ends at 0.
    pub fn insert_lines(&mut self, n: u16, brush: &Brush) {
        let (rtop, rbot) = self.region_rows();
        if self.caret.y >= rtop && self.caret.y <= rbot {
            self.scroll_rows(self.caret.y, rbot, n as i32, brush);
        }
        self.caret.x = 0;
        self.caret.pending_wrap = false;
    }

    /// Delete `n` rows at the caret; the same scroll primitive, inverted.
    pub fn delete_lines(&mut self, n: u16, brush: &Brush) {
        let (rtop, rbot) = self.region_rows();
        if self.caret.y >= rtop && self.caret.y <= rbot {
            self.scroll_rows(self.caret.y, rbot, -(n as i32), brush);
        }
        self.caret.x = 0;
        self.caret.pending_wrap = false;
    }

    // ------------------------------------------------------------------
    // Printing
    // ------------------------------------------------------------------

    /// Print one grapheme cluster at the caret using `brush`, honoring
    /// deferred wrap. Wide glyphs never straddle a row boundary: if only one
    /// column remains the wrap is taken first.
    pub fn print_cluster(&mut self, cluster: &str, brush: &Brush, autowrap: bool) {
        let Some(first) = cluster.chars().next() else {
            return;
        };
        let width = WidthClass::of_char(first);
        if width == WidthClass::Zero {
            self.append_combining(first);
            return;
        }
        let cols = width.columns();
        // A taken wrap continues the logical line: the glyph lands at the
        // next wrapped row of the pre-wrap owner, not in the slot's own line.
        let mut continued: Option<(u32, u16)> = None;
        if self.caret.pending_wrap || (cols == 2 && self.caret.x + 1 >= self.width) {
            if autowrap && self.caret.pending_wrap {
                continued = Some(self.wrap_target());
                self.take_wrap(brush);
            } else if autowrap && cols == 2 {
                // Early wrap so the pair stays on one row.
                continued = Some(self.wrap_target());
                self.caret.pending_wrap = true;
                self.take_wrap(brush);
            } else {
                self.caret.x = self.width.saturating_sub(cols.max(1));
                self.caret.pending_wrap = false;
            }
        }
        let run: Vec<Cell> = match width {
            WidthClass::WideLeft => vec![
                brush.styled(cluster, WidthClass::WideLeft),
                brush.styled("", WidthClass::WideRight),
            ],
            _ => vec![brush.styled(cluster, WidthClass::Narrow)],
        };
        let (owner, abs) = match continued {
            // The wrap may have scrolled or evicted; re-find the owner by id.
            Some((id, abs)) => match self.index_of(id) {
                Some(owner) => (owner, abs),
                None => self.abs_column(),
            },
            None => self.abs_column(),
        };
        let old_height = self.lines[owner].height(self.width);
        self.lines[owner].write_at(abs, &run);
        let new_height = self.lines[owner].height(self.width);
        if new_height != old_height {
            self.cover_tail(owner, brush);
            self.rebuild_ownership(owner);
        }
        let next = self.caret.x.saturating_add(cols);
        if next >= self.width {
            self.caret.x = self.width.saturating_sub(1);
            self.caret.pending_wrap = autowrap;
        } else {
            self.caret.x = next;
        }
    }

    /// Owner id and the absolute column where a taken wrap continues it:
    /// column 0 of the wrapped row below the caret's.
    fn wrap_target(&self) -> (u32, u16) {
        let (owner, abs) = self.abs_column();
        let w = self.width.max(1) as u32;
        let next = (abs as u32 / w + 1) * w;
        (self.lines[owner].id(), next.min(u16::MAX as u32) as u16)
    }

    fn index_of(&self, id: u32) -> Option<usize> {
        self.lines.iter().rposition(|line| line.id() == id)
    }

    /// Take the deferred wrap: caret to column 0 of the next row, growing
    /// the store if the owner line extends past the tail.
    fn take_wrap(&mut self, brush: &Brush) {
        self.caret.x = 0;
        self.caret.pending_wrap = false;
        let (_, rbot) = self.region_rows();
        if self.caret.y == rbot && self.region_defined() {
            self.scroll(-1, brush);
        } else if self.caret.y == self.height.saturating_sub(1) {
            self.push_line(brush);
        } else {
            self.caret.y += 1;
        }
    }

    /// Make sure every slot covered by `owner` exists, appending blank tail
    /// lines when a wrapped line grows past the end of the store.
    fn cover_tail(&mut self, owner: usize, brush: &Brush) {
        let extent = owner + self.lines[owner].height(self.width) as usize;
        while self.lines.len() < extent {
            self.push_line(brush);
        }
    }

    fn append_combining(&mut self, ch: char) {
        let (owner, abs) = self.abs_column();
        if abs > 0 {
            self.lines[owner].append_combining(abs - 1, ch);
        }
    }

    // ------------------------------------------------------------------
    // Row-local character edits (ich/dch/ech)
    // ------------------------------------------------------------------

    /// Bounds of the caret's screen row inside the owner line.
    fn row_span(&self) -> (usize, u16, u16) {
        let slot = self.slot(self.caret.y).min(self.lines.len().saturating_sub(1));
        let owner = self.owner_index(slot);
        let row_within = (slot - owner) as u32;
        let start = (row_within * self.width as u32).min(u16::MAX as u32) as u16;
        (owner, start, start.saturating_add(self.width))
    }

    pub fn insert_chars(&mut self, n: u16, brush: &Brush) {
        let (owner, start, end) = self.row_span();
        let x = start.saturating_add(self.caret.x);
        let fill = brush.blank();
        self.lines[owner].insert_at(x, n, end, &fill);
        self.caret.pending_wrap = false;
    }

    pub fn delete_chars(&mut self, n: u16, brush: &Brush) {
        let (owner, start, end) = self.row_span();
        let x = start.saturating_add(self.caret.x);
        let fill = brush.blank();
        self.lines[owner].delete_at(x, n, end, &fill);
        self.caret.pending_wrap = false;
    }

    pub fn erase_chars(&mut self, n: u16, brush: &Brush) {
        let (owner, start, end) = self.row_span();
        let x = start.saturating_add(self.caret.x);
        let n = n.min(end.saturating_sub(x));
        let fill = brush.blank();
        self.lines[owner].erase_at(x, n, &fill);
        self.caret.pending_wrap = false;
    }

    // ------------------------------------------------------------------
    // Erase in line / display
    // ------------------------------------------------------------------

    /// Erase-in-line, codes: 0 = right, 1 = left, 2 = all.
    pub fn erase_line(&mut self, code: u16, brush: &Brush) {
        let (owner, start, end) = self.row_span();
        let x = start.saturating_add(self.caret.x);
        let last_row = end >= self.lines[owner].len();
        let fill = brush.blank();
        match code {
            0 => {
                if last_row {
                    let old = self.lines[owner].height(self.width);
                    self.lines[owner].truncate(x, brush);
                    if self.lines[owner].height(self.width) != old {
                        self.rebuild_ownership(owner);
                    }
                } else {
                    self.lines[owner].erase_at(x, end - x, &fill);
                }
            }
            1 => {
                self.lines[owner].erase_at(start, self.caret.x + 1, &fill);
            }
            2 => {
                if last_row && start == 0 {
                    self.lines[owner].clear_with(brush);
                    self.rebuild_ownership(owner);
                } else if last_row {
                    let old = self.lines[owner].height(self.width);
                    self.lines[owner].truncate(start, brush);
                    if self.lines[owner].height(self.width) != old {
                        self.rebuild_ownership(owner);
                    }
                } else {
                    self.lines[owner].erase_at(start, self.width, &fill);
                }
            }
            _ => tracing::debug!(code, "ignoring unknown erase-in-line code"),
        }
        self.caret.pending_wrap = false;
    }

    /// Erase-in-display, codes: 0 = below, 1 = above, 2 = viewport,
    /// 3 = scrollback history. Caret position is not changed by any code.
    pub fn erase_display(&mut self, code: u16, brush: &Brush) {
        match code {
            0 => {
                self.erase_line(0, brush);
                for y in self.caret.y + 1..self.height {
                    self.clear_row(y, brush);
                }
                self.rebuild_ownership(self.slot(self.caret.y.saturating_sub(0)));
            }
            1 => {
                for y in 0..self.caret.y {
                    self.clear_row(y, brush);
                }
                self.erase_line(1, brush);
                self.rebuild_ownership(self.basis);
            }
            2 => {
                for y in 0..self.height {
                    self.clear_row(y, brush);
                }
                self.rebuild_ownership(self.basis);
            }
            3 => {
                self.lines.drain(..self.basis);
                self.basis = 0;
            }
            _ => tracing::debug!(code, "ignoring unknown erase-in-display code"),
        }
        self.caret.pending_wrap = false;
    }

    /// Blank one viewport row, re-deriving its ownership chain: a row owned
    /// by a wrapped line above has that line's span blanked instead of the
    /// slot's own line.
    fn clear_row(&mut self, y: u16, brush: &Brush) {
        let slot = self.slot(y).min(self.lines.len().saturating_sub(1));
        let owner = self.owner_index(slot);
        if owner == slot {
            self.lines[slot].clear_with(brush);
        } else {
            let start = ((slot - owner) as u32 * self.width as u32).min(u16::MAX as u32) as u16;
            let last_row = start.saturating_add(self.width) >= self.lines[owner].len();
            if last_row {
                self.lines[owner].truncate(start, brush);
            } else {
                let fill = brush.blank();
                self.lines[owner].erase_at(start, self.width, &fill);
            }
        }
    }

    // ------------------------------------------------------------------
    // Resize / reflow, finalize, compose
    // ------------------------------------------------------------------

    /// Resize the viewport, reflowing wrapped heights and re-deriving the
    /// caret from the current line's recorded locus.
    pub fn resize(&mut self, width: u16, height: u16, brush: &Brush) {
        let owner = self.cur_owner();
        self.width = width.max(1);
        self.height = height.max(1);
        self.capacity = self.capacity.max(self.height as usize);
        self.top = 0;
        self.bottom = 0;
        while self.lines.len() < self.height as usize {
            let line = self.fresh_line(brush);
            self.lines.push_back(line);
        }
        self.basis = self.lines.len().saturating_sub(self.height as usize);
        self.rebuild_ownership(0);
        let abs = self.lines[owner].replay_locus(self.width);
        let row_within = (abs / self.width) as usize;
        let slot = (owner + row_within).min(self.lines.len() - 1);
        let y = slot.saturating_sub(self.basis).min(self.height as usize - 1);
        self.caret = Caret {
            x: abs % self.width,
            y: y as u16,
            pending_wrap: false,
        };
    }

    /// Commit pending caret and height bookkeeping. Called before any
    /// cross-store command (alternate-screen swaps).
    pub fn finalize(&mut self) {
        self.caret.pending_wrap = false;
        let owner = self.cur_owner();
        self.lines[owner].finalize();
        self.rebuild_ownership(owner);
    }

    /// Rebuild the visible grid from the lines under the viewport. The
    /// target grid is resized (bumping its generation) only on dimension
    /// change; otherwise cells are overwritten in place.
    pub fn compose(&self, out: &mut Grid) {
        if out.size() != (self.width, self.height) {
            out.resize(self.width, self.height);
        }
        for y in 0..self.height {
            let slot = self.slot(y);
            if slot >= self.lines.len() {
                let marker = out.marker().clone();
                out.fill_region(0, y, self.width, 1, &marker);
                continue;
            }
            let owner = self.owner_index(slot);
            let line = &self.lines[owner];
            let span = line.wrapped_row((slot - owner) as u16, self.width);
            let used = span.len() as u16;
            if used > 0 {
                let run = span.to_vec();
                out.splice(y, 0, &run);
            }
            if used < self.width {
                out.fill_region(used, y, self.width - used, 1, line.marker());
            }
        }
    }

    /// Check the ownership invariant: `bossid <= id` everywhere, and every
    /// slot's boss is exactly the line whose wrapped extent covers it.
    /// Test support.
    pub fn ownership_consistent(&self) -> bool {
        let mut j = 0;
        while j < self.lines.len() {
            if self.lines[j].bossid != self.lines[j].id() {
                return false;
            }
            let extent = (j + self.lines[j].height(self.width) as usize).min(self.lines.len());
            let id = self.lines[j].id();
            for k in j + 1..extent {
                if self.lines[k].bossid != id || self.lines[k].bossid > self.lines[k].id() {
                    return false;
                }
            }
            j = extent.max(j + 1);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Store, Brush) {
        let brush = Brush::default();
        (Store::new(80, 24, 1000, &brush), brush)
    }

    fn row_text(store: &Store, y: u16) -> String {
        let mut grid = Grid::new(0, 0);
        store.compose(&mut grid);
        grid.row(y).iter().map(|c| c.display()).collect()
    }

    #[test]
    fn print_then_newline_lands_on_next_row() {
        let (mut store, brush) = store();
        for ch in "Hello".chars() {
            store.print_cluster(&ch.to_string(), &brush, true);
        }
        store.caret_home();
        store.line_feed(&brush);
        assert_eq!(store.caret(), Caret { x: 0, y: 1, pending_wrap: false });
        assert_eq!(&row_text(&store, 0)[..5], "Hello");
        assert!(row_text(&store, 0)[5..].chars().all(|c| c == ' '));
    }

    #[test]
    fn wrap_produces_covered_row_owned_by_head() {
        let (mut store, brush) = store();
        for _ in 0..85 {
            store.print_cluster("x", &brush, true);
        }
        assert_eq!(store.caret().y, 1);
        assert_eq!(store.caret().x, 5);
        let head = store.line(0).unwrap();
        assert_eq!(head.len(), 85);
        assert_eq!(head.height(80), 2);
        let covered = store.line(1).unwrap();
        assert_eq!(covered.bossid, head.id());
        assert!(store.ownership_consistent());
        assert_eq!(&row_text(&store, 1)[..5], "xxxxx");
    }

    #[test]
    fn deferred_wrap_holds_at_exact_width() {
        let (mut store, brush) = store();
        for _ in 0..80 {
            store.print_cluster("x", &brush, true);
        }
        // The 80th character fills the row but does not take the wrap.
        assert_eq!(store.caret().y, 0);
        assert!(store.caret().pending_wrap);
        assert_eq!(store.line(0).unwrap().height(80), 1);
        store.print_cluster("y", &brush, true);
        assert_eq!(store.caret().y, 1);
        assert_eq!(store.line(0).unwrap().height(80), 2);
    }

    #[test]
    fn feed_at_bottom_advances_basis() {
        let (mut store, brush) = store();
        store.caret_chy(23);
        let before = store.basis();
        store.line_feed(&brush);
        assert_eq!(store.basis(), before + 1);
        assert_eq!(store.count(), 25);
        assert_eq!(store.caret().y, 23);
    }

    #[test]
    fn capacity_evicts_from_head() {
        let brush = Brush::default();
        let mut store = Store::new(10, 4, 6, &brush);
        for _ in 0..10 {
            store.caret_chy(3);
            store.line_feed(&brush);
        }
        assert!(store.count() <= 6);
        assert!(store.ownership_consistent());
    }

    #[test]
    fn region_scroll_shifts_only_band() {
        let (mut store, brush) = store();
        for y in 0..24u16 {
            store.caret_goto(0, y);
            let ch = char::from(b'a' + (y % 26) as u8);
            store.print_cluster(&ch.to_string(), &brush, true);
        }
        store.set_region(5, 10);
        // Scroll up by 3: rows 4..=9 shift, everything else untouched.
        store.scroll(-3, &brush);
        assert_eq!(&row_text(&store, 3)[..1], "d");
        assert_eq!(&row_text(&store, 4)[..1], "h");
        assert_eq!(&row_text(&store, 5)[..1], "i");
        assert_eq!(&row_text(&store, 6)[..1], "j");
        assert_eq!(&row_text(&store, 7)[..1], " ");
        assert_eq!(&row_text(&store, 9)[..1], " ");
        assert_eq!(&row_text(&store, 10)[..1], "k");
        assert!(store.ownership_consistent());
    }

    #[test]
    fn insert_lines_blank_at_caret_and_reset_column() {
        let (mut store, brush) = store();
        for y in 0..3u16 {
            store.caret_goto(0, y);
            let ch = char::from(b'a' + y as u8);
            store.print_cluster(&ch.to_string(), &brush, true);
        }
        store.caret_goto(1, 1);
        store.insert_lines(1, &brush);
        assert_eq!(store.caret().x, 0);
        assert_eq!(&row_text(&store, 0)[..1], "a");
        assert_eq!(&row_text(&store, 1)[..1], " ");
        assert_eq!(&row_text(&store, 2)[..1], "b");
        assert!(store.ownership_consistent());
    }

    #[test]
    fn erase_display_viewport_blanks_all_rows_without_moving_caret() {
        let (mut store, brush) = store();
        for y in 0..24u16 {
            store.caret_goto(0, y);
            store.print_cluster("q", &brush, true);
        }
        store.caret_goto(7, 11);
        let caret = store.caret();
        store.erase_display(2, &brush);
        for y in 0..24 {
            assert!(row_text(&store, y).chars().all(|c| c == ' '), "row {y}");
        }
        let after = store.caret();
        assert_eq!((caret.x, caret.y), (after.x, after.y));
    }

    #[test]
    fn erase_scrollback_drops_history_only() {
        let (mut store, brush) = store();
        for _ in 0..30 {
            store.caret_chy(23);
            store.print_cluster("m", &brush, true);
            store.line_feed(&brush);
        }
        assert!(store.basis() > 0);
        store.erase_display(3, &brush);
        assert_eq!(store.basis(), 0);
        assert_eq!(store.count(), 24);
    }

    #[test]
    fn delete_chars_is_row_local_in_wrapped_line() {
        let (mut store, brush) = store();
        for _ in 0..90 {
            store.print_cluster("w", &brush, true);
        }
        // Caret sits on the continuation row; delete must not pull row 0.
        store.caret_goto(0, 1);
        store.delete_chars(5, &brush);
        assert_eq!(store.line(0).unwrap().len(), 85);
        assert_eq!(&row_text(&store, 0), &"w".repeat(80));
        assert!(store.ownership_consistent());
    }

    #[test]
    fn resize_reflows_and_keeps_ownership() {
        let (mut store, brush) = store();
        for _ in 0..85 {
            store.print_cluster("x", &brush, true);
        }
        store.resize(40, 24, &brush);
        assert_eq!(store.line(0).unwrap().height(40), 3);
        assert!(store.ownership_consistent());
    }

    #[test]
    fn wrap_at_viewport_bottom_continues_the_same_line() {
        let brush = Brush::default();
        let mut store = Store::new(4, 2, 100, &brush);
        store.caret_goto(0, 1);
        for ch in "abcde".chars() {
            store.print_cluster(&ch.to_string(), &brush, true);
        }
        // The wrap pushed a fresh tail line and advanced the basis, but the
        // fifth character still belongs to the line started at the bottom.
        assert_eq!(store.basis(), 1);
        let owner = store.line(1).unwrap();
        assert_eq!(owner.len(), 5);
        assert_eq!(owner.height(4), 2);
        assert_eq!(store.line(2).unwrap().bossid, owner.id());
        assert!(store.ownership_consistent());
        assert_eq!(&row_text(&store, 1)[..1], "e");
    }

    #[test]
    fn huge_caret_moves_clamp_to_the_viewport() {
        let (mut store, _brush) = store();
        store.caret_down(u16::MAX);
        store.caret_down(u16::MAX);
        store.caret_right(u16::MAX);
        let caret = store.caret();
        assert_eq!((caret.x, caret.y), (79, 23));
    }

    #[test]
    fn zero_size_store_clamps_to_one_cell() {
        let brush = Brush::default();
        let mut store = Store::new(0, 0, 0, &brush);
        assert_eq!((store.width(), store.height()), (1, 1));
        store.print_cluster("x", &brush, true);
        assert_eq!(&row_text(&store, 0)[..1], "x");
    }
}
