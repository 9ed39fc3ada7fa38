//! Dense cell grid and wide-run editing
//!
//! `Grid` owns a rectangular array of cells plus a marker (default-fill)
//! cell, a logical origin offset for the embedding layer, and a generation
//! counter bumped on every size change so the diff renderer can detect when
//! an incremental compare is no longer valid.
//!
//! The row editing primitives (`splice`, `insert`, `delete`, `erase`,
//! `scroll_band`) uphold the wide-pair invariant: a `WideLeft` cell is
//! always immediately followed by its `WideRight` partner, and any edit that
//! would orphan one half demotes it to the replacement glyph.

use super::cell::{Cell, WidthClass, FALLBACK_GLYPH};

/// A coordinate-addressed, resizable array of cells.
#[derive(Clone, Debug)]
pub struct Grid {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
    marker: Cell,
    origin: (i16, i16),
    generation: u64,
}

/// Turn an orphaned wide half into a narrow replacement cell, keeping its
/// colors and flags.
fn demote(cell: &mut Cell) {
    cell.cluster.clear();
    cell.cluster.push(FALLBACK_GLYPH);
    cell.width = WidthClass::Narrow;
}

impl Grid {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self::with_marker(cols, rows, Cell::default())
    }

    pub fn with_marker(cols: u16, rows: u16, marker: Cell) -> Self {
        Self {
            cols,
            rows,
            cells: vec![marker.clone(); cols as usize * rows as usize],
            marker,
            origin: (0, 0),
            generation: 0,
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn marker(&self) -> &Cell {
        &self.marker
    }

    pub fn set_marker(&mut self, marker: Cell) {
        self.marker = marker;
    }

    pub fn origin(&self) -> (i16, i16) {
        self.origin
    }

    pub fn set_origin(&mut self, origin: (i16, i16)) {
        self.origin = origin;
    }

    fn idx(&self, x: u16, y: u16) -> usize {
        y as usize * self.cols as usize + x as usize
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.cols && y < self.rows {
            Some(&self.cells[self.idx(x, y)])
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x < self.cols && y < self.rows {
            let i = self.idx(x, y);
            Some(&mut self.cells[i])
        } else {
            None
        }
    }

    pub fn row(&self, y: u16) -> &[Cell] {
        let start = self.idx(0, y);
        &self.cells[start..start + self.cols as usize]
    }

    pub fn row_mut(&mut self, y: u16) -> &mut [Cell] {
        let start = self.idx(0, y);
        let cols = self.cols as usize;
        &mut self.cells[start..start + cols]
    }

    /// Resize in place, preserving the overlapping content. Bumps the
    /// generation counter even when the content fits entirely.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) != (self.cols, self.rows) {
            let mut next = vec![self.marker.clone(); cols as usize * rows as usize];
            let keep_cols = cols.min(self.cols) as usize;
            for y in 0..rows.min(self.rows) {
                let src = self.idx(0, y);
                let dst = y as usize * cols as usize;
                next[dst..dst + keep_cols].clone_from_slice(&self.cells[src..src + keep_cols]);
            }
            self.cells = next;
            self.cols = cols;
            self.rows = rows;
            for y in 0..self.rows {
                self.heal_row_edge(y);
            }
        }
        self.generation += 1;
    }

    /// Grow the width only, keeping all content. Used by line grids that
    /// extend as text is appended.
    pub fn ensure_cols(&mut self, cols: u16) {
        if cols > self.cols {
            let rows = self.rows;
            self.resize(cols, rows);
        }
    }

    /// Fill every cell with the marker.
    pub fn clear(&mut self) {
        let marker = self.marker.clone();
        for cell in &mut self.cells {
            *cell = marker.clone();
        }
    }

    /// Fill a clamped rectangular region with copies of `fill`, demoting any
    /// wide halves orphaned at the region seams.
    pub fn fill_region(&mut self, x: u16, y: u16, w: u16, h: u16, fill: &Cell) {
        let x1 = x.min(self.cols);
        let x2 = (x.saturating_add(w)).min(self.cols);
        let y1 = y.min(self.rows);
        let y2 = (y.saturating_add(h)).min(self.rows);
        for row in y1..y2 {
            for col in x1..x2 {
                let i = self.idx(col, row);
                self.cells[i] = fill.clone();
            }
            self.heal_seam(row, x1);
            self.heal_seam(row, x2);
        }
    }

    /// Copy a clamped region out of `src` into this grid at `(dx, dy)`.
    pub fn blit(&mut self, src: &Grid, sx: u16, sy: u16, w: u16, h: u16, dx: u16, dy: u16) {
        let w = w.min(src.cols.saturating_sub(sx)).min(self.cols.saturating_sub(dx));
        let h = h.min(src.rows.saturating_sub(sy)).min(self.rows.saturating_sub(dy));
        for row in 0..h {
            let s = src.idx(sx, sy + row);
            let d = self.idx(dx, dy + row);
            for col in 0..w as usize {
                self.cells[d + col] = src.cells[s + col].clone();
            }
            self.heal_seam(dy + row, dx);
            self.heal_seam(dy + row, dx + w);
        }
    }

    /// Overwrite a run of cells at `(x, y)` with `run`, discarding what does
    /// not fit before the right margin. The caller supplies well-paired
    /// cells; seams against the existing content are healed here.
    pub fn splice(&mut self, y: u16, x: u16, run: &[Cell]) {
        if y >= self.rows || x >= self.cols {
            return;
        }
        // Landing on the right half of a pair orphans the left half first.
        if self.cells[self.idx(x, y)].is_wide_right() && x > 0 {
            let i = self.idx(x - 1, y);
            if self.cells[i].is_wide_left() {
                demote(&mut self.cells[i]);
            }
        }
        let avail = (self.cols - x) as usize;
        let n = run.len().min(avail);
        let start = self.idx(x, y);
        for (i, cell) in run[..n].iter().enumerate() {
            self.cells[start + i] = cell.clone();
        }
        // A pair cut by the margin or by the end of the run leaves halves on
        // both sides of the seam, and a run sliced out of a longer buffer can
        // begin with a stray right half.
        self.heal_seam(y, x);
        self.heal_seam(y, x + n as u16);
        self.heal_row_edge(y);
    }

    /// `insert` restricted to the span `[x, limit)`; cells shifted past
    /// `limit` are discarded. Used for row-local edits inside wrapped lines.
    pub fn insert_span(&mut self, y: u16, x: u16, n: u16, limit: u16, fill: &Cell) {
        let limit = limit.min(self.cols);
        if y >= self.rows || x >= limit || n == 0 {
            return;
        }
        let n = n.min(limit - x);
        let start = self.idx(x, y);
        let end = self.idx(0, y) + limit as usize;
        self.cells[start..end].rotate_right(n as usize);
        for i in 0..n as usize {
            self.cells[start + i] = fill.clone();
        }
        self.heal_row(y);
    }

    /// `delete` restricted to the span `[x, limit)`.
    pub fn delete_span(&mut self, y: u16, x: u16, n: u16, limit: u16, fill: &Cell) {
        let limit = limit.min(self.cols);
        if y >= self.rows || x >= limit || n == 0 {
            return;
        }
        let n = n.min(limit - x);
        let start = self.idx(x, y);
        let end = self.idx(0, y) + limit as usize;
        self.cells[start..end].rotate_left(n as usize);
        for i in (end - n as usize)..end {
            self.cells[i] = fill.clone();
        }
        self.heal_row(y);
    }

    /// Shift cells right within the row, inserting `n` copies of `fill` at
    /// `x`. Content pushed past the right margin is discarded, not wrapped.
    pub fn insert(&mut self, y: u16, x: u16, n: u16, fill: &Cell) {
        if y >= self.rows || x >= self.cols || n == 0 {
            return;
        }
        let n = n.min(self.cols - x);
        let start = self.idx(x, y);
        let end = self.idx(0, y) + self.cols as usize;
        self.cells[start..end].rotate_right(n as usize);
        for i in 0..n as usize {
            self.cells[start + i] = fill.clone();
        }
        self.heal_row(y);
    }

    /// Shift cells left within the row, deleting `n` cells at `x` and
    /// filling the vacated tail with copies of `fill`.
    pub fn delete(&mut self, y: u16, x: u16, n: u16, fill: &Cell) {
        if y >= self.rows || x >= self.cols || n == 0 {
            return;
        }
        let n = n.min(self.cols - x);
        let start = self.idx(x, y);
        let end = self.idx(0, y) + self.cols as usize;
        self.cells[start..end].rotate_left(n as usize);
        for i in (end - n as usize)..end {
            self.cells[i] = fill.clone();
        }
        self.heal_row(y);
    }

    /// Overwrite `n` cells at `(x, y)` with copies of `fill`.
    pub fn erase(&mut self, y: u16, x: u16, n: u16, fill: &Cell) {
        if y >= self.rows || x >= self.cols || n == 0 {
            return;
        }
        let n = n.min(self.cols - x);
        let start = self.idx(x, y);
        for i in 0..n as usize {
            self.cells[start + i] = fill.clone();
        }
        self.heal_seam(y, x);
        self.heal_seam(y, x + n);
    }

    /// Move the band of rows `top..=bottom` by `n` positions (positive moves
    /// content down), filling the vacated rows with the marker. Rows move
    /// wholesale, so pairs are never split.
    pub fn scroll_band(&mut self, top: u16, bottom: u16, n: i32) {
        if top > bottom || bottom >= self.rows || n == 0 {
            return;
        }
        let height = (bottom - top + 1) as u32;
        let shift = n.unsigned_abs().min(height) as usize;
        let cols = self.cols as usize;
        let marker = self.marker.clone();
        let start = self.idx(0, top);
        let end = self.idx(0, bottom) + cols;
        let band = &mut self.cells[start..end];
        if n > 0 {
            band.rotate_right(shift * cols);
            for cell in &mut band[..shift * cols] {
                *cell = marker.clone();
            }
        } else {
            band.rotate_left(shift * cols);
            let keep = band.len() - shift * cols;
            for cell in &mut band[keep..] {
                *cell = marker.clone();
            }
        }
    }

    /// Demote any orphaned wide half around column `x` of row `y`.
    fn heal_seam(&mut self, y: u16, x: u16) {
        if y >= self.rows {
            return;
        }
        // Left side: a WideLeft not followed by its partner.
        if x > 0 {
            let left = self.idx(x - 1, y);
            if self.cells[left].is_wide_left() {
                let partner_ok =
                    x < self.cols && self.cells[self.idx(x, y)].is_wide_right();
                if !partner_ok {
                    demote(&mut self.cells[left]);
                }
            }
        }
        // Right side: a WideRight not preceded by its partner.
        if x < self.cols {
            let right = self.idx(x, y);
            if self.cells[right].is_wide_right() {
                let partner_ok = x > 0 && self.cells[self.idx(x - 1, y)].is_wide_left();
                if !partner_ok {
                    demote(&mut self.cells[right]);
                }
            }
        }
    }

    /// A WideLeft in the last column can never have its partner.
    fn heal_row_edge(&mut self, y: u16) {
        if self.cols == 0 || y >= self.rows {
            return;
        }
        let last = self.idx(self.cols - 1, y);
        if self.cells[last].is_wide_left() {
            demote(&mut self.cells[last]);
        }
    }

    /// Scan a whole row and repair every orphaned half. Used after shifts,
    /// where pairs can break at both the edit point and the margin.
    fn heal_row(&mut self, y: u16) {
        let start = self.idx(0, y);
        let cols = self.cols as usize;
        let mut x = 0;
        while x < cols {
            let cell = &self.cells[start + x];
            if cell.is_wide_left() {
                if x + 1 < cols && self.cells[start + x + 1].is_wide_right() {
                    x += 2;
                    continue;
                }
                demote(&mut self.cells[start + x]);
            } else if cell.is_wide_right() {
                demote(&mut self.cells[start + x]);
            }
            x += 1;
        }
    }

    /// Check the wide-pair invariant over the whole grid. Test support.
    pub fn wide_pairs_consistent(&self) -> bool {
        for y in 0..self.rows {
            let row = self.row(y);
            let mut x = 0;
            while x < row.len() {
                match row[x].width {
                    WidthClass::WideLeft => {
                        if x + 1 >= row.len() || !row[x + 1].is_wide_right() {
                            return false;
                        }
                        x += 2;
                    }
                    WidthClass::WideRight => return false,
                    _ => x += 1,
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::Brush;

    fn wide_pair(brush: &Brush, ch: char) -> [Cell; 2] {
        [
            brush.styled(&ch.to_string(), WidthClass::WideLeft),
            brush.styled("", WidthClass::WideRight),
        ]
    }

    fn narrow(brush: &Brush, ch: char) -> Cell {
        brush.styled(&ch.to_string(), WidthClass::Narrow)
    }

    #[test]
    fn resize_preserves_content_and_bumps_generation() {
        let brush = Brush::default();
        let mut grid = Grid::new(4, 2);
        grid.splice(0, 0, &[narrow(&brush, 'a'), narrow(&brush, 'b')]);
        let gen = grid.generation();
        grid.resize(6, 3);
        assert_eq!(grid.generation(), gen + 1);
        assert_eq!(grid.cell(0, 0).unwrap().cluster, "a");
        assert_eq!(grid.cell(1, 0).unwrap().cluster, "b");
        assert_eq!(grid.cell(5, 2).unwrap().cluster, "");
    }

    #[test]
    fn shrink_demotes_cut_pair() {
        let brush = Brush::default();
        let mut grid = Grid::new(4, 1);
        let pair = wide_pair(&brush, '語');
        grid.splice(0, 2, &pair);
        grid.resize(3, 1);
        // The pair straddled the new edge; its left half is now an orphan.
        assert_eq!(grid.cell(2, 0).unwrap().cluster, FALLBACK_GLYPH.to_string());
        assert!(grid.wide_pairs_consistent());
    }

    #[test]
    fn splice_on_right_half_demotes_left() {
        let brush = Brush::default();
        let mut grid = Grid::new(4, 1);
        let pair = wide_pair(&brush, '語');
        grid.splice(0, 0, &pair);
        grid.splice(0, 1, &[narrow(&brush, 'x')]);
        assert_eq!(grid.cell(0, 0).unwrap().cluster, FALLBACK_GLYPH.to_string());
        assert_eq!(grid.cell(1, 0).unwrap().cluster, "x");
        assert!(grid.wide_pairs_consistent());
    }

    #[test]
    fn splice_discards_past_margin() {
        let brush = Brush::default();
        let mut grid = Grid::new(3, 1);
        let run = [
            narrow(&brush, 'a'),
            narrow(&brush, 'b'),
            narrow(&brush, 'c'),
            narrow(&brush, 'd'),
        ];
        grid.splice(0, 1, &run);
        assert_eq!(grid.cell(1, 0).unwrap().cluster, "a");
        assert_eq!(grid.cell(2, 0).unwrap().cluster, "b");
    }

    #[test]
    fn insert_shifts_and_discards() {
        let brush = Brush::default();
        let mut grid = Grid::new(4, 1);
        for (i, ch) in "abcd".chars().enumerate() {
            grid.splice(0, i as u16, &[narrow(&brush, ch)]);
        }
        grid.insert(0, 1, 2, &brush.blank());
        let text: Vec<&str> = (0..4).map(|x| grid.cell(x, 0).unwrap().display()).collect();
        assert_eq!(text, vec!["a", " ", " ", "b"]);
    }

    #[test]
    fn delete_fills_tail() {
        let brush = Brush::default();
        let mut grid = Grid::new(4, 1);
        for (i, ch) in "abcd".chars().enumerate() {
            grid.splice(0, i as u16, &[narrow(&brush, ch)]);
        }
        grid.delete(0, 1, 2, &brush.blank());
        let text: Vec<&str> = (0..4).map(|x| grid.cell(x, 0).unwrap().display()).collect();
        assert_eq!(text, vec!["a", "d", " ", " "]);
    }

    #[test]
    fn insert_into_pair_heals_both_halves() {
        let brush = Brush::default();
        let mut grid = Grid::new(5, 1);
        let pair = wide_pair(&brush, '語');
        grid.splice(0, 1, &pair);
        grid.insert(0, 2, 1, &brush.blank());
        assert!(grid.wide_pairs_consistent());
        assert_eq!(grid.cell(1, 0).unwrap().cluster, FALLBACK_GLYPH.to_string());
    }

    #[test]
    fn scroll_band_moves_rows_only_within_band() {
        let brush = Brush::default();
        let mut grid = Grid::new(2, 4);
        for y in 0..4 {
            let ch = (b'a' + y as u8) as char;
            grid.splice(y, 0, &[narrow(&brush, ch)]);
        }
        grid.scroll_band(1, 2, -1);
        assert_eq!(grid.cell(0, 0).unwrap().cluster, "a");
        assert_eq!(grid.cell(0, 1).unwrap().cluster, "c");
        assert_eq!(grid.cell(0, 2).unwrap().cluster, "");
        assert_eq!(grid.cell(0, 3).unwrap().cluster, "d");
    }

    // Exhaustive-ish check of the wide-pair invariant over pseudo-random
    // splice/insert/delete/erase sequences.
    #[test]
    fn wide_pair_invariant_under_random_edits() {
        let brush = Brush::default();
        let mut grid = Grid::new(11, 3);
        let mut seed: u64 = 0x2545F491_4F6CDD1D;
        let mut rng = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };
        for _ in 0..2000 {
            let y = (rng() % 3) as u16;
            let x = (rng() % 11) as u16;
            let n = (rng() % 4 + 1) as u16;
            match rng() % 4 {
                0 => {
                    let run: Vec<Cell> = if rng() % 2 == 0 {
                        wide_pair(&brush, '漢').to_vec()
                    } else {
                        vec![narrow(&brush, 'z')]
                    };
                    grid.splice(y, x, &run);
                }
                1 => grid.insert(y, x, n, &brush.blank()),
                2 => grid.delete(y, x, n, &brush.blank()),
                _ => grid.erase(y, x, n, &brush.blank()),
            }
            assert!(grid.wide_pairs_consistent());
        }
    }
}
