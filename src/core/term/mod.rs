//! Terminal emulation: parser, interpreter, and the combined façade.
//!
//! `Terminal` is the one-stop entry point: raw bytes in, composed grid and
//! pending replies out. It owns the UTF-8 reassembly buffer so callers can
//! feed reads of any size, including ones that split a multi-byte character
//! or an escape sequence.

pub mod interp;
pub mod parser;

pub use interp::{CursorStyle, Interp, Modes, Response};
pub use parser::{CsiArgs, Perform, VtParser};

use crate::core::grid::Grid;

/// How much state a reset clears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetKind {
    /// Attributes, modes, and region; screen content survives.
    Soft,
    /// Power-on state, content included.
    Hard,
}

/// Byte-stream terminal: feeds decode into screen mutations.
pub struct Terminal {
    parser: VtParser,
    interp: Interp,
    /// Undecoded tail of a multi-byte character split across feeds.
    tail: Vec<u8>,
    grid: Grid,
}

impl Terminal {
    pub fn new(cols: u16, rows: u16, scrollback: usize) -> Self {
        Self {
            parser: VtParser::new(),
            interp: Interp::new(cols, rows, scrollback),
            tail: Vec::new(),
            grid: Grid::new(cols, rows),
        }
    }

    /// As [`Terminal::new`], with a non-default tab stop interval.
    pub fn with_tab_width(cols: u16, rows: u16, scrollback: usize, tab_width: u16) -> Self {
        Self {
            parser: VtParser::new(),
            interp: Interp::with_tab_width(cols, rows, scrollback, tab_width),
            tail: Vec::new(),
            grid: Grid::new(cols, rows),
        }
    }

    /// Feed raw output bytes from the application. Incomplete UTF-8 at the
    /// end of the chunk is buffered for the next feed; invalid bytes decode
    /// to the replacement character.
    pub fn feed(&mut self, bytes: &[u8]) {
        let mut buf = std::mem::take(&mut self.tail);
        buf.extend_from_slice(bytes);
        let mut rest = buf.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.feed_str(text);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        self.feed_str(text);
                    }
                    match err.error_len() {
                        Some(len) => {
                            self.parser.feed('\u{FFFD}', &mut self.interp);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk.
                            self.tail = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
    }

    fn feed_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.parser.feed(ch, &mut self.interp);
        }
    }

    /// Replies to write back to the application, drained.
    pub fn take_replies(&mut self) -> Vec<Response> {
        self.interp.take_replies()
    }

    /// Same, already encoded.
    pub fn take_reply_bytes(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        for reply in self.interp.take_replies() {
            out.extend_from_slice(&reply.to_bytes());
        }
        out
    }

    /// The current screen, composed into the internal grid.
    pub fn grid(&mut self) -> &Grid {
        self.interp.compose(&mut self.grid);
        &self.grid
    }

    /// Compose the current screen into a caller-owned grid.
    pub fn compose_into(&self, out: &mut Grid) {
        self.interp.compose(out);
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.interp.resize(cols, rows);
    }

    pub fn reset(&mut self, kind: ResetKind) {
        match kind {
            ResetKind::Soft => self.interp.reset_soft(),
            ResetKind::Hard => self.interp.reset_hard(),
        }
        self.tail.clear();
    }

    pub fn title(&self) -> &str {
        self.interp.title()
    }

    /// Caret position in viewport coordinates.
    pub fn caret(&self) -> (u16, u16) {
        let caret = self.interp.active().caret();
        (caret.x, caret.y)
    }

    pub fn cursor_visible(&self) -> bool {
        self.interp.modes().cursor_visible
    }

    pub fn cursor_style(&self) -> CursorStyle {
        self.interp.cursor_style()
    }

    pub fn interp(&self) -> &Interp {
        &self.interp
    }
}
