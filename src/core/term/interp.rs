//! VT command interpreter
//!
//! Binds the parsed sequence stream to the scrollback stores. CSI dispatch
//! goes through a flat handler table indexed by the final byte; private-mode
//! markers and intermediates are resolved inside the handlers. Two stores
//! back the primary and alternate screens, swapped by the DEC private modes,
//! with a finalize barrier on every swap so deferred caret state never leaks
//! across screens.

use std::sync::OnceLock;

use crate::core::cell::{Brush, Color, StyleFlags};
use crate::core::grid::Grid;
use crate::core::scrollback::Store;
use crate::core::term::parser::{CsiArgs, Perform};

/// Reply generated by the interpreter that must be written back to the
/// application side of the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Cursor position report: `ESC [ row ; col R`, 1-based.
    CursorPosition(u16, u16),
    /// Primary device attributes (VT220 class).
    DeviceAttributes,
    /// Secondary device attributes.
    SecondaryDeviceAttributes,
    /// Operating status report: all good.
    DeviceOk,
}

impl Response {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Response::CursorPosition(row, col) => format!("\x1b[{};{}R", row, col).into_bytes(),
            Response::DeviceAttributes => b"\x1b[?62;22c".to_vec(),
            Response::SecondaryDeviceAttributes => b"\x1b[>1;10;0c".to_vec(),
            Response::DeviceOk => b"\x1b[0n".to_vec(),
        }
    }
}

/// Caret shape selected by DECSCUSR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorStyle {
    #[default]
    BlinkingBlock,
    SteadyBlock,
    BlinkingUnderline,
    SteadyUnderline,
    BlinkingBar,
    SteadyBar,
}

impl CursorStyle {
    fn from_decscusr(code: u16) -> Self {
        match code {
            0 | 1 => CursorStyle::BlinkingBlock,
            2 => CursorStyle::SteadyBlock,
            3 => CursorStyle::BlinkingUnderline,
            4 => CursorStyle::SteadyUnderline,
            5 => CursorStyle::BlinkingBar,
            6 => CursorStyle::SteadyBar,
            _ => CursorStyle::default(),
        }
    }
}

/// Mode switches tracked by the interpreter.
#[derive(Clone, Copy, Debug)]
pub struct Modes {
    /// IRM: printed characters shift the tail right instead of overwriting.
    pub insert: bool,
    /// LNM: line feed implies carriage return.
    pub linefeed_newline: bool,
    /// DECAWM: printing past the right margin wraps.
    pub autowrap: bool,
    /// DECTCEM: caret is visible.
    pub cursor_visible: bool,
    /// DECOM: cursor addressing is relative to the scroll region.
    pub origin: bool,
    /// Bracketed paste advertised to the application.
    pub bracketed_paste: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            insert: false,
            linefeed_newline: false,
            autowrap: true,
            cursor_visible: true,
            origin: false,
            bracketed_paste: false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SavedCaret {
    x: u16,
    y: u16,
    brush: Brush,
}

const DEFAULT_TAB: u16 = 8;

type CsiHandler = fn(&mut Interp, &CsiArgs<'_>);

/// Flat CSI dispatch table indexed by the sequence's final byte.
struct CsiTable {
    handlers: [Option<CsiHandler>; 0x80],
}

impl CsiTable {
    fn standard() -> Self {
        let mut table = Self {
            handlers: [None; 0x80],
        };
        table.set(b'@', Interp::csi_ich);
        table.set(b'A', Interp::csi_cuu);
        table.set(b'B', Interp::csi_cud);
        table.set(b'C', Interp::csi_cuf);
        table.set(b'D', Interp::csi_cub);
        table.set(b'E', Interp::csi_cnl);
        table.set(b'F', Interp::csi_cpl);
        table.set(b'G', Interp::csi_cha);
        table.set(b'H', Interp::csi_cup);
        table.set(b'I', Interp::csi_cht);
        table.set(b'J', Interp::csi_ed);
        table.set(b'K', Interp::csi_el);
        table.set(b'L', Interp::csi_il);
        table.set(b'M', Interp::csi_dl);
        table.set(b'P', Interp::csi_dch);
        table.set(b'S', Interp::csi_su);
        table.set(b'T', Interp::csi_sd);
        table.set(b'X', Interp::csi_ech);
        table.set(b'Z', Interp::csi_cbt);
        table.set(b'`', Interp::csi_hpa);
        table.set(b'a', Interp::csi_hpr);
        table.set(b'b', Interp::csi_rep);
        table.set(b'c', Interp::csi_da);
        table.set(b'd', Interp::csi_vpa);
        table.set(b'e', Interp::csi_vpr);
        table.set(b'f', Interp::csi_cup);
        table.set(b'g', Interp::csi_tbc);
        table.set(b'h', Interp::csi_sm);
        table.set(b'l', Interp::csi_rm);
        table.set(b'm', Interp::csi_sgr);
        table.set(b'n', Interp::csi_dsr);
        table.set(b'p', Interp::csi_reset_request);
        table.set(b'q', Interp::csi_decscusr);
        table.set(b'r', Interp::csi_decstbm);
        table.set(b's', Interp::csi_save);
        table.set(b't', Interp::csi_window);
        table.set(b'u', Interp::csi_restore);
        table
    }

    fn set(&mut self, final_byte: u8, handler: CsiHandler) {
        self.handlers[final_byte as usize] = Some(handler);
    }

    fn get(&self, final_byte: u8) -> Option<CsiHandler> {
        self.handlers.get(final_byte as usize).copied().flatten()
    }
}

fn csi_table() -> &'static CsiTable {
    static TABLE: OnceLock<CsiTable> = OnceLock::new();
    TABLE.get_or_init(CsiTable::standard)
}

/// Terminal command interpreter over a pair of scrollback stores.
pub struct Interp {
    primary: Store,
    alt: Store,
    alt_active: bool,
    brush: Brush,
    modes: Modes,
    saved_primary: Option<SavedCaret>,
    saved_alt: Option<SavedCaret>,
    /// Scrollback capacity the primary store was built with; RIS rebuilds
    /// with the same value.
    capacity: usize,
    tabs: Vec<bool>,
    tab_every: u16,
    title: String,
    cursor_style: CursorStyle,
    last_print: Option<char>,
    replies: Vec<Response>,
}

impl Interp {
    pub fn new(cols: u16, rows: u16, capacity: usize) -> Self {
        Self::with_tab_width(cols, rows, capacity, DEFAULT_TAB)
    }

    pub fn with_tab_width(cols: u16, rows: u16, capacity: usize, tab_every: u16) -> Self {
        let brush = Brush::default();
        let tab_every = tab_every.max(1);
        Self {
            primary: Store::new(cols, rows, capacity, &brush),
            // The alternate screen keeps no history beyond the viewport.
            alt: Store::new(cols, rows, rows as usize, &brush),
            alt_active: false,
            brush,
            modes: Modes::default(),
            saved_primary: None,
            saved_alt: None,
            capacity,
            tabs: default_tabs(cols, tab_every),
            tab_every,
            title: String::new(),
            cursor_style: CursorStyle::default(),
            last_print: None,
            replies: Vec::new(),
        }
    }

    pub fn active(&self) -> &Store {
        if self.alt_active {
            &self.alt
        } else {
            &self.primary
        }
    }

    fn active_mut(&mut self) -> &mut Store {
        if self.alt_active {
            &mut self.alt
        } else {
            &mut self.primary
        }
    }

    pub fn alt_active(&self) -> bool {
        self.alt_active
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cursor_style(&self) -> CursorStyle {
        self.cursor_style
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// Drain replies accumulated since the last call.
    pub fn take_replies(&mut self) -> Vec<Response> {
        std::mem::take(&mut self.replies)
    }

    /// Render the active screen into `out`.
    pub fn compose(&self, out: &mut Grid) {
        self.active().compose(out);
    }

    /// Resize both screens, rebuilding tab stops for the new width.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let brush = self.brush;
        self.primary.resize(cols, rows, &brush);
        self.alt.resize(cols, rows, &brush);
        self.tabs = default_tabs(cols, self.tab_every);
    }

    /// DECSTR: reset attributes and modes, keep screen content.
    pub fn reset_soft(&mut self) {
        self.brush.reset();
        self.modes = Modes::default();
        self.cursor_style = CursorStyle::default();
        self.saved_primary = None;
        self.saved_alt = None;
        let store = self.active_mut();
        store.set_region(0, 0);
        store.finalize();
    }

    /// RIS: everything back to power-on state, content included.
    pub fn reset_hard(&mut self) {
        let (cols, rows) = (self.active().width(), self.active().height());
        let brush = Brush::default();
        self.primary = Store::new(cols, rows, self.capacity, &brush);
        self.alt = Store::new(cols, rows, rows as usize, &brush);
        self.alt_active = false;
        self.brush = brush;
        self.modes = Modes::default();
        self.saved_primary = None;
        self.saved_alt = None;
        self.tabs = default_tabs(cols, self.tab_every);
        self.title.clear();
        self.cursor_style = CursorStyle::default();
        self.last_print = None;
    }

    // ------------------------------------------------------------------
    // Printing and C0
    // ------------------------------------------------------------------

    fn put_char(&mut self, ch: char) {
        let brush = self.brush;
        let autowrap = self.modes.autowrap;
        if self.modes.insert {
            let cols = crate::core::cell::WidthClass::of_char(ch).columns();
            if cols > 0 {
                self.active_mut().insert_chars(cols, &brush);
            }
        }
        let mut buf = [0u8; 4];
        let s: &str = ch.encode_utf8(&mut buf);
        self.active_mut().print_cluster(s, &brush, autowrap);
        self.last_print = Some(ch);
    }

    fn linefeed(&mut self) {
        let brush = self.brush;
        if self.modes.linefeed_newline {
            self.active_mut().caret_home();
        }
        self.active_mut().line_feed(&brush);
    }

    fn horizontal_tab(&mut self) {
        let x = self.active().caret().x;
        let next = self.next_tab(x, 1);
        self.active_mut().caret_chx(next);
    }

    fn next_tab(&self, from: u16, count: u16) -> u16 {
        let width = self.active().width();
        let mut x = from;
        let mut left = count;
        while left > 0 {
            let mut found = None;
            for col in x + 1..width {
                if self.tabs.get(col as usize).copied().unwrap_or(false) {
                    found = Some(col);
                    break;
                }
            }
            match found {
                Some(col) => x = col,
                None => return width.saturating_sub(1),
            }
            left -= 1;
        }
        x
    }

    fn prev_tab(&self, from: u16, count: u16) -> u16 {
        let mut x = from;
        let mut left = count;
        while left > 0 && x > 0 {
            let mut found = 0;
            for col in (0..x).rev() {
                if self.tabs.get(col as usize).copied().unwrap_or(false) {
                    found = col;
                    break;
                }
            }
            x = found;
            left -= 1;
        }
        x
    }

    // ------------------------------------------------------------------
    // Saved caret and screen swap
    // ------------------------------------------------------------------

    fn save_caret(&mut self) {
        let caret = self.active().caret();
        let saved = SavedCaret {
            x: caret.x,
            y: caret.y,
            brush: self.brush,
        };
        if self.alt_active {
            self.saved_alt = Some(saved);
        } else {
            self.saved_primary = Some(saved);
        }
    }

    fn restore_caret(&mut self) {
        let saved = if self.alt_active {
            self.saved_alt
        } else {
            self.saved_primary
        };
        if let Some(saved) = saved {
            self.brush = saved.brush;
            self.active_mut().caret_goto(saved.x, saved.y);
        } else {
            self.active_mut().caret_goto(0, 0);
        }
    }

    /// Swap between primary and alternate screens. The outgoing store is
    /// finalized first so pending-wrap and locus state never cross over.
    fn set_alt_screen(&mut self, on: bool, save_restore: bool, clear_alt: bool) {
        if on == self.alt_active {
            return;
        }
        self.active_mut().finalize();
        if on {
            if save_restore {
                self.save_caret();
            }
            let (cols, rows) = (self.primary.width(), self.primary.height());
            if (self.alt.width(), self.alt.height()) != (cols, rows) {
                let brush = self.brush;
                self.alt.resize(cols, rows, &brush);
            }
            self.alt_active = true;
            if clear_alt {
                let brush = self.brush;
                let store = self.active_mut();
                store.caret_goto(0, 0);
                store.erase_display(2, &brush);
            }
        } else {
            self.alt_active = false;
            if save_restore {
                self.restore_caret();
            }
        }
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    fn set_private_mode(&mut self, mode: u16, on: bool) {
        match mode {
            6 => {
                self.modes.origin = on;
                let (rtop, _) = self.active().region_rows();
                let y = if on { rtop } else { 0 };
                self.active_mut().caret_goto(0, y);
            }
            7 => self.modes.autowrap = on,
            25 => self.modes.cursor_visible = on,
            47 | 1047 => self.set_alt_screen(on, false, false),
            1049 => self.set_alt_screen(on, true, true),
            2004 => self.modes.bracketed_paste = on,
            // Mouse and focus reporting modes belong to the embedding layer.
            9 | 1000..=1006 | 1015 => {
                tracing::debug!(mode, on, "input-reporting mode left to the host");
            }
            _ => {
                tracing::debug!(mode, on, "ignoring unknown private mode");
            }
        }
    }

    fn set_ansi_mode(&mut self, mode: u16, on: bool) {
        match mode {
            4 => self.modes.insert = on,
            20 => self.modes.linefeed_newline = on,
            _ => {
                tracing::debug!(mode, on, "ignoring unknown ANSI mode");
            }
        }
    }

    // ------------------------------------------------------------------
    // CSI handlers
    // ------------------------------------------------------------------

    fn csi_cuu(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        self.active_mut().caret_up(n);
    }

    fn csi_cud(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        self.active_mut().caret_down(n);
    }

    fn csi_cuf(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        self.active_mut().caret_right(n);
    }

    fn csi_cub(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        self.active_mut().caret_left(n);
    }

    fn csi_cnl(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        self.active_mut().caret_down(n);
        self.active_mut().caret_home();
    }

    fn csi_cpl(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        self.active_mut().caret_up(n);
        self.active_mut().caret_home();
    }

    fn csi_cha(&mut self, args: &CsiArgs<'_>) {
        let col = args.arg_or(0, 1).saturating_sub(1);
        self.active_mut().caret_chx(col);
    }

    fn csi_cup(&mut self, args: &CsiArgs<'_>) {
        let row = args.arg_or(0, 1).saturating_sub(1);
        let col = args.arg_or(1, 1).saturating_sub(1);
        let row = if self.modes.origin {
            let (rtop, rbot) = self.active().region_rows();
            rtop.saturating_add(row).min(rbot)
        } else {
            row
        };
        self.active_mut().caret_goto(col, row);
    }

    fn csi_cht(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        let x = self.active().caret().x;
        let next = self.next_tab(x, n);
        self.active_mut().caret_chx(next);
    }

    fn csi_cbt(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        let x = self.active().caret().x;
        let prev = self.prev_tab(x, n);
        self.active_mut().caret_chx(prev);
    }

    fn csi_ed(&mut self, args: &CsiArgs<'_>) {
        let brush = self.brush;
        let code = args.arg(0, 0);
        self.active_mut().erase_display(code, &brush);
    }

    fn csi_el(&mut self, args: &CsiArgs<'_>) {
        let brush = self.brush;
        let code = args.arg(0, 0);
        self.active_mut().erase_line(code, &brush);
    }

    fn csi_il(&mut self, args: &CsiArgs<'_>) {
        let brush = self.brush;
        let n = args.arg_or(0, 1);
        self.active_mut().insert_lines(n, &brush);
    }

    fn csi_dl(&mut self, args: &CsiArgs<'_>) {
        let brush = self.brush;
        let n = args.arg_or(0, 1);
        self.active_mut().delete_lines(n, &brush);
    }

    fn csi_ich(&mut self, args: &CsiArgs<'_>) {
        let brush = self.brush;
        let n = args.arg_or(0, 1);
        self.active_mut().insert_chars(n, &brush);
    }

    fn csi_dch(&mut self, args: &CsiArgs<'_>) {
        let brush = self.brush;
        let n = args.arg_or(0, 1);
        self.active_mut().delete_chars(n, &brush);
    }

    fn csi_ech(&mut self, args: &CsiArgs<'_>) {
        let brush = self.brush;
        let n = args.arg_or(0, 1);
        self.active_mut().erase_chars(n, &brush);
    }

    fn csi_su(&mut self, args: &CsiArgs<'_>) {
        let brush = self.brush;
        let n = args.arg_or(0, 1);
        self.active_mut().scroll(-(n as i32), &brush);
    }

    fn csi_sd(&mut self, args: &CsiArgs<'_>) {
        let brush = self.brush;
        let n = args.arg_or(0, 1);
        self.active_mut().scroll(n as i32, &brush);
    }

    fn csi_hpa(&mut self, args: &CsiArgs<'_>) {
        let col = args.arg_or(0, 1).saturating_sub(1);
        self.active_mut().caret_chx(col);
    }

    fn csi_hpr(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        self.active_mut().caret_right(n);
    }

    fn csi_vpa(&mut self, args: &CsiArgs<'_>) {
        let row = args.arg_or(0, 1).saturating_sub(1);
        self.active_mut().caret_chy(row);
    }

    fn csi_vpr(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        self.active_mut().caret_down(n);
    }

    fn csi_rep(&mut self, args: &CsiArgs<'_>) {
        let n = args.arg_or(0, 1);
        if let Some(ch) = self.last_print {
            for _ in 0..n {
                self.put_char(ch);
            }
        }
    }

    fn csi_da(&mut self, args: &CsiArgs<'_>) {
        if args.gt() {
            self.replies.push(Response::SecondaryDeviceAttributes);
        } else if !args.private() {
            self.replies.push(Response::DeviceAttributes);
        }
    }

    fn csi_tbc(&mut self, args: &CsiArgs<'_>) {
        match args.arg(0, 0) {
            0 => {
                let x = self.active().caret().x as usize;
                if let Some(stop) = self.tabs.get_mut(x) {
                    *stop = false;
                }
            }
            3 => self.tabs.iter_mut().for_each(|s| *s = false),
            code => tracing::debug!(code, "ignoring unknown tab-clear code"),
        }
    }

    fn csi_sm(&mut self, args: &CsiArgs<'_>) {
        let private = args.private();
        for &mode in args.params {
            if private {
                self.set_private_mode(mode, true);
            } else {
                self.set_ansi_mode(mode, true);
            }
        }
    }

    fn csi_rm(&mut self, args: &CsiArgs<'_>) {
        let private = args.private();
        for &mode in args.params {
            if private {
                self.set_private_mode(mode, false);
            } else {
                self.set_ansi_mode(mode, false);
            }
        }
    }

    fn csi_sgr(&mut self, args: &CsiArgs<'_>) {
        apply_sgr(&mut self.brush, args.params);
    }

    fn csi_dsr(&mut self, args: &CsiArgs<'_>) {
        match args.arg(0, 0) {
            5 => self.replies.push(Response::DeviceOk),
            6 => {
                let caret = self.active().caret();
                self.replies
                    .push(Response::CursorPosition(caret.y + 1, caret.x + 1));
            }
            code => tracing::debug!(code, "ignoring unknown status-report code"),
        }
    }

    fn csi_reset_request(&mut self, args: &CsiArgs<'_>) {
        if args.intermediates.contains(&b'!') {
            self.reset_soft();
        }
    }

    fn csi_decscusr(&mut self, args: &CsiArgs<'_>) {
        if args.intermediates.contains(&b' ') {
            self.cursor_style = CursorStyle::from_decscusr(args.arg(0, 0));
        }
    }

    fn csi_decstbm(&mut self, args: &CsiArgs<'_>) {
        let top = args.arg(0, 1);
        let bottom = args.arg(1, 0);
        let origin = self.modes.origin;
        let store = self.active_mut();
        store.set_region(top, bottom);
        let home = if origin { store.region_rows().0 } else { 0 };
        store.caret_goto(0, home);
    }

    fn csi_save(&mut self, _args: &CsiArgs<'_>) {
        self.save_caret();
    }

    fn csi_restore(&mut self, _args: &CsiArgs<'_>) {
        self.restore_caret();
    }

    fn csi_window(&mut self, args: &CsiArgs<'_>) {
        tracing::debug!(op = args.arg(0, 0), "ignoring window manipulation");
    }
}

impl Perform for Interp {
    fn print(&mut self, ch: char) {
        self.put_char(ch);
    }

    fn control(&mut self, byte: u8) {
        match byte {
            0x07 => {} // BEL
            0x08 => self.active_mut().caret_left(1),
            0x09 => self.horizontal_tab(),
            0x0A | 0x0B | 0x0C => self.linefeed(),
            0x0D => self.active_mut().caret_home(),
            0x0E | 0x0F => {} // charset shifts
            _ => {}
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], byte: u8) {
        if !intermediates.is_empty() {
            // Charset designations and the like.
            tracing::trace!(?intermediates, byte, "ignoring intermediate escape");
            return;
        }
        let brush = self.brush;
        match byte {
            b'7' => self.save_caret(),
            b'8' => self.restore_caret(),
            b'D' => self.active_mut().line_feed(&brush),
            b'E' => {
                self.active_mut().caret_home();
                self.active_mut().line_feed(&brush);
            }
            b'H' => {
                let x = self.active().caret().x as usize;
                if let Some(stop) = self.tabs.get_mut(x) {
                    *stop = true;
                }
            }
            b'M' => self.active_mut().reverse_index(&brush),
            b'c' => self.reset_hard(),
            _ => {
                tracing::debug!(byte = byte as u32, "ignoring unknown escape");
            }
        }
    }

    fn csi_dispatch(&mut self, args: &CsiArgs<'_>, final_byte: u8) {
        match csi_table().get(final_byte) {
            Some(handler) => handler(self, args),
            None => {
                tracing::debug!(
                    final_byte = final_byte as u32,
                    params = ?args.params,
                    intermediates = ?args.intermediates,
                    "ignoring unknown CSI"
                );
            }
        }
    }

    fn osc_dispatch(&mut self, payload: &str) {
        if let Some((code, text)) = payload.split_once(';') {
            match code {
                "0" | "1" | "2" => {
                    self.title = text.to_string();
                }
                _ => {
                    tracing::debug!(code, "ignoring unknown OSC");
                }
            }
        }
    }
}

fn default_tabs(cols: u16, every: u16) -> Vec<bool> {
    (0..cols).map(|x| x > 0 && x % every == 0).collect()
}

/// Fold an SGR parameter list into the brush.
fn apply_sgr(brush: &mut Brush, params: &[u16]) {
    if params.is_empty() {
        brush.reset();
        return;
    }
    let mut iter = params.iter().copied();
    while let Some(param) = iter.next() {
        match param {
            0 => brush.reset(),
            1 => brush.flags |= StyleFlags::BOLD,
            3 => brush.flags |= StyleFlags::ITALIC,
            4 => brush.flags |= StyleFlags::UNDERLINE,
            7 => brush.flags |= StyleFlags::INVERT,
            9 => brush.flags |= StyleFlags::STRIKE,
            21 => brush.flags |= StyleFlags::DOUBLE_UNDERLINE,
            22 => brush.flags &= !StyleFlags::BOLD,
            23 => brush.flags &= !StyleFlags::ITALIC,
            24 => brush.flags &= !(StyleFlags::UNDERLINE | StyleFlags::DOUBLE_UNDERLINE),
            27 => brush.flags &= !StyleFlags::INVERT,
            29 => brush.flags &= !StyleFlags::STRIKE,
            30..=37 => brush.fg = Color::Indexed((param - 30) as u8),
            38 => {
                if let Some(color) = extended_color(&mut iter) {
                    brush.fg = color;
                }
            }
            39 => brush.fg = Color::Default,
            40..=47 => brush.bg = Color::Indexed((param - 40) as u8),
            48 => {
                if let Some(color) = extended_color(&mut iter) {
                    brush.bg = color;
                }
            }
            49 => brush.bg = Color::Default,
            53 => brush.flags |= StyleFlags::OVERLINE,
            55 => brush.flags &= !StyleFlags::OVERLINE,
            90..=97 => brush.fg = Color::Indexed((param - 90 + 8) as u8),
            100..=107 => brush.bg = Color::Indexed((param - 100 + 8) as u8),
            _ => {
                tracing::trace!(param, "ignoring unknown SGR parameter");
            }
        }
    }
}

/// Parse the tail of an SGR 38/48: `5;index` or `2;r;g;b`.
fn extended_color(iter: &mut impl Iterator<Item = u16>) -> Option<Color> {
    match iter.next()? {
        5 => Some(Color::Indexed(iter.next()? as u8)),
        2 => {
            let r = iter.next()? as u8;
            let g = iter.next()? as u8;
            let b = iter.next()? as u8;
            Some(Color::rgb(r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::term::parser::VtParser;

    fn interp() -> Interp {
        Interp::new(80, 24, 1000)
    }

    fn feed(interp: &mut Interp, parser: &mut VtParser, input: &str) {
        for ch in input.chars() {
            parser.feed(ch, interp);
        }
    }

    fn grid_text(interp: &Interp, y: u16) -> String {
        let mut grid = Grid::new(0, 0);
        interp.compose(&mut grid);
        grid.row(y).iter().map(|c| c.display()).collect()
    }

    #[test]
    fn cup_is_one_based() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[5;10H");
        let caret = interp.active().caret();
        assert_eq!((caret.x, caret.y), (9, 4));
    }

    #[test]
    fn sgr_colors_apply_to_printed_cells() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[1;31mA\x1b[0mB");
        let mut grid = Grid::new(0, 0);
        interp.compose(&mut grid);
        let a = grid.cell(0, 0).unwrap();
        assert_eq!(a.fg, Color::Indexed(1));
        assert!(a.flags.contains(StyleFlags::BOLD));
        let b = grid.cell(1, 0).unwrap();
        assert_eq!(b.fg, Color::Default);
        assert!(b.flags.is_empty());
    }

    #[test]
    fn truecolor_sgr() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[38;2;10;20;30mX");
        let mut grid = Grid::new(0, 0);
        interp.compose(&mut grid);
        assert_eq!(grid.cell(0, 0).unwrap().fg, Color::rgb(10, 20, 30));
    }

    #[test]
    fn dsr_reports_caret_position() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[3;7H\x1b[6n");
        assert_eq!(interp.take_replies(), vec![Response::CursorPosition(3, 7)]);
        assert!(interp.take_replies().is_empty());
    }

    #[test]
    fn alt_screen_swap_preserves_primary() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "hello");
        feed(&mut interp, &mut parser, "\x1b[?1049h");
        assert!(interp.alt_active());
        assert_eq!(&grid_text(&interp, 0)[..5], "     ");
        feed(&mut interp, &mut parser, "alt!");
        feed(&mut interp, &mut parser, "\x1b[?1049l");
        assert!(!interp.alt_active());
        assert_eq!(&grid_text(&interp, 0)[..5], "hello");
        // Caret restored to where it was when the swap happened.
        assert_eq!(interp.active().caret().x, 5);
    }

    #[test]
    fn scroll_region_with_su() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        for y in 0..12 {
            feed(
                &mut interp,
                &mut parser,
                &format!("\x1b[{};1H{}", y + 1, (b'a' + y as u8) as char),
            );
        }
        feed(&mut interp, &mut parser, "\x1b[5;10r\x1b[3S");
        assert_eq!(&grid_text(&interp, 3)[..1], "d");
        assert_eq!(&grid_text(&interp, 4)[..1], "h");
        assert_eq!(&grid_text(&interp, 9)[..1], " ");
        assert_eq!(&grid_text(&interp, 10)[..1], "k");
    }

    #[test]
    fn tabs_default_every_eight() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\tA\tB");
        assert_eq!(&grid_text(&interp, 0)[8..9], "A");
        assert_eq!(&grid_text(&interp, 0)[16..17], "B");
    }

    #[test]
    fn tab_set_and_clear() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        // Set a stop at column 3, clear all default stops first.
        feed(&mut interp, &mut parser, "\x1b[3g\x1b[1;4H\x1bH\x1b[1;1H\tZ");
        assert_eq!(&grid_text(&interp, 0)[3..4], "Z");
    }

    #[test]
    fn rep_repeats_last_glyph() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "x\x1b[4b");
        assert_eq!(&grid_text(&interp, 0)[..6], "xxxxx ");
    }

    #[test]
    fn insert_mode_shifts_tail() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "abc\x1b[1;1H\x1b[4hX");
        assert_eq!(&grid_text(&interp, 0)[..4], "Xabc");
        feed(&mut interp, &mut parser, "\x1b[4l");
        assert!(!interp.modes().insert);
    }

    #[test]
    fn soft_reset_keeps_content() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[31mkeep\x1b[!p");
        assert_eq!(&grid_text(&interp, 0)[..4], "keep");
        assert_eq!(interp.brush().fg, Color::Default);
    }

    #[test]
    fn hard_reset_clears_everything() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b]0;title\x07gone\x1bc");
        assert_eq!(&grid_text(&interp, 0)[..4], "    ");
        assert_eq!(interp.title(), "");
    }

    #[test]
    fn osc_sets_title() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b]2;my session\x1b\\");
        assert_eq!(interp.title(), "my session");
    }

    #[test]
    fn decscusr_selects_style() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[5 q");
        assert_eq!(interp.cursor_style(), CursorStyle::BlinkingBar);
    }

    #[test]
    fn autowrap_off_pins_to_margin() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[?7l");
        for _ in 0..85 {
            feed(&mut interp, &mut parser, "x");
        }
        let caret = interp.active().caret();
        assert_eq!((caret.x, caret.y), (79, 0));
        assert_eq!(interp.active().line(0).unwrap().height(80), 1);
    }

    #[test]
    fn origin_mode_homes_to_region() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[5;10r\x1b[?6h\x1b[1;1H");
        assert_eq!(interp.active().caret().y, 4);
    }

    #[test]
    fn da_and_status_replies() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[c\x1b[>c\x1b[5n");
        assert_eq!(
            interp.take_replies(),
            vec![
                Response::DeviceAttributes,
                Response::SecondaryDeviceAttributes,
                Response::DeviceOk,
            ]
        );
    }

    #[test]
    fn huge_csi_arguments_clamp_to_margins() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1b[65535B\x1b[65535B\x1b[65535C");
        let caret = interp.active().caret();
        assert_eq!((caret.x, caret.y), (79, 23));
        feed(&mut interp, &mut parser, "\x1b[1;10r\x1b[?6h\x1b[65535;1H");
        assert_eq!(interp.active().caret().y, 9);
    }

    #[test]
    fn hard_reset_keeps_scrollback_capacity() {
        let mut interp = Interp::new(80, 4, 1000);
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1bc");
        for _ in 0..10 {
            feed(&mut interp, &mut parser, "\x1b[4;1H\n");
        }
        assert!(interp.active().count() > 4);
    }

    #[test]
    fn unknown_sequences_are_ignored() {
        let mut interp = interp();
        let mut parser = VtParser::new();
        feed(&mut interp, &mut parser, "\x1bZa\x1b[99zb");
        assert_eq!(&grid_text(&interp, 0)[..2], "ab");
    }
}
