//! Streaming input decoder
//!
//! Turns the raw byte stream arriving from the controlling terminal into
//! [`InputEvent`]s. Reads can split anywhere, including inside an escape
//! sequence or a multi-byte character; whatever cannot be decided yet stays
//! buffered until the next feed.
//!
//! Recognized traffic: UTF-8 text, SGR and legacy mouse reports, focus
//! in/out, `CSI 8;rows;cols t` resize reports, bracketed paste, and the
//! private `CSI id;fields _` record format for pre-decoded platform events.
//! Two adjacent ESC bytes anywhere in the stream request shutdown.

use super::event::{vk, Buttons, InputEvent, Mods};

const MAX_SEQUENCE: usize = 1024;
const PASTE_END: &[u8] = b"\x1b[201~";

enum Step {
    /// Not enough bytes to decide.
    Need,
    /// Consume `1` bytes, emit `0`.
    Emit(Vec<InputEvent>, usize),
    /// Consume without emitting.
    Skip(usize),
}

/// Incremental decoder over the inbound byte stream.
#[derive(Default)]
pub struct InputDecoder {
    buf: Vec<u8>,
    held: Buttons,
    paste: Option<Vec<u8>>,
    finished: bool,
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `bytes` as possible, buffering any trailing
    /// fragment.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<InputEvent> {
        let mut out = Vec::new();
        if self.finished {
            return out;
        }
        self.buf.extend_from_slice(bytes);
        self.drain(&mut out, false);
        out
    }

    /// The stream ended: flush buffered fragments and emit a final `Quit`.
    /// Calling again is a no-op.
    pub fn end_of_stream(&mut self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        if self.finished {
            return out;
        }
        self.drain(&mut out, true);
        if let Some(paste) = self.paste.take() {
            out.push(InputEvent::Paste(
                String::from_utf8_lossy(&paste).into_owned(),
            ));
        }
        out.push(InputEvent::Quit);
        self.finished = true;
        out
    }

    fn drain(&mut self, out: &mut Vec<InputEvent>, eos: bool) {
        loop {
            if self.paste.is_some() {
                if !self.drain_paste(out, eos) {
                    return;
                }
                continue;
            }
            if self.buf.is_empty() {
                return;
            }
            match self.decode_front(eos) {
                Step::Need => {
                    // Runaway sequence guard: drop the ESC and rescan.
                    if self.buf.len() > MAX_SEQUENCE {
                        tracing::warn!(len = self.buf.len(), "discarding oversized sequence");
                        self.buf.remove(0);
                        continue;
                    }
                    return;
                }
                Step::Emit(events, n) => {
                    self.buf.drain(..n);
                    out.extend(events);
                }
                Step::Skip(n) => {
                    self.buf.drain(..n);
                }
            }
        }
    }

    /// Accumulate paste bytes until the end marker. Returns false when more
    /// input is needed.
    fn drain_paste(&mut self, out: &mut Vec<InputEvent>, eos: bool) -> bool {
        let Some(paste) = self.paste.as_mut() else {
            return true;
        };
        if let Some(pos) = find(&self.buf, PASTE_END) {
            paste.extend_from_slice(&self.buf[..pos]);
            self.buf.drain(..pos + PASTE_END.len());
            let paste = self.paste.take().unwrap_or_default();
            out.push(InputEvent::Paste(
                String::from_utf8_lossy(&paste).into_owned(),
            ));
            return true;
        }
        if eos {
            paste.extend_from_slice(&self.buf);
            self.buf.clear();
            return false;
        }
        // Keep a tail that could be the start of the end marker.
        let keep = (PASTE_END.len() - 1).min(self.buf.len());
        let take = self.buf.len() - keep;
        paste.extend_from_slice(&self.buf[..take]);
        self.buf.drain(..take);
        false
    }

    fn decode_front(&mut self, eos: bool) -> Step {
        if self.buf[0] != 0x1B {
            return self.decode_text(eos);
        }
        let Some(&second) = self.buf.get(1) else {
            return if eos {
                Step::Emit(vec![InputEvent::key(vk::ESCAPE, Mods::empty())], 1)
            } else {
                Step::Need
            };
        };
        match second {
            // Double-ESC anywhere requests shutdown, regardless of how the
            // two bytes arrived.
            0x1B => Step::Emit(vec![InputEvent::Quit], 2),
            b'[' => self.decode_csi(eos),
            b'O' => match self.buf.get(2) {
                None if !eos => Step::Need,
                None => Step::Emit(vec![InputEvent::key(vk::ESCAPE, Mods::empty())], 1),
                Some(&b) => match ss3_key(b) {
                    Some(code) => Step::Emit(vec![InputEvent::key(code, Mods::empty())], 3),
                    None => Step::Skip(3),
                },
            },
            _ => self.decode_alt_key(eos),
        }
    }

    /// `ESC` + printable: Alt-modified text input.
    fn decode_alt_key(&mut self, eos: bool) -> Step {
        match next_char(&self.buf[1..]) {
            CharStep::Incomplete if !eos => Step::Need,
            CharStep::Incomplete => Step::Skip(self.buf.len()),
            CharStep::Invalid => Step::Skip(2),
            CharStep::Char(ch, len) => {
                if ch.is_control() {
                    return Step::Skip(1 + len);
                }
                Step::Emit(
                    vec![InputEvent::Key {
                        virtual_code: 0,
                        scan_code: 0,
                        cluster: ch.to_string(),
                        pressed: true,
                        mods: Mods::ALT,
                    }],
                    1 + len,
                )
            }
        }
    }

    fn decode_text(&mut self, eos: bool) -> Step {
        match next_char(&self.buf) {
            CharStep::Incomplete if !eos => Step::Need,
            CharStep::Incomplete => Step::Emit(vec![InputEvent::text("\u{FFFD}")], self.buf.len()),
            CharStep::Invalid => Step::Emit(vec![InputEvent::text("\u{FFFD}")], 1),
            CharStep::Char(ch, len) => Step::Emit(vec![text_event(ch)], len),
        }
    }

    fn decode_csi(&mut self, eos: bool) -> Step {
        // Legacy X10 mouse: ESC [ M cb cx cy, fixed length.
        if self.buf.get(2) == Some(&b'M') {
            if self.buf.len() < 6 {
                return if eos { Step::Skip(self.buf.len()) } else { Step::Need };
            }
            let cb = self.buf[3].saturating_sub(32);
            let cx = self.buf[4].saturating_sub(32) as i16 - 1;
            let cy = self.buf[5].saturating_sub(32) as i16 - 1;
            let event = self.legacy_mouse(cb, cx, cy);
            return Step::Emit(event.into_iter().collect(), 6);
        }

        let mut i = 2;
        let mut private: Option<u8> = None;
        if let Some(&b @ (b'<' | b'?' | b'>' | b'=')) = self.buf.get(i) {
            private = Some(b);
            i += 1;
        }
        let params_start = i;
        while let Some(&b) = self.buf.get(i) {
            match b {
                b'0'..=b'9' | b';' | b':' => i += 1,
                0x40..=0x7E => {
                    let params = parse_params(&self.buf[params_start..i]);
                    let step = self.dispatch_csi(private, &params, b, i + 1);
                    return step;
                }
                _ => return Step::Skip(i + 1),
            }
        }
        if eos {
            Step::Skip(self.buf.len())
        } else {
            Step::Need
        }
    }

    fn dispatch_csi(&mut self, private: Option<u8>, params: &[u16], final_byte: u8, len: usize) -> Step {
        match (private, final_byte) {
            (Some(b'<'), b'M') | (Some(b'<'), b'm') => {
                let event = self.sgr_mouse(params, final_byte == b'M');
                Step::Emit(event.into_iter().collect(), len)
            }
            (None, b'I') => Step::Emit(vec![InputEvent::Focus(true)], len),
            (None, b'O') => Step::Emit(vec![InputEvent::Focus(false)], len),
            (None, b't') if params.first() == Some(&8) && params.len() >= 3 => {
                Step::Emit(
                    vec![InputEvent::Resize {
                        cols: params[2],
                        rows: params[1],
                    }],
                    len,
                )
            }
            (None, b'_') => Step::Emit(self.record(params).into_iter().collect(), len),
            (None, b'~') => self.tilde_key(params, len),
            (None, b'A') => Step::Emit(vec![InputEvent::key(vk::UP, param_mods(params))], len),
            (None, b'B') => Step::Emit(vec![InputEvent::key(vk::DOWN, param_mods(params))], len),
            (None, b'C') => Step::Emit(vec![InputEvent::key(vk::RIGHT, param_mods(params))], len),
            (None, b'D') => Step::Emit(vec![InputEvent::key(vk::LEFT, param_mods(params))], len),
            (None, b'H') => Step::Emit(vec![InputEvent::key(vk::HOME, param_mods(params))], len),
            (None, b'F') => Step::Emit(vec![InputEvent::key(vk::END, param_mods(params))], len),
            (None, b'Z') => Step::Emit(vec![InputEvent::key(vk::TAB, Mods::SHIFT)], len),
            (None, b'P') => Step::Emit(vec![InputEvent::key(vk::F1, param_mods(params))], len),
            (None, b'Q') => Step::Emit(vec![InputEvent::key(vk::F2, param_mods(params))], len),
            (None, b'S') => Step::Emit(vec![InputEvent::key(vk::F4, param_mods(params))], len),
            _ => {
                tracing::debug!(
                    ?private,
                    ?params,
                    final_byte = final_byte as u32,
                    "ignoring unrecognized input sequence"
                );
                Step::Skip(len)
            }
        }
    }

    fn tilde_key(&mut self, params: &[u16], len: usize) -> Step {
        let mods = param_mods(params);
        let code = match params.first().copied().unwrap_or(0) {
            200 => {
                self.paste = Some(Vec::new());
                return Step::Skip(len);
            }
            201 => return Step::Skip(len), // stray end marker
            1 | 7 => vk::HOME,
            2 => vk::INSERT,
            3 => vk::DELETE,
            4 | 8 => vk::END,
            5 => vk::PRIOR,
            6 => vk::NEXT,
            11 => vk::F1,
            12 => vk::F2,
            13 => vk::F3,
            14 => vk::F4,
            15 => vk::F5,
            17 => vk::F6,
            18 => vk::F7,
            19 => vk::F8,
            20 => vk::F9,
            21 => vk::F10,
            23 => vk::F11,
            24 => vk::F12,
            other => {
                tracing::debug!(code = other, "ignoring unknown tilde key");
                return Step::Skip(len);
            }
        };
        Step::Emit(vec![InputEvent::key(code, mods)], len)
    }

    /// SGR mouse report: `CSI < b ; x ; y M|m`.
    fn sgr_mouse(&mut self, params: &[u16], press: bool) -> Option<InputEvent> {
        let b = *params.first()?;
        let x = *params.get(1)? as i16 - 1;
        let y = *params.get(2)? as i16 - 1;
        let mods = button_mods(b);
        let mut wheel = 0i16;
        if b & 64 != 0 && b & 128 == 0 {
            wheel = if b & 3 == 0 { 1 } else { -1 };
        } else if let Some(button) = button_bit(b) {
            if press {
                self.held |= button;
            } else {
                self.held -= button;
            }
        }
        Some(InputEvent::Mouse {
            x,
            y,
            buttons: self.held,
            wheel,
            mods,
        })
    }

    fn legacy_mouse(&mut self, cb: u8, x: i16, y: i16) -> Option<InputEvent> {
        let b = cb as u16;
        let mods = button_mods(b);
        let mut wheel = 0i16;
        if b & 64 != 0 {
            wheel = if b & 3 == 0 { 1 } else { -1 };
        } else if b & 3 == 3 {
            // X10 release does not say which button went up.
            self.held = Buttons::empty();
        } else if let Some(button) = button_bit(b) {
            self.held |= button;
        }
        Some(InputEvent::Mouse {
            x,
            y,
            buttons: self.held,
            wheel,
            mods,
        })
    }

    /// Pre-decoded platform records: `CSI id ; fields… _`.
    fn record(&mut self, params: &[u16]) -> Option<InputEvent> {
        match params.first()? {
            1 => {
                let virtual_code = *params.get(1)?;
                let scan_code = *params.get(2)?;
                let uc = *params.get(3)? as u32;
                let pressed = *params.get(4)? != 0;
                let mods = wire_mods(*params.get(5).unwrap_or(&0));
                let cluster = match char::from_u32(uc) {
                    Some(ch) if uc != 0 => ch.to_string(),
                    _ => String::new(),
                };
                Some(InputEvent::Key {
                    virtual_code,
                    scan_code,
                    cluster,
                    pressed,
                    mods,
                })
            }
            2 => {
                let x = *params.get(1)? as i16;
                let y = *params.get(2)? as i16;
                let buttons = Buttons::from_bits_truncate(*params.get(3)? as u8);
                let wheel = *params.get(4)? as i16;
                let mods = wire_mods(*params.get(5).unwrap_or(&0));
                self.held = buttons;
                Some(InputEvent::Mouse {
                    x,
                    y,
                    buttons,
                    wheel,
                    mods,
                })
            }
            3 => Some(InputEvent::Focus(*params.get(1)? != 0)),
            4 => Some(InputEvent::Resize {
                cols: *params.get(1)?,
                rows: *params.get(2)?,
            }),
            id => {
                tracing::debug!(id, "ignoring unknown record id");
                None
            }
        }
    }
}

/// Split a run of digits and separators into numeric parameters.
fn parse_params(bytes: &[u8]) -> Vec<u16> {
    if bytes.is_empty() {
        return Vec::new();
    }
    bytes
        .split(|&b| b == b';' || b == b':')
        .map(|chunk| {
            chunk.iter().fold(0u16, |acc, &b| {
                acc.saturating_mul(10).saturating_add((b - b'0') as u16)
            })
        })
        .collect()
}

enum CharStep {
    Char(char, usize),
    Incomplete,
    Invalid,
}

/// Decode the first UTF-8 character of `bytes`.
fn next_char(bytes: &[u8]) -> CharStep {
    if bytes.is_empty() {
        return CharStep::Incomplete;
    }
    let want = match bytes[0] {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return CharStep::Invalid,
    };
    if bytes.len() < want {
        return CharStep::Incomplete;
    }
    match std::str::from_utf8(&bytes[..want]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => CharStep::Char(ch, want),
            None => CharStep::Invalid,
        },
        Err(_) => CharStep::Invalid,
    }
}

fn text_event(ch: char) -> InputEvent {
    match ch {
        '\r' | '\n' => InputEvent::Key {
            virtual_code: vk::RETURN,
            scan_code: 0,
            cluster: "\r".to_string(),
            pressed: true,
            mods: Mods::empty(),
        },
        '\t' => InputEvent::Key {
            virtual_code: vk::TAB,
            scan_code: 0,
            cluster: "\t".to_string(),
            pressed: true,
            mods: Mods::empty(),
        },
        '\u{7F}' | '\u{08}' => InputEvent::key(vk::BACK, Mods::empty()),
        ch if (ch as u32) < 0x20 => {
            // Ctrl+letter arrives as the bare control byte.
            let letter = char::from((ch as u8) + 0x60);
            InputEvent::Key {
                virtual_code: 0,
                scan_code: 0,
                cluster: letter.to_string(),
                pressed: true,
                mods: Mods::CTRL,
            }
        }
        ch => InputEvent::text(ch.to_string()),
    }
}

fn ss3_key(b: u8) -> Option<u16> {
    match b {
        b'A' => Some(vk::UP),
        b'B' => Some(vk::DOWN),
        b'C' => Some(vk::RIGHT),
        b'D' => Some(vk::LEFT),
        b'H' => Some(vk::HOME),
        b'F' => Some(vk::END),
        b'P' => Some(vk::F1),
        b'Q' => Some(vk::F2),
        b'R' => Some(vk::F3),
        b'S' => Some(vk::F4),
        _ => None,
    }
}

/// xterm modifier parameter (`1 + bits`): shift 1, alt 2, ctrl 4.
fn param_mods(params: &[u16]) -> Mods {
    wire_mods(params.get(1).copied().unwrap_or(1).saturating_sub(1))
}

fn wire_mods(bits: u16) -> Mods {
    let mut mods = Mods::empty();
    if bits & 1 != 0 {
        mods |= Mods::SHIFT;
    }
    if bits & 2 != 0 {
        mods |= Mods::ALT;
    }
    if bits & 4 != 0 {
        mods |= Mods::CTRL;
    }
    mods
}

/// Modifier bits carried inside a mouse button code.
fn button_mods(b: u16) -> Mods {
    let mut mods = Mods::empty();
    if b & 4 != 0 {
        mods |= Mods::SHIFT;
    }
    if b & 8 != 0 {
        mods |= Mods::ALT;
    }
    if b & 16 != 0 {
        mods |= Mods::CTRL;
    }
    mods
}

fn button_bit(b: u16) -> Option<Buttons> {
    if b & 128 != 0 {
        return match b & 3 {
            0 => Some(Buttons::EXTRA1),
            1 => Some(Buttons::EXTRA2),
            2 => Some(Buttons::EXTRA3),
            _ => None,
        };
    }
    match b & 3 {
        0 => Some(Buttons::LEFT),
        1 => Some(Buttons::MIDDLE),
        2 => Some(Buttons::RIGHT),
        _ => None,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_events() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"hi");
        assert_eq!(events, vec![InputEvent::text("h"), InputEvent::text("i")]);
    }

    #[test]
    fn unrecognized_sequence_skips_without_eating_text() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"\x1b[5uok");
        assert_eq!(events, vec![InputEvent::text("o"), InputEvent::text("k")]);
    }

    #[test]
    fn utf8_split_across_reads() {
        let mut dec = InputDecoder::new();
        let bytes = "語".as_bytes();
        assert!(dec.feed(&bytes[..2]).is_empty());
        assert_eq!(dec.feed(&bytes[2..]), vec![InputEvent::text("語")]);
    }

    #[test]
    fn sgr_mouse_press_move_release() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"\x1b[<0;10;5M\x1b[<32;11;5M\x1b[<0;11;5m");
        assert_eq!(
            events[0],
            InputEvent::Mouse {
                x: 9,
                y: 4,
                buttons: Buttons::LEFT,
                wheel: 0,
                mods: Mods::empty(),
            }
        );
        // Drag keeps the button held.
        assert_eq!(
            events[1],
            InputEvent::Mouse {
                x: 10,
                y: 4,
                buttons: Buttons::LEFT,
                wheel: 0,
                mods: Mods::empty(),
            }
        );
        assert_eq!(
            events[2],
            InputEvent::Mouse {
                x: 10,
                y: 4,
                buttons: Buttons::empty(),
                wheel: 0,
                mods: Mods::empty(),
            }
        );
    }

    #[test]
    fn sgr_wheel_and_mods() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"\x1b[<64;3;3M\x1b[<81;3;3M");
        assert_eq!(
            events[0],
            InputEvent::Mouse {
                x: 2,
                y: 2,
                buttons: Buttons::empty(),
                wheel: 1,
                mods: Mods::empty(),
            }
        );
        // 81 = 64 (wheel) + 16 (ctrl) + 1 (down).
        assert_eq!(
            events[1],
            InputEvent::Mouse {
                x: 2,
                y: 2,
                buttons: Buttons::empty(),
                wheel: -1,
                mods: Mods::CTRL,
            }
        );
    }

    #[test]
    fn mouse_sequence_split_anywhere() {
        let mut dec = InputDecoder::new();
        let full = b"\x1b[<2;7;8M";
        for split in 1..full.len() {
            let mut dec2 = InputDecoder::new();
            assert!(dec2.feed(&full[..split]).is_empty(), "split at {split}");
            let events = dec2.feed(&full[split..]);
            assert_eq!(events.len(), 1, "split at {split}");
        }
        let events = dec.feed(full);
        assert_eq!(
            events[0],
            InputEvent::Mouse {
                x: 6,
                y: 7,
                buttons: Buttons::RIGHT,
                wheel: 0,
                mods: Mods::empty(),
            }
        );
    }

    #[test]
    fn focus_events() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"\x1b[I\x1b[O");
        assert_eq!(events, vec![InputEvent::Focus(true), InputEvent::Focus(false)]);
    }

    #[test]
    fn resize_report() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"\x1b[8;30;100t");
        assert_eq!(events, vec![InputEvent::Resize { cols: 100, rows: 30 }]);
    }

    #[test]
    fn vendor_key_record() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"\x1b[1;65;30;97;1;4_");
        assert_eq!(
            events,
            vec![InputEvent::Key {
                virtual_code: 65,
                scan_code: 30,
                cluster: "a".to_string(),
                pressed: true,
                mods: Mods::CTRL,
            }]
        );
    }

    #[test]
    fn vendor_resize_record() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"\x1b[4;120;40_");
        assert_eq!(events, vec![InputEvent::Resize { cols: 120, rows: 40 }]);
    }

    #[test]
    fn double_esc_quits_across_reads() {
        let mut dec = InputDecoder::new();
        assert!(dec.feed(b"\x1b").is_empty());
        assert_eq!(dec.feed(b"\x1b"), vec![InputEvent::Quit]);
    }

    #[test]
    fn alt_key_is_not_quit() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"\x1bx");
        assert_eq!(
            events,
            vec![InputEvent::Key {
                virtual_code: 0,
                scan_code: 0,
                cluster: "x".to_string(),
                pressed: true,
                mods: Mods::ALT,
            }]
        );
    }

    #[test]
    fn arrows_and_function_keys() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(b"\x1b[A\x1b[1;5D\x1bOP\x1b[24~");
        assert_eq!(events[0], InputEvent::key(vk::UP, Mods::empty()));
        assert_eq!(events[1], InputEvent::key(vk::LEFT, Mods::CTRL));
        assert_eq!(events[2], InputEvent::key(vk::F1, Mods::empty()));
        assert_eq!(events[3], InputEvent::key(vk::F12, Mods::empty()));
    }

    #[test]
    fn bracketed_paste_collects_payload() {
        let mut dec = InputDecoder::new();
        let mut events = dec.feed(b"\x1b[200~hel");
        events.extend(dec.feed(b"lo\x1b[20"));
        events.extend(dec.feed(b"1~z"));
        assert_eq!(
            events,
            vec![InputEvent::Paste("hello".to_string()), InputEvent::text("z")]
        );
    }

    #[test]
    fn legacy_mouse_report() {
        let mut dec = InputDecoder::new();
        // ESC [ M, button 0 press at (5, 3) → 32+0, 32+5, 32+3.
        let events = dec.feed(&[0x1B, b'[', b'M', 32, 37, 35]);
        assert_eq!(
            events,
            vec![InputEvent::Mouse {
                x: 4,
                y: 2,
                buttons: Buttons::LEFT,
                wheel: 0,
                mods: Mods::empty(),
            }]
        );
    }

    #[test]
    fn end_of_stream_quits_exactly_once() {
        let mut dec = InputDecoder::new();
        dec.feed(b"a");
        assert_eq!(dec.end_of_stream(), vec![InputEvent::Quit]);
        assert!(dec.end_of_stream().is_empty());
        assert!(dec.feed(b"more").is_empty());
    }

    #[test]
    fn lone_esc_at_end_of_stream_is_a_key() {
        let mut dec = InputDecoder::new();
        dec.feed(b"\x1b");
        assert_eq!(
            dec.end_of_stream(),
            vec![InputEvent::key(vk::ESCAPE, Mods::empty()), InputEvent::Quit]
        );
    }

    #[test]
    fn ctrl_letter_from_control_byte() {
        let mut dec = InputDecoder::new();
        let events = dec.feed(&[0x03]);
        assert_eq!(
            events,
            vec![InputEvent::Key {
                virtual_code: 0,
                scan_code: 0,
                cluster: "c".to_string(),
                pressed: true,
                mods: Mods::CTRL,
            }]
        );
    }
}
