//! VT sequence parser
//!
//! A character-at-a-time state machine. The parser owns only sequence
//! assembly (parameters, intermediates, OSC payloads); every recognized
//! action is handed to a [`Perform`] implementation, which keeps the grammar
//! independent from the screen model it drives.

/// Assembled CSI arguments handed to the dispatcher with the final byte.
#[derive(Debug)]
pub struct CsiArgs<'a> {
    pub params: &'a [u16],
    pub intermediates: &'a [u8],
}

impl CsiArgs<'_> {
    /// Parameter `i`, or `default` when absent.
    pub fn arg(&self, i: usize, default: u16) -> u16 {
        self.params.get(i).copied().unwrap_or(default)
    }

    /// Parameter `i` with zero treated as `default` (the common "default 1"
    /// CSI convention).
    pub fn arg_or(&self, i: usize, default: u16) -> u16 {
        match self.params.get(i).copied() {
            Some(0) | None => default,
            Some(v) => v,
        }
    }

    /// True for DEC private sequences (`CSI ?`).
    pub fn private(&self) -> bool {
        self.intermediates.contains(&b'?')
    }

    /// True for `CSI >` prefixed sequences.
    pub fn gt(&self) -> bool {
        self.intermediates.contains(&b'>')
    }
}

/// Receiver for parsed terminal actions.
pub trait Perform {
    /// A printable character reached ground state.
    fn print(&mut self, ch: char);
    /// A C0 control byte (never ESC).
    fn control(&mut self, byte: u8);
    /// A complete non-CSI escape sequence.
    fn esc_dispatch(&mut self, intermediates: &[u8], byte: u8);
    /// A complete CSI sequence.
    fn csi_dispatch(&mut self, args: &CsiArgs, final_byte: u8);
    /// A complete OSC string (terminated by BEL or ST).
    fn osc_dispatch(&mut self, payload: &str);
}

/// Parser state machine.
pub struct VtParser {
    state: ParserState,
    params: Vec<u16>,
    intermediates: Vec<u8>,
    current_param: Option<u16>,
    osc_string: String,
}

#[derive(Clone, Copy, Default, PartialEq)]
enum ParserState {
    #[default]
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    OscString,
    EscapeInOsc, // ESC received within OSC, waiting for backslash
}

impl Default for VtParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VtParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Ground,
            params: Vec::with_capacity(16),
            intermediates: Vec::with_capacity(4),
            current_param: None,
            osc_string: String::new(),
        }
    }

    /// Feed a single decoded character.
    pub fn feed(&mut self, ch: char, performer: &mut impl Perform) {
        let byte = if (ch as u32) <= 0x7F { ch as u8 } else { 0xFF };

        // C0 controls act anywhere except inside an OSC payload, where only
        // BEL and ESC are significant. ESC always restarts the sequence.
        if byte < 0x20
            && self.state != ParserState::OscString
            && self.state != ParserState::EscapeInOsc
        {
            if byte == 0x1B {
                self.enter_escape();
            } else {
                performer.control(byte);
            }
            return;
        }

        match self.state {
            ParserState::Ground => self.ground(ch, performer),
            ParserState::Escape => self.escape(byte, performer),
            ParserState::EscapeIntermediate => self.escape_intermediate(byte, performer),
            ParserState::CsiEntry => self.csi_entry(byte, performer),
            ParserState::CsiParam => self.csi_param(byte, performer),
            ParserState::CsiIntermediate => self.csi_intermediate(byte, performer),
            ParserState::OscString => self.osc_string_state(ch, performer),
            ParserState::EscapeInOsc => self.escape_in_osc(byte, performer),
        }
    }

    /// True while a sequence is being assembled. Test support.
    #[cfg(test)]
    pub fn mid_sequence(&self) -> bool {
        self.state != ParserState::Ground
    }

    fn enter_escape(&mut self) {
        self.state = ParserState::Escape;
        self.params.clear();
        self.intermediates.clear();
        self.current_param = None;
    }

    fn ground(&mut self, ch: char, performer: &mut impl Perform) {
        if ch as u32 >= 0x20 && ch != '\u{7F}' {
            performer.print(ch);
        }
    }

    fn escape(&mut self, byte: u8, performer: &mut impl Perform) {
        match byte {
            b'[' => {
                self.state = ParserState::CsiEntry;
                self.params.clear();
                self.intermediates.clear();
                self.current_param = None;
            }
            b']' => {
                self.state = ParserState::OscString;
                self.osc_string.clear();
            }
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = ParserState::EscapeIntermediate;
            }
            0x30..=0x7E => {
                performer.esc_dispatch(&self.intermediates, byte);
                self.state = ParserState::Ground;
            }
            _ => {
                self.state = ParserState::Ground;
            }
        }
    }

    fn escape_intermediate(&mut self, byte: u8, performer: &mut impl Perform) {
        match byte {
            0x20..=0x2F => {
                self.intermediates.push(byte);
            }
            0x30..=0x7E => {
                performer.esc_dispatch(&self.intermediates, byte);
                self.state = ParserState::Ground;
            }
            _ => {
                self.state = ParserState::Ground;
            }
        }
    }

    fn csi_entry(&mut self, byte: u8, performer: &mut impl Perform) {
        match byte {
            b'0'..=b'9' => {
                self.current_param = Some((byte - b'0') as u16);
                self.state = ParserState::CsiParam;
            }
            b';' => {
                self.params.push(0);
                self.state = ParserState::CsiParam;
            }
            b'?' | b'>' | b'!' | b'=' => {
                self.intermediates.push(byte);
            }
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = ParserState::CsiIntermediate;
            }
            0x40..=0x7E => self.execute_csi(byte, performer),
            _ => {
                self.state = ParserState::Ground;
            }
        }
    }

    fn csi_param(&mut self, byte: u8, performer: &mut impl Perform) {
        match byte {
            b'0'..=b'9' => {
                let digit = (byte - b'0') as u16;
                self.current_param = Some(
                    self.current_param
                        .unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(digit),
                );
            }
            // Subparameter colons are folded into ordinary separators.
            b';' | b':' => {
                self.params.push(self.current_param.take().unwrap_or(0));
            }
            0x20..=0x2F => {
                if let Some(p) = self.current_param.take() {
                    self.params.push(p);
                }
                self.intermediates.push(byte);
                self.state = ParserState::CsiIntermediate;
            }
            0x40..=0x7E => {
                if let Some(p) = self.current_param.take() {
                    self.params.push(p);
                }
                self.execute_csi(byte, performer);
            }
            _ => {
                self.state = ParserState::Ground;
            }
        }
    }

    fn csi_intermediate(&mut self, byte: u8, performer: &mut impl Perform) {
        match byte {
            0x20..=0x2F => {
                self.intermediates.push(byte);
            }
            0x40..=0x7E => self.execute_csi(byte, performer),
            _ => {
                self.state = ParserState::Ground;
            }
        }
    }

    fn osc_string_state(&mut self, ch: char, performer: &mut impl Perform) {
        match ch {
            '\u{07}' | '\u{9C}' => {
                performer.osc_dispatch(&self.osc_string);
                self.state = ParserState::Ground;
            }
            '\u{1B}' => {
                self.state = ParserState::EscapeInOsc;
            }
            _ => {
                self.osc_string.push(ch);
            }
        }
    }

    /// ESC within an OSC payload: `ESC \` is the string terminator, anything
    /// else terminates the OSC and starts a fresh escape sequence.
    fn escape_in_osc(&mut self, byte: u8, performer: &mut impl Perform) {
        performer.osc_dispatch(&self.osc_string);
        if byte == b'\\' {
            self.state = ParserState::Ground;
        } else {
            self.enter_escape();
            self.escape(byte, performer);
        }
    }

    fn execute_csi(&mut self, final_byte: u8, performer: &mut impl Perform) {
        let args = CsiArgs {
            params: &self.params,
            intermediates: &self.intermediates,
        };
        performer.csi_dispatch(&args, final_byte);
        self.state = ParserState::Ground;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        printed: String,
        controls: Vec<u8>,
        escs: Vec<(Vec<u8>, u8)>,
        csis: Vec<(Vec<u16>, Vec<u8>, u8)>,
        oscs: Vec<String>,
    }

    impl Perform for Recorder {
        fn print(&mut self, ch: char) {
            self.printed.push(ch);
        }
        fn control(&mut self, byte: u8) {
            self.controls.push(byte);
        }
        fn esc_dispatch(&mut self, intermediates: &[u8], byte: u8) {
            self.escs.push((intermediates.to_vec(), byte));
        }
        fn csi_dispatch(&mut self, args: &CsiArgs, final_byte: u8) {
            self.csis
                .push((args.params.to_vec(), args.intermediates.to_vec(), final_byte));
        }
        fn osc_dispatch(&mut self, payload: &str) {
            self.oscs.push(payload.to_string());
        }
    }

    fn feed_str(parser: &mut VtParser, recorder: &mut Recorder, s: &str) {
        for ch in s.chars() {
            parser.feed(ch, recorder);
        }
    }

    #[test]
    fn csi_params_and_final() {
        let mut parser = VtParser::new();
        let mut rec = Recorder::default();
        feed_str(&mut parser, &mut rec, "\x1b[5;10H");
        assert_eq!(rec.csis, vec![(vec![5, 10], vec![], b'H')]);
    }

    #[test]
    fn private_marker_is_an_intermediate() {
        let mut parser = VtParser::new();
        let mut rec = Recorder::default();
        feed_str(&mut parser, &mut rec, "\x1b[?25l");
        assert_eq!(rec.csis, vec![(vec![25], vec![b'?'], b'l')]);
    }

    #[test]
    fn controls_pass_through_mid_sequence() {
        let mut parser = VtParser::new();
        let mut rec = Recorder::default();
        feed_str(&mut parser, &mut rec, "\x1b[3\x0dm");
        // CR executes inside the CSI and the sequence still completes.
        assert_eq!(rec.controls, vec![0x0D]);
        assert_eq!(rec.csis, vec![(vec![3], vec![], b'm')]);
    }

    #[test]
    fn osc_terminated_by_bel_and_st() {
        let mut parser = VtParser::new();
        let mut rec = Recorder::default();
        feed_str(&mut parser, &mut rec, "\x1b]0;hello\x07");
        feed_str(&mut parser, &mut rec, "\x1b]2;world\x1b\\");
        assert_eq!(rec.oscs, vec!["0;hello", "2;world"]);
    }

    #[test]
    fn esc_aborts_unfinished_csi() {
        let mut parser = VtParser::new();
        let mut rec = Recorder::default();
        feed_str(&mut parser, &mut rec, "\x1b[12\x1b[3A");
        assert_eq!(rec.csis, vec![(vec![3], vec![], b'A')]);
    }

    #[test]
    fn split_feed_resumes() {
        let mut parser = VtParser::new();
        let mut rec = Recorder::default();
        feed_str(&mut parser, &mut rec, "\x1b[38;2;10;");
        assert!(parser.mid_sequence());
        feed_str(&mut parser, &mut rec, "20;30m");
        assert_eq!(rec.csis, vec![(vec![38, 2, 10, 20, 30], vec![], b'm')]);
    }

    #[test]
    fn decscusr_space_intermediate() {
        let mut parser = VtParser::new();
        let mut rec = Recorder::default();
        feed_str(&mut parser, &mut rec, "\x1b[4 q");
        assert_eq!(rec.csis, vec![(vec![4], vec![b' '], b'q')]);
    }

    #[test]
    fn printables_reach_ground() {
        let mut parser = VtParser::new();
        let mut rec = Recorder::default();
        feed_str(&mut parser, &mut rec, "ab\x1b[1mcd");
        assert_eq!(rec.printed, "abcd");
    }

    #[test]
    fn esc_in_osc_chains_into_new_sequence() {
        let mut parser = VtParser::new();
        let mut rec = Recorder::default();
        feed_str(&mut parser, &mut rec, "\x1b]0;t\x1b7");
        assert_eq!(rec.oscs, vec!["0;t"]);
        assert_eq!(rec.escs, vec![(vec![], b'7')]);
    }
}
