//! Decoded input events
//!
//! The wire-agnostic shape of everything the input decoder can produce.
//! Key events carry platform-style virtual codes next to the text cluster so
//! embedders can match on either.

use bitflags::bitflags;

bitflags! {
    /// Keyboard modifier state.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Mods: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

bitflags! {
    /// Mouse buttons currently held.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Buttons: u8 {
        const LEFT   = 0b00_0001;
        const MIDDLE = 0b00_0010;
        const RIGHT  = 0b00_0100;
        const EXTRA1 = 0b00_1000;
        const EXTRA2 = 0b01_0000;
        const EXTRA3 = 0b10_0000;
    }
}

/// Virtual key codes for non-text keys (Win32 VK numbering, which the
/// record format on the wire also uses).
pub mod vk {
    pub const BACK: u16 = 0x08;
    pub const TAB: u16 = 0x09;
    pub const RETURN: u16 = 0x0D;
    pub const ESCAPE: u16 = 0x1B;
    pub const PRIOR: u16 = 0x21; // page up
    pub const NEXT: u16 = 0x22; // page down
    pub const END: u16 = 0x23;
    pub const HOME: u16 = 0x24;
    pub const LEFT: u16 = 0x25;
    pub const UP: u16 = 0x26;
    pub const RIGHT: u16 = 0x27;
    pub const DOWN: u16 = 0x28;
    pub const INSERT: u16 = 0x2D;
    pub const DELETE: u16 = 0x2E;
    pub const F1: u16 = 0x70;
    pub const F2: u16 = 0x71;
    pub const F3: u16 = 0x72;
    pub const F4: u16 = 0x73;
    pub const F5: u16 = 0x74;
    pub const F6: u16 = 0x75;
    pub const F7: u16 = 0x76;
    pub const F8: u16 = 0x77;
    pub const F9: u16 = 0x78;
    pub const F10: u16 = 0x79;
    pub const F11: u16 = 0x7A;
    pub const F12: u16 = 0x7B;
}

/// One decoded input event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key {
        /// Virtual key code; zero for plain text input.
        virtual_code: u16,
        /// Hardware scan code when the wire format supplies one.
        scan_code: u16,
        /// Text produced by the key, possibly empty.
        cluster: String,
        pressed: bool,
        mods: Mods,
    },
    Mouse {
        /// Cell coordinates, 0-based.
        x: i16,
        y: i16,
        /// Buttons held after this event.
        buttons: Buttons,
        /// Wheel steps: positive away from the user.
        wheel: i16,
        mods: Mods,
    },
    Focus(bool),
    Resize {
        cols: u16,
        rows: u16,
    },
    /// Bracketed paste payload, delivered whole.
    Paste(String),
    /// The stream asked to stop: double-ESC or end of input.
    Quit,
}

impl InputEvent {
    /// A plain text keypress.
    pub fn text(cluster: impl Into<String>) -> Self {
        InputEvent::Key {
            virtual_code: 0,
            scan_code: 0,
            cluster: cluster.into(),
            pressed: true,
            mods: Mods::empty(),
        }
    }

    /// A non-text keypress.
    pub fn key(virtual_code: u16, mods: Mods) -> Self {
        InputEvent::Key {
            virtual_code,
            scan_code: 0,
            cluster: String::new(),
            pressed: true,
            mods,
        }
    }
}
