//! Grid cell primitives
//!
//! A `Cell` is a single monospace grid position: a grapheme cluster, a width
//! class, colors, style flags, and an opaque owner tag for the UI layer.
//! Wide glyphs occupy two cells, a `WideLeft`/`WideRight` pair that must
//! never be split; any operation that would orphan one half substitutes the
//! replacement glyph instead.

use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

/// Glyph substituted for the orphaned half of a broken wide pair.
pub const FALLBACK_GLYPH: char = '\u{FFFD}';

bitflags! {
    /// Text style attributes carried by a cell.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct StyleFlags: u16 {
        const BOLD             = 0b0000_0000_0001;
        const ITALIC           = 0b0000_0000_0010;
        const UNDERLINE        = 0b0000_0000_0100;
        const DOUBLE_UNDERLINE = 0b0000_0000_1000;
        const STRIKE           = 0b0000_0001_0000;
        const INVERT           = 0b0000_0010_0000;
        const OVERLINE         = 0b0000_0100_0000;
    }
}

/// How many columns a cell occupies, and which half of a pair it is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum WidthClass {
    /// Combining mark folded into the preceding cell.
    Zero = 0,
    /// Ordinary single-column glyph.
    #[default]
    Narrow = 1,
    /// Left half of a two-column glyph; the glyph text lives here.
    WideLeft = 2,
    /// Right half of a two-column glyph; carries no text of its own.
    WideRight = 3,
}

impl WidthClass {
    /// Columns consumed when this cell is printed.
    pub fn columns(self) -> u16 {
        match self {
            WidthClass::Zero | WidthClass::WideRight => 0,
            WidthClass::Narrow => 1,
            WidthClass::WideLeft => 2,
        }
    }

    /// Classify a character by its terminal column width.
    pub fn of_char(ch: char) -> Self {
        match ch.width().unwrap_or(1) {
            0 => WidthClass::Zero,
            2 => WidthClass::WideLeft,
            _ => WidthClass::Narrow,
        }
    }
}

/// Cell color: terminal default, palette index, or direct RGBA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgba(u8, u8, u8, u8),
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgba(r, g, b, 0xFF)
    }
}

/// A single grid position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Grapheme cluster rendered here; empty means blank.
    pub cluster: String,
    pub width: WidthClass,
    pub fg: Color,
    pub bg: Color,
    pub flags: StyleFlags,
    /// Opaque tag set by the UI layer; the core never mutates it.
    pub owner: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            cluster: String::new(),
            width: WidthClass::Narrow,
            fg: Color::Default,
            bg: Color::Default,
            flags: StyleFlags::empty(),
            owner: 0,
        }
    }
}

impl Cell {
    pub fn is_wide_left(&self) -> bool {
        self.width == WidthClass::WideLeft
    }

    pub fn is_wide_right(&self) -> bool {
        self.width == WidthClass::WideRight
    }

    /// Text to emit for this cell; blanks render as a space.
    pub fn display(&self) -> &str {
        if self.cluster.is_empty() {
            " "
        } else {
            &self.cluster
        }
    }

    /// True when this cell carries the same colors and flags as `other`.
    pub fn same_style(&self, other: &Cell) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.flags == other.flags
    }

    /// Clear content in place, taking style from `brush`.
    pub fn blank_with(&mut self, brush: &Brush) {
        self.cluster.clear();
        self.width = WidthClass::Narrow;
        self.fg = brush.fg;
        self.bg = brush.bg;
        self.flags = brush.flags;
        self.owner = brush.owner;
    }
}

/// The running default-cell template: style applied to subsequently printed
/// characters and to blanks created by erase/scroll operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Brush {
    pub fg: Color,
    pub bg: Color,
    pub flags: StyleFlags,
    pub owner: u32,
}

impl Brush {
    /// A blank cell styled by this brush.
    pub fn blank(&self) -> Cell {
        Cell {
            cluster: String::new(),
            width: WidthClass::Narrow,
            fg: self.fg,
            bg: self.bg,
            flags: self.flags,
            owner: self.owner,
        }
    }

    /// A styled cell holding `cluster` with an explicit width class.
    pub fn styled(&self, cluster: &str, width: WidthClass) -> Cell {
        Cell {
            cluster: cluster.to_string(),
            width,
            fg: self.fg,
            bg: self.bg,
            flags: self.flags,
            owner: self.owner,
        }
    }

    /// The replacement-character cell used to heal a broken wide pair.
    pub fn fallback(&self) -> Cell {
        let mut cell = self.blank();
        cell.cluster.push(FALLBACK_GLYPH);
        cell
    }

    pub fn reset(&mut self) {
        let owner = self.owner;
        *self = Brush::default();
        self.owner = owner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_classification() {
        assert_eq!(WidthClass::of_char('a'), WidthClass::Narrow);
        assert_eq!(WidthClass::of_char('語'), WidthClass::WideLeft);
        assert_eq!(WidthClass::of_char('\u{0301}'), WidthClass::Zero);
    }

    #[test]
    fn brush_styles_cells() {
        let brush = Brush {
            fg: Color::Indexed(2),
            bg: Color::rgb(10, 20, 30),
            flags: StyleFlags::BOLD | StyleFlags::UNDERLINE,
            owner: 7,
        };
        let cell = brush.styled("x", WidthClass::Narrow);
        assert_eq!(cell.fg, Color::Indexed(2));
        assert_eq!(cell.owner, 7);
        assert!(cell.flags.contains(StyleFlags::BOLD));
        assert!(cell.same_style(&brush.blank()));
    }

    #[test]
    fn fallback_is_narrow() {
        let cell = Brush::default().fallback();
        assert_eq!(cell.width, WidthClass::Narrow);
        assert_eq!(cell.cluster, FALLBACK_GLYPH.to_string());
    }
}
