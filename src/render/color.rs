//! Output color depth and downsampling
//!
//! Frames carry full RGBA; the sink may only speak 256-color or classic
//! 16-color SGR. Downsampling is deterministic so the diff renderer can
//! compare frames before conversion and still emit stable bytes.

use serde::{Deserialize, Serialize};

use crate::core::cell::Color;

/// Color depth emitted on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// 24-bit SGR (`38;2;r;g;b`).
    #[default]
    TrueColor,
    /// xterm 256-color palette.
    Palette256,
    /// The 16 classic VGA colors.
    Vga16,
}

/// Standard VGA palette, indexes 0..16.
const VGA: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

/// Cube axis levels of the xterm 256-color palette.
const CUBE: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// RGB value of an xterm 256-palette index.
pub fn palette_rgb(index: u8) -> (u8, u8, u8) {
    match index {
        0..=15 => VGA[index as usize],
        16..=231 => {
            let i = index as usize - 16;
            (CUBE[i / 36], CUBE[(i / 6) % 6], CUBE[i % 6])
        }
        _ => {
            let v = 8 + 10 * (index - 232);
            (v, v, v)
        }
    }
}

fn dist(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    (dr * dr + dg * dg + db * db) as u32
}

fn cube_level(c: u8) -> usize {
    if c < 48 {
        0
    } else if c < 114 {
        1
    } else {
        ((c as usize) - 35) / 40
    }
}

/// Nearest xterm 256-palette index: the closer of the 6x6x6 cube match and
/// the grayscale-ramp match.
pub fn nearest_256(r: u8, g: u8, b: u8) -> u8 {
    let (qr, qg, qb) = (cube_level(r), cube_level(g), cube_level(b));
    let cube_idx = (16 + 36 * qr + 6 * qg + qb) as u8;
    let cube_rgb = (CUBE[qr], CUBE[qg], CUBE[qb]);

    let average = (r as u32 + g as u32 + b as u32) / 3;
    let gray_step = if average > 238 {
        23
    } else {
        (average.saturating_sub(3) / 10) as u8
    };
    let gray_idx = 232 + gray_step;
    let gv = 8 + 10 * gray_step;
    let gray_rgb = (gv, gv, gv);

    if dist((r, g, b), gray_rgb) < dist((r, g, b), cube_rgb) {
        gray_idx
    } else {
        cube_idx
    }
}

/// Nearest of the 16 VGA colors.
pub fn nearest_16(r: u8, g: u8, b: u8) -> u8 {
    let mut best = 0u8;
    let mut best_dist = u32::MAX;
    for (i, &rgb) in VGA.iter().enumerate() {
        let d = dist((r, g, b), rgb);
        if d < best_dist {
            best_dist = d;
            best = i as u8;
        }
    }
    best
}

/// Reduce a cell color to what `mode` can express.
pub fn downsample(color: Color, mode: ColorMode) -> Color {
    match (mode, color) {
        (ColorMode::TrueColor, c) => c,
        (_, Color::Default) => Color::Default,
        (ColorMode::Palette256, Color::Indexed(i)) => Color::Indexed(i),
        (ColorMode::Palette256, Color::Rgba(r, g, b, _)) => Color::Indexed(nearest_256(r, g, b)),
        (ColorMode::Vga16, Color::Indexed(i)) if i < 16 => Color::Indexed(i),
        (ColorMode::Vga16, Color::Indexed(i)) => {
            let (r, g, b) = palette_rgb(i);
            Color::Indexed(nearest_16(r, g, b))
        }
        (ColorMode::Vga16, Color::Rgba(r, g, b, _)) => Color::Indexed(nearest_16(r, g, b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_corners() {
        assert_eq!(nearest_256(0, 0, 0), 16);
        assert_eq!(nearest_256(255, 255, 255), 231);
        assert_eq!(nearest_256(255, 0, 0), 196);
    }

    #[test]
    fn mid_gray_uses_ramp() {
        assert_eq!(nearest_256(128, 128, 128), 244);
        assert_eq!(palette_rgb(244), (128, 128, 128));
    }

    #[test]
    fn vga_snaps_to_primaries() {
        assert_eq!(nearest_16(250, 5, 5), 9);
        assert_eq!(nearest_16(0, 0, 0), 0);
        assert_eq!(nearest_16(250, 250, 250), 15);
    }

    #[test]
    fn downsample_is_identity_in_truecolor() {
        let c = Color::rgb(1, 2, 3);
        assert_eq!(downsample(c, ColorMode::TrueColor), c);
    }

    #[test]
    fn downsample_default_survives_all_modes() {
        for mode in [ColorMode::TrueColor, ColorMode::Palette256, ColorMode::Vga16] {
            assert_eq!(downsample(Color::Default, mode), Color::Default);
        }
    }

    #[test]
    fn indexed_folds_into_16() {
        // Bright green in the 256 cube lands on bright green in VGA.
        assert_eq!(downsample(Color::Indexed(46), ColorMode::Vga16), Color::Indexed(10));
    }
}
