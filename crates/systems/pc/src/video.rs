//! Text-mode video compositor.
//!
//! Rasterizes the 80x25 character/attribute grid into a fixed 640x400 pixel
//! buffer through the glyph font. Rendering is a pure function of the video
//! window, the font and the palette; it touches nothing but the output
//! buffer and runs once per frame.

use crate::font::{GlyphFont, GLYPH_HEIGHT};

/// Text grid geometry.
pub const TEXT_COLUMNS: usize = 80;
pub const TEXT_ROWS: usize = 25;

/// Character cell geometry in pixels.
pub const CHAR_WIDTH: usize = 8;
pub const CHAR_HEIGHT: usize = GLYPH_HEIGHT;

/// Framebuffer geometry: 640x400.
pub const FB_WIDTH: usize = TEXT_COLUMNS * CHAR_WIDTH;
pub const FB_HEIGHT: usize = TEXT_ROWS * CHAR_HEIGHT;

/// Bytes in the video window: one (character, attribute) pair per cell.
pub const TEXT_WINDOW_BYTES: usize = TEXT_COLUMNS * TEXT_ROWS * 2;

/// The standard 16-entry text-mode palette.
///
/// Attribute nibbles index into this: low nibble foreground, high nibble
/// background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VgaColor {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    LightMagenta = 13,
    Yellow = 14,
    White = 15,
}

impl VgaColor {
    /// Convert to 0xFFRRGGBB.
    pub fn to_rgb(self) -> u32 {
        match self {
            VgaColor::Black => 0xFF000000,
            VgaColor::Blue => 0xFF0000AA,
            VgaColor::Green => 0xFF00AA00,
            VgaColor::Cyan => 0xFF00AAAA,
            VgaColor::Red => 0xFFAA0000,
            VgaColor::Magenta => 0xFFAA00AA,
            VgaColor::Brown => 0xFFAA5500,
            VgaColor::LightGray => 0xFFAAAAAA,
            VgaColor::DarkGray => 0xFF555555,
            VgaColor::LightBlue => 0xFF5555FF,
            VgaColor::LightGreen => 0xFF55FF55,
            VgaColor::LightCyan => 0xFF55FFFF,
            VgaColor::LightRed => 0xFFFF5555,
            VgaColor::LightMagenta => 0xFFFF55FF,
            VgaColor::Yellow => 0xFFFFFF55,
            VgaColor::White => 0xFFFFFFFF,
        }
    }

    /// Create from a 4-bit palette index.
    pub fn from_u8(val: u8) -> Self {
        match val & 0x0F {
            0 => VgaColor::Black,
            1 => VgaColor::Blue,
            2 => VgaColor::Green,
            3 => VgaColor::Cyan,
            4 => VgaColor::Red,
            5 => VgaColor::Magenta,
            6 => VgaColor::Brown,
            7 => VgaColor::LightGray,
            8 => VgaColor::DarkGray,
            9 => VgaColor::LightBlue,
            10 => VgaColor::LightGreen,
            11 => VgaColor::LightCyan,
            12 => VgaColor::LightRed,
            13 => VgaColor::LightMagenta,
            14 => VgaColor::Yellow,
            _ => VgaColor::White,
        }
    }
}

/// Software rasterizer for the text-mode window.
pub struct TextCompositor {
    font: GlyphFont,
}

impl TextCompositor {
    pub fn new(font: GlyphFont) -> Self {
        Self { font }
    }

    /// Composite the video window into a 640x400 pixel buffer.
    ///
    /// `vram` holds (character, attribute) pairs row-major; a slice shorter
    /// than the window (or an undersized pixel buffer) renders nothing.
    pub fn render(&self, vram: &[u8], pixels: &mut [u32]) {
        if vram.len() < TEXT_WINDOW_BYTES || pixels.len() < FB_WIDTH * FB_HEIGHT {
            return;
        }

        for row in 0..TEXT_ROWS {
            for col in 0..TEXT_COLUMNS {
                let cell = (row * TEXT_COLUMNS + col) * 2;
                let char_code = vram[cell];
                let attr = vram[cell + 1];

                let fg = VgaColor::from_u8(attr & 0x0F).to_rgb();
                let bg = VgaColor::from_u8((attr >> 4) & 0x0F).to_rgb();

                self.render_cell(char_code, fg, bg, col, row, pixels);
            }
        }
    }

    /// Rasterize one character cell at its pixel-aligned offset.
    fn render_cell(
        &self,
        char_code: u8,
        fg: u32,
        bg: u32,
        col: usize,
        row: usize,
        pixels: &mut [u32],
    ) {
        let glyph = self.font.glyph(char_code);
        let origin_x = col * CHAR_WIDTH;
        let origin_y = row * CHAR_HEIGHT;

        for (line, &bits) in glyph.iter().enumerate() {
            let base = (origin_y + line) * FB_WIDTH + origin_x;
            for px in 0..CHAR_WIDTH {
                // MSB is the leftmost pixel of the scanline.
                let lit = bits & (0x80 >> px) != 0;
                pixels[base + px] = if lit { fg } else { bg };
            }
        }
    }
}
