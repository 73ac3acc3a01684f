//! PSF1 glyph font loader.
//!
//! The compositor draws characters through an 8x16, 1-bit-per-pixel bitmap
//! font loaded once at startup from a PC Screen Font (version 1) file: a
//! 4-byte header — two magic bytes, a mode byte, the glyph height — followed
//! by one 16-byte glyph per character code. Each glyph byte is one scanline,
//! MSB on the left. Anything that does not parse as an 8x16 PSF1 font is a
//! fatal startup error.

use std::path::Path;

use thiserror::Error;

/// PSF1 magic bytes.
pub const PSF1_MAGIC: [u8; 2] = [0x36, 0x04];

/// Glyph height in scanlines; this machine only supports 8x16 fonts.
pub const GLYPH_HEIGHT: usize = 16;

const HEADER_LEN: usize = 4;

/// PSF1 mode bit: the font carries 512 glyphs instead of 256.
const MODE_512: u8 = 0x01;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font file is shorter than the PSF1 header")]
    TooShort,
    #[error("bad PSF1 magic {0:02x?}")]
    BadMagic([u8; 2]),
    #[error("unsupported glyph height {0} (need 16)")]
    UnsupportedHeight(u8),
    #[error("font file ends inside the glyph table")]
    TruncatedGlyphs,
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
}

/// Immutable 256-entry glyph table, indexed by character code.
#[derive(Debug, Clone)]
pub struct GlyphFont {
    glyphs: Box<[[u8; GLYPH_HEIGHT]; 256]>,
}

impl GlyphFont {
    /// Load and validate a PSF1 font file.
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a PSF1 font image.
    ///
    /// Fonts in 512-glyph mode are accepted; only the first 256 glyphs are
    /// addressable by the one-byte character codes of the video buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FontError> {
        if data.len() < HEADER_LEN {
            return Err(FontError::TooShort);
        }
        let magic = [data[0], data[1]];
        if magic != PSF1_MAGIC {
            return Err(FontError::BadMagic(magic));
        }
        let mode = data[2];
        let height = data[3];
        if height as usize != GLYPH_HEIGHT {
            return Err(FontError::UnsupportedHeight(height));
        }
        let glyph_count = if mode & MODE_512 != 0 { 512 } else { 256 };
        if data.len() < HEADER_LEN + glyph_count * GLYPH_HEIGHT {
            return Err(FontError::TruncatedGlyphs);
        }

        let mut glyphs = Box::new([[0u8; GLYPH_HEIGHT]; 256]);
        for (code, glyph) in glyphs.iter_mut().enumerate() {
            let start = HEADER_LEN + code * GLYPH_HEIGHT;
            glyph.copy_from_slice(&data[start..start + GLYPH_HEIGHT]);
        }
        Ok(Self { glyphs })
    }

    /// The 16 scanlines of one character's glyph (MSB = left pixel).
    pub fn glyph(&self, code: u8) -> &[u8; GLYPH_HEIGHT] {
        &self.glyphs[code as usize]
    }
}

/// Build a valid 256-glyph PSF1 image where every scanline of glyph `c`
/// equals `c` (cheap, distinguishable shapes). Test fixture shared across
/// the crate.
#[cfg(test)]
pub(crate) fn synthetic_font_bytes() -> Vec<u8> {
    let mut data = vec![PSF1_MAGIC[0], PSF1_MAGIC[1], 0x00, GLYPH_HEIGHT as u8];
    for code in 0u16..256 {
        data.extend(std::iter::repeat(code as u8).take(GLYPH_HEIGHT));
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_font() {
        let font = GlyphFont::from_bytes(&synthetic_font_bytes()).unwrap();
        assert_eq!(font.glyph(0x41), &[0x41; GLYPH_HEIGHT]);
        assert_eq!(font.glyph(0x00), &[0x00; GLYPH_HEIGHT]);
        assert_eq!(font.glyph(0xFF), &[0xFF; GLYPH_HEIGHT]);
    }

    #[test]
    fn test_accepts_512_glyph_mode() {
        let mut data = vec![PSF1_MAGIC[0], PSF1_MAGIC[1], MODE_512, GLYPH_HEIGHT as u8];
        data.extend(std::iter::repeat(0xAA).take(512 * GLYPH_HEIGHT));
        let font = GlyphFont::from_bytes(&data).unwrap();
        assert_eq!(font.glyph(0x00), &[0xAA; GLYPH_HEIGHT]);
    }

    #[test]
    fn test_rejects_short_header() {
        assert!(matches!(
            GlyphFont::from_bytes(&[0x36]),
            Err(FontError::TooShort)
        ));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = synthetic_font_bytes();
        data[0] = 0x00;
        assert!(matches!(
            GlyphFont::from_bytes(&data),
            Err(FontError::BadMagic([0x00, 0x04]))
        ));
    }

    #[test]
    fn test_rejects_wrong_height() {
        let mut data = synthetic_font_bytes();
        data[3] = 8;
        assert!(matches!(
            GlyphFont::from_bytes(&data),
            Err(FontError::UnsupportedHeight(8))
        ));
    }

    #[test]
    fn test_rejects_truncated_glyph_table() {
        let mut data = synthetic_font_bytes();
        data.truncate(HEADER_LEN + 255 * GLYPH_HEIGHT);
        assert!(matches!(
            GlyphFont::from_bytes(&data),
            Err(FontError::TruncatedGlyphs)
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            GlyphFont::load(Path::new("/nonexistent/font.psf")),
            Err(FontError::Io(_))
        ));
    }
}
