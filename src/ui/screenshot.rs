//! Screenshot payloads.
//!
//! Remote ends return screenshots as base64 PNG. [`Screenshot`] holds the
//! decoded bytes and can decode them further into an image.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use image::{DynamicImage, GenericImageView};

use crate::error::{Error, Result};

// ============================================================================
// Screenshot
// ============================================================================

/// A decoded screenshot.
#[derive(Clone, PartialEq, Eq)]
pub struct Screenshot {
    bytes: Vec<u8>,
}

impl fmt::Debug for Screenshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screenshot")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Screenshot {
    /// Decodes a base64 payload.
    ///
    /// Line breaks are ignored; some drivers wrap long payloads.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Base64`] if the payload is not valid base64.
    pub fn from_base64(data: &str) -> Result<Self> {
        let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = Base64Standard.decode(cleaned)?;
        Ok(Self { bytes })
    }

    /// Returns the encoded image bytes (usually PNG).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the screenshot, returning the encoded image bytes.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decodes the image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the bytes are not a supported image.
    pub fn to_image(&self) -> Result<DynamicImage> {
        Ok(image::load_from_memory(&self.bytes)?)
    }

    /// Returns the image width and height in pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the bytes are not a supported image.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        Ok(self.to_image()?.dimensions())
    }

    /// Writes the encoded bytes to a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.bytes).map_err(Error::Io)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_base64(width: u32, height: u32) -> String {
        let image = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        let mut output = Cursor::new(Vec::new());
        image
            .write_to(&mut output, ImageFormat::Png)
            .expect("encode png");
        Base64Standard.encode(output.into_inner())
    }

    #[test]
    fn test_decodes_png() {
        let screenshot = Screenshot::from_base64(&png_base64(3, 2)).expect("decode");
        assert_eq!(screenshot.dimensions().expect("image"), (3, 2));
        assert!(screenshot.as_bytes().starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_ignores_line_breaks() {
        let data = png_base64(1, 1);
        let (head, tail) = data.split_at(8);
        let wrapped = format!("{head}\n{tail}\r\n");

        let screenshot = Screenshot::from_base64(&wrapped).expect("decode");
        assert_eq!(screenshot.dimensions().expect("image"), (1, 1));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        let err = Screenshot::from_base64("not base64!").unwrap_err();
        assert!(matches!(err, Error::Base64(_)));
    }

    #[test]
    fn test_non_image_bytes() {
        let screenshot = Screenshot::from_base64("aGVsbG8=").expect("decode");
        assert_eq!(screenshot.as_bytes(), b"hello");
        assert!(matches!(screenshot.to_image(), Err(Error::Image(_))));
    }

    #[test]
    fn test_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shot.png");

        let screenshot = Screenshot::from_base64(&png_base64(2, 2)).expect("decode");
        screenshot.save(&path).expect("save");

        assert_eq!(std::fs::read(&path).expect("read"), screenshot.into_bytes());
    }
}
