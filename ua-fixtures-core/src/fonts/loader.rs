//! Reading font programs and checking they are sfnt data.

use crate::error::PdfError;
use crate::Result;

/// sfnt flavour of an embedded font program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    /// `glyf` outlines; tagged `00 01 00 00` or Apple's `true`.
    TrueType,
    /// CFF outlines; tagged `OTTO`.
    OpenType,
}

impl FontFormat {
    /// Classifies `data` by its four-byte sfnt version tag.
    pub fn detect(data: &[u8]) -> Result<Self> {
        let tag: [u8; 4] = data
            .get(..4)
            .and_then(|head| head.try_into().ok())
            .ok_or_else(|| {
                PdfError::FontError(format!("{} bytes is too short for an sfnt tag", data.len()))
            })?;

        match &tag {
            b"\x00\x01\x00\x00" | b"true" => Ok(FontFormat::TrueType),
            b"OTTO" => Ok(FontFormat::OpenType),
            _ => Err(PdfError::FontError(format!(
                "unrecognised sfnt tag {}",
                hex::encode_upper(tag)
            ))),
        }
    }
}

/// A font program as embedded in `/FontFile2`, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontData {
    pub bytes: Vec<u8>,
    pub format: FontFormat,
}

impl FontData {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Reads font programs from disk or memory, rejecting anything that is not
/// an sfnt container.
pub struct FontLoader;

impl FontLoader {
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<FontData> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(bytes)
    }

    pub fn load_from_bytes(bytes: Vec<u8>) -> Result<FontData> {
        let format = FontFormat::detect(&bytes)?;
        let data = FontData { bytes, format };
        Self::validate(&data)?;
        Ok(data)
    }

    /// The 12-byte sfnt header (tag, table count, search fields) must be
    /// present.
    pub fn validate(data: &FontData) -> Result<()> {
        if data.bytes.len() < 12 {
            return Err(PdfError::FontError(format!(
                "{:?} font too small: {} bytes",
                data.format,
                data.bytes.len()
            )));
        }
        Ok(())
    }
}
