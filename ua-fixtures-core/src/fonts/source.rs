//! Where embedded font programs come from.

use crate::error::{PdfError, Result};
use crate::fonts::{FontData, FontLoader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Well-known TrueType locations, searched in order.
pub const DEFAULT_FONT_CANDIDATES: [&str; 3] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
];

/// Supplies the font program embedded by composite-font fixtures.
pub trait FontSource {
    fn font_bytes(&self) -> Result<FontData>;
}

/// Searches a fixed, ordered list of filesystem locations.
///
/// The first existing candidate wins, so repeated runs on one machine embed
/// the same file.
#[derive(Debug, Clone)]
pub struct SystemFontSource {
    candidates: Vec<PathBuf>,
    override_path: Option<PathBuf>,
}

impl SystemFontSource {
    pub fn new() -> Self {
        Self {
            candidates: DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
            override_path: None,
        }
    }

    /// Searches only `candidates`, in the given order.
    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            override_path: None,
        }
    }

    /// Puts `path` ahead of the default candidates. A missing override is
    /// logged before the search falls through to the defaults.
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut source = Self::new();
        source.candidates.insert(0, path.clone());
        source.override_path = Some(path);
        source
    }

    /// The override path, if it was given and does not exist.
    pub fn missing_override(&self) -> Option<&Path> {
        self.override_path
            .as_deref()
            .filter(|path| !path.is_file())
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub fn find_font_path(&self) -> Result<&Path> {
        if let Some(path) = self.missing_override() {
            warn!(path = %path.display(), "font override not found, trying default locations");
        }
        self.candidates
            .iter()
            .find(|path| path.is_file())
            .map(PathBuf::as_path)
            .ok_or_else(|| PdfError::FontNotFound {
                searched: self.candidates.clone(),
            })
    }
}

impl Default for SystemFontSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FontSource for SystemFontSource {
    fn font_bytes(&self) -> Result<FontData> {
        let path = self.find_font_path()?;
        debug!(path = %path.display(), "loading font program");
        FontLoader::load_from_file(path)
    }
}

/// In-memory font bytes, for tests and callers that already hold a font.
#[derive(Debug, Clone)]
pub struct StaticFontSource {
    data: FontData,
}

impl StaticFontSource {
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self {
            data: FontLoader::load_from_bytes(bytes)?,
        })
    }

    /// A tiny buffer with a TrueType header and an empty table directory.
    pub fn synthetic() -> Self {
        let mut bytes = vec![0x00, 0x01, 0x00, 0x00];
        bytes.extend_from_slice(&[0x00; 8]);
        Self {
            data: FontData {
                bytes,
                format: crate::fonts::FontFormat::TrueType,
            },
        }
    }
}

impl FontSource for StaticFontSource {
    fn font_bytes(&self) -> Result<FontData> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_font(dir: &Path, name: &str, marker: u8) -> PathBuf {
        let path = dir.join(name);
        let mut bytes = vec![0x00, 0x01, 0x00, 0x00];
        bytes.extend_from_slice(&[marker; 12]);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.ttf");
        let second = write_font(dir.path(), "second.ttf", 2);
        let third = write_font(dir.path(), "third.ttf", 3);

        let source = SystemFontSource::with_candidates(vec![missing, second.clone(), third]);

        assert_eq!(source.find_font_path().unwrap(), second.as_path());
        assert_eq!(source.font_bytes().unwrap().bytes[4], 2);
    }

    #[test]
    fn test_not_found_lists_every_candidate() {
        let dir = TempDir::new().unwrap();
        let candidates = vec![dir.path().join("a.ttf"), dir.path().join("b.ttf")];
        let source = SystemFontSource::with_candidates(candidates.clone());

        match source.font_bytes() {
            Err(PdfError::FontNotFound { searched }) => assert_eq!(searched, candidates),
            other => panic!("expected FontNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_override_is_searched_first() {
        let source = SystemFontSource::with_override("/opt/fonts/Custom.ttf");
        assert_eq!(source.candidates()[0], PathBuf::from("/opt/fonts/Custom.ttf"));
        assert_eq!(source.candidates().len(), DEFAULT_FONT_CANDIDATES.len() + 1);
    }

    #[test]
    fn test_missing_override_is_reported_and_skipped() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("Custom.ttf");
        let source = SystemFontSource::with_override(&missing);
        assert_eq!(source.missing_override(), Some(missing.as_path()));

        match source.find_font_path() {
            Ok(found) => assert_ne!(found, missing.as_path()),
            Err(PdfError::FontNotFound { searched }) => assert_eq!(searched[0], missing),
            Err(other) => panic!("unexpected error {other:?}"),
        }

        let present = write_font(dir.path(), "Present.ttf", 9);
        let source = SystemFontSource::with_override(&present);
        assert_eq!(source.missing_override(), None);
        assert_eq!(source.find_font_path().unwrap(), present.as_path());
        assert_eq!(SystemFontSource::new().missing_override(), None);
    }

    #[test]
    fn test_static_source_rejects_garbage() {
        assert!(StaticFontSource::new(b"not a font".to_vec()).is_err());
        let data = StaticFontSource::synthetic().font_bytes().unwrap();
        assert_eq!(data.len(), 12);
    }
}
