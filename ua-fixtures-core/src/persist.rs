//! Atomic file output.

use crate::error::Result;
use crate::graph::ObjectGraph;
use crate::writer::{PdfWriter, WriterConfig};
use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Serializes `graph` to `path`, replacing any existing file.
///
/// Bytes go to a temporary file in the destination directory which is then
/// renamed over `path`, so a failed write never leaves a truncated PDF
/// behind. Missing parent directories are created.
pub fn save(graph: &ObjectGraph, path: impl AsRef<Path>, config: WriterConfig) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = PdfWriter::new_with_writer(BufWriter::new(temp.as_file()), config);
        writer.write_graph(graph)?;
    }
    temp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), "saved document");
    Ok(())
}
