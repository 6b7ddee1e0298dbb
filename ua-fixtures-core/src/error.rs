use crate::objects::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No usable font found (searched: {})", display_paths(.searched))]
    FontNotFound { searched: Vec<PathBuf> },

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Dangling object reference: {0}")]
    DanglingReference(ObjectId),

    #[error("Unknown object: {0}")]
    UnknownObject(ObjectId),

    #[error("Object {0} is not a dictionary")]
    NotADictionary(ObjectId),

    #[error("Object number space exhausted")]
    HandleSpaceExhausted,

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Parse error at byte {position}: {message}")]
    ParseError { position: usize, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PdfError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
