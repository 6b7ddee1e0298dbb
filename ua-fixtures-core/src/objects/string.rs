use std::fmt;

/// How a string was (or will be) spelled in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// `(text)`
    Literal,
    /// `<48656C6C6F>`
    Hexadecimal,
}

/// A PDF string: raw bytes plus the syntax it is written in.
///
/// Two strings with the same bytes but different formats are not equal; the
/// format is part of what a fixture pins down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfString {
    bytes: Vec<u8>,
    format: StringFormat,
}

impl PdfString {
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            format: StringFormat::Literal,
        }
    }

    pub fn hex(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            format: StringFormat::Hexadecimal,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> StringFormat {
        self.format
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl fmt::Display for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            StringFormat::Literal => write!(f, "({})", self.to_string_lossy()),
            StringFormat::Hexadecimal => write!(f, "<{}>", hex::encode_upper(&self.bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_is_part_of_equality() {
        assert_ne!(PdfString::literal("A"), PdfString::hex("A"));
        assert_eq!(PdfString::literal("A"), PdfString::literal(b"A".to_vec()));
    }

    #[test]
    fn test_display() {
        assert_eq!(PdfString::literal("note-1").to_string(), "(note-1)");
        assert_eq!(PdfString::hex(vec![0x00, 0x41]).to_string(), "<0041>");
    }
}
