use crate::error::Result;
use crate::graph::ObjectGraph;
use crate::objects::{Dictionary, Object, ObjectId, PdfString, Stream, StringFormat};
use rand::Rng;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

/// How the trailer `/ID` is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// MD5 of everything written before the trailer, so identical graphs give
    /// identical files.
    #[default]
    Deterministic,
    /// Fresh random bytes on every write.
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterConfig {
    pub id_policy: IdPolicy,
    /// Flate-compress streams that carry no `/Filter` yet. Requires the
    /// `compression` feature.
    pub compress_streams: bool,
}

pub struct PdfWriter<W: Write> {
    writer: W,
    config: WriterConfig,
    xref_positions: BTreeMap<u32, u64>,
    current_position: u64,
    body: Vec<u8>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W, config: WriterConfig) -> Self {
        Self {
            writer,
            config,
            xref_positions: BTreeMap::new(),
            current_position: 0,
            body: Vec::new(),
        }
    }

    /// Serializes every object of `graph`, in number order, followed by a
    /// classic xref table and trailer.
    ///
    /// Fails before writing anything if the graph does not pass
    /// [`ObjectGraph::check_integrity`].
    pub fn write_graph(&mut self, graph: &ObjectGraph) -> Result<()> {
        graph.check_integrity()?;
        let root = graph
            .root()
            .ok_or_else(|| crate::PdfError::InvalidStructure("document has no root".into()))?;

        self.write_header()?;
        for (id, object) in graph.iter() {
            self.write_object(id, object)?;
        }

        let xref_position = self.current_position;
        self.write_xref()?;
        self.write_trailer(root, xref_position)?;
        self.writer.flush()?;

        debug!(
            objects = graph.len(),
            bytes = self.current_position,
            "serialized graph"
        );
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> Result<()> {
        self.write_bytes(b"%PDF-1.7\n")?;
        // Binary comment to ensure file is treated as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    fn write_object(&mut self, id: ObjectId, object: &Object) -> Result<()> {
        self.xref_positions.insert(id.number(), self.current_position);

        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes())?;

        match object {
            Object::Stream(stream) if self.config.compress_streams && stream.filter().is_none() => {
                let compressed = compress(stream)?;
                self.write_object_value(&Object::Stream(compressed))?;
            }
            _ => self.write_object_value(object)?,
        }

        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn write_object_value(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null")?,
            Object::Boolean(b) => self.write_bytes(if *b { b"true" } else { b"false" })?,
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(f) => self.write_bytes(format_real(*f)?.as_bytes())?,
            Object::String(s) => self.write_bytes(&encode_string(s))?,
            Object::Name(n) => self.write_bytes(encode_name(n).as_bytes())?,
            Object::Array(arr) => {
                self.write_bytes(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object_value(obj)?;
                }
                self.write_bytes(b"]")?;
            }
            Object::Dictionary(dict) => self.write_dictionary(dict)?,
            Object::Stream(stream) => {
                let mut dict = stream.dictionary().clone();
                dict.set("Length", stream.data().len() as i64);
                self.write_dictionary(&dict)?;
                self.write_bytes(b"\nstream\n")?;
                self.write_bytes(stream.data())?;
                self.write_bytes(b"\nendstream")?;
            }
            Object::Reference(id) => {
                let ref_str = format!("{} {} R", id.number(), id.generation());
                self.write_bytes(ref_str.as_bytes())?;
            }
        }
        Ok(())
    }

    fn write_dictionary(&mut self, dict: &Dictionary) -> Result<()> {
        self.write_bytes(b"<<")?;
        for (key, value) in dict.iter() {
            self.write_bytes(b"\n")?;
            self.write_bytes(encode_name(key).as_bytes())?;
            self.write_bytes(b" ")?;
            self.write_object_value(value)?;
        }
        self.write_bytes(b"\n>>")?;
        Ok(())
    }

    fn write_xref(&mut self) -> Result<()> {
        self.write_bytes(b"xref\n")?;

        let max_obj_num = self.xref_positions.keys().next_back().copied().unwrap_or(0);
        self.write_bytes(format!("0 {}\n", u64::from(max_obj_num) + 1).as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;

        // Gaps only appear in graphs rebuilt from parsed files
        for obj_num in 1..=max_obj_num {
            let entry = match self.xref_positions.get(&obj_num) {
                Some(position) => format!("{position:010} 00000 n \n"),
                None => "0000000000 00000 f \n".to_string(),
            };
            self.write_bytes(entry.as_bytes())?;
        }

        Ok(())
    }

    fn write_trailer(&mut self, root: ObjectId, xref_position: u64) -> Result<()> {
        let max_obj_num = self.xref_positions.keys().next_back().copied().unwrap_or(0);
        let id = self.document_id();

        let mut trailer = Dictionary::new();
        trailer.set("Size", i64::from(max_obj_num) + 1);
        trailer.set("Root", root);
        trailer.set(
            "ID",
            vec![
                Object::String(PdfString::hex(id.to_vec())),
                Object::String(PdfString::hex(id.to_vec())),
            ],
        );

        self.write_bytes(b"trailer\n")?;
        self.write_dictionary(&trailer)?;
        self.write_bytes(b"\nstartxref\n")?;
        self.write_bytes(xref_position.to_string().as_bytes())?;
        self.write_bytes(b"\n%%EOF\n")?;

        Ok(())
    }

    fn document_id(&self) -> [u8; 16] {
        match self.config.id_policy {
            IdPolicy::Deterministic => md5::compute(&self.body).0,
            IdPolicy::Random => rand::thread_rng().gen(),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        if self.config.id_policy == IdPolicy::Deterministic {
            self.body.extend_from_slice(data);
        }
        self.current_position += data.len() as u64;
        Ok(())
    }
}

/// Serializes `graph` into a fresh buffer.
pub fn to_bytes(graph: &ObjectGraph, config: WriterConfig) -> Result<Vec<u8>> {
    let mut writer = PdfWriter::new_with_writer(Vec::new(), config);
    writer.write_graph(graph)?;
    Ok(writer.into_inner())
}

#[cfg(feature = "compression")]
fn compress(stream: &Stream) -> Result<Stream> {
    let mut compressed = stream.clone();
    compressed.compress_flate()?;
    Ok(compressed)
}

#[cfg(not(feature = "compression"))]
fn compress(_stream: &Stream) -> Result<Stream> {
    Err(crate::PdfError::CompressionError(
        "stream compression requested but the `compression` feature is disabled".to_string(),
    ))
}

/// Reals always carry a decimal point so they read back as reals. PDF has
/// no spelling for NaN or the infinities.
fn format_real(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(crate::PdfError::InvalidStructure(format!(
            "real {value} has no PDF representation"
        )));
    }
    let formatted = format!("{value:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    let trimmed = if trimmed == "-0" { "0" } else { trimmed };
    if trimmed.contains('.') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}.0"))
    }
}

pub(crate) fn encode_string(string: &PdfString) -> Vec<u8> {
    match string.format() {
        StringFormat::Hexadecimal => {
            format!("<{}>", hex::encode_upper(string.as_bytes())).into_bytes()
        }
        StringFormat::Literal => {
            let mut out = Vec::with_capacity(string.as_bytes().len() + 2);
            out.push(b'(');
            for &byte in string.as_bytes() {
                match byte {
                    b'\\' => out.extend_from_slice(b"\\\\"),
                    b'(' => out.extend_from_slice(b"\\("),
                    b')' => out.extend_from_slice(b"\\)"),
                    b'\r' => out.extend_from_slice(b"\\r"),
                    b'\n' => out.extend_from_slice(b"\\n"),
                    _ => out.push(byte),
                }
            }
            out.push(b')');
            out
        }
    }
}

pub(crate) fn is_regular_name_byte(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7E)
        && !matches!(
            byte,
            b'#' | b'/' | b'%' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}'
        )
}

pub(crate) fn encode_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    out.push('/');
    for &byte in name.as_bytes() {
        if is_regular_name_byte(byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("#{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf_dict;
    use pretty_assertions::assert_eq;
    use std::io::{self, ErrorKind};

    fn tiny_graph() -> ObjectGraph {
        let mut graph = ObjectGraph::new();
        let catalog = graph
            .allocate(pdf_dict! { "Type" => Object::name("Catalog") })
            .unwrap();
        graph.set_root(catalog);
        graph
    }

    #[test]
    fn test_write_header() {
        let bytes = to_bytes(&tiny_graph(), WriterConfig::default()).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7\n"));
        assert_eq!(&bytes[9..15], &[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_full_layout() {
        let bytes = to_bytes(&tiny_graph(), WriterConfig::default()).unwrap();
        let content = String::from_utf8_lossy(&bytes);

        assert!(content.contains("1 0 obj\n<<\n/Type /Catalog\n>>\nendobj\n"));
        assert!(content.contains("xref\n0 2\n0000000000 65535 f \n0000000015 00000 n \n"));
        assert!(content.contains("trailer\n<<\n/Size 2\n/Root 1 0 R\n/ID [<"));
        let startxref = content.rfind("startxref\n").unwrap();
        let offset: usize = content[startxref + 10..]
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        // Offsets count raw bytes; the lossy string widens the binary comment.
        assert!(bytes[offset..].starts_with(b"xref\n"));
        assert_eq!(&bytes[15..23], b"1 0 obj\n");
    }

    #[test]
    fn test_deterministic_id_is_stable() {
        let first = to_bytes(&tiny_graph(), WriterConfig::default()).unwrap();
        let second = to_bytes(&tiny_graph(), WriterConfig::default()).unwrap();
        assert_eq!(first, second);

        let body_end = first.windows(7).position(|w| w == b"trailer").unwrap();
        let expected = hex::encode_upper(md5::compute(&first[..body_end]).0);
        let content = String::from_utf8_lossy(&first);
        assert!(content.contains(&format!("/ID [<{expected}> <{expected}>]")));
    }

    #[test]
    fn test_random_id_differs() {
        let config = WriterConfig {
            id_policy: IdPolicy::Random,
            ..WriterConfig::default()
        };
        let first = to_bytes(&tiny_graph(), config).unwrap();
        let second = to_bytes(&tiny_graph(), config).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_dangling_reference_fails_before_writing() {
        let mut graph = tiny_graph();
        let missing = ObjectId::new(42, 0);
        graph
            .dictionary_mut(ObjectId::new(1, 0))
            .unwrap()
            .set("Broken", missing);

        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new_with_writer(&mut buffer, WriterConfig::default());
        assert!(matches!(
            writer.write_graph(&graph),
            Err(crate::PdfError::DanglingReference(id)) if id == missing
        ));
        assert!(buffer.is_empty());

        graph.permit_dangling(missing);
        let content = String::from_utf8_lossy(&to_bytes(&graph, WriterConfig::default()).unwrap())
            .into_owned();
        assert!(content.contains("/Broken 42 0 R"));
    }

    #[test]
    fn test_stream_length_matches_payload() {
        let mut graph = tiny_graph();
        let mut stream = Stream::new(b"BT ET".to_vec());
        stream.dictionary_mut().set("Length", 999);
        let id = graph.allocate(stream).unwrap();
        graph
            .dictionary_mut(ObjectId::new(1, 0))
            .unwrap()
            .set("Content", id);

        let content = String::from_utf8_lossy(&to_bytes(&graph, WriterConfig::default()).unwrap())
            .into_owned();
        assert!(content.contains("<<\n/Length 5\n>>\nstream\nBT ET\nendstream"));
    }

    #[test]
    fn test_string_encoding() {
        assert_eq!(
            encode_string(&PdfString::literal("a(b)c\\d\re\nf")),
            b"(a\\(b\\)c\\\\d\\re\\nf)".to_vec()
        );
        assert_eq!(encode_string(&PdfString::literal("")), b"()".to_vec());
        assert_eq!(encode_string(&PdfString::hex(vec![0x00, 0xAB, 0x41])), b"<00AB41>".to_vec());
    }

    #[test]
    fn test_name_encoding() {
        assert_eq!(encode_name("SimpleName"), "/SimpleName");
        assert_eq!(encode_name("Name With Spaces"), "/Name#20With#20Spaces");
        assert_eq!(encode_name("A#B/C(D)"), "/A#23B#2FC#28D#29");
        assert_eq!(encode_name(""), "/");
    }

    #[test]
    fn test_real_formatting() {
        assert_eq!(format_real(0.0).unwrap(), "0.0");
        assert_eq!(format_real(-0.0).unwrap(), "0.0");
        assert_eq!(format_real(1.5).unwrap(), "1.5");
        assert_eq!(format_real(100.0).unwrap(), "100.0");
        assert_eq!(format_real(0.123456).unwrap(), "0.123456");
        assert_eq!(format_real(-2.25).unwrap(), "-2.25");
    }

    #[test]
    fn test_non_finite_reals_are_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut graph = tiny_graph();
            graph
                .dictionary_mut(ObjectId::new(1, 0))
                .unwrap()
                .set("Scale", value);
            assert!(matches!(
                to_bytes(&graph, WriterConfig::default()),
                Err(crate::PdfError::InvalidStructure(_))
            ));
        }
    }

    #[test]
    fn test_nested_direct_objects() {
        let mut graph = tiny_graph();
        graph.dictionary_mut(ObjectId::new(1, 0)).unwrap().set(
            "Nested",
            pdf_dict! {
                "Array" => vec![Object::Null, Object::Boolean(false), Object::Integer(-3)],
                "Inner" => pdf_dict! {},
            },
        );
        let content = String::from_utf8_lossy(&to_bytes(&graph, WriterConfig::default()).unwrap())
            .into_owned();
        assert!(content.contains("/Nested <<\n/Array [null false -3]\n/Inner <<\n>>\n>>"));
    }

    #[cfg(not(feature = "compression"))]
    #[test]
    fn test_compression_requires_feature() {
        let mut graph = tiny_graph();
        let id = graph.allocate(Stream::new(b"data".to_vec())).unwrap();
        graph
            .dictionary_mut(ObjectId::new(1, 0))
            .unwrap()
            .set("Content", id);
        let config = WriterConfig {
            compress_streams: true,
            ..WriterConfig::default()
        };
        assert!(matches!(
            to_bytes(&graph, config),
            Err(crate::PdfError::CompressionError(_))
        ));
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_compressed_streams_get_flate_filter() {
        let mut graph = tiny_graph();
        let id = graph.allocate(Stream::new(vec![b'A'; 512])).unwrap();
        graph
            .dictionary_mut(ObjectId::new(1, 0))
            .unwrap()
            .set("Content", id);
        let config = WriterConfig {
            compress_streams: true,
            ..WriterConfig::default()
        };
        let content = String::from_utf8_lossy(&to_bytes(&graph, config).unwrap()).into_owned();
        assert!(content.contains("/Filter /FlateDecode"));
        assert!(!content.contains(&"A".repeat(512)));
    }

    struct FailingWriter {
        fail_after: usize,
        written: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written >= self.fail_after {
                return Err(io::Error::new(ErrorKind::PermissionDenied, "Simulated write error"));
            }
            self.written += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_io_errors_propagate() {
        let mut writer = PdfWriter::new_with_writer(
            FailingWriter {
                fail_after: 20,
                written: 0,
            },
            WriterConfig::default(),
        );
        assert!(matches!(
            writer.write_graph(&tiny_graph()),
            Err(crate::PdfError::Io(_))
        ));
    }
}
