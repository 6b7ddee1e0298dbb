#[cfg(feature = "compression")]
use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object};

/// A stream object: dictionary plus opaque payload.
///
/// `/Length` is kept equal to the payload size by every constructor and
/// mutator here.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    dictionary: Dictionary,
    data: Vec<u8>,
}

impl Stream {
    pub fn new(data: Vec<u8>) -> Self {
        let mut dictionary = Dictionary::new();
        dictionary.set("Length", data.len() as i64);

        Self { dictionary, data }
    }

    pub fn with_dictionary(dictionary: Dictionary, data: Vec<u8>) -> Self {
        let mut dict = dictionary;
        dict.set("Length", data.len() as i64);

        Self {
            dictionary: dict,
            data,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.dictionary.set("Length", data.len() as i64);
        self.data = data;
    }

    pub fn filter(&self) -> Option<&str> {
        self.dictionary.get_name("Filter")
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.dictionary.set("Filter", Object::Name(filter.to_string()));
    }

    #[cfg(feature = "compression")]
    pub fn compress_flate(&mut self) -> Result<()> {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&self.data)
            .map_err(|e| PdfError::CompressionError(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| PdfError::CompressionError(e.to_string()))?;

        self.set_data(compressed);
        self.set_filter("FlateDecode");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_new() {
        let data = vec![1, 2, 3, 4, 5];
        let stream = Stream::new(data.clone());

        assert_eq!(stream.data(), &data);
        assert_eq!(stream.dictionary().get("Length"), Some(&Object::Integer(5)));
    }

    #[test]
    fn test_stream_with_dictionary_appends_length() {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("XObject"));
        dict.set("Subtype", Object::name("Form"));

        let stream = Stream::with_dictionary(dict, b"0 0 1 rg".to_vec());

        let keys: Vec<_> = stream.dictionary().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Type", "Subtype", "Length"]);
        assert_eq!(stream.dictionary().get("Length"), Some(&Object::Integer(8)));
    }

    #[test]
    fn test_stream_with_existing_length() {
        let mut dict = Dictionary::new();
        dict.set("Length", 999);
        dict.set("Type", Object::name("XObject"));

        let stream = Stream::with_dictionary(dict, vec![1, 2, 3, 4, 5]);

        assert_eq!(stream.dictionary().get("Length"), Some(&Object::Integer(5)));
    }

    #[test]
    fn test_set_data_updates_length() {
        let mut stream = Stream::new(vec![]);
        assert_eq!(stream.dictionary().get("Length"), Some(&Object::Integer(0)));

        stream.set_data(b"EMC\n".to_vec());
        assert_eq!(stream.dictionary().get("Length"), Some(&Object::Integer(4)));
        assert_eq!(stream.data(), b"EMC\n");
    }

    #[test]
    fn test_set_filter() {
        let mut stream = Stream::new(vec![1, 2, 3]);
        assert_eq!(stream.filter(), None);

        stream.set_filter("FlateDecode");
        assert_eq!(stream.filter(), Some("FlateDecode"));
    }

    #[test]
    #[cfg(feature = "compression")]
    fn test_compress_flate() {
        let original_data = "/Artifact BMC\n0 0 1 rg\n10 10 60 40 re\nf\nEMC\n"
            .repeat(10)
            .into_bytes();
        let mut stream = Stream::new(original_data.clone());

        stream.compress_flate().unwrap();

        assert_ne!(stream.data(), &original_data[..]);
        assert_eq!(stream.filter(), Some("FlateDecode"));
        assert_eq!(
            stream.dictionary().get("Length"),
            Some(&Object::Integer(stream.data().len() as i64))
        );
    }
}
