//! Reader for the files [`PdfWriter`](crate::writer::PdfWriter) produces.
//!
//! Handles the subset of PDF syntax the writer emits: a header, a run of
//! indirect objects, one classic xref table and a trailer. Stream payloads
//! are located through a direct `/Length`. References are recorded, never
//! followed, so cyclic graphs read back with the same shape.

use crate::error::{PdfError, Result};
use crate::graph::ObjectGraph;
use crate::objects::{Dictionary, Object, ObjectId, PdfString, Stream};
use std::path::Path;
use tracing::debug;

const MAX_NESTING: usize = 256;

/// A parsed file: the rebuilt object graph and the trailer dictionary.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub graph: ObjectGraph,
    pub trailer: Dictionary,
}

pub fn parse(bytes: &[u8]) -> Result<ParsedDocument> {
    Parser::new(bytes).parse_document()
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedDocument> {
    let bytes = std::fs::read(path)?;
    parse(&bytes)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    Name(String),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
    Null,
    /// Any other bare word: `obj`, `R`, `stream`, `xref`, `trailer`, ...
    Keyword(String),
    Eof,
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, 0x00 | b'\t' | b'\n' | 0x0C | b'\r' | b' ')
}

fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

struct Lexer<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn error(&self, message: impl Into<String>) -> PdfError {
        PdfError::ParseError {
            position: self.position,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(byte) = self.peek() {
            if is_whitespace(byte) {
                self.position += 1;
            } else if byte == b'%' {
                while let Some(byte) = self.peek() {
                    if byte == b'\n' || byte == b'\r' {
                        break;
                    }
                    self.position += 1;
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();
        let Some(byte) = self.peek() else {
            return Ok(Token::Eof);
        };

        match byte {
            b'/' => {
                self.position += 1;
                self.read_name()
            }
            b'(' => {
                self.position += 1;
                self.read_literal_string()
            }
            b'<' => {
                if self.data.get(self.position + 1) == Some(&b'<') {
                    self.position += 2;
                    Ok(Token::DictStart)
                } else {
                    self.position += 1;
                    self.read_hex_string()
                }
            }
            b'>' => {
                if self.data.get(self.position + 1) == Some(&b'>') {
                    self.position += 2;
                    Ok(Token::DictEnd)
                } else {
                    Err(self.error("Expected '>' after '>'"))
                }
            }
            b'[' => {
                self.position += 1;
                Ok(Token::ArrayStart)
            }
            b']' => {
                self.position += 1;
                Ok(Token::ArrayEnd)
            }
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.read_number(),
            _ if is_delimiter(byte) => Err(self.error(format!(
                "Unexpected delimiter '{}'",
                byte as char
            ))),
            _ => Ok(self.read_keyword()),
        }
    }

    fn read_regular(&mut self) -> &'a [u8] {
        let start = self.position;
        while let Some(byte) = self.peek() {
            if is_whitespace(byte) || is_delimiter(byte) {
                break;
            }
            self.position += 1;
        }
        let data = self.data;
        &data[start..self.position]
    }

    fn read_keyword(&mut self) -> Token {
        let word = String::from_utf8_lossy(self.read_regular()).into_owned();
        match word.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            _ => Token::Keyword(word),
        }
    }

    fn read_number(&mut self) -> Result<Token> {
        let start = self.position;
        let raw = self.read_regular();
        let text = std::str::from_utf8(raw).map_err(|_| self.error("Invalid number"))?;
        if text.contains('.') {
            text.parse::<f64>()
                .map(Token::Real)
                .map_err(|_| PdfError::ParseError {
                    position: start,
                    message: format!("Invalid real '{text}'"),
                })
        } else {
            text.parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| PdfError::ParseError {
                    position: start,
                    message: format!("Invalid integer '{text}'"),
                })
        }
    }

    fn read_name(&mut self) -> Result<Token> {
        let raw = self.read_regular();
        let mut bytes = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' {
                let code = raw
                    .get(i + 1..i + 3)
                    .and_then(|digits| hex::decode(digits).ok())
                    .ok_or_else(|| self.error("Invalid #xx escape in name"))?;
                bytes.extend_from_slice(&code);
                i += 3;
            } else {
                bytes.push(raw[i]);
                i += 1;
            }
        }
        Ok(Token::Name(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn read_literal_string(&mut self) -> Result<Token> {
        let mut bytes = Vec::new();
        let mut depth = 1usize;

        loop {
            let byte = self
                .peek()
                .ok_or_else(|| self.error("Unterminated literal string"))?;
            self.position += 1;
            match byte {
                b'(' => {
                    depth += 1;
                    bytes.push(byte);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    bytes.push(byte);
                }
                b'\\' => {
                    let escaped = self
                        .peek()
                        .ok_or_else(|| self.error("Unterminated escape sequence"))?;
                    self.position += 1;
                    match escaped {
                        b'n' => bytes.push(b'\n'),
                        b'r' => bytes.push(b'\r'),
                        b't' => bytes.push(b'\t'),
                        b'b' => bytes.push(0x08),
                        b'f' => bytes.push(0x0C),
                        b'0'..=b'7' => {
                            let mut value = u32::from(escaped - b'0');
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(digit @ b'0'..=b'7') => {
                                        value = value * 8 + u32::from(digit - b'0');
                                        self.position += 1;
                                    }
                                    _ => break,
                                }
                            }
                            bytes.push((value & 0xFF) as u8);
                        }
                        // Line continuation
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.position += 1;
                            }
                        }
                        b'\n' => {}
                        other => bytes.push(other),
                    }
                }
                _ => bytes.push(byte),
            }
        }

        Ok(Token::String(PdfString::literal(bytes)))
    }

    fn read_hex_string(&mut self) -> Result<Token> {
        let mut digits = Vec::new();
        loop {
            let byte = self
                .peek()
                .ok_or_else(|| self.error("Unterminated hex string"))?;
            self.position += 1;
            match byte {
                b'>' => break,
                _ if is_whitespace(byte) => {}
                _ if byte.is_ascii_hexdigit() => digits.push(byte),
                _ => return Err(self.error("Invalid character in hex string")),
            }
        }
        if digits.len() % 2 == 1 {
            digits.push(b'0');
        }
        let bytes = hex::decode(&digits).map_err(|e| self.error(e.to_string()))?;
        Ok(Token::String(PdfString::hex(bytes)))
    }

    /// Consumes the end-of-line marker that follows the `stream` keyword.
    fn skip_stream_eol(&mut self) -> Result<()> {
        match self.peek() {
            Some(b'\r') => {
                self.position += 1;
                if self.peek() == Some(b'\n') {
                    self.position += 1;
                }
                Ok(())
            }
            Some(b'\n') => {
                self.position += 1;
                Ok(())
            }
            _ => Err(self.error("Expected end of line after 'stream'")),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| self.error(format!("Stream of {len} bytes runs past end of file")))?;
        let data = self.data;
        let slice = &data[self.position..end];
        self.position = end;
        Ok(slice)
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(data),
        }
    }

    fn parse_document(mut self) -> Result<ParsedDocument> {
        if !self.lexer.data.starts_with(b"%PDF-") {
            return Err(self.lexer.error("Missing %PDF- header"));
        }

        let mut graph = ObjectGraph::new();
        let trailer = loop {
            match self.lexer.next_token()? {
                Token::Integer(number) => {
                    let (id, object) = self.parse_indirect_object(number)?;
                    graph.insert(id, object)?;
                }
                Token::Keyword(word) if word == "xref" => {
                    self.skip_xref_table()?;
                }
                Token::Keyword(word) if word == "trailer" => {
                    break match self.parse_object(0)? {
                        Object::Dictionary(dict) => dict,
                        other => {
                            return Err(self.lexer.error(format!(
                                "Trailer must be a dictionary, found {}",
                                other.type_name()
                            )))
                        }
                    };
                }
                Token::Eof => return Err(self.lexer.error("Missing trailer")),
                other => {
                    return Err(self
                        .lexer
                        .error(format!("Unexpected token at top level: {other:?}")))
                }
            }
        };

        let root = trailer
            .get("Root")
            .and_then(Object::as_reference)
            .ok_or_else(|| self.lexer.error("Trailer has no /Root reference"))?;
        graph.set_root(root);

        debug!(objects = graph.len(), root = %root, "parsed document");
        Ok(ParsedDocument { graph, trailer })
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        match self.lexer.next_token()? {
            Token::Keyword(word) if word == keyword => Ok(()),
            other => Err(self
                .lexer
                .error(format!("Expected '{keyword}', found {other:?}"))),
        }
    }

    fn parse_indirect_object(&mut self, number: i64) -> Result<(ObjectId, Object)> {
        let generation = match self.lexer.next_token()? {
            Token::Integer(generation) => generation,
            other => {
                return Err(self
                    .lexer
                    .error(format!("Expected generation number, found {other:?}")))
            }
        };
        let number = u32::try_from(number)
            .map_err(|_| self.lexer.error(format!("Invalid object number {number}")))?;
        if generation != 0 {
            return Err(self
                .lexer
                .error(format!("Unsupported generation {generation} for object {number}")));
        }
        self.expect_keyword("obj")?;

        let object = self.parse_object(0)?;
        let object = match self.lexer.next_token()? {
            Token::Keyword(word) if word == "endobj" => object,
            Token::Keyword(word) if word == "stream" => {
                let Object::Dictionary(dict) = object else {
                    return Err(self.lexer.error("Stream without a dictionary"));
                };
                let stream = self.parse_stream_body(dict)?;
                self.expect_keyword("endobj")?;
                Object::Stream(stream)
            }
            other => {
                return Err(self
                    .lexer
                    .error(format!("Expected 'endobj', found {other:?}")))
            }
        };

        Ok((ObjectId::new(number, 0), object))
    }

    fn parse_stream_body(&mut self, dict: Dictionary) -> Result<Stream> {
        let length = dict
            .get("Length")
            .and_then(Object::as_integer)
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| self.lexer.error("Stream /Length must be a direct non-negative integer"))?;

        self.lexer.skip_stream_eol()?;
        let data = self.lexer.take(length)?.to_vec();
        self.expect_keyword("endstream")?;
        Ok(Stream::with_dictionary(dict, data))
    }

    fn skip_xref_table(&mut self) -> Result<()> {
        loop {
            let saved = self.lexer.position;
            match self.lexer.next_token()? {
                Token::Integer(_) => {}
                Token::Keyword(word) if word == "f" || word == "n" => {}
                Token::Keyword(word) if word == "trailer" => {
                    self.lexer.position = saved;
                    return Ok(());
                }
                other => {
                    return Err(self
                        .lexer
                        .error(format!("Unexpected token in xref table: {other:?}")))
                }
            }
        }
    }

    fn parse_object(&mut self, depth: usize) -> Result<Object> {
        if depth > MAX_NESTING {
            return Err(self.lexer.error("Objects nested too deeply"));
        }

        match self.lexer.next_token()? {
            Token::Null => Ok(Object::Null),
            Token::Boolean(b) => Ok(Object::Boolean(b)),
            Token::Real(r) => Ok(Object::Real(r)),
            Token::String(s) => Ok(Object::String(s)),
            Token::Name(n) => Ok(Object::Name(n)),
            Token::Integer(i) => Ok(self.integer_or_reference(i)),
            Token::ArrayStart => {
                let mut items = Vec::new();
                loop {
                    let saved = self.lexer.position;
                    if self.lexer.next_token()? == Token::ArrayEnd {
                        break;
                    }
                    self.lexer.position = saved;
                    items.push(self.parse_object(depth + 1)?);
                }
                Ok(Object::Array(items))
            }
            Token::DictStart => {
                let mut dict = Dictionary::new();
                loop {
                    match self.lexer.next_token()? {
                        Token::DictEnd => break,
                        Token::Name(key) => {
                            let value = self.parse_object(depth + 1)?;
                            dict.set(key, value);
                        }
                        other => {
                            return Err(self
                                .lexer
                                .error(format!("Expected dictionary key, found {other:?}")))
                        }
                    }
                }
                Ok(Object::Dictionary(dict))
            }
            other => Err(self
                .lexer
                .error(format!("Unexpected token {other:?}"))),
        }
    }

    /// `n g R` is a reference; anything else leaves the lexer after `n`.
    fn integer_or_reference(&mut self, value: i64) -> Object {
        let saved = self.lexer.position;
        if let (Ok(Token::Integer(generation)), Ok(Token::Keyword(word))) =
            (self.lexer.next_token(), self.lexer.next_token())
        {
            if word == "R" {
                if let (Ok(number), Ok(generation)) =
                    (u32::try_from(value), u16::try_from(generation))
                {
                    return Object::Reference(ObjectId::new(number, generation));
                }
            }
        }
        self.lexer.position = saved;
        Object::Integer(value)
    }
}
