//! Cell stream tokenizer and typed field reader.
//!
//! Cell data is a sequence of whitespace-delimited fields. A few record
//! kinds end with a field that runs to the end of the line (text, file
//! paths), and embedded files capture whole lines up to a sentinel. Every
//! read consumes input; there is no backtracking.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CellError, Result};

/// Position in the source stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

/// A raw field with the position where it starts.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    /// Position of the first character.
    pub position: Position,
    /// Field text.
    pub text: Cow<'a, str>,
}

/// Sequential reader over cell data.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    last: Position,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over the given input.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
            last: Position::default(),
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            col: self.col,
        }
    }

    /// Position of the most recently read field or line.
    pub fn last_position(&self) -> Position {
        self.last
    }

    /// Skip whitespace and return the position of the next field.
    pub fn next_position(&mut self) -> Position {
        self.skip_whitespace();
        self.position()
    }

    /// Whether only whitespace remains.
    pub fn is_at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.input.len()
    }

    /// Read the next whitespace-delimited field.
    pub fn read_field(&mut self, field: &'static str) -> Result<Field<'a>> {
        self.skip_whitespace();
        let position = self.position();
        if self.pos >= self.input.len() {
            return Err(CellError::UnexpectedEnd { position, field });
        }

        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_whitespace() {
                break;
            }
            self.advance();
        }

        let input = self.input;
        self.last = position;
        let text = decode_text(&input[start..self.pos], position, field)?;
        Ok(Field {
            position,
            text: Cow::Borrowed(text),
        })
    }

    /// Read the remainder of the current line, or the whole next line if the
    /// current one holds nothing but blanks.
    pub fn read_line(&mut self, field: &'static str) -> Result<String> {
        self.skip_blanks();
        if self.peek_char() == Some(b'\r') || self.peek_char() == Some(b'\n') {
            self.skip_rest_of_line();
            self.skip_blanks();
        }
        let position = self.position();
        if self.pos >= self.input.len() {
            return Err(CellError::UnexpectedEnd { position, field });
        }
        self.last = position;
        Ok(self.take_line(field)?.trim_end().to_string())
    }

    /// Discard the rest of the current line, then capture whole lines until
    /// one equal to `sentinel` (ignoring surrounding whitespace). The
    /// sentinel line is consumed but not returned.
    pub fn read_until_sentinel(
        &mut self,
        field: &'static str,
        sentinel: &str,
    ) -> Result<Vec<String>> {
        self.skip_rest_of_line();
        self.last = self.position();

        let mut lines = Vec::new();
        loop {
            if self.pos >= self.input.len() {
                return Err(CellError::UnexpectedEnd {
                    position: self.position(),
                    field,
                });
            }
            let line = self.take_line(field)?;
            if line.trim() == sentinel {
                return Ok(lines);
            }
            lines.push(line.trim_end_matches('\r').to_string());
        }
    }

    /// Read a field as a string.
    pub fn read_string(&mut self, field: &'static str) -> Result<String> {
        Ok(self.read_field(field)?.text.into_owned())
    }

    /// Read a boolean field, which must be `0` or `1`.
    pub fn read_bool(&mut self, field: &'static str) -> Result<bool> {
        let token = self.read_field(field)?;
        match token.text.as_ref() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(invalid(token, field, "0 or 1")),
        }
    }

    /// Read a signed 8-bit integer field.
    pub fn read_byte(&mut self, field: &'static str) -> Result<i8> {
        self.parse_field(field, "a byte")
    }

    /// Read a signed 16-bit integer field.
    pub fn read_short(&mut self, field: &'static str) -> Result<i16> {
        self.parse_field(field, "a short integer")
    }

    /// Read a signed 32-bit integer field.
    pub fn read_int(&mut self, field: &'static str) -> Result<i32> {
        self.parse_field(field, "an integer")
    }

    /// Read a finite floating-point field.
    pub fn read_double(&mut self, field: &'static str) -> Result<f64> {
        let token = self.read_field(field)?;
        match token.text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(invalid(token, field, "a finite number")),
        }
    }

    fn parse_field<T: FromStr>(&mut self, field: &'static str, expected: &'static str) -> Result<T> {
        let token = self.read_field(field)?;
        token
            .text
            .parse::<T>()
            .map_err(|_| invalid(token.clone(), field, expected))
    }

    fn peek_char(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !ch.is_ascii_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn skip_blanks(&mut self) {
        while let Some(b' ' | b'\t') = self.peek_char() {
            self.advance();
        }
    }

    fn skip_rest_of_line(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == b'\n' {
                break;
            }
        }
    }

    /// Take everything up to the next newline, consuming the newline.
    fn take_line(&mut self, field: &'static str) -> Result<&'a str> {
        let position = self.position();
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch == b'\n' {
                break;
            }
            self.advance();
        }
        let end = self.pos;
        self.advance();
        let input = self.input;
        decode_text(&input[start..end], position, field)
    }
}

/// Borrow `bytes` as text, rejecting anything that is not UTF-8.
fn decode_text<'a>(bytes: &'a [u8], position: Position, field: &'static str) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|_| CellError::InvalidFieldValue {
        position,
        field,
        expected: "UTF-8 text",
        token: String::from_utf8_lossy(bytes).into_owned(),
    })
}

fn invalid(token: Field<'_>, field: &'static str, expected: &'static str) -> CellError {
    CellError::InvalidFieldValue {
        position: token.position,
        field,
        expected,
        token: token.text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn fields(input: &str) -> Vec<String> {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut out = Vec::new();
        while !tokenizer.is_at_end() {
            out.push(tokenizer.read_string("test").unwrap());
        }
        out
    }

    #[test]
    fn test_whitespace_delimited_fields() {
        assert_eq!(fields("  315 0\t2.0\n3.0  "), vec!["315", "0", "2.0", "3.0"]);
        assert!(fields(" \n\t ").is_empty());
    }

    #[test]
    fn test_positions() {
        let mut tokenizer = Tokenizer::new(b"100 0\n  700");
        tokenizer.read_short("code").unwrap();
        assert_eq!(tokenizer.last_position(), Position { line: 1, col: 1 });
        tokenizer.read_short("flags").unwrap();
        assert_eq!(tokenizer.last_position(), Position { line: 1, col: 5 });
        assert_eq!(tokenizer.next_position(), Position { line: 2, col: 3 });
        tokenizer.read_short("code").unwrap();
        assert_eq!(tokenizer.last_position(), Position { line: 2, col: 3 });
    }

    #[test]
    fn test_typed_reads() {
        let mut tokenizer = Tokenizer::new(b"1 0 -7 10000 70000 -1.5e-3 name");
        assert!(tokenizer.read_bool("b").unwrap());
        assert!(!tokenizer.read_bool("b").unwrap());
        assert_eq!(tokenizer.read_byte("byte").unwrap(), -7);
        assert_eq!(tokenizer.read_short("short").unwrap(), 10000);
        assert_eq!(tokenizer.read_int("int").unwrap(), 70000);
        assert_eq!(tokenizer.read_double("double").unwrap(), -1.5e-3);
        assert_eq!(tokenizer.read_string("string").unwrap(), "name");
    }

    #[test]
    fn test_end_of_stream_is_malformed() {
        let mut tokenizer = Tokenizer::new(b"12  ");
        tokenizer.read_short("code").unwrap();
        let err = tokenizer.read_double("radius").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStream);
        assert!(matches!(err, CellError::UnexpectedEnd { field: "radius", .. }));
    }

    #[test]
    fn test_unconvertible_tokens_are_malformed() {
        for (input, expected_token) in [("abc", "abc"), ("nan", "nan"), ("inf", "inf")] {
            let err = Tokenizer::new(input.as_bytes()).read_double("radius").unwrap_err();
            match err {
                CellError::InvalidFieldValue { token, field, .. } => {
                    assert_eq!(token, expected_token);
                    assert_eq!(field, "radius");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        let err = Tokenizer::new(b"2").read_bool("flag").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStream);

        // 200 does not fit in a byte.
        let err = Tokenizer::new(b"200").read_byte("color").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStream);
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = Tokenizer::new(b"ab\xffc 1").read_string("name").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStream);
        assert!(matches!(
            err,
            CellError::InvalidFieldValue { expected: "UTF-8 text", field: "name", .. }
        ));

        let mut tokenizer = Tokenizer::new(b"388 0\n\xff\xfe.cell\n");
        tokenizer.read_short("code").unwrap();
        tokenizer.read_short("flags").unwrap();
        let err = tokenizer.read_line("path").unwrap_err();
        assert!(matches!(
            err,
            CellError::InvalidFieldValue { position, .. } if position == Position { line: 2, col: 1 }
        ));

        let mut tokenizer = Tokenizer::new(b"599 0\n\xc3(\n#Inventor END\n");
        tokenizer.read_short("code").unwrap();
        tokenizer.read_short("flags").unwrap();
        let err = tokenizer
            .read_until_sentinel("embedded file", "#Inventor END")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStream);

        let mut tokenizer = Tokenizer::new("140 0 Förderband\n".as_bytes());
        tokenizer.read_short("code").unwrap();
        tokenizer.read_short("flags").unwrap();
        assert_eq!(tokenizer.read_line("text").unwrap(), "Förderband");
    }

    #[test]
    fn test_read_line_same_line() {
        let mut tokenizer = Tokenizer::new(b"140 0   Hello world  \r\n100");
        tokenizer.read_short("code").unwrap();
        tokenizer.read_short("flags").unwrap();
        assert_eq!(tokenizer.read_line("text").unwrap(), "Hello world");
        assert_eq!(tokenizer.read_short("code").unwrap(), 100);
    }

    #[test]
    fn test_read_line_falls_through_to_next_line() {
        let mut tokenizer = Tokenizer::new(b"388 0\nparts/widget.cell\n");
        tokenizer.read_short("code").unwrap();
        tokenizer.read_short("flags").unwrap();
        assert_eq!(tokenizer.read_line("path").unwrap(), "parts/widget.cell");
        assert_eq!(tokenizer.last_position(), Position { line: 2, col: 1 });
        assert!(tokenizer.is_at_end());
    }

    #[test]
    fn test_read_line_at_end() {
        let mut tokenizer = Tokenizer::new(b"140 0\n");
        tokenizer.read_short("code").unwrap();
        tokenizer.read_short("flags").unwrap();
        let err = tokenizer.read_line("text").unwrap_err();
        assert!(matches!(err, CellError::UnexpectedEnd { field: "text", .. }));
    }

    #[test]
    fn test_read_until_sentinel() {
        let input = b"599 0\n#Inventor V2.1 ascii\r\nSeparator { }\n  #Inventor END  \n100 0";
        let mut tokenizer = Tokenizer::new(input);
        tokenizer.read_short("code").unwrap();
        tokenizer.read_short("flags").unwrap();
        let lines = tokenizer
            .read_until_sentinel("embedded file", "#Inventor END")
            .unwrap();
        assert_eq!(lines, vec!["#Inventor V2.1 ascii", "Separator { }"]);
        assert_eq!(tokenizer.read_short("code").unwrap(), 100);
    }

    #[test]
    fn test_read_until_sentinel_missing() {
        let mut tokenizer = Tokenizer::new(b"599 0\n#Inventor V2.1 ascii\nSeparator { }");
        tokenizer.read_short("code").unwrap();
        tokenizer.read_short("flags").unwrap();
        let err = tokenizer
            .read_until_sentinel("embedded file", "#Inventor END")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStream);
    }
}
