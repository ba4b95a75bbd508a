//! Byte cursor over JavaScript source.
//!
//! All syntax the transform cares about is ASCII, so the cursor walks bytes
//! and only ever slices at ASCII positions, which are always char
//! boundaries.

use uigen_core::{Location, SyntaxError};

#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    path: &'a str,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str, path: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            path,
        }
    }

    pub(crate) const fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) const fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    pub(crate) fn starts_with(&self, text: &str) -> bool {
        self.bytes[self.pos..].starts_with(text.as_bytes())
    }

    pub(crate) fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    pub(crate) fn advance(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.bytes.len());
    }

    pub(crate) fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.src[start..end]
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consumes an identifier-like run and returns it.
    ///
    /// Bytes of multi-byte characters count as identifier bytes.
    pub(crate) fn take_word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_byte) {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    /// Consumes a JSX name: identifier bytes plus `-`, `:` and `.`.
    pub(crate) fn take_jsx_name(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| is_ident_byte(b) || matches!(b, b'-' | b':' | b'.'))
        {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    /// Consumes a quoted string starting at the opening quote and returns
    /// it verbatim, quotes included.
    pub(crate) fn take_string(&mut self) -> Result<&'a str, SyntaxError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(self.error_at(start, "Unterminated string constant"));
        };
        loop {
            match self.bump() {
                None | Some(b'\n') => {
                    return Err(self.error_at(start, "Unterminated string constant"));
                }
                Some(b'\\') => {
                    self.bump();
                }
                Some(b) if b == quote => return Ok(self.slice(start, self.pos)),
                Some(_) => {}
            }
        }
    }

    /// Consumes a line comment up to, not including, the newline.
    pub(crate) fn take_line_comment(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b != b'\n') {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    /// Consumes a block comment including its delimiters.
    pub(crate) fn take_block_comment(&mut self) -> Result<&'a str, SyntaxError> {
        let start = self.pos;
        self.advance(2);
        while !self.is_eof() {
            if self.starts_with("*/") {
                self.advance(2);
                return Ok(self.slice(start, self.pos));
            }
            self.pos += 1;
        }
        Err(self.error_at(start, "Unterminated comment"))
    }

    /// Consumes a regular expression literal starting at its opening `/`.
    pub(crate) fn take_regex(&mut self) -> Result<&'a str, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.bump() {
                None | Some(b'\n') => {
                    return Err(self.error_at(start, "Unterminated regular expression"));
                }
                Some(b'\\') => {
                    self.bump();
                }
                Some(b'[') => in_class = true,
                Some(b']') => in_class = false,
                Some(b'/') if !in_class => break,
                Some(_) => {}
            }
        }
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        Ok(self.slice(start, self.pos))
    }

    pub(crate) fn error_at(&self, offset: usize, message: &str) -> SyntaxError {
        SyntaxError::new(self.path, message).with_location(Location::from_offset(self.src, offset))
    }

    pub(crate) fn error_here(&self, message: &str) -> SyntaxError {
        self.error_at(self.pos, message)
    }
}

pub(crate) const fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$' || byte >= 0x80
}

pub(crate) const fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$' || byte >= 0x80
}

/// Returns `true` if `word` is a valid identifier that can be used as an
/// unquoted object key.
pub(crate) fn is_identifier(word: &str) -> bool {
    let mut bytes = word.bytes();
    bytes.next().is_some_and(is_ident_start) && bytes.all(is_ident_byte)
}
