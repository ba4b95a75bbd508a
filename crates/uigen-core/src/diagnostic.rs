//! Diagnostic values produced by the transform engine.
//!
//! A [`SyntaxError`] describes why one file could not be transformed. It is
//! a plain value rather than a control-flow error: the preview collects
//! these per file and renders them in an overlay.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based line and column inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Computes the location of a byte offset inside `source`.
    ///
    /// Offsets past the end are clamped to the end of the text.
    ///
    /// # Examples
    ///
    /// ```
    /// use uigen_core::Location;
    ///
    /// let loc = Location::from_offset("ab\ncd", 4);
    /// assert_eq!(loc, Location::new(2, 2));
    /// ```
    #[must_use]
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut end = offset.min(source.len());
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        let before = &source[..end];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A file that failed to transform.
///
/// # Examples
///
/// ```
/// use uigen_core::{Location, SyntaxError};
///
/// let err = SyntaxError::new("/App.jsx", "Unexpected end of input")
///     .with_location(Location::new(4, 1));
/// assert_eq!(err.to_string(), "/App.jsx:4:1: Unexpected end of input");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    /// Path of the file that failed
    pub path: String,
    /// Human-readable description
    pub message: String,
    /// Best-effort position of the problem
    pub location: Option<Location>,
}

impl SyntaxError {
    /// Creates an error without location information.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Attaches a source location.
    #[must_use]
    pub const fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{}:{}: {}", self.path, loc, self.message),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_first_line() {
        assert_eq!(Location::from_offset("hello", 0), Location::new(1, 1));
        assert_eq!(Location::from_offset("hello", 3), Location::new(1, 4));
    }

    #[test]
    fn test_location_counts_chars_not_bytes() {
        let source = "é<div";
        let offset = source.find('<').unwrap();
        assert_eq!(Location::from_offset(source, offset), Location::new(1, 2));
    }

    #[test]
    fn test_location_clamps_past_end() {
        assert_eq!(Location::from_offset("a\nb", 99), Location::new(2, 2));
    }

    #[test]
    fn test_syntax_error_without_location() {
        let err = SyntaxError::new("/a.jsx", "boom");
        assert_eq!(err.to_string(), "/a.jsx: boom");
    }

    #[test]
    fn test_syntax_error_serializes() {
        let err = SyntaxError::new("/a.jsx", "boom").with_location(Location::new(1, 2));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["path"], "/a.jsx");
        assert_eq!(json["location"]["line"], 1);
        assert_eq!(json["location"]["column"], 2);
    }
}
