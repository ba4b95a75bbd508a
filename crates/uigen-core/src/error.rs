//! Error types for the UIGen preview pipeline.
//!
//! Every file-system, edit-operation, and configuration failure is reported
//! through [`Error`]. Transform failures are carried as [`SyntaxError`]
//! values so that one broken file can be collected alongside others instead
//! of aborting a build.
//!
//! # Examples
//!
//! ```
//! use uigen_core::{Error, Result};
//!
//! fn read_entry(exists: bool) -> Result<()> {
//!     if !exists {
//!         return Err(Error::NotFound {
//!             path: "/App.jsx".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = read_entry(false).unwrap_err();
//! assert!(err.is_not_found());
//! ```

use crate::diagnostic::SyntaxError;
use thiserror::Error;

/// Main error type for the preview pipeline.
///
/// All variants carry enough context to be shown to the driving agent or
/// to the user without further lookup.
#[derive(Error, Debug)]
pub enum Error {
    /// A path does not exist, or the node at that path has the wrong type.
    #[error("No such file or directory: {path}")]
    NotFound {
        /// The path that was addressed
        path: String,
    },

    /// An operation would overwrite an incompatible node.
    #[error("Conflict at {path}: {reason}")]
    Conflict {
        /// The path where the conflict occurred
        path: String,
        /// Why the operation was refused
        reason: String,
    },

    /// A text replacement target is not uniquely identifiable.
    ///
    /// `occurrences` is zero when the text was not found at all.
    #[error("Expected exactly one match in {path}, found {occurrences}")]
    AmbiguousMatch {
        /// The file that was searched
        path: String,
        /// Number of occurrences found
        occurrences: usize,
    },

    /// A line or index argument is out of bounds.
    #[error("Out of range in {path}: {message}")]
    Range {
        /// The file the range applied to
        path: String,
        /// Description of the violated bound
        message: String,
    },

    /// A path could not be normalized.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The raw path as supplied
        path: String,
        /// Why the path was rejected
        reason: String,
    },

    /// An edit command payload was malformed.
    #[error("Invalid command: {message}")]
    InvalidCommand {
        /// Description of the validation failure
        message: String,
    },

    /// A file failed to transform.
    #[error(transparent)]
    SyntaxTransform(SyntaxError),

    /// The preview has no entry-point file.
    #[error("Entry point missing: expected {expected}")]
    MissingEntryPoint {
        /// The configured entry-point path
        expected: String,
    },

    /// Serialization or deserialization failed.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// The host document template failed to render.
    #[error("Template error: {message}")]
    Template {
        /// Description of the rendering failure
        message: String,
    },

    /// Disk I/O failed while importing or exporting a tree.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The host path involved
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid CLI or function argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns `true` if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a conflict error.
    ///
    /// # Examples
    ///
    /// ```
    /// use uigen_core::Error;
    ///
    /// let err = Error::Conflict {
    ///     path: "/components".to_string(),
    ///     reason: "directory exists".to_string(),
    /// };
    /// assert!(err.is_conflict());
    /// ```
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns `true` if this is an ambiguous-match error.
    #[must_use]
    pub const fn is_ambiguous_match(&self) -> bool {
        matches!(self, Self::AmbiguousMatch { .. })
    }

    /// Returns `true` if this is a range error.
    #[must_use]
    pub const fn is_range_error(&self) -> bool {
        matches!(self, Self::Range { .. })
    }

    /// Returns `true` if this is an invalid-path error.
    #[must_use]
    pub const fn is_invalid_path(&self) -> bool {
        matches!(self, Self::InvalidPath { .. })
    }

    /// Returns `true` if this is an invalid-command error.
    #[must_use]
    pub const fn is_invalid_command(&self) -> bool {
        matches!(self, Self::InvalidCommand { .. })
    }

    /// Returns `true` if this is a transform syntax error.
    #[must_use]
    pub const fn is_syntax_error(&self) -> bool {
        matches!(self, Self::SyntaxTransform(_))
    }

    /// Returns `true` if this is a missing entry-point error.
    #[must_use]
    pub const fn is_missing_entry_point(&self) -> bool {
        matches!(self, Self::MissingEntryPoint { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a serialization error.
    #[must_use]
    pub const fn is_serialization_error(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Self::SyntaxTransform(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Location;

    #[test]
    fn test_not_found_detection() {
        let err = Error::NotFound {
            path: "/missing.jsx".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert!(err.to_string().contains("/missing.jsx"));
    }

    #[test]
    fn test_ambiguous_match_display() {
        let err = Error::AmbiguousMatch {
            path: "/App.jsx".to_string(),
            occurrences: 2,
        };
        assert!(err.is_ambiguous_match());
        assert_eq!(
            err.to_string(),
            "Expected exactly one match in /App.jsx, found 2"
        );
    }

    #[test]
    fn test_range_detection() {
        let err = Error::Range {
            path: "/App.jsx".to_string(),
            message: "line 9 exceeds 3 lines".to_string(),
        };
        assert!(err.is_range_error());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_syntax_error_conversion() {
        let syntax = SyntaxError::new("/App.jsx", "Unterminated JSX contents")
            .with_location(Location::new(3, 5));
        let err: Error = syntax.into();
        assert!(err.is_syntax_error());
        assert_eq!(
            err.to_string(),
            "/App.jsx:3:5: Unterminated JSX contents"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = serde_err.into();
        assert!(err.is_serialization_error());
    }

    #[test]
    fn test_result_alias() {
        fn fails() -> Result<()> {
            Err(Error::MissingEntryPoint {
                expected: "/App".to_string(),
            })
        }

        let err = fails().unwrap_err();
        assert!(err.is_missing_entry_point());
        assert!(err.to_string().contains("/App"));
    }
}
