//! Normalized virtual paths.
//!
//! Every path that enters the tree goes through [`FilePath::new`], so two
//! spellings of the same location always compare equal.
//!
//! # Examples
//!
//! ```
//! use uigen_files::FilePath;
//!
//! let path = FilePath::new("components//./ui/../Button.jsx").unwrap();
//! assert_eq!(path.as_str(), "/components/Button.jsx");
//! assert_eq!(path.parent().unwrap().as_str(), "/components");
//! assert_eq!(path.extension(), Some("jsx"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uigen_core::{Error, Result};

/// An absolute, normalized virtual path.
///
/// Invariants:
/// - starts with a single `/`
/// - no empty, `.` or `..` segments
/// - no trailing `/` except for the root itself
///
/// `..` segments that would climb above the root are clamped at the root,
/// matching POSIX path resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilePath(String);

impl FilePath {
    /// Normalizes `path` into an absolute virtual path.
    ///
    /// Relative input is interpreted against the root.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPath` if the path is empty or contains a NUL
    /// byte.
    pub fn new(path: impl AsRef<str>) -> Result<Self> {
        let raw = path.as_ref();

        if raw.is_empty() {
            return Err(Error::InvalidPath {
                path: String::new(),
                reason: "path is empty".to_string(),
            });
        }

        if raw.contains('\0') {
            return Err(Error::InvalidPath {
                path: raw.replace('\0', "\\0"),
                reason: "path contains a NUL byte".to_string(),
            });
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name),
            }
        }

        Ok(Self::from_segments(&segments))
    }

    /// The root path `/`.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    fn from_segments(segments: &[&str]) -> Self {
        if segments.is_empty() {
            Self::root()
        } else {
            Self(format!("/{}", segments.join("/")))
        }
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns the parent directory, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(Self::root()),
            Some(pos) => Some(Self(self.0[..pos].to_string())),
        }
    }

    /// Returns the last segment, or `None` for the root.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Returns the extension of the last segment without the dot.
    ///
    /// Dotfiles such as `/.env` have no extension.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(pos) => Some(&name[pos + 1..]),
        }
    }

    /// Returns the path with the extension of the last segment removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use uigen_files::FilePath;
    ///
    /// let path = FilePath::new("/components/Button.jsx").unwrap();
    /// assert_eq!(path.without_extension(), "/components/Button");
    /// ```
    #[must_use]
    pub fn without_extension(&self) -> &str {
        match self.extension() {
            Some(ext) => &self.0[..self.0.len() - ext.len() - 1],
            None => &self.0,
        }
    }

    /// Resolves `relative` against this path treated as a directory.
    ///
    /// An absolute `relative` replaces this path entirely.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPath` if the joined path is invalid.
    pub fn join(&self, relative: &str) -> Result<Self> {
        if relative.starts_with('/') {
            Self::new(relative)
        } else {
            Self::new(format!("{}/{relative}", self.0))
        }
    }

    /// Returns `true` if `other` lies strictly beneath this directory path.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        if self.is_root() {
            return !other.is_root();
        }
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'/'
    }

    /// Returns `true` if this path equals `other` or lies beneath it.
    #[must_use]
    pub fn is_within(&self, other: &Self) -> bool {
        self == other || other.is_ancestor_of(self)
    }

    /// Lists every proper ancestor from the root down, excluding the root
    /// and this path.
    ///
    /// # Examples
    ///
    /// ```
    /// use uigen_files::FilePath;
    ///
    /// let path = FilePath::new("/a/b/c.jsx").unwrap();
    /// let ancestors: Vec<String> = path.ancestors().iter().map(|p| p.to_string()).collect();
    /// assert_eq!(ancestors, vec!["/a", "/a/b"]);
    /// ```
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        let segments: Vec<&str> = self.segments().collect();
        (1..segments.len())
            .map(|depth| Self::from_segments(&segments[..depth]))
            .collect()
    }

    /// Iterates the path segments from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Number of segments; zero for the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Rewrites a path beneath `from` so that it lies beneath `to` instead.
    ///
    /// Returns `None` if this path is not within `from`.
    #[must_use]
    pub fn rebase(&self, from: &Self, to: &Self) -> Option<Self> {
        if self == from {
            return Some(to.clone());
        }
        if !from.is_ancestor_of(self) {
            return None;
        }
        let suffix = if from.is_root() {
            &self.0[1..]
        } else {
            &self.0[from.0.len() + 1..]
        };
        if to.is_root() {
            Some(Self(format!("/{suffix}")))
        } else {
            Some(Self(format!("{}/{suffix}", to.0)))
        }
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for FilePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FilePath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FilePath> for String {
    fn from(path: FilePath) -> Self {
        path.0
    }
}
