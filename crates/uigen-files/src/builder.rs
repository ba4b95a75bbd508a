//! Fluent construction of virtual trees.
//!
//! # Examples
//!
//! ```
//! use uigen_files::FilesBuilder;
//!
//! let vfs = FilesBuilder::new()
//!     .add_file("/App.jsx", "export default function App() { return null; }")
//!     .add_file("/components/Button.jsx", "export default () => null;")
//!     .add_dir("/assets")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(vfs.file_count(), 2);
//! assert!(vfs.is_dir("/assets"));
//! ```

use crate::vfs::VirtualFileSystem;
use uigen_core::{Error, Result};

/// Builder for a [`VirtualFileSystem`].
///
/// Errors from individual additions are collected and the first one is
/// returned by [`build`](Self::build), so a chain of calls never needs
/// intermediate `?`.
#[derive(Debug, Default)]
pub struct FilesBuilder {
    vfs: VirtualFileSystem,
    errors: Vec<Error>,
}

impl FilesBuilder {
    /// Creates a builder for an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, creating missing parent directories.
    #[must_use]
    pub fn add_file(mut self, path: impl AsRef<str>, content: impl Into<String>) -> Self {
        if let Err(e) = self.vfs.create_file(path, content) {
            self.errors.push(e);
        }
        self
    }

    /// Adds several files.
    ///
    /// # Examples
    ///
    /// ```
    /// use uigen_files::FilesBuilder;
    ///
    /// let vfs = FilesBuilder::new()
    ///     .add_files([("/a.js", "1"), ("/b.js", "2")])
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(vfs.file_count(), 2);
    /// ```
    #[must_use]
    pub fn add_files<P, C>(mut self, files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<str>,
        C: Into<String>,
    {
        for (path, content) in files {
            if let Err(e) = self.vfs.create_file(path, content) {
                self.errors.push(e);
            }
        }
        self
    }

    /// Adds an empty directory.
    #[must_use]
    pub fn add_dir(mut self, path: impl AsRef<str>) -> Self {
        if let Err(e) = self.vfs.create_dir(path) {
            self.errors.push(e);
        }
        self
    }

    /// Number of files added so far.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.vfs.file_count()
    }

    /// Consumes the builder and returns the tree.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered while adding nodes.
    ///
    /// ```
    /// use uigen_files::FilesBuilder;
    ///
    /// let result = FilesBuilder::new()
    ///     .add_file("/App.jsx", "x")
    ///     .add_file("/App.jsx/inner.js", "y")
    ///     .build();
    /// assert!(result.unwrap_err().is_conflict());
    /// ```
    pub fn build(self) -> Result<VirtualFileSystem> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }
        Ok(self.vfs)
    }
}
