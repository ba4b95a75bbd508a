//! Moving trees between memory and a real directory.
//!
//! The preview core never touches disk. These helpers exist for the CLI,
//! which packs a project directory into a tree and unpacks a tree back out.
//!
//! # Examples
//!
//! ```
//! use uigen_files::{ExportOptions, FilesBuilder, VirtualFileSystem};
//! # use tempfile::TempDir;
//!
//! # let temp = TempDir::new().unwrap();
//! let vfs = FilesBuilder::new()
//!     .add_file("/App.jsx", "export default () => null;")
//!     .build()
//!     .unwrap();
//!
//! vfs.export_to_directory(temp.path(), &ExportOptions::default()).unwrap();
//! assert!(temp.path().join("App.jsx").exists());
//!
//! let loaded = VirtualFileSystem::load_directory(temp.path()).unwrap();
//! assert_eq!(loaded, vfs);
//! ```

use crate::vfs::VirtualFileSystem;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uigen_core::{Error, Result};
use walkdir::WalkDir;

/// Options for writing a tree to disk.
///
/// # Examples
///
/// ```
/// use uigen_files::ExportOptions;
///
/// let options = ExportOptions::default().with_overwrite(false);
/// assert!(options.atomic);
/// assert!(!options.overwrite);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Write each file to a temporary sibling and rename it into place
    pub atomic: bool,
    /// Replace files that already exist on disk
    pub overwrite: bool,
}

impl ExportOptions {
    /// Atomic writes that overwrite existing files.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            atomic: true,
            overwrite: true,
        }
    }

    /// Sets whether to use atomic writes.
    #[must_use]
    pub const fn with_atomic_writes(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Sets whether to overwrite existing files.
    #[must_use]
    pub const fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem {
    /// Writes every directory and file under `base`.
    ///
    /// `base` is created if missing. Empty directories are written too.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if a directory or file cannot be written.
    pub fn export_to_directory(&self, base: impl AsRef<Path>, options: &ExportOptions) -> Result<()> {
        let base = base.as_ref();
        fs::create_dir_all(base).map_err(|e| io_error(base, e))?;

        let mut written = 0usize;
        for node in self.walk() {
            let target = disk_path(base, node.path().as_str());
            match node.content() {
                None => fs::create_dir_all(&target).map_err(|e| io_error(&target, e))?,
                Some(content) => {
                    if write_file(&target, content, options)? {
                        written += 1;
                    }
                }
            }
        }

        info!(base = %base.display(), written, "exported tree");
        Ok(())
    }

    /// Reads a directory from disk into a new tree.
    ///
    /// Hidden entries (names starting with `.`) and `node_modules` are
    /// skipped. Files that are not valid UTF-8 are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if `base` cannot be walked or a file cannot be
    /// read.
    pub fn load_directory(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        let mut vfs = Self::new();

        let walker = WalkDir::new(base)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_ignored(entry.file_name().to_string_lossy().as_ref()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(base).to_path_buf();
                Error::Io {
                    path: path.display().to_string(),
                    source: e.into(),
                }
            })?;

            let Ok(relative) = entry.path().strip_prefix(base) else {
                continue;
            };
            let virtual_path = virtual_path(relative);

            if entry.file_type().is_dir() {
                vfs.create_dir(&virtual_path)?;
            } else if entry.file_type().is_file() {
                let bytes = fs::read(entry.path()).map_err(|e| io_error(entry.path(), e))?;
                match String::from_utf8(bytes) {
                    Ok(content) => vfs.create_file(&virtual_path, content)?,
                    Err(_) => warn!(path = %entry.path().display(), "skipping non-UTF-8 file"),
                }
            }
        }

        debug!(base = %base.display(), files = vfs.file_count(), "loaded directory");
        Ok(vfs)
    }
}

fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || name == "node_modules"
}

fn virtual_path(relative: &Path) -> String {
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", segments.join("/"))
}

fn disk_path(base: &Path, virtual_path: &str) -> PathBuf {
    virtual_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Writes one file. Returns `false` if it was skipped.
fn write_file(path: &Path, content: &str, options: &ExportOptions) -> Result<bool> {
    if !options.overwrite && path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    if options.atomic {
        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        let mut file = fs::File::create(&temp_path).map_err(|e| io_error(&temp_path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| io_error(&temp_path, e))?;
        file.sync_all().map_err(|e| io_error(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| io_error(path, e))?;
    } else {
        fs::write(path, content).map_err(|e| io_error(path, e))?;
    }

    Ok(true)
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.display().to_string(),
        source,
    }
}
