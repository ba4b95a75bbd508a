//! Structured edit operations.
//!
//! The command surface used by a driving agent to change the tree. Each
//! command is a closed tagged variant carrying exactly its fields, and every
//! argument is validated before the tree is touched, so a rejected command
//! never leaves a partial change behind.
//!
//! Two tools are exposed, matching the agent tool-call protocol:
//!
//! - `str_replace_editor`: [`EditorCommand`] (`view`, `create`,
//!   `str_replace`, `insert`)
//! - `file_manager`: [`FileManagerCommand`] (`rename`, `delete`)
//!
//! # Line numbering
//!
//! A file's lines are its `\n`-separated segments; an empty file has none.
//! `view_range` is 1-based and inclusive with `-1` meaning the last line.
//! `insert_line = N` inserts after the first `N` lines, so `0` inserts at
//! the top and `line_count` appends.
//!
//! # Examples
//!
//! ```
//! use uigen_files::{ToolCall, VirtualFileSystem};
//!
//! let mut vfs = VirtualFileSystem::new();
//! let call = ToolCall::from_json(
//!     r#"{"tool": "str_replace_editor",
//!         "input": {"command": "create", "path": "/App.jsx", "file_text": "a\nc"}}"#,
//! )
//! .unwrap();
//! call.apply(&mut vfs).unwrap();
//!
//! let insert = ToolCall::from_json(
//!     r#"{"tool": "str_replace_editor",
//!         "input": {"command": "insert", "path": "/App.jsx", "insert_line": 1, "new_str": "b"}}"#,
//! )
//! .unwrap();
//! insert.apply(&mut vfs).unwrap();
//!
//! assert_eq!(vfs.read("/App.jsx").unwrap(), "a\nb\nc");
//! ```

use crate::path::FilePath;
use crate::vfs::VirtualFileSystem;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uigen_core::{Error, Result};

/// Commands of the `str_replace_editor` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    /// Shows a file with line numbers, or a directory listing.
    View {
        /// Target path
        path: String,
        /// Optional `[start, end]` line span, 1-based inclusive
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_range: Option<[i64; 2]>,
    },
    /// Writes a whole file, replacing any existing content.
    Create {
        /// Target path
        path: String,
        /// Complete file text
        #[serde(default)]
        file_text: String,
    },
    /// Replaces the single occurrence of `old_str`.
    StrReplace {
        /// Target file
        path: String,
        /// Exact text to find; must occur exactly once
        old_str: String,
        /// Replacement text
        #[serde(default)]
        new_str: String,
    },
    /// Inserts text after a given line.
    Insert {
        /// Target file
        path: String,
        /// Number of lines to keep above the inserted text
        insert_line: i64,
        /// Text to insert
        new_str: String,
    },
}

/// Commands of the `file_manager` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum FileManagerCommand {
    /// Moves a file or directory.
    Rename {
        /// Source path
        path: String,
        /// Destination path
        new_path: String,
    },
    /// Deletes a file or directory.
    Delete {
        /// Target path
        path: String,
    },
}

/// A tool invocation as issued by the driving agent.
///
/// Serialized as `{"tool": "...", "input": {"command": "...", ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "input")]
pub enum ToolCall {
    /// A `str_replace_editor` call
    #[serde(rename = "str_replace_editor")]
    Editor(EditorCommand),
    /// A `file_manager` call
    #[serde(rename = "file_manager")]
    FileManager(FileManagerCommand),
}

impl ToolCall {
    /// Parses a tool call from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCommand` for unknown tools or commands,
    /// missing fields, or mistyped values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(invalid_command)
    }

    /// Converts an already-parsed JSON value into a tool call.
    ///
    /// # Errors
    ///
    /// Same as [`from_json`](Self::from_json).
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(invalid_command)
    }

    /// Applies the call to `vfs`.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying command. The tree is unchanged
    /// on error.
    pub fn apply(&self, vfs: &mut VirtualFileSystem) -> Result<EditOutcome> {
        match self {
            Self::Editor(command) => command.apply(vfs),
            Self::FileManager(command) => command.apply(vfs),
        }
    }

    /// Returns `true` if the call only reads.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::Editor(EditorCommand::View { .. }))
    }
}

impl From<EditorCommand> for ToolCall {
    fn from(command: EditorCommand) -> Self {
        Self::Editor(command)
    }
}

impl From<FileManagerCommand> for ToolCall {
    fn from(command: FileManagerCommand) -> Self {
        Self::FileManager(command)
    }
}

impl EditorCommand {
    /// Applies the command to `vfs`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPath` for an unnormalizable path
    /// - `Error::NotFound` if the target does not exist
    /// - `Error::Conflict` if `create` targets a directory
    /// - `Error::AmbiguousMatch` if `old_str` is empty or does not occur
    ///   exactly once
    /// - `Error::Range` for out-of-bounds line arguments
    pub fn apply(&self, vfs: &mut VirtualFileSystem) -> Result<EditOutcome> {
        match self {
            Self::View { path, view_range } => {
                let path = FilePath::new(path)?;
                let text = view(vfs, &path, *view_range)?;
                Ok(EditOutcome::Viewed { path, text })
            }
            Self::Create { path, file_text } => {
                let path = FilePath::new(path)?;
                let overwritten = vfs.is_file(&path);
                vfs.create_file(&path, file_text.as_str())?;
                debug!(path = %path, overwritten, "editor create");
                Ok(EditOutcome::Created { path, overwritten })
            }
            Self::StrReplace {
                path,
                old_str,
                new_str,
            } => {
                let path = FilePath::new(path)?;
                let updated = str_replace(vfs.read(&path)?, &path, old_str, new_str)?;
                vfs.update(&path, updated)?;
                debug!(path = %path, "editor str_replace");
                Ok(EditOutcome::Replaced { path })
            }
            Self::Insert {
                path,
                insert_line,
                new_str,
            } => {
                let path = FilePath::new(path)?;
                let (updated, line) = insert(vfs.read(&path)?, &path, *insert_line, new_str)?;
                vfs.update(&path, updated)?;
                debug!(path = %path, line, "editor insert");
                Ok(EditOutcome::Inserted { path, line })
            }
        }
    }
}

impl FileManagerCommand {
    /// Applies the command to `vfs`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`VirtualFileSystem::rename`] and
    /// [`VirtualFileSystem::delete`].
    pub fn apply(&self, vfs: &mut VirtualFileSystem) -> Result<EditOutcome> {
        match self {
            Self::Rename { path, new_path } => {
                let from = FilePath::new(path)?;
                let to = FilePath::new(new_path)?;
                vfs.rename(&from, &to)?;
                Ok(EditOutcome::Renamed { from, to })
            }
            Self::Delete { path } => {
                let path = FilePath::new(path)?;
                vfs.delete(&path)?;
                Ok(EditOutcome::Deleted { path })
            }
        }
    }
}

/// The result of a successful command.
///
/// `Display` renders the message returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    /// A view was rendered
    Viewed {
        /// Viewed path
        path: FilePath,
        /// Rendered text
        text: String,
    },
    /// A file was written
    Created {
        /// Written path
        path: FilePath,
        /// Whether an existing file was replaced
        overwritten: bool,
    },
    /// A unique occurrence was replaced
    Replaced {
        /// Edited file
        path: FilePath,
    },
    /// Text was inserted
    Inserted {
        /// Edited file
        path: FilePath,
        /// Number of lines above the inserted text
        line: usize,
    },
    /// A node moved
    Renamed {
        /// Old path
        from: FilePath,
        /// New path
        to: FilePath,
    },
    /// A node was removed
    Deleted {
        /// Removed path
        path: FilePath,
    },
}

impl EditOutcome {
    /// Returns the path the outcome refers to; the destination for renames.
    #[must_use]
    pub const fn path(&self) -> &FilePath {
        match self {
            Self::Viewed { path, .. }
            | Self::Created { path, .. }
            | Self::Replaced { path }
            | Self::Inserted { path, .. }
            | Self::Deleted { path }
            | Self::Renamed { to: path, .. } => path,
        }
    }
}

impl fmt::Display for EditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Viewed { text, .. } => f.write_str(text),
            Self::Created {
                path,
                overwritten: false,
            } => write!(f, "File created: {path}"),
            Self::Created {
                path,
                overwritten: true,
            } => write!(f, "File overwritten: {path}"),
            Self::Replaced { path } => write!(f, "Replaced text in {path}"),
            Self::Inserted { path, line } => {
                write!(f, "Inserted text after line {line} of {path}")
            }
            Self::Renamed { from, to } => write!(f, "Renamed {from} to {to}"),
            Self::Deleted { path } => write!(f, "Deleted {path}"),
        }
    }
}

/// Splits content into lines; an empty file has none.
fn split_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        Vec::new()
    } else {
        content.split('\n').collect()
    }
}

/// Renders a file with numbered lines or a directory listing.
///
/// # Errors
///
/// - `Error::NotFound` if nothing exists at `path`
/// - `Error::Range` if `range` is out of bounds
/// - `Error::InvalidCommand` if `range` is given for a directory
pub fn view(vfs: &VirtualFileSystem, path: &FilePath, range: Option<[i64; 2]>) -> Result<String> {
    let node = vfs.get(path).ok_or_else(|| Error::NotFound {
        path: path.to_string(),
    })?;

    let Some(content) = node.content() else {
        if range.is_some() {
            return Err(Error::InvalidCommand {
                message: format!("view_range cannot be used on directory {path}"),
            });
        }
        let listing: Vec<String> = vfs
            .children(path)?
            .map(|child| {
                let tag = if child.is_dir() { "[DIR]" } else { "[FILE]" };
                format!("{tag} {}", child.name())
            })
            .collect();
        if listing.is_empty() {
            return Ok("(empty directory)".to_string());
        }
        return Ok(listing.join("\n"));
    };

    let lines = split_lines(content);
    let (start, end) = match range {
        None if lines.is_empty() => return Ok("(empty file)".to_string()),
        None => (1, lines.len()),
        Some([start, end]) => resolve_range(path, start, end, lines.len())?,
    };

    Ok(lines[start - 1..end]
        .iter()
        .zip(start..)
        .map(|(line, number)| format!("{number}\t{line}"))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn resolve_range(path: &FilePath, start: i64, end: i64, count: usize) -> Result<(usize, usize)> {
    let out_of_range = |message: String| Error::Range {
        path: path.to_string(),
        message,
    };

    let start = usize::try_from(start)
        .ok()
        .filter(|s| (1..=count).contains(s))
        .ok_or_else(|| out_of_range(format!("start line {start} is outside 1..={count}")))?;

    let end = if end == -1 {
        count
    } else {
        usize::try_from(end)
            .ok()
            .filter(|e| (start..=count).contains(e))
            .ok_or_else(|| {
                out_of_range(format!("end line {end} is outside {start}..={count}"))
            })?
    };

    Ok((start, end))
}

/// Counts occurrences of `needle`, including overlapping ones.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    let mut count = 0;
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        count += 1;
        let at = from + pos;
        from = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
    }
    count
}

/// Replaces the unique occurrence of `old` in `content`.
///
/// # Errors
///
/// Returns `Error::AmbiguousMatch` if `old` is empty or does not occur
/// exactly once.
pub fn str_replace(content: &str, path: &FilePath, old: &str, new: &str) -> Result<String> {
    let occurrences = if old.is_empty() {
        0
    } else {
        count_occurrences(content, old)
    };

    if occurrences != 1 {
        return Err(Error::AmbiguousMatch {
            path: path.to_string(),
            occurrences,
        });
    }

    Ok(content.replacen(old, new, 1))
}

/// Inserts `text` after the first `after` lines of `content`.
///
/// Returns the new content and the validated line index.
///
/// # Errors
///
/// Returns `Error::Range` unless `0 <= after <= line_count`.
pub fn insert(content: &str, path: &FilePath, after: i64, text: &str) -> Result<(String, usize)> {
    let lines = split_lines(content);
    let after = usize::try_from(after)
        .ok()
        .filter(|n| *n <= lines.len())
        .ok_or_else(|| Error::Range {
            path: path.to_string(),
            message: format!("insert_line {after} is outside 0..={}", lines.len()),
        })?;

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    out.extend_from_slice(&lines[..after]);
    out.push(text);
    out.extend_from_slice(&lines[after..]);
    Ok((out.join("\n"), after))
}

fn invalid_command(err: serde_json::Error) -> Error {
    Error::InvalidCommand {
        message: err.to_string(),
    }
}
