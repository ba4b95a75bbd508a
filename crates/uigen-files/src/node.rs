//! File and directory nodes.

use crate::path::FilePath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a node is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A text file
    File,
    /// A directory
    Directory,
}

impl NodeType {
    /// Returns the lowercase name used in serialized trees.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a node.
///
/// Only files carry content. Directory children are derived from the
/// path index, so a directory node holds nothing itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A file and its text
    File {
        /// Source text
        content: String,
    },
    /// A directory
    Directory,
}

/// One entry in the virtual tree.
///
/// # Examples
///
/// ```
/// use uigen_files::{FileNode, FilePath, NodeType};
///
/// let node = FileNode::file(FilePath::new("/App.jsx").unwrap(), "export default 1;");
/// assert_eq!(node.node_type(), NodeType::File);
/// assert_eq!(node.content(), Some("export default 1;"));
/// assert_eq!(node.name(), "App.jsx");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    path: FilePath,
    kind: NodeKind,
}

impl FileNode {
    /// Creates a file node.
    #[must_use]
    pub fn file(path: FilePath, content: impl Into<String>) -> Self {
        Self {
            path,
            kind: NodeKind::File {
                content: content.into(),
            },
        }
    }

    /// Creates a directory node.
    #[must_use]
    pub const fn directory(path: FilePath) -> Self {
        Self {
            path,
            kind: NodeKind::Directory,
        }
    }

    /// Returns the normalized path.
    #[must_use]
    pub const fn path(&self) -> &FilePath {
        &self.path
    }

    /// Returns the last path segment, or `/` for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.file_name().unwrap_or("/")
    }

    /// Returns the node payload.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns whether this is a file or a directory.
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::File { .. } => NodeType::File,
            NodeKind::Directory => NodeType::Directory,
        }
    }

    /// Returns `true` for files.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    /// Returns `true` for directories.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    /// Returns the file content, or `None` for directories.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Directory => None,
        }
    }

    pub(crate) fn set_content(&mut self, text: String) {
        self.kind = NodeKind::File { content: text };
    }

    pub(crate) fn with_path(self, path: FilePath) -> Self {
        Self {
            path,
            kind: self.kind,
        }
    }
}
