//! Flat, order-stable serialization of the virtual tree.
//!
//! A [`SerializedTree`] maps every absolute path except the root to its
//! node type and, for files, its content:
//!
//! ```json
//! {
//!   "/App.jsx": { "type": "file", "content": "export default ..." },
//!   "/components": { "type": "directory" }
//! }
//! ```
//!
//! Round-tripping is exact: `from_serialized(&vfs.serialize())` equals
//! `vfs` for every tree.

use crate::node::{FileNode, NodeType};
use crate::path::FilePath;
use crate::vfs::VirtualFileSystem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{debug, info};
use uigen_core::{Error, Result};

/// One serialized node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedNode {
    /// File or directory
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// File content; absent for directories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SerializedNode {
    /// A serialized file.
    #[must_use]
    pub fn file(content: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::File,
            content: Some(content.into()),
        }
    }

    /// A serialized directory.
    #[must_use]
    pub const fn directory() -> Self {
        Self {
            node_type: NodeType::Directory,
            content: None,
        }
    }
}

/// A flat mapping from absolute path to node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedTree {
    /// Nodes keyed by path
    pub nodes: BTreeMap<String, SerializedNode>,
}

impl SerializedTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parses a tree from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if the JSON is malformed or does not
    /// match the tree shape.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the tree as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl VirtualFileSystem {
    /// Produces the flat serialized form of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use uigen_files::VirtualFileSystem;
    ///
    /// let mut vfs = VirtualFileSystem::new();
    /// vfs.create_file("/components/Button.jsx", "x").unwrap();
    ///
    /// let tree = vfs.serialize();
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(VirtualFileSystem::from_serialized(&tree).unwrap(), vfs);
    /// ```
    #[must_use]
    pub fn serialize(&self) -> SerializedTree {
        let nodes = self
            .walk()
            .map(|node| {
                let serialized = match node.content() {
                    Some(content) => SerializedNode::file(content),
                    None => SerializedNode::directory(),
                };
                (node.path().to_string(), serialized)
            })
            .collect();
        SerializedTree { nodes }
    }

    /// Builds a new tree from serialized form.
    ///
    /// Keys are normalized. Missing ancestor directories are created. A
    /// file entry without content is an empty file. A `/` directory entry
    /// is accepted and ignored.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPath` if a key cannot be normalized
    /// - `Error::Conflict` if two keys normalize to the same path, the root
    ///   is declared as a file, or a node lies beneath a file
    /// - `Error::Serialization` if a directory carries content
    pub fn from_serialized(tree: &SerializedTree) -> Result<Self> {
        let mut nodes: BTreeMap<FilePath, FileNode> = BTreeMap::new();

        for (raw, entry) in &tree.nodes {
            let path = FilePath::new(raw)?;

            let node = match (entry.node_type, &entry.content) {
                (NodeType::Directory, Some(_)) => {
                    return Err(Error::Serialization {
                        message: format!("directory {path} must not carry content"),
                        source: None,
                    });
                }
                (NodeType::Directory, None) => FileNode::directory(path.clone()),
                (NodeType::File, content) => {
                    FileNode::file(path.clone(), content.clone().unwrap_or_default())
                }
            };

            if path.is_root() {
                if node.is_file() {
                    return Err(Error::Conflict {
                        path: path.to_string(),
                        reason: "the root must be a directory".to_string(),
                    });
                }
                continue;
            }

            match nodes.entry(path) {
                Entry::Occupied(occupied) => {
                    return Err(Error::Conflict {
                        path: occupied.key().to_string(),
                        reason: format!("duplicate entry after normalizing '{raw}'"),
                    });
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(node);
                }
            }
        }

        let mut vfs = Self::new();
        let mut implied = 0usize;
        for (path, node) in &nodes {
            for ancestor in path.ancestors() {
                match nodes.get(&ancestor) {
                    Some(parent) if parent.is_file() => {
                        return Err(Error::Conflict {
                            path: path.to_string(),
                            reason: format!("ancestor {ancestor} is a file"),
                        });
                    }
                    Some(_) => {}
                    None => {
                        if !vfs.exists(ancestor.as_str()) {
                            implied += 1;
                        }
                        vfs.insert_unchecked(FileNode::directory(ancestor));
                    }
                }
            }
            vfs.insert_unchecked(node.clone());
        }

        debug!(entries = nodes.len(), implied, "deserialized tree");
        Ok(vfs)
    }

    /// Replaces this tree's content with `tree`.
    ///
    /// The replacement is built first and swapped in only on success, so a
    /// rejected tree leaves the current content untouched. Listeners stay
    /// subscribed and receive a single reset event.
    ///
    /// # Errors
    ///
    /// See [`from_serialized`](Self::from_serialized).
    pub fn deserialize(&mut self, tree: &SerializedTree) -> Result<()> {
        let fresh = Self::from_serialized(tree)?;
        info!(files = fresh.file_count(), "replacing tree");
        self.replace_nodes(fresh);
        Ok(())
    }
}
