//! The in-memory virtual file tree.
//!
//! [`VirtualFileSystem`] stores every node in a flat map keyed by
//! normalized path. Directory children are found by prefix range scans, so
//! the tree structure and the path index are the same data and cannot
//! diverge.
//!
//! # Invariants
//!
//! 1. The root `/` is always present and is a directory.
//! 2. Every key is a normalized [`FilePath`].
//! 3. Every non-root node's parent exists and is a directory.
//! 4. Failed operations leave the tree untouched and emit no events.

use crate::events::{ChangeEvent, ChangeKind, ChangeListener};
use crate::node::{FileNode, NodeType};
use crate::path::FilePath;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tracing::debug;
use uigen_core::{Error, Result};

/// An in-memory tree of files and directories.
///
/// One instance belongs to one editing or preview session. Cloning copies
/// the nodes but not the subscribed listeners, and equality compares nodes
/// only.
///
/// # Examples
///
/// ```
/// use uigen_files::VirtualFileSystem;
///
/// let mut vfs = VirtualFileSystem::new();
/// vfs.create_file("/components/Button.jsx", "export default () => null;").unwrap();
///
/// assert!(vfs.is_dir("/components"));
/// assert_eq!(vfs.read("/components//Button.jsx").unwrap(), "export default () => null;");
///
/// let names: Vec<&str> = vfs.list("/").unwrap().collect();
/// assert_eq!(names, vec!["components"]);
/// ```
#[derive(Debug)]
pub struct VirtualFileSystem {
    nodes: BTreeMap<FilePath, FileNode>,
    listeners: Vec<Arc<dyn ChangeListener>>,
}

impl VirtualFileSystem {
    /// Creates a tree containing only the root directory.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(FilePath::root(), FileNode::directory(FilePath::root()));
        Self {
            nodes,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for subsequent mutations.
    pub fn subscribe(&mut self, listener: Arc<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    /// Removes every listener.
    pub fn unsubscribe_all(&mut self) {
        self.listeners.clear();
    }

    /// Creates or overwrites a file, creating missing ancestor directories.
    ///
    /// Overwriting an existing file replaces its content and is reported as
    /// an update.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPath` if the path cannot be normalized
    /// - `Error::Conflict` if the path is the root, a directory, or lies
    ///   beneath an existing file
    pub fn create_file(&mut self, path: impl AsRef<str>, content: impl Into<String>) -> Result<()> {
        let path = FilePath::new(path)?;

        if path.is_root() {
            return Err(conflict(&path, "cannot replace the root directory with a file"));
        }

        let existed = match self.nodes.get(&path) {
            Some(node) if node.is_dir() => {
                return Err(conflict(&path, "a directory already exists at this path"));
            }
            Some(_) => true,
            None => false,
        };

        self.check_ancestors(&path)?;
        self.create_ancestors(&path);

        let content = content.into();
        debug!(path = %path, bytes = content.len(), existed, "writing file");
        self.nodes
            .insert(path.clone(), FileNode::file(path.clone(), content));

        let kind = if existed {
            ChangeKind::Updated
        } else {
            ChangeKind::Created
        };
        self.emit(path, kind, NodeType::File);
        Ok(())
    }

    /// Creates a directory and any missing ancestors.
    ///
    /// Creating a directory that already exists succeeds without emitting an
    /// event.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPath` if the path cannot be normalized
    /// - `Error::Conflict` if a file exists at the path or at an ancestor
    pub fn create_dir(&mut self, path: impl AsRef<str>) -> Result<()> {
        let path = FilePath::new(path)?;

        match self.nodes.get(&path) {
            Some(node) if node.is_dir() => return Ok(()),
            Some(_) => return Err(conflict(&path, "a file already exists at this path")),
            None => {}
        }

        self.check_ancestors(&path)?;
        self.create_ancestors(&path);

        debug!(path = %path, "creating directory");
        self.nodes
            .insert(path.clone(), FileNode::directory(path.clone()));
        self.emit(path, ChangeKind::Created, NodeType::Directory);
        Ok(())
    }

    /// Creates a file when `content` is `Some`, otherwise a directory.
    ///
    /// # Errors
    ///
    /// See [`create_file`](Self::create_file) and
    /// [`create_dir`](Self::create_dir).
    pub fn create(&mut self, path: impl AsRef<str>, content: Option<String>) -> Result<()> {
        match content {
            Some(text) => self.create_file(path, text),
            None => self.create_dir(path),
        }
    }

    /// Returns a file's content.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPath` if the path cannot be normalized
    /// - `Error::NotFound` if nothing exists at the path or it is a directory
    pub fn read(&self, path: impl AsRef<str>) -> Result<&str> {
        let path = FilePath::new(path)?;
        self.nodes
            .get(&path)
            .and_then(FileNode::content)
            .ok_or_else(|| not_found(&path))
    }

    /// Replaces the content of an existing file.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPath` if the path cannot be normalized
    /// - `Error::NotFound` if the file does not exist or is a directory
    pub fn update(&mut self, path: impl AsRef<str>, content: impl Into<String>) -> Result<()> {
        let path = FilePath::new(path)?;
        let node = self
            .nodes
            .get_mut(&path)
            .filter(|node| node.is_file())
            .ok_or_else(|| not_found(&path))?;

        let content = content.into();
        debug!(path = %path, bytes = content.len(), "updating file");
        node.set_content(content);
        self.emit(path, ChangeKind::Updated, NodeType::File);
        Ok(())
    }

    /// Removes a file, or a directory together with its entire subtree.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPath` if the path cannot be normalized
    /// - `Error::Conflict` if the path is the root
    /// - `Error::NotFound` if nothing exists at the path
    pub fn delete(&mut self, path: impl AsRef<str>) -> Result<()> {
        let path = FilePath::new(path)?;

        if path.is_root() {
            return Err(conflict(&path, "the root directory cannot be deleted"));
        }

        let node_type = self
            .nodes
            .get(&path)
            .map(FileNode::node_type)
            .ok_or_else(|| not_found(&path))?;

        let descendants = self.descendant_paths(&path);
        debug!(path = %path, descendants = descendants.len(), "deleting");
        for descendant in &descendants {
            self.nodes.remove(descendant);
        }
        self.nodes.remove(&path);

        self.emit(path, ChangeKind::Deleted, node_type);
        Ok(())
    }

    /// Moves a node, and its subtree for directories, to a new path.
    ///
    /// Missing ancestors of the destination are created. Renaming a path to
    /// itself succeeds without changes.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPath` if either path cannot be normalized
    /// - `Error::NotFound` if the source does not exist
    /// - `Error::Conflict` if the destination is occupied, lies beneath a
    ///   file, lies inside the source directory, or either path is the root
    pub fn rename(&mut self, from: impl AsRef<str>, to: impl AsRef<str>) -> Result<()> {
        let from = FilePath::new(from)?;
        let to = FilePath::new(to)?;

        if from.is_root() {
            return Err(conflict(&from, "the root directory cannot be moved"));
        }

        let node_type = self
            .nodes
            .get(&from)
            .map(FileNode::node_type)
            .ok_or_else(|| not_found(&from))?;

        if from == to {
            return Ok(());
        }

        if self.nodes.contains_key(&to) {
            return Err(conflict(&to, "destination already exists"));
        }

        if from.is_ancestor_of(&to) {
            return Err(conflict(&to, "cannot move a directory inside itself"));
        }

        self.check_ancestors(&to)?;
        self.create_ancestors(&to);

        let mut moved = self.descendant_paths(&from);
        moved.push(from.clone());
        debug!(from = %from, to = %to, nodes = moved.len(), "renaming");

        for old in moved {
            if let Some(node) = self.nodes.remove(&old)
                && let Some(new) = old.rebase(&from, &to)
            {
                self.nodes.insert(new.clone(), node.with_path(new));
            }
        }

        self.emit(to, ChangeKind::Renamed { from }, node_type);
        Ok(())
    }

    /// Iterates the names of a directory's immediate children in sorted
    /// order.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPath` if the path cannot be normalized
    /// - `Error::NotFound` if the path is absent or is a file
    pub fn list(&self, path: impl AsRef<str>) -> Result<impl Iterator<Item = &str> + '_> {
        Ok(self.children(path)?.map(FileNode::name))
    }

    /// Iterates a directory's immediate child nodes in sorted order.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub fn children(&self, path: impl AsRef<str>) -> Result<impl Iterator<Item = &FileNode> + '_> {
        let path = FilePath::new(path)?;
        if !self.nodes.get(&path).is_some_and(FileNode::is_dir) {
            return Err(not_found(&path));
        }

        let depth = path.depth() + 1;
        Ok(self
            .subtree(&path)
            .filter(move |(key, _)| key.depth() == depth)
            .map(|(_, node)| node))
    }

    /// Returns the node at `path`, if any. Unnormalizable paths yield `None`.
    #[must_use]
    pub fn get(&self, path: impl AsRef<str>) -> Option<&FileNode> {
        FilePath::new(path)
            .ok()
            .and_then(|path| self.nodes.get(&path))
    }

    /// Returns `true` if a node exists at `path`.
    #[must_use]
    pub fn exists(&self, path: impl AsRef<str>) -> bool {
        self.get(path).is_some()
    }

    /// Returns `true` if a file exists at `path`.
    #[must_use]
    pub fn is_file(&self, path: impl AsRef<str>) -> bool {
        self.get(path).is_some_and(FileNode::is_file)
    }

    /// Returns `true` if a directory exists at `path`.
    #[must_use]
    pub fn is_dir(&self, path: impl AsRef<str>) -> bool {
        self.get(path).is_some_and(FileNode::is_dir)
    }

    /// Iterates all files and their content in path order.
    pub fn files(&self) -> impl Iterator<Item = (&FilePath, &str)> {
        self.nodes
            .iter()
            .filter_map(|(path, node)| node.content().map(|content| (path, content)))
    }

    /// Iterates every node except the root in path order.
    pub fn walk(&self) -> impl Iterator<Item = &FileNode> {
        self.nodes.values().filter(|node| !node.path().is_root())
    }

    /// Number of files in the tree.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.nodes.values().filter(|node| node.is_file()).count()
    }

    /// Returns `true` if the tree holds nothing but the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Removes everything except the root.
    pub fn clear(&mut self) {
        self.nodes.retain(|path, _| path.is_root());
        self.emit(FilePath::root(), ChangeKind::Reset, NodeType::Directory);
    }

    /// Replaces every node with those of `other`, keeping this tree's
    /// listeners.
    pub(crate) fn replace_nodes(&mut self, other: Self) {
        self.nodes = other.nodes;
        self.emit(FilePath::root(), ChangeKind::Reset, NodeType::Directory);
    }

    /// Inserts a node without checks or events. Callers guarantee the
    /// parent exists.
    pub(crate) fn insert_unchecked(&mut self, node: FileNode) {
        self.nodes.insert(node.path().clone(), node);
    }

    fn subtree<'a>(
        &'a self,
        dir: &FilePath,
    ) -> impl Iterator<Item = (&'a FilePath, &'a FileNode)> + use<'a> {
        let prefix = if dir.is_root() {
            "/".to_string()
        } else {
            format!("{dir}/")
        };
        self.nodes
            .range::<str, _>((Bound::Excluded(prefix.as_str()), Bound::Unbounded))
            .take_while(move |(key, _)| key.as_str().starts_with(prefix.as_str()))
    }

    fn descendant_paths(&self, dir: &FilePath) -> Vec<FilePath> {
        self.subtree(dir).map(|(key, _)| key.clone()).collect()
    }

    fn check_ancestors(&self, path: &FilePath) -> Result<()> {
        for ancestor in path.ancestors() {
            if self.nodes.get(&ancestor).is_some_and(FileNode::is_file) {
                return Err(conflict(
                    path,
                    &format!("ancestor {ancestor} is a file"),
                ));
            }
        }
        Ok(())
    }

    fn create_ancestors(&mut self, path: &FilePath) {
        for ancestor in path.ancestors() {
            self.nodes
                .entry(ancestor.clone())
                .or_insert_with(|| FileNode::directory(ancestor));
        }
    }

    fn emit(&self, path: FilePath, kind: ChangeKind, node_type: NodeType) {
        if self.listeners.is_empty() {
            return;
        }
        let event = ChangeEvent {
            path,
            kind,
            node_type,
        };
        for listener in &self.listeners {
            listener.on_change(&event);
        }
    }
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VirtualFileSystem {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            listeners: Vec::new(),
        }
    }
}

impl PartialEq for VirtualFileSystem {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for VirtualFileSystem {}

fn not_found(path: &FilePath) -> Error {
    Error::NotFound {
        path: path.to_string(),
    }
}

fn conflict(path: &FilePath, reason: &str) -> Error {
    Error::Conflict {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
