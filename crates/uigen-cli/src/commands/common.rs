//! Project file helpers shared across commands.
//!
//! A project file is a [`SerializedTree`] encoded as JSON.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use uigen_files::{SerializedTree, VirtualFileSystem};

/// Reads a project file.
pub fn read_project(path: &Path) -> Result<SerializedTree> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read project {}", path.display()))?;
    SerializedTree::from_json(&json)
        .with_context(|| format!("invalid project file {}", path.display()))
}

/// Reads a project file into a tree.
pub fn load_project(path: &Path) -> Result<VirtualFileSystem> {
    let tree = read_project(path)?;
    VirtualFileSystem::from_serialized(&tree)
        .with_context(|| format!("invalid project file {}", path.display()))
}

/// Writes a tree as a project file.
pub fn write_project(path: &Path, vfs: &VirtualFileSystem) -> Result<()> {
    let json = vfs.serialize().to_json()?;
    write_text(path, &json)
}

/// Writes text to `path`, creating parent directories.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

/// Counts `(files, directories)` in a tree.
#[must_use]
pub fn count_nodes(vfs: &VirtualFileSystem) -> (usize, usize) {
    vfs.walk().fold((0, 0), |(files, dirs), node| {
        if node.is_file() {
            (files + 1, dirs)
        } else {
            (files, dirs + 1)
        }
    })
}
