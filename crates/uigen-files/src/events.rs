//! Change notification for the virtual tree.
//!
//! Every successful mutation emits exactly one [`ChangeEvent`] to each
//! subscribed [`ChangeListener`]. Failed operations emit nothing, so a
//! listener never sees a change that did not happen.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use uigen_files::{ChangeKind, ChangeRecorder, VirtualFileSystem};
//!
//! let recorder = Arc::new(ChangeRecorder::new());
//! let mut vfs = VirtualFileSystem::new();
//! vfs.subscribe(recorder.clone());
//!
//! vfs.create_file("/App.jsx", "export default () => null;").unwrap();
//! vfs.update("/App.jsx", "export default () => 1;").unwrap();
//!
//! let events = recorder.drain();
//! assert_eq!(events.len(), 2);
//! assert_eq!(events[0].kind, ChangeKind::Created);
//! assert_eq!(events[1].kind, ChangeKind::Updated);
//! ```

use crate::node::NodeType;
use crate::path::FilePath;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

/// What happened at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// A node was created
    Created,
    /// A file's content was replaced
    Updated,
    /// A node and its subtree were removed
    Deleted,
    /// A node and its subtree moved here from `from`
    Renamed {
        /// The previous path
        from: FilePath,
    },
    /// The whole tree was replaced or cleared
    Reset,
}

/// A single tree mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The affected path; the destination for renames, `/` for resets
    pub path: FilePath,
    /// The kind of change
    pub kind: ChangeKind,
    /// The type of the affected node
    pub node_type: NodeType,
}

impl ChangeEvent {
    /// Returns every path this event touches.
    ///
    /// A rename touches both its source and its destination.
    #[must_use]
    pub fn touched_paths(&self) -> Vec<&FilePath> {
        match &self.kind {
            ChangeKind::Renamed { from } => vec![from, &self.path],
            _ => vec![&self.path],
        }
    }

    /// Returns `true` if this event affects `path`, directly or through a
    /// directory that contains it.
    #[must_use]
    pub fn affects(&self, path: &FilePath) -> bool {
        if self.kind == ChangeKind::Reset {
            return true;
        }
        self.touched_paths()
            .into_iter()
            .any(|touched| path.is_within(touched))
    }
}

/// Observer of tree mutations.
pub trait ChangeListener: Debug + Send + Sync {
    /// Called after a mutation has been applied.
    fn on_change(&self, event: &ChangeEvent);
}

/// A listener that buffers events until they are drained.
#[derive(Debug, Default)]
pub struct ChangeRecorder {
    events: Mutex<Vec<ChangeEvent>>,
}

impl ChangeRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all buffered events, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<ChangeEvent> {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *events)
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no events are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChangeListener for ChangeRecorder {
    fn on_change(&self, event: &ChangeEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> FilePath {
        FilePath::new(p).unwrap()
    }

    #[test]
    fn test_affects_descendants_of_deleted_directory() {
        let event = ChangeEvent {
            path: path("/components"),
            kind: ChangeKind::Deleted,
            node_type: NodeType::Directory,
        };
        assert!(event.affects(&path("/components/Button.jsx")));
        assert!(!event.affects(&path("/App.jsx")));
    }

    #[test]
    fn test_rename_affects_both_ends() {
        let event = ChangeEvent {
            path: path("/b.jsx"),
            kind: ChangeKind::Renamed { from: path("/a.jsx") },
            node_type: NodeType::File,
        };
        assert!(event.affects(&path("/a.jsx")));
        assert!(event.affects(&path("/b.jsx")));
        assert!(!event.affects(&path("/c.jsx")));
    }

    #[test]
    fn test_reset_affects_everything() {
        let event = ChangeEvent {
            path: FilePath::root(),
            kind: ChangeKind::Reset,
            node_type: NodeType::Directory,
        };
        assert!(event.affects(&path("/anything.jsx")));
    }

    #[test]
    fn test_recorder_drains_in_order() {
        let recorder = ChangeRecorder::new();
        for name in ["/a", "/b"] {
            recorder.on_change(&ChangeEvent {
                path: path(name),
                kind: ChangeKind::Created,
                node_type: NodeType::File,
            });
        }
        assert_eq!(recorder.len(), 2);
        let drained = recorder.drain();
        assert_eq!(drained[0].path.as_str(), "/a");
        assert!(recorder.is_empty());
    }
}
