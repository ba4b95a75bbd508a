//! In-memory virtual file tree for UIGen previews.
//!
//! The tree holds the source files of one generated component project.
//! It is path-addressed, never touches disk during normal operation, and
//! reports every mutation to subscribed listeners so the preview pipeline
//! can decide when to rebuild.
//!
//! # Features
//!
//! - Normalized paths ([`FilePath`])
//! - File and directory CRUD with auto-created ancestors
//!   ([`VirtualFileSystem`])
//! - Change notification ([`ChangeListener`], [`ChangeRecorder`])
//! - Lossless flat serialization ([`SerializedTree`])
//! - The agent edit protocol ([`ToolCall`], [`EditorCommand`],
//!   [`FileManagerCommand`])
//! - Directory import and export for tooling ([`ExportOptions`])
//!
//! # Quick Start
//!
//! ```
//! use uigen_files::{EditorCommand, FilesBuilder};
//!
//! let mut vfs = FilesBuilder::new()
//!     .add_file("/App.jsx", "export default function App() {\n  return <p>Hi</p>;\n}")
//!     .build()
//!     .unwrap();
//!
//! EditorCommand::StrReplace {
//!     path: "/App.jsx".to_string(),
//!     old_str: "Hi".to_string(),
//!     new_str: "Hello".to_string(),
//! }
//! .apply(&mut vfs)
//! .unwrap();
//!
//! assert!(vfs.read("/App.jsx").unwrap().contains("Hello"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod builder;
mod disk;
mod events;
mod node;
mod path;
mod serialize;
mod vfs;

pub mod edit;

pub use builder::FilesBuilder;
pub use disk::ExportOptions;
pub use edit::{EditOutcome, EditorCommand, FileManagerCommand, ToolCall};
pub use events::{ChangeEvent, ChangeKind, ChangeListener, ChangeRecorder};
pub use node::{FileNode, NodeKind, NodeType};
pub use path::FilePath;
pub use serialize::{SerializedNode, SerializedTree};
pub use vfs::VirtualFileSystem;
