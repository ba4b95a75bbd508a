//! Preview assembly for UIGen.
//!
//! Turns a virtual file tree into one self-contained, runnable preview:
//!
//! - the import graph is walked from the entry point, transforming only
//!   what is reachable ([`assemble`])
//! - every reachable module is published through an
//!   [`EphemeralStore`](uigen_core::traits::EphemeralStore) and mapped in a
//!   browser [`ImportMap`], next to CDN URLs for package imports
//! - stylesheets are concatenated into the host document
//! - broken modules are stubbed and reported instead of failing the build
//!   ([`PreviewBundle`], [`BuildStatus`])
//! - [`PreviewSession`] keeps a preview current as the tree is edited
//!
//! # Quick Start
//!
//! ```
//! use uigen_core::PreviewConfig;
//! use uigen_files::FilesBuilder;
//! use uigen_preview::{InlineStore, PreviewSession};
//!
//! let vfs = FilesBuilder::new()
//!     .add_file("/App.jsx", "import './styles.css';\nexport default () => <h1>Hello</h1>;")
//!     .add_file("/styles.css", "h1 { color: teal; }")
//!     .build()
//!     .unwrap();
//!
//! let mut session =
//!     PreviewSession::with_tree(PreviewConfig::default(), InlineStore::new(), vfs).unwrap();
//! let bundle = session.build_now().unwrap();
//! assert!(bundle.is_ready());
//! assert!(bundle.import_map.contains("/App"));
//! assert!(bundle.styles.contains("color: teal"));
//!
//! let html = session.document().unwrap().unwrap();
//! assert!(html.contains("h1 { color: teal; }"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod assemble;
mod bundle;
mod debounce;
mod document;
mod import_map;
mod session;
mod store;

pub use assemble::{STUB_MODULE, assemble, resolve_module};
pub use bundle::{
    BuildStatus, DiagnosticReason, ModuleEntry, PreviewBundle, PreviewError, PreviewErrorKind,
};
pub use debounce::Debouncer;
pub use document::{DocumentRenderer, render_document};
pub use import_map::{
    ImportMap, PackageSpecifier, RUNTIME_SPECIFIERS, cdn_stylesheet_url, cdn_url,
};
pub use session::PreviewSession;
pub use store::{InlineStore, MemoryStore};
