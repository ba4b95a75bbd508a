//! Per-file code transform for UIGen previews.
//!
//! Turns component sources that embed JSX markup into plain ES modules a
//! browser can import directly:
//!
//! - JSX is lowered to calls into the automatic React runtime
//! - type-only TypeScript constructs are removed
//! - local imports (relative or through the alias prefix) are rewritten to
//!   absolute tree paths
//! - stylesheet imports are pulled out of the code and reported
//!
//! Each file is transformed on its own. A syntax error is returned as a
//! [`SyntaxError`](uigen_core::SyntaxError) value naming that file, and
//! results are cached by path and content hash.
//!
//! # Quick Start
//!
//! ```
//! use uigen_core::PreviewConfig;
//! use uigen_files::FilesBuilder;
//! use uigen_transform::TransformEngine;
//!
//! let vfs = FilesBuilder::new()
//!     .add_file("/App.jsx", "import Button from '@/Button';\nexport default () => <Button />;")
//!     .add_file("/Button.jsx", "export default () => <button>Go</button>;")
//!     .add_file("/Broken.jsx", "export default () => <div>;")
//!     .build()
//!     .unwrap();
//!
//! let mut engine = TransformEngine::new(&PreviewConfig::default()).unwrap();
//! let results = engine.transform_all(&vfs);
//!
//! assert_eq!(results.len(), 3);
//! assert!(results.values().filter(|r| r.is_ok()).count() == 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod cache;
mod engine;
mod imports;
mod jsx;
mod scanner;
mod typescript;

pub use cache::{CacheKey, CacheStats, TransformCache};
pub use engine::{TransformEngine, TransformResult, TransformedModule, transform_source};
pub use imports::{ImportTarget, ModuleImport, STYLE_PROXY, is_stylesheet};
pub use jsx::{RUNTIME_IMPORT, RUNTIME_MODULE};
pub use typescript::{is_typescript, strip_types};
