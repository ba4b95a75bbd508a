//! Core types, configuration, and errors for the UIGen preview pipeline.
//!
//! This crate provides the foundational pieces shared by the virtual file
//! tree, the transform engine, preview assembly, and the CLI.
//!
//! # Architecture
//!
//! - Error hierarchy with contextual information ([`Error`])
//! - Per-file transform diagnostics ([`SyntaxError`], [`Location`])
//! - Pipeline configuration ([`PreviewConfig`])
//! - The [`traits::EphemeralStore`] seam to the host runtime

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod diagnostic;
mod error;
mod types;

pub mod cli;
pub mod traits;

pub use config::{PreviewConfig, PreviewConfigBuilder};
pub use diagnostic::{Location, SyntaxError};
pub use error::{Error, Result};
pub use types::EphemeralRef;
