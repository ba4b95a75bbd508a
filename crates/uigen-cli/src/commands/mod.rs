//! Command implementations for the `uigen` CLI.
//!
//! Each command does its work through the library crates, builds a
//! serializable report, and returns the process exit code.

pub mod apply;
pub mod common;
pub mod pack;
pub mod preview;
pub mod unpack;
