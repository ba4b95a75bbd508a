//! UIGen CLI library.
//!
//! Exposes the command implementations, output formatters, and settings
//! loader behind the `uigen` binary so they can be tested directly.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::format_push_string)]

pub mod commands;
pub mod formatters;
pub mod settings;
