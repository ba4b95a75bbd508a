//! `uigen pack`: turns a directory into a project file.

use super::common::{count_nodes, write_project};
use crate::formatters::format_output;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;
use uigen_core::cli::{ExitCode, OutputFormat};
use uigen_files::VirtualFileSystem;

/// What was packed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PackReport {
    /// Directory that was read
    pub source: String,
    /// Project file written, if any
    pub output: Option<String>,
    /// Number of files in the tree
    pub files: usize,
    /// Number of directories in the tree
    pub directories: usize,
}

/// Loads `dir` into a tree and reports its size.
pub fn pack(dir: &Path) -> Result<(VirtualFileSystem, PackReport)> {
    let vfs = VirtualFileSystem::load_directory(dir)
        .with_context(|| format!("failed to load {}", dir.display()))?;
    let (files, directories) = count_nodes(&vfs);
    let report = PackReport {
        source: dir.display().to_string(),
        output: None,
        files,
        directories,
    };
    Ok((vfs, report))
}

/// Runs the pack command.
///
/// Without `output` the project JSON is printed to stdout.
pub fn run(dir: &Path, output: Option<&Path>, format: OutputFormat) -> Result<ExitCode> {
    let (vfs, mut report) = pack(dir)?;

    let Some(output) = output else {
        println!("{}", vfs.serialize().to_json()?);
        return Ok(ExitCode::SUCCESS);
    };

    write_project(output, &vfs)?;
    report.output = Some(output.display().to_string());
    info!(files = report.files, output = %output.display(), "packed project");
    println!("{}", format_output(&report, format)?);
    Ok(ExitCode::SUCCESS)
}
