//! `uigen unpack`: writes a project file out as a directory.

use super::common::{count_nodes, load_project};
use crate::formatters::format_output;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use uigen_core::cli::{ExitCode, OutputFormat};
use uigen_files::ExportOptions;

/// What was unpacked.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UnpackReport {
    /// Project file that was read
    pub project: String,
    /// Directory written to
    pub target: String,
    /// Number of files in the tree
    pub files: usize,
    /// Number of directories in the tree
    pub directories: usize,
    /// Whether existing files were replaced
    pub overwrite: bool,
}

/// Runs the unpack command.
pub fn run(project: &Path, dir: &Path, overwrite: bool, format: OutputFormat) -> Result<ExitCode> {
    let vfs = load_project(project)?;
    let options = ExportOptions::new().with_overwrite(overwrite);
    vfs.export_to_directory(dir, &options)
        .with_context(|| format!("failed to write {}", dir.display()))?;

    let (files, directories) = count_nodes(&vfs);
    let report = UnpackReport {
        project: project.display().to_string(),
        target: dir.display().to_string(),
        files,
        directories,
        overwrite,
    };
    println!("{}", format_output(&report, format)?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::write_project;
    use std::fs;
    use tempfile::TempDir;
    use uigen_files::FilesBuilder;

    fn project(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("project.json");
        let vfs = FilesBuilder::new()
            .add_file("/App.jsx", "new")
            .add_dir("/public")
            .build()
            .unwrap();
        write_project(&path, &vfs).unwrap();
        path
    }

    #[test]
    fn test_unpack_writes_files_and_empty_dirs() {
        let dir = TempDir::new().unwrap();
        let project = project(dir.path());
        let out = dir.path().join("out");

        run(&project, &out, true, OutputFormat::Text).unwrap();
        assert_eq!(fs::read_to_string(out.join("App.jsx")).unwrap(), "new");
        assert!(out.join("public").is_dir());
    }

    #[test]
    fn test_unpack_without_overwrite_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let project = project(dir.path());
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("App.jsx"), "old").unwrap();

        run(&project, &out, false, OutputFormat::Text).unwrap();
        assert_eq!(fs::read_to_string(out.join("App.jsx")).unwrap(), "old");
    }
}
