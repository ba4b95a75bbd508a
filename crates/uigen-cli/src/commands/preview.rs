//! `uigen preview`: builds a project and renders its host document.
//!
//! By default every module is inlined as a `data:` URL, so the document is
//! self-contained. With `--blob-origin` modules get `blob:` locators
//! instead, and a `<output>.modules.json` manifest maps each locator to its
//! code for a host that serves them.

use super::common::{read_project, write_text};
use crate::formatters::format_output;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uigen_core::PreviewConfig;
use uigen_core::cli::{ExitCode, OutputFormat};
use uigen_core::traits::EphemeralStore;
use uigen_files::SerializedTree;
use uigen_preview::{InlineStore, MemoryStore, PreviewBundle, PreviewSession};

/// Summary of a preview build.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PreviewReport {
    /// `ready`, `degraded`, or the diagnostic reason
    pub status: String,
    /// Resolved entry file
    pub entry: Option<String>,
    /// Reachable modules
    pub modules: usize,
    /// Tree stylesheets folded into the document
    pub stylesheets: usize,
    /// Problems shown in the error overlay
    pub errors: Vec<String>,
    /// Host document path, if written to a file
    pub output: Option<String>,
    /// Module manifest path, for `blob:` builds
    pub manifest: Option<String>,
}

impl PreviewReport {
    fn from_bundle(bundle: &PreviewBundle) -> Self {
        Self {
            status: bundle.status.to_string(),
            entry: bundle.entry.as_ref().map(ToString::to_string),
            modules: bundle.modules.len(),
            stylesheets: bundle.stylesheets.len(),
            errors: bundle.errors.iter().map(ToString::to_string).collect(),
            output: None,
            manifest: None,
        }
    }
}

/// A finished build.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Build summary
    pub report: PreviewReport,
    /// Host document HTML
    pub document: String,
    /// `true` if only a diagnostic could be rendered
    pub diagnostic: bool,
    /// Locator to code, for stores that do not inline
    pub modules: BTreeMap<String, String>,
}

/// Builds `tree` once with `store` and renders the document.
pub fn render<S: EphemeralStore>(
    config: PreviewConfig,
    store: S,
    tree: &SerializedTree,
) -> Result<(Rendered, PreviewSession<S>)> {
    let mut session = PreviewSession::from_serialized(config, store, tree)?;
    let bundle = session.build_now()?;
    let report = PreviewReport::from_bundle(bundle);
    let diagnostic = bundle.is_diagnostic();

    let document = session
        .document()?
        .context("preview produced no bundle")?;

    let rendered = Rendered {
        report,
        document,
        diagnostic,
        modules: BTreeMap::new(),
    };
    Ok((rendered, session))
}

/// Builds with a [`MemoryStore`] and collects its module manifest.
pub fn render_blobs(
    config: PreviewConfig,
    origin: &str,
    tree: &SerializedTree,
) -> Result<Rendered> {
    let (mut rendered, session) = render(config, MemoryStore::new(origin), tree)?;
    rendered.modules = session
        .store()
        .iter()
        .map(|(reference, code)| (reference.to_string(), code.to_string()))
        .collect();
    Ok(rendered)
}

/// Path of the module manifest written next to `output`.
#[must_use]
pub fn manifest_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".modules.json");
    output.with_file_name(name)
}

/// Runs the preview command.
///
/// Without `output` the document is printed to stdout.
pub fn run(
    project: &Path,
    output: Option<&Path>,
    blob_origin: Option<&str>,
    config: PreviewConfig,
    format: OutputFormat,
) -> Result<ExitCode> {
    let tree = read_project(project)?;

    let mut rendered = match blob_origin {
        Some(origin) => render_blobs(config, origin, &tree)?,
        None => render(config, InlineStore::new(), &tree)?.0,
    };

    for error in &rendered.report.errors {
        warn!("{error}");
    }
    info!(
        status = %rendered.report.status,
        modules = rendered.report.modules,
        "preview built"
    );

    match output {
        Some(path) => {
            write_text(path, &rendered.document)?;
            rendered.report.output = Some(path.display().to_string());

            if !rendered.modules.is_empty() {
                let manifest = manifest_path(path);
                write_text(&manifest, &serde_json::to_string_pretty(&rendered.modules)?)?;
                rendered.report.manifest = Some(manifest.display().to_string());
            }

            println!("{}", format_output(&rendered.report, format)?);
        }
        None => println!("{}", rendered.document),
    }

    if rendered.diagnostic {
        Ok(ExitCode::DIAGNOSTIC)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
