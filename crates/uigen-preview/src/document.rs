//! Host document rendering.
//!
//! The host document is a standalone HTML page: the import map, the
//! aggregated styles, an error overlay pre-filled with build problems, and
//! a module script that loads the entry point inside a React error
//! boundary. Load failures and render failures are reported separately.

use crate::bundle::{BuildStatus, PreviewBundle, PreviewError, PreviewErrorKind};
use handlebars::Handlebars;
use serde::Serialize;
use uigen_core::{Error, PreviewConfig, Result};

const HOST_TEMPLATE: &str = "host";

/// Renders [`PreviewBundle`]s into host documents.
///
/// # Examples
///
/// ```
/// use uigen_core::PreviewConfig;
/// use uigen_files::FilesBuilder;
/// use uigen_preview::{DocumentRenderer, InlineStore, PreviewSession};
///
/// let vfs = FilesBuilder::new()
///     .add_file("/App.jsx", "export default () => <h1>Hello</h1>;")
///     .build()
///     .unwrap();
/// let mut session =
///     PreviewSession::with_tree(PreviewConfig::default(), InlineStore::new(), vfs).unwrap();
/// let bundle = session.build_now().unwrap().clone();
///
/// let html = DocumentRenderer::new()
///     .unwrap()
///     .render(&bundle, session.config())
///     .unwrap();
/// assert!(html.contains(r#"<script type="importmap">"#));
/// ```
#[derive(Debug)]
pub struct DocumentRenderer {
    handlebars: Handlebars<'static>,
}

impl DocumentRenderer {
    /// Creates a renderer with the built-in host template.
    ///
    /// # Errors
    ///
    /// Returns `Error::Template` if the template fails to parse.
    pub fn new() -> Result<Self> {
        Self::with_template(include_str!("../templates/host.html.hbs"))
    }

    /// Creates a renderer with a custom host template.
    ///
    /// The template sees the same context as the built-in one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Template` if the template fails to parse.
    pub fn with_template(template: &str) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string(HOST_TEMPLATE, template)
            .map_err(|e| Error::Template {
                message: format!("Failed to register host template: {e}"),
            })?;
        Ok(Self { handlebars })
    }

    /// Renders the host document for `bundle`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Template` if rendering fails, or
    /// `Error::Serialization` if the import map cannot be encoded.
    pub fn render(&self, bundle: &PreviewBundle, config: &PreviewConfig) -> Result<String> {
        let diagnostic = match bundle.status {
            BuildStatus::Diagnostic(reason) => {
                format!("Nothing to render: {reason} (expected {})", config.entry_point)
            }
            _ => String::new(),
        };

        let context = HostContext {
            title: "UIGen Preview",
            status: bundle.status.to_string(),
            built_at: bundle.built_at.to_rfc3339(),
            import_map: escape_json(&bundle.import_map.to_json()?),
            styles: escape_style(&bundle.styles),
            external_stylesheets: &bundle.external_stylesheets,
            tailwind: config.tailwind,
            renders: bundle.status.renders(),
            entry_specifier: escape_json(&serde_json::to_string(&bundle.entry_specifier)?),
            has_errors: !bundle.errors.is_empty(),
            diagnostic,
            errors: bundle.errors.iter().map(ErrorView::from).collect(),
        };

        self.handlebars
            .render(HOST_TEMPLATE, &context)
            .map_err(|e| Error::Template {
                message: format!("Host document rendering failed: {e}"),
            })
    }
}

/// Renders the host document for `bundle` with the built-in template.
///
/// # Errors
///
/// Returns `Error::Template` if rendering fails.
pub fn render_document(bundle: &PreviewBundle, config: &PreviewConfig) -> Result<String> {
    DocumentRenderer::new()?.render(bundle, config)
}

#[derive(Debug, Serialize)]
struct HostContext<'a> {
    title: &'a str,
    status: String,
    built_at: String,
    import_map: String,
    styles: String,
    external_stylesheets: &'a [String],
    tailwind: bool,
    renders: bool,
    entry_specifier: String,
    has_errors: bool,
    diagnostic: String,
    errors: Vec<ErrorView<'a>>,
}

#[derive(Debug, Serialize)]
struct ErrorView<'a> {
    kind: &'static str,
    path: &'a str,
    position: String,
    message: &'a str,
}

impl<'a> From<&'a PreviewError> for ErrorView<'a> {
    fn from(error: &'a PreviewError) -> Self {
        let kind = match error.kind {
            PreviewErrorKind::Syntax => "syntax",
            PreviewErrorKind::UnresolvedImport => "unresolved_import",
            PreviewErrorKind::MissingStylesheet => "missing_stylesheet",
            PreviewErrorKind::InvalidJson => "invalid_json",
            PreviewErrorKind::MissingEntryPoint => "missing_entry_point",
        };
        Self {
            kind,
            path: &error.path,
            position: error.location.map(|loc| loc.to_string()).unwrap_or_default(),
            message: &error.message,
        }
    }
}

/// Keeps embedded CSS from closing its `<style>` element.
fn escape_style(text: &str) -> String {
    text.replace("</", "<\\/")
}

/// Keeps embedded JSON from closing its `<script>` element. The result
/// still parses to the same value.
fn escape_json(text: &str) -> String {
    text.replace('<', "\\u003c")
}
