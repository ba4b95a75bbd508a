//! The result of one preview build.

use crate::import_map::ImportMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uigen_core::{EphemeralRef, Location, SyntaxError};
use uigen_files::{ChangeEvent, FilePath};

/// Why a build produced only a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticReason {
    /// No file satisfies the configured entry point
    MissingEntryPoint,
    /// The entry point exists but failed to transform
    EntryPointFailed,
}

impl DiagnosticReason {
    /// Returns a short human-readable description.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingEntryPoint => "entry point missing",
            Self::EntryPointFailed => "entry point failed to transform",
        }
    }
}

impl fmt::Display for DiagnosticReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall state of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum BuildStatus {
    /// Every reachable module loaded without errors
    Ready,
    /// The preview renders, with some modules stubbed out
    Degraded,
    /// Nothing renders; the document only reports the reason
    Diagnostic(DiagnosticReason),
}

impl BuildStatus {
    /// Returns `true` if the entry point will be loaded.
    #[must_use]
    pub const fn renders(&self) -> bool {
        !matches!(self, Self::Diagnostic(_))
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::Degraded => f.write_str("degraded"),
            Self::Diagnostic(reason) => write!(f, "diagnostic: {reason}"),
        }
    }
}

/// Category of a build-time problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewErrorKind {
    /// A file failed to transform
    Syntax,
    /// A local import matches no file
    UnresolvedImport,
    /// An imported stylesheet does not exist
    MissingStylesheet,
    /// A `.json` module is not valid JSON
    InvalidJson,
    /// No entry point file exists
    MissingEntryPoint,
}

/// A problem shown in the preview's error overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewError {
    /// What went wrong
    pub kind: PreviewErrorKind,
    /// File the problem belongs to
    pub path: String,
    /// Human-readable description
    pub message: String,
    /// Position in the file, when known
    pub location: Option<Location>,
}

impl PreviewError {
    /// Creates an error without a location.
    #[must_use]
    pub fn new(kind: PreviewErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
            location: None,
        }
    }
}

impl From<SyntaxError> for PreviewError {
    fn from(err: SyntaxError) -> Self {
        Self {
            kind: PreviewErrorKind::Syntax,
            path: err.path,
            message: err.message,
            location: err.location,
        }
    }
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{}:{}: {}", self.path, loc, self.message),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}

/// A reachable module and the reference it was published under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleEntry {
    /// Locator written into the import map
    pub reference: EphemeralRef,
    /// `true` when the module failed and a placeholder was published
    pub stub: bool,
}

/// Everything needed to render one preview.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewBundle {
    /// Overall state
    pub status: BuildStatus,
    /// Resolved entry file, if any
    pub entry: Option<FilePath>,
    /// Specifier the host document imports to start the preview
    pub entry_specifier: String,
    /// Specifier to URL map for the host document
    pub import_map: ImportMap,
    /// Concatenated text of every reachable tree stylesheet
    pub styles: String,
    /// Tree stylesheets in the order their text appears in `styles`
    pub stylesheets: Vec<FilePath>,
    /// Stylesheet URLs loaded with `<link>` elements
    pub external_stylesheets: Vec<String>,
    /// Problems found while building
    pub errors: Vec<PreviewError>,
    /// Every module reachable from the entry point
    pub modules: BTreeMap<FilePath, ModuleEntry>,
    /// Paths whose creation would change the result
    pub watched: BTreeSet<FilePath>,
    /// References minted for this build, released when it is superseded
    pub references: Vec<EphemeralRef>,
    /// Build time
    pub built_at: DateTime<Utc>,
}

impl PreviewBundle {
    /// Returns `true` if the build has no errors.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.status, BuildStatus::Ready)
    }

    /// Returns `true` if the build only carries a diagnostic.
    #[must_use]
    pub const fn is_diagnostic(&self) -> bool {
        matches!(self.status, BuildStatus::Diagnostic(_))
    }

    /// Returns `true` if `path` is a reachable module.
    #[must_use]
    pub fn is_reachable(&self, path: &FilePath) -> bool {
        self.modules.contains_key(path)
    }

    /// Returns the reference of a reachable module.
    #[must_use]
    pub fn reference(&self, path: &FilePath) -> Option<&EphemeralRef> {
        self.modules.get(path).map(|entry| &entry.reference)
    }

    /// Iterates over every path this build depends on: reachable modules,
    /// their stylesheets and watched paths.
    pub fn dependencies(&self) -> impl Iterator<Item = &FilePath> {
        self.modules
            .keys()
            .chain(&self.stylesheets)
            .chain(&self.watched)
    }

    /// Returns `true` if `event` could change the result of the next build.
    #[must_use]
    pub fn is_affected_by(&self, event: &ChangeEvent) -> bool {
        self.dependencies().any(|path| event.affects(path))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use uigen_files::{ChangeKind, NodeType};

    pub(crate) fn empty_bundle() -> PreviewBundle {
        PreviewBundle {
            status: BuildStatus::Ready,
            entry: None,
            entry_specifier: "/App".to_string(),
            import_map: ImportMap::new(),
            styles: String::new(),
            stylesheets: Vec::new(),
            external_stylesheets: Vec::new(),
            errors: Vec::new(),
            modules: BTreeMap::new(),
            watched: BTreeSet::new(),
            references: Vec::new(),
            built_at: Utc::now(),
        }
    }

    fn path(p: &str) -> FilePath {
        FilePath::new(p).unwrap()
    }

    fn event(p: &str, kind: ChangeKind, node_type: NodeType) -> ChangeEvent {
        ChangeEvent {
            path: path(p),
            kind,
            node_type,
        }
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(BuildStatus::Ready).unwrap();
        assert_eq!(json["status"], "ready");

        let json = serde_json::to_value(BuildStatus::Diagnostic(
            DiagnosticReason::MissingEntryPoint,
        ))
        .unwrap();
        assert_eq!(json["status"], "diagnostic");
        assert_eq!(json["reason"], "missing_entry_point");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            BuildStatus::Diagnostic(DiagnosticReason::MissingEntryPoint).to_string(),
            "diagnostic: entry point missing"
        );
        assert!(!BuildStatus::Diagnostic(DiagnosticReason::EntryPointFailed).renders());
        assert!(BuildStatus::Degraded.renders());
    }

    #[test]
    fn test_preview_error_from_syntax_error() {
        let err: PreviewError = SyntaxError::new("/App.jsx", "Unterminated JSX tag")
            .with_location(Location::new(2, 9))
            .into();
        assert_eq!(err.kind, PreviewErrorKind::Syntax);
        assert_eq!(err.to_string(), "/App.jsx:2:9: Unterminated JSX tag");
    }

    #[test]
    fn test_affected_by_reachable_module_only() {
        let mut bundle = empty_bundle();
        bundle.modules.insert(
            path("/components/Button.jsx"),
            ModuleEntry {
                reference: EphemeralRef::new("blob:x/1"),
                stub: false,
            },
        );
        bundle.watched.insert(path("/components/Nav.jsx"));

        let touched = event("/components/Button.jsx", ChangeKind::Updated, NodeType::File);
        assert!(bundle.is_affected_by(&touched));

        let unrelated = event("/notes.md", ChangeKind::Created, NodeType::File);
        assert!(!bundle.is_affected_by(&unrelated));

        let watched = event("/components/Nav.jsx", ChangeKind::Created, NodeType::File);
        assert!(bundle.is_affected_by(&watched));

        let parent = event("/components", ChangeKind::Deleted, NodeType::Directory);
        assert!(bundle.is_affected_by(&parent));

        let reset = event("/", ChangeKind::Reset, NodeType::Directory);
        assert!(bundle.is_affected_by(&reset));
    }
}
