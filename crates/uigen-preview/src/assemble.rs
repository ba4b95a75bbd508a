//! Preview assembly: walk the import graph from the entry point, publish
//! every reachable module through an [`EphemeralStore`], and map
//! specifiers to the published references.
//!
//! Only files reachable from the entry point are read or transformed.
//! Modules that fail are replaced by a stub that renders nothing, so the
//! rest of the preview still loads.

use crate::bundle::{
    BuildStatus, DiagnosticReason, ModuleEntry, PreviewBundle, PreviewError, PreviewErrorKind,
};
use crate::import_map::{ImportMap, RUNTIME_SPECIFIERS, cdn_stylesheet_url, cdn_url};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use uigen_core::traits::EphemeralStore;
use uigen_core::{EphemeralRef, Error, Location, PreviewConfig, Result};
use uigen_files::{FilePath, VirtualFileSystem};
use uigen_transform::{ImportTarget, TransformEngine, is_stylesheet};

/// Source published in place of a module that failed to load.
pub const STUB_MODULE: &str = "export default function Unavailable() {\n  return null;\n}\n";

/// Resolves an absolute module specifier to a file in `vfs`.
///
/// Tries the path itself, then each configured extension, then an `index`
/// file inside the path. Stylesheets never resolve as modules.
///
/// # Examples
///
/// ```
/// use uigen_core::PreviewConfig;
/// use uigen_files::FilesBuilder;
/// use uigen_preview::resolve_module;
///
/// let vfs = FilesBuilder::new()
///     .add_file("/components/Button.jsx", "")
///     .add_file("/hooks/index.ts", "")
///     .build()
///     .unwrap();
/// let config = PreviewConfig::default();
///
/// let button = resolve_module(&vfs, &config, "/components/Button").unwrap();
/// assert_eq!(button.as_str(), "/components/Button.jsx");
/// let hooks = resolve_module(&vfs, &config, "/hooks").unwrap();
/// assert_eq!(hooks.as_str(), "/hooks/index.ts");
/// ```
#[must_use]
pub fn resolve_module(
    vfs: &VirtualFileSystem,
    config: &PreviewConfig,
    specifier: &str,
) -> Option<FilePath> {
    config
        .module_candidates(specifier)
        .into_iter()
        .filter_map(|candidate| FilePath::new(candidate).ok())
        .find(|candidate| vfs.is_file(candidate) && !is_stylesheet(candidate.as_str()))
}

fn candidate_paths(config: &PreviewConfig, specifier: &str) -> impl Iterator<Item = FilePath> {
    config
        .module_candidates(specifier)
        .into_iter()
        .filter_map(|candidate| FilePath::new(candidate).ok())
}

/// Lists the candidates ranked ahead of `chosen`: creating any of them
/// would change what `specifier` resolves to.
fn shadowing_candidates(
    candidates: impl IntoIterator<Item = String>,
    chosen: &FilePath,
) -> impl Iterator<Item = FilePath> {
    candidates
        .into_iter()
        .filter_map(|candidate| FilePath::new(candidate).ok())
        .take_while(move |candidate| candidate != chosen)
        .filter(|candidate| !is_stylesheet(candidate.as_str()))
}

/// Builds a preview of `vfs`.
///
/// Missing or broken files never make this fail: they are reported in the
/// bundle's error list and status.
///
/// # Errors
///
/// Returns an error only if `store` refuses to mint a reference. Any
/// references minted before the failure are released.
pub fn assemble<S: EphemeralStore>(
    vfs: &VirtualFileSystem,
    config: &PreviewConfig,
    engine: &mut TransformEngine,
    store: &mut S,
) -> Result<PreviewBundle> {
    let entry = config
        .entry_candidates()
        .into_iter()
        .filter_map(|candidate| FilePath::new(candidate).ok())
        .find(|candidate| {
            vfs.is_file(candidate)
                && !is_stylesheet(candidate.as_str())
                && candidate.extension() != Some("json")
        });

    let Some(entry) = entry else {
        tracing::warn!(expected = %config.entry_point, "entry point missing");
        return Ok(missing_entry(config));
    };

    let mut graph = Graph::new(vfs, config);
    graph
        .watched
        .extend(shadowing_candidates(config.entry_candidates(), &entry));
    graph.walk(engine, &entry);
    graph.publish(store, &entry)
}

fn missing_entry(config: &PreviewConfig) -> PreviewBundle {
    let message = Error::MissingEntryPoint {
        expected: config.entry_point.clone(),
    }
    .to_string();

    PreviewBundle {
        status: BuildStatus::Diagnostic(DiagnosticReason::MissingEntryPoint),
        entry: None,
        entry_specifier: config.entry_point.clone(),
        import_map: runtime_map(config),
        styles: String::new(),
        stylesheets: Vec::new(),
        external_stylesheets: Vec::new(),
        errors: vec![PreviewError::new(
            PreviewErrorKind::MissingEntryPoint,
            config.entry_point.clone(),
            message,
        )],
        modules: BTreeMap::new(),
        watched: candidate_paths(config, &config.entry_point).collect(),
        references: Vec::new(),
        built_at: Utc::now(),
    }
}

fn runtime_map(config: &PreviewConfig) -> ImportMap {
    let mut map = ImportMap::new();
    for specifier in RUNTIME_SPECIFIERS {
        map.insert(specifier, cdn_url(config, specifier));
    }
    map
}

/// A module's published source.
struct Compiled {
    code: String,
    stub: bool,
}

struct Graph<'a> {
    vfs: &'a VirtualFileSystem,
    config: &'a PreviewConfig,
    compiled: BTreeMap<FilePath, Compiled>,
    /// Rewritten local specifier and the file it resolved to
    edges: BTreeMap<String, Option<FilePath>>,
    bare: BTreeSet<String>,
    stylesheets: Vec<FilePath>,
    external_stylesheets: Vec<String>,
    errors: Vec<PreviewError>,
    watched: BTreeSet<FilePath>,
    entry_failed: bool,
}

impl<'a> Graph<'a> {
    fn new(vfs: &'a VirtualFileSystem, config: &'a PreviewConfig) -> Self {
        Self {
            vfs,
            config,
            compiled: BTreeMap::new(),
            edges: BTreeMap::new(),
            bare: BTreeSet::new(),
            stylesheets: Vec::new(),
            external_stylesheets: Vec::new(),
            errors: Vec::new(),
            watched: BTreeSet::new(),
            entry_failed: false,
        }
    }

    /// Breadth-first walk from `entry`, compiling each module once.
    fn walk(&mut self, engine: &mut TransformEngine, entry: &FilePath) {
        let mut queue = VecDeque::from([entry.clone()]);
        let mut seen = BTreeSet::from([entry.clone()]);

        let vfs = self.vfs;
        while let Some(path) = queue.pop_front() {
            let Ok(source) = vfs.read(&path) else {
                continue;
            };

            let compiled = if path.extension() == Some("json") {
                self.compile_json(&path, source)
            } else {
                self.compile_script(engine, &path, source, &mut seen, &mut queue)
            };

            if compiled.stub && path == *entry {
                self.entry_failed = true;
            }
            self.compiled.insert(path, compiled);
        }
    }

    fn compile_json(&mut self, path: &FilePath, source: &str) -> Compiled {
        match serde_json::from_str::<serde_json::Value>(source) {
            Ok(value) => Compiled {
                code: format!("export default {value};\n"),
                stub: false,
            },
            Err(err) => {
                let mut error =
                    PreviewError::new(PreviewErrorKind::InvalidJson, path.as_str(), err.to_string());
                if err.line() > 0 {
                    error.location = Some(Location::new(err.line(), err.column().max(1)));
                }
                self.errors.push(error);
                stub()
            }
        }
    }

    fn compile_script(
        &mut self,
        engine: &mut TransformEngine,
        path: &FilePath,
        source: &str,
        seen: &mut BTreeSet<FilePath>,
        queue: &mut VecDeque<FilePath>,
    ) -> Compiled {
        let module = match engine.transform(path, source) {
            Ok(module) => module,
            Err(err) => {
                self.errors.push(err.into());
                return stub();
            }
        };

        for import in &module.imports {
            match &import.target {
                ImportTarget::Local(target) => {
                    let resolved = resolve_module(self.vfs, self.config, target.as_str());
                    match &resolved {
                        Some(found) => {
                            self.watched.extend(shadowing_candidates(
                                self.config.module_candidates(target.as_str()),
                                found,
                            ));
                            if seen.insert(found.clone()) {
                                queue.push_back(found.clone());
                            }
                        }
                        None => {
                            tracing::debug!(
                                importer = %path,
                                specifier = %import.specifier,
                                "unresolved import"
                            );
                            self.errors.push(PreviewError::new(
                                PreviewErrorKind::UnresolvedImport,
                                path.as_str(),
                                format!(
                                    "Cannot resolve import '{}' (no file at {target})",
                                    import.specifier
                                ),
                            ));
                            self.watched
                                .extend(candidate_paths(self.config, target.as_str()));
                        }
                    }
                    self.edges.insert(target.as_str().to_string(), resolved);
                }
                ImportTarget::Bare(name) => {
                    self.bare.insert(name.clone());
                }
                ImportTarget::Url(_) => {}
            }
        }

        for sheet in &module.stylesheets {
            if self.vfs.is_file(sheet) {
                if !self.stylesheets.contains(sheet) {
                    self.stylesheets.push(sheet.clone());
                }
            } else {
                self.errors.push(PreviewError::new(
                    PreviewErrorKind::MissingStylesheet,
                    path.as_str(),
                    format!("Stylesheet {sheet} does not exist"),
                ));
                self.watched.insert(sheet.clone());
            }
        }

        for sheet in &module.external_stylesheets {
            let url = if sheet.contains(':') {
                sheet.clone()
            } else {
                cdn_stylesheet_url(self.config, sheet)
            };
            if !self.external_stylesheets.contains(&url) {
                self.external_stylesheets.push(url);
            }
        }

        Compiled {
            code: module.code.clone(),
            stub: false,
        }
    }

    /// Mints references and builds the bundle.
    fn publish<S: EphemeralStore>(self, store: &mut S, entry: &FilePath) -> Result<PreviewBundle> {
        let mut references = Vec::with_capacity(self.compiled.len() + 1);
        let minted = self.mint_all(store, &mut references);
        let (modules, stub_ref) = match minted {
            Ok(minted) => minted,
            Err(err) => {
                store.release_all(&references);
                return Err(err);
            }
        };

        let mut import_map = runtime_map(self.config);
        for name in &self.bare {
            import_map.insert(name.as_str(), cdn_url(self.config, name));
        }
        for (path, module) in &modules {
            import_map.insert(path.as_str(), module.reference.as_str());
        }
        for (specifier, resolved) in &self.edges {
            let reference = resolved
                .as_ref()
                .and_then(|path| modules.get(path))
                .map(|module| &module.reference)
                .or(stub_ref.as_ref());
            if let Some(reference) = reference {
                import_map.insert(specifier.as_str(), reference.as_str());
            }
        }
        if let Some(module) = modules.get(entry) {
            import_map.insert(self.config.entry_point.as_str(), module.reference.as_str());
        }

        let mut styles = String::new();
        for sheet in &self.stylesheets {
            if let Ok(text) = self.vfs.read(sheet) {
                styles.push_str(&format!("/* {sheet} */\n{text}\n"));
            }
        }

        let status = if self.entry_failed {
            BuildStatus::Diagnostic(DiagnosticReason::EntryPointFailed)
        } else if self.errors.is_empty() {
            BuildStatus::Ready
        } else {
            BuildStatus::Degraded
        };

        if !self.errors.is_empty() {
            tracing::warn!(count = self.errors.len(), "preview built with errors");
        }
        tracing::info!(
            entry = %entry,
            modules = modules.len(),
            stylesheets = self.stylesheets.len(),
            %status,
            "preview assembled"
        );

        Ok(PreviewBundle {
            status,
            entry: Some(entry.clone()),
            entry_specifier: self.config.entry_point.clone(),
            import_map,
            styles,
            stylesheets: self.stylesheets,
            external_stylesheets: self.external_stylesheets,
            errors: self.errors,
            modules,
            watched: self.watched,
            references,
            built_at: Utc::now(),
        })
    }

    fn mint_all<S: EphemeralStore>(
        &self,
        store: &mut S,
        references: &mut Vec<EphemeralRef>,
    ) -> Result<(BTreeMap<FilePath, ModuleEntry>, Option<EphemeralRef>)> {
        let mut modules = BTreeMap::new();
        for (path, compiled) in &self.compiled {
            let reference = store.mint(path.as_str(), &compiled.code)?;
            references.push(reference.clone());
            modules.insert(
                path.clone(),
                ModuleEntry {
                    reference,
                    stub: compiled.stub,
                },
            );
        }

        let stub_ref = if self.edges.values().any(Option::is_none) {
            let reference = store.mint("<unresolved>", STUB_MODULE)?;
            references.push(reference.clone());
            Some(reference)
        } else {
            None
        };

        Ok((modules, stub_ref))
    }
}

fn stub() -> Compiled {
    Compiled {
        code: STUB_MODULE.to_string(),
        stub: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use uigen_files::FilesBuilder;

    fn build(vfs: &VirtualFileSystem) -> (PreviewBundle, MemoryStore) {
        let config = PreviewConfig::default();
        let mut engine = TransformEngine::new(&config).unwrap();
        let mut store = MemoryStore::default();
        let bundle = assemble(vfs, &config, &mut engine, &mut store).unwrap();
        (bundle, store)
    }

    fn path(p: &str) -> FilePath {
        FilePath::new(p).unwrap()
    }

    #[test]
    fn test_missing_entry_is_diagnostic() {
        let vfs = FilesBuilder::new()
            .add_file("/Other.jsx", "export default 1;")
            .build()
            .unwrap();
        let (bundle, store) = build(&vfs);

        assert_eq!(
            bundle.status,
            BuildStatus::Diagnostic(DiagnosticReason::MissingEntryPoint)
        );
        assert_eq!(bundle.errors[0].kind, PreviewErrorKind::MissingEntryPoint);
        assert!(bundle.watched.contains(&path("/App.jsx")));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_unreachable_files_are_ignored() {
        let vfs = FilesBuilder::new()
            .add_file("/App.jsx", "export default () => <p>hi</p>;")
            .add_file("/Broken.jsx", "<div")
            .build()
            .unwrap();
        let (bundle, _) = build(&vfs);

        assert!(bundle.is_ready());
        assert!(!bundle.is_reachable(&path("/Broken.jsx")));
    }

    #[test]
    fn test_broken_dependency_is_stubbed() {
        let vfs = FilesBuilder::new()
            .add_file(
                "/App.jsx",
                "import Card from './Card';\nexport default () => <Card />;",
            )
            .add_file("/Card.jsx", "export default () => <div>;")
            .build()
            .unwrap();
        let (bundle, store) = build(&vfs);

        assert_eq!(bundle.status, BuildStatus::Degraded);
        assert_eq!(bundle.errors[0].kind, PreviewErrorKind::Syntax);
        assert_eq!(bundle.errors[0].path, "/Card.jsx");

        let card = &bundle.modules[&path("/Card.jsx")];
        assert!(card.stub);
        assert_eq!(store.resolve(&card.reference), Some(STUB_MODULE));
        assert_eq!(bundle.import_map.get("/Card"), Some(card.reference.as_str()));
    }

    #[test]
    fn test_broken_entry_is_diagnostic() {
        let vfs = FilesBuilder::new()
            .add_file("/App.jsx", "export default () => <div>;")
            .build()
            .unwrap();
        let (bundle, _) = build(&vfs);
        assert_eq!(
            bundle.status,
            BuildStatus::Diagnostic(DiagnosticReason::EntryPointFailed)
        );
    }

    #[test]
    fn test_unresolved_import_maps_to_stub_and_is_watched() {
        let vfs = FilesBuilder::new()
            .add_file(
                "/App.jsx",
                "import Nav from '@/components/Nav';\nexport default () => <Nav />;",
            )
            .build()
            .unwrap();
        let (bundle, store) = build(&vfs);

        assert_eq!(bundle.errors[0].kind, PreviewErrorKind::UnresolvedImport);
        let stub = bundle.import_map.get("/components/Nav").unwrap();
        assert_eq!(store.resolve(&EphemeralRef::new(stub)), Some(STUB_MODULE));
        assert!(bundle.watched.contains(&path("/components/Nav.jsx")));
        assert!(bundle.watched.contains(&path("/components/Nav/index.tsx")));
    }

    #[test]
    fn test_higher_ranked_candidates_are_watched() {
        let vfs = FilesBuilder::new()
            .add_file(
                "/App.tsx",
                "import Button from '@/components/Button';\nexport default () => <Button />;",
            )
            .add_file("/components/Button.tsx", "export default () => <button />;")
            .build()
            .unwrap();
        let (bundle, _) = build(&vfs);

        assert!(bundle.is_ready());
        assert_eq!(bundle.entry, Some(path("/App.tsx")));
        assert!(bundle.watched.contains(&path("/App.jsx")));
        assert!(bundle.watched.contains(&path("/components/Button.jsx")));
        assert!(!bundle.watched.contains(&path("/components/Button/index.jsx")));
    }

    #[test]
    fn test_import_text_in_template_kept_verbatim() {
        let vfs = FilesBuilder::new()
            .add_file(
                "/App.jsx",
                "const snippet = `import './theme.css';\nimport x from './x';`;\nexport default () => <pre>{snippet}</pre>;",
            )
            .build()
            .unwrap();
        let (bundle, store) = build(&vfs);

        assert!(bundle.is_ready());
        assert!(bundle.errors.is_empty());
        assert!(bundle.stylesheets.is_empty());
        let app = &bundle.modules[&path("/App.jsx")];
        let code = store.resolve(&app.reference).unwrap();
        assert!(code.contains("import './theme.css';\nimport x from './x';"));
    }

    #[test]
    fn test_json_module() {
        let vfs = FilesBuilder::new()
            .add_file(
                "/App.jsx",
                "import data from './data.json';\nexport default () => <p>{data.title}</p>;",
            )
            .add_file("/data.json", "{ \"title\": \"Hi\" }")
            .build()
            .unwrap();
        let (bundle, store) = build(&vfs);

        assert!(bundle.is_ready());
        let reference = bundle.reference(&path("/data.json")).unwrap();
        assert_eq!(
            store.resolve(reference),
            Some("export default {\"title\":\"Hi\"};\n")
        );
    }

    #[test]
    fn test_invalid_json_reported() {
        let vfs = FilesBuilder::new()
            .add_file("/App.jsx", "import d from './d.json';\nexport default () => d;")
            .add_file("/d.json", "{ nope }")
            .build()
            .unwrap();
        let (bundle, _) = build(&vfs);
        assert_eq!(bundle.errors[0].kind, PreviewErrorKind::InvalidJson);
        assert!(bundle.errors[0].location.is_some());
    }

    #[test]
    fn test_missing_stylesheet_reported() {
        let vfs = FilesBuilder::new()
            .add_file("/App.jsx", "import './missing.css';\nexport default () => null;")
            .build()
            .unwrap();
        let (bundle, _) = build(&vfs);
        assert_eq!(bundle.errors[0].kind, PreviewErrorKind::MissingStylesheet);
        assert!(bundle.watched.contains(&path("/missing.css")));
    }

    #[test]
    fn test_import_cycle_terminates() {
        let vfs = FilesBuilder::new()
            .add_file(
                "/App.jsx",
                "import { b } from './b';\nexport const a = 1;\nexport default () => null;",
            )
            .add_file("/b.js", "import { a } from './App';\nexport const b = a;")
            .build()
            .unwrap();
        let (bundle, _) = build(&vfs);
        assert_eq!(bundle.modules.len(), 2);
        assert!(bundle.is_ready());
    }

    #[test]
    fn test_external_stylesheets_and_bare_imports() {
        let vfs = FilesBuilder::new()
            .add_file(
                "/App.jsx",
                "import 'react-toastify/dist/ReactToastify.css';\nimport { Star } from 'lucide-react';\nexport default () => <Star />;",
            )
            .build()
            .unwrap();
        let (bundle, _) = build(&vfs);

        assert_eq!(
            bundle.external_stylesheets,
            vec!["https://esm.sh/react-toastify/dist/ReactToastify.css".to_string()]
        );
        assert_eq!(
            bundle.import_map.get("lucide-react"),
            Some("https://esm.sh/lucide-react?external=react,react-dom")
        );
        assert_eq!(
            bundle.import_map.get("react/jsx-runtime"),
            Some("https://esm.sh/react@19/jsx-runtime")
        );
    }
}
