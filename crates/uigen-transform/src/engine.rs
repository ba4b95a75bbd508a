//! Per-file transform pipeline and its cached front end.
//!
//! A file goes through three steps: type-only constructs are blanked out of
//! TypeScript sources, JSX is lowered, and imports are rewritten. Each step
//! keeps byte offsets of the original text meaningful until the runtime
//! import is prepended at the very end, so error locations always point
//! into the file the agent wrote.

use crate::cache::{CacheKey, CacheStats, TransformCache};
use crate::imports::{self, ImportTarget, ModuleImport};
use crate::jsx::{self, RUNTIME_IMPORT, RUNTIME_MODULE};
use crate::typescript::{is_typescript, strip_types};
use serde::Serialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use uigen_core::{Error, PreviewConfig, Result, SyntaxError};
use uigen_files::{FilePath, VirtualFileSystem};

/// Outcome of transforming one file.
///
/// Cheap to clone: successes are shared behind an [`Arc`].
pub type TransformResult = std::result::Result<Arc<TransformedModule>, SyntaxError>;

/// A file lowered to a plain ES module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformedModule {
    /// Path of the source file
    pub path: FilePath,
    /// Executable module source
    pub code: String,
    /// Imports in source order, the JSX runtime first when present
    pub imports: Vec<ModuleImport>,
    /// Tree stylesheets imported by this file
    pub stylesheets: Vec<FilePath>,
    /// Package or URL stylesheets imported by this file
    pub external_stylesheets: Vec<String>,
    /// Whether the file contained JSX
    pub uses_jsx: bool,
}

impl TransformedModule {
    /// Wraps already-executable code with no imports.
    #[must_use]
    pub fn passthrough(path: FilePath, code: impl Into<String>) -> Self {
        Self {
            path,
            code: code.into(),
            imports: Vec::new(),
            stylesheets: Vec::new(),
            external_stylesheets: Vec::new(),
            uses_jsx: false,
        }
    }

    /// Tree-local import targets, static and dynamic.
    pub fn local_imports(&self) -> impl Iterator<Item = &FilePath> {
        self.imports.iter().filter_map(|import| match &import.target {
            ImportTarget::Local(path) => Some(path),
            _ => None,
        })
    }

    /// Bare package specifiers.
    pub fn bare_imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().filter_map(|import| match &import.target {
            ImportTarget::Bare(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Transforms one file without caching.
///
/// The result depends only on `path`, `source` and `alias_prefix`.
///
/// # Errors
///
/// Returns a [`SyntaxError`] naming `path` when the file cannot be lowered.
///
/// # Examples
///
/// ```
/// use uigen_files::FilePath;
/// use uigen_transform::transform_source;
///
/// let path = FilePath::new("/App.jsx").unwrap();
/// let module = transform_source(&path, "export default () => <h1>Hi</h1>;", "@/").unwrap();
/// assert!(module.code.contains("_jsx(\"h1\""));
/// assert!(module.bare_imports().any(|name| name == "react/jsx-runtime"));
/// ```
pub fn transform_source(path: &FilePath, source: &str, alias_prefix: &str) -> TransformResult {
    let stripped;
    let source = if is_typescript(path.as_str()) {
        stripped = strip_types(source);
        stripped.as_str()
    } else {
        source
    };

    let lowered = jsx::lower(source, path.as_str())?;
    let rewritten = imports::rewrite(&lowered.code, path, alias_prefix);

    let mut code = rewritten.code;
    let mut imports = rewritten.imports;
    if lowered.uses_jsx {
        code = format!("{RUNTIME_IMPORT}\n{code}");
        imports.insert(
            0,
            ModuleImport {
                specifier: RUNTIME_MODULE.to_string(),
                target: ImportTarget::Bare(RUNTIME_MODULE.to_string()),
                dynamic: false,
            },
        );
    }

    Ok(Arc::new(TransformedModule {
        path: path.clone(),
        code,
        imports,
        stylesheets: rewritten.stylesheets,
        external_stylesheets: rewritten.external_stylesheets,
        uses_jsx: lowered.uses_jsx,
    }))
}

/// Cached transformer configured from a [`PreviewConfig`].
///
/// # Examples
///
/// ```
/// use uigen_core::PreviewConfig;
/// use uigen_files::FilePath;
/// use uigen_transform::TransformEngine;
///
/// let mut engine = TransformEngine::new(&PreviewConfig::default()).unwrap();
/// let path = FilePath::new("/App.jsx").unwrap();
///
/// engine.transform(&path, "export default 1;").unwrap();
/// engine.transform(&path, "export default 1;").unwrap();
/// assert_eq!(engine.stats().hits, 1);
/// ```
#[derive(Debug)]
pub struct TransformEngine {
    alias_prefix: String,
    module_extensions: Vec<String>,
    cache: TransformCache,
}

impl TransformEngine {
    /// Creates an engine with an empty cache.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration is invalid.
    pub fn new(config: &PreviewConfig) -> Result<Self> {
        config.validate()?;
        let capacity =
            NonZeroUsize::new(config.cache_capacity).ok_or_else(|| Error::ConfigError {
                message: "cache capacity must be greater than zero".to_string(),
            })?;

        Ok(Self {
            alias_prefix: config.alias_prefix.clone(),
            module_extensions: config.module_extensions.clone(),
            cache: TransformCache::new(capacity),
        })
    }

    /// Returns the import alias prefix in use.
    #[must_use]
    pub fn alias_prefix(&self) -> &str {
        &self.alias_prefix
    }

    /// Returns `true` if files at `path` are transformed as modules.
    #[must_use]
    pub fn is_module_path(&self, path: &FilePath) -> bool {
        let path = path.as_str();
        self.module_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
            || path.ends_with(".mjs")
    }

    /// Transforms one file, reusing the cached result for unchanged text.
    ///
    /// # Errors
    ///
    /// Returns the file's [`SyntaxError`], cached or fresh.
    pub fn transform(&mut self, path: &FilePath, source: &str) -> TransformResult {
        let key = CacheKey::new(path, source);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(path = %path, "transform cache hit");
            return cached;
        }

        tracing::debug!(path = %path, "transforming");
        let result = transform_source(path, source, &self.alias_prefix);
        if let Err(err) = &result {
            tracing::debug!(path = %path, error = %err, "transform failed");
        }
        self.cache.insert(key, result.clone());
        result
    }

    /// Transforms every module file in `vfs`, each independently.
    ///
    /// A failure in one file does not affect any other entry of the
    /// returned map.
    pub fn transform_all(
        &mut self,
        vfs: &VirtualFileSystem,
    ) -> BTreeMap<FilePath, TransformResult> {
        let modules: Vec<(&FilePath, &str)> = vfs
            .files()
            .filter(|(path, _)| self.is_module_path(path))
            .collect();

        modules
            .into_iter()
            .map(|(path, content)| (path.clone(), self.transform(path, content)))
            .collect()
    }

    /// Returns the cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Returns the underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &TransformCache {
        &self.cache
    }

    /// Forgets every cached result for `path`.
    pub fn invalidate(&mut self, path: &FilePath) {
        let removed = self.cache.invalidate(path);
        tracing::debug!(path = %path, removed, "transform cache invalidated");
    }

    /// Empties the cache.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> FilePath {
        FilePath::new(p).unwrap()
    }

    fn engine() -> TransformEngine {
        TransformEngine::new(&PreviewConfig::default()).unwrap()
    }

    #[test]
    fn test_plain_module_has_no_runtime_import() {
        let module = transform_source(&path("/util.js"), "export const x = 1;", "@/").unwrap();
        assert_eq!(module.code, "export const x = 1;");
        assert!(!module.uses_jsx);
        assert!(module.imports.is_empty());
    }

    #[test]
    fn test_jsx_module_gets_runtime_import_first() {
        let module = transform_source(
            &path("/App.jsx"),
            "import Button from '@/components/Button';\nexport default () => <Button />;",
            "@/",
        )
        .unwrap();

        assert!(module.code.starts_with(RUNTIME_IMPORT));
        assert!(module.code.contains("from '/components/Button'"));
        assert_eq!(module.imports[0].specifier, RUNTIME_MODULE);
        assert_eq!(
            module.local_imports().collect::<Vec<_>>(),
            vec![&path("/components/Button")]
        );
    }

    #[test]
    fn test_typescript_types_removed_before_lowering() {
        let source = "import type { ReactNode } from 'react';\ninterface Props { children: ReactNode }\nexport default function Card() { return <div />; }";
        let module = transform_source(&path("/Card.tsx"), source, "@/").unwrap();
        assert!(!module.code.contains("interface"));
        assert!(!module.bare_imports().any(|name| name == "react"));
    }

    #[test]
    fn test_error_location_refers_to_original_text() {
        let source = "type A = string;\nconst x = <div>;";
        let err = transform_source(&path("/a.tsx"), source, "@/").unwrap_err();
        assert_eq!(err.path, "/a.tsx");
        assert_eq!(err.location.map(|loc| loc.line), Some(2));
    }

    #[test]
    fn test_stylesheets_collected() {
        let module = transform_source(
            &path("/App.jsx"),
            "import './styles.css';\nimport 'pkg/theme.css';\nexport default 1;",
            "@/",
        )
        .unwrap();
        assert_eq!(module.stylesheets, vec![path("/styles.css")]);
        assert_eq!(module.external_stylesheets, vec!["pkg/theme.css".to_string()]);
    }

    #[test]
    fn test_engine_caches_by_content() {
        let mut engine = engine();
        let p = path("/App.jsx");

        let first = engine.transform(&p, "export default 1;").unwrap();
        let second = engine.transform(&p, "export default 1;").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        engine.transform(&p, "export default 2;").unwrap();
        let stats = engine.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_engine_caches_failures() {
        let mut engine = engine();
        let p = path("/Broken.jsx");
        assert!(engine.transform(&p, "<div").is_err());
        assert!(engine.transform(&p, "<div").is_err());
        assert_eq!(engine.stats().hits, 1);
    }

    #[test]
    fn test_module_path_detection() {
        let engine = engine();
        assert!(engine.is_module_path(&path("/App.jsx")));
        assert!(engine.is_module_path(&path("/lib/util.mjs")));
        assert!(!engine.is_module_path(&path("/styles.css")));
        assert!(!engine.is_module_path(&path("/data.json")));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PreviewConfig::builder().cache_capacity(0).build();
        assert!(TransformEngine::new(&config).unwrap_err().is_config_error());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut engine = engine();
        let p = path("/App.jsx");
        engine.transform(&p, "export default 1;").unwrap();
        engine.invalidate(&p);
        assert!(engine.cache().is_empty());

        engine.transform(&p, "export default 1;").unwrap();
        engine.clear_cache();
        assert!(engine.cache().is_empty());
    }
}
