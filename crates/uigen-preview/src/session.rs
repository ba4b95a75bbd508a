//! Reactive preview sessions.
//!
//! A [`PreviewSession`] owns one file tree and everything needed to keep a
//! preview of it current. Edits are recorded as change events; [`poll`]
//! decides whether they matter to the current bundle, waits for the edit
//! burst to settle, then rebuilds. The previous build's references are
//! released only after its replacement has been assembled.
//!
//! [`poll`]: PreviewSession::poll

use crate::assemble::assemble;
use crate::bundle::PreviewBundle;
use crate::debounce::Debouncer;
use crate::document::DocumentRenderer;
use crate::store::InlineStore;
use std::sync::Arc;
use std::time::Instant;
use uigen_core::traits::EphemeralStore;
use uigen_core::{PreviewConfig, Result};
use uigen_files::{
    ChangeEvent, ChangeKind, ChangeRecorder, EditOutcome, SerializedTree, ToolCall,
    VirtualFileSystem,
};
use uigen_transform::{CacheStats, TransformEngine};

/// One editing and preview session.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use uigen_core::PreviewConfig;
/// use uigen_files::ToolCall;
/// use uigen_preview::{InlineStore, PreviewSession};
///
/// let config = PreviewConfig::builder()
///     .debounce(Duration::from_millis(100))
///     .build();
/// let mut session = PreviewSession::new(config, InlineStore::new()).unwrap();
///
/// let call = ToolCall::from_json(
///     r#"{"tool": "str_replace_editor", "input": {"command": "create", "path": "/App.jsx", "file_text": "export default () => <p>Hi</p>;"}}"#,
/// )
/// .unwrap();
/// session.apply_tool_call(&call).unwrap();
///
/// let start = Instant::now();
/// assert!(session.poll(start).unwrap().is_none());
/// let bundle = session.poll(start + Duration::from_millis(100)).unwrap().unwrap();
/// assert!(bundle.is_ready());
/// ```
#[derive(Debug)]
pub struct PreviewSession<S: EphemeralStore = InlineStore> {
    config: PreviewConfig,
    vfs: VirtualFileSystem,
    engine: TransformEngine,
    store: S,
    recorder: Arc<ChangeRecorder>,
    debouncer: Debouncer,
    bundle: Option<PreviewBundle>,
    builds: u64,
}

impl<S: EphemeralStore> PreviewSession<S> {
    /// Creates a session over an empty tree.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if `config` is invalid.
    pub fn new(config: PreviewConfig, store: S) -> Result<Self> {
        Self::with_tree(config, store, VirtualFileSystem::new())
    }

    /// Creates a session over an existing tree.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if `config` is invalid.
    pub fn with_tree(config: PreviewConfig, store: S, mut vfs: VirtualFileSystem) -> Result<Self> {
        let engine = TransformEngine::new(&config)?;
        let recorder = Arc::new(ChangeRecorder::new());
        vfs.subscribe(recorder.clone());

        tracing::info!(files = vfs.file_count(), "preview session started");

        Ok(Self {
            debouncer: Debouncer::new(config.debounce()),
            config,
            vfs,
            engine,
            store,
            recorder,
            bundle: None,
            builds: 0,
        })
    }

    /// Creates a session from a persisted tree.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or `tree` is not a valid
    /// tree.
    pub fn from_serialized(config: PreviewConfig, store: S, tree: &SerializedTree) -> Result<Self> {
        let vfs = VirtualFileSystem::from_serialized(tree)?;
        Self::with_tree(config, store, vfs)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Returns the file tree.
    #[must_use]
    pub const fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    /// Returns the file tree for direct mutation. Changes are still
    /// observed by the session.
    pub const fn vfs_mut(&mut self) -> &mut VirtualFileSystem {
        &mut self.vfs
    }

    /// Returns the ephemeral store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the current bundle, if any build has completed.
    #[must_use]
    pub const fn bundle(&self) -> Option<&PreviewBundle> {
        self.bundle.as_ref()
    }

    /// Number of completed builds.
    #[must_use]
    pub const fn builds(&self) -> u64 {
        self.builds
    }

    /// Returns the transform cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.engine.stats()
    }

    /// Returns `true` if relevant changes are waiting for a rebuild.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Applies one agent tool call to the tree.
    ///
    /// # Errors
    ///
    /// Returns the edit error; the tree is left unchanged.
    pub fn apply_tool_call(&mut self, call: &ToolCall) -> Result<EditOutcome> {
        let outcome = call.apply(&mut self.vfs);
        match &outcome {
            Ok(outcome) => tracing::debug!(path = %outcome.path(), "tool call applied"),
            Err(err) => tracing::debug!(error = %err, "tool call rejected"),
        }
        outcome
    }

    /// Replaces the whole tree.
    ///
    /// # Errors
    ///
    /// Returns an error if `tree` is invalid; the current tree is kept.
    pub fn load(&mut self, tree: &SerializedTree) -> Result<()> {
        self.vfs.deserialize(tree)
    }

    /// Processes recorded changes and rebuilds once they have settled.
    ///
    /// Before the first build, the first poll counts as a change, so a
    /// session over an existing tree builds one window after it.
    /// Returns the new bundle when a rebuild happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot mint references. The previous
    /// bundle stays current.
    pub fn poll(&mut self, now: Instant) -> Result<Option<&PreviewBundle>> {
        let events = self.recorder.drain();
        let initial = self.bundle.is_none() && !self.debouncer.is_pending();
        if initial || events.iter().any(|event| self.is_relevant(event)) {
            self.debouncer.note(now);
        } else if !events.is_empty() {
            tracing::trace!(count = events.len(), "ignoring changes outside the preview");
        }

        if !self.debouncer.is_settled(now) {
            return Ok(None);
        }

        self.rebuild().map(Some)
    }

    /// Rebuilds immediately, regardless of pending changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot mint references.
    pub fn build_now(&mut self) -> Result<&PreviewBundle> {
        let _ = self.recorder.drain();
        self.rebuild()
    }

    /// Renders the host document for the current bundle.
    ///
    /// # Errors
    ///
    /// Returns `Error::Template` if rendering fails.
    pub fn document(&self) -> Result<Option<String>> {
        let Some(bundle) = &self.bundle else {
            return Ok(None);
        };
        DocumentRenderer::new()?.render(bundle, &self.config).map(Some)
    }

    /// Releases every live reference and forgets the current bundle.
    pub fn close(&mut self) {
        if let Some(bundle) = self.bundle.take() {
            self.store.release_all(&bundle.references);
        }
        self.debouncer.reset();
        tracing::info!(builds = self.builds, "preview session closed");
    }

    fn is_relevant(&self, event: &ChangeEvent) -> bool {
        if event.kind == ChangeKind::Reset {
            return true;
        }
        match &self.bundle {
            Some(bundle) if !bundle.is_diagnostic() => bundle.is_affected_by(event),
            _ => true,
        }
    }

    fn rebuild(&mut self) -> Result<&PreviewBundle> {
        let bundle = assemble(&self.vfs, &self.config, &mut self.engine, &mut self.store)?;
        self.debouncer.reset();
        self.builds += 1;

        if let Some(previous) = self.bundle.take() {
            self.store.release_all(&previous.references);
            tracing::debug!(released = previous.references.len(), "superseded build released");
        }

        let stats = self.engine.stats();
        tracing::info!(
            build = self.builds,
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            live_refs = self.store.live_count(),
            "preview rebuilt"
        );

        Ok(self.bundle.insert(bundle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::time::Duration;
    use uigen_files::{EditorCommand, FileManagerCommand, FilePath, FilesBuilder};

    const WINDOW: Duration = Duration::from_millis(50);

    fn session() -> PreviewSession<MemoryStore> {
        let vfs = FilesBuilder::new()
            .add_file(
                "/App.jsx",
                "import Button from '@/components/Button';\nexport default () => <Button />;",
            )
            .add_file("/components/Button.jsx", "export default () => <button>Go</button>;")
            .add_file("/notes/todo.md", "- ship it")
            .build()
            .unwrap();
        let config = PreviewConfig::builder().debounce(WINDOW).build();
        PreviewSession::with_tree(config, MemoryStore::default(), vfs).unwrap()
    }

    fn create(path: &str, text: &str) -> ToolCall {
        EditorCommand::Create {
            path: path.to_string(),
            file_text: text.to_string(),
        }
        .into()
    }

    #[test]
    fn test_first_poll_schedules_initial_build() {
        let mut session = session();
        let t0 = Instant::now();
        assert!(session.poll(t0).unwrap().is_none());
        assert!(session.is_pending());
        assert!(session.poll(t0 + WINDOW).unwrap().is_some());
        assert_eq!(session.builds(), 1);
    }

    #[test]
    fn test_unreachable_change_is_ignored() {
        let mut session = session();
        session.build_now().unwrap();

        session
            .apply_tool_call(&create("/notes/todo.md", "- ship it today"))
            .unwrap();
        let t0 = Instant::now();
        assert!(session.poll(t0).unwrap().is_none());
        assert!(!session.is_pending());
        assert!(session.poll(t0 + WINDOW * 4).unwrap().is_none());
        assert_eq!(session.builds(), 1);
    }

    #[test]
    fn test_reachable_change_rebuilds_after_burst() {
        let mut session = session();
        session.build_now().unwrap();
        let t0 = Instant::now();

        session
            .apply_tool_call(&create(
                "/components/Button.jsx",
                "export default () => <button>Stop</button>;",
            ))
            .unwrap();
        assert!(session.poll(t0).unwrap().is_none());

        session
            .apply_tool_call(&create(
                "/components/Button.jsx",
                "export default () => <button>Halt</button>;",
            ))
            .unwrap();
        assert!(session.poll(t0 + WINDOW / 2).unwrap().is_none());
        assert!(session.poll(t0 + WINDOW).unwrap().is_none());

        let bundle = session.poll(t0 + WINDOW / 2 + WINDOW).unwrap().unwrap();
        assert!(bundle.is_ready());
        assert_eq!(session.builds(), 2);
    }

    #[test]
    fn test_superseded_references_are_released() {
        let mut session = session();
        let first: Vec<_> = session.build_now().unwrap().references.clone();
        assert_eq!(session.store().live_count(), first.len());

        session
            .apply_tool_call(&create("/components/Button.jsx", "export default () => null;"))
            .unwrap();
        let second = session.build_now().unwrap().references.clone();

        assert_eq!(session.store().live_count(), second.len());
        for reference in &first {
            assert!(session.store().resolve(reference).is_none());
        }
    }

    #[test]
    fn test_creating_missing_import_triggers_rebuild() {
        let mut session = session();
        session
            .apply_tool_call(&create(
                "/App.jsx",
                "import Nav from './Nav';\nexport default () => <Nav />;",
            ))
            .unwrap();
        session.build_now().unwrap();
        assert!(!session.bundle().unwrap().is_ready());

        session
            .apply_tool_call(&create("/Nav.tsx", "export default () => null;"))
            .unwrap();
        let t0 = Instant::now();
        session.poll(t0).unwrap();
        assert!(session.is_pending());
        let bundle = session.poll(t0 + WINDOW).unwrap().unwrap();
        assert!(bundle.is_ready());
    }

    #[test]
    fn test_creating_higher_ranked_module_triggers_rebuild() {
        let mut session = session();
        session
            .apply_tool_call(&create(
                "/App.jsx",
                "import Nav from './Nav';\nexport default () => <Nav />;",
            ))
            .unwrap();
        session
            .apply_tool_call(&create("/Nav.tsx", "export default () => <nav>ts</nav>;"))
            .unwrap();
        session.build_now().unwrap();
        assert!(session.bundle().unwrap().is_reachable(&FilePath::new("/Nav.tsx").unwrap()));

        session
            .apply_tool_call(&create("/Nav.jsx", "export default () => <nav>jsx</nav>;"))
            .unwrap();
        let t0 = Instant::now();
        session.poll(t0).unwrap();
        assert!(session.is_pending());
        let bundle = session.poll(t0 + WINDOW).unwrap().unwrap();
        assert!(bundle.is_reachable(&FilePath::new("/Nav.jsx").unwrap()));
        assert!(!bundle.is_reachable(&FilePath::new("/Nav.tsx").unwrap()));
    }

    #[test]
    fn test_creating_higher_ranked_entry_triggers_rebuild() {
        let vfs = FilesBuilder::new()
            .add_file("/App.tsx", "export default () => <p>ts</p>;")
            .build()
            .unwrap();
        let config = PreviewConfig::builder().debounce(WINDOW).build();
        let mut session = PreviewSession::with_tree(config, MemoryStore::default(), vfs).unwrap();
        session.build_now().unwrap();
        assert_eq!(session.bundle().unwrap().entry, Some(FilePath::new("/App.tsx").unwrap()));

        session
            .apply_tool_call(&create("/App.jsx", "export default () => <p>jsx</p>;"))
            .unwrap();
        let t0 = Instant::now();
        session.poll(t0).unwrap();
        assert!(session.is_pending());
        let bundle = session.poll(t0 + WINDOW).unwrap().unwrap();
        assert_eq!(bundle.entry, Some(FilePath::new("/App.jsx").unwrap()));
    }

    #[test]
    fn test_rejected_tool_call_records_nothing() {
        let mut session = session();
        session.build_now().unwrap();

        let call: ToolCall = FileManagerCommand::Delete {
            path: "/missing.jsx".to_string(),
        }
        .into();
        assert!(session.apply_tool_call(&call).unwrap_err().is_not_found());
        session.poll(Instant::now()).unwrap();
        assert!(!session.is_pending());
    }

    #[test]
    fn test_load_replaces_tree_and_is_relevant() {
        let mut session = session();
        session.build_now().unwrap();

        let tree = FilesBuilder::new()
            .add_file("/App.jsx", "export default () => <p>new</p>;")
            .build()
            .unwrap()
            .serialize();
        session.load(&tree).unwrap();
        session.poll(Instant::now()).unwrap();
        assert!(session.is_pending());
        assert_eq!(session.vfs().file_count(), 1);
    }

    #[test]
    fn test_close_releases_everything() {
        let mut session = session();
        session.build_now().unwrap();
        assert!(session.store().live_count() > 0);

        session.close();
        assert_eq!(session.store().live_count(), 0);
        assert!(session.bundle().is_none());
        assert!(session.document().unwrap().is_none());
    }

    #[test]
    fn test_from_serialized() {
        let tree = session().vfs().serialize();
        let mut restored =
            PreviewSession::from_serialized(PreviewConfig::default(), InlineStore::new(), &tree)
                .unwrap();
        assert!(restored.build_now().unwrap().is_ready());
    }

    #[test]
    fn test_cache_reused_across_builds() {
        let mut session = session();
        session.build_now().unwrap();
        session.build_now().unwrap();
        let stats = session.cache_stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 2);
    }
}
