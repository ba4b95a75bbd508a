//! Ephemeral reference stores.
//!
//! Two implementations of [`EphemeralStore`]:
//!
//! - [`InlineStore`] encodes each module into a `data:` URL, so the host
//!   document is fully self-contained.
//! - [`MemoryStore`] mints opaque `blob:` locators and keeps the source so
//!   a host that can serve or register them looks it up by reference.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use uigen_core::traits::EphemeralStore;
use uigen_core::{EphemeralRef, Result};
use uuid::Uuid;

/// Store that mints `data:text/javascript;base64,...` references.
///
/// Identical sources share one reference, which stays live until every
/// mint of it has been released.
///
/// # Examples
///
/// ```
/// use uigen_core::traits::EphemeralStore;
/// use uigen_preview::InlineStore;
///
/// let mut store = InlineStore::new();
/// let reference = store.mint("/App.jsx", "export default 1;").unwrap();
/// assert!(reference.as_str().starts_with("data:text/javascript;base64,"));
/// assert_eq!(store.resolve(&reference), Some("export default 1;"));
/// ```
#[derive(Debug, Default)]
pub struct InlineStore {
    live: HashMap<EphemeralRef, (String, usize)>,
}

impl InlineStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EphemeralStore for InlineStore {
    fn mint(&mut self, module: &str, source: &str) -> Result<EphemeralRef> {
        let reference = EphemeralRef::new(format!(
            "data:text/javascript;base64,{}",
            STANDARD.encode(source)
        ));
        let entry = self
            .live
            .entry(reference.clone())
            .or_insert_with(|| (source.to_string(), 0));
        entry.1 += 1;
        tracing::trace!(module, bytes = source.len(), "minted inline reference");
        Ok(reference)
    }

    fn release(&mut self, reference: &EphemeralRef) {
        if let Some((_, count)) = self.live.get_mut(reference) {
            *count -= 1;
            if *count == 0 {
                self.live.remove(reference);
            }
        }
    }

    fn resolve(&self, reference: &EphemeralRef) -> Option<&str> {
        self.live.get(reference).map(|(source, _)| source.as_str())
    }

    fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// Store that mints `blob:{origin}/{uuid}` locators.
///
/// Every mint yields a fresh locator, even for identical sources.
///
/// # Examples
///
/// ```
/// use uigen_core::traits::EphemeralStore;
/// use uigen_preview::MemoryStore;
///
/// let mut store = MemoryStore::new("https://preview.local");
/// let a = store.mint("/App.jsx", "export default 1;").unwrap();
/// let b = store.mint("/App.jsx", "export default 1;").unwrap();
/// assert_ne!(a, b);
/// assert!(a.as_str().starts_with("blob:https://preview.local/"));
///
/// store.release(&a);
/// assert_eq!(store.live_count(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    origin: String,
    live: HashMap<EphemeralRef, Entry>,
}

#[derive(Debug)]
struct Entry {
    module: String,
    source: String,
}

impl MemoryStore {
    /// Default origin used in minted locators.
    pub const DEFAULT_ORIGIN: &'static str = "uigen";

    /// Creates a store minting locators under `origin`.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            live: HashMap::new(),
        }
    }

    /// Returns the origin embedded in minted locators.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns the module path a live reference was minted for.
    #[must_use]
    pub fn module_of(&self, reference: &EphemeralRef) -> Option<&str> {
        self.live.get(reference).map(|entry| entry.module.as_str())
    }

    /// Iterates over live references and their sources.
    pub fn iter(&self) -> impl Iterator<Item = (&EphemeralRef, &str)> {
        self.live
            .iter()
            .map(|(reference, entry)| (reference, entry.source.as_str()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ORIGIN)
    }
}

impl EphemeralStore for MemoryStore {
    fn mint(&mut self, module: &str, source: &str) -> Result<EphemeralRef> {
        let reference = EphemeralRef::new(format!("blob:{}/{}", self.origin, Uuid::new_v4()));
        self.live.insert(
            reference.clone(),
            Entry {
                module: module.to_string(),
                source: source.to_string(),
            },
        );
        tracing::trace!(module, %reference, "minted blob reference");
        Ok(reference)
    }

    fn release(&mut self, reference: &EphemeralRef) {
        self.live.remove(reference);
    }

    fn resolve(&self, reference: &EphemeralRef) -> Option<&str> {
        self.live.get(reference).map(|entry| entry.source.as_str())
    }

    fn live_count(&self) -> usize {
        self.live.len()
    }
}
