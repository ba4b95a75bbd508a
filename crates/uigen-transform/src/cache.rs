//! Transform result caching.
//!
//! Results are keyed by the file path together with a BLAKE3 hash of the
//! source text, so an unchanged file is never transformed twice and an
//! edit invalidates exactly one entry. Failures are cached as well: a
//! broken file stays broken until its text changes.
//!
//! # Examples
//!
//! ```
//! use std::num::NonZeroUsize;
//! use uigen_files::FilePath;
//! use uigen_transform::{CacheKey, TransformCache};
//!
//! let cache = TransformCache::new(NonZeroUsize::new(16).unwrap());
//! let path = FilePath::new("/App.jsx").unwrap();
//! let key = CacheKey::new(&path, "export default 1;");
//! assert!(!cache.contains(&key));
//! ```

use crate::engine::TransformResult;
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use uigen_files::FilePath;

/// Cache key for a transformed file.
///
/// # Examples
///
/// ```
/// use uigen_files::FilePath;
/// use uigen_transform::CacheKey;
///
/// let path = FilePath::new("/App.jsx").unwrap();
/// assert_eq!(CacheKey::new(&path, "a"), CacheKey::new(&path, "a"));
/// assert_ne!(CacheKey::new(&path, "a"), CacheKey::new(&path, "b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    path: FilePath,
    hash: String,
}

impl CacheKey {
    /// Creates the key for `source` stored at `path`.
    #[must_use]
    pub fn new(path: &FilePath, source: &str) -> Self {
        Self {
            path: path.clone(),
            hash: blake3::hash(source.as_bytes()).to_hex().to_string(),
        }
    }

    /// Returns the file path part of the key.
    #[must_use]
    pub const fn path(&self) -> &FilePath {
        &self.path
    }

    /// Returns the hex-encoded content hash.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.path, &self.hash[..12.min(self.hash.len())])
    }
}

/// Hit and miss counters for a [`TransformCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that required a transform
    pub misses: u64,
    /// Entries currently stored
    pub entries: usize,
    /// Maximum number of entries
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of transform results.
pub struct TransformCache {
    entries: LruCache<CacheKey, TransformResult>,
    hits: u64,
    misses: u64,
}

impl std::fmt::Debug for TransformCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

impl TransformCache {
    /// Creates an empty cache holding at most `capacity` results.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Looks up a result, counting the hit or miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<TransformResult> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
            tracing::trace!(%key, "transform cache hit");
        } else {
            self.misses += 1;
        }
        found
    }

    /// Stores a result, evicting the least recently used entry when full.
    pub fn insert(&mut self, key: CacheKey, result: TransformResult) {
        if let Some((evicted, _)) = self.entries.push(key, result) {
            tracing::trace!(key = %evicted, "transform cache eviction");
        }
    }

    /// Returns `true` if `key` is cached. Does not touch LRU order.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains(key)
    }

    /// Drops every entry for `path`, whatever its content hash.
    pub fn invalidate(&mut self, path: &FilePath) -> usize {
        let stale: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.path() == path)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            self.entries.pop(key);
        }
        stale.len()
    }

    /// Removes all entries. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        tracing::debug!("transform cache cleared");
    }

    /// Returns the number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Returns the current counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.len(),
            capacity: self.capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TransformedModule;
    use std::sync::Arc;
    use uigen_core::SyntaxError;

    fn cache(capacity: usize) -> TransformCache {
        TransformCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn path(p: &str) -> FilePath {
        FilePath::new(p).unwrap()
    }

    fn ok(p: &str) -> TransformResult {
        Ok(Arc::new(TransformedModule::passthrough(path(p), "x")))
    }

    #[test]
    fn test_key_depends_on_path_and_content() {
        let a = CacheKey::new(&path("/a.jsx"), "same");
        let b = CacheKey::new(&path("/b.jsx"), "same");
        assert_ne!(a, b);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash().len(), 64);
    }

    #[test]
    fn test_hit_and_miss_counting() {
        let mut cache = cache(4);
        let key = CacheKey::new(&path("/a.jsx"), "x");

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), ok("/a.jsx"));
        assert!(cache.get(&key).is_some());
        assert!(cache.get(&key).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failures_are_cached() {
        let mut cache = cache(4);
        let key = CacheKey::new(&path("/a.jsx"), "<div");
        cache.insert(key.clone(), Err(SyntaxError::new("/a.jsx", "Unterminated JSX tag")));
        assert!(cache.get(&key).unwrap().is_err());
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = cache(2);
        let k1 = CacheKey::new(&path("/1.jsx"), "1");
        let k2 = CacheKey::new(&path("/2.jsx"), "2");
        let k3 = CacheKey::new(&path("/3.jsx"), "3");

        cache.insert(k1.clone(), ok("/1.jsx"));
        cache.insert(k2.clone(), ok("/2.jsx"));
        assert!(cache.get(&k1).is_some());
        cache.insert(k3.clone(), ok("/3.jsx"));

        assert!(cache.contains(&k1));
        assert!(!cache.contains(&k2));
        assert!(cache.contains(&k3));
    }

    #[test]
    fn test_invalidate_path() {
        let mut cache = cache(8);
        cache.insert(CacheKey::new(&path("/a.jsx"), "v1"), ok("/a.jsx"));
        cache.insert(CacheKey::new(&path("/a.jsx"), "v2"), ok("/a.jsx"));
        cache.insert(CacheKey::new(&path("/b.jsx"), "v1"), ok("/b.jsx"));

        assert_eq!(cache.invalidate(&path("/a.jsx")), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let mut cache = cache(2);
        let key = CacheKey::new(&path("/a.jsx"), "x");
        let _ = cache.get(&key);
        cache.insert(key, ok("/a.jsx"));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_empty_stats_hit_rate() {
        assert!(CacheStats::default().hit_rate().abs() < f64::EPSILON);
    }
}
