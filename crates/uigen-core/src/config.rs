//! Configuration for the preview pipeline.
//!
//! A single [`PreviewConfig`] is shared by the transform engine (alias
//! prefix), preview assembly (entry point, module extensions, CDN), and the
//! reactive session (cache size, debounce window).
//!
//! # Examples
//!
//! ```
//! use uigen_core::PreviewConfig;
//!
//! let config = PreviewConfig::default();
//! assert_eq!(config.alias_prefix, "@/");
//! assert_eq!(config.entry_point, "/App");
//!
//! let custom = PreviewConfig::builder()
//!     .alias_prefix("~/")
//!     .tailwind(false)
//!     .build();
//! assert!(custom.validate().is_ok());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for transforming and assembling previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Import prefix that resolves to the virtual root.
    ///
    /// Default: `@/`
    pub alias_prefix: String,

    /// Extensionless path of the component entry point.
    ///
    /// Default: `/App`
    pub entry_point: String,

    /// Extensions tried, in order, when resolving a module path.
    ///
    /// Default: `.jsx`, `.tsx`, `.js`, `.ts`
    pub module_extensions: Vec<String>,

    /// Base URL for third-party package resolution.
    ///
    /// Default: `https://esm.sh`
    pub cdn_base: String,

    /// Version pinned for `react` and `react-dom`.
    ///
    /// Default: `19`
    pub react_version: String,

    /// Load the Tailwind play CDN in the host document.
    ///
    /// Default: true
    pub tailwind: bool,

    /// Number of transform results kept in the LRU cache.
    ///
    /// Default: 256
    pub cache_capacity: usize,

    /// Quiet period after the last relevant edit before rebuilding.
    ///
    /// Default: 150 ms
    pub debounce_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            alias_prefix: "@/".to_string(),
            entry_point: "/App".to_string(),
            module_extensions: vec![
                ".jsx".to_string(),
                ".tsx".to_string(),
                ".js".to_string(),
                ".ts".to_string(),
            ],
            cdn_base: "https://esm.sh".to_string(),
            react_version: "19".to_string(),
            tailwind: true,
            cache_capacity: 256,
            debounce_ms: 150,
        }
    }
}

impl PreviewConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> PreviewConfigBuilder {
        PreviewConfigBuilder::new()
    }

    /// Returns the debounce window as a [`Duration`].
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Lists the concrete paths a module specifier may resolve to, in
    /// lookup order: the path itself, each extension appended, then an
    /// `index` file inside the path for each extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use uigen_core::PreviewConfig;
    ///
    /// let config = PreviewConfig::default();
    /// let candidates = config.module_candidates("/components/Button");
    /// assert_eq!(candidates[0], "/components/Button");
    /// assert_eq!(candidates[1], "/components/Button.jsx");
    /// assert!(candidates.contains(&"/components/Button/index.tsx".to_string()));
    /// ```
    #[must_use]
    pub fn module_candidates(&self, specifier: &str) -> Vec<String> {
        let trimmed = specifier.trim_end_matches('/');
        let mut candidates = Vec::with_capacity(1 + self.module_extensions.len() * 2);
        candidates.push(specifier.to_string());
        for ext in &self.module_extensions {
            candidates.push(format!("{trimmed}{ext}"));
        }
        for ext in &self.module_extensions {
            candidates.push(format!("{trimmed}/index{ext}"));
        }
        candidates
    }

    /// Paths that would satisfy the entry point.
    #[must_use]
    pub fn entry_candidates(&self) -> Vec<String> {
        self.module_candidates(&self.entry_point)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if:
    /// - The alias prefix is empty, does not end with `/`, or starts with `.` or `/`
    /// - The entry point is not absolute
    /// - A module extension does not start with `.`
    /// - The CDN base is not an http(s) URL or ends with `/`
    /// - The cache capacity is zero
    pub fn validate(&self) -> Result<()> {
        if self.alias_prefix.is_empty() || !self.alias_prefix.ends_with('/') {
            return Err(config_error(format!(
                "alias prefix '{}' must be non-empty and end with '/'",
                self.alias_prefix
            )));
        }

        if self.alias_prefix.starts_with('.') || self.alias_prefix.starts_with('/') {
            return Err(config_error(format!(
                "alias prefix '{}' would shadow relative or absolute imports",
                self.alias_prefix
            )));
        }

        if !self.entry_point.starts_with('/') {
            return Err(config_error(format!(
                "entry point '{}' must be an absolute path",
                self.entry_point
            )));
        }

        if let Some(ext) = self.module_extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(config_error(format!(
                "module extension '{ext}' must start with '.'"
            )));
        }

        if !(self.cdn_base.starts_with("https://") || self.cdn_base.starts_with("http://")) {
            return Err(config_error(format!(
                "CDN base '{}' must be an http(s) URL",
                self.cdn_base
            )));
        }

        if self.cdn_base.ends_with('/') {
            return Err(config_error("CDN base must not end with '/'"));
        }

        if self.cache_capacity == 0 {
            return Err(config_error("cache capacity must be greater than zero"));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::ConfigError {
        message: message.into(),
    }
}

/// Builder for [`PreviewConfig`].
#[derive(Debug, Clone, Default)]
pub struct PreviewConfigBuilder {
    config: PreviewConfig,
}

impl PreviewConfigBuilder {
    /// Creates a builder initialized with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alias prefix.
    #[must_use]
    pub fn alias_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.alias_prefix = prefix.into();
        self
    }

    /// Sets the entry-point path.
    #[must_use]
    pub fn entry_point(mut self, path: impl Into<String>) -> Self {
        self.config.entry_point = path.into();
        self
    }

    /// Replaces the module extension list.
    #[must_use]
    pub fn module_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.module_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the CDN base URL.
    #[must_use]
    pub fn cdn_base(mut self, url: impl Into<String>) -> Self {
        self.config.cdn_base = url.into();
        self
    }

    /// Sets the pinned React version.
    #[must_use]
    pub fn react_version(mut self, version: impl Into<String>) -> Self {
        self.config.react_version = version.into();
        self
    }

    /// Enables or disables the Tailwind CDN.
    #[must_use]
    pub const fn tailwind(mut self, enabled: bool) -> Self {
        self.config.tailwind = enabled;
        self
    }

    /// Sets the transform cache capacity.
    #[must_use]
    pub const fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Sets the debounce window.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn debounce(mut self, window: Duration) -> Self {
        self.config.debounce_ms = window.as_millis() as u64;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> PreviewConfig {
        self.config
    }
}
