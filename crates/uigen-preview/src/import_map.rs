//! Browser import maps and CDN resolution of package specifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uigen_core::{PreviewConfig, Result};

/// Specifiers mapped in every preview, whether or not a file imports them.
pub const RUNTIME_SPECIFIERS: [&str; 4] =
    ["react", "react-dom", "react-dom/client", "react/jsx-runtime"];

/// Packages that share the page's single React instance.
const PINNED_PACKAGES: [&str; 2] = ["react", "react-dom"];

/// A browser import map, serialized as `{"imports": {...}}`.
///
/// # Examples
///
/// ```
/// use uigen_preview::ImportMap;
///
/// let mut map = ImportMap::new();
/// map.insert("/App", "blob:uigen/1");
/// assert_eq!(map.get("/App"), Some("blob:uigen/1"));
/// assert_eq!(map.to_json().unwrap(), r#"{"imports":{"/App":"blob:uigen/1"}}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMap {
    /// Specifier to URL
    pub imports: BTreeMap<String, String>,
}

impl ImportMap {
    /// Creates an empty import map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `specifier` to `url`, replacing any earlier mapping.
    pub fn insert(&mut self, specifier: impl Into<String>, url: impl Into<String>) {
        self.imports.insert(specifier.into(), url.into());
    }

    /// Returns the URL for `specifier`.
    #[must_use]
    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.imports.get(specifier).map(String::as_str)
    }

    /// Returns `true` if `specifier` is mapped.
    #[must_use]
    pub fn contains(&self, specifier: &str) -> bool {
        self.imports.contains_key(specifier)
    }

    /// Number of mapped specifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.imports.len()
    }

    /// Returns `true` if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Iterates over `(specifier, url)` pairs in specifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.imports.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A bare package specifier split into its parts.
///
/// # Examples
///
/// ```
/// use uigen_preview::PackageSpecifier;
///
/// let spec = PackageSpecifier::parse("@radix-ui/react-dialog@1.1/dist").unwrap();
/// assert_eq!(spec.name, "@radix-ui/react-dialog");
/// assert_eq!(spec.version, Some("1.1"));
/// assert_eq!(spec.subpath, Some("dist"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageSpecifier<'a> {
    /// Package name, including the scope
    pub name: &'a str,
    /// Version or range after `@`
    pub version: Option<&'a str>,
    /// Path inside the package
    pub subpath: Option<&'a str>,
}

impl<'a> PackageSpecifier<'a> {
    /// Parses `specifier`. Returns `None` for empty names or a scope
    /// without a package.
    #[must_use]
    pub fn parse(specifier: &'a str) -> Option<Self> {
        let name_segments = if specifier.starts_with('@') { 2 } else { 1 };

        let mut split = specifier.len();
        let mut seen = 0;
        for (idx, byte) in specifier.bytes().enumerate() {
            if byte == b'/' {
                seen += 1;
                if seen == name_segments {
                    split = idx;
                    break;
                }
            }
        }
        if name_segments == 2 && seen == 0 {
            return None;
        }

        let (head, rest) = specifier.split_at(split);
        let subpath = rest.strip_prefix('/').filter(|sub| !sub.is_empty());

        // The version marker is the first '@' after the scope's leading one.
        let search_from = usize::from(head.starts_with('@'));
        let (name, version) = match head[search_from..].find('@') {
            Some(at) => {
                let at = at + search_from;
                (&head[..at], Some(&head[at + 1..]).filter(|v| !v.is_empty()))
            }
            None => (head, None),
        };

        if name.is_empty() || name == "@" || name.ends_with('/') {
            return None;
        }

        Some(Self {
            name,
            version,
            subpath,
        })
    }

    /// Returns `true` for `react` and `react-dom`.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        PINNED_PACKAGES.contains(&self.name)
    }
}

/// Builds the CDN URL for a bare module specifier.
///
/// `react` and `react-dom` always use the configured React version. Other
/// packages keep the version written in the specifier and are told to use
/// the page's React instead of bundling their own.
///
/// # Examples
///
/// ```
/// use uigen_core::PreviewConfig;
/// use uigen_preview::cdn_url;
///
/// let config = PreviewConfig::default();
/// assert_eq!(cdn_url(&config, "react-dom/client"), "https://esm.sh/react-dom@19/client");
/// assert_eq!(
///     cdn_url(&config, "lucide-react@0.400"),
///     "https://esm.sh/lucide-react@0.400?external=react,react-dom"
/// );
/// ```
#[must_use]
pub fn cdn_url(config: &PreviewConfig, specifier: &str) -> String {
    let Some(spec) = PackageSpecifier::parse(specifier) else {
        return format!("{}/{specifier}", config.cdn_base);
    };

    let mut url = format!("{}/{}", config.cdn_base, spec.name);
    let version = if spec.is_pinned() {
        Some(config.react_version.as_str())
    } else {
        spec.version
    };
    if let Some(version) = version {
        url.push('@');
        url.push_str(version);
    }
    if let Some(subpath) = spec.subpath {
        url.push('/');
        url.push_str(subpath);
    }
    if !spec.is_pinned() {
        url.push_str("?external=react,react-dom");
    }
    url
}

/// Builds the URL for a stylesheet shipped inside a package.
#[must_use]
pub fn cdn_stylesheet_url(config: &PreviewConfig, specifier: &str) -> String {
    format!("{}/{specifier}", config.cdn_base)
}
