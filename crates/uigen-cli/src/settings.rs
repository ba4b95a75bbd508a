//! Loading [`PreviewConfig`] from TOML.
//!
//! Lookup order:
//! 1. the file passed with `--config` (must exist)
//! 2. `uigen/config.toml` under the platform config directory
//!    (`~/.config` on Linux, `~/Library/Application Support` on macOS,
//!    `%APPDATA%` on Windows), used only if present
//! 3. built-in defaults
//!
//! ```toml
//! alias_prefix = "@/"
//! entry_point = "/App"
//! tailwind = false
//! debounce_ms = 100
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uigen_core::PreviewConfig;

/// Default configuration file location, if the platform has one.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("uigen").join("config.toml"))
}

/// Parses and validates a TOML configuration document.
///
/// Missing keys take their default values.
pub fn parse_config(text: &str) -> Result<PreviewConfig> {
    let config: PreviewConfig = toml::from_str(text).context("failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Resolves the effective configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<PreviewConfig> {
    if let Some(path) = explicit {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        return parse_config(&text);
    }

    let Some(path) = default_config_path().filter(|p| p.is_file()) else {
        debug!("config file not found, using defaults");
        return Ok(PreviewConfig::default());
    };

    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    parse_config(&text)
}
