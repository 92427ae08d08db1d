//! Listing configuration
//!
//! Loaded from TOML with per-field defaults, so a config file only
//! needs to name what it changes. The fingerprint binds a stored cursor
//! to the settings that shaped it.

use crate::error::{LakewatchError, Result};
use crate::listing::filter::{NameFilter, DEFAULT_FILE_FILTER};
use lakewatch_logging::lakewatch_home;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Remote directory the walk starts from.
    pub root_path: String,
    /// Whether to descend into subdirectories.
    pub recurse: bool,
    /// Full-match regular expression applied to file base names.
    pub filter_pattern: String,
    /// Seconds between cycles in watch mode.
    pub poll_interval_secs: u64,
    /// Where the listing cursor is persisted.
    pub cursor_path: PathBuf,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            root_path: String::new(),
            recurse: true,
            filter_pattern: DEFAULT_FILE_FILTER.to_string(),
            poll_interval_secs: 30,
            cursor_path: lakewatch_home().join("cursor.json"),
        }
    }
}

impl ListingConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            LakewatchError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            LakewatchError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded listing config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let body = toml::to_string_pretty(self)
            .map_err(|e| LakewatchError::Config(format!("failed to serialize config: {e}")))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, body)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.root_path.is_empty() {
            return Err(LakewatchError::Config(
                "root_path must not be empty".to_string(),
            ));
        }
        NameFilter::new(&self.filter_pattern)?;
        Ok(())
    }

    /// Identity of the settings a cursor depends on. A change to any of
    /// them invalidates stored progress.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}\u{0}{}\u{0}{}",
            self.root_path, self.recurse, self.filter_pattern
        )
    }
}

/// Expand `${name}` references in a template from a variable map.
/// Unknown names are left in place so they stay visible in errors and
/// logs.
pub fn substitute(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}
