//! File name filtering
//!
//! A single regex rule applied to the base name of FILE entries only.
//! Directories are never name-filtered: hiding a directory would hide
//! every file below it, so descent is controlled solely by the recurse
//! flag.

use crate::error::{LakewatchError, Result};
use regex::Regex;

/// Default filter: every name not beginning with a dot.
pub const DEFAULT_FILE_FILTER: &str = "[^\\.].*";

/// Compiled file name filter.
#[derive(Debug, Clone)]
pub struct NameFilter {
    regex: Regex,
}

impl NameFilter {
    /// Compile a filter pattern. A bad pattern is a configuration error
    /// surfaced here, before any cycle runs.
    pub fn new(pattern: &str) -> Result<Self> {
        // Anchored: the pattern must match the whole base name.
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            LakewatchError::Pattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, base_name: &str) -> bool {
        self.regex.is_match(base_name)
    }
}
