//! Core types for the listing engine
//!
//! A [`FileEntry`] is a metadata snapshot of one remote file, as distinct
//! from its content. Identity for cursor/dedup purposes is the pair
//! (absolute_path, name); two entries with the same identity but different
//! modification instants are the same file at different revisions.

use crate::remote::RemoteStatus;
use serde::{Deserialize, Serialize};

/// Kind of a remote entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Identity of a file for dedup purposes: containing directory + base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId {
    pub absolute_path: String,
    pub name: String,
}

impl EntryId {
    pub fn new(absolute_path: &str, name: &str) -> Self {
        Self {
            absolute_path: absolute_path.to_string(),
            name: name.to_string(),
        }
    }

    /// Encode as a single persisted-cursor key. NUL cannot appear in
    /// store paths, so it is a safe separator.
    pub fn encode(&self) -> String {
        format!("{}\u{0}{}", self.absolute_path, self.name)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (absolute_path, name) = raw.split_once('\u{0}')?;
        Some(Self::new(absolute_path, name))
    }
}

/// A file discovered by the tree walker. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Base name of the file (no path separators)
    pub name: String,
    /// Fully qualified remote path of the containing directory
    pub absolute_path: String,
    /// Containing directory relative to the scan root; "./" at the root
    pub relative_path: String,
    /// Last modification time (epoch milliseconds, store-assigned)
    pub modified_millis: i64,
    /// Last access time (epoch milliseconds, store-assigned)
    pub accessed_millis: i64,
    /// File length in bytes
    pub size_bytes: u64,
    /// Store block size in bytes
    pub block_size_bytes: u64,
    /// Number of children (directories only; 0 for files)
    pub child_count: u64,
    /// Owner identity string, store-defined format
    pub owner: String,
    /// Group identity string, store-defined format
    pub group: String,
    /// Permission string, store-defined format
    pub permission: String,
    pub kind: EntryKind,
}

impl FileEntry {
    /// Build an entry from a raw remote status plus the paths computed
    /// during the walk.
    pub fn from_status(status: RemoteStatus, absolute_path: &str, relative_path: String) -> Self {
        Self {
            name: status.name,
            absolute_path: absolute_path.to_string(),
            relative_path,
            modified_millis: status.modified_millis,
            accessed_millis: status.accessed_millis,
            size_bytes: status.size_bytes,
            block_size_bytes: status.block_size_bytes,
            child_count: status.child_count,
            owner: status.owner,
            group: status.group,
            permission: status.permission,
            kind: status.kind,
        }
    }

    pub fn id(&self) -> EntryId {
        EntryId::new(&self.absolute_path, &self.name)
    }
}

/// Statistics from one listing cycle
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleStats {
    /// Files returned by the walk (post name-filter, pre cursor-filter)
    pub files_listed: u64,
    /// Files that survived the cursor filter and were handed downstream
    pub files_emitted: u64,
    /// Duration of the whole cycle in milliseconds
    pub duration_ms: u64,
}
