//! Remote file-system capability set
//!
//! [`RemoteFs`] is the seam between the listing/transfer core and the
//! pluggable store client. Authentication, retry policy, and the wire
//! protocol live behind the implementation; the core only sees the
//! capability set.
//!
//! - [`local::LocalFs`] maps the capabilities onto a local directory
//!   prefix for single-node deployments and integration tests.
//! - [`memory::MemoryFs`] is an in-memory fake with scripted listing
//!   order and failure injection for unit tests.

pub mod local;
pub mod memory;

use crate::error::Result;
use crate::listing::types::EntryKind;
use std::io::Read;

pub use local::LocalFs;
pub use memory::MemoryFs;

/// Raw status of one child entry, as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStatus {
    /// Base name of the entry within its directory
    pub name: String,
    pub kind: EntryKind,
    /// Last modification time, epoch milliseconds
    pub modified_millis: i64,
    /// Last access time, epoch milliseconds
    pub accessed_millis: i64,
    pub size_bytes: u64,
    pub block_size_bytes: u64,
    /// Number of children (directories only; 0 for files)
    pub child_count: u64,
    pub owner: String,
    pub group: String,
    pub permission: String,
}

/// Capability set of the remote hierarchical store.
pub trait RemoteFs {
    /// List the immediate children of a directory.
    fn list_children(&self, path: &str) -> Result<Vec<RemoteStatus>>;

    /// Open a file for streamed reading.
    fn open_for_read(&self, path: &str) -> Result<Box<dyn Read>>;

    /// Create an empty file, replacing any existing content.
    fn create_empty(&self, path: &str) -> Result<()>;

    /// Append bytes to an existing file.
    fn append(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Concatenate source files into a destination, consuming the sources.
    fn concat(&self, sources: &[String], dest: &str) -> Result<()>;

    /// Delete a file.
    fn delete(&self, path: &str) -> Result<()>;
}
