//! Incremental recursive listing
//!
//! The walker enumerates a remote tree, the cursor remembers how far a
//! previous cycle got, and the orchestrator ties the two together with
//! downstream delivery. A cycle either completes fully or leaves the
//! cursor untouched.

pub mod cursor;
pub mod filter;
pub mod orchestrator;
pub mod types;
pub mod walker;

pub use cursor::{CursorStore, FileCursorStore, ListingCursor, MemoryCursorStore};
pub use filter::{NameFilter, DEFAULT_FILE_FILTER};
pub use orchestrator::{CycleOutcome, Lister, RecordSink};
pub use types::{CycleStats, EntryId, EntryKind, FileEntry};
pub use walker::TreeWalker;
