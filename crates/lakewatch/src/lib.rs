//! Lakewatch: incremental recursive listing for data-lake style trees
//!
//! The engine walks a remote directory tree, emits a record for each
//! file it has not seen before, and remembers its progress as a
//! modification-time watermark plus the entries emitted at exactly that
//! instant. Cycles are atomic: a failed walk, delivery, or cursor save
//! leaves the stored cursor untouched and the whole batch is delivered
//! again next time.

pub mod cli;
pub mod config;
pub mod error;
pub mod listing;
pub mod record;
pub mod remote;
pub mod transfer;

pub use config::ListingConfig;
pub use error::{LakewatchError, Result};
pub use listing::{CursorStore, FileCursorStore, Lister, ListingCursor, RecordSink};
pub use record::FlowRecord;
pub use remote::{LocalFs, MemoryFs, RemoteFs};
