//! Watermark cursor and its persistence
//!
//! The cursor records the highest modification instant emitted so far
//! plus the identities of entries emitted at exactly that instant. An
//! entry counts as new when its instant is strictly greater than the
//! watermark, or equal to it and not in the tie set. Keeping the tie
//! set small and the comparison strict means neither duplicates nor
//! starvation for files sharing an instant.

use crate::error::{LakewatchError, Result};
use crate::listing::types::{EntryId, FileEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bumped whenever the persisted layout changes shape.
pub const CURSOR_FORMAT_VERSION: u32 = 1;

/// Progress marker for incremental listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCursor {
    /// Highest modification instant emitted so far, in epoch millis.
    /// `i64::MIN` means nothing has been emitted yet.
    pub watermark_millis: i64,
    /// Identities emitted at exactly the watermark instant.
    pub emitted_at_watermark: HashSet<EntryId>,
}

impl Default for ListingCursor {
    fn default() -> Self {
        Self::empty()
    }
}

impl ListingCursor {
    pub fn empty() -> Self {
        Self {
            watermark_millis: i64::MIN,
            emitted_at_watermark: HashSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.watermark_millis == i64::MIN
    }

    /// Whether an entry has not been emitted under this cursor.
    pub fn is_new(&self, entry: &FileEntry) -> bool {
        if entry.modified_millis > self.watermark_millis {
            return true;
        }
        entry.modified_millis == self.watermark_millis
            && !self.emitted_at_watermark.contains(&entry.id())
    }

    /// Fold a fully emitted batch into the cursor.
    ///
    /// The watermark moves to the highest instant in the batch and the
    /// tie set becomes the ids at that instant. When the watermark does
    /// not move, the previous tie set is kept and extended, so entries
    /// emitted in earlier cycles at the same instant stay excluded.
    pub fn advance(&mut self, emitted: &[FileEntry]) {
        let Some(max_millis) = emitted.iter().map(|e| e.modified_millis).max() else {
            return;
        };
        if max_millis > self.watermark_millis {
            self.watermark_millis = max_millis;
            self.emitted_at_watermark.clear();
        }
        for entry in emitted {
            if entry.modified_millis == self.watermark_millis {
                self.emitted_at_watermark.insert(entry.id());
            }
        }
    }
}

/// Durable storage for the cursor.
///
/// A load that cannot distinguish "no cursor" from "broken cursor" is
/// dangerous: treating a broken cursor as empty would re-emit the whole
/// tree. Load therefore fails loudly on anything but a cleanly missing
/// cursor or a fingerprint mismatch.
pub trait CursorStore {
    fn load(&self) -> Result<ListingCursor>;
    fn save(&mut self, cursor: &ListingCursor) -> Result<()>;
    fn reset(&mut self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedCursor {
    version: u32,
    fingerprint: String,
    watermark_millis: i64,
    emitted_at_watermark: Vec<String>,
}

/// Cursor store backed by a JSON file.
///
/// Saves write a temp sibling and rename it into place, so a crash
/// mid-save leaves the previous cursor intact. The fingerprint encodes
/// the listing configuration; a stored cursor with a different
/// fingerprint belongs to a different listing and is discarded.
pub struct FileCursorStore {
    path: PathBuf,
    fingerprint: String,
}

impl FileCursorStore {
    pub fn new(path: impl Into<PathBuf>, fingerprint: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fingerprint: fingerprint.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self) -> Result<ListingCursor> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored cursor, starting empty");
                return Ok(ListingCursor::empty());
            }
            Err(e) => {
                return Err(LakewatchError::CursorPersistence(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        let persisted: PersistedCursor = serde_json::from_str(&raw).map_err(|e| {
            LakewatchError::CursorPersistence(format!(
                "corrupt cursor at {}: {e}",
                self.path.display()
            ))
        })?;

        if persisted.version != CURSOR_FORMAT_VERSION {
            return Err(LakewatchError::CursorPersistence(format!(
                "unsupported cursor version {} at {}",
                persisted.version,
                self.path.display()
            )));
        }

        if persisted.fingerprint != self.fingerprint {
            info!(
                path = %self.path.display(),
                "listing configuration changed, discarding stored cursor"
            );
            return Ok(ListingCursor::empty());
        }

        let mut emitted_at_watermark = HashSet::with_capacity(persisted.emitted_at_watermark.len());
        for encoded in &persisted.emitted_at_watermark {
            let id = EntryId::decode(encoded).ok_or_else(|| {
                LakewatchError::CursorPersistence(format!(
                    "undecodable entry id in cursor at {}",
                    self.path.display()
                ))
            })?;
            emitted_at_watermark.insert(id);
        }

        Ok(ListingCursor {
            watermark_millis: persisted.watermark_millis,
            emitted_at_watermark,
        })
    }

    fn save(&mut self, cursor: &ListingCursor) -> Result<()> {
        let mut emitted_at_watermark: Vec<String> = cursor
            .emitted_at_watermark
            .iter()
            .map(EntryId::encode)
            .collect();
        // Stable file contents regardless of hash iteration order.
        emitted_at_watermark.sort();

        let persisted = PersistedCursor {
            version: CURSOR_FORMAT_VERSION,
            fingerprint: self.fingerprint.clone(),
            watermark_millis: cursor.watermark_millis,
            emitted_at_watermark,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LakewatchError::CursorPersistence(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&persisted)?;
        fs::write(&tmp, body).map_err(|e| {
            LakewatchError::CursorPersistence(format!("failed to write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            LakewatchError::CursorPersistence(format!(
                "failed to replace {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                warn!(path = %self.path.display(), "cursor reset, next cycle lists everything");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LakewatchError::CursorPersistence(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// In-memory cursor store with save failure injection for tests.
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    cursor: ListingCursor,
    pub fail_next_save: bool,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> &ListingCursor {
        &self.cursor
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> Result<ListingCursor> {
        Ok(self.cursor.clone())
    }

    fn save(&mut self, cursor: &ListingCursor) -> Result<()> {
        if self.fail_next_save {
            self.fail_next_save = false;
            return Err(LakewatchError::CursorPersistence(
                "injected save failure".to_string(),
            ));
        }
        self.cursor = cursor.clone();
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.cursor = ListingCursor::empty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::types::{EntryKind, FileEntry};

    fn entry(name: &str, modified_millis: i64) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            absolute_path: "/root".to_string(),
            relative_path: "./".to_string(),
            modified_millis,
            accessed_millis: modified_millis,
            size_bytes: 1,
            block_size_bytes: 4096,
            child_count: 0,
            owner: "501".to_string(),
            group: "100".to_string(),
            permission: "644".to_string(),
            kind: EntryKind::File,
        }
    }

    #[test]
    fn empty_cursor_accepts_everything() {
        let cursor = ListingCursor::empty();
        assert!(cursor.is_new(&entry("a.csv", i64::MIN)));
        assert!(cursor.is_new(&entry("b.csv", 0)));
    }

    #[test]
    fn strictly_older_entries_are_excluded() {
        let mut cursor = ListingCursor::empty();
        cursor.advance(&[entry("a.csv", 100)]);

        assert!(!cursor.is_new(&entry("old.csv", 99)));
        assert!(!cursor.is_new(&entry("a.csv", 100)));
        assert!(cursor.is_new(&entry("b.csv", 100)));
        assert!(cursor.is_new(&entry("c.csv", 101)));
    }

    #[test]
    fn advance_keeps_tie_set_when_watermark_holds() {
        let mut cursor = ListingCursor::empty();
        cursor.advance(&[entry("a.csv", 100)]);
        cursor.advance(&[entry("b.csv", 100)]);

        assert_eq!(cursor.watermark_millis, 100);
        assert!(!cursor.is_new(&entry("a.csv", 100)));
        assert!(!cursor.is_new(&entry("b.csv", 100)));
    }

    #[test]
    fn advance_clears_tie_set_when_watermark_moves() {
        let mut cursor = ListingCursor::empty();
        cursor.advance(&[entry("a.csv", 100)]);
        cursor.advance(&[entry("b.csv", 200)]);

        assert_eq!(cursor.watermark_millis, 200);
        assert_eq!(cursor.emitted_at_watermark.len(), 1);
        assert!(cursor.emitted_at_watermark.contains(&entry("b.csv", 200).id()));
    }

    #[test]
    fn advance_on_empty_batch_is_a_no_op() {
        let mut cursor = ListingCursor::empty();
        cursor.advance(&[entry("a.csv", 100)]);
        let before = cursor.clone();
        cursor.advance(&[]);
        assert_eq!(cursor, before);
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor.json");

        let mut cursor = ListingCursor::empty();
        cursor.advance(&[entry("a.csv", 100), entry("b.csv", 100)]);

        let mut store = FileCursorStore::new(&path, "fp-1");
        store.save(&cursor).unwrap();
        assert_eq!(store.load().unwrap(), cursor);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCursorStore::new(dir.path().join("missing.json"), "fp-1");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error_not_an_empty_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor.json");
        fs::write(&path, "not json").unwrap();

        let store = FileCursorStore::new(&path, "fp-1");
        assert!(matches!(
            store.load().unwrap_err(),
            LakewatchError::CursorPersistence(_)
        ));
    }

    #[test]
    fn fingerprint_mismatch_discards_the_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor.json");

        let mut cursor = ListingCursor::empty();
        cursor.advance(&[entry("a.csv", 100)]);

        let mut store = FileCursorStore::new(&path, "fp-1");
        store.save(&cursor).unwrap();

        let other = FileCursorStore::new(&path, "fp-2");
        assert!(other.load().unwrap().is_empty());
    }

    #[test]
    fn version_mismatch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor.json");
        let body = serde_json::json!({
            "version": 99,
            "fingerprint": "fp-1",
            "watermarkMillis": 100,
            "emittedAtWatermark": []
        });
        fs::write(&path, body.to_string()).unwrap();

        let store = FileCursorStore::new(&path, "fp-1");
        assert!(matches!(
            store.load().unwrap_err(),
            LakewatchError::CursorPersistence(_)
        ));
    }

    #[test]
    fn reset_removes_the_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor.json");

        let mut store = FileCursorStore::new(&path, "fp-1");
        store.save(&ListingCursor::empty()).unwrap();
        store.reset().unwrap();
        assert!(!path.exists());
        store.reset().unwrap();
    }
}
