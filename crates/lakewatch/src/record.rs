//! Flow records and the sinks that consume them
//!
//! A listed entry becomes a flat attribute map keyed the way downstream
//! flow tooling expects. Timestamps render as ISO-8601 with a numeric
//! offset.

use crate::error::{LakewatchError, Result};
use crate::listing::orchestrator::RecordSink;
use crate::listing::types::FileEntry;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// One emitted record: a sorted attribute map describing a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowRecord {
    pub attributes: BTreeMap<String, String>,
}

impl FlowRecord {
    pub fn from_entry(entry: &FileEntry) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("filename".to_string(), entry.name.clone());
        attributes.insert("path".to_string(), entry.relative_path.clone());
        attributes.insert("relativePath".to_string(), entry.relative_path.clone());
        attributes.insert("absolute.path".to_string(), entry.absolute_path.clone());
        attributes.insert("file.owner".to_string(), entry.owner.clone());
        attributes.insert("file.group".to_string(), entry.group.clone());
        attributes.insert("file.permissions".to_string(), entry.permission.clone());
        attributes.insert(
            "file.lastModifiedTime".to_string(),
            format_millis(entry.modified_millis),
        );
        attributes.insert(
            "file.lastAccessTime".to_string(),
            format_millis(entry.accessed_millis),
        );
        attributes.insert(
            "file.blockSize".to_string(),
            entry.block_size_bytes.to_string(),
        );
        attributes.insert("file.length".to_string(), entry.size_bytes.to_string());
        Self { attributes }
    }
}

fn format_millis(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        None => millis.to_string(),
    }
}

/// Sink that writes each record as one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn deliver(&mut self, record: &FlowRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.writer, "{line}")
            .map_err(|e| LakewatchError::Delivery(format!("failed to write record: {e}")))?;
        self.writer
            .flush()
            .map_err(|e| LakewatchError::Delivery(format!("failed to flush records: {e}")))
    }
}

/// Sink that collects records in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub records: Vec<FlowRecord>,
}

impl RecordSink for BufferSink {
    fn deliver(&mut self, record: &FlowRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::types::EntryKind;

    fn entry() -> FileEntry {
        FileEntry {
            name: "report.csv".to_string(),
            absolute_path: "/data/sub".to_string(),
            relative_path: "/sub".to_string(),
            modified_millis: 1_700_000_000_000,
            accessed_millis: 1_700_000_100_000,
            size_bytes: 2048,
            block_size_bytes: 4096,
            child_count: 0,
            owner: "501".to_string(),
            group: "100".to_string(),
            permission: "644".to_string(),
            kind: EntryKind::File,
        }
    }

    #[test]
    fn record_carries_all_attributes() {
        let record = FlowRecord::from_entry(&entry());
        let attrs = &record.attributes;

        assert_eq!(attrs["filename"], "report.csv");
        assert_eq!(attrs["path"], "/sub");
        assert_eq!(attrs["relativePath"], "/sub");
        assert_eq!(attrs["absolute.path"], "/data/sub");
        assert_eq!(attrs["file.owner"], "501");
        assert_eq!(attrs["file.group"], "100");
        assert_eq!(attrs["file.permissions"], "644");
        assert_eq!(attrs["file.length"], "2048");
        assert_eq!(attrs["file.blockSize"], "4096");
        assert_eq!(attrs["file.lastModifiedTime"], "2023-11-14T22:13:20+0000");
        assert_eq!(attrs["file.lastAccessTime"], "2023-11-14T22:15:00+0000");
    }

    #[test]
    fn json_lines_sink_writes_one_object_per_line() {
        let mut buf = Vec::new();
        {
            let mut sink = JsonLinesSink::new(&mut buf);
            sink.deliver(&FlowRecord::from_entry(&entry())).unwrap();
            sink.deliver(&FlowRecord::from_entry(&entry())).unwrap();
        }

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: FlowRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.attributes["filename"], "report.csv");
    }
}
