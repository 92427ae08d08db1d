//! Local directory implementation of the remote capability set
//!
//! Maps store paths onto a local directory prefix. Useful for
//! single-node deployments that stage a lake directory on a mounted
//! filesystem, and for integration tests that need realistic trees.

use super::{RemoteFs, RemoteStatus};
use crate::error::{LakewatchError, Result};
use crate::listing::types::EntryKind;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct LocalFs {
    prefix: PathBuf,
}

impl LocalFs {
    /// Store paths are resolved under `prefix`; a prefix of "/" makes
    /// store paths and local paths identical.
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.prefix.join(path.trim_start_matches('/'))
    }
}

impl RemoteFs for LocalFs {
    fn list_children(&self, path: &str) -> Result<Vec<RemoteStatus>> {
        let dir = self.resolve(path);
        let remote_err = |source| LakewatchError::Remote {
            path: path.to_string(),
            source,
        };

        let mut children = Vec::new();
        for entry in fs::read_dir(&dir).map_err(remote_err)? {
            let entry = entry.map_err(remote_err)?;
            let metadata = entry.metadata().map_err(remote_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();

            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let child_count = if metadata.is_dir() {
                fs::read_dir(entry.path())
                    .map(|rd| rd.count() as u64)
                    .unwrap_or(0)
            } else {
                0
            };

            children.push(RemoteStatus {
                name,
                kind,
                modified_millis: system_time_millis(metadata.modified().ok()),
                accessed_millis: system_time_millis(metadata.accessed().ok()),
                size_bytes: metadata.len(),
                block_size_bytes: block_size(&metadata),
                child_count,
                owner: owner_id(&metadata),
                group: group_id(&metadata),
                permission: permission_string(&metadata),
            });
        }

        // readdir order is platform-dependent; sort for a stable listing.
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn open_for_read(&self, path: &str) -> Result<Box<dyn Read>> {
        let file = File::open(self.resolve(path)).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                LakewatchError::NotFound(path.to_string())
            } else {
                LakewatchError::Io(e)
            }
        })?;
        Ok(Box::new(file))
    }

    fn create_empty(&self, path: &str) -> Result<()> {
        let local = self.resolve(path);
        if let Some(parent) = local.parent() {
            fs::create_dir_all(parent)?;
        }
        File::create(local)?;
        Ok(())
    }

    fn append(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(self.resolve(path))?;
        file.write_all(bytes)?;
        Ok(())
    }

    fn concat(&self, sources: &[String], dest: &str) -> Result<()> {
        self.create_empty(dest)?;
        let mut out = OpenOptions::new().append(true).open(self.resolve(dest))?;
        for source in sources {
            let mut reader = File::open(self.resolve(source))?;
            io::copy(&mut reader, &mut out)?;
        }
        // Store concat semantics: sources are consumed.
        for source in sources {
            fs::remove_file(self.resolve(source))?;
        }
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        fs::remove_file(self.resolve(path))?;
        Ok(())
    }
}

fn system_time_millis(time: Option<SystemTime>) -> i64 {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(unix)]
fn owner_id(metadata: &fs::Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    metadata.uid().to_string()
}

#[cfg(not(unix))]
fn owner_id(_metadata: &fs::Metadata) -> String {
    String::new()
}

#[cfg(unix)]
fn group_id(metadata: &fs::Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    metadata.gid().to_string()
}

#[cfg(not(unix))]
fn group_id(_metadata: &fs::Metadata) -> String {
    String::new()
}

#[cfg(unix)]
fn permission_string(metadata: &fs::Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    format!("{:o}", metadata.mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_string(_metadata: &fs::Metadata) -> String {
    String::new()
}

#[cfg(unix)]
fn block_size(metadata: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.blksize()
}

#[cfg(not(unix))]
fn block_size(_metadata: &fs::Metadata) -> u64 {
    4096
}
