//! In-memory implementation of the remote capability set
//!
//! Test double for the walker, orchestrator, and transfer operations.
//! Listing order is insertion order, so tests that need determinism get
//! it for free. Individual paths can be armed to fail listing, which is
//! how the atomic-failure behavior of the walker is exercised.

use super::{RemoteFs, RemoteStatus};
use crate::error::{LakewatchError, Result};
use crate::listing::types::EntryKind;
use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor, Read};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Node {
    Directory { children: Vec<String> },
    File(FileNode),
}

#[derive(Debug, Clone)]
struct FileNode {
    data: Vec<u8>,
    modified_millis: i64,
    accessed_millis: i64,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: HashMap<String, Node>,
    fail_listing: HashSet<String>,
}

/// In-memory remote store.
pub struct MemoryFs {
    inner: Mutex<Inner>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut inner = Inner::default();
        inner.nodes.insert(
            "/".to_string(),
            Node::Directory {
                children: Vec::new(),
            },
        );
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Create a directory, including any missing parents.
    pub fn add_dir(&self, path: &str) {
        let mut inner = self.lock();
        ensure_dir(&mut inner, path);
    }

    /// Create a file with the given modification instant, including any
    /// missing parent directories.
    pub fn add_file(&self, path: &str, modified_millis: i64, data: &[u8]) {
        let mut inner = self.lock();
        let (parent, name) = split_path(path);
        ensure_dir(&mut inner, &parent);
        attach_child(&mut inner, &parent, name);
        inner.nodes.insert(
            normalize(path),
            Node::File(FileNode {
                data: data.to_vec(),
                modified_millis,
                accessed_millis: modified_millis,
            }),
        );
    }

    /// Arm a directory so its next listings fail with a remote error.
    pub fn fail_listing_of(&self, path: &str) {
        self.lock().fail_listing.insert(normalize(path));
    }

    /// Disarm a previously armed listing failure.
    pub fn restore_listing_of(&self, path: &str) {
        self.lock().fail_listing.remove(&normalize(path));
    }

    pub fn remove(&self, path: &str) {
        let mut inner = self.lock();
        let key = normalize(path);
        inner.nodes.remove(&key);
        let (parent, name) = split_path(path);
        if let Some(Node::Directory { children }) = inner.nodes.get_mut(&normalize(&parent)) {
            children.retain(|c| c != name);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a test already panicked; propagate.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RemoteFs for MemoryFs {
    fn list_children(&self, path: &str) -> Result<Vec<RemoteStatus>> {
        let inner = self.lock();
        let key = normalize(path);

        if inner.fail_listing.contains(&key) {
            return Err(LakewatchError::Remote {
                path: path.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "injected listing failure"),
            });
        }

        let children = match inner.nodes.get(&key) {
            Some(Node::Directory { children }) => children.clone(),
            Some(Node::File(_)) => {
                return Err(LakewatchError::Remote {
                    path: path.to_string(),
                    source: io::Error::new(io::ErrorKind::Other, "not a directory"),
                })
            }
            None => return Err(LakewatchError::NotFound(path.to_string())),
        };

        let mut statuses = Vec::with_capacity(children.len());
        for name in children {
            let child_key = join_key(&key, &name);
            let status = match inner.nodes.get(&child_key) {
                Some(Node::Directory { children }) => RemoteStatus {
                    name,
                    kind: EntryKind::Directory,
                    modified_millis: 0,
                    accessed_millis: 0,
                    size_bytes: 0,
                    block_size_bytes: 0,
                    child_count: children.len() as u64,
                    owner: "501".to_string(),
                    group: "100".to_string(),
                    permission: "755".to_string(),
                },
                Some(Node::File(file)) => RemoteStatus {
                    name,
                    kind: EntryKind::File,
                    modified_millis: file.modified_millis,
                    accessed_millis: file.accessed_millis,
                    size_bytes: file.data.len() as u64,
                    block_size_bytes: 4096,
                    child_count: 0,
                    owner: "501".to_string(),
                    group: "100".to_string(),
                    permission: "644".to_string(),
                },
                None => continue,
            };
            statuses.push(status);
        }
        Ok(statuses)
    }

    fn open_for_read(&self, path: &str) -> Result<Box<dyn Read>> {
        let inner = self.lock();
        match inner.nodes.get(&normalize(path)) {
            Some(Node::File(file)) => Ok(Box::new(Cursor::new(file.data.clone()))),
            _ => Err(LakewatchError::NotFound(path.to_string())),
        }
    }

    fn create_empty(&self, path: &str) -> Result<()> {
        self.add_file(path, 0, b"");
        Ok(())
    }

    fn append(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        match inner.nodes.get_mut(&normalize(path)) {
            Some(Node::File(file)) => {
                file.data.extend_from_slice(bytes);
                Ok(())
            }
            _ => Err(LakewatchError::NotFound(path.to_string())),
        }
    }

    fn concat(&self, sources: &[String], dest: &str) -> Result<()> {
        let mut joined = Vec::new();
        for source in sources {
            let inner = self.lock();
            match inner.nodes.get(&normalize(source)) {
                Some(Node::File(file)) => joined.extend_from_slice(&file.data),
                _ => return Err(LakewatchError::NotFound(source.to_string())),
            }
        }
        self.create_empty(dest)?;
        self.append(dest, &joined)?;
        for source in sources {
            self.remove(source);
        }
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let exists = {
            let inner = self.lock();
            matches!(inner.nodes.get(&normalize(path)), Some(Node::File(_)))
        };
        if !exists {
            return Err(LakewatchError::NotFound(path.to_string()));
        }
        self.remove(path);
        Ok(())
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn join_key(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

fn split_path(path: &str) -> (String, &str) {
    let key = path.trim_end_matches('/');
    match key.rsplit_once('/') {
        Some(("", name)) => ("/".to_string(), name),
        Some((parent, name)) => (parent.to_string(), name),
        None => ("/".to_string(), key),
    }
}

fn ensure_dir(inner: &mut Inner, path: &str) {
    let key = normalize(path);
    if inner.nodes.contains_key(&key) {
        return;
    }
    if key != "/" {
        let (parent, name) = split_path(&key);
        ensure_dir(inner, &parent);
        attach_child(inner, &parent, name);
    }
    inner.nodes.insert(
        key,
        Node::Directory {
            children: Vec::new(),
        },
    );
}

fn attach_child(inner: &mut Inner, parent: &str, name: &str) {
    if let Some(Node::Directory { children }) = inner.nodes.get_mut(&normalize(parent)) {
        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }
}
