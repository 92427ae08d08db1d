//! Fetch and put: moving file content across the remote boundary

use crate::error::Result;
use crate::listing::walker::join_path;
use crate::remote::RemoteFs;
use std::io::{self, Read, Write};
use tracing::info;

/// Stream a remote file's content into `out`. Returns the number of
/// bytes copied.
pub fn fetch(remote: &dyn RemoteFs, path: &str, out: &mut dyn Write) -> Result<u64> {
    let mut reader = remote.open_for_read(path)?;
    let copied = io::copy(&mut reader, out)?;
    info!(path, bytes = copied, "fetched remote file");
    Ok(copied)
}

/// Write `input` to a new remote file named `name` under `directory`.
/// The file is created empty first, then appended, matching the
/// create/append split of the remote interface. Returns the number of
/// bytes written.
pub fn put(
    remote: &dyn RemoteFs,
    directory: &str,
    name: &str,
    input: &mut dyn Read,
) -> Result<u64> {
    let path = join_path(directory, name);
    remote.create_empty(&path)?;

    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    if !buf.is_empty() {
        remote.append(&path, &buf)?;
    }
    info!(path, bytes = buf.len(), "put remote file");
    Ok(buf.len() as u64)
}
