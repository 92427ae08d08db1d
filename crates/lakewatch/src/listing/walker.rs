//! Recursive enumeration of a remote directory tree

use crate::error::Result;
use crate::listing::filter::NameFilter;
use crate::listing::types::{EntryKind, FileEntry};
use crate::remote::RemoteFs;
use tracing::trace;

/// Join a directory path and a child name with exactly one separator.
pub fn join_path(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    format!("{base}/{name}")
}

/// Walks a remote tree rooted at a fixed directory, collecting the file
/// entries whose names pass the filter.
///
/// The filter applies to file base names only. Directories are always
/// descended into (when recursion is enabled) and never produce entries
/// themselves.
pub struct TreeWalker<'a> {
    filter: &'a NameFilter,
    recurse: bool,
}

impl<'a> TreeWalker<'a> {
    pub fn new(filter: &'a NameFilter, recurse: bool) -> Self {
        Self { filter, recurse }
    }

    /// Enumerate the tree under `root`. Any listing error aborts the
    /// whole walk; a partial result is never returned.
    pub fn walk(&self, remote: &dyn RemoteFs, root: &str) -> Result<Vec<FileEntry>> {
        let root = if root.is_empty() { "/" } else { root };
        let mut entries = Vec::new();
        self.scan_directory(remote, root, root, &mut entries)?;
        Ok(entries)
    }

    fn scan_directory(
        &self,
        remote: &dyn RemoteFs,
        root: &str,
        current: &str,
        entries: &mut Vec<FileEntry>,
    ) -> Result<()> {
        trace!(directory = current, "listing directory");
        let relative = relative_path(root, current);

        for status in remote.list_children(current)? {
            match status.kind {
                EntryKind::Directory => {
                    if self.recurse {
                        let child = join_path(current, &status.name);
                        self.scan_directory(remote, root, &child, entries)?;
                    }
                }
                EntryKind::File => {
                    if self.filter.matches(&status.name) {
                        // The descriptor carries the containing directory;
                        // the full path is reconstructed by joining it with
                        // the name.
                        entries.push(FileEntry::from_status(status, current, relative.clone()));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Path of `current` relative to `root`, in the form downstream record
/// attributes carry: `./` for the root itself, otherwise the suffix of
/// `current` after the root prefix.
fn relative_path(root: &str, current: &str) -> String {
    if current == root {
        "./".to_string()
    } else {
        let root = root.trim_end_matches('/');
        current
            .strip_prefix(root)
            .unwrap_or(current)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LakewatchError;
    use crate::remote::MemoryFs;

    fn default_filter() -> NameFilter {
        NameFilter::new(crate::listing::filter::DEFAULT_FILE_FILTER).unwrap()
    }

    #[test]
    fn walks_recursively_and_skips_directories() {
        let fs = MemoryFs::new();
        fs.add_file("/root/a.csv", 100, b"a");
        fs.add_file("/root/sub/b.csv", 200, b"bb");
        fs.add_dir("/root/empty");

        let filter = default_filter();
        let walker = TreeWalker::new(&filter, true);
        let entries = walker.walk(&fs, "/root").unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        assert_eq!(entries[0].relative_path, "./");
        assert_eq!(entries[1].relative_path, "/sub");
    }

    #[test]
    fn absolute_path_is_the_containing_directory() {
        let fs = MemoryFs::new();
        fs.add_file("/root/a.csv", 100, b"a");
        fs.add_file("/root/sub/b.csv", 200, b"bb");

        let filter = default_filter();
        let walker = TreeWalker::new(&filter, true);
        let entries = walker.walk(&fs, "/root").unwrap();

        // The name is carried separately; the path field never repeats it.
        assert_eq!(entries[0].absolute_path, "/root");
        assert_eq!(entries[1].absolute_path, "/root/sub");
        assert_eq!(entries[1].name, "b.csv");
    }

    #[test]
    fn recursion_disabled_lists_root_only() {
        let fs = MemoryFs::new();
        fs.add_file("/root/a.csv", 100, b"a");
        fs.add_file("/root/sub/b.csv", 200, b"b");

        let filter = default_filter();
        let walker = TreeWalker::new(&filter, false);
        let entries = walker.walk(&fs, "/root").unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.csv");
    }

    #[test]
    fn filter_applies_to_files_not_directories() {
        let fs = MemoryFs::new();
        fs.add_file("/root/.hidden/visible.csv", 100, b"x");
        fs.add_file("/root/.hidden.csv", 100, b"x");

        let filter = default_filter();
        let walker = TreeWalker::new(&filter, true);
        let entries = walker.walk(&fs, "/root").unwrap();

        // The dot-prefixed directory is still descended into; only the
        // dot-prefixed file is excluded.
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "visible.csv");
        assert_eq!(entries[0].relative_path, "/.hidden");
    }

    #[test]
    fn listing_failure_aborts_the_walk() {
        let fs = MemoryFs::new();
        fs.add_file("/root/a.csv", 100, b"a");
        fs.add_file("/root/sub/b.csv", 200, b"b");
        fs.fail_listing_of("/root/sub");

        let filter = default_filter();
        let walker = TreeWalker::new(&filter, true);
        let err = walker.walk(&fs, "/root").unwrap_err();
        assert!(matches!(err, LakewatchError::Remote { .. }));
    }

    #[test]
    fn join_path_uses_exactly_one_separator() {
        assert_eq!(join_path("/root", "a.csv"), "/root/a.csv");
        assert_eq!(join_path("/root/", "a.csv"), "/root/a.csv");
        assert_eq!(join_path("/root/", "/a.csv"), "/root/a.csv");
        assert_eq!(join_path("/", "a.csv"), "/a.csv");
    }
}
