//! Document load and save.
//!
//! Loading streams the file through the tree builder and strips the
//! single trailing line feed that POSIX files end with; saving appends
//! it back. Each load also captures a [`WatchHandle`] describing the
//! on-disk state, which the buffer stores for the modification poller.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::debug;

use crate::text::{ReadDirection, Tree};

/// On-disk state of a document at the time it was loaded or saved.
///
/// The handle is opaque to the core: the polling loop that compares it
/// against the filesystem lives outside. The buffer stores the handle
/// and returns it on demand.
#[derive(Clone, Debug)]
pub struct WatchHandle {
    path: PathBuf,
    modified: Option<SystemTime>,
    size: u64,
}

impl WatchHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Reads a document from disk.
///
/// A single line feed at the end of the file is removed; the caller
/// gets it back on save. A partially built tree is discarded on error.
pub fn load(path: impl AsRef<Path>) -> Result<(Tree, WatchHandle)> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let metadata = file
        .metadata()
        .with_context(|| format!("reading metadata for {}", path.display()))?;
    let mut tree = Tree::from_reader(BufReader::new(file))
        .with_context(|| format!("reading {}", path.display()))?;
    strip_trailing_line_feed(&mut tree);
    debug!(path = %path.display(), chars = tree.num_chars(), "loaded document");
    Ok((
        tree,
        WatchHandle {
            path: path.to_path_buf(),
            modified: metadata.modified().ok(),
            size: metadata.len(),
        },
    ))
}

/// Writes a document to disk, re-appending the trailing line feed.
pub fn save(path: impl AsRef<Path>, tree: &Tree) -> Result<WatchHandle> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut reader = tree.reader_at_position(0, ReadDirection::Forward);
    io::copy(&mut reader, &mut writer).with_context(|| format!("writing {}", path.display()))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .with_context(|| format!("writing {}", path.display()))?;
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("reading metadata for {}", path.display()))?;
    debug!(path = %path.display(), bytes = metadata.len(), "saved document");
    Ok(WatchHandle {
        path: path.to_path_buf(),
        modified: metadata.modified().ok(),
        size: metadata.len(),
    })
}

fn strip_trailing_line_feed(tree: &mut Tree) {
    let n = tree.num_chars();
    if n == 0 {
        return;
    }
    let mut reader = tree.reader_at_position(n, ReadDirection::Backward);
    let mut buf = [0u8; 1];
    if matches!(reader.read(&mut buf), Ok(1)) && buf[0] == b'\n' {
        tree.delete_at_position(n - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_strips_posix_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "hello\nworld\n").unwrap();

        let (tree, handle) = load(&path).unwrap();
        assert_eq!(tree.to_string(), "hello\nworld");
        assert_eq!(handle.path(), path.as_path());
        assert_eq!(handle.size(), 12);
    }

    #[test]
    fn test_load_without_trailing_line_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "no trailing newline").unwrap();

        let (tree, _) = load(&path).unwrap();
        assert_eq!(tree.to_string(), "no trailing newline");
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        let (tree, _) = load(&path).unwrap();
        assert_eq!(tree.num_chars(), 0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_save_appends_line_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");

        let tree = Tree::from("hello\nworld");
        save(&path, &tree).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\nworld\n");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");

        let tree = Tree::from("a£፴\nnext line");
        save(&path, &tree).unwrap();
        let (loaded, _) = load(&path).unwrap();
        assert_eq!(loaded.to_string(), tree.to_string());
    }
}
