// src/fs/mod.rs

//! Disk access for lesswatch.
//!
//! Everything that touches the disk (pattern expansion, source matching,
//! reading sources, writing outputs) goes through [`FileSystem`] so tests
//! can swap in [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// What a path points at.
///
/// Listings report symlinks as `Other` without following them, so a link
/// cycle cannot make a directory walk loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

impl EntryKind {
    fn of(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create or truncate `path`. Parent directories must already exist.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Stat `path`, following symlinks. A missing path is an error.
    fn stat(&self, path: &Path) -> Result<EntryKind>;

    /// Entries directly inside `path`, sorted by path.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.stat(path), Ok(EntryKind::Dir))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading source {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("writing output {:?}", path))
    }

    fn stat(&self, path: &Path) -> Result<EntryKind> {
        let meta = fs::metadata(path).with_context(|| format!("stat {:?}", path))?;
        Ok(EntryKind::of(meta.file_type()))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("listing {:?}", path))? {
            let entry = entry.with_context(|| format!("listing {:?}", path))?;
            let kind = entry
                .file_type()
                .map(EntryKind::of)
                .with_context(|| format!("stat {:?}", entry.path()))?;
            entries.push(DirEntry::new(entry.path(), kind));
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}
