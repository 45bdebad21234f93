// src/fs/mock.rs

use super::{DirEntry, EntryKind, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

impl MockEntry {
    fn kind(&self) -> EntryKind {
        match self {
            MockEntry::File(_) => EntryKind::File,
            MockEntry::Dir => EntryKind::Dir,
        }
    }
}

/// In-memory filesystem for tests.
///
/// Directories are implicit: adding `a/b/c.less` creates `a` and `a/b`.
/// Paths registered with [`MockFileSystem::deny`] fail every read, write
/// and listing, which is how tests simulate permission errors.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
    denied: Arc<Mutex<HashSet<PathBuf>>>,
    accesses: Arc<AtomicUsize>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.lock().unwrap();
        if let Some(parent) = path.parent() {
            add_dir_chain(&mut entries, parent);
        }
        entries.insert(path, MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        add_dir_chain(&mut entries, path.as_ref());
    }

    /// Make reads, writes and listings of `path` fail.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.denied
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
    }

    /// Contents of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path.as_ref()) {
            Some(MockEntry::File(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// Number of trait calls made so far.
    pub fn access_count(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    fn touch(&self, path: &Path) -> Result<()> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        if self.denied.lock().unwrap().contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        Ok(())
    }
}

fn add_dir_chain(entries: &mut BTreeMap<PathBuf, MockEntry>, dir: &Path) {
    for ancestor in dir.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        entries
            .entry(ancestor.to_path_buf())
            .or_insert(MockEntry::Dir);
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.touch(path)?;
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.touch(path)?;
        {
            let entries = self.entries.lock().unwrap();
            match path.parent().map(|p| entries.get(p)) {
                Some(Some(MockEntry::Dir)) => {}
                _ => return Err(anyhow!("Parent directory missing: {:?}", path)),
            }
            if matches!(entries.get(path), Some(MockEntry::Dir)) {
                return Err(anyhow!("Is a directory: {:?}", path));
            }
        }
        self.add_file(path, contents);
        Ok(())
    }

    // Denied paths can still be statted; only their contents are off limits.
    fn stat(&self, path: &Path) -> Result<EntryKind> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        match self.entries.lock().unwrap().get(path) {
            Some(entry) => Ok(entry.kind()),
            None => Err(anyhow!("No such file or directory: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        self.touch(path)?;
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::Dir) => Ok(entries
                .iter()
                .filter(|(p, _)| p.parent() == Some(path))
                .map(|(p, entry)| DirEntry::new(p.clone(), entry.kind()))
                .collect()),
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
