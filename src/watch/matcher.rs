// src/watch/matcher.rs

//! Locating style sources inside a watched directory.

use std::path::{Path, PathBuf};

use crate::errors::{LesswatchError, Result};
use crate::fs::FileSystem;
use crate::types::MatchMode;

/// File-name predicate deciding which files are style sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixFilter {
    suffix: String,
}

impl SuffixFilter {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// True if a bare file name ends with the suffix and has a stem
    /// (`.less` alone is a hidden file, not a source).
    pub fn matches_name(&self, name: &str) -> bool {
        name.len() > self.suffix.len() && name.ends_with(&self.suffix)
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.matches_name(n))
    }
}

/// List the source files under `dir`.
///
/// In [`MatchMode::Recursive`] every subdirectory is descended into; in
/// [`MatchMode::Shallow`] only direct children are considered. The result is
/// sorted. Any directory that cannot be listed fails the whole call.
pub fn match_files(
    fs: &dyn FileSystem,
    dir: &Path,
    filter: &SuffixFilter,
    mode: MatchMode,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        let entries = fs
            .read_dir(&current)
            .map_err(|err| LesswatchError::filesystem(&current, err))?;

        for entry in entries {
            if entry.is_dir() {
                if mode == MatchMode::Recursive {
                    stack.push(entry.path);
                }
            } else if filter.matches_path(&entry.path) {
                files.push(entry.path);
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn styles() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/s/a.less", "");
        fs.add_file("/s/a.css", "");
        fs.add_file("/s/.less", "");
        fs.add_file("/s/parts/b.less", "");
        fs.add_file("/s/parts/deeper/c.less", "");
        fs
    }

    #[test]
    fn recursive_mode_finds_nested_sources() {
        let fs = styles();
        let files = match_files(&fs, Path::new("/s"), &SuffixFilter::new(".less"), MatchMode::Recursive)
            .unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/s/a.less"),
                PathBuf::from("/s/parts/b.less"),
                PathBuf::from("/s/parts/deeper/c.less"),
            ]
        );
    }

    #[test]
    fn shallow_mode_stays_in_the_directory() {
        let fs = styles();
        let files = match_files(&fs, Path::new("/s"), &SuffixFilter::new(".less"), MatchMode::Shallow)
            .unwrap();
        assert_eq!(files, vec![PathBuf::from("/s/a.less")]);
    }

    #[test]
    fn unlistable_directory_is_a_filesystem_error() {
        let fs = styles();
        fs.deny("/s/parts");
        let err = match_files(&fs, Path::new("/s"), &SuffixFilter::new(".less"), MatchMode::Recursive)
            .unwrap_err();
        match err {
            LesswatchError::Filesystem { path, .. } => assert_eq!(path, PathBuf::from("/s/parts")),
            other => panic!("expected Filesystem error, got {other:?}"),
        }
    }

    #[test]
    fn suffix_must_end_the_name() {
        let filter = SuffixFilter::new(".less");
        assert!(filter.matches_name("x.less"));
        assert!(!filter.matches_name("x.less.bak"));
        assert!(!filter.matches_name(".less"));
    }
}
