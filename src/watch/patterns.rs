// src/watch/patterns.rs

//! Expansion of input path patterns into concrete paths.
//!
//! A pattern without glob metacharacters is taken literally and expands to
//! itself without touching the filesystem. Otherwise the longest literal
//! prefix is used as the walk root and every entry below it is matched
//! against the compiled glob.
//!
//! A bracket class holding a single character (`[[]`, `[*]`) matches exactly
//! that character, so it counts as literal text. This is the form
//! [`globset::escape`] produces, which lets callers splice arbitrary
//! directory names in front of a user pattern.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::errors::{LesswatchError, Result};
use crate::fs::FileSystem;

/// Returns true if the pattern contains glob metacharacters outside of
/// single-character bracket classes.
pub fn is_glob(pattern: &str) -> bool {
    literal_text(pattern).is_none()
}

/// The literal text a pattern stands for, or `None` if it is a real glob.
fn literal_text(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' | '?' | '{' => return None,
            '[' => {
                let inner = chars.next()?;
                if matches!(inner, '!' | '^') || chars.next()? != ']' {
                    return None;
                }
                out.push(inner);
            }
            other => out.push(other),
        }
    }
    Some(out)
}

/// Expand `pattern` into the paths it names, in sorted order.
///
/// Both files and directories are returned; callers decide what to keep.
pub fn expand_pattern(fs: &dyn FileSystem, pattern: &str) -> Result<Vec<PathBuf>> {
    if let Some(literal) = literal_text(pattern) {
        return Ok(vec![PathBuf::from(literal)]);
    }

    let normalized = normalize(pattern);
    let matcher = compile_glob(&normalized).map_err(|reason| LesswatchError::PatternExpansion {
        pattern: pattern.to_string(),
        reason,
    })?;

    let (base, max_depth) = split_literal_prefix(Path::new(&normalized));
    if !fs.is_dir(&base) {
        debug!(pattern, ?base, "glob base does not exist; pattern expands to nothing");
        return Ok(Vec::new());
    }

    let mut matched = Vec::new();
    let mut stack = vec![(base, 0usize)];

    while let Some((dir, depth)) = stack.pop() {
        let entries = fs
            .read_dir(&dir)
            .map_err(|err| LesswatchError::PatternExpansion {
                pattern: pattern.to_string(),
                reason: format!("{err:#}"),
            })?;

        for entry in entries {
            if matcher.is_match(path_str(&entry.path)) {
                matched.push(entry.path.clone());
            }
            let within_depth = max_depth.is_none_or(|max| depth + 1 < max);
            if within_depth && entry.is_dir() {
                stack.push((entry.path, depth + 1));
            }
        }
    }

    matched.sort();
    debug!(pattern, count = matched.len(), "expanded glob pattern");
    Ok(matched)
}

fn compile_glob(pattern: &str) -> std::result::Result<GlobMatcher, String> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| e.to_string())
}

/// Forward slashes only, no trailing separator.
fn normalize(pattern: &str) -> String {
    let s = pattern.replace('\\', "/");
    match s.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Split a pattern into its literal base directory and the number of path
/// levels the remainder can span (`None` when it contains `**`).
fn split_literal_prefix(pattern: &Path) -> (PathBuf, Option<usize>) {
    let mut base = PathBuf::new();
    let mut rest = Vec::new();

    for component in pattern.components() {
        let text = component.as_os_str().to_string_lossy();
        match literal_text(&text) {
            Some(literal) if rest.is_empty() => base.push(literal),
            _ => rest.push(component),
        }
    }

    if base.as_os_str().is_empty() {
        base.push(Component::CurDir);
    }

    let unbounded = rest
        .iter()
        .any(|c| c.as_os_str().to_string_lossy().contains("**"));
    let depth = if unbounded { None } else { Some(rest.len()) };
    (base, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn project() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/p/themes/dark/main.less", "");
        fs.add_file("/p/themes/light/main.less", "");
        fs.add_file("/p/themes/readme.txt", "");
        fs.add_file("/p/themes/light/extra/deep.less", "");
        fs
    }

    #[test]
    fn literal_patterns_expand_to_themselves_without_io() {
        let fs = MockFileSystem::new();
        let out = expand_pattern(&fs, "/p/does/not/exist").unwrap();
        assert_eq!(out, vec![PathBuf::from("/p/does/not/exist")]);
        assert_eq!(fs.access_count(), 0);
    }

    #[test]
    fn single_star_matches_one_level() {
        let fs = project();
        let out = expand_pattern(&fs, "/p/themes/*").unwrap();
        assert_eq!(
            out,
            vec![
                PathBuf::from("/p/themes/dark"),
                PathBuf::from("/p/themes/light"),
                PathBuf::from("/p/themes/readme.txt"),
            ]
        );
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let fs = project();
        let out = expand_pattern(&fs, "/p/themes/*/").unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn double_star_descends() {
        let fs = project();
        let out = expand_pattern(&fs, "/p/themes/**/*.less").unwrap();
        assert_eq!(
            out,
            vec![
                PathBuf::from("/p/themes/dark/main.less"),
                PathBuf::from("/p/themes/light/extra/deep.less"),
                PathBuf::from("/p/themes/light/main.less"),
            ]
        );
    }

    #[test]
    fn escaped_metacharacters_are_literal() {
        let fs = MockFileSystem::new();
        let pattern = format!("{}/styles", globset::escape("/p/proj[1]{x}"));
        let out = expand_pattern(&fs, &pattern).unwrap();
        assert_eq!(out, vec![PathBuf::from("/p/proj[1]{x}/styles")]);
        assert_eq!(fs.access_count(), 0);
    }

    #[test]
    fn glob_below_an_escaped_directory_walks_the_real_one() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/proj[1]/themes/dark/main.less", "");
        fs.add_file("/p/proj[1]/themes/light/main.less", "");

        let pattern = format!("{}/themes/*", globset::escape("/p/proj[1]"));
        let out = expand_pattern(&fs, &pattern).unwrap();
        assert_eq!(
            out,
            vec![
                PathBuf::from("/p/proj[1]/themes/dark"),
                PathBuf::from("/p/proj[1]/themes/light"),
            ]
        );
    }

    #[test]
    fn bracket_classes_with_several_characters_stay_globs() {
        assert!(is_glob("/p/[ab]"));
        assert!(is_glob("/p/[!a]"));
        assert!(is_glob("/p/a[b"));
        assert!(!is_glob("/p/[*]"));
        assert!(!is_glob("/p/plain}"));
    }

    #[test]
    fn invalid_glob_is_an_expansion_error() {
        let fs = project();
        let err = expand_pattern(&fs, "/p/themes/[a").unwrap_err();
        assert!(matches!(err, LesswatchError::PatternExpansion { .. }));
    }

    #[test]
    fn unreadable_base_is_an_expansion_error() {
        let fs = project();
        fs.deny("/p/themes");
        let err = expand_pattern(&fs, "/p/themes/*").unwrap_err();
        assert!(matches!(err, LesswatchError::PatternExpansion { .. }));
    }

    #[test]
    fn missing_base_expands_to_nothing() {
        let fs = project();
        assert!(expand_pattern(&fs, "/p/nowhere/*").unwrap().is_empty());
    }
}
