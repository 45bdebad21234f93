// src/compile/folder.rs

//! Compiling every source file of one directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::logging::{Logger, MessageType};
use crate::types::MatchMode;
use crate::watch::matcher::{match_files, SuffixFilter};

use super::{CompilePhase, FileCompileError, StyleCompiler};

/// Output path for a source: same directory, suffix replaced by `.{extension}`.
///
/// `styles/foo.less` with suffix `.less` and extension `css` becomes
/// `styles/foo.css`.
pub fn output_path_for(source: &Path, suffix: &str, extension: &str) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(suffix).unwrap_or(&name);
    source.with_file_name(format!("{stem}.{extension}"))
}

/// Outcome of one folder pass.
#[derive(Debug, Default)]
pub struct FolderReport {
    pub compiled: Vec<PathBuf>,
    pub failed: Vec<FileCompileError>,
}

impl FolderReport {
    pub fn total(&self) -> usize {
        self.compiled.len() + self.failed.len()
    }
}

/// Compiles all matching sources below a directory.
///
/// Cheap to clone; every clone shares the same filesystem, compiler and
/// logger.
#[derive(Clone)]
pub struct FolderCompiler {
    fs: Arc<dyn FileSystem>,
    compiler: Arc<dyn StyleCompiler>,
    logger: Arc<dyn Logger>,
    filter: SuffixFilter,
    output_extension: String,
    mode: MatchMode,
}

impl fmt::Debug for FolderCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolderCompiler")
            .field("filter", &self.filter)
            .field("output_extension", &self.output_extension)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl FolderCompiler {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        compiler: Arc<dyn StyleCompiler>,
        logger: Arc<dyn Logger>,
        filter: SuffixFilter,
        output_extension: impl Into<String>,
        mode: MatchMode,
    ) -> Self {
        Self {
            fs,
            compiler,
            logger,
            filter,
            output_extension: output_extension.into(),
            mode,
        }
    }

    pub fn filter(&self) -> &SuffixFilter {
        &self.filter
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Source files that a pass over `dir` would compile.
    pub fn sources(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        match_files(self.fs.as_ref(), dir, &self.filter, self.mode)
    }

    /// Compile every source below `dir` concurrently.
    ///
    /// Returns once every file has settled. Per-file failures are logged and
    /// collected in the report; only a failure to list `dir` is an error.
    pub async fn compile_folder(&self, dir: &Path) -> Result<FolderReport> {
        let sources = self.sources(dir)?;
        debug!(dir = ?dir, count = sources.len(), "compiling folder");

        let mut set = JoinSet::new();
        for source in sources {
            let this = self.clone();
            set.spawn(async move { this.compile_file(&source).await });
        }

        let mut report = FolderReport::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(output)) => {
                    self.logger.log(
                        &format!("Less style was compiled into '{}'", output.display()),
                        MessageType::Info,
                    );
                    report.compiled.push(output);
                }
                Ok(Err(err)) => {
                    self.logger.log(
                        &format!(
                            "Cannot compile '{}' ({} failed): {:#}",
                            err.source_path.display(),
                            err.phase,
                            err.error
                        ),
                        MessageType::Error,
                    );
                    report.failed.push(err);
                }
                Err(join_err) => {
                    // The task panicked; which file it was is lost with it.
                    warn!(error = %join_err, "file compile task aborted");
                    self.logger.log(
                        &format!("A compile task in '{}' aborted: {join_err}", dir.display()),
                        MessageType::Error,
                    );
                }
            }
        }

        report.compiled.sort();
        Ok(report)
    }

    /// Read, compile and write a single source file.
    pub async fn compile_file(&self, source: &Path) -> std::result::Result<PathBuf, FileCompileError> {
        let include_dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let text = {
            let fs = Arc::clone(&self.fs);
            let path = source.to_path_buf();
            tokio::task::spawn_blocking(move || fs.read_to_string(&path))
                .await
                .unwrap_or_else(|e| Err(anyhow!("read task failed: {e}")))
                .map_err(|e| FileCompileError::new(source, CompilePhase::Read, e))?
        };

        let compiled = self
            .compiler
            .compile(&text, &include_dir)
            .await
            .map_err(|e| FileCompileError::new(source, CompilePhase::Compile, e))?;

        let output = output_path_for(source, self.filter.suffix(), &self.output_extension);
        {
            let fs = Arc::clone(&self.fs);
            let path = output.clone();
            tokio::task::spawn_blocking(move || fs.write(&path, compiled.as_bytes()))
                .await
                .unwrap_or_else(|e| Err(anyhow!("write task failed: {e}")))
                .map_err(|e| FileCompileError::new(source, CompilePhase::Write, e))?;
        }

        debug!(source = ?source, output = ?output, "compiled");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::CompileFuture;
    use crate::fs::mock::MockFileSystem;
    use std::sync::Mutex;

    struct Upper;

    impl StyleCompiler for Upper {
        fn compile<'a>(&'a self, source: &'a str, _include_dir: &'a Path) -> CompileFuture<'a> {
            Box::pin(async move {
                if source.contains("!!") {
                    Err(anyhow!("parse error"))
                } else {
                    Ok(source.to_uppercase())
                }
            })
        }
    }

    type Seen = Arc<Mutex<Vec<(String, MessageType)>>>;

    fn compiler(fs: &MockFileSystem, mode: MatchMode) -> (FolderCompiler, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let logger = move |msg: &str, kind: MessageType| {
            sink.lock().unwrap().push((msg.to_string(), kind));
        };
        let folder = FolderCompiler::new(
            Arc::new(fs.clone()),
            Arc::new(Upper),
            Arc::new(logger),
            SuffixFilter::new(".less"),
            "css",
            mode,
        );
        (folder, seen)
    }

    #[test]
    fn output_path_swaps_the_suffix() {
        assert_eq!(
            output_path_for(Path::new("/s/foo.less"), ".less", "css"),
            PathBuf::from("/s/foo.css")
        );
        assert_eq!(
            output_path_for(Path::new("/s/theme.dark.less"), ".less", "css"),
            PathBuf::from("/s/theme.dark.css")
        );
    }

    #[tokio::test]
    async fn one_bad_file_does_not_stop_the_others() {
        let fs = MockFileSystem::new();
        fs.add_file("/s/a.less", "a {}");
        fs.add_file("/s/b.less", "b { !! }");
        fs.add_file("/s/c.less", "c {}");
        let (folder, seen) = compiler(&fs, MatchMode::Recursive);

        let report = folder.compile_folder(Path::new("/s")).await.unwrap();

        assert_eq!(report.compiled, vec![PathBuf::from("/s/a.css"), PathBuf::from("/s/c.css")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].phase, CompilePhase::Compile);
        assert_eq!(fs.contents("/s/a.css").as_deref(), Some("A {}"));
        assert!(fs.contents("/s/b.css").is_none());

        let seen = seen.lock().unwrap();
        let errors: Vec<_> = seen.iter().filter(|(_, k)| *k == MessageType::Error).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].0.contains("b.less"));
    }

    #[tokio::test]
    async fn read_and_write_failures_name_their_phase() {
        let fs = MockFileSystem::new();
        fs.add_file("/s/unreadable.less", "x");
        fs.add_file("/s/unwritable.less", "y");
        fs.deny("/s/unreadable.less");
        fs.deny("/s/unwritable.css");
        let (folder, _seen) = compiler(&fs, MatchMode::Recursive);

        let report = folder.compile_folder(Path::new("/s")).await.unwrap();
        let mut phases: Vec<_> = report
            .failed
            .iter()
            .map(|e| (e.source_path.clone(), e.phase))
            .collect();
        phases.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(
            phases,
            vec![
                (PathBuf::from("/s/unreadable.less"), CompilePhase::Read),
                (PathBuf::from("/s/unwritable.less"), CompilePhase::Write),
            ]
        );
    }

    #[tokio::test]
    async fn unlistable_folder_is_an_error() {
        let fs = MockFileSystem::new();
        fs.add_dir("/s");
        fs.deny("/s");
        let (folder, _seen) = compiler(&fs, MatchMode::Recursive);
        assert!(folder.compile_folder(Path::new("/s")).await.is_err());
    }

    #[tokio::test]
    async fn shallow_mode_skips_nested_sources() {
        let fs = MockFileSystem::new();
        fs.add_file("/s/a.less", "a");
        fs.add_file("/s/inner/b.less", "b");
        let (folder, _seen) = compiler(&fs, MatchMode::Shallow);

        let report = folder.compile_folder(Path::new("/s")).await.unwrap();
        assert_eq!(report.total(), 1);
        assert!(fs.contents("/s/inner/b.css").is_none());
    }
}
