// src/compile/command.rs

//! External compiler process runner.

use std::path::Path;
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::CompilerSection;

use super::{CompileFuture, StyleCompiler};

/// Compiles by piping the source into an external program.
///
/// The command line is
/// `<program> <args..> <include_path_flag>=<dir> [<compress_flag>] -`;
/// the compiled output is read from stdout. A non-zero exit status is a
/// compile error carrying the program's stderr.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
    include_path_flag: String,
    compress_flag: Option<String>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<String>, args: Vec<String>, include_path_flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            include_path_flag: include_path_flag.into(),
            compress_flag: None,
        }
    }

    /// Ask the program for minified output with `flag`.
    pub fn with_compress_flag(mut self, flag: impl Into<String>) -> Self {
        self.compress_flag = Some(flag.into());
        self
    }

    pub fn from_settings(section: &CompilerSection) -> Self {
        let compiler = Self::new(
            section.program.clone(),
            section.args.clone(),
            section.include_path_flag.clone(),
        );
        if section.compress {
            compiler.with_compress_flag(section.compress_flag.clone())
        } else {
            compiler
        }
    }

    /// Arguments passed after the program name.
    pub fn arguments(&self, include_dir: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        if !self.include_path_flag.is_empty() {
            args.push(format!("{}={}", self.include_path_flag, include_dir.display()));
        }
        args.extend(self.compress_flag.iter().cloned());
        args.push("-".to_string());
        args
    }

    fn command(&self, include_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.arguments(include_dir))
            .current_dir(include_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, source: &str, include_dir: &Path) -> Result<String> {
        debug!(program = %self.program, dir = ?include_dir, "spawning compiler");

        let mut child = self
            .command(include_dir)
            .spawn()
            .with_context(|| format!("failed to spawn compiler `{}`", self.program))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("compiler stdin was not captured"))?;

        // Feed stdin while stdout and stderr are drained; a compiler that
        // streams output before reading all input would otherwise block on
        // a full pipe.
        let feed = async move {
            let written = stdin.write_all(source.as_bytes()).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.context("waiting for compiler")?;

        // A compiler that exits early closes its stdin; its exit status
        // and stderr are the interesting part then.
        if let Err(err) = written {
            if err.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(err).context("writing source to compiler stdin");
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            ));
        }

        String::from_utf8(output.stdout).context("compiler produced non-UTF-8 output")
    }
}

impl StyleCompiler for CommandCompiler {
    fn compile<'a>(&'a self, source: &'a str, include_dir: &'a Path) -> CompileFuture<'a> {
        Box::pin(self.run(source, include_dir))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_settings_request_compressed_output() {
        let compiler = CommandCompiler::from_settings(&CompilerSection::default());
        assert_eq!(
            compiler.arguments(Path::new("/s")),
            vec!["--include-path=/s", "--compress", "-"]
        );
    }

    #[test]
    fn compression_can_be_switched_off() {
        let section = CompilerSection {
            compress: false,
            args: vec!["--strict-math=on".to_string()],
            ..CompilerSection::default()
        };
        assert_eq!(
            CommandCompiler::from_settings(&section).arguments(Path::new("/s")),
            vec!["--strict-math=on", "--include-path=/s", "-"]
        );
    }

    #[tokio::test]
    async fn compress_flag_reaches_the_program() {
        let dir = tempdir().unwrap();
        let compiler = CommandCompiler::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; echo \"$@\"".to_string(), "sh".to_string()],
            "--include-path",
        )
        .with_compress_flag("-x");

        let out = compiler.compile("a {}", dir.path()).await.unwrap();
        assert_eq!(
            out.trim(),
            format!("--include-path={} -x -", dir.path().display())
        );
    }

    #[tokio::test]
    async fn pipes_source_through_the_program() {
        let dir = tempdir().unwrap();
        let compiler = CommandCompiler::new("cat", Vec::new(), "");
        let out = compiler.compile("a { b: c }", dir.path()).await.unwrap();
        assert_eq!(out, "a { b: c }");
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_compile_error() {
        let dir = tempdir().unwrap();
        let compiler = CommandCompiler::new(
            "sh",
            vec!["-c".to_string(), "echo broken >&2; exit 3".to_string()],
            "",
        );
        let err = compiler.compile("x", dir.path()).await.unwrap_err();
        assert!(format!("{err}").contains("broken"));
    }

    #[tokio::test]
    async fn large_sources_stream_through_without_deadlock() {
        let dir = tempdir().unwrap();
        let compiler = CommandCompiler::new("cat", Vec::new(), "");
        let source = ".rule { color: red; }\n".repeat(20_000);

        let out = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            compiler.compile(&source, dir.path()),
        )
        .await
        .expect("compiler pipes deadlocked")
        .unwrap();
        assert_eq!(out.len(), source.len());
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let dir = tempdir().unwrap();
        let compiler = CommandCompiler::new("lesswatch-no-such-compiler", Vec::new(), "--include-path");
        assert!(compiler.compile("x", dir.path()).await.is_err());
    }
}
