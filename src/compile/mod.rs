// src/compile/mod.rs

//! Style compilation.
//!
//! - [`StyleCompiler`] is the seam to the external compiler. The tool never
//!   interprets style sources itself.
//! - [`command`] provides `CommandCompiler`, which runs an external program
//!   (by default `lessc`) and is what the binary uses.
//! - [`folder`] compiles every source file in a directory concurrently and
//!   writes each output next to its source.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use thiserror::Error;

pub mod command;
pub mod folder;

pub use command::CommandCompiler;
pub use folder::{output_path_for, FolderCompiler, FolderReport};

/// Boxed future returned by [`StyleCompiler::compile`].
pub type CompileFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

/// Trait abstracting the external style compiler.
///
/// Production code uses [`CommandCompiler`]; tests provide a deterministic
/// in-process implementation.
pub trait StyleCompiler: Send + Sync {
    /// Compile `source` into its output text.
    ///
    /// `include_dir` is the directory of the source file, used to resolve
    /// relative imports inside it.
    fn compile<'a>(&'a self, source: &'a str, include_dir: &'a Path) -> CompileFuture<'a>;
}

/// Step of a single file compile that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilePhase {
    Read,
    Compile,
    Write,
}

impl fmt::Display for CompilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilePhase::Read => f.write_str("read"),
            CompilePhase::Compile => f.write_str("compile"),
            CompilePhase::Write => f.write_str("write"),
        }
    }
}

/// Failure of one file inside a folder pass.
#[derive(Error, Debug)]
#[error("{phase} failed for {source_path:?}: {error:#}")]
pub struct FileCompileError {
    pub source_path: PathBuf,
    pub phase: CompilePhase,
    pub error: anyhow::Error,
}

impl FileCompileError {
    pub fn new(source_path: impl Into<PathBuf>, phase: CompilePhase, error: anyhow::Error) -> Self {
        Self {
            source_path: source_path.into(),
            phase,
            error,
        }
    }
}
