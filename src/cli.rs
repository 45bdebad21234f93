// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `lesswatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lesswatch",
    version,
    about = "Watch folders of LESS styles and recompile them to CSS on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Directories or glob patterns to compile and watch.
    ///
    /// Relative paths are resolved against the current working directory.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Compile every matched folder once and exit without watching.
    #[arg(long, alias = "once")]
    pub just_compile: bool,

    /// Only compile files directly inside each folder (no recursion).
    #[arg(long)]
    pub shallow: bool,

    /// Path to an optional settings file (TOML).
    ///
    /// Default: `Lesswatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LESSWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve the paths and list the files that would be compiled, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
