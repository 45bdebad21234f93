// src/logging.rs

//! Logging for `lesswatch`.
//!
//! Two channels live here:
//!
//! - The user-facing [`Logger`] sink. Every status line the tool produces
//!   ("compiled into ...", per-file failures, the final "now watching"
//!   message) goes through it together with a [`MessageType`]. The tool
//!   never formats console output itself; the sink decides.
//! - Internal diagnostics via `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the tracing level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `LESSWATCH_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;
pub use crate::types::MessageType;

/// Sink for user-facing messages.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str, kind: MessageType);
}

impl<F> Logger for F
where
    F: Fn(&str, MessageType) + Send + Sync,
{
    fn log(&self, message: &str, kind: MessageType) {
        self(message, kind)
    }
}

/// Production sink: forwards every message to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str, kind: MessageType) {
        match kind {
            MessageType::Error => tracing::error!(target: "lesswatch", "{message}"),
            MessageType::Warn => tracing::warn!(target: "lesswatch", "{message}"),
            MessageType::Info => tracing::info!(target: "lesswatch", "{message}"),
        }
    }
}

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("LESSWATCH_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
