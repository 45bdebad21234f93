// src/lib.rs

pub mod cli;
pub mod compile;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::compile::CommandCompiler;
use crate::config::resolve_settings;
use crate::engine::{Orchestrator, RunMode, WatchEvent};
use crate::fs::RealFileSystem;
use crate::logging::{Logger, MessageType, TracingLogger};
use crate::types::MatchMode;
use crate::watch::NotifyBackend;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading
/// - path resolution against the working directory
/// - the orchestrator (initial compiles, watch attachment)
/// - the watch runtime, until Ctrl-C
pub async fn run(args: CliArgs) -> Result<()> {
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);

    if args.paths.is_empty() {
        logger.log("No paths specified. Exiting.", MessageType::Warn);
        return Ok(());
    }

    let work_dir = std::env::current_dir()?;
    let mut settings = resolve_settings(args.config.as_deref().map(Path::new), &work_dir)?;
    if args.shallow {
        settings = settings.with_match_mode(MatchMode::Shallow);
    }
    debug!(?settings, "settings resolved");

    let patterns = resolve_patterns(&work_dir, &args.paths);
    let compiler = Arc::new(CommandCompiler::from_settings(settings.compiler()));
    let orchestrator = Orchestrator::new(settings, Arc::new(RealFileSystem), compiler, logger);

    if args.dry_run {
        orchestrator.dry_run(&patterns);
        return Ok(());
    }

    let mode = if args.just_compile {
        RunMode::OneShot
    } else {
        RunMode::Continuous
    };

    // Owns the OS subscriptions; must outlive the runtime.
    let mut backend = NotifyBackend::new();
    let session = orchestrator.start(&patterns, mode, &mut backend).await;

    let Some(runtime) = session.into_runtime() else {
        debug!("nothing to watch; exiting");
        return Ok(());
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = runtime.sender();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(WatchEvent::ShutdownRequested);
        });
    }

    runtime.run().await?;
    info!(watchers = backend.len(), "stopped watching");
    Ok(())
}

/// Make every pattern absolute by joining relative ones onto `work_dir`.
///
/// The working directory is escaped first, so glob metacharacters in its
/// name stay literal and only the user's part is pattern syntax.
pub fn resolve_patterns(work_dir: &Path, raw: &[String]) -> Vec<String> {
    let base = globset::escape(&work_dir.to_string_lossy());
    raw.iter()
        .map(|p| {
            if Path::new(p).is_absolute() {
                p.clone()
            } else {
                Path::new(&base).join(p).to_string_lossy().into_owned()
            }
        })
        .collect()
}
