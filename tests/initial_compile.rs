// tests/initial_compile.rs

mod common;
use crate::common::*;

use std::error::Error;
use std::fs;

use tempfile::tempdir;

use lesswatch::engine::{RunMode, TargetState};
use lesswatch::logging::MessageType;
use lesswatch::types::MatchMode;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn valid_and_broken_sources_in_one_folder() -> TestResult {
    init_tracing();

    let root = tempdir()?;
    let styles = root.path().join("styles");
    write(&styles, "a.less", "a { color: red; }");
    write(&styles, "b.less", &format!("b {{ {SYNTAX_ERROR} }}"));

    let compiler = FakeCompiler::new();
    let logger = RecordingLogger::new();
    let orch = orchestrator(SettingsBuilder::new().build(), &compiler, &logger);

    let mut backend = FakeBackend::new();
    let session = orch
        .start(&[format!("{}/", styles.display())], RunMode::OneShot, &mut backend)
        .await;

    assert_eq!(
        fs::read_to_string(styles.join("a.css"))?,
        FakeCompiler::expected_output("a { color: red; }")
    );
    assert!(!styles.join("b.css").exists());

    let errors = logger.of_kind(MessageType::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("b.less"));

    let infos = logger.of_kind(MessageType::Info);
    assert_eq!(infos.iter().filter(|m| m.contains("a.css")).count(), 1);

    // A broken file does not fail the target.
    assert_eq!(session.summary.failures, 0);
    assert_eq!(session.summary.targets[0].state, TargetState::OneShotDone);
    Ok(())
}

#[tokio::test]
async fn one_output_per_source_with_swapped_extension() -> TestResult {
    init_tracing();

    let root = tempdir()?;
    let sources = ["main.less", "parts/buttons.less", "parts/forms/inputs.less"];
    for (i, rel) in sources.iter().enumerate() {
        write(root.path(), rel, &format!(".c{i} {{}}"));
    }
    write(root.path(), "notes.txt", "not a style");

    let compiler = FakeCompiler::new();
    let logger = RecordingLogger::new();
    let orch = orchestrator(SettingsBuilder::new().build(), &compiler, &logger);

    let mut backend = FakeBackend::new();
    orch.start(&[pattern(root.path())], RunMode::OneShot, &mut backend)
        .await;

    for (i, rel) in sources.iter().enumerate() {
        let out = root.path().join(rel.replace(".less", ".css"));
        assert_eq!(
            fs::read_to_string(&out)?,
            FakeCompiler::expected_output(&format!(".c{i} {{}}"))
        );
    }
    assert!(!root.path().join("notes.css").exists());
    assert_eq!(compiler.call_count(), sources.len());
    Ok(())
}

#[tokio::test]
async fn compiler_gets_each_files_own_directory_for_imports() -> TestResult {
    init_tracing();

    let root = tempdir()?;
    write(root.path(), "top.less", "x");
    write(root.path(), "nested/inner.less", "y");

    let compiler = FakeCompiler::new();
    let logger = RecordingLogger::new();
    let orch = orchestrator(SettingsBuilder::new().build(), &compiler, &logger);

    let mut backend = FakeBackend::new();
    orch.start(&[pattern(root.path())], RunMode::OneShot, &mut backend)
        .await;

    let mut dirs = compiler.calls();
    dirs.sort();
    assert_eq!(dirs, vec![root.path().to_path_buf(), root.path().join("nested")]);
    Ok(())
}

#[tokio::test]
async fn shallow_mode_with_glob_compiles_each_directory_once() -> TestResult {
    init_tracing();

    let root = tempdir()?;
    write(root.path(), "themes/dark/main.less", "dark");
    write(root.path(), "themes/light/main.less", "light");
    write(root.path(), "themes/base.less", "base");

    let compiler = FakeCompiler::new();
    let logger = RecordingLogger::new();
    let settings = SettingsBuilder::new().match_mode(MatchMode::Shallow).build();
    let orch = orchestrator(settings, &compiler, &logger);

    let patterns = vec![
        pattern(&root.path().join("themes")),
        pattern(&root.path().join("themes/*")),
    ];
    let mut backend = FakeBackend::new();
    let session = orch.start(&patterns, RunMode::OneShot, &mut backend).await;

    assert_eq!(compiler.call_count(), 3);
    let dirs: Vec<_> = session.summary.targets.iter().map(|t| t.dir.clone()).collect();
    assert_eq!(
        dirs,
        vec![
            root.path().join("themes"),
            root.path().join("themes/dark"),
            root.path().join("themes/light"),
        ]
    );
    assert!(root.path().join("themes/dark/main.css").exists());
    Ok(())
}

#[tokio::test]
async fn one_shot_installs_no_watch_and_reports_just_compiled() -> TestResult {
    init_tracing();

    let root = tempdir()?;
    write(root.path(), "a.less", "a");

    let compiler = FakeCompiler::new();
    let logger = RecordingLogger::new();
    let orch = orchestrator(SettingsBuilder::new().build(), &compiler, &logger);

    let mut backend = FakeBackend::new();
    let session = orch
        .start(&[pattern(root.path())], RunMode::OneShot, &mut backend)
        .await;

    assert!(backend.attached_dirs().is_empty());
    assert!(session.runtime().is_none());

    // Nothing is listening, so later changes compile nothing.
    write(root.path(), "a.less", "a changed");
    assert!(!backend.notify(root.path(), Some("a.less")));
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    assert_eq!(compiler.call_count(), 1);

    let infos = logger.of_kind(MessageType::Info);
    assert_eq!(infos.last().map(String::as_str), Some("Just compiled 1 folder(s)."));
    Ok(())
}

#[tokio::test]
async fn work_dir_with_glob_metacharacters_stays_literal() -> TestResult {
    init_tracing();

    let root = tempdir()?;
    let work = root.path().join("proj[1]");
    write(&work, "styles/a.less", "a");
    write(&work, "themes/dark/b.less", "b");

    let compiler = FakeCompiler::new();
    let logger = RecordingLogger::new();
    let orch = orchestrator(SettingsBuilder::new().build(), &compiler, &logger);

    let patterns = lesswatch::resolve_patterns(&work, &["styles".to_string(), "themes/*".to_string()]);
    let mut backend = FakeBackend::new();
    let session = orch.start(&patterns, RunMode::OneShot, &mut backend).await;

    assert_eq!(compiler.call_count(), 2);
    assert_eq!(session.summary.failures, 0);
    let dirs: Vec<_> = session.summary.targets.iter().map(|t| t.dir.clone()).collect();
    assert_eq!(dirs, vec![work.join("styles"), work.join("themes/dark")]);
    assert!(work.join("styles/a.css").exists());
    assert_eq!(
        logger.of_kind(MessageType::Info).last().map(String::as_str),
        Some("Just compiled 2 folder(s).")
    );
    Ok(())
}
