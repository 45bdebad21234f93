// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawSettingsFile, Settings};
use crate::errors::{LesswatchError, Result};

/// Load a settings file and return the raw `RawSettingsFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// checked [`Settings`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettingsFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawSettingsFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a settings file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let raw = load_from_path(&path)?;
    Settings::try_from(raw)
}

/// Resolve the settings for a run.
///
/// - An explicitly named file must exist.
/// - Without one, `Lesswatch.toml` in `work_dir` is used when present,
///   otherwise the built-in defaults.
pub fn resolve_settings(explicit: Option<&Path>, work_dir: &Path) -> Result<Settings> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(LesswatchError::ConfigError(format!(
                "settings file {:?} does not exist",
                path
            )));
        }
        return load_and_validate(path);
    }

    let fallback = work_dir.join(default_config_path());
    if fallback.is_file() {
        debug!(path = ?fallback, "using settings file from working directory");
        load_and_validate(&fallback)
    } else {
        Ok(Settings::default())
    }
}

/// File name looked up in the working directory when `--config` is absent.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Lesswatch.toml")
}
