// src/config/validate.rs

use crate::config::model::{RawSettingsFile, Settings};
use crate::errors::{LesswatchError, Result};

impl TryFrom<RawSettingsFile> for Settings {
    type Error = crate::errors::LesswatchError;

    fn try_from(raw: RawSettingsFile) -> std::result::Result<Self, Self::Error> {
        validate_settings(&raw)?;
        Ok(Settings::new_unchecked(raw.watch, raw.compiler))
    }
}

pub fn validate_settings(raw: &RawSettingsFile) -> Result<()> {
    validate_suffixes(raw)?;
    validate_timings(raw)?;
    validate_compiler(raw)?;
    Ok(())
}

fn validate_suffixes(raw: &RawSettingsFile) -> Result<()> {
    let suffix = raw.watch.source_suffix.as_str();
    if suffix.len() < 2 || !suffix.starts_with('.') {
        return Err(LesswatchError::ConfigError(format!(
            "[watch].source_suffix must start with '.' and name an extension (got {suffix:?})"
        )));
    }

    let ext = raw.watch.output_extension.as_str();
    if ext.is_empty() || ext.starts_with('.') || ext.contains('/') {
        return Err(LesswatchError::ConfigError(format!(
            "[watch].output_extension must be a bare extension like \"css\" (got {ext:?})"
        )));
    }

    if suffix.ends_with(&format!(".{ext}")) {
        return Err(LesswatchError::ConfigError(format!(
            "[watch].output_extension {ext:?} would overwrite sources matching {suffix:?}"
        )));
    }
    Ok(())
}

fn validate_timings(raw: &RawSettingsFile) -> Result<()> {
    if raw.watch.settle_ms >= raw.watch.cooldown_ms {
        return Err(LesswatchError::ConfigError(format!(
            "[watch].settle_ms ({}) must be smaller than cooldown_ms ({})",
            raw.watch.settle_ms, raw.watch.cooldown_ms
        )));
    }
    Ok(())
}

fn validate_compiler(raw: &RawSettingsFile) -> Result<()> {
    if raw.compiler.program.trim().is_empty() {
        return Err(LesswatchError::ConfigError(
            "[compiler].program must not be empty".to_string(),
        ));
    }
    if raw.compiler.compress && raw.compiler.compress_flag.trim().is_empty() {
        return Err(LesswatchError::ConfigError(
            "[compiler].compress_flag must not be empty while compress is enabled".to_string(),
        ));
    }
    Ok(())
}
