use std::fmt;

use serde::Deserialize;

/// How the file matcher walks a watched directory.
///
/// - `Recursive`: descend into every subdirectory (default).
/// - `Shallow`: only files directly inside the directory. Nested directories
///   are expected to be resolved as their own targets by the path patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Recursive,
    Shallow,
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Recursive
    }
}

/// Severity of a message handed to the user-facing [`Logger`](crate::logging::Logger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Error,
    Warn,
    Info,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::Error => "error",
            MessageType::Warn => "warn",
            MessageType::Info => "info",
        };
        f.write_str(s)
    }
}
