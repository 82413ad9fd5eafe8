// src/error.rs
use serde::Serialize;
use thiserror::Error;

/// Fatal configuration problems, raised before any scanning begins.
///
/// Everything below this level (unreadable files, unparseable content,
/// unresolvable references) is absorbed locally and surfaced through
/// [`Diagnostic`] instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid ignore pattern `{pattern}`: {source}")]
    InvalidIgnorePattern {
        pattern: String,
        source: globset::Error,
    },

    #[error("invalid scoring weight `{name}`: {value} (must be finite and >= 0)")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("language map entry has an empty extension")]
    EmptyExtension,

    #[error("simulation requires at least one iteration")]
    ZeroIterations,

    #[error("viewport dimensions must be positive, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("collision radius bounds are inverted: min {min} > max {max}")]
    InvertedRadiusBounds { min: f32, max: f32 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Category of a recovered, non-fatal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A path was unreadable or vanished mid-scan. The entry is skipped.
    Io,
    /// A language capability could not parse a file. The heuristic
    /// extractor was used for that file instead.
    Parse,
}

/// One recovered failure, accumulated onto the scan result.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Repository-relative path the failure applies to, if any.
    pub path: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn io(path: impl Into<Option<String>>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Io,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Parse,
            path: Some(path.into()),
            message: message.into(),
        }
    }
}
