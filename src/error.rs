//! Structured error types for resolution, coercion and loading.

use crate::merge::Format;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by decoders and self-decoding fields.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure kinds raised by the engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The load target is not a struct.
    #[error("load target must be a struct, got {type_name}")]
    RootNotStruct { type_name: &'static str },

    /// An unset optional value sits in the middle of the path.
    #[error("path segment '{segment}' is unreachable: value is unset")]
    PathUnreachable { segment: String },

    #[error("field not found: {segment}")]
    FieldNotFound { segment: String },

    #[error("invalid index: {segment}")]
    InvalidIndex { segment: String },

    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Segments remain but the current value cannot be traversed.
    #[error("cannot traverse '{segment}' through {kind}")]
    UnsupportedContainer { segment: String, kind: &'static str },

    #[error("value of type {type_name} is not settable")]
    NotSettable { type_name: &'static str },

    #[error("cannot convert {value} into {expected}")]
    TypeCoercion { expected: &'static str, value: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode {format} document: {source}")]
    Decode {
        format: DecodeOrigin,
        #[source]
        source: BoxError,
    },

    #[error("failed to open {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A field marked as a file reference no longer holds text.
    #[error("file reference '{path}' does not hold a string")]
    FileFieldNotString { path: String },
}

impl ConfigError {
    // Convenience constructors

    pub fn coercion(expected: &'static str, value: impl fmt::Display) -> Self {
        Self::TypeCoercion {
            expected,
            value: value.to_string(),
        }
    }

    pub fn decode(format: impl Into<DecodeOrigin>, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            format: format.into(),
            source: source.into(),
        }
    }

    /// Whether this is a decode failure, from a file or a self-decoding field.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// What produced the document a decode failure is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOrigin {
    /// A configuration file in the given format.
    File(Format),
    /// A value handed to a self-decoding field.
    Value,
}

impl From<Format> for DecodeOrigin {
    fn from(format: Format) -> Self {
        DecodeOrigin::File(format)
    }
}

impl fmt::Display for DecodeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeOrigin::File(format) => write!(f, "{}", format),
            DecodeOrigin::Value => write!(f, "value"),
        }
    }
}

/// Stage of a load, in the order sources are applied by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Explicitly registered files
    Files,
    /// Explicitly supplied command-line flags
    Flags,
    /// Prefixed environment variables
    Env,
    /// Files named by file-reference fields of the target
    FileFields,
}

impl Stage {
    /// Canonical precedence: files, flags, environment, file fields.
    pub const CANONICAL: [Stage; 4] = [Stage::Files, Stage::Flags, Stage::Env, Stage::FileFields];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Files => write!(f, "file"),
            Stage::Flags => write!(f, "flag"),
            Stage::Env => write!(f, "env"),
            Stage::FileFields => write!(f, "file field"),
        }
    }
}

/// Error returned by [`crate::Loader::load`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The target was rejected before any source was applied.
    #[error("invalid load target")]
    Target(#[source] ConfigError),

    /// A stage failed; `subject` names the file, flag or variable involved.
    #[error("{stage} source '{subject}' failed")]
    Stage {
        stage: Stage,
        subject: String,
        #[source]
        source: ConfigError,
    },
}

impl LoadError {
    pub(crate) fn stage(stage: Stage, subject: impl Into<String>, source: ConfigError) -> Self {
        Self::Stage {
            stage,
            subject: subject.into(),
            source,
        }
    }

    /// The underlying failure kind.
    pub fn error(&self) -> &ConfigError {
        match self {
            LoadError::Target(err) => err,
            LoadError::Stage { source, .. } => source,
        }
    }

    /// The stage that failed, if any stage ran.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            LoadError::Target(_) => None,
            LoadError::Stage { stage, .. } => Some(*stage),
        }
    }
}

/// Result type for engine operations.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
