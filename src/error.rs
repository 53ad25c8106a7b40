//! Error types for grammar synthesis and regeneration.

use thiserror::Error;

/// Errors surfaced by the synthesis pipeline.
///
/// All variants are recoverable at the controller boundary: the current
/// cycle is aborted, the notifier is told, and prior state stays untouched.
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("rule `{rule}` has no valid scope reference or an empty match spec")]
    MalformedRule { rule: String },

    #[error("rule `{rule}` has a malformed regex: {reason}")]
    MalformedRegex { rule: String, reason: String },

    #[error("rule `{rule}` has a literal match spec containing a raw quote")]
    BadLiteral { rule: String },

    #[error("artifact I/O failed during {operation}: {cause}")]
    ArtifactIo { operation: String, cause: String },
}

impl SynthError {
    /// Wrap an I/O-ish failure with the operation that was being attempted.
    pub fn artifact_io(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        SynthError::ArtifactIo {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

pub type SynthResult<T> = Result<T, SynthError>;
