//! Error types for the render pipeline.

use thiserror::Error;
use utakata_score::NoteError;

/// Errors while building render parameters.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A note (or a neighbor it depends on) is missing a prerequisite field.
    #[error(transparent)]
    Note(#[from] NoteError),
}

/// Errors while decoding pitch-bend text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("run-length marker is not terminated")]
    UnterminatedRun,

    #[error("'{0}' is not a run count")]
    InvalidRunCount(String),

    #[error("run-length marker has no preceding token")]
    DanglingRun,

    #[error("dangling half token '{0}'")]
    DanglingHalfToken(char),

    #[error("'{0}' is not a base64 digit")]
    InvalidCharacter(char),
}
