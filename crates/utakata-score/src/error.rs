//! Error types for the score model.

use thiserror::Error;

/// Errors from tone-name conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToneError {
    /// The string is not a recognized letter+accidental+octave spelling.
    #[error("'{0}' is not a tone name")]
    InvalidToneName(String),

    /// The accidental style marker is not one of `#`, `♯`, `b`, `♭`.
    #[error("'{0}' is not an accidental style (#, ♯, b, ♭)")]
    InvalidAccidentalStyle(String),
}

/// Errors from parsing or editing a note parameter field.
///
/// Parse failures are local and non-corrupting: the field keeps its previous
/// state and the caller decides what to do. Index errors on positional list
/// edits signal a programmer error, not malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("'{raw}' is not an integer")]
    NotAnInteger { raw: String },

    #[error("'{raw}' is not a float")]
    NotAFloat { raw: String },

    #[error("'{raw}' is not one of the allowed tokens")]
    NotInEnumSet { raw: String },

    #[error("'{raw}' is not an envelope pattern")]
    InvalidEnvelopePattern { raw: String },

    #[error("'{raw}' is not a vibrato pattern")]
    InvalidVibratoPattern { raw: String },

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors from note-level operations that need fields to be populated first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    /// A prerequisite field was never set. The payload names the field
    /// ("lyric", "notenum", "length", "tempo", "prev lyric").
    #[error("{0} is not set")]
    FieldNotSet(&'static str),
}

/// Errors from loading a score file.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("{0} is not found")]
    FileNotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
