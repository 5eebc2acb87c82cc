//! Error types for voicebank loading.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoicebankError {
    #[error("{0} is not found or not a directory")]
    NotFound(PathBuf),

    #[error("{0} is not an UTAU voicebank")]
    NotAVoicebank(PathBuf),

    #[error("{0} is not found")]
    FileNotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
