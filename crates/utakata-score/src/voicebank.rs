//! The lookup interface a note needs from a voicebank.
//!
//! The score side never touches a concrete voicebank store: alias resolution
//! and timing defaults go through this trait, implemented by
//! `utakata-voicebank::Voicebank` (or by test doubles).

use std::path::Path;

/// Timing metadata for one oto entry: where in the source sample the
/// meaningful audio lies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OtoTiming {
    /// Path of the audio sample, relative to the voicebank root.
    pub file_name: String,
    /// Read start position in the sample (ms).
    pub offset: f64,
    /// Lead-in before the note's nominal onset (ms).
    pub pre_utterance: f64,
    /// Crossfade with the previous note (ms).
    pub overlap: f64,
    /// Non-stretching consonant span measured from the offset (ms).
    pub consonant: f64,
    /// Read end: from the sample tail when positive, from the offset when
    /// negative.
    pub blank: f64,
}

/// Voicebank queries consumed by the score and render layers.
pub trait VoicebankLookup {
    /// The pitch-dependent alias decoration for a note number.
    /// `(prefix, suffix)`, both possibly empty.
    fn prefix_suffix(&self, note_number: i32) -> (String, String);

    /// Timing metadata for an alias, if the voicebank knows it.
    fn oto_timing(&self, alias: &str) -> Option<OtoTiming>;

    /// The voicebank root directory, for resolving sample paths.
    fn root_dir(&self) -> &Path;
}
