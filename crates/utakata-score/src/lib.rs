//! UTAU score model.
//!
//! This crate holds the note-side half of the utakata pipeline: tone-name
//! conversion, the typed/change-tracked parameter fields every note attribute
//! is made of, the [`Note`] itself with UTAU's auto-fit timing rules, and the
//! [`Ust`] score container with plugin-diff serialization.
//!
//! # Field tracking
//!
//! UTAU plugins communicate by diff: a field is written back to the host only
//! if it was touched after load. Every attribute is therefore a
//! [`field::Field`] (or one of its composite cousins) that records whether it
//! carries an explicit value at all and whether it was modified since load.
//!
//! # Auto-fit
//!
//! A note cannot claim more lead-in time than its predecessor can physically
//! supply. [`Note::autofit_timings`] resolves that contention: pre-utterance
//! and overlap are scaled down together, preserving their ratio, and the
//! start point absorbs the remainder. See the method docs for the exact
//! rules.

pub mod error;
pub mod field;
pub mod note;
pub mod sequence;
pub mod tone;
pub mod voicebank;

pub use error::{FieldError, NoteError, ScoreError, ToneError};
pub use field::{EnvelopeField, Field, InterpMode, ListField, PitchBendStartField, VibratoField};
pub use note::Note;
pub use sequence::Ust;
pub use tone::AccidentalStyle;
pub use voicebank::{OtoTiming, VoicebankLookup};

/// Ticks per quarter note in UST scores.
pub const TICKS_PER_QUARTER: i32 = 480;
