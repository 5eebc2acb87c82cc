//! UTAU render parameter pipeline.
//!
//! This crate turns auto-fitted notes into the flat parameter sets external
//! resamplers and concatenation tools consume. The heavy lifting is the pitch
//! curve: sparse per-note portamento control points, neighbor note-number
//! steps and vibrato are composited into one dense cents-offset curve on the
//! resampler's pitch grid, quantized to 12 bits, and encoded into UTAU's
//! base64/run-length text form.
//!
//! # Flow
//!
//! ```text
//! Ust (auto-fitted) ──┐
//!                     ├── RenderNote::build ── pitch::synthesize ── codec
//! Voicebank lookup ───┘
//! ```
//!
//! Run [`Ust::apply_voicebank`](utakata_score::Ust::apply_voicebank) (or
//! [`pipeline::render_sequence`] which does it for you) before building
//! render notes: auto-fit is an ordered left-to-right pass, while
//! [`RenderNote::build`] is a pure function of immutable notes and may be
//! fanned out freely afterwards.

pub mod codec;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod pitch;
pub mod render_note;

pub use error::{CodecError, RenderError};
pub use pitch::NoteContext;
pub use render_note::{RenderConfig, RenderNote};

/// Which pitch representation a score carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitchMode {
    /// Mode-1: a raw offset array with a start offset.
    Mode1,
    /// Mode-2: sparse portamento breakpoints plus vibrato (the usual form).
    #[default]
    Mode2,
}
