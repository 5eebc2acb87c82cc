//! One scored note and UTAU's auto-fit timing rules.

use crate::error::NoteError;
use crate::field::{EnvelopeField, Field, InterpMode, ListField, PitchBendStartField, VibratoField};
use crate::voicebank::VoicebankLookup;
use crate::TICKS_PER_QUARTER;

/// A single note of a score.
///
/// Notes are owned by their [`Ust`](crate::Ust) in score order; neighbor
/// relations are positional (element `i` has `i-1` as its previous note), so
/// a note never holds a reference to another note.
///
/// Every attribute is a change-tracked field; see the [`field`](crate::field)
/// module for the has-value/modified semantics the plugin-diff writer relies
/// on.
#[derive(Debug, Clone)]
pub struct Note {
    /// Score index token: `#0000`, `#INSERT`, `#DELETE`, `#PREV`, `#NEXT`.
    pub num: Field<String>,
    /// Duration in ticks (quarter note = 480).
    pub length: Field<i32>,
    /// Lyric; `"R"` marks a rest.
    pub lyric: Field<String>,
    /// Pitch as a note number (C4 = 60).
    pub notenum: Field<i32>,
    /// Tempo in bpm governing this note.
    pub tempo: Field<f64>,
    /// Requested pre-utterance (ms); unset means "use the voicebank's".
    pub pre: Field<f64>,
    /// Requested overlap (ms); unset means "use the voicebank's".
    pub ove: Field<f64>,
    /// Requested start point (ms).
    pub stp: Field<f64>,
    /// Pre-utterance actually applied after auto-fit (ms).
    pub at_pre: Field<f64>,
    /// Overlap actually applied after auto-fit (ms).
    pub at_ove: Field<f64>,
    /// Start point actually applied after auto-fit (ms).
    pub at_stp: Field<f64>,
    /// Resolved sample path, relative to the voicebank root.
    pub at_filename: Field<String>,
    /// Resolved oto alias; empty after resolution means "no audio source".
    pub at_alias: Field<String>,
    /// Consonant velocity; scales pre/ove/stp by `2^((100-v)/100)`.
    pub velocity: Field<i32>,
    /// Loudness, 0–200 (100 = -6 dB resampler target).
    pub intensity: Field<i32>,
    /// How much of the source sample's pitch wobble to keep, 0–200.
    pub modulation: Field<i32>,
    /// Mode-1 pitch offsets, one per pitch grid point.
    pub pitches: ListField<i32>,
    /// Where the mode-1 pitch array starts relative to the note head (ms,
    /// typically negative).
    pub pb_start: Field<f64>,
    /// Mode-2 portamento start point.
    pub pbs: PitchBendStartField,
    /// Mode-2 control point heights, tenths of a semitone.
    pub pby: ListField<f64>,
    /// Mode-2 widths between control points (ms).
    pub pbw: ListField<f64>,
    /// Mode-2 interpolation shape per control interval.
    pub pbm: ListField<InterpMode>,
    /// Volume envelope.
    pub envelope: EnvelopeField,
    /// Vibrato.
    pub vibrato: VibratoField,
    /// Free-form label.
    pub label: Field<String>,
    /// Bypass the resampler and feed the sample straight to concatenation.
    pub direct: Field<bool>,
    /// Named selection start marker.
    pub region: Field<String>,
    /// Named selection end marker.
    pub region_end: Field<String>,
    /// Resampler flags.
    pub flags: Field<String>,
}

impl Note {
    /// The reserved rest/silence lyric.
    pub const REST_LYRIC: &'static str = "R";

    pub fn new() -> Self {
        Note {
            num: Field::default(),
            length: Field::with_default(480),
            lyric: Field::default(),
            notenum: Field::with_default(60),
            tempo: Field::with_default(120.0),
            pre: Field::default(),
            ove: Field::default(),
            stp: Field::default(),
            at_pre: Field::default(),
            at_ove: Field::default(),
            at_stp: Field::default(),
            at_filename: Field::default(),
            at_alias: Field::default(),
            velocity: Field::with_default(100),
            intensity: Field::with_default(100),
            modulation: Field::with_default(100),
            pitches: ListField::default(),
            pb_start: Field::default(),
            pbs: PitchBendStartField::default(),
            pby: ListField::default(),
            pbw: ListField::default(),
            pbm: ListField::default(),
            envelope: EnvelopeField::default(),
            vibrato: VibratoField::default(),
            label: Field::default(),
            direct: Field::default(),
            region: Field::default(),
            region_end: Field::default(),
            flags: Field::default(),
        }
    }

    /// Whether this note is the reserved rest.
    pub fn is_rest(&self) -> bool {
        self.lyric.value() == Self::REST_LYRIC
    }

    /// The note's duration in ms: `floor(60 / tempo * length / 480 * 1000)`.
    ///
    /// Requires `length` and `tempo` to have been set.
    pub fn ms_length(&self) -> Result<f64, NoteError> {
        if !self.length.has_value() {
            return Err(NoteError::FieldNotSet("length"));
        }
        if !self.tempo.has_value() {
            return Err(NoteError::FieldNotSet("tempo"));
        }
        let ms = 60.0 / self.tempo.get() * f64::from(self.length.get())
            / f64::from(TICKS_PER_QUARTER)
            * 1000.0;
        Ok(ms.floor())
    }

    /// Resolve the alias against the voicebank and adopt its pre-utterance
    /// and overlap where the user left them unset.
    ///
    /// Resolution order: an explicit `at_alias` wins; otherwise
    /// `prefix + lyric + suffix` from the prefix map, then the plain lyric.
    /// No match resolves to the empty alias — a valid state meaning "no
    /// audio source", not an error.
    ///
    /// Voicebank-sourced pre/ove are adopted without marking the fields
    /// explicit, so a later save-back still omits them while user overrides
    /// are kept.
    pub fn apply_voicebank_defaults(
        &mut self,
        vb: &(impl VoicebankLookup + ?Sized),
    ) -> Result<(), NoteError> {
        if !self.lyric.has_value() {
            return Err(NoteError::FieldNotSet("lyric"));
        }
        if !self.notenum.has_value() {
            return Err(NoteError::FieldNotSet("notenum"));
        }
        let alias = self.resolve_alias(vb);
        let timing = vb.oto_timing(&alias);
        if !self.pre.has_value() {
            self.pre
                .fill(timing.as_ref().map_or(0.0, |t| t.pre_utterance));
        }
        if !self.ove.has_value() {
            self.ove.fill(timing.as_ref().map_or(0.0, |t| t.overlap));
        }
        Ok(())
    }

    fn resolve_alias(&mut self, vb: &(impl VoicebankLookup + ?Sized)) -> String {
        if self.at_alias.has_value() {
            return self.at_alias.value().clone();
        }
        let (prefix, suffix) = vb.prefix_suffix(self.notenum.get());
        let decorated = format!("{}{}{}", prefix, self.lyric.value(), suffix);
        for candidate in [decorated, self.lyric.value().clone()] {
            if let Some(timing) = vb.oto_timing(&candidate) {
                self.at_alias.init(candidate.clone());
                if !self.at_filename.has_value() {
                    self.at_filename.init(timing.file_name);
                }
                return candidate;
            }
        }
        String::new()
    }

    /// Compute the applied pre-utterance, overlap and start point from the
    /// raw values and the previous note's available duration.
    ///
    /// With no previous note the raw values pass through untouched (velocity
    /// is not applied). Otherwise the raw values are scaled by the velocity
    /// rate `2^((100-velocity)/100)`, and only half of a sung predecessor's
    /// duration is available for the lead-in (a rest offers all of it). When
    /// the predecessor is too short, pre and overlap are compressed
    /// proportionally and the start point absorbs the difference.
    pub fn autofit_timings(&mut self, prev: Option<&Note>) -> Result<(), NoteError> {
        let Some(prev) = prev else {
            self.at_pre.init(self.pre.get());
            self.at_ove.init(self.ove.get());
            self.at_stp.init(self.stp.get());
            return Ok(());
        };
        if !prev.lyric.has_value() {
            return Err(NoteError::FieldNotSet("prev lyric"));
        }
        let mut prev_ms = prev.ms_length()?;
        if !prev.is_rest() {
            prev_ms /= 2.0;
        }
        let rate = 2f64.powf(f64::from(100 - self.velocity.get()) / 100.0);
        let real_pre = self.pre.get() * rate;
        let real_ove = self.ove.get() * rate;
        let real_stp = self.stp.get() * rate;
        if prev_ms < real_pre - real_ove {
            let span = real_pre - real_ove;
            let at_pre = real_pre / span * prev_ms;
            self.at_pre.init(at_pre);
            self.at_ove.init(real_ove / span * prev_ms);
            self.at_stp.init(real_pre - at_pre + real_stp);
        } else {
            self.at_pre.init(real_pre);
            self.at_ove.init(real_ove);
            self.at_stp.init(real_stp);
        }
        Ok(())
    }
}

impl Default for Note {
    fn default() -> Self {
        Note::new()
    }
}
