//! The flat per-note parameter set external tools consume.

use std::path::PathBuf;

use serde::Serialize;

use utakata_score::tone::{self, AccidentalStyle};
use utakata_score::voicebank::VoicebankLookup;
use utakata_score::Note;

use crate::envelope::{self, DEFAULT_ENVELOPE};
use crate::error::RenderError;
use crate::pitch::{self, NoteContext};
use crate::{codec, PitchMode};

/// Explicit configuration for render parameter assembly.
///
/// Everything that used to be ambient (default envelope, output locations,
/// pitch interpretation) is threaded through here so renders are
/// deterministic and concurrent use is safe.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Where resampler intermediates land.
    pub cache_dir: PathBuf,
    /// The final concatenated output file.
    pub output_path: PathBuf,
    /// Which pitch representation the score carries.
    pub pitch_mode: PitchMode,
    /// Wire-format envelope template for notes without one (`%` = overlap).
    pub default_envelope: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            cache_dir: PathBuf::from("cache"),
            output_path: PathBuf::from("output.wav"),
            pitch_mode: PitchMode::Mode2,
            default_envelope: DEFAULT_ENVELOPE.to_string(),
        }
    }
}

/// One note's complete resampler/wavtool parameter set.
///
/// A derived, read-only snapshot: rebuilt per render pass, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RenderNote {
    /// Source sample (voicebank root + resolved file name).
    pub input_path: PathBuf,
    /// Resampler intermediate, named so any parameter change misses the
    /// cache: `{index}_{alias}_{tone}_{fingerprint}.wav`.
    pub cache_path: PathBuf,
    /// Final output file (shared by the whole sequence).
    pub output_path: PathBuf,
    /// Target pitch as a tone name.
    pub target_tone: String,
    pub velocity: i32,
    pub flags: String,
    /// Read start in the source sample (ms), from the oto record.
    pub offset: f64,
    /// Requested output length (ms), rounded up to the resampler's 50 ms
    /// grid with one cell of margin.
    pub target_ms: f64,
    /// Non-stretching span from the offset (ms).
    pub fixed_ms: f64,
    /// Read end (ms): from the tail when positive, from the offset when
    /// negative.
    pub end_ms: f64,
    pub intensity: i32,
    pub modulation: i32,
    /// Pitch grid tempo in the resampler's `!bpm` form.
    pub tempo: String,
    /// Encoded pitch curve; empty for rests.
    pub pitchbend: String,
    /// Applied start point (ms).
    pub stp: f64,
    /// Space-separated envelope for the concatenation tool.
    pub envelope: String,
    /// Length the concatenation tool should consume (ms).
    pub output_ms: f64,
    /// False when the alias did not resolve: feed the source audio straight
    /// to concatenation instead of resampling.
    pub requires_resample: bool,
}

impl RenderNote {
    /// Assemble the parameter set for one auto-fitted note.
    ///
    /// Pure with respect to its inputs: after the sequence-wide auto-fit
    /// pass this may be called for all notes concurrently.
    pub fn build(
        ctx: &NoteContext,
        vb: &(impl VoicebankLookup + ?Sized),
        config: &RenderConfig,
    ) -> Result<RenderNote, RenderError> {
        let note = ctx.note;
        let target_tone = tone::to_tone_name(note.notenum.get(), AccidentalStyle::SharpAscii);

        let mut output_ms = note.ms_length()? + note.at_pre.get();
        if let Some(next) = ctx.next {
            output_ms += next.at_ove.get() - next.at_pre.get();
        }
        let grid_ms = match config.pitch_mode {
            PitchMode::Mode1 => output_ms + note.at_stp.get(),
            PitchMode::Mode2 => output_ms,
        };
        let target_ms = ((grid_ms / 50.0).round() + 1.0) * 50.0;

        let (offset, fixed_ms, end_ms, requires_resample) =
            match vb.oto_timing(note.at_alias.value()) {
                Some(timing) => (timing.offset, timing.consonant, timing.blank, true),
                None => (0.0, 0.0, 0.0, false),
            };

        let pitchbend = if note.is_rest() {
            String::new()
        } else {
            codec::encode_pitch_string(&pitch::synthesize(ctx, target_ms, config.pitch_mode)?)
        };

        let envelope =
            envelope::wire_format(&note.envelope, note.at_ove.get(), &config.default_envelope);

        let cache_name = format!(
            "{}_{}_{}_{}.wav",
            note.num.value().trim_start_matches('#'),
            note.at_alias.value().replace(' ', "+"),
            target_tone,
            fingerprint(note, &pitchbend),
        );

        Ok(RenderNote {
            input_path: vb.root_dir().join(note.at_filename.value()),
            cache_path: config.cache_dir.join(cache_name),
            output_path: config.output_path.clone(),
            target_tone,
            velocity: note.velocity.get(),
            flags: note.flags.value().clone(),
            offset,
            target_ms,
            fixed_ms,
            end_ms,
            intensity: note.intensity.get(),
            modulation: note.modulation.get(),
            tempo: format!("!{:.2}", note.tempo.get()),
            pitchbend,
            stp: note.at_stp.get(),
            envelope,
            output_ms,
            requires_resample,
        })
    }
}

/// Short content fingerprint over every parameter that shapes the resampled
/// audio, so any edit invalidates the cache entry.
fn fingerprint(note: &Note, pitchbend: &str) -> String {
    let payload = format!(
        "{}_{}_{}_{}_{}_{}_{}_{}",
        note.pre.get(),
        note.stp.get(),
        note.velocity.get(),
        note.flags.value(),
        note.intensity.get(),
        note.modulation.get(),
        note.tempo.get(),
        pitchbend,
    );
    blake3::hash(payload.as_bytes()).to_hex()[..6].to_string()
}
