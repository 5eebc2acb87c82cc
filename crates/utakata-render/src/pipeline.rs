//! Sequence-level render orchestration.
//!
//! Auto-fit is an ordered pass (each note reads its predecessor's raw
//! duration and lyric), render parameter assembly is per-note pure. The
//! helpers here run the two phases in the right order and assemble the
//! argument vectors external tools take.

use log::debug;

use utakata_score::voicebank::VoicebankLookup;
use utakata_score::{Note, Ust};

use crate::error::RenderError;
use crate::pitch::NoteContext;
use crate::render_note::{RenderConfig, RenderNote};

/// Auto-fit a whole sequence, then build every note's render parameters.
pub fn render_sequence(
    ust: &mut Ust,
    vb: &(impl VoicebankLookup + ?Sized),
    config: &RenderConfig,
) -> Result<Vec<RenderNote>, RenderError> {
    ust.apply_voicebank(vb)?;
    render_all(&ust.notes, vb, config)
}

/// Build render parameters for every note of an already auto-fitted slice.
///
/// Each note's parameters are a pure function of the (immutable) notes, so
/// this loop is free to become a concurrent fan-out in the caller.
pub fn render_all(
    notes: &[Note],
    vb: &(impl VoicebankLookup + ?Sized),
    config: &RenderConfig,
) -> Result<Vec<RenderNote>, RenderError> {
    let mut rendered = Vec::with_capacity(notes.len());
    for index in 0..notes.len() {
        let note = RenderNote::build(&NoteContext::from_slice(notes, index), vb, config)?;
        debug!(
            "planned {} -> {} ({})",
            note.input_path.display(),
            note.cache_path.display(),
            if note.requires_resample { "resample" } else { "direct" },
        );
        rendered.push(note);
    }
    Ok(rendered)
}

/// The subset of notes that actually need a resampler run, deduplicated by
/// cache fingerprint so each intermediate is produced at most once.
pub fn dedup_jobs(notes: &[RenderNote]) -> Vec<&RenderNote> {
    let mut seen = std::collections::HashSet::new();
    notes
        .iter()
        .filter(|note| note.requires_resample)
        .filter(|note| seen.insert(note.cache_path.clone()))
        .collect()
}

/// The resampler's positional argument vector for one note.
pub fn resampler_args(note: &RenderNote) -> Vec<String> {
    vec![
        note.input_path.display().to_string(),
        note.cache_path.display().to_string(),
        note.target_tone.clone(),
        note.velocity.to_string(),
        note.flags.clone(),
        note.offset.to_string(),
        note.target_ms.to_string(),
        note.fixed_ms.to_string(),
        note.end_ms.to_string(),
        note.intensity.to_string(),
        note.modulation.to_string(),
        note.tempo.clone(),
        note.pitchbend.clone(),
    ]
}

/// The concatenation tool's argument vector for one note.
///
/// Notes that skipped the resampler feed their source sample directly.
pub fn wavtool_args(note: &RenderNote) -> Vec<String> {
    let input = if note.requires_resample {
        &note.cache_path
    } else {
        &note.input_path
    };
    let mut args = vec![
        note.output_path.display().to_string(),
        input.display().to_string(),
        note.stp.to_string(),
        note.output_ms.to_string(),
    ];
    args.extend(note.envelope.split(' ').map(str::to_string));
    args
}
