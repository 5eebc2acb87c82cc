//! Pitch curve synthesis.
//!
//! The curve is sampled on the resampler's pitch grid: 96 points per quarter
//! note, i.e. one point every 5 ticks (`60000 / (tempo * 96)` ms). Values are
//! cents offsets from the note's own pitch.
//!
//! Mode-2 curves are composited by summation of independent contributions,
//! each all-zero when its inputs are absent (no pitch-bend start, rest
//! neighbor, missing neighbor). Geometric edge cases — zero-width segments,
//! boundaries off the end of the axis — contribute nothing rather than
//! erroring; that degeneracy is part of the format's contract.

mod portamento;
mod vibrato;

#[cfg(test)]
mod tests;

pub(crate) use portamento::portamento;
pub(crate) use vibrato::vibrato;

use utakata_score::{Note, NoteError};

use crate::PitchMode;

/// Pitch grid points per quarter note.
pub const POINTS_PER_QUARTER: f64 = 96.0;

/// A note with the neighbors pitch synthesis reads.
///
/// `prev_prev` exists because the previous note's own portamento anchor
/// depends on *its* predecessor's pitch.
#[derive(Debug, Clone, Copy)]
pub struct NoteContext<'a> {
    pub note: &'a Note,
    pub prev: Option<&'a Note>,
    pub prev_prev: Option<&'a Note>,
    pub next: Option<&'a Note>,
}

impl<'a> NoteContext<'a> {
    /// The context of the note at `index` in a score-ordered slice.
    ///
    /// # Panics
    /// Panics when `index` is out of bounds.
    pub fn from_slice(notes: &'a [Note], index: usize) -> Self {
        let at = |i: Option<usize>| i.and_then(|i| notes.get(i));
        NoteContext {
            note: &notes[index],
            prev: at(index.checked_sub(1)),
            prev_prev: at(index.checked_sub(2)),
            next: notes.get(index + 1),
        }
    }

    fn sung_prev(&self) -> Option<&'a Note> {
        self.prev.filter(|n| !n.is_rest())
    }

    fn sung_next(&self) -> Option<&'a Note> {
        self.next.filter(|n| !n.is_rest())
    }
}

/// The pitch grid time axis (ms) spanning `[0, target_ms)`.
pub fn time_axis(tempo: f64, target_ms: f64) -> Vec<f64> {
    let step = 60_000.0 / (tempo * POINTS_PER_QUARTER);
    if step <= 0.0 || target_ms <= 0.0 {
        return Vec::new();
    }
    let count = (target_ms / step).ceil() as usize;
    (0..count).map(|i| i as f64 * step).collect()
}

/// First axis index at or after `ms`, or `None` when `ms` is past the end.
pub(crate) fn first_at_or_after(t: &[f64], ms: f64) -> Option<usize> {
    let index = t.partition_point(|&x| x < ms);
    (index < t.len()).then_some(index)
}

/// Index of the last axis point strictly before `ms`; 0 when there is none.
pub(crate) fn last_before(t: &[f64], ms: f64) -> usize {
    t.partition_point(|&x| x < ms).saturating_sub(1)
}

fn add_into(curve: &mut [i32], contribution: &[i32]) {
    for (slot, value) in curve.iter_mut().zip(contribution) {
        *slot += value;
    }
}

/// Synthesize the full pitch curve for a note, in cents, one value per grid
/// point over `[0, target_ms)`.
///
/// The note and its neighbors must already be auto-fitted. Callers skip rest
/// notes entirely (their curve is empty by definition).
pub fn synthesize(
    ctx: &NoteContext,
    target_ms: f64,
    mode: PitchMode,
) -> Result<Vec<i32>, NoteError> {
    let note = ctx.note;
    let t = time_axis(note.tempo.get(), target_ms);
    if t.is_empty() {
        return Ok(Vec::new());
    }
    let offset = note.at_pre.get() + note.at_stp.get();

    match mode {
        PitchMode::Mode1 => Ok(legacy_points(note, &t, offset)),
        PitchMode::Mode2 => {
            let mut curve = base_step(ctx, &t, offset)?;
            if let Some(prev) = ctx.sung_prev() {
                let shift = offset - prev.ms_length()?;
                add_into(&mut curve, &portamento(prev, ctx.prev_prev, &t, shift));
                add_into(&mut curve, &vibrato(prev, &t, shift)?);
            }
            add_into(&mut curve, &portamento(note, ctx.prev, &t, offset));
            add_into(&mut curve, &vibrato(note, &t, offset)?);
            if let Some(next) = ctx.sung_next() {
                let shift = offset + note.ms_length()?;
                add_into(&mut curve, &portamento(next, Some(note), &t, shift));
            }
            Ok(curve)
        }
    }
}

/// Mode-1: place the raw offset array on the axis, zero elsewhere.
fn legacy_points(note: &Note, t: &[f64], offset: f64) -> Vec<i32> {
    let mut curve = vec![0i32; t.len()];
    let start_ms = offset + note.pb_start.get();
    if let Some(start) = first_at_or_after(t, start_ms) {
        for (i, value) in note.pitches.values().iter().enumerate() {
            match curve.get_mut(start + i) {
                Some(slot) => *slot = *value,
                None => break,
            }
        }
    }
    curve
}

/// The coarse steps caused by crossing into/out of a neighbor's pitch at
/// that neighbor's declared bend start.
///
/// Before the previous note's (shifted) bend start up to this note's own
/// bend start, the base pitch is the previous note's offset; at and after the
/// next note's (shifted) bend start it is the next note's. Everything else is
/// zero.
fn base_step(ctx: &NoteContext, t: &[f64], offset: f64) -> Result<Vec<i32>, NoteError> {
    let note = ctx.note;
    let mut curve = vec![0i32; t.len()];

    if let Some(prev) = ctx.sung_prev() {
        let prev_shift = offset - prev.ms_length()?;
        let boundary = prev.pbs.time() + prev_shift;
        let start = if boundary < 0.0 {
            Some(0)
        } else {
            first_at_or_after(t, boundary)
        };
        let end = last_before(t, note.pbs.time() + offset);
        if let Some(start) = start {
            if start < end {
                let step = (prev.notenum.get() - note.notenum.get()) * 100;
                curve[start..end].fill(step);
            }
        }
    }

    if let Some(next) = ctx.sung_next() {
        let boundary = next.pbs.time() + offset + note.ms_length()?;
        if t.last().is_some_and(|&last| last >= boundary) {
            let start = t.partition_point(|&x| x < boundary);
            let step = (next.notenum.get() - note.notenum.get()) * 100;
            curve[start..].fill(step);
        }
    }

    Ok(curve)
}
