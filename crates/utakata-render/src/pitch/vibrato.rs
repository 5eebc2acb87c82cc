//! Vibrato: a faded sinusoid over the tail of a note.

use std::f64::consts::PI;

use utakata_score::{Note, NoteError};

use super::{first_at_or_after, last_before};

/// The vibrato contribution of one note, shifted into the rendered note's
/// time axis by `shift`. All-zero when the note carries no vibrato.
///
/// The window is the last `length%` of the note. Inside it the sinusoid
/// `sin(2π/cycle·τ + 2π·phase/100) + height/100` is scaled by the truncated
/// depth and a triangular fade: linear rise over the fade-in span, flat 1,
/// linear fall over the fade-out span.
pub(crate) fn vibrato(note: &Note, t: &[f64], shift: f64) -> Result<Vec<i32>, NoteError> {
    let mut curve = vec![0i32; t.len()];
    let v = &note.vibrato;
    if !v.has_value() || t.is_empty() {
        return Ok(curve);
    }
    let ms_length = note.ms_length()?;
    let start_ms = shift + ms_length * (100.0 - v.length()) / 100.0;
    let end_ms = shift + ms_length;
    let Some(start) = first_at_or_after(t, start_ms) else {
        return Ok(curve);
    };
    let end = last_before(t, end_ms);
    if start >= end {
        return Ok(curve);
    }

    let vibrato_ms = ms_length * v.length() / 100.0;
    let fade_in_ms = vibrato_ms * v.fade_in() / 100.0;
    let fade_out_start = vibrato_ms - vibrato_ms * v.fade_out() / 100.0;
    let phase_offset = 2.0 * PI * v.phase() / 100.0;
    let depth = v.depth().trunc();

    for k in start..=end {
        let tau = t[k] - start_ms;
        let fade = if tau <= fade_in_ms && fade_in_ms != 0.0 {
            tau / fade_in_ms
        } else if tau >= fade_out_start && vibrato_ms > fade_out_start {
            1.0 - (tau - fade_out_start) / (vibrato_ms - fade_out_start)
        } else {
            1.0
        };
        let wave = (2.0 * PI / v.cycle() * tau + phase_offset).sin() + v.height() / 100.0;
        curve[k] = (wave * fade * depth).round() as i32;
    }
    Ok(curve)
}
