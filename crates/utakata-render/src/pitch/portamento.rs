//! Portamento interpolation across mode-2 control points.

use std::f64::consts::PI;

use utakata_score::{InterpMode, Note};

use super::{first_at_or_after, last_before};

/// The interpolated pitch contribution of one note's PBS/PBW/PBY/PBM data,
/// shifted into the rendered note's time axis by `shift`.
///
/// `prev_of_note` is the note preceding *this* contribution's note: the first
/// control point anchors at that note's pitch when it is sung, else at the
/// PBS height. All-zero when the note has no pitch-bend start.
pub(crate) fn portamento(
    note: &Note,
    prev_of_note: Option<&Note>,
    t: &[f64],
    shift: f64,
) -> Vec<i32> {
    let mut curve = vec![0i32; t.len()];
    if !note.pbs.has_value() || t.is_empty() {
        return curve;
    }
    let (xs, ys, modes) = control_points(note, prev_of_note, shift);
    let last_t = t[t.len() - 1];

    // Interval 0 is the anchor, not a drawn segment.
    for i in 1..xs.len() {
        if last_t <= xs[i] {
            continue;
        }
        let Some(start) = first_at_or_after(t, xs[i - 1]) else {
            continue;
        };
        let end = last_before(t, xs[i]);
        if start >= end {
            continue;
        }
        let cycle = xs[i] - xs[i - 1];
        let height = ys[i] - ys[i - 1];
        let floor = ys[i - 1];
        for k in start..=end {
            let phase = t[k] - xs[i - 1];
            let value = match modes[i - 1] {
                InterpMode::EaseInOut => {
                    ((PI / cycle * phase - PI).cos() + 1.0) * height / 2.0 + floor
                }
                InterpMode::Linear => height / cycle * phase + floor,
                InterpMode::EaseOut => (PI / cycle / 2.0 * phase).sin() * height + floor,
                InterpMode::EaseIn => {
                    (1.0 - (PI / cycle / 2.0 * phase).cos()) * height + floor
                }
            };
            curve[k] = value as i32;
        }
    }
    curve
}

/// Build the control point arrays: cumulative PBW widths shifted by the PBS
/// time, heights from PBY in tenths of a semitone, with an implicit trailing
/// return to baseline and PBM modes padded with the default.
fn control_points(
    note: &Note,
    prev_of_note: Option<&Note>,
    shift: f64,
) -> (Vec<f64>, Vec<f64>, Vec<InterpMode>) {
    let widths = note.pbw.values();
    let mut xs = vec![0.0; widths.len() + 1];
    for (i, width) in widths.iter().enumerate() {
        xs[i + 1] = xs[i] + width;
    }
    for x in &mut xs {
        *x += note.pbs.time() + shift;
    }

    let mut ys = vec![0.0; xs.len()];
    ys[0] = match prev_of_note {
        Some(prev) if !prev.is_rest() => {
            f64::from(prev.notenum.get() - note.notenum.get()) * 100.0
        }
        _ => note.pbs.height() * 10.0,
    };
    let heights = note.pby.values();
    for i in 0..heights.len().min(xs.len() - 1) {
        ys[i + 1] = heights[i] * 10.0;
    }

    let mut modes = note.pbm.values().to_vec();
    modes.resize(xs.len() - 1, InterpMode::default());

    (xs, ys, modes)
}
