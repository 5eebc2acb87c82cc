use pretty_assertions::assert_eq;

use utakata_score::Note;

use super::*;

fn sung(notenum: i32, length: i32, tempo: f64) -> Note {
    let mut n = Note::new();
    n.lyric.init("あ".to_string());
    n.notenum.init(notenum);
    n.length.init(length);
    n.tempo.init(tempo);
    n.at_pre.init(0.0);
    n.at_ove.init(0.0);
    n.at_stp.init(0.0);
    n
}

fn rest(length: i32, tempo: f64) -> Note {
    let mut n = sung(60, length, tempo);
    n.lyric.init(Note::REST_LYRIC.to_string());
    n
}

#[test]
fn axis_is_96_points_per_quarter() {
    // Tempo 100: one quarter note is 600 ms, so the grid step is 6.25 ms.
    let t = time_axis(100.0, 950.0);
    assert_eq!(t.len(), 152);
    assert_eq!(t[0], 0.0);
    assert_eq!(t[1], 6.25);
    assert_eq!(t[48], 300.0);
    assert_eq!(t[151], 943.75);
    assert!(time_axis(100.0, 0.0).is_empty());
}

#[test]
fn index_helpers_match_grid_conventions() {
    let t = time_axis(100.0, 950.0);
    assert_eq!(first_at_or_after(&t, 300.0), Some(48));
    assert_eq!(first_at_or_after(&t, 300.1), Some(49));
    assert_eq!(first_at_or_after(&t, 2000.0), None);
    assert_eq!(last_before(&t, 300.0), 47);
    assert_eq!(last_before(&t, 0.0), 0);
    assert_eq!(last_before(&t, -10.0), 0);
}

// Base-step fixtures: two linked notes at tempo 100 (600 ms each),
// note numbers 58 → 60, the rendered note pulled forward by 300 ms of
// applied pre-utterance.

fn prev_pair() -> (Note, Note) {
    let prev = sung(58, 480, 100.0);
    let mut note = sung(60, 480, 100.0);
    note.at_pre.init(300.0);
    (prev, note)
}

#[test]
fn base_step_without_bend_starts() {
    let (prev, note) = prev_pair();
    let ctx = NoteContext {
        note: &note,
        prev: Some(&prev),
        prev_prev: None,
        next: None,
    };
    let t = time_axis(100.0, 950.0);
    let curve = base_step(&ctx, &t, 300.0).unwrap();
    // Previous pitch holds until this note's (default zero) bend start at
    // the 300 ms mark; the grid point before the boundary stays zero.
    for (i, value) in curve.iter().enumerate() {
        let expected = if i < 47 { -200 } else { 0 };
        assert_eq!(*value, expected, "index {i}");
    }
}

#[test]
fn base_step_respects_own_bend_start() {
    let (prev, mut note) = prev_pair();
    note.pbs.init_str("-150").unwrap();
    let ctx = NoteContext {
        note: &note,
        prev: Some(&prev),
        prev_prev: None,
        next: None,
    };
    let t = time_axis(100.0, 950.0);
    let curve = base_step(&ctx, &t, 300.0).unwrap();
    for (i, value) in curve.iter().enumerate() {
        let expected = if i < 23 { -200 } else { 0 };
        assert_eq!(*value, expected, "index {i}");
    }
}

#[test]
fn base_step_ignores_rest_prev() {
    let (_, mut note) = prev_pair();
    note.pbs.init_str("-150").unwrap();
    let prev = rest(480, 100.0);
    let ctx = NoteContext {
        note: &note,
        prev: Some(&prev),
        prev_prev: None,
        next: None,
    };
    let t = time_axis(100.0, 950.0);
    assert_eq!(base_step(&ctx, &t, 300.0).unwrap(), vec![0; t.len()]);
}

#[test]
fn base_step_clamps_prev_boundary_to_axis_start() {
    // With a large start point the previous note's bend start lands inside
    // the axis instead of before it.
    let (mut prev, mut note) = prev_pair();
    prev.pbs.init_str("-150").unwrap();
    note.pbs.init_str("-150").unwrap();
    note.at_pre.init(300.0);
    note.at_stp.init(600.0);
    let ctx = NoteContext {
        note: &note,
        prev: Some(&prev),
        prev_prev: None,
        next: None,
    };
    let t = time_axis(100.0, 1550.0);
    let curve = base_step(&ctx, &t, 900.0).unwrap();
    // prev boundary: -150 + (900 - 600) = 150 ms → index 24;
    // own boundary: -150 + 900 = 750 ms → last point before is 119.
    for (i, value) in curve.iter().enumerate() {
        let expected = if (24..119).contains(&i) { -200 } else { 0 };
        assert_eq!(*value, expected, "index {i}");
    }
}

#[test]
fn base_step_steps_into_next_note() {
    let mut note = sung(60, 480, 100.0);
    note.at_pre.init(300.0);
    let next = sung(62, 480, 100.0);
    let ctx = NoteContext {
        note: &note,
        prev: None,
        prev_prev: None,
        next: Some(&next),
    };
    let t = time_axis(100.0, 950.0);
    let curve = base_step(&ctx, &t, 300.0).unwrap();
    // Next note's bend start (default 0) shifted by pre + duration = 900 ms.
    for (i, value) in curve.iter().enumerate() {
        let expected = if i >= 144 { 200 } else { 0 };
        assert_eq!(*value, expected, "index {i}");
    }
}

#[test]
fn base_step_skips_next_boundary_off_axis() {
    let mut note = sung(60, 480, 100.0);
    note.at_pre.init(0.0);
    let next = sung(62, 480, 100.0);
    let ctx = NoteContext {
        note: &note,
        prev: None,
        prev_prev: None,
        next: Some(&next),
    };
    // Axis ends at 593.75 ms, next boundary is at 600 ms.
    let t = time_axis(100.0, 600.0);
    assert_eq!(base_step(&ctx, &t, 0.0).unwrap(), vec![0; t.len()]);
}

#[test]
fn portamento_without_pbs_is_silent() {
    let note = sung(60, 480, 125.0);
    let t = time_axis(125.0, 550.0);
    assert_eq!(portamento(&note, None, &t, 0.0), vec![0; t.len()]);
}

#[test]
fn portamento_linear_segment() {
    // One linear segment from the previous pitch (+200 cents) back to
    // baseline: control points at -100 ms and +100 ms.
    let prev = sung(62, 480, 125.0);
    let mut note = sung(60, 480, 125.0);
    note.pbs.init_str("-100").unwrap();
    note.pbw.init_str("200").unwrap();
    note.pbm.init_str("s").unwrap();
    let t = time_axis(125.0, 200.0);
    let curve = portamento(&note, Some(&prev), &t, 0.0);
    // value = 200 - (t + 100) on [0, 100), zero from 100 on.
    assert_eq!(curve[0], 100);
    assert_eq!(curve[10], 50);
    assert_eq!(curve[19], 5);
    assert_eq!(curve[20], 0);
    assert_eq!(curve[30], 0);
}

#[test]
fn portamento_anchor_uses_pbs_height_after_rest() {
    let prev = rest(480, 125.0);
    let mut note = sung(60, 480, 125.0);
    note.pbs.init_str("-100;20").unwrap();
    note.pbw.init_str("200").unwrap();
    note.pbm.init_str("s").unwrap();
    let t = time_axis(125.0, 200.0);
    let curve = portamento(&note, Some(&prev), &t, 0.0);
    // Anchor is height * 10 = 200 cents, same ramp as the sung-prev case.
    assert_eq!(curve[0], 100);
    assert_eq!(curve[10], 50);
}

#[test]
fn portamento_cosine_ease_midpoint() {
    let prev = sung(62, 480, 125.0);
    let mut note = sung(60, 480, 125.0);
    note.pbs.init_str("-100").unwrap();
    note.pbw.init_str("200").unwrap();
    let t = time_axis(125.0, 200.0);
    let curve = portamento(&note, Some(&prev), &t, 0.0);
    // The segment spans [-100, 100) ms, so the axis sees its second half:
    // the cosine passes through half height at the segment midpoint and
    // flattens into the endpoint.
    assert_eq!(curve[0], 100);
    assert_eq!(curve[10], 29);
    assert_eq!(curve[19], 0);
    assert_eq!(curve[20], 0);
}

#[test]
fn portamento_skips_segments_past_axis_end() {
    let prev = sung(62, 480, 125.0);
    let mut note = sung(60, 480, 125.0);
    note.pbs.init_str("50").unwrap();
    note.pbw.init_str("100").unwrap();
    // Axis ends at 95 ms; the segment's right edge is at 150 ms.
    let t = time_axis(125.0, 100.0);
    assert_eq!(portamento(&note, Some(&prev), &t, 0.0), vec![0; t.len()]);
}

#[test]
fn vibrato_quarter_cycle_pattern() {
    // Window: last 50% of a 480 ms note → [240, 480). Cycle 100 ms, depth
    // 100 cents, no fades, no phase shift, no bias.
    let mut note = sung(60, 480, 125.0);
    note.vibrato.init_str("50,100,100,0,0,0,0").unwrap();
    let t = time_axis(125.0, 550.0);
    let curve = vibrato(&note, &t, 0.0).unwrap();
    assert_eq!(curve[47], 0); // before the window
    assert_eq!(curve[53], 100); // τ = 25 ms, quarter cycle
    assert_eq!(curve[58], 0); // τ = 50 ms
    assert_eq!(curve[63], -100); // τ = 75 ms
    assert_eq!(curve[68], 0); // τ = 100 ms
    assert_eq!(curve[73], 100);
    assert_eq!(curve[96], 0); // past the window
}

#[test]
fn vibrato_fade_in_scales_linearly() {
    let mut note = sung(60, 480, 125.0);
    // Fade-in covers the whole 240 ms window.
    note.vibrato.init_str("50,100,100,100,0,0,0").unwrap();
    let t = time_axis(125.0, 550.0);
    let curve = vibrato(&note, &t, 0.0).unwrap();
    // τ = 25 ms → fade 25/240; sin is +1 there.
    assert_eq!(curve[53], (100.0_f64 * 25.0 / 240.0).round() as i32);
    // τ = 225 ms → fade 225/240, sin +1 again (2.25 cycles).
    assert_eq!(curve[93], (100.0_f64 * 225.0 / 240.0).round() as i32);
}

#[test]
fn vibrato_height_biases_the_wave() {
    let mut note = sung(60, 480, 125.0);
    note.vibrato.init_str("50,100,100,0,0,0,100").unwrap();
    let t = time_axis(125.0, 550.0);
    let curve = vibrato(&note, &t, 0.0).unwrap();
    // Bias +100%: the wave rides from 0 to +200 instead of ±100.
    assert_eq!(curve[53], 200);
    assert_eq!(curve[63], 0);
}

#[test]
fn vibrato_without_field_is_silent() {
    let note = sung(60, 480, 125.0);
    let t = time_axis(125.0, 550.0);
    assert_eq!(vibrato(&note, &t, 0.0).unwrap(), vec![0; t.len()]);
}

#[test]
fn legacy_points_are_placed_at_the_start_offset() {
    let mut note = sung(60, 480, 125.0);
    note.at_pre.init(100.0);
    note.pb_start.init(-10.0);
    note.pitches.init_str("10,20,30").unwrap();
    let curve = synthesize(
        &NoteContext {
            note: &note,
            prev: None,
            prev_prev: None,
            next: None,
        },
        300.0,
        crate::PitchMode::Mode1,
    )
    .unwrap();
    // Start at the first grid point at/after 90 ms → index 18.
    assert_eq!(&curve[17..22], &[0, 10, 20, 30, 0]);
}

#[test]
fn legacy_points_clamp_to_axis_end() {
    let mut note = sung(60, 480, 125.0);
    note.at_pre.init(0.0);
    note.pb_start.init(90.0);
    note.pitches.init_str("10,20,30").unwrap();
    let curve = synthesize(
        &NoteContext {
            note: &note,
            prev: None,
            prev_prev: None,
            next: None,
        },
        100.0,
        crate::PitchMode::Mode1,
    )
    .unwrap();
    assert_eq!(curve.len(), 20);
    assert_eq!(&curve[18..], &[10, 20]);
}

#[test]
fn mode2_contributions_sum() {
    // Base step (-200 until the bend start) plus a linear portamento ramp
    // over the same region add arithmetically.
    let prev = sung(58, 480, 100.0);
    let mut note = sung(60, 480, 100.0);
    note.at_pre.init(300.0);
    note.pbs.init_str("0").unwrap();
    note.pbw.init_str("200").unwrap();
    note.pbm.init_str("s").unwrap();
    let ctx = NoteContext {
        note: &note,
        prev: Some(&prev),
        prev_prev: None,
        next: None,
    };
    let curve = synthesize(&ctx, 950.0, crate::PitchMode::Mode2).unwrap();
    // At t = 0: base -200, portamento not yet started (anchor at 300 ms).
    assert_eq!(curve[0], -200);
    // At t = 400 (index 64): base 0, ramp from -200 at 300 ms to 0 at
    // 500 ms → -100.
    assert_eq!(curve[64], -100);
    // Past the portamento (t ≥ 500 ms): everything back to baseline.
    assert_eq!(curve[80], 0);
}

#[test]
fn sung_neighbor_filters() {
    let prev = rest(480, 100.0);
    let next = sung(62, 480, 100.0);
    let note = sung(60, 480, 100.0);
    let ctx = NoteContext {
        note: &note,
        prev: Some(&prev),
        prev_prev: None,
        next: Some(&next),
    };
    assert!(ctx.sung_prev().is_none());
    assert!(ctx.sung_next().is_some());
}
