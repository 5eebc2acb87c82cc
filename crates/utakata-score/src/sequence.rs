//! The UST score container: ordered notes plus project header.
//!
//! Loading is deliberately tolerant: a malformed field value on one line must
//! not sink a whole score, so the loader substitutes the documented default
//! for that field and logs a warning. That policy lives here — the fields
//! themselves reject bad input and stay untouched.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::{FieldError, NoteError, ScoreError};
use crate::field::fmt_float;
use crate::note::Note;
use crate::voicebank::VoicebankLookup;

/// An UTAU sequence text score (or plugin temp file).
#[derive(Debug, Clone)]
pub struct Ust {
    pub version: f64,
    pub project_name: String,
    /// Voicebank directory as written in the score (may carry `%VOICE%`).
    pub voice_dir: String,
    pub cache_dir: String,
    pub output_file: String,
    /// Project tempo in bpm; seeds every note until a note overrides it.
    pub tempo: f64,
    pub wavtool: String,
    pub resampler: String,
    /// Project default flags, inherited by every note.
    pub flags: String,
    /// Whether pitch data is mode-2 breakpoints (vs. mode-1 raw points).
    pub mode2: bool,
    /// Notes in score order. Element `i-1` is note `i`'s previous note.
    pub notes: Vec<Note>,
}

impl Default for Ust {
    fn default() -> Self {
        Ust {
            version: 1.2,
            project_name: String::new(),
            voice_dir: String::new(),
            cache_dir: String::new(),
            output_file: String::new(),
            tempo: 120.0,
            wavtool: String::new(),
            resampler: String::new(),
            flags: String::new(),
            mode2: false,
            notes: Vec::new(),
        }
    }
}

impl Ust {
    /// Read and parse a score file.
    ///
    /// The file must be UTF-8; transcode legacy cp932 scores before loading.
    pub fn load(path: &Path) -> Result<Ust, ScoreError> {
        if !path.is_file() {
            return Err(ScoreError::FileNotFound(path.to_path_buf()));
        }
        Ok(Ust::parse(&fs::read_to_string(path)?))
    }

    /// Parse score text.
    pub fn parse(text: &str) -> Ust {
        let mut ust = Ust::default();
        let mut running_tempo = ust.tempo;
        let mut expect_version = false;
        let mut in_header = true;

        for raw_line in text.lines() {
            let line = raw_line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            if let Some(section) = line.strip_prefix("[#").and_then(|s| s.strip_suffix(']')) {
                match section {
                    "VERSION" => {
                        expect_version = true;
                        continue;
                    }
                    "SETTING" => continue,
                    "TRACKEND" => break,
                    _ => {
                        if in_header {
                            in_header = false;
                            running_tempo = ust.tempo;
                        }
                        let mut note = Note::new();
                        note.num.init(format!("#{section}"));
                        note.tempo.init(running_tempo);
                        note.flags.init(ust.flags.clone());
                        ust.notes.push(note);
                        continue;
                    }
                }
            }
            if expect_version {
                expect_version = false;
                if let Ok(v) = line.replace("UST Version", "").trim().parse() {
                    ust.version = v;
                }
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if in_header {
                ust.apply_header_field(key, value);
            } else if let Some(note) = ust.notes.last_mut() {
                apply_note_field(note, key, value, &mut running_tempo);
            }
        }
        ust
    }

    fn apply_header_field(&mut self, key: &str, value: &str) {
        match key {
            "Tempo" => match value.trim().parse() {
                Ok(tempo) => self.tempo = tempo,
                Err(_) => warn!("header Tempo '{value}' is not a float, keeping {}", self.tempo),
            },
            "Project" => self.project_name = value.to_string(),
            "VoiceDir" => self.voice_dir = value.to_string(),
            "OutFile" => self.output_file = value.to_string(),
            "CacheDir" => self.cache_dir = value.to_string(),
            "Tool1" => self.wavtool = value.to_string(),
            "Tool2" => self.resampler = value.to_string(),
            "Flags" => self.flags = value.to_string(),
            "Mode2" => self.mode2 = matches!(value.trim(), "True" | "true" | "1"),
            _ => {}
        }
    }

    /// The previous note of the note at `index`, if any.
    pub fn prev(&self, index: usize) -> Option<&Note> {
        index.checked_sub(1).and_then(|i| self.notes.get(i))
    }

    /// The next note of the note at `index`, if any.
    pub fn next(&self, index: usize) -> Option<&Note> {
        self.notes.get(index + 1)
    }

    /// Run voicebank defaulting and auto-fit over every note, left to right.
    ///
    /// The order matters: each note's auto-fit reads its predecessor's raw
    /// duration and lyric. Once this pass completes the notes can be rendered
    /// independently.
    pub fn apply_voicebank(
        &mut self,
        vb: &(impl VoicebankLookup + ?Sized),
    ) -> Result<(), NoteError> {
        for i in 0..self.notes.len() {
            let (head, tail) = self.notes.split_at_mut(i);
            let note = &mut tail[0];
            note.apply_voicebank_defaults(vb)?;
            note.autofit_timings(head.last())?;
        }
        Ok(())
    }

    /// Serialize the plugin-diff form: only fields that were modified after
    /// load are emitted, so the host applies exactly the edits made here.
    pub fn to_plugin_string(&self) -> String {
        let mut out = String::new();
        for note in &self.notes {
            out.push_str(&format!("[{}]\n", note.num.value()));
            if note.num.value() == "#DELETE" {
                continue;
            }
            let mut emit = |key: &str, value: String| {
                out.push_str(key);
                out.push('=');
                out.push_str(&value);
                out.push('\n');
            };
            if note.length.has_value() && note.length.is_modified() {
                emit("Length", note.length.display());
            }
            if note.lyric.has_value() && note.lyric.is_modified() {
                emit("Lyric", note.lyric.display());
            }
            if note.notenum.has_value() && note.notenum.is_modified() {
                emit("NoteNum", note.notenum.display());
            }
            if note.tempo.has_value() && note.tempo.is_modified() {
                emit("Tempo", fmt_float(note.tempo.get(), 2));
            }
            if note.pre.has_value() && note.pre.is_modified() {
                emit("PreUtterance", note.pre.display());
            }
            if note.ove.has_value() && note.ove.is_modified() {
                emit("VoiceOverlap", note.ove.display());
            }
            if note.stp.has_value() && note.stp.is_modified() {
                emit("StartPoint", note.stp.display());
            }
            if note.velocity.has_value() && note.velocity.is_modified() {
                emit("Velocity", note.velocity.display());
            }
            if note.intensity.has_value() && note.intensity.is_modified() {
                emit("Intensity", note.intensity.display());
            }
            if note.modulation.has_value() && note.modulation.is_modified() {
                emit("Modulation", note.modulation.display());
            }
            if note.pitches.has_value() && note.pitches.is_modified() {
                emit("Pitches", note.pitches.display());
            }
            if note.pb_start.has_value() && note.pb_start.is_modified() {
                emit("PBStart", note.pb_start.display());
            }
            if note.pbs.has_value() && note.pbs.is_modified() {
                emit("PBS", note.pbs.display());
            }
            if note.pby.has_value() && note.pby.is_modified() {
                emit("PBY", note.pby.display());
            }
            if note.pbm.has_value() && note.pbm.is_modified() {
                emit("PBM", note.pbm.display());
            }
            if note.pbw.has_value() && note.pbw.is_modified() {
                emit("PBW", note.pbw.display());
            }
            if note.flags.has_value() && note.flags.is_modified() {
                emit("Flags", note.flags.display());
            }
            if note.vibrato.has_value() && note.vibrato.is_modified() {
                emit("VBR", note.vibrato.display());
            }
            if note.envelope.has_value() && note.envelope.is_modified() {
                emit("Envelope", note.envelope.display());
            }
            if note.label.has_value() && note.label.is_modified() {
                emit("Label", note.label.display());
            }
            if note.direct.has_value() && note.direct.is_modified() {
                emit("$direct", note.direct.display());
            }
            if note.region.has_value() && note.region.is_modified() {
                emit("$region", note.region.display());
            }
            if note.region_end.has_value() && note.region_end.is_modified() {
                emit("$region_end", note.region_end.display());
            }
        }
        out
    }

    /// Write the plugin-diff form to a file.
    pub fn save_plugin(&self, path: &Path) -> Result<(), ScoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_plugin_string())?;
        Ok(())
    }
}

/// Apply one `key=value` line to a note, tolerating malformed values.
fn apply_note_field(note: &mut Note, key: &str, value: &str, running_tempo: &mut f64) {
    let num = note.num.value().clone();
    let tolerate = |field: &str, result: Result<(), FieldError>| {
        if let Err(err) = result {
            warn!("{num} {field} not loaded: {err}");
        }
    };
    match key {
        "Length" => {
            if let Err(err) = note.length.init_str(value) {
                note.length.init(480);
                warn!("{num} Length not loaded, defaulting to 480: {err}");
            }
        }
        "Lyric" => tolerate("Lyric", note.lyric.init_str(value)),
        "NoteNum" => {
            if let Err(err) = note.notenum.init_str(value) {
                note.notenum.init(60);
                warn!("{num} NoteNum not loaded, defaulting to 60: {err}");
            }
        }
        "Tempo" => match value.trim().parse::<f64>() {
            Ok(tempo) => {
                note.tempo.init(tempo);
                *running_tempo = tempo;
            }
            Err(_) => warn!("{num} Tempo '{value}' is not a float"),
        },
        "PreUtterance" => tolerate("PreUtterance", note.pre.init_str(value)),
        "@preuttr" => tolerate("@preuttr", note.at_pre.init_str(value)),
        "VoiceOverlap" => tolerate("VoiceOverlap", note.ove.init_str(value)),
        "@overlap" => tolerate("@overlap", note.at_ove.init_str(value)),
        "StartPoint" => tolerate("StartPoint", note.stp.init_str(value)),
        "@stpoint" => tolerate("@stpoint", note.at_stp.init_str(value)),
        "@filename" => tolerate("@filename", note.at_filename.init_str(value)),
        "@alias" => tolerate("@alias", note.at_alias.init_str(value)),
        "Velocity" => tolerate("Velocity", note.velocity.init_str(value)),
        "Intensity" => tolerate("Intensity", note.intensity.init_str(value)),
        "Modulation" => tolerate("Modulation", note.modulation.init_str(value)),
        "Pitches" => tolerate("Pitches", note.pitches.init_str(value)),
        "PBStart" => tolerate("PBStart", note.pb_start.init_str(value)),
        "PBS" => tolerate("PBS", note.pbs.init_str(value)),
        "PBY" => tolerate("PBY", note.pby.init_str(value)),
        "PBW" => tolerate("PBW", note.pbw.init_str(value)),
        "PBM" => tolerate("PBM", note.pbm.init_str(value)),
        "Flags" => tolerate("Flags", note.flags.init_str(value)),
        "VBR" => tolerate("VBR", note.vibrato.init_str(value)),
        "Envelope" => tolerate("Envelope", note.envelope.init_str(value)),
        "Label" => tolerate("Label", note.label.init_str(value)),
        "$direct" => tolerate("$direct", note.direct.init_str(value)),
        "$region" => tolerate("$region", note.region.init_str(value)),
        "$region_end" => tolerate("$region_end", note.region_end.init_str(value)),
        _ => {}
    }
}
