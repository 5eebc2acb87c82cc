//! prefix.map: pitch-dependent alias decoration.
//!
//! A voicebank can record a prefix and suffix per tone so that, say, C5 and
//! above resolve to the "strong" sample set. The table covers the UTAU note
//! range C1..=B7 and defaults to empty decorations.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::warn;

use utakata_score::tone;
use utakata_score::AccidentalStyle;

use crate::error::VoicebankError;

/// UTAU note range covered by a prefix map.
const NOTE_RANGE: std::ops::RangeInclusive<i32> = 24..=107;

/// One prefix.map line: `tone\tprefix\tsuffix`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapRecord {
    /// Tone name as written in the file (kept for save-back).
    pub key: String,
    pub prefix: String,
    pub suffix: String,
}

/// The per-tone decoration table.
#[derive(Debug, Clone)]
pub struct PrefixMap {
    values: HashMap<i32, MapRecord>,
}

impl Default for PrefixMap {
    /// An identity map: every tone present, no decoration.
    fn default() -> Self {
        let values = NOTE_RANGE
            .map(|n| {
                (
                    n,
                    MapRecord {
                        key: tone::to_tone_name(n, AccidentalStyle::SharpAscii),
                        ..MapRecord::default()
                    },
                )
            })
            .collect();
        PrefixMap { values }
    }
}

impl PrefixMap {
    /// Load `root/prefix.map`.
    pub fn load(root: &Path) -> Result<PrefixMap, VoicebankError> {
        let path = root.join("prefix.map");
        if !path.is_file() {
            return Err(VoicebankError::FileNotFound(path));
        }
        let mut map = PrefixMap::default();
        map.load_str(&fs::read_to_string(path)?);
        Ok(map)
    }

    /// Parse prefix.map text into the table, overriding defaults per line.
    pub fn load_str(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 {
                warn!("skipping malformed prefix.map line: {line}");
                continue;
            }
            match tone::to_note_number(fields[0]) {
                Ok(note_number) => {
                    self.values.insert(
                        note_number,
                        MapRecord {
                            key: fields[0].to_string(),
                            prefix: fields[1].to_string(),
                            suffix: fields[2].to_string(),
                        },
                    );
                }
                Err(err) => warn!("skipping prefix.map line: {err}"),
            }
        }
    }

    pub fn get(&self, note_number: i32) -> Option<&MapRecord> {
        self.values.get(&note_number)
    }

    pub fn get_mut(&mut self, note_number: i32) -> Option<&mut MapRecord> {
        self.values.get_mut(&note_number)
    }

    /// The decoration pair for a note number; empty outside the table.
    pub fn prefix_suffix(&self, note_number: i32) -> (String, String) {
        match self.values.get(&note_number) {
            Some(record) => (record.prefix.clone(), record.suffix.clone()),
            None => (String::new(), String::new()),
        }
    }

    /// Serialize in UTAU's on-disk form: descending tone order, CRLF.
    pub fn to_file_string(&self) -> String {
        let mut out = String::new();
        for n in NOTE_RANGE.rev() {
            if let Some(record) = self.values.get(&n) {
                out.push_str(&format!(
                    "{}\t{}\t{}\r\n",
                    record.key, record.prefix, record.suffix
                ));
            }
        }
        out
    }

    /// Write `root/prefix.map`.
    pub fn save(&self, root: &Path) -> Result<(), VoicebankError> {
        fs::write(root.join("prefix.map"), self.to_file_string())?;
        Ok(())
    }
}
