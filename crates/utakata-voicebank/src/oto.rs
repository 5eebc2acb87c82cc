//! oto.ini records: per-alias timing metadata for voicebank samples.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::warn;
use walkdir::WalkDir;

use crate::error::VoicebankError;

/// One line of an `oto.ini`:
/// `file.wav=alias,offset,consonant,blank,pre_utterance,overlap`.
#[derive(Debug, Clone, PartialEq)]
pub struct OtoRecord {
    /// Directory of the owning `oto.ini`, relative to the voicebank root.
    pub oto_dir: String,
    /// Sample file name as written in the line.
    pub file_name: String,
    /// Alias; derived from the file path stem when the line leaves it empty.
    pub alias: String,
    /// Read start position (ms). "Left blank" in editor terms.
    pub offset: f64,
    /// Lead-in before the nominal onset (ms).
    pub pre_utterance: f64,
    /// Crossfade with the previous note (ms).
    pub overlap: f64,
    /// Fixed consonant span from the offset (ms).
    pub consonant: f64,
    /// Read end (ms): from the sample tail when positive, from the offset
    /// when negative.
    pub blank: f64,
}

impl OtoRecord {
    /// Parse one `oto.ini` line. Returns `None` for non-record lines
    /// (blank, missing `=` or parameters, wrong arity, bad numbers).
    pub fn parse_line(oto_dir: &str, line: &str) -> Option<OtoRecord> {
        let (file_name, params) = line.split_once('=')?;
        let params: Vec<&str> = params.split(',').collect();
        if params.len() != 6 {
            return None;
        }
        let number = |token: &str| token.trim().parse::<f64>().ok();
        let record = OtoRecord {
            oto_dir: oto_dir.to_string(),
            file_name: file_name.to_string(),
            alias: params[0].to_string(),
            offset: number(params[1])?,
            consonant: number(params[2])?,
            blank: number(params[3])?,
            pre_utterance: number(params[4])?,
            overlap: number(params[5])?,
        };
        Some(if record.alias.is_empty() {
            let alias = record.path_stem();
            OtoRecord { alias, ..record }
        } else {
            record
        })
    }

    /// The sample path relative to the voicebank root.
    pub fn relative_path(&self) -> String {
        if self.oto_dir.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.oto_dir, self.file_name)
        }
    }

    /// The relative path without its extension, used as a secondary alias.
    pub fn path_stem(&self) -> String {
        let path = self.relative_path();
        match path.rsplit_once('.') {
            Some((stem, _)) => stem.to_string(),
            None => path,
        }
    }
}

/// The merged oto table of a voicebank.
///
/// Records are keyed by alias and, additionally, by their extension-less
/// relative path. When two records claim the same key, the one from the
/// lexicographically smaller file name wins; within one file the smaller
/// offset wins.
#[derive(Debug, Clone, Default)]
pub struct Oto {
    records: HashMap<String, OtoRecord>,
    file_count: usize,
    record_count: usize,
}

impl Oto {
    /// Load every `oto.ini` under `root`: the root itself and its immediate
    /// subdirectories, or the whole tree with `recursive`.
    pub fn load(root: &Path, recursive: bool) -> Result<Oto, VoicebankError> {
        let mut oto = Oto::default();
        let max_depth = if recursive { usize::MAX } else { 2 };
        let mut paths: Vec<_> = WalkDir::new(root)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && entry.file_name() == "oto.ini")
            .map(|entry| entry.into_path())
            .collect();
        paths.sort();
        for path in paths {
            let subdir = path
                .parent()
                .and_then(|dir| dir.strip_prefix(root).ok())
                .map(|rel| rel.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            let text = fs::read_to_string(&path)?;
            oto.load_str(&subdir, &text);
            oto.file_count += 1;
        }
        Ok(oto)
    }

    /// Parse the contents of one `oto.ini` into the table.
    pub fn load_str(&mut self, subdir: &str, text: &str) {
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            match OtoRecord::parse_line(subdir, line) {
                Some(record) => {
                    self.record_count += 1;
                    self.insert(record.alias.clone(), record.clone());
                    self.insert(record.path_stem(), record);
                }
                None => warn!("skipping malformed oto line in '{subdir}': {line}"),
            }
        }
    }

    fn insert(&mut self, key: String, record: OtoRecord) {
        match self.records.get(&key) {
            None => {
                self.records.insert(key, record);
            }
            Some(existing) => {
                let replace = if record.file_name == existing.file_name {
                    record.offset < existing.offset
                } else {
                    record.file_name < existing.file_name
                };
                if replace {
                    self.records.insert(key, record);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&OtoRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Number of `oto.ini` files loaded.
    pub fn files(&self) -> usize {
        self.file_count
    }

    /// Number of record lines loaded.
    pub fn records(&self) -> usize {
        self.record_count
    }
}
