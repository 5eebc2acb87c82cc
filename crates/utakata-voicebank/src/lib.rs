//! UTAU voicebank metadata stores.
//!
//! A voicebank is a directory of audio samples plus two text tables: `oto.ini`
//! files describing where the meaningful audio lies inside each sample, and an
//! optional `prefix.map` decorating lyrics per pitch. [`Voicebank`] loads both
//! and implements the [`VoicebankLookup`] interface the score and render
//! layers consume.

pub mod error;
pub mod oto;
pub mod prefixmap;

pub use error::VoicebankError;
pub use oto::{Oto, OtoRecord};
pub use prefixmap::{MapRecord, PrefixMap};

use std::path::{Path, PathBuf};

use utakata_score::voicebank::{OtoTiming, VoicebankLookup};

/// A loaded voicebank: root directory, oto table, prefix map.
#[derive(Debug, Clone)]
pub struct Voicebank {
    root: PathBuf,
    oto: Oto,
    prefix_map: PrefixMap,
}

impl Voicebank {
    /// Open the voicebank at `root`, loading its `oto.ini` files and, when
    /// present, its `prefix.map`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Voicebank, VoicebankError> {
        let root = root.into();
        if !Self::is_voicebank(&root)? {
            return Err(VoicebankError::NotAVoicebank(root));
        }
        let oto = Oto::load(&root, false)?;
        let prefix_map = if root.join("prefix.map").is_file() {
            PrefixMap::load(&root)?
        } else {
            PrefixMap::default()
        };
        Ok(Voicebank {
            root,
            oto,
            prefix_map,
        })
    }

    /// Whether a directory looks like a voicebank: it carries a
    /// `character.txt`, an `oto.ini`, or any `.wav` sample.
    pub fn is_voicebank(dir: &Path) -> Result<bool, VoicebankError> {
        if !dir.is_dir() {
            return Err(VoicebankError::NotFound(dir.to_path_buf()));
        }
        if dir.join("character.txt").is_file() || dir.join("oto.ini").is_file() {
            return Ok(true);
        }
        for entry in dir.read_dir().map_err(VoicebankError::Io)? {
            let entry = entry.map_err(VoicebankError::Io)?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.to_ascii_lowercase().ends_with(".wav") {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn oto(&self) -> &Oto {
        &self.oto
    }

    pub fn prefix_map(&self) -> &PrefixMap {
        &self.prefix_map
    }
}

impl VoicebankLookup for Voicebank {
    fn prefix_suffix(&self, note_number: i32) -> (String, String) {
        self.prefix_map.prefix_suffix(note_number)
    }

    fn oto_timing(&self, alias: &str) -> Option<OtoTiming> {
        self.oto.get(alias).map(|record| OtoTiming {
            file_name: record.relative_path(),
            offset: record.offset,
            pre_utterance: record.pre_utterance,
            overlap: record.overlap,
            consonant: record.consonant,
            blank: record.blank,
        })
    }

    fn root_dir(&self) -> &Path {
        &self.root
    }
}
