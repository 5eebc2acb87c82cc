//! Tone-name parsing and conversion.
//!
//! UTAU identifies pitches by note number (C4 = 60, valid range C1 = 24 to
//! B7 = 107) but exchanges tone names with resamplers and prefix maps. Both
//! directions live here.

use crate::error::ToneError;

/// The 21 recognized letter+accidental spellings and their semitone offsets.
const SEMITONE_MAP: [(&str, i32); 27] = [
    ("C", 0),
    ("C#", 1),
    ("C♯", 1),
    ("Db", 1),
    ("D♭", 1),
    ("D", 2),
    ("D#", 3),
    ("D♯", 3),
    ("Eb", 3),
    ("E♭", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("F♯", 6),
    ("Gb", 6),
    ("G♭", 6),
    ("G", 7),
    ("G#", 8),
    ("G♯", 8),
    ("Ab", 8),
    ("A♭", 8),
    ("A", 9),
    ("A#", 10),
    ("A♯", 10),
    ("Bb", 10),
    ("B♭", 10),
    ("B", 11),
];

const NAMES_SHARP_ASCII: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NAMES_SHARP_UNICODE: [&str; 12] = [
    "C", "C♯", "D", "D♯", "E", "F", "F♯", "G", "G♯", "A", "A♯", "B",
];
const NAMES_FLAT_ASCII: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];
const NAMES_FLAT_UNICODE: [&str; 12] = [
    "C", "D♭", "D", "E♭", "E", "F", "G♭", "G", "A♭", "A", "B♭", "B",
];

/// How accidentals are spelled when rendering a tone name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccidentalStyle {
    /// `C#4` — the spelling resamplers expect.
    #[default]
    SharpAscii,
    /// `C♯4`
    SharpUnicode,
    /// `Db4`
    FlatAscii,
    /// `D♭4`
    FlatUnicode,
}

impl AccidentalStyle {
    /// Parse a style marker character (`#`, `♯`, `b`, `♭`).
    pub fn from_marker(marker: &str) -> Result<Self, ToneError> {
        match marker {
            "#" => Ok(AccidentalStyle::SharpAscii),
            "♯" => Ok(AccidentalStyle::SharpUnicode),
            "b" => Ok(AccidentalStyle::FlatAscii),
            "♭" => Ok(AccidentalStyle::FlatUnicode),
            other => Err(ToneError::InvalidAccidentalStyle(other.to_string())),
        }
    }

    fn names(self) -> &'static [&'static str; 12] {
        match self {
            AccidentalStyle::SharpAscii => &NAMES_SHARP_ASCII,
            AccidentalStyle::SharpUnicode => &NAMES_SHARP_UNICODE,
            AccidentalStyle::FlatAscii => &NAMES_FLAT_ASCII,
            AccidentalStyle::FlatUnicode => &NAMES_FLAT_UNICODE,
        }
    }
}

/// Convert a tone name to a note number.
///
/// Trailing digits (with an optional leading `-`) are the octave, the rest
/// must be one of the 21 recognized letter+accidental spellings.
///
/// # Examples
/// ```
/// use utakata_score::tone::to_note_number;
///
/// assert_eq!(to_note_number("C4").unwrap(), 60);
/// assert_eq!(to_note_number("A♭3").unwrap(), 56);
/// assert!(to_note_number("H2").is_err());
/// ```
pub fn to_note_number(name: &str) -> Result<i32, ToneError> {
    let digits = name
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return Err(ToneError::InvalidToneName(name.to_string()));
    }
    let mut split = name.len() - digits;
    // A '-' directly before the digits is the octave's sign.
    if split > 0 && name.is_char_boundary(split - 1) && &name[split - 1..split] == "-" {
        split -= 1;
    }
    let (letter, octave) = name.split_at(split);
    let octave: i32 = octave
        .parse()
        .map_err(|_| ToneError::InvalidToneName(name.to_string()))?;
    let semitone = SEMITONE_MAP
        .iter()
        .find(|(spelling, _)| *spelling == letter)
        .map(|(_, semitone)| *semitone)
        .ok_or_else(|| ToneError::InvalidToneName(name.to_string()))?;
    Ok(semitone + (octave + 1) * 12)
}

/// Convert a note number to a tone name in the requested spelling style.
///
/// # Examples
/// ```
/// use utakata_score::tone::{to_tone_name, AccidentalStyle};
///
/// assert_eq!(to_tone_name(60, AccidentalStyle::SharpAscii), "C4");
/// assert_eq!(to_tone_name(61, AccidentalStyle::FlatAscii), "Db4");
/// ```
pub fn to_tone_name(note_number: i32, style: AccidentalStyle) -> String {
    let semitone = note_number.rem_euclid(12) as usize;
    let octave = note_number.div_euclid(12) - 1;
    format!("{}{}", style.names()[semitone], octave)
}
