//! Composite note parameter fields: pitch-bend start, envelope, vibrato.
//!
//! These carry structure beyond a scalar or a uniform list, so each gets its
//! own parser and serializer instead of going through [`FieldValue`].

use crate::error::FieldError;
use crate::field::fmt_float;

/// Where a note's portamento starts (PBS): a time in ms relative to the note
/// head, with an optional height in tenths of a cent step.
///
/// Accepted text forms: `"T"`, `"T;H"`, `"T,H"` (the comma is normalized to
/// a semicolon). The height is omitted on output when it is zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchBendStartField {
    time: f64,
    height: f64,
    has_value: bool,
    modified: bool,
}

impl PitchBendStartField {
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn has_value(&self) -> bool {
        self.has_value
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
        self.has_value = true;
        self.modified = true;
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.has_value = true;
        self.modified = true;
    }

    pub fn init_str(&mut self, raw: &str) -> Result<(), FieldError> {
        let (time, height) = Self::parse(raw)?;
        self.time = time;
        self.height = height;
        self.has_value = true;
        Ok(())
    }

    pub fn set_str(&mut self, raw: &str) -> Result<(), FieldError> {
        self.init_str(raw)?;
        self.modified = true;
        Ok(())
    }

    fn parse(raw: &str) -> Result<(f64, f64), FieldError> {
        let normalized = raw.replace(',', ";");
        let not_float = |token: &str| FieldError::NotAFloat {
            raw: token.to_string(),
        };
        match normalized.split_once(';') {
            Some((time, height)) => Ok((
                time.trim().parse().map_err(|_| not_float(time))?,
                height.trim().parse().map_err(|_| not_float(height))?,
            )),
            None => Ok((
                normalized.trim().parse().map_err(|_| not_float(&normalized))?,
                0.0,
            )),
        }
    }

    pub fn display(&self) -> String {
        if self.height == 0.0 {
            fmt_float(self.time, 3)
        } else {
            format!("{};{}", fmt_float(self.time, 3), fmt_float(self.height, 3))
        }
    }
}

/// Which token positions hold point times vs. levels in the envelope forms.
///
/// `p1,p2,p3,v1,v2,v3,v4` (7 tokens), `…,%,p4` (9), `…,p5,v5` (11). Index 7
/// is always the literal `%` separator.
const ENVELOPE_LENGTHS: [usize; 3] = [7, 9, 11];

/// A note's volume envelope: up to five breakpoints of (time, level).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvelopeField {
    times: Vec<f64>,
    levels: Vec<i32>,
    has_value: bool,
    modified: bool,
}

impl EnvelopeField {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn levels(&self) -> &[i32] {
        &self.levels
    }

    pub fn has_value(&self) -> bool {
        self.has_value
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn init_str(&mut self, raw: &str) -> Result<(), FieldError> {
        let (times, levels) = Self::parse(raw)?;
        self.times = times;
        self.levels = levels;
        self.has_value = true;
        Ok(())
    }

    pub fn set_str(&mut self, raw: &str) -> Result<(), FieldError> {
        self.init_str(raw)?;
        self.modified = true;
        Ok(())
    }

    fn parse(raw: &str) -> Result<(Vec<f64>, Vec<i32>), FieldError> {
        let tokens: Vec<&str> = raw.split(',').collect();
        let bad = || FieldError::InvalidEnvelopePattern {
            raw: raw.to_string(),
        };
        if !ENVELOPE_LENGTHS.contains(&tokens.len()) {
            return Err(bad());
        }
        let mut times = Vec::new();
        let mut levels = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            match i {
                0 | 1 | 2 | 8 | 9 => times.push(token.trim().parse().map_err(|_| bad())?),
                3 | 4 | 5 | 6 | 10 => levels.push(token.trim().parse().map_err(|_| bad())?),
                _ => {} // the literal '%' slot
            }
        }
        Ok((times, levels))
    }

    pub fn set_time(&mut self, index: usize, value: f64) -> Result<(), FieldError> {
        match self.times.get_mut(index) {
            Some(slot) => {
                *slot = value;
                self.modified = true;
                Ok(())
            }
            None => Err(FieldError::IndexOutOfRange {
                index,
                len: self.times.len(),
            }),
        }
    }

    pub fn set_level(&mut self, index: usize, value: i32) -> Result<(), FieldError> {
        match self.levels.get_mut(index) {
            Some(slot) => {
                *slot = value;
                self.modified = true;
                Ok(())
            }
            None => Err(FieldError::IndexOutOfRange {
                index,
                len: self.levels.len(),
            }),
        }
    }

    /// Re-serialize in the token shape matching how many points were supplied.
    pub fn display(&self) -> String {
        let t: Vec<String> = self.times.iter().map(|p| fmt_float(*p, 2)).collect();
        let v: Vec<String> = self.levels.iter().map(|l| l.to_string()).collect();
        match self.times.len() {
            4 => format!(
                "{},{},{},{},{},{},{},%,{}",
                t[0], t[1], t[2], v[0], v[1], v[2], v[3], t[3]
            ),
            5 => format!(
                "{},{},{},{},{},{},{},%,{},{},{}",
                t[0], t[1], t[2], v[0], v[1], v[2], v[3], t[3], t[4], v[4]
            ),
            _ => format!(
                "{},{},{},{},{},{},{}",
                t[0], t[1], t[2], v[0], v[1], v[2], v[3]
            ),
        }
    }
}

/// A note's vibrato (VBR): 7 or 8 comma-separated floats.
///
/// length% of the note, cycle ms, depth cents, fade-in% and fade-out% of the
/// vibrato window, phase% of one cycle, height% bias, and an optional
/// amplitude% UTAU writes but does not interpret.
///
/// Whole-string assignment is atomic: a parse failure anywhere leaves every
/// property untouched. The per-property setters mutate in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VibratoField {
    length: f64,
    cycle: f64,
    depth: f64,
    fade_in: f64,
    fade_out: f64,
    phase: f64,
    height: f64,
    amplitude: Option<f64>,
    has_value: bool,
    modified: bool,
}

impl VibratoField {
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn cycle(&self) -> f64 {
        self.cycle
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn fade_in(&self) -> f64 {
        self.fade_in
    }

    pub fn fade_out(&self) -> f64 {
        self.fade_out
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn amplitude(&self) -> Option<f64> {
        self.amplitude
    }

    pub fn has_value(&self) -> bool {
        self.has_value
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn init_str(&mut self, raw: &str) -> Result<(), FieldError> {
        let parsed = Self::parse(raw)?;
        *self = VibratoField {
            has_value: true,
            modified: self.modified,
            ..parsed
        };
        Ok(())
    }

    pub fn set_str(&mut self, raw: &str) -> Result<(), FieldError> {
        self.init_str(raw)?;
        self.modified = true;
        Ok(())
    }

    fn parse(raw: &str) -> Result<VibratoField, FieldError> {
        let bad = || FieldError::InvalidVibratoPattern {
            raw: raw.to_string(),
        };
        let values: Vec<f64> = raw
            .split(',')
            .map(|token| token.trim().parse::<f64>().map_err(|_| bad()))
            .collect::<Result<_, _>>()?;
        if values.len() != 7 && values.len() != 8 {
            return Err(bad());
        }
        Ok(VibratoField {
            length: values[0],
            cycle: values[1],
            depth: values[2],
            fade_in: values[3],
            fade_out: values[4],
            phase: values[5],
            height: values[6],
            amplitude: values.get(7).copied(),
            has_value: false,
            modified: false,
        })
    }

    pub fn set_length(&mut self, value: f64) {
        self.length = value;
        self.modified = true;
    }

    pub fn set_cycle(&mut self, value: f64) {
        self.cycle = value;
        self.modified = true;
    }

    pub fn set_depth(&mut self, value: f64) {
        self.depth = value;
        self.modified = true;
    }

    pub fn set_fade_in(&mut self, value: f64) {
        self.fade_in = value;
        self.modified = true;
    }

    pub fn set_fade_out(&mut self, value: f64) {
        self.fade_out = value;
        self.modified = true;
    }

    pub fn set_phase(&mut self, value: f64) {
        self.phase = value;
        self.modified = true;
    }

    pub fn set_height(&mut self, value: f64) {
        self.height = value;
        self.modified = true;
    }

    pub fn display(&self) -> String {
        let mut values = vec![
            self.length,
            self.cycle,
            self.depth,
            self.fade_in,
            self.fade_out,
            self.phase,
            self.height,
        ];
        if let Some(amplitude) = self.amplitude {
            values.push(amplitude);
        }
        values
            .iter()
            .map(|v| fmt_float(*v, 2))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pbs_parses_all_three_forms() {
        let mut f = PitchBendStartField::default();
        f.init_str("-150").unwrap();
        assert_eq!(f.time(), -150.0);
        assert_eq!(f.height(), 0.0);
        f.init_str("-40;10").unwrap();
        assert_eq!((f.time(), f.height()), (-40.0, 10.0));
        f.init_str("-40,5").unwrap();
        assert_eq!((f.time(), f.height()), (-40.0, 5.0));
        assert!(!f.is_modified());
    }

    #[test]
    fn pbs_display_omits_zero_height() {
        let mut f = PitchBendStartField::default();
        f.set_str("-150").unwrap();
        assert_eq!(f.display(), "-150.000");
        f.set_height(10.0);
        assert_eq!(f.display(), "-150.000;10.000");
        assert!(f.is_modified());
    }

    #[test]
    fn pbs_bad_input_keeps_state() {
        let mut f = PitchBendStartField::default();
        f.init_str("25;3").unwrap();
        assert!(f.set_str("x;3").is_err());
        assert_eq!((f.time(), f.height()), (25.0, 3.0));
    }

    #[test]
    fn envelope_seven_tokens() {
        let mut f = EnvelopeField::default();
        f.init_str("0,5,35,0,100,100,0").unwrap();
        assert_eq!(f.times(), &[0.0, 5.0, 35.0]);
        assert_eq!(f.levels(), &[0, 100, 100, 0]);
        assert_eq!(f.display(), "0.00,5.00,35.00,0,100,100,0");
    }

    #[test]
    fn envelope_nine_and_eleven_tokens_round_trip() {
        let mut f = EnvelopeField::default();
        f.init_str("0.00,5.00,35.00,0,100,100,0,%,10.00").unwrap();
        assert_eq!(f.times().len(), 4);
        assert_eq!(f.display(), "0.00,5.00,35.00,0,100,100,0,%,10.00");

        f.init_str("0.00,5.00,35.00,0,100,100,0,%,10.00,20.00,50")
            .unwrap();
        assert_eq!(f.times().len(), 5);
        assert_eq!(f.levels().len(), 5);
        assert_eq!(
            f.display(),
            "0.00,5.00,35.00,0,100,100,0,%,10.00,20.00,50"
        );
    }

    #[test]
    fn envelope_rejects_wrong_shape() {
        let mut f = EnvelopeField::default();
        assert_eq!(
            f.init_str("0,5,35"),
            Err(FieldError::InvalidEnvelopePattern {
                raw: "0,5,35".to_string()
            })
        );
        assert!(f.init_str("0,5,35,0,x,100,0").is_err());
        assert!(!f.has_value());
    }

    #[test]
    fn envelope_positional_edits() {
        let mut f = EnvelopeField::default();
        f.init_str("0,5,35,0,100,100,0").unwrap();
        f.set_time(1, 7.5).unwrap();
        f.set_level(3, 20).unwrap();
        assert_eq!(f.display(), "0.00,7.50,35.00,0,100,100,20");
        assert!(f.is_modified());
        assert_eq!(
            f.set_level(5, 0),
            Err(FieldError::IndexOutOfRange { index: 5, len: 4 })
        );
    }

    #[test]
    fn vibrato_assignment_is_atomic() {
        let mut f = VibratoField::default();
        f.init_str("65,180,35,20,20,0,0").unwrap();
        assert_eq!(f.length(), 65.0);
        assert_eq!(f.cycle(), 180.0);
        assert!(f.set_str("65,180,x,20,20,0,0").is_err());
        assert_eq!(f.depth(), 35.0);
        assert!(!f.is_modified());
    }

    #[test]
    fn vibrato_eighth_value_round_trips() {
        let mut f = VibratoField::default();
        f.init_str("65,180,35,20,20,0,0,100").unwrap();
        assert_eq!(f.amplitude(), Some(100.0));
        assert_eq!(f.display(), "65.00,180.00,35.00,20.00,20.00,0.00,0.00,100.00");

        f.init_str("65,180,35,20,20,0,0").unwrap();
        assert_eq!(f.amplitude(), None);
        assert_eq!(f.display(), "65.00,180.00,35.00,20.00,20.00,0.00,0.00");
    }

    #[test]
    fn vibrato_property_setters_mutate_in_place() {
        let mut f = VibratoField::default();
        f.init_str("65,180,35,20,20,0,0").unwrap();
        f.set_depth(50.0);
        assert_eq!(f.depth(), 50.0);
        assert!(f.is_modified());
    }

    #[test]
    fn vibrato_rejects_wrong_arity() {
        let mut f = VibratoField::default();
        assert!(f.init_str("65,180,35").is_err());
        assert!(f.init_str("65,180,35,20,20,0,0,1,2").is_err());
    }
}
