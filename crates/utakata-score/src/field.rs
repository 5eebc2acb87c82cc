//! Typed, change-tracked note parameter fields.
//!
//! Every note attribute is one of these holders. Two flags ride along with
//! the value:
//!
//! - `has_value` — the field was explicitly set or loaded, as opposed to
//!   carrying its default (or a value adopted from the voicebank / project
//!   header, which intentionally does *not* count as explicit).
//! - `modified` — the field was written after load. Plugin-diff output emits
//!   exactly the fields with both flags up.
//!
//! Parse failures never corrupt: a rejected `init_str`/`set_str` leaves the
//! field's previous state untouched and returns the error to the caller.

mod composite;

pub use composite::{EnvelopeField, PitchBendStartField, VibratoField};

use crate::error::FieldError;

/// Fixed-precision float rendering shared by fields and serializers.
pub(crate) fn fmt_float(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

/// A value that can live in a [`Field`] or [`ListField`]: parseable from the
/// UST text form and renderable back to it.
pub trait FieldValue: Sized {
    fn parse_field(raw: &str) -> Result<Self, FieldError>;
    fn render_field(&self) -> String;
}

impl FieldValue for i32 {
    fn parse_field(raw: &str) -> Result<Self, FieldError> {
        raw.trim().parse().map_err(|_| FieldError::NotAnInteger {
            raw: raw.to_string(),
        })
    }

    fn render_field(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for f64 {
    fn parse_field(raw: &str) -> Result<Self, FieldError> {
        raw.trim().parse().map_err(|_| FieldError::NotAFloat {
            raw: raw.to_string(),
        })
    }

    fn render_field(&self) -> String {
        fmt_float(*self, 3)
    }
}

impl FieldValue for String {
    fn parse_field(raw: &str) -> Result<Self, FieldError> {
        Ok(raw.to_string())
    }

    fn render_field(&self) -> String {
        self.clone()
    }
}

impl FieldValue for bool {
    fn parse_field(raw: &str) -> Result<Self, FieldError> {
        Ok(matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1"))
    }

    fn render_field(&self) -> String {
        // UTAU spells booleans in Python style on disk.
        if *self { "True".to_string() } else { "False".to_string() }
    }
}

/// Portamento interpolation shape between two pitch control points (PBM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpMode {
    /// `""` — cosine ease-in-out.
    #[default]
    EaseInOut,
    /// `"s"` — linear.
    Linear,
    /// `"r"` — half-sine rise: fast start, slow finish.
    EaseOut,
    /// `"j"` — inverted half-cosine rise: slow start, fast finish.
    EaseIn,
}

impl InterpMode {
    /// The PBM token for this mode.
    pub fn token(self) -> &'static str {
        match self {
            InterpMode::EaseInOut => "",
            InterpMode::Linear => "s",
            InterpMode::EaseOut => "r",
            InterpMode::EaseIn => "j",
        }
    }
}

impl FieldValue for InterpMode {
    fn parse_field(raw: &str) -> Result<Self, FieldError> {
        match raw {
            "" => Ok(InterpMode::EaseInOut),
            "s" => Ok(InterpMode::Linear),
            "r" => Ok(InterpMode::EaseOut),
            "j" => Ok(InterpMode::EaseIn),
            _ => Err(FieldError::NotInEnumSet {
                raw: raw.to_string(),
            }),
        }
    }

    fn render_field(&self) -> String {
        self.token().to_string()
    }
}

/// A scalar note parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field<T> {
    value: T,
    has_value: bool,
    modified: bool,
}

impl<T> Field<T> {
    /// A fresh field carrying `value` as its non-explicit default.
    pub fn with_default(value: T) -> Self {
        Field {
            value,
            has_value: false,
            modified: false,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Copy the value out (convenience for numeric fields).
    pub fn get(&self) -> T
    where
        T: Copy,
    {
        self.value
    }

    /// Whether the field was explicitly set or loaded.
    pub fn has_value(&self) -> bool {
        self.has_value
    }

    /// Whether the field was written after load.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Load-time write: marks the field explicit but untouched.
    pub fn init(&mut self, value: T) {
        self.value = value;
        self.has_value = true;
    }

    /// Post-load write: marks the field explicit and modified.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.has_value = true;
        self.modified = true;
    }

    /// Adopt a voicebank/project default: the value changes but the field
    /// still reads as neither explicit nor modified, so save-back omits it.
    pub(crate) fn fill(&mut self, value: T) {
        self.value = value;
    }
}

impl<T: FieldValue> Field<T> {
    /// Parse and [`init`](Field::init). On failure the prior state is kept.
    pub fn init_str(&mut self, raw: &str) -> Result<(), FieldError> {
        self.init(T::parse_field(raw)?);
        Ok(())
    }

    /// Parse and [`set`](Field::set). On failure the prior state is kept.
    pub fn set_str(&mut self, raw: &str) -> Result<(), FieldError> {
        self.set(T::parse_field(raw)?);
        Ok(())
    }

    /// Render the value in its UST text form.
    pub fn display(&self) -> String {
        self.value.render_field()
    }
}

/// A list-valued note parameter (pitches, PBW, PBY, PBM).
///
/// Bulk assignment validates every element and rejects the whole operation on
/// the first invalid one. Positional edits validate only the changed element
/// and mark the field modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListField<T> {
    values: Vec<T>,
    has_value: bool,
    modified: bool,
}

impl<T: FieldValue> ListField<T> {
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn has_value(&self) -> bool {
        self.has_value
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn init(&mut self, values: Vec<T>) {
        self.values = values;
        self.has_value = true;
    }

    pub fn set(&mut self, values: Vec<T>) {
        self.values = values;
        self.has_value = true;
        self.modified = true;
    }

    /// Parse a comma-separated list and [`init`](ListField::init).
    pub fn init_str(&mut self, raw: &str) -> Result<(), FieldError> {
        self.init(Self::parse_list(raw)?);
        Ok(())
    }

    /// Parse a comma-separated list and [`set`](ListField::set).
    pub fn set_str(&mut self, raw: &str) -> Result<(), FieldError> {
        self.set(Self::parse_list(raw)?);
        Ok(())
    }

    fn parse_list(raw: &str) -> Result<Vec<T>, FieldError> {
        raw.split(',').map(T::parse_field).collect()
    }

    pub fn append(&mut self, value: T) {
        self.values.push(value);
        self.modified = true;
    }

    pub fn insert(&mut self, index: usize, value: T) -> Result<(), FieldError> {
        if index > self.values.len() {
            return Err(FieldError::IndexOutOfRange {
                index,
                len: self.values.len(),
            });
        }
        self.values.insert(index, value);
        self.modified = true;
        Ok(())
    }

    pub fn set_at(&mut self, index: usize, value: T) -> Result<(), FieldError> {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                self.modified = true;
                Ok(())
            }
            None => Err(FieldError::IndexOutOfRange {
                index,
                len: self.values.len(),
            }),
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, FieldError> {
        if index >= self.values.len() {
            return Err(FieldError::IndexOutOfRange {
                index,
                len: self.values.len(),
            });
        }
        self.modified = true;
        Ok(self.values.remove(index))
    }

    pub fn display(&self) -> String {
        self.values
            .iter()
            .map(T::render_field)
            .collect::<Vec<_>>()
            .join(",")
    }
}
