//! Envelope assembly for the concatenation tool.
//!
//! Wavtool takes the envelope as space-separated tokens; the `%` slot stands
//! for the applied overlap. A note's own envelope (comma-separated score
//! form) is translated, substituting `%` — or appending the overlap when the
//! score form has no `%` slot. Notes without an envelope use the configured
//! default template.

use utakata_score::EnvelopeField;

/// The template used when a note carries no envelope of its own.
pub const DEFAULT_ENVELOPE: &str = "0 5 35 0 100 100 0 %";

/// Build the wire-format envelope string for one note.
pub fn wire_format(envelope: &EnvelopeField, at_overlap: f64, default_template: &str) -> String {
    let overlap = format!("{at_overlap:.3}");
    if !envelope.has_value() {
        return default_template.replace('%', &overlap);
    }
    let score_form = envelope.display();
    if score_form.contains('%') {
        score_form.replace('%', &overlap).replace(',', " ")
    } else {
        format!("{} {}", score_form.replace(',', " "), overlap)
    }
}
