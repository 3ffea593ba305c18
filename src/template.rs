//! Message template rendering
//!
//! Operator templates are stored in host configuration as single-line
//! strings. `;` is the line-break marker (the host's config UI cannot hold
//! literal newlines, and a literal semicolon cannot be expressed), and
//! `{name}` placeholders are substituted from a closed per-event field map.

/// Render an operator template against the fields of one event.
///
/// Every `;` becomes a newline, then each `{name}` occurrence is replaced
/// with the matching field value. Placeholders with no matching field are
/// left untouched, so a typo shows up verbatim in the channel instead of
/// killing the notification.
#[must_use]
pub fn render(template: &str, fields: &[(&'static str, String)]) -> String {
    let mut text = template.replace(';', "\n");
    for (name, value) in fields {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}
