//! Org-mode timestamp rendering.
//!
//! Turns one or two temporal values into a single `<...>` stamp. Ranges
//! collapse the way org displays them best: a timed range within one day
//! becomes `<date HH:MM-HH:MM>`, and a one-day all-day "range" is shown as
//! a single stamp rather than a trivial range.

use crate::temporal::Temporal;

/// Render a start (and optional end) as one org timestamp string.
///
/// The same-day and equal-date collapses are special cases of the general
/// `<..>--<..>` form and must be checked first.
pub fn format_interval(start: &Temporal, end: Option<&Temporal>) -> String {
    let Some(end) = end else {
        return format!("<{}>", start.stamp());
    };

    match (start, end) {
        (Temporal::Instant(s), Temporal::Instant(e)) if s.date_naive() == e.date_naive() => {
            format!("<{}-{}>", start.stamp(), e.format("%H:%M"))
        }
        (Temporal::Date(s), Temporal::Date(e)) if s == e => {
            format!("<{}>", start.stamp())
        }
        _ => format!("<{}>--<{}>", start.stamp(), end.stamp()),
    }
}
