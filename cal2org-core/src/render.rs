//! Per-event orchestration: normalization, expansion, stamp formatting.

use std::collections::BTreeMap;

use chrono::Duration;
use chrono_tz::Tz;

use crate::error::Cal2OrgResult;
use crate::event::Event;
use crate::recurrence::{self, Occurrence};
use crate::stamp::format_interval;
use crate::temporal::Temporal;

/// A fully rendered event: its free-text fields plus one org stamp per
/// occurrence, in chronological order.
#[derive(Debug, Clone)]
pub struct RenderedEvent {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub stamps: Vec<String>,
}

/// Render one event: normalize its temporal fields to `tz`, expand the
/// recurrence (if any), and format every occurrence as an org stamp.
///
/// Processing is pure and per-event; any failure aborts this event's
/// rendering with no partial output.
pub fn render_event(event: &Event, tz: Tz, cap: u16) -> Cal2OrgResult<RenderedEvent> {
    let start = Temporal::from_event_time(&event.start, tz)?;
    let end = match &event.end {
        Some(raw) => {
            let end = Temporal::from_event_time(raw, tz)?;
            // DTEND is exclusive for all-day events: the last occupied day
            // is the one before it.
            Some(match end {
                Temporal::Date(d) => Temporal::Date(d - Duration::days(1)),
                instant => instant,
            })
        }
        None => None,
    };

    let occurrences = recurrence::expand(
        &start,
        end.as_ref(),
        event.rrule.as_deref(),
        &event.rdates,
        &event.exdates,
        tz,
        cap,
    )?;

    let stamps = occurrences
        .iter()
        .map(|Occurrence { start, end }| format_interval(start, end.as_ref()))
        .collect();

    Ok(RenderedEvent {
        summary: event.summary.clone(),
        description: event.description.clone(),
        location: event.location.clone(),
        stamps,
    })
}

impl RenderedEvent {
    /// Field map for template substitution: every free-text field (empty
    /// string when absent in the source) plus `dates`, the newline-joined
    /// stamp list.
    pub fn fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("summary".to_string(), self.summary.clone()),
            ("description".to_string(), self.description.clone()),
            ("location".to_string(), self.location.clone()),
            ("dates".to_string(), self.stamps.join("\n")),
        ])
    }

    /// Default org rendering: a headline, the stamps indented below it,
    /// then the description when there is one.
    pub fn org_fragment(&self) -> String {
        let mut s = format!("* {}\n", self.summary);
        for stamp in &self.stamps {
            s.push_str("  ");
            s.push_str(stamp);
            s.push('\n');
        }
        s.push('\n');
        if !self.description.is_empty() {
            s.push_str(&self.description);
            s.push('\n');
        }
        s
    }
}
