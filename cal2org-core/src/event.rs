//! Parse-boundary event types.
//!
//! `Event` is what the ICS parser produces and the renderer consumes: raw
//! temporal values exactly as the file stated them, free-text fields
//! defaulted to empty strings, and RDATE/EXDATE flattened into uniform
//! lists regardless of how the properties were spelled in the file.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A date or datetime value as it appears in an ICS file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    /// All-day date: no time-of-day, no timezone
    Date(NaiveDate),
    /// Datetime with a trailing `Z`
    DateTimeUtc(DateTime<Utc>),
    /// Datetime with neither `Z` nor a TZID, interpreted in the target timezone
    DateTimeFloating(NaiveDateTime),
    /// Datetime qualified by a `TZID=` parameter
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

/// A single VEVENT, reduced to the fields the converter needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: EventTime,
    /// DTEND as stated in the file. All-day ends are still end-exclusive here.
    pub end: Option<EventTime>,
    /// Raw RRULE value text, e.g. `FREQ=WEEKLY;COUNT=3`
    pub rrule: Option<String>,
    /// Additional occurrences (RDATE)
    pub rdates: Vec<EventTime>,
    /// Excluded occurrences (EXDATE)
    pub exdates: Vec<EventTime>,
}
