//! Core engine for converting iCalendar events into org-mode outlines.
//!
//! Pipeline: [`ics::parse_calendar`] turns raw ICS text into [`Event`]
//! records; [`render_event`] normalizes their temporal values to a target
//! timezone, expands recurrence rules (RRULE plus RDATE/EXDATE), and
//! formats every occurrence as an org timestamp.

pub mod error;
pub mod event;
pub mod ics;
pub mod recurrence;
pub mod render;
pub mod stamp;
pub mod temporal;

pub use error::{Cal2OrgError, Cal2OrgResult};
pub use event::{Event, EventTime};
pub use recurrence::{DEFAULT_OCCURRENCE_CAP, Occurrence, expand};
pub use render::{RenderedEvent, render_event};
pub use stamp::format_interval;
pub use temporal::Temporal;
