//! The core temporal value: a floating date or an absolute instant.
//!
//! Raw `EventTime` values from the parser resolve into a `Temporal` against
//! a target timezone; everything downstream (expansion, stamp formatting)
//! works on this two-variant type.

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;

use crate::error::{Cal2OrgError, Cal2OrgResult};
use crate::event::EventTime;

/// Org stamp pattern for all-day dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d %a";
/// Org stamp pattern for timed values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %a %H:%M";

/// A calendar value: either a floating date with no time-of-day, or an
/// absolute instant expressed in a concrete timezone.
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal {
    Date(NaiveDate),
    Instant(DateTime<Tz>),
}

impl Temporal {
    /// Resolve a raw ICS value against the target timezone.
    ///
    /// Floating datetimes are interpreted as local time in the target zone.
    /// An ambiguous local time (DST fall-back) takes the earlier mapping; a
    /// nonexistent one (spring-forward gap) is an error.
    pub fn from_event_time(raw: &EventTime, tz: Tz) -> Cal2OrgResult<Self> {
        match raw {
            EventTime::Date(d) => Ok(Temporal::Date(*d)),
            EventTime::DateTimeUtc(dt) => Ok(Temporal::Instant(dt.with_timezone(&tz))),
            EventTime::DateTimeFloating(naive) => tz
                .from_local_datetime(naive)
                .earliest()
                .map(Temporal::Instant)
                .ok_or_else(|| {
                    Cal2OrgError::InvalidTemporalValue(format!(
                        "local time {} does not exist in {}",
                        naive,
                        tz.name()
                    ))
                }),
            EventTime::DateTimeZoned { datetime, tzid } => {
                let source: Tz = tzid
                    .parse()
                    .map_err(|_| Cal2OrgError::TimezoneResolution(tzid.clone()))?;
                source
                    .from_local_datetime(datetime)
                    .earliest()
                    .map(|dt| Temporal::Instant(dt.with_timezone(&tz)))
                    .ok_or_else(|| {
                        Cal2OrgError::InvalidTemporalValue(format!(
                            "local time {datetime} does not exist in {tzid}"
                        ))
                    })
            }
        }
    }

    /// Re-express an instant in `tz` without moving it in absolute time.
    /// The offset is computed at that instant, so DST comes out right.
    /// Floating dates are returned unchanged.
    pub fn normalize(&self, tz: Tz) -> Temporal {
        match self {
            Temporal::Date(d) => Temporal::Date(*d),
            Temporal::Instant(dt) => Temporal::Instant(dt.with_timezone(&tz)),
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Temporal::Date(_))
    }

    pub fn is_instant(&self) -> bool {
        matches!(self, Temporal::Instant(_))
    }

    /// The strftime pattern used to render this value in an org stamp.
    pub fn stamp_format(&self) -> &'static str {
        match self {
            Temporal::Date(_) => DATE_FORMAT,
            Temporal::Instant(_) => DATETIME_FORMAT,
        }
    }

    /// The value rendered for use inside `<...>`.
    pub fn stamp(&self) -> String {
        match self {
            Temporal::Date(d) => d.format(DATE_FORMAT).to_string(),
            Temporal::Instant(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }

    /// Calendar date of either variant.
    pub fn date(&self) -> NaiveDate {
        match self {
            Temporal::Date(d) => *d,
            Temporal::Instant(dt) => dt.date_naive(),
        }
    }
}

impl std::fmt::Display for Temporal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.stamp())
    }
}
