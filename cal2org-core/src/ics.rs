//! ICS file parsing using the icalendar crate's parser.

use icalendar::{
    DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use crate::error::{Cal2OrgError, Cal2OrgResult};
use crate::event::{Event, EventTime};

/// Parse ICS content into the events it contains, in file order.
pub fn parse_calendar(content: &str) -> Cal2OrgResult<Vec<Event>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| Cal2OrgError::IcsParse(e.to_string()))?;

    calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(parse_event)
        .collect()
}

fn parse_event(vevent: &Component) -> Cal2OrgResult<Event> {
    let start = vevent
        .find_prop("DTSTART")
        .ok_or_else(|| Cal2OrgError::IcsParse("VEVENT without DTSTART".to_string()))
        .and_then(to_event_time)?;
    let end = vevent.find_prop("DTEND").map(to_event_time).transpose()?;

    let rrule = vevent.find_prop("RRULE").map(|p| p.val.to_string());
    let rdates = collect_date_list(vevent, "RDATE")?;
    let exdates = collect_date_list(vevent, "EXDATE")?;

    Ok(Event {
        summary: prop_text(vevent, "SUMMARY"),
        description: prop_text(vevent, "DESCRIPTION"),
        location: prop_text(vevent, "LOCATION"),
        start,
        end,
        rrule,
        rdates,
        exdates,
    })
}

/// Free-text property value, empty string when absent.
fn prop_text(vevent: &Component, name: &str) -> String {
    vevent
        .find_prop(name)
        .map(|p| p.val.to_string())
        .unwrap_or_default()
}

fn to_event_time(prop: &Property) -> Cal2OrgResult<EventTime> {
    let dpt = DatePerhapsTime::try_from(prop).map_err(|_| {
        Cal2OrgError::IcsParse(format!(
            "unreadable {} value: {}",
            prop.name.as_ref(),
            prop.val.as_ref()
        ))
    })?;

    Ok(match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        },
    })
}

/// Gather every RDATE or EXDATE property of the event into a flat list.
/// A value that fails to parse is an error: a dropped exclusion would
/// silently change which occurrences the event produces.
fn collect_date_list(vevent: &Component, name: &str) -> Cal2OrgResult<Vec<EventTime>> {
    let mut values = Vec::new();
    for prop in vevent.properties.iter().filter(|p| p.name == name) {
        parse_date_list(prop, &mut values)?;
    }
    Ok(values)
}

/// Parse one RDATE/EXDATE property into `values`.
///
/// Handles:
/// - TZID parameter: `EXDATE;TZID=America/New_York:20240108T100000`
/// - VALUE=DATE: `EXDATE;VALUE=DATE:20240108`
/// - UTC: `EXDATE:20240108T100000Z`
/// - Floating: `EXDATE:20240108T100000`
/// - Comma-separated values: `EXDATE;TZID=...:20240108T100000,20240115T100000`
fn parse_date_list(prop: &Property, values: &mut Vec<EventTime>) -> Cal2OrgResult<()> {
    let tzid = prop
        .params
        .iter()
        .find(|p| p.key == "TZID")
        .and_then(|p| p.val.as_ref().map(|v| v.to_string()));

    let is_date = prop
        .params
        .iter()
        .any(|p| p.key == "VALUE" && p.val.as_ref().map(|v| v.as_ref()) == Some("DATE"));

    for s in prop.val.as_ref().split(',') {
        let s = s.trim();
        if s.is_empty() {
            continue;
        }
        let parsed = if is_date {
            chrono::NaiveDate::parse_from_str(s, "%Y%m%d")
                .ok()
                .map(EventTime::Date)
        } else if let Some(ref tz) = tzid {
            chrono::NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
                .ok()
                .map(|dt| EventTime::DateTimeZoned {
                    datetime: dt,
                    tzid: tz.clone(),
                })
        } else if let Some(stripped) = s.strip_suffix('Z') {
            chrono::NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S")
                .ok()
                .map(|dt| EventTime::DateTimeUtc(dt.and_utc()))
        } else {
            chrono::NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
                .ok()
                .map(EventTime::DateTimeFloating)
        };
        match parsed {
            Some(value) => values.push(value),
            None => {
                return Err(Cal2OrgError::IcsParse(format!(
                    "unreadable {} value: {}",
                    prop.name.as_ref(),
                    s
                )));
            }
        }
    }

    Ok(())
}
