//! RRULE expansion for recurring events.
//!
//! Builds an iCalendar text block (DTSTART + RRULE + RDATE/EXDATE lines)
//! for the `rrule` crate's parser and maps the generated instants back
//! into occurrences that preserve the base event's duration.

use chrono::Duration;
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::error::{Cal2OrgError, Cal2OrgResult};
use crate::event::EventTime;
use crate::temporal::Temporal;

/// Generation cap for rules with no COUNT/UNTIL bound (two years of a
/// daily rule). Expansion fails with `UnboundedRecurrence` when hit.
pub const DEFAULT_OCCURRENCE_CAP: u16 = 730;

/// One concrete happening of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub start: Temporal,
    pub end: Option<Temporal>,
}

/// Which list a date constraint belongs to.
#[derive(Debug, Clone, Copy)]
enum DateListKind {
    Additional,
    Excluded,
}

impl DateListKind {
    fn property(self) -> &'static str {
        match self {
            DateListKind::Additional => "RDATE",
            DateListKind::Excluded => "EXDATE",
        }
    }
}

/// Expand an event's start/end into its full occurrence list.
///
/// Without a rule this is the single `(start, end)` pair. With a rule, the
/// generated set plus RDATE values minus EXDATE values, ascending by start,
/// no duplicate starts. RDATE/EXDATE values are normalized to `tz` before
/// they enter the set, so exclusion matches on exact instants.
///
/// `cap` bounds generation for rules with no COUNT/UNTIL; hitting it is an
/// `UnboundedRecurrence` error rather than a silent truncation.
pub fn expand(
    start: &Temporal,
    end: Option<&Temporal>,
    rule: Option<&str>,
    rdates: &[EventTime],
    exdates: &[EventTime],
    tz: Tz,
    cap: u16,
) -> Cal2OrgResult<Vec<Occurrence>> {
    let Some(rule) = rule else {
        return Ok(vec![Occurrence {
            start: start.clone(),
            end: end.cloned(),
        }]);
    };

    let mut lines = vec![dtstart_line(start, tz), format!("RRULE:{rule}")];
    for (kind, values) in [
        (DateListKind::Additional, rdates),
        (DateListKind::Excluded, exdates),
    ] {
        for value in values {
            let normalized = Temporal::from_event_time(value, tz)?;
            lines.push(date_list_line(kind, &normalized, tz));
        }
    }

    let set: RRuleSet = lines
        .join("\n")
        .parse()
        .map_err(|e: rrule::RRuleError| Cal2OrgError::RuleSyntax {
            rule: rule.to_string(),
            message: e.to_string(),
        })?;

    // Ask for one instant beyond the cap: a bounded rule that stops at or
    // under the cap comes back whole, while anything still producing past
    // it has outrun the cap.
    let result = set.all(cap.saturating_add(1));
    if result.dates.len() > cap as usize {
        return Err(Cal2OrgError::UnboundedRecurrence {
            rule: rule.to_string(),
            cap,
        });
    }

    let pairing = EndPairing::for_base(start, end)?;
    let mut occurrences: Vec<Occurrence> = result
        .dates
        .iter()
        .map(|dt| {
            let occ_start = match start {
                Temporal::Date(_) => Temporal::Date(dt.date_naive()),
                Temporal::Instant(_) => Temporal::Instant(dt.with_timezone(&tz)),
            };
            let occ_end = pairing.end_for(&occ_start);
            Occurrence {
                start: occ_start,
                end: occ_end,
            }
        })
        .collect();

    // The rule set already emits ascending starts; an RDATE that coincides
    // with a generated instant would repeat, so drop adjacent duplicates.
    occurrences.dedup_by(|a, b| a.start == b.start);

    Ok(occurrences)
}

/// DTSTART line anchoring the rule at the (normalized) base start. The
/// rrule engine needs a datetime, so all-day events anchor at midnight UTC.
fn dtstart_line(start: &Temporal, tz: Tz) -> String {
    match start {
        Temporal::Date(d) => format!("DTSTART:{}T000000Z", d.format("%Y%m%d")),
        Temporal::Instant(dt) => format!(
            "DTSTART;TZID={}:{}",
            tz.name(),
            dt.with_timezone(&tz).format("%Y%m%dT%H%M%S")
        ),
    }
}

/// RDATE/EXDATE line in the same form as the DTSTART anchor, so the rule
/// engine's instant equality lines up.
fn date_list_line(kind: DateListKind, value: &Temporal, tz: Tz) -> String {
    match value {
        Temporal::Date(d) => format!("{}:{}T000000Z", kind.property(), d.format("%Y%m%d")),
        Temporal::Instant(dt) => format!(
            "{};TZID={}:{}",
            kind.property(),
            tz.name(),
            dt.with_timezone(&tz).format("%Y%m%dT%H%M%S")
        ),
    }
}

/// How each occurrence's end derives from its start: the base pair's
/// duration is preserved, not its clock time.
enum EndPairing {
    None,
    /// All-day pair: whole days between start and end.
    Days(i64),
    /// Timed pair: absolute-time duration, so a meeting spanning a DST
    /// switch keeps its length even when the civil clock shifts.
    Absolute(Duration),
}

impl EndPairing {
    fn for_base(start: &Temporal, end: Option<&Temporal>) -> Cal2OrgResult<Self> {
        match (start, end) {
            (_, None) => Ok(EndPairing::None),
            (Temporal::Date(s), Some(Temporal::Date(e))) => {
                Ok(EndPairing::Days((*e - *s).num_days()))
            }
            (Temporal::Instant(s), Some(Temporal::Instant(e))) => {
                Ok(EndPairing::Absolute(*e - *s))
            }
            (s, Some(e)) => Err(Cal2OrgError::InvalidTemporalValue(format!(
                "start '{s}' and end '{e}' mix all-day and timed forms"
            ))),
        }
    }

    fn end_for(&self, start: &Temporal) -> Option<Temporal> {
        match (self, start) {
            (EndPairing::None, _) => None,
            (EndPairing::Days(days), Temporal::Date(d)) => {
                Some(Temporal::Date(*d + Duration::days(*days)))
            }
            (EndPairing::Absolute(duration), Temporal::Instant(dt)) => {
                Some(Temporal::Instant(*dt + *duration))
            }
            // Occurrence starts always share the base start's variant.
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::{Europe::Paris, UTC};

    fn utc_instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> Temporal {
        Temporal::Instant(UTC.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
    }

    #[test]
    fn test_no_rule_yields_the_single_base_pair() {
        let start = utc_instant(2024, 3, 1, 9, 0);
        let end = utc_instant(2024, 3, 1, 10, 30);

        let occurrences = expand(&start, Some(&end), None, &[], &[], UTC, 10).unwrap();

        assert_eq!(
            occurrences,
            vec![Occurrence {
                start,
                end: Some(end)
            }]
        );
    }

    #[test]
    fn test_weekly_count_with_exclusion() {
        // Mondays at 09:00, three times, with the middle one excluded.
        let start = utc_instant(2024, 3, 4, 9, 0);
        let excluded = EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap());

        let occurrences = expand(
            &start,
            None,
            Some("FREQ=WEEKLY;COUNT=3"),
            &[],
            &[excluded],
            UTC,
            DEFAULT_OCCURRENCE_CAP,
        )
        .unwrap();

        let starts: Vec<String> = occurrences.iter().map(|o| o.start.stamp()).collect();
        assert_eq!(starts, vec!["2024-03-04 Mon 09:00", "2024-03-18 Mon 09:00"]);
    }

    #[test]
    fn test_exclusion_removes_only_exact_matches() {
        let start = utc_instant(2024, 3, 4, 9, 0);
        // One hour off the generated 09:00 instant: nothing should go away.
        let near_miss = EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap());

        let occurrences = expand(
            &start,
            None,
            Some("FREQ=WEEKLY;COUNT=3"),
            &[],
            &[near_miss],
            UTC,
            DEFAULT_OCCURRENCE_CAP,
        )
        .unwrap();

        assert_eq!(occurrences.len(), 3);
    }

    #[test]
    fn test_rdate_adds_an_occurrence_in_sorted_position() {
        let start = utc_instant(2024, 3, 4, 9, 0);
        let extra = EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap());

        let occurrences = expand(
            &start,
            None,
            Some("FREQ=WEEKLY;COUNT=2"),
            &[extra],
            &[],
            UTC,
            DEFAULT_OCCURRENCE_CAP,
        )
        .unwrap();

        let starts: Vec<String> = occurrences.iter().map(|o| o.start.stamp()).collect();
        assert_eq!(
            starts,
            vec![
                "2024-03-04 Mon 09:00",
                "2024-03-06 Wed 09:00",
                "2024-03-11 Mon 09:00"
            ]
        );
    }

    #[test]
    fn test_rdate_equal_to_a_generated_instant_is_not_duplicated() {
        let start = utc_instant(2024, 3, 4, 9, 0);
        let same = EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap());

        let occurrences = expand(
            &start,
            None,
            Some("FREQ=WEEKLY;COUNT=2"),
            &[same],
            &[],
            UTC,
            DEFAULT_OCCURRENCE_CAP,
        )
        .unwrap();

        assert_eq!(occurrences.len(), 2);
    }

    #[test]
    fn test_each_occurrence_preserves_the_base_duration() {
        let start = utc_instant(2024, 3, 4, 9, 0);
        let end = utc_instant(2024, 3, 4, 10, 30);

        let occurrences = expand(
            &start,
            Some(&end),
            Some("FREQ=WEEKLY;COUNT=3"),
            &[],
            &[],
            UTC,
            DEFAULT_OCCURRENCE_CAP,
        )
        .unwrap();

        assert_eq!(occurrences.len(), 3);
        for occ in &occurrences {
            let (Temporal::Instant(s), Some(Temporal::Instant(e))) = (&occ.start, &occ.end) else {
                panic!("expected timed occurrences");
            };
            assert_eq!(*e - *s, Duration::minutes(90));
        }
    }

    #[test]
    fn test_duration_is_preserved_across_a_dst_transition() {
        // Paris leaps 02:00 -> 03:00 on 2024-03-31. A two-hour event
        // starting daily at 01:30 keeps its two hours in absolute time,
        // so on the 31st its civil end lands on 04:30 instead of 03:30.
        let start = Temporal::Instant(Paris.with_ymd_and_hms(2024, 3, 30, 1, 30, 0).unwrap());
        let end = Temporal::Instant(Paris.with_ymd_and_hms(2024, 3, 30, 3, 30, 0).unwrap());

        let occurrences = expand(
            &start,
            Some(&end),
            Some("FREQ=DAILY;COUNT=2"),
            &[],
            &[],
            Paris,
            DEFAULT_OCCURRENCE_CAP,
        )
        .unwrap();

        assert_eq!(occurrences.len(), 2);
        for occ in &occurrences {
            let (Temporal::Instant(s), Some(Temporal::Instant(e))) = (&occ.start, &occ.end) else {
                panic!("expected timed occurrences");
            };
            assert_eq!(*e - *s, Duration::hours(2));
        }
        assert_eq!(occurrences[1].start.stamp(), "2024-03-31 Sun 01:30");
        assert_eq!(
            occurrences[1].end.as_ref().unwrap().stamp(),
            "2024-03-31 Sun 04:30"
        );
    }

    #[test]
    fn test_all_day_recurrence_stays_all_day() {
        let start = Temporal::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let end = Temporal::Date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());

        let occurrences = expand(
            &start,
            Some(&end),
            Some("FREQ=WEEKLY;COUNT=2"),
            &[],
            &[],
            UTC,
            DEFAULT_OCCURRENCE_CAP,
        )
        .unwrap();

        assert_eq!(
            occurrences,
            vec![
                Occurrence {
                    start: Temporal::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
                    end: Some(Temporal::Date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())),
                },
                Occurrence {
                    start: Temporal::Date(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()),
                    end: Some(Temporal::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())),
                },
            ]
        );
    }

    #[test]
    fn test_unbounded_rule_hits_the_cap_and_reports() {
        let start = utc_instant(2024, 3, 4, 9, 0);

        let err = expand(&start, None, Some("FREQ=DAILY"), &[], &[], UTC, 5).unwrap_err();

        assert!(matches!(
            err,
            Cal2OrgError::UnboundedRecurrence { cap: 5, .. }
        ));
    }

    #[test]
    fn test_bounded_rule_under_the_cap_is_fine() {
        let start = utc_instant(2024, 3, 4, 9, 0);

        let occurrences =
            expand(&start, None, Some("FREQ=DAILY;COUNT=5"), &[], &[], UTC, 10).unwrap();

        assert_eq!(occurrences.len(), 5);
    }

    #[test]
    fn test_bounded_rule_generating_exactly_cap_occurrences_is_fine() {
        let start = utc_instant(2024, 3, 4, 9, 0);

        let occurrences =
            expand(&start, None, Some("FREQ=DAILY;COUNT=5"), &[], &[], UTC, 5).unwrap();

        assert_eq!(occurrences.len(), 5);
    }

    #[test]
    fn test_until_bounded_rule_at_the_cap_is_fine() {
        // Seven Mondays, Mar 4 through Apr 15.
        let start = utc_instant(2024, 3, 4, 9, 0);

        let occurrences = expand(
            &start,
            None,
            Some("FREQ=WEEKLY;UNTIL=20240415T090000Z"),
            &[],
            &[],
            UTC,
            7,
        )
        .unwrap();

        assert_eq!(occurrences.len(), 7);
    }

    #[test]
    fn test_garbage_rule_is_a_syntax_error() {
        let start = utc_instant(2024, 3, 4, 9, 0);

        let err = expand(
            &start,
            None,
            Some("FREQ=SOMETIMES"),
            &[],
            &[],
            UTC,
            DEFAULT_OCCURRENCE_CAP,
        )
        .unwrap_err();

        assert!(matches!(err, Cal2OrgError::RuleSyntax { rule, .. } if rule == "FREQ=SOMETIMES"));
    }

    #[test]
    fn test_mixed_start_and_end_variants_are_rejected() {
        let start = utc_instant(2024, 3, 4, 9, 0);
        let end = Temporal::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        let err = expand(
            &start,
            Some(&end),
            Some("FREQ=WEEKLY;COUNT=2"),
            &[],
            &[],
            UTC,
            DEFAULT_OCCURRENCE_CAP,
        )
        .unwrap_err();

        assert!(matches!(err, Cal2OrgError::InvalidTemporalValue(_)));
    }
}
