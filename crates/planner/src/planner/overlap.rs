//! Day-bucket conflict detection.
//!
//! Every meeting of every chosen section is dropped into one bucket per weekday
//! it occupies. A bucket conflicts if two of its time tokens are identical or if
//! any pair of parsed ranges intersects.

use itertools::Itertools;
use std::collections::HashSet;

use super::days::{decompose, Weekday};
use super::time::TimeRange;
use super::types::{DataWarning, Section};

/// One meeting of a section on one atomic weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub day: Weekday,
    pub section: String,
    pub token: String,
    /// Parsed range, or the reason the token could not be read
    pub range: Result<TimeRange, String>,
}

/// Expands a section's index-aligned days/times into per-day slots.
pub fn slots_for(section: &Section) -> Vec<Slot> {
    let mut slots = Vec::new();

    for (days, token) in section.day_times() {
        let range = TimeRange::parse(token).map_err(|e| e.to_string());
        for day in decompose(days) {
            slots.push(Slot {
                day,
                section: section.identifier.clone(),
                token: token.to_string(),
                range: range.clone(),
            });
        }
    }

    slots
}

/// Outcome of checking one set of sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Conflict,
    /// No conflicts. Meetings whose time could not be parsed were skipped and
    /// are reported here.
    Clear(Vec<DataWarning>),
}

impl Verdict {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Verdict::Conflict)
    }
}

/// Checks `(course, slot)` pairs for same-day conflicts.
pub fn check_slots<'a, I>(slots: I) -> Verdict
where
    I: IntoIterator<Item = (&'a str, &'a Slot)>,
{
    let mut entries = Vec::new();
    let mut warnings: Vec<DataWarning> = Vec::new();

    for (course, slot) in slots {
        match &slot.range {
            Ok(range) => entries.push(TimeRangeEntry {
                day: slot.day,
                token: &slot.token,
                range: *range,
            }),
            Err(reason) => {
                let seen = warnings
                    .iter()
                    .any(|w| w.course == course && w.section == slot.section && w.token == slot.token);
                if !seen {
                    warnings.push(DataWarning {
                        course: course.to_string(),
                        section: slot.section.clone(),
                        token: slot.token.clone(),
                        message: reason.clone(),
                    });
                }
            }
        }
    }

    let mut buckets: [Vec<&TimeRangeEntry<'a>>; 6] = Default::default();
    for entry in &entries {
        buckets[entry.day.index()].push(entry);
    }

    for bucket in &buckets {
        if bucket.len() < 2 {
            continue;
        }

        let mut tokens = HashSet::with_capacity(bucket.len());
        if !bucket.iter().all(|e| tokens.insert(e.token)) {
            return Verdict::Conflict;
        }

        if bucket
            .iter()
            .tuple_combinations()
            .any(|(a, b)| a.range.overlaps(&b.range))
        {
            return Verdict::Conflict;
        }
    }

    Verdict::Clear(warnings)
}

struct TimeRangeEntry<'a> {
    day: Weekday,
    token: &'a str,
    range: TimeRange,
}

/// Returns true if two sections meet at intersecting times on a shared day.
pub fn sections_conflict(a: &Section, b: &Section) -> bool {
    let a_slots = slots_for(a);
    let b_slots = slots_for(b);
    check_slots(
        a_slots
            .iter()
            .map(|s| ("", s))
            .chain(b_slots.iter().map(|s| ("", s))),
    )
    .is_conflict()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::types::{Meeting, SectionKind};

    fn section(id: &str, meetings: &[(&str, &str)]) -> Section {
        let mut s = Section::new(SectionKind::Lecture, id);
        for (days, time) in meetings {
            s.push_meeting(Meeting {
                days: days.to_string(),
                time: time.to_string(),
                ..Meeting::default()
            });
        }
        s
    }

    #[test]
    fn test_touching_boundary_conflicts() {
        let a = section("A", &[("MWF", "900-950")]);
        let b = section("B", &[("F", "950-1040")]);
        assert!(sections_conflict(&a, &b));
    }

    #[test]
    fn test_disjoint_days_do_not_conflict() {
        let a = section("A", &[("MWF", "900-950")]);
        let b = section("B", &[("TTh", "900-1020")]);
        assert!(!sections_conflict(&a, &b));
    }

    #[test]
    fn test_separated_times_do_not_conflict() {
        let a = section("A", &[("MWF", "900-950")]);
        let b = section("B", &[("W", "1000-1050")]);
        assert!(!sections_conflict(&a, &b));
    }

    #[test]
    fn test_contained_range_conflicts() {
        let a = section("A", &[("T", "1000-1050")]);
        let b = section("B", &[("T", "930-1120")]);
        assert!(sections_conflict(&a, &b));
        assert!(sections_conflict(&b, &a));
    }

    #[test]
    fn test_identical_tokens_conflict() {
        let a = section("A", &[("M", "1130-1220")]);
        let b = section("B", &[("M", "1130-1220")]);
        assert!(sections_conflict(&a, &b));
    }

    #[test]
    fn test_malformed_meeting_is_skipped_with_warning() {
        let a = section("A", &[("MW", "TBA")]);
        let b = section("B", &[("M", "900-950")]);
        let a_slots = slots_for(&a);
        let b_slots = slots_for(&b);

        let verdict = check_slots(
            a_slots
                .iter()
                .map(|s| ("CSE142", s))
                .chain(b_slots.iter().map(|s| ("CSE143", s))),
        );

        match verdict {
            Verdict::Clear(warnings) => {
                // one warning even though the token lands in two day buckets
                assert_eq!(warnings.len(), 1);
                assert_eq!(warnings[0].course, "CSE142");
                assert_eq!(warnings[0].token, "TBA");
            }
            Verdict::Conflict => panic!("malformed meeting must not cause a conflict"),
        }
    }

    #[test]
    fn test_thursday_is_its_own_bucket() {
        let a = section("A", &[("T", "900-950")]);
        let b = section("B", &[("Th", "900-950")]);
        assert!(!sections_conflict(&a, &b));
    }
}
