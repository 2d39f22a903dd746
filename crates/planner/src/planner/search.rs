//! Lazy, conflict-filtered enumeration of schedule candidates.
//!
//! The search space is the Cartesian product of every requested course's
//! section tuples. It is walked one candidate at a time: the first course is
//! the outermost loop and the last course varies fastest. Candidates with a
//! same-day conflict are skipped; nothing is materialized ahead of the caller.

use itertools::structs::MultiProduct;
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, warn};

use super::catalog::Catalog;
use super::error::{PlannerError, Result};
use super::expand::expand_course;
use super::overlap::{check_slots, Verdict};
use super::types::{RequestedCourse, ScheduleCandidate, SectionTuple};

type TupleProduct = MultiProduct<std::vec::IntoIter<Arc<SectionTuple>>>;

pub struct ConflictFreeSearch {
    product: TupleProduct,
    examined: u64,
    rejected: u64,
}

impl ConflictFreeSearch {
    /// Searches over already expanded tuples, one sequence per course, in
    /// request order.
    pub fn new(per_course: Vec<Vec<Arc<SectionTuple>>>) -> Result<Self> {
        if per_course.is_empty() {
            return Err(PlannerError::EmptyRequest);
        }

        Ok(Self {
            product: per_course
                .into_iter()
                .map(Vec::into_iter)
                .multi_cartesian_product(),
            examined: 0,
            rejected: 0,
        })
    }

    /// Expands each request against the catalog and prepares the search.
    ///
    /// Unknown courses or lectures fail here, before any candidate is looked at.
    pub fn build(catalog: &Catalog, requests: &[RequestedCourse]) -> Result<Self> {
        let per_course = requests
            .iter()
            .map(|request| expand_course(catalog, request))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Search space sizes per course: {:?}",
            per_course.iter().map(Vec::len).collect::<Vec<_>>()
        );

        Self::new(per_course)
    }

    /// Number of candidates evaluated so far, accepted or not.
    pub fn examined(&self) -> u64 {
        self.examined
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl Iterator for ConflictFreeSearch {
    type Item = ScheduleCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let tuples = self.product.next()?;
            self.examined += 1;

            let verdict = check_slots(
                tuples
                    .iter()
                    .flat_map(|t| t.slots().iter().map(move |s| (t.course.as_str(), s))),
            );

            match verdict {
                Verdict::Conflict => self.rejected += 1,
                Verdict::Clear(warnings) => {
                    for w in &warnings {
                        warn!(
                            "Ignoring unreadable time {:?} for {} section {}: {}",
                            w.token, w.course, w.section, w.message
                        );
                    }
                    return Some(ScheduleCandidate { tuples, warnings });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::catalog::{CatalogBuilder, SectionRow};
    use crate::planner::overlap::sections_conflict;
    use crate::planner::types::{Meeting, SectionKind};

    fn row(course: &str, kind: SectionKind, id: &str, days: &str, time: &str) -> SectionRow {
        SectionRow {
            course: course.to_string(),
            kind,
            identifier: id.to_string(),
            lecture: None,
            meeting: Meeting {
                days: days.to_string(),
                time: time.to_string(),
                building: "SAV".to_string(),
                room: "260".to_string(),
                seats: "5/25".to_string(),
            },
        }
    }

    fn labels(candidate: &ScheduleCandidate) -> Vec<String> {
        candidate
            .sections()
            .map(|(course, s)| format!("{course}-{}", s.identifier))
            .collect()
    }

    fn busy_catalog() -> Catalog {
        CatalogBuilder::from_rows(vec![
            row("CSE142", SectionKind::Lecture, "A", "MWF", "930-1020"),
            row("CSE142", SectionKind::Quiz, "AA", "TTh", "930-1020"),
            row("CSE142", SectionKind::Quiz, "AB", "TTh", "1130-1220"),
            row("CSE142", SectionKind::Lecture, "B", "MWF", "130-220"),
            row("CSE142", SectionKind::Quiz, "BA", "TTh", "130-220"),
            row("MATH124", SectionKind::Lecture, "A", "MWF", "1000-1050"),
            row("MATH124", SectionKind::Quiz, "AA", "TTh", "1130-1220"),
            row("MATH124", SectionKind::Quiz, "AB", "TTh", "1230-120"),
            row("MATH124", SectionKind::Lecture, "B", "MTWThF", "230-320"),
            row("ENGL131", SectionKind::Lecture, "A", "TTh", "1030-1120"),
            row("ENGL131", SectionKind::Lecture, "C", "MW", "130-320"),
        ])
        .unwrap()
    }

    fn requests(names: &[&str]) -> Vec<RequestedCourse> {
        names.iter().map(|n| RequestedCourse::parse(n)).collect()
    }

    #[test]
    fn test_two_course_scenario() {
        let catalog = CatalogBuilder::from_rows(vec![
            row("CS101", SectionKind::Lecture, "A", "MWF", "900-950"),
            row("CS101", SectionKind::Quiz, "AA", "F", "1030-1120"),
            row("CS102", SectionKind::Lecture, "B", "TTh", "900-1020"),
        ])
        .unwrap();

        let results: Vec<_> = ConflictFreeSearch::build(&catalog, &requests(&["CS101", "CS102"]))
            .unwrap()
            .collect();

        assert_eq!(results.len(), 1);
        assert_eq!(labels(&results[0]), vec!["CS101-A", "CS101-AA", "CS102-B"]);
        assert!(results[0].warnings.is_empty());
    }

    #[test]
    fn test_accepted_candidates_have_no_conflicts() {
        let catalog = busy_catalog();
        let search =
            ConflictFreeSearch::build(&catalog, &requests(&["CSE142", "MATH124", "ENGL131"])).unwrap();
        let results: Vec<_> = search.collect();
        assert!(!results.is_empty());

        for candidate in &results {
            let sections: Vec<_> = candidate.sections().map(|(_, s)| s).collect();
            for (a, b) in sections.iter().tuple_combinations() {
                assert!(!sections_conflict(a, b), "{:?}", labels(candidate));
            }
        }
    }

    #[test]
    fn test_order_is_course_major_and_deterministic() {
        let catalog = busy_catalog();
        let run = || -> Vec<Vec<String>> {
            ConflictFreeSearch::build(&catalog, &requests(&["CSE142", "MATH124"]))
                .unwrap()
                .map(|c| labels(&c))
                .collect()
        };

        let first = run();
        assert_eq!(first, run());
        assert_eq!(
            first,
            vec![
                vec!["CSE142-A", "CSE142-AA", "MATH124-B"],
                vec!["CSE142-A", "CSE142-AB", "MATH124-B"],
                vec!["CSE142-B", "CSE142-BA", "MATH124-A", "MATH124-AA"],
                vec!["CSE142-B", "CSE142-BA", "MATH124-A", "MATH124-AB"],
                vec!["CSE142-B", "CSE142-BA", "MATH124-B"],
            ]
        );
    }

    #[test]
    fn test_counts_examined_and_rejected() {
        let catalog = busy_catalog();
        let mut search = ConflictFreeSearch::build(&catalog, &requests(&["CSE142", "MATH124"])).unwrap();
        let accepted = search.by_ref().count() as u64;

        // CSE142 has 3 tuples and MATH124 has 3 tuples
        assert_eq!(search.examined(), 9);
        assert_eq!(search.rejected(), 9 - accepted);
    }

    #[test]
    fn test_pinned_lecture_restricts_search() {
        let catalog = busy_catalog();
        let results: Vec<_> = ConflictFreeSearch::build(&catalog, &requests(&["CSE142 B", "MATH124"]))
            .unwrap()
            .collect();

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|c| labels(c)[0] == "CSE142-B"));
    }

    #[test]
    fn test_unknown_course_fails_before_search() {
        let catalog = busy_catalog();
        let err = ConflictFreeSearch::build(&catalog, &requests(&["CSE142", "PHYS121"]))
            .err()
            .unwrap();
        assert!(err.is_lookup_failure());
        assert!(matches!(
            ConflictFreeSearch::new(Vec::new()),
            Err(PlannerError::EmptyRequest)
        ));
    }

    #[test]
    fn test_malformed_time_does_not_abort_search() {
        let catalog = CatalogBuilder::from_rows(vec![
            row("CSE142", SectionKind::Lecture, "A", "MWF", "930-1020"),
            row("CSE142", SectionKind::Lab, "AA", "T", "to be arranged"),
            row("MATH124", SectionKind::Lecture, "A", "T", "930-1020"),
        ])
        .unwrap();

        let results: Vec<_> = ConflictFreeSearch::build(&catalog, &requests(&["CSE142", "MATH124"]))
            .unwrap()
            .collect();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].warnings.len(), 1);
        assert_eq!(results[0].warnings[0].section, "AA");
    }
}
