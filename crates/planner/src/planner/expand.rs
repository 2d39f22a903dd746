/// Expansion of one requested course into every legal section tuple
use itertools::Itertools;
use std::sync::Arc;

use super::catalog::Catalog;
use super::error::Result;
use super::overlap::{slots_for, Slot};
use super::types::{LectureGroup, RequestedCourse, Section, SectionKind, SectionTuple};

impl SectionTuple {
    /// Builds a tuple and pre-computes its per-day meeting slots.
    pub fn new(course: impl Into<String>, sections: Vec<Section>) -> Self {
        let slots = sections.iter().flat_map(slots_for).collect();
        Self {
            course: course.into(),
            sections,
            slots,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

/// Every `(lecture, quiz?, lab?, studio?)` combination for one lecture group.
///
/// The lecture is always present. Each secondary kind that the group offers
/// contributes exactly one section; kinds with no sections are left out.
pub fn expand_group(course: &str, group: &LectureGroup) -> Vec<SectionTuple> {
    let mut choice_sets: Vec<&[Section]> = vec![std::slice::from_ref(&group.lecture)];
    choice_sets.extend(
        SectionKind::SECONDARY
            .iter()
            .map(|&kind| group.sections(kind))
            .filter(|sections| !sections.is_empty()),
    );

    choice_sets
        .into_iter()
        .map(|set| set.iter())
        .multi_cartesian_product()
        .map(|picked| SectionTuple::new(course, picked.into_iter().cloned().collect()))
        .collect()
}

/// All tuples for a request, lecture groups concatenated in label order.
pub fn expand_course(catalog: &Catalog, request: &RequestedCourse) -> Result<Vec<Arc<SectionTuple>>> {
    let groups = catalog.groups_for(request)?;

    Ok(groups
        .into_iter()
        .flat_map(|group| expand_group(&request.course, group))
        .map(Arc::new)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::catalog::{CatalogBuilder, SectionRow};
    use crate::planner::types::Meeting;

    fn row(kind: SectionKind, id: &str) -> SectionRow {
        SectionRow {
            course: "CHEM142".to_string(),
            kind,
            identifier: id.to_string(),
            lecture: None,
            meeting: Meeting {
                days: "M".to_string(),
                time: "1130-1220".to_string(),
                building: "BAG".to_string(),
                room: "131".to_string(),
                seats: "0/20".to_string(),
            },
        }
    }

    fn ids(tuple: &SectionTuple) -> Vec<&str> {
        tuple.sections.iter().map(|s| s.identifier.as_str()).collect()
    }

    #[test]
    fn test_lecture_only_course_yields_one_tuple_per_lecture() {
        let catalog = CatalogBuilder::from_rows(vec![
            row(SectionKind::Lecture, "A"),
            row(SectionKind::Lecture, "B"),
            row(SectionKind::Lecture, "C"),
        ])
        .unwrap();

        let tuples = expand_course(&catalog, &RequestedCourse::any("CHEM142")).unwrap();
        assert_eq!(tuples.len(), 3);
        assert!(tuples.iter().all(|t| t.sections.len() == 1));

        let pinned = expand_course(&catalog, &RequestedCourse::pinned("CHEM142", "B")).unwrap();
        assert_eq!(pinned.len(), 1);
        assert_eq!(ids(&pinned[0]), vec!["B"]);
    }

    #[test]
    fn test_quiz_and_lab_product() {
        let catalog = CatalogBuilder::from_rows(vec![
            row(SectionKind::Lecture, "A"),
            row(SectionKind::Quiz, "AA"),
            row(SectionKind::Quiz, "AB"),
            row(SectionKind::Lab, "AC"),
            row(SectionKind::Lab, "AD"),
            row(SectionKind::Lab, "AE"),
            row(SectionKind::Lecture, "B"),
            row(SectionKind::Studio, "BA"),
        ])
        .unwrap();

        let tuples = expand_course(&catalog, &RequestedCourse::any("CHEM142")).unwrap();
        // 1 x 2 quizzes x 3 labs for A, then 1 x 1 studio for B
        assert_eq!(tuples.len(), 7);
        assert_eq!(ids(&tuples[0]), vec!["A", "AA", "AC"]);
        assert_eq!(ids(&tuples[1]), vec!["A", "AA", "AD"]);
        assert_eq!(ids(&tuples[3]), vec!["A", "AB", "AC"]);
        assert_eq!(ids(&tuples[6]), vec!["B", "BA"]);

        let t = &tuples[0];
        assert_eq!(t.lecture().unwrap().identifier, "A");
        assert!(t.section(SectionKind::Studio).is_none());
        assert_eq!(t.slots().len(), 3);
    }

    #[test]
    fn test_unknown_request_fails() {
        let catalog = CatalogBuilder::from_rows(vec![row(SectionKind::Lecture, "A")]).unwrap();
        assert!(expand_course(&catalog, &RequestedCourse::any("CHEM999")).is_err());
        assert!(expand_course(&catalog, &RequestedCourse::pinned("CHEM142", "Q")).is_err());
    }
}
