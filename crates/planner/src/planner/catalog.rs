//! In-memory course catalog, keyed by course and lecture label.
//!
//! A [`Catalog`] is built once, either from an organized schedule document or by
//! folding flat section rows through [`CatalogBuilder`], and is read-only after
//! that. It can be shared freely between planning sessions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::error::{PlannerError, Result};
use super::types::{lecture_label, LectureGroup, Meeting, RequestedCourse, Section, SectionKind};

/// All lectures of one course, keyed by label (`"Lecture A"`).
pub type CourseOffering = BTreeMap<String, LectureGroup>;

/// The organized schedule for one term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    courses: BTreeMap<String, CourseOffering>,
}

impl Catalog {
    /// Wraps an organized schedule after checking every section's meetings are
    /// index-aligned.
    pub fn from_organized(courses: BTreeMap<String, CourseOffering>) -> Result<Self> {
        for (course, offering) in &courses {
            for (label, group) in offering {
                group.validate().map_err(|e| match e {
                    PlannerError::InvalidRecord { message } => PlannerError::InvalidRecord {
                        message: format!("{course} {label}: {message}"),
                    },
                    other => other,
                })?;
            }
        }

        Ok(Self { courses })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let courses: BTreeMap<String, CourseOffering> = serde_json::from_str(json)?;
        Self::from_organized(courses)
    }

    /// Loads an organized schedule JSON document.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;

        info!(
            "Loaded catalog with {} courses from {}",
            catalog.len(),
            path.display()
        );

        Ok(catalog)
    }

    /// Serializes the organized schedule. Keys come out sorted.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn contains(&self, course: &str) -> bool {
        self.courses.contains_key(course)
    }

    pub fn offering(&self, course: &str) -> Result<&CourseOffering> {
        self.courses
            .get(course)
            .ok_or_else(|| PlannerError::UnknownCourse {
                course: course.to_string(),
            })
    }

    /// Looks up one lecture group by its label, e.g. `"Lecture B"`.
    pub fn lecture_group(&self, course: &str, label: &str) -> Result<&LectureGroup> {
        self.offering(course)?
            .get(label)
            .ok_or_else(|| PlannerError::UnknownLecture {
                course: course.to_string(),
                lecture: label.to_string(),
            })
    }

    /// All lecture groups of a course, in label order.
    pub fn all_lectures(&self, course: &str) -> Result<Vec<&LectureGroup>> {
        Ok(self.offering(course)?.values().collect())
    }

    /// The lecture groups a request covers: the pinned one, or all of them.
    pub fn groups_for(&self, request: &RequestedCourse) -> Result<Vec<&LectureGroup>> {
        match request.lecture_label() {
            Some(label) => Ok(vec![self.lecture_group(&request.course, &label)?]),
            None => self.all_lectures(&request.course),
        }
    }

    /// Resolves user input to a request that exists in this catalog.
    ///
    /// Accepts `"CSE 142"`, `"CSE 142 B"` and the compact `"CSE142B"`, where a
    /// trailing letter is read as a lecture only if the whole string is not
    /// itself a course.
    pub fn check_course(&self, raw: &str) -> Result<RequestedCourse> {
        let parsed = RequestedCourse::parse(raw);

        if parsed.lecture.is_none() && !self.contains(&parsed.course) {
            let course = &parsed.course;
            if let Some(last) = course.chars().last().filter(char::is_ascii_alphabetic) {
                let stem = &course[..course.len() - last.len_utf8()];
                if self.contains(stem) {
                    let pinned = RequestedCourse::pinned(stem, last.to_string());
                    self.groups_for(&pinned)?;
                    return Ok(pinned);
                }
            }
        }

        self.groups_for(&parsed)?;
        Ok(parsed)
    }

    pub fn courses(&self) -> impl Iterator<Item = (&str, &CourseOffering)> {
        self.courses.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One meeting occurrence of one section, as produced by a time schedule
/// scraper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRow {
    #[serde(alias = "Course Name")]
    pub course: String,

    #[serde(rename = "type", alias = "Type")]
    pub kind: SectionKind,

    #[serde(alias = "Section")]
    pub identifier: String,

    /// Lecture this row belongs to. Rows without one attach to the most recent
    /// lecture of the same course.
    #[serde(default)]
    pub lecture: Option<String>,

    #[serde(flatten)]
    pub meeting: Meeting,
}

/// Folds a flat stream of section rows into a [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    courses: BTreeMap<String, CourseOffering>,
    current_lecture: HashMap<String, String>,
    skipped: usize,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one row. Rows without a building or room are skipped.
    pub fn push(mut self, row: SectionRow) -> Result<Self> {
        if row.meeting.building.trim().is_empty() || row.meeting.room.trim().is_empty() {
            debug!(
                "Skipping {} {} {}: no location",
                row.course, row.identifier, row.meeting.time
            );
            self.skipped += 1;
            return Ok(self);
        }

        let mut section = Section::new(row.kind, row.identifier);
        section.push_meeting(row.meeting);

        let offering = self.courses.entry(row.course.clone()).or_default();

        if section.kind == SectionKind::Lecture {
            let label = lecture_label(&section.identifier);
            match offering.get_mut(&label) {
                Some(group) => group.add_section(section),
                None => {
                    offering.insert(label.clone(), LectureGroup::new(section));
                }
            }
            self.current_lecture.insert(row.course, label);
            return Ok(self);
        }

        let label = match row.lecture {
            Some(lecture) => lecture_label(&lecture),
            None => self
                .current_lecture
                .get(&row.course)
                .cloned()
                .ok_or_else(|| PlannerError::OrphanSection {
                    course: row.course.clone(),
                    section: section.identifier.clone(),
                })?,
        };

        let group = offering
            .get_mut(&label)
            .ok_or_else(|| PlannerError::OrphanSection {
                course: row.course.clone(),
                section: section.identifier.clone(),
            })?;
        group.add_section(section);

        Ok(self)
    }

    pub fn build(self) -> Catalog {
        if self.skipped > 0 {
            info!("Skipped {} rows without a location", self.skipped);
        }

        let courses = self
            .courses
            .into_iter()
            .filter(|(_, offering)| !offering.is_empty())
            .collect();

        Catalog { courses }
    }

    /// Builds a catalog from rows in the order given.
    pub fn from_rows<I>(rows: I) -> Result<Catalog>
    where
        I: IntoIterator<Item = SectionRow>,
    {
        rows.into_iter()
            .try_fold(Self::new(), |builder, row| builder.push(row))
            .map(Self::build)
    }

    /// Reads a JSON array of rows and folds it.
    pub fn load_rows_json(path: &Path) -> Result<Catalog> {
        let content = fs::read_to_string(path)?;
        let rows: Vec<SectionRow> = serde_json::from_str(&content)?;
        info!("Read {} section rows from {}", rows.len(), path.display());
        Self::from_rows(rows)
    }
}
