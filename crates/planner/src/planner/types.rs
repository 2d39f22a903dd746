/// Types for course sections, lecture groups and schedule candidates
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use super::error::{PlannerError, Result};
use super::overlap::Slot;

/// Kind of meeting a section represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    #[serde(rename = "LECT", alias = "LECTURE")]
    Lecture,
    #[serde(rename = "QZ", alias = "QUIZ")]
    Quiz,
    #[serde(rename = "LB", alias = "LAB")]
    Lab,
    #[serde(rename = "ST", alias = "STUDIO")]
    Studio,
}

impl SectionKind {
    /// Non-lecture kinds, in the order their choice sets are expanded.
    pub const SECONDARY: [SectionKind; 3] =
        [SectionKind::Quiz, SectionKind::Lab, SectionKind::Studio];

    /// Short code used by the time schedule (`LECT`, `QZ`, `LB`, `ST`).
    pub fn code(self) -> &'static str {
        match self {
            SectionKind::Lecture => "LECT",
            SectionKind::Quiz => "QZ",
            SectionKind::Lab => "LB",
            SectionKind::Studio => "ST",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "LECT" | "LECTURE" => Some(SectionKind::Lecture),
            "QZ" | "QUIZ" => Some(SectionKind::Quiz),
            "LB" | "LAB" => Some(SectionKind::Lab),
            "ST" | "STUDIO" => Some(SectionKind::Studio),
            _ => None,
        }
    }
}

/// One scheduled section. `days`, `times`, `buildings`, `rooms` and `seats` are
/// index-aligned; entry `i` of each describes one meeting pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "Type", alias = "type")]
    pub kind: SectionKind,

    #[serde(rename = "Section", alias = "identifier")]
    pub identifier: String,

    #[serde(rename = "Days", alias = "days", default, deserialize_with = "text_list")]
    pub days: Vec<String>,

    #[serde(rename = "Time", alias = "times", default, deserialize_with = "text_list")]
    pub times: Vec<String>,

    #[serde(rename = "Building", alias = "buildings", default, deserialize_with = "text_list")]
    pub buildings: Vec<String>,

    #[serde(rename = "Room Number", alias = "rooms", default, deserialize_with = "text_list")]
    pub rooms: Vec<String>,

    #[serde(rename = "Seats", alias = "seats", default, deserialize_with = "text_list")]
    pub seats: Vec<String>,
}

impl Section {
    /// Creates a section with no meetings yet.
    pub fn new(kind: SectionKind, identifier: impl Into<String>) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            days: Vec::new(),
            times: Vec::new(),
            buildings: Vec::new(),
            rooms: Vec::new(),
            seats: Vec::new(),
        }
    }

    /// Appends one meeting occurrence to every index-aligned sequence.
    pub fn push_meeting(&mut self, meeting: Meeting) {
        self.days.push(meeting.days);
        self.times.push(meeting.time);
        self.buildings.push(meeting.building);
        self.rooms.push(meeting.room);
        self.seats.push(meeting.seats);
    }

    /// Appends all meetings of `other` to this section.
    pub fn merge(&mut self, other: Section) {
        self.days.extend(other.days);
        self.times.extend(other.times);
        self.buildings.extend(other.buildings);
        self.rooms.extend(other.rooms);
        self.seats.extend(other.seats);
    }

    pub fn meeting_count(&self) -> usize {
        self.days.len()
    }

    /// Checks that every index-aligned sequence has the same length.
    pub fn validate(&self) -> Result<()> {
        let n = self.days.len();
        let aligned = [
            self.times.len(),
            self.buildings.len(),
            self.rooms.len(),
            self.seats.len(),
        ]
        .iter()
        .all(|&len| len == n);

        if aligned {
            Ok(())
        } else {
            Err(PlannerError::InvalidRecord {
                message: format!(
                    "section {} has misaligned meetings (days={}, times={}, buildings={}, rooms={}, seats={})",
                    self.identifier,
                    n,
                    self.times.len(),
                    self.buildings.len(),
                    self.rooms.len(),
                    self.seats.len()
                ),
            })
        }
    }

    /// Iterates `(days, time)` pairs for overlap checks.
    pub fn day_times(&self) -> impl Iterator<Item = (&str, &str)> {
        self.days
            .iter()
            .zip(&self.times)
            .map(|(d, t)| (d.as_str(), t.as_str()))
    }
}

/// Accepts list entries written either as strings or as bare numbers, since
/// room numbers and seat counts come through both ways.
fn text_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect())
}

/// A single meeting occurrence, as delivered by a flat catalog row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(alias = "Days")]
    pub days: String,
    #[serde(alias = "Time")]
    pub time: String,
    #[serde(alias = "Building", default)]
    pub building: String,
    #[serde(alias = "Room Number", default)]
    pub room: String,
    #[serde(alias = "Seats", default)]
    pub seats: String,
}

/// A lecture and the quiz, lab and studio sections that go with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureGroup {
    #[serde(rename = "LECT", alias = "lecture")]
    pub lecture: Section,

    #[serde(rename = "QZ", alias = "quiz", default)]
    pub quizzes: Vec<Section>,

    #[serde(rename = "LB", alias = "lab", default)]
    pub labs: Vec<Section>,

    #[serde(rename = "ST", alias = "studio", default)]
    pub studios: Vec<Section>,
}

impl LectureGroup {
    pub fn new(lecture: Section) -> Self {
        Self {
            lecture,
            quizzes: Vec::new(),
            labs: Vec::new(),
            studios: Vec::new(),
        }
    }

    /// Returns the sections of one secondary kind.
    pub fn sections(&self, kind: SectionKind) -> &[Section] {
        match kind {
            SectionKind::Lecture => std::slice::from_ref(&self.lecture),
            SectionKind::Quiz => &self.quizzes,
            SectionKind::Lab => &self.labs,
            SectionKind::Studio => &self.studios,
        }
    }

    /// Adds a secondary section. A section whose identifier is already present
    /// is merged into the existing one instead of being duplicated.
    pub fn add_section(&mut self, section: Section) {
        let bucket = match section.kind {
            SectionKind::Lecture => {
                self.lecture.merge(section);
                return;
            }
            SectionKind::Quiz => &mut self.quizzes,
            SectionKind::Lab => &mut self.labs,
            SectionKind::Studio => &mut self.studios,
        };

        match bucket
            .iter_mut()
            .find(|s| s.identifier == section.identifier)
        {
            Some(existing) => existing.merge(section),
            None => bucket.push(section),
        }
    }

    /// Checks every section's meetings are aligned, every section sits in the
    /// set matching its kind, and identifiers are unique within a set.
    pub fn validate(&self) -> Result<()> {
        for kind in [SectionKind::Lecture].into_iter().chain(SectionKind::SECONDARY) {
            let mut seen = HashSet::new();
            for section in self.sections(kind) {
                section.validate()?;

                if section.kind != kind {
                    return Err(PlannerError::InvalidRecord {
                        message: format!(
                            "section {} is {} but listed under {}",
                            section.identifier,
                            section.kind.code(),
                            kind.code()
                        ),
                    });
                }
                if !seen.insert(section.identifier.as_str()) {
                    return Err(PlannerError::InvalidRecord {
                        message: format!(
                            "section {} appears twice under {}",
                            section.identifier,
                            kind.code()
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

static LECTURE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,2}\d?$").unwrap());

/// A course to plan, optionally pinned to one lecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestedCourse {
    pub course: String,
    /// Lecture letter, e.g. `"B"` for `"Lecture B"`
    pub lecture: Option<String>,
}

impl RequestedCourse {
    pub fn any(course: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            lecture: None,
        }
    }

    pub fn pinned(course: impl Into<String>, lecture: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            lecture: Some(lecture.into()),
        }
    }

    /// Parses user input such as `"CSE 142"` or `"cse 142 b"`.
    ///
    /// A trailing whitespace-separated token that looks like a lecture letter
    /// pins the lecture; the remaining tokens are joined without spaces to form
    /// the course id. Compact forms like `"CSE142B"` are resolved against the
    /// catalog by [`Catalog::check_course`](super::catalog::Catalog::check_course).
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        let tokens: Vec<&str> = upper.split_whitespace().collect();

        match tokens.split_last() {
            Some((last, rest)) if !rest.is_empty() && LECTURE_TOKEN.is_match(last) => {
                Self::pinned(rest.concat(), *last)
            }
            _ => Self::any(tokens.concat()),
        }
    }

    /// Catalog key of the pinned lecture, e.g. `"Lecture B"`.
    pub fn lecture_label(&self) -> Option<String> {
        self.lecture.as_deref().map(lecture_label)
    }
}

impl std::fmt::Display for RequestedCourse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.lecture {
            Some(lecture) => write!(f, "{} {}", self.course, lecture),
            None => f.write_str(&self.course),
        }
    }
}

/// Formats the catalog key for a lecture identifier.
pub fn lecture_label(identifier: &str) -> String {
    format!("Lecture {identifier}")
}

/// One selection for a course: a lecture plus at most one section of each
/// secondary kind that the lecture offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionTuple {
    pub course: String,
    pub sections: Vec<Section>,
    #[serde(skip)]
    pub(crate) slots: Vec<Slot>,
}

impl SectionTuple {
    pub fn lecture(&self) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.kind == SectionKind::Lecture)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// A data-quality problem found while checking a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataWarning {
    pub course: String,
    pub section: String,
    pub token: String,
    pub message: String,
}

/// One tuple per requested course, in request order, with no time conflicts.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleCandidate {
    pub tuples: Vec<Arc<SectionTuple>>,
    /// Meetings left out of the overlap check because their time was unreadable
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataWarning>,
}

impl ScheduleCandidate {
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.tuples
            .iter()
            .flat_map(|t| t.sections.iter().map(move |s| (t.course.as_str(), s)))
    }
}
