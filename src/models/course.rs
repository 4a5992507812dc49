// src/models/course.rs

//! Catalog entry and course record structures.

use serde::{Deserialize, Serialize};

/// How a top-level listing entry continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Expands into a nested sub-listing of courses.
    Module,
    /// Links directly to a course detail page.
    Course,
}

/// A single anchor of a catalog listing, before any detail fetch.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Display name as rendered.
    pub name: String,

    /// Absolute address of the module sub-listing or course detail page.
    pub address: String,

    /// Module or course, decided structurally from the link target.
    pub kind: EntryKind,

    /// Row data, when the row exposed enough structured cells.
    pub summary: Option<CourseSummary>,
}

/// Course fields carried by a listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSummary {
    /// Semester value as rendered (scalar or pre-formatted text).
    pub semester_raw: String,

    /// Course name as rendered.
    pub name: String,

    /// Compact weekly layout label built from the four hour columns.
    pub schedule: String,

    /// Total hours, as rendered.
    pub total_hours: String,

    /// ECTS credits, as rendered.
    pub credits: String,

    /// Whether the course ends with an exam.
    pub has_exam: bool,

    /// Whether the course is a mandatory module.
    pub mandatory: bool,
}

/// Course fields collected from a detail page.
///
/// Every field degrades independently to an empty string when its source
/// structure is absent on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDetail {
    pub department: String,
    pub coordinators: String,
    pub assistants: String,
    pub syllabus: String,
    pub workload: String,
    pub grading: String,
}

/// A fully assembled course record, keyed by canonical name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseRecord {
    /// Canonical name: own name, or `"<module> - <course>"` when reached
    /// through a module.
    pub name: String,

    /// Normalized semester value (scalar or `"s - e"` range).
    pub semester: String,

    pub schedule: String,
    pub total_hours: String,
    pub credits: String,
    pub has_exam: bool,
    pub mandatory: bool,

    pub department: String,
    pub coordinators: String,
    pub assistants: String,
    pub syllabus: String,
    pub workload: String,
    pub grading: String,
}

impl CourseRecord {
    /// Fixed output column order.
    pub const COLUMNS: [&'static str; 13] = [
        "Semestr",
        "Przedmiot",
        "Układ zajęć",
        "Suma godzin",
        "Punkty ECTS",
        "Egzamin",
        "Obligatoryjny",
        "Katedra",
        "Koordynatorzy",
        "Asystenci",
        "Treści kształcenia",
        "Nakład pracy",
        "Wystawianie ocen",
    ];

    /// Merge row summary and detail-page fields into one record.
    pub fn assemble(
        canonical_name: impl Into<String>,
        semester: String,
        summary: &CourseSummary,
        detail: CourseDetail,
    ) -> Self {
        Self {
            name: canonical_name.into(),
            semester,
            schedule: summary.schedule.clone(),
            total_hours: summary.total_hours.clone(),
            credits: summary.credits.clone(),
            has_exam: summary.has_exam,
            mandatory: summary.mandatory,
            department: detail.department,
            coordinators: detail.coordinators,
            assistants: detail.assistants,
            syllabus: detail.syllabus,
            workload: detail.workload,
            grading: detail.grading,
        }
    }

    /// Leading integer token of the semester value, used as partition key.
    ///
    /// For a range `"5 - 6"` this is the start `5`; for a scalar `"4"` the
    /// scalar itself; `None` when the value does not begin with an integer.
    pub fn semester_key(&self) -> Option<u32> {
        self.semester.split_whitespace().next()?.parse().ok()
    }

    /// Serialize into one output row, columns per [`Self::COLUMNS`].
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.semester.clone(),
            self.name.clone(),
            self.schedule.clone(),
            self.total_hours.clone(),
            self.credits.clone(),
            self.has_exam.to_string(),
            self.mandatory.to_string(),
            self.department.clone(),
            self.coordinators.clone(),
            self.assistants.clone(),
            self.syllabus.clone(),
            self.workload.clone(),
            self.grading.clone(),
        ]
    }
}
