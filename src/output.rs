//! Output formatting and export for gradebook data.
//!
//! Supports plain-text views, JSON serialization, and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::gradebook::{Course, GradeBook};
use crate::report::CourseReport;
use csv::WriterBuilder;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;

pub const RULE: &str = "─────────";

/// Serializes a value as pretty-printed JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Appends a [`CourseReport`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_report(path: &Path, report: &CourseReport) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV report row");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(report)?;
    writer.flush()?;

    Ok(())
}

/// Bullet list of assignment names, or a note when the course has none.
pub fn render_assignment_list(course: &Course) -> String {
    let mut out = format!("Assignments:\n{RULE}\n");
    if course.is_empty() {
        out.push_str("There are currently no assignments in this course.\n");
    }
    for a in course.assignments() {
        let _ = writeln!(out, "• {} (weight {}, grade {})", a.name(), a.weight(), a.grade());
    }
    out
}

/// Full course summary: name, assignments, final and letter grade.
pub fn render_course(course: &Course) -> String {
    format!(
        "Course Name: {}\n{}Total Weight: {}\nFinal Grade: {:.2}\nLetter Grade: {}\n",
        course.name(),
        render_assignment_list(course),
        course.total_weight(),
        course.final_grade(),
        course.letter_grade()
    )
}

/// Bullet list of course names, or a note when the gradebook is empty.
pub fn render_course_list(book: &GradeBook) -> String {
    let mut out = format!("Courses:\n{RULE}\n");
    if book.is_empty() {
        out.push_str("There are currently no courses.\n");
    }
    for name in book.list_courses() {
        let _ = writeln!(out, "• {name}");
    }
    out
}
