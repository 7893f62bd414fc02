use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gradebook::{Course, GradeBook};

#[derive(Debug, Clone, Serialize)]
pub struct CourseReport {
    pub generated_at: DateTime<Utc>,
    pub course: String,
    pub assignments: usize,

    // weight budget
    pub total_weight: u32,
    pub capacity: u32,

    // derived grades
    pub final_grade: f64,
    pub letter_grade: String,
}

impl CourseReport {
    pub fn from_course(course: &Course) -> Self {
        Self::at(course, Utc::now())
    }

    fn at(course: &Course, generated_at: DateTime<Utc>) -> Self {
        CourseReport {
            generated_at,
            course: course.name().to_string(),
            assignments: course.len(),
            total_weight: course.total_weight(),
            capacity: course.capacity(),
            final_grade: course.final_grade(),
            letter_grade: course.letter_grade().to_string(),
        }
    }
}

/// Snapshot of every course in a gradebook, all stamped with the same time.
#[derive(Debug, Clone, Serialize)]
pub struct GradeBookReport {
    pub generated_at: DateTime<Utc>,
    pub courses: Vec<CourseReport>,
}

impl GradeBookReport {
    pub fn from_gradebook(book: &GradeBook) -> Self {
        let now = Utc::now();
        GradeBookReport {
            generated_at: now,
            courses: book.courses().map(|c| CourseReport::at(c, now)).collect(),
        }
    }
}
