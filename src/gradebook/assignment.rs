use serde::Serialize;
use std::fmt;

/// A named, weighted, graded unit within a course.
///
/// Plain data: range checks happen in [`Course`](super::Course) before one of
/// these is built or changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub(crate) name: String,
    pub(crate) weight: u8,
    pub(crate) grade: u8,
}

impl Assignment {
    pub fn new(name: impl Into<String>, weight: u8, grade: u8) -> Self {
        Self {
            name: name.into(),
            weight,
            grade,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> u8 {
        self.weight
    }

    pub fn grade(&self) -> u8 {
        self.grade
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Assignment Name: {}\nWeight: {}\nGrade: {}",
            self.name, self.weight, self.grade
        )
    }
}
