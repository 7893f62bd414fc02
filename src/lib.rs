pub mod config;
pub mod error;
pub mod gradebook;
pub mod output;
pub mod persistence;
pub mod report;
pub mod shell;
pub mod validation;

pub use error::{EntityKind, GradebookError, GradebookResult};
pub use gradebook::{Assignment, AssignmentEdit, Course, GradeBook};
