//! In-memory gradebook model.
//!
//! A [`GradeBook`] owns its [`Course`]s, and each course owns its
//! [`Assignment`]s. Both levels key entries by lower-cased name while keeping
//! the original spelling for display.

mod assignment;
mod book;
mod course;
pub mod grade;

pub use assignment::Assignment;
pub use book::GradeBook;
pub use course::{AssignmentEdit, Course};
