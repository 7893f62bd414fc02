use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::assignment::Assignment;
use super::grade::letter_grade;
use crate::error::{EntityKind, GradebookError, GradebookResult};
use crate::validation::{MAX_SCORE, check_name, check_score, normalize_key, would_exceed_capacity};

/// One edit applied by [`Course::edit_assignment`].
///
/// Renaming and regrading are separate modes; a single call never does both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentEdit {
    /// Change the display name and re-key, keeping weight and grade.
    Rename { new_name: String },
    /// Replace weight and grade together.
    Regrade { weight: u32, grade: u32 },
}

impl AssignmentEdit {
    /// Builds an edit from optional parts, as collected by a CLI.
    ///
    /// # Errors
    ///
    /// Returns [`GradebookError::InvalidEdit`] unless exactly one mode is
    /// selected: a new name alone, or a weight and a grade together.
    pub fn from_parts(
        new_name: Option<String>,
        new_weight: Option<u32>,
        new_grade: Option<u32>,
    ) -> GradebookResult<Self> {
        match (new_name, new_weight, new_grade) {
            (Some(new_name), None, None) => Ok(AssignmentEdit::Rename { new_name }),
            (None, Some(weight), Some(grade)) => Ok(AssignmentEdit::Regrade { weight, grade }),
            (None, None, None) => Err(GradebookError::InvalidEdit(
                "nothing to change: give a new name, or a weight and a grade".into(),
            )),
            (Some(_), _, _) => Err(GradebookError::InvalidEdit(
                "rename and weight/grade changes cannot be combined".into(),
            )),
            (None, _, _) => Err(GradebookError::InvalidEdit(
                "weight and grade must be changed together".into(),
            )),
        }
    }
}

/// A named collection of assignments sharing a weight budget of 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Course {
    pub(crate) name: String,
    assignments: IndexMap<String, Assignment>,
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assignments: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Looks up an assignment by name, ignoring case.
    pub fn assignment(&self, name: &str) -> GradebookResult<&Assignment> {
        self.assignments
            .get(&normalize_key(name))
            .ok_or_else(|| not_found(name))
    }

    /// Assignments in insertion order.
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    /// Assignment display names in insertion order.
    pub fn list_assignments(&self) -> impl Iterator<Item = &str> {
        self.assignments.values().map(Assignment::name)
    }

    pub fn total_weight(&self) -> u32 {
        self.assignments.values().map(|a| u32::from(a.weight)).sum()
    }

    /// Weight still available before the course reaches 100.
    pub fn capacity(&self) -> u32 {
        MAX_SCORE.saturating_sub(self.total_weight())
    }

    /// Adds a new assignment.
    ///
    /// # Errors
    ///
    /// - [`GradebookError::EmptyName`] / [`GradebookError::OutOfRange`] for invalid input
    /// - [`GradebookError::DuplicateKey`] if the name is taken (ignoring case)
    /// - [`GradebookError::CapacityExceeded`] if the total weight would pass 100
    pub fn add_assignment(&mut self, name: &str, weight: u32, grade: u32) -> GradebookResult<()> {
        let name = check_name(EntityKind::Assignment, name)?;
        let weight = check_score("weight", weight)?;
        let grade = check_score("grade", grade)?;

        let key = normalize_key(name);
        if self.assignments.contains_key(&key) {
            return Err(GradebookError::DuplicateKey {
                kind: EntityKind::Assignment,
                name: name.to_string(),
            });
        }
        self.ensure_capacity(self.total_weight(), weight)?;

        debug!(course = %self.name, assignment = name, weight, grade, "Adding assignment");
        self.assignments
            .insert(key, Assignment::new(name, weight, grade));
        Ok(())
    }

    /// Applies one [`AssignmentEdit`] to the named assignment.
    ///
    /// A rename keeps the assignment's position in the listing. A regrade
    /// checks capacity against the other assignments only, so shrinking or
    /// keeping an assignment's own weight always passes.
    pub fn edit_assignment(&mut self, name: &str, edit: AssignmentEdit) -> GradebookResult<()> {
        let key = normalize_key(name);
        let Some(index) = self.assignments.get_index_of(&key) else {
            return Err(not_found(name));
        };

        match edit {
            AssignmentEdit::Rename { new_name } => {
                let new_name = check_name(EntityKind::Assignment, &new_name)?;
                let new_key = normalize_key(new_name);
                if new_key != key && self.assignments.contains_key(&new_key) {
                    return Err(GradebookError::DuplicateKey {
                        kind: EntityKind::Assignment,
                        name: new_name.to_string(),
                    });
                }

                debug!(course = %self.name, from = name, to = new_name, "Renaming assignment");
                if let Some((_, mut assignment)) = self.assignments.shift_remove_index(index) {
                    assignment.name = new_name.to_string();
                    self.assignments.shift_insert(index, new_key, assignment);
                }
            }
            AssignmentEdit::Regrade { weight, grade } => {
                let weight = check_score("weight", weight)?;
                let grade = check_score("grade", grade)?;
                let others = self.total_weight() - u32::from(self.assignments[index].weight);
                self.ensure_capacity(others, weight)?;

                debug!(course = %self.name, assignment = name, weight, grade, "Regrading assignment");
                let assignment = &mut self.assignments[index];
                assignment.weight = weight;
                assignment.grade = grade;
            }
        }
        Ok(())
    }

    /// Removes and returns the named assignment.
    pub fn remove_assignment(&mut self, name: &str) -> GradebookResult<Assignment> {
        let removed = self
            .assignments
            .shift_remove(&normalize_key(name))
            .ok_or_else(|| not_found(name))?;
        debug!(course = %self.name, assignment = %removed.name, "Removed assignment");
        Ok(removed)
    }

    /// Σ(weight × grade) / 100 over all assignments; 0.0 when empty.
    ///
    /// Not normalized: a course whose weights sum to 50 tops out at 50.0.
    pub fn final_grade(&self) -> f64 {
        let points: u32 = self
            .assignments
            .values()
            .map(|a| u32::from(a.weight) * u32::from(a.grade))
            .sum();
        f64::from(points) / 100.0
    }

    pub fn letter_grade(&self) -> &'static str {
        letter_grade(self.final_grade())
    }

    fn ensure_capacity(&self, current: u32, requested: u8) -> GradebookResult<()> {
        let requested = u32::from(requested);
        if would_exceed_capacity(current, requested) {
            return Err(GradebookError::CapacityExceeded {
                course: self.name.clone(),
                current,
                requested,
            });
        }
        Ok(())
    }
}

fn not_found(name: &str) -> GradebookError {
    GradebookError::NotFound {
        kind: EntityKind::Assignment,
        name: name.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cs101() -> Course {
        let mut course = Course::new("CS101");
        course.add_assignment("HW1", 40, 90).unwrap();
        course.add_assignment("Exam", 60, 80).unwrap();
        course
    }

    #[test]
    fn test_final_grade_example() {
        let course = cs101();
        assert_eq!(course.final_grade(), 84.0);
        assert_eq!(course.letter_grade(), "B");
    }

    #[test]
    fn test_final_grade_empty_course() {
        let course = Course::new("Empty");
        assert_eq!(course.final_grade(), 0.0);
        assert_eq!(course.letter_grade(), "F");
    }

    #[test]
    fn test_final_grade_is_not_normalized() {
        let mut course = Course::new("Half");
        course.add_assignment("Midterm", 50, 100).unwrap();
        assert_eq!(course.final_grade(), 50.0);
    }

    #[test]
    fn test_add_rejects_capacity_overflow() {
        let mut course = Course::new("CS101");
        course.add_assignment("HW1", 40, 90).unwrap();

        let err = course.add_assignment("HW2", 70, 100).unwrap_err();
        assert!(matches!(
            err,
            GradebookError::CapacityExceeded {
                current: 40,
                requested: 70,
                ..
            }
        ));
        assert_eq!(course.len(), 1);
    }

    #[test]
    fn test_full_course_accepts_only_zero_weight() {
        let mut course = cs101();
        assert_eq!(course.capacity(), 0);
        assert!(course.add_assignment("Extra", 1, 100).is_err());
        course.add_assignment("Attendance", 0, 100).unwrap();
        assert_eq!(course.total_weight(), 100);
    }

    #[test]
    fn test_add_rejects_duplicate_ignoring_case() {
        let mut course = cs101();
        let err = course.add_assignment("hw1", 0, 50).unwrap_err();
        assert!(matches!(
            err,
            GradebookError::DuplicateKey {
                kind: EntityKind::Assignment,
                ..
            }
        ));
    }

    #[test]
    fn test_add_rejects_out_of_range_and_blank() {
        let mut course = Course::new("CS101");
        assert!(matches!(
            course.add_assignment("HW1", 101, 50),
            Err(GradebookError::OutOfRange { field: "weight", .. })
        ));
        assert!(matches!(
            course.add_assignment("HW1", 10, 150),
            Err(GradebookError::OutOfRange { field: "grade", .. })
        ));
        assert!(matches!(
            course.add_assignment("  ", 10, 50),
            Err(GradebookError::EmptyName { .. })
        ));
        assert!(course.is_empty());
    }

    #[test]
    fn test_names_with_control_characters_are_rejected() {
        let mut course = cs101();
        let before = course.clone();

        assert!(matches!(
            course.add_assignment("Q\r1", 10, 90),
            Err(GradebookError::InvalidName { .. })
        ));
        assert!(matches!(
            course.edit_assignment(
                "hw1",
                AssignmentEdit::Rename {
                    new_name: "Math\nII".into(),
                },
            ),
            Err(GradebookError::InvalidName { .. })
        ));
        assert_eq!(course, before);
    }

    #[test]
    fn test_add_then_remove_restores_prior_set() {
        let mut course = cs101();
        let before = course.clone();

        course.add_assignment("Quiz", 0, 70).unwrap();
        let removed = course.remove_assignment("QUIZ").unwrap();

        assert_eq!(removed.name(), "Quiz");
        assert_eq!(course, before);
    }

    #[test]
    fn test_remove_missing() {
        let mut course = cs101();
        assert!(matches!(
            course.remove_assignment("Lab"),
            Err(GradebookError::NotFound { .. })
        ));
    }

    #[test]
    fn test_regrade_excludes_own_weight() {
        let mut course = cs101();
        course
            .edit_assignment("exam", AssignmentEdit::Regrade { weight: 60, grade: 100 })
            .unwrap();
        assert_eq!(course.assignment("Exam").unwrap().grade(), 100);

        let err = course
            .edit_assignment("Exam", AssignmentEdit::Regrade { weight: 61, grade: 100 })
            .unwrap_err();
        assert!(matches!(
            err,
            GradebookError::CapacityExceeded {
                current: 40,
                requested: 61,
                ..
            }
        ));
        assert_eq!(course.assignment("Exam").unwrap().weight(), 60);
    }

    #[test]
    fn test_rename_keeps_scores_and_position() {
        let mut course = cs101();
        course
            .edit_assignment(
                "HW1",
                AssignmentEdit::Rename {
                    new_name: "Homework 1".into(),
                },
            )
            .unwrap();

        let names: Vec<_> = course.list_assignments().collect();
        assert_eq!(names, vec!["Homework 1", "Exam"]);
        let renamed = course.assignment("homework 1").unwrap();
        assert_eq!((renamed.weight(), renamed.grade()), (40, 90));
        assert!(course.assignment("HW1").is_err());
    }

    #[test]
    fn test_rename_changes_case_only() {
        let mut course = cs101();
        course
            .edit_assignment(
                "exam",
                AssignmentEdit::Rename {
                    new_name: "EXAM".into(),
                },
            )
            .unwrap();
        assert_eq!(course.assignment("exam").unwrap().name(), "EXAM");
        assert_eq!(course.len(), 2);
    }

    #[test]
    fn test_rename_rejects_collision() {
        let mut course = cs101();
        let err = course
            .edit_assignment(
                "HW1",
                AssignmentEdit::Rename {
                    new_name: "exam".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, GradebookError::DuplicateKey { .. }));
        assert_eq!(course, cs101());
    }

    #[test]
    fn test_edit_missing_assignment() {
        let mut course = cs101();
        let err = course
            .edit_assignment("Lab", AssignmentEdit::Regrade { weight: 0, grade: 0 })
            .unwrap_err();
        assert!(matches!(err, GradebookError::NotFound { .. }));
    }

    #[test]
    fn test_edit_from_parts() {
        assert_eq!(
            AssignmentEdit::from_parts(Some("Lab".into()), None, None).unwrap(),
            AssignmentEdit::Rename {
                new_name: "Lab".into()
            }
        );
        assert_eq!(
            AssignmentEdit::from_parts(None, Some(10), Some(90)).unwrap(),
            AssignmentEdit::Regrade {
                weight: 10,
                grade: 90
            }
        );
        assert!(AssignmentEdit::from_parts(None, None, None).is_err());
        assert!(AssignmentEdit::from_parts(None, Some(10), None).is_err());
        assert!(AssignmentEdit::from_parts(Some("Lab".into()), Some(10), Some(90)).is_err());
    }

    #[test]
    fn test_final_grade_is_stable_without_mutation() {
        let course = cs101();
        assert_eq!(course.final_grade(), course.final_grade());
    }

    #[test]
    fn test_final_grade_tracks_mutations() {
        let mut course = cs101();
        course.remove_assignment("Exam").unwrap();
        assert_eq!(course.final_grade(), 36.0);
    }
}
