use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::course::Course;
use crate::error::{EntityKind, GradebookError, GradebookResult};
use crate::validation::{check_name, normalize_key};

/// The top-level collection of courses, keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GradeBook {
    courses: IndexMap<String, Course>,
}

impl GradeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Courses in insertion order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Course display names in insertion order.
    pub fn list_courses(&self) -> impl Iterator<Item = &str> {
        self.courses.values().map(Course::name)
    }

    /// Creates an empty course and returns it for further setup.
    pub fn add_course(&mut self, name: &str) -> GradebookResult<&mut Course> {
        let name = check_name(EntityKind::Course, name)?;
        let key = normalize_key(name);
        if self.courses.contains_key(&key) {
            return Err(GradebookError::DuplicateKey {
                kind: EntityKind::Course,
                name: name.to_string(),
            });
        }

        debug!(course = name, "Adding course");
        let entry = self.courses.entry(key).or_insert_with(|| Course::new(name));
        Ok(entry)
    }

    /// Removes and returns the named course with all of its assignments.
    pub fn remove_course(&mut self, name: &str) -> GradebookResult<Course> {
        let removed = self
            .courses
            .shift_remove(&normalize_key(name))
            .ok_or_else(|| not_found(name))?;
        debug!(course = %removed.name(), "Removed course");
        Ok(removed)
    }

    /// Renames a course in place; assignments and listing position are kept.
    pub fn rename_course(&mut self, name: &str, new_name: &str) -> GradebookResult<()> {
        let key = normalize_key(name);
        let Some(index) = self.courses.get_index_of(&key) else {
            return Err(not_found(name));
        };
        let new_name = check_name(EntityKind::Course, new_name)?;
        let new_key = normalize_key(new_name);
        if new_key != key && self.courses.contains_key(&new_key) {
            return Err(GradebookError::DuplicateKey {
                kind: EntityKind::Course,
                name: new_name.to_string(),
            });
        }

        debug!(from = name, to = new_name, "Renaming course");
        if let Some((_, mut course)) = self.courses.shift_remove_index(index) {
            course.name = new_name.to_string();
            self.courses.shift_insert(index, new_key, course);
        }
        Ok(())
    }

    pub fn get_course(&self, name: &str) -> GradebookResult<&Course> {
        self.courses
            .get(&normalize_key(name))
            .ok_or_else(|| not_found(name))
    }

    /// Mutable access for delegating assignment operations to a course.
    pub fn get_course_mut(&mut self, name: &str) -> GradebookResult<&mut Course> {
        self.courses
            .get_mut(&normalize_key(name))
            .ok_or_else(|| not_found(name))
    }

    /// Persistence key of each course alongside the course itself.
    pub(crate) fn keyed_courses(&self) -> impl Iterator<Item = (&str, &Course)> {
        self.courses.iter().map(|(k, c)| (k.as_str(), c))
    }
}

fn not_found(name: &str) -> GradebookError {
    GradebookError::NotFound {
        kind: EntityKind::Course,
        name: name.trim().to_string(),
    }
}
