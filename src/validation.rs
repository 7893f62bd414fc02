//! Stateless checks shared by the course and gradebook mutators.
//!
//! The boolean predicates are the building blocks; [`check_score`] and
//! [`check_name`] turn them into typed errors so the add and edit paths
//! reject input the same way.

use crate::error::{EntityKind, GradebookError, GradebookResult};

/// Upper bound for a single weight or grade, and for a course's total weight.
pub const MAX_SCORE: u32 = 100;

/// Returns `true` if `n` lies in `0..=100`.
pub fn is_in_range_0_100(n: i64) -> bool {
    (0..=MAX_SCORE as i64).contains(&n)
}

/// Returns `true` if `s` has at least one non-whitespace character.
pub fn is_nonempty_text(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Returns `true` if `s` holds no line breaks or other control characters.
pub fn is_single_line_text(s: &str) -> bool {
    !s.chars().any(char::is_control)
}

/// Returns `true` if adding `new_weight` on top of `existing_total` goes past 100.
pub fn would_exceed_capacity(existing_total: u32, new_weight: u32) -> bool {
    existing_total.saturating_add(new_weight) > MAX_SCORE
}

/// Canonical identity key for a course or assignment name.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validates a weight or grade and narrows it to the stored type.
pub fn check_score(field: &'static str, value: u32) -> GradebookResult<u8> {
    if !is_in_range_0_100(value as i64) {
        return Err(GradebookError::OutOfRange {
            field,
            value: value as i64,
        });
    }
    // Range-checked above, always fits.
    Ok(value as u8)
}

/// Validates a display name and returns it trimmed.
///
/// Names are written one per line by the persistence format, so control
/// characters are rejected along with blank names.
pub fn check_name(kind: EntityKind, name: &str) -> GradebookResult<&str> {
    if !is_nonempty_text(name) {
        return Err(GradebookError::EmptyName { kind });
    }
    let name = name.trim();
    if !is_single_line_text(name) {
        return Err(GradebookError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(name)
}
