/// Converts a final grade percentage (0.0–100.0) into a letter grade.
///
/// | Range   | Grade |
/// |---------|-------|
/// | >= 93   | A     |
/// | >= 90   | A-    |
/// | >= 87   | B+    |
/// | >= 83   | B     |
/// | >= 80   | B-    |
/// | >= 77   | C+    |
/// | >= 73   | C     |
/// | >= 70   | C-    |
/// | >= 67   | D+    |
/// | >= 63   | D     |
/// | >= 60   | D-    |
/// | < 60    | F     |
pub fn letter_grade(p: f64) -> &'static str {
    match p {
        p if p >= 93.0 => "A",
        p if p >= 90.0 => "A-",
        p if p >= 87.0 => "B+",
        p if p >= 83.0 => "B",
        p if p >= 80.0 => "B-",
        p if p >= 77.0 => "C+",
        p if p >= 73.0 => "C",
        p if p >= 70.0 => "C-",
        p if p >= 67.0 => "D+",
        p if p >= 63.0 => "D",
        p if p >= 60.0 => "D-",
        _ => "F",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_grade_boundaries() {
        assert_eq!(letter_grade(100.0), "A");
        assert_eq!(letter_grade(93.0), "A");
        assert_eq!(letter_grade(92.99), "A-");
        assert_eq!(letter_grade(90.0), "A-");
        assert_eq!(letter_grade(89.5), "B+");
        assert_eq!(letter_grade(87.0), "B+");
        assert_eq!(letter_grade(84.0), "B");
        assert_eq!(letter_grade(83.0), "B");
        assert_eq!(letter_grade(80.0), "B-");
        assert_eq!(letter_grade(77.0), "C+");
        assert_eq!(letter_grade(73.0), "C");
        assert_eq!(letter_grade(70.0), "C-");
        assert_eq!(letter_grade(67.0), "D+");
        assert_eq!(letter_grade(63.0), "D");
        assert_eq!(letter_grade(60.0), "D-");
        assert_eq!(letter_grade(59.99), "F");
        assert_eq!(letter_grade(0.0), "F");
    }
}
