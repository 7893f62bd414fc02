//! Interactive menu session over any line reader/writer pair.
//!
//! The shell owns a [`GradeBook`] and turns menu choices into core
//! operations. Core errors are printed and the current menu is shown again;
//! end of input ends the session.

use anyhow::Result;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::EntityKind;
use crate::gradebook::{AssignmentEdit, GradeBook};
use crate::output::{render_assignment_list, render_course, render_course_list};
use crate::persistence::{load_from_path, save_to_path};
use crate::validation::{check_name, is_in_range_0_100, would_exceed_capacity};

const LINE: &str = "\n────────────────────────────────────\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAction {
    AddCourse,
    RemoveCourse,
    ModifyCourse,
    ViewCourse,
    ViewCourses,
    Save,
    Quit,
}

impl MainAction {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "a" | "add" => Some(MainAction::AddCourse),
            "2" | "r" | "remove" => Some(MainAction::RemoveCourse),
            "3" | "m" | "modify" => Some(MainAction::ModifyCourse),
            "4" | "v" | "view" => Some(MainAction::ViewCourse),
            "5" | "c" | "courses" => Some(MainAction::ViewCourses),
            "6" | "s" | "save" => Some(MainAction::Save),
            "7" | "q" | "quit" => Some(MainAction::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CourseAction {
    AddAssignment,
    EditAssignment,
    RemoveAssignment,
    Back,
    Quit,
}

impl CourseAction {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" => Some(CourseAction::AddAssignment),
            "2" => Some(CourseAction::EditAssignment),
            "3" => Some(CourseAction::RemoveAssignment),
            "b" => Some(CourseAction::Back),
            "q" => Some(CourseAction::Quit),
            _ => None,
        }
    }
}

/// Whether the session keeps going after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Shell<R, W> {
    input: R,
    output: W,
    book: GradeBook,
    default_file: PathBuf,
    ask_for_source: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, book: GradeBook, default_file: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            book,
            default_file: default_file.into(),
            ask_for_source: false,
        }
    }

    /// Starts the session by asking whether to read a file or start empty.
    pub fn ask_for_source(mut self) -> Self {
        self.ask_for_source = true;
        self
    }

    pub fn into_book(self) -> GradeBook {
        self.book
    }

    /// Runs the session until the user quits or input ends.
    pub fn run(&mut self) -> Result<()> {
        self.say("Welcome to the Gradebook Calculator!")?;

        let mut flow = if self.ask_for_source {
            self.choose_source()?
        } else {
            Flow::Continue
        };
        while flow == Flow::Continue {
            flow = self.main_menu()?;
        }

        self.say("Thanks for using the Gradebook Calculator!")?;
        Ok(())
    }

    fn choose_source(&mut self) -> Result<Flow> {
        let question = "Would you like to read from an existing file or create a new file? \
                        (Enter 'r' to read, 'c' to create, 'q' to quit): ";
        loop {
            let Some(choice) = self.prompt(question)? else {
                return Ok(Flow::Quit);
            };
            match choice.to_lowercase().as_str() {
                "r" | "read" => return self.read_source(),
                "c" | "create" => {
                    self.book = GradeBook::new();
                    return Ok(Flow::Continue);
                }
                "q" | "quit" => return Ok(Flow::Quit),
                _ => self.say("Invalid input.")?,
            }
        }
    }

    fn read_source(&mut self) -> Result<Flow> {
        loop {
            let Some(file_name) = self.prompt("Enter a filename: ")? else {
                return Ok(Flow::Quit);
            };
            match load_from_path(Path::new(&file_name)) {
                Ok(book) => {
                    self.book = book;
                    return Ok(Flow::Continue);
                }
                Err(e) => {
                    warn!(file = %file_name, error = %e, "Failed to load gradebook");
                    self.say(format!("Error in file: {e}"))?;
                }
            }
        }
    }

    fn main_menu(&mut self) -> Result<Flow> {
        self.say(format!(
            "{LINE}\nMain Menu:\n1. Add a course\n2. Remove a course\n3. Modify a course\n\
             4. View a course\n5. View all courses\nS. Save\nQ. Quit"
        ))?;

        let action = loop {
            let Some(input) = self.prompt("Enter an action: ")? else {
                return Ok(Flow::Quit);
            };
            match MainAction::parse(&input) {
                Some(action) => break action,
                None => self.say("Invalid action.")?,
            }
        };
        debug!(?action, "Main menu action");

        match action {
            MainAction::AddCourse => self.add_course(),
            MainAction::RemoveCourse => self.remove_course(),
            MainAction::ModifyCourse => self.modify_course(),
            MainAction::ViewCourse => self.view_course(),
            MainAction::ViewCourses => {
                let list = render_course_list(&self.book);
                self.say(list.trim_end())?;
                Ok(Flow::Continue)
            }
            MainAction::Save => self.save(),
            MainAction::Quit => Ok(Flow::Quit),
        }
    }

    fn add_course(&mut self) -> Result<Flow> {
        let Some(name) = self.prompt("Enter the name of the course you want to add: ")? else {
            return Ok(Flow::Quit);
        };
        match self.book.add_course(&name).map(|_| ()) {
            Ok(()) => self.say("Course added successfully.")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn remove_course(&mut self) -> Result<Flow> {
        if self.book.is_empty() {
            self.say("No courses to remove.")?;
            return Ok(Flow::Continue);
        }
        let Some(name) = self.prompt("Enter the name of the course you want to remove: ")? else {
            return Ok(Flow::Quit);
        };
        match self.book.remove_course(&name) {
            Ok(_) => self.say("Course removed successfully.")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn view_course(&mut self) -> Result<Flow> {
        let Some(name) = self.prompt("Enter the name of the course you want to view: ")? else {
            return Ok(Flow::Quit);
        };
        match self.book.get_course(&name).map(render_course) {
            Ok(text) => self.say(text.trim_end())?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn save(&mut self) -> Result<Flow> {
        let question = format!("Enter a filename [{}]: ", self.default_file.display());
        let Some(file_name) = self.prompt(&question)? else {
            return Ok(Flow::Quit);
        };
        let path = if file_name.is_empty() {
            self.default_file.clone()
        } else {
            PathBuf::from(file_name)
        };

        self.say("Saving...")?;
        match save_to_path(&self.book, &path) {
            Ok(()) => self.say(format!("Saved to {}.", path.display()))?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn modify_course(&mut self) -> Result<Flow> {
        let Some(name) = self.prompt("Enter the name of the course you want to edit: ")? else {
            return Ok(Flow::Quit);
        };
        if let Err(e) = self.book.get_course(&name) {
            self.report(e)?;
            return Ok(Flow::Continue);
        }

        let question = "Choose what you want to edit: \n1. Course name\n2. Assignments\nEnter your choice: ";
        loop {
            let Some(choice) = self.prompt(question)? else {
                return Ok(Flow::Quit);
            };
            match choice.as_str() {
                "1" => return self.rename_course(&name),
                "2" => return self.course_menu(&name),
                _ => self.say("Invalid choice.")?,
            }
        }
    }

    fn rename_course(&mut self, name: &str) -> Result<Flow> {
        let Some(new_name) = self.prompt("Enter the new name of the course: ")? else {
            return Ok(Flow::Quit);
        };
        match self.book.rename_course(name, &new_name) {
            Ok(()) => self.say("Course edited successfully.")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn course_menu(&mut self, course: &str) -> Result<Flow> {
        loop {
            self.say(format!(
                "{LINE}\nCourse Menu\n1. Add an assignment\n2. Edit an assignment\n\
                 3. Remove an assignment\nB. Back\nQ. Quit"
            ))?;

            let action = loop {
                let Some(input) = self.prompt("Enter an action: ")? else {
                    return Ok(Flow::Quit);
                };
                match CourseAction::parse(&input) {
                    Some(action) => break action,
                    None => self.say("Invalid choice.")?,
                }
            };
            debug!(?action, course, "Course menu action");

            let flow = match action {
                CourseAction::AddAssignment => self.add_assignment(course)?,
                CourseAction::EditAssignment => self.edit_assignment(course)?,
                CourseAction::RemoveAssignment => self.remove_assignment(course)?,
                CourseAction::Back => return Ok(Flow::Continue),
                CourseAction::Quit => return Ok(Flow::Quit),
            };
            if flow == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
    }

    fn add_assignment(&mut self, course: &str) -> Result<Flow> {
        let listing = render_assignment_list(self.book.get_course(course)?);
        self.say(listing.trim_end())?;

        let Some(name) = self.prompt("Enter the name of the assignment you want to add: ")? else {
            return Ok(Flow::Quit);
        };
        if let Err(e) = check_name(EntityKind::Assignment, &name) {
            self.report(e)?;
            return Ok(Flow::Continue);
        }
        let current = {
            let c = self.book.get_course(course)?;
            if c.assignment(&name).is_ok() {
                self.say("Assignment already exists.")?;
                return Ok(Flow::Continue);
            }
            c.total_weight()
        };

        let Some(weight) = self.prompt_score("Enter the weight of the assignment: ", "Invalid weight.")? else {
            return Ok(Flow::Quit);
        };
        if would_exceed_capacity(current, weight) {
            self.say("Total weight exceeds 100. Please try again.")?;
            return Ok(Flow::Continue);
        }
        let Some(grade) = self.prompt_score("Enter the grade of the assignment: ", "Invalid grade.")? else {
            return Ok(Flow::Quit);
        };

        match self.book.get_course_mut(course)?.add_assignment(&name, weight, grade) {
            Ok(()) => self.say("Assignment added successfully.")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn edit_assignment(&mut self, course: &str) -> Result<Flow> {
        let c = self.book.get_course(course)?;
        if c.is_empty() {
            self.say("No assignments to edit.")?;
            return Ok(Flow::Continue);
        }
        let listing = render_assignment_list(c);
        self.say(listing.trim_end())?;

        let Some(name) = self.prompt("Enter the name of the assignment you want to edit: ")? else {
            return Ok(Flow::Quit);
        };
        if let Err(e) = self.book.get_course(course)?.assignment(&name) {
            self.report(e)?;
            return Ok(Flow::Continue);
        }

        let question = "Do you want to edit the name or weight of the assignment? (N/W): ";
        let edit = loop {
            let Some(mode) = self.prompt(question)? else {
                return Ok(Flow::Quit);
            };
            match mode.to_lowercase().as_str() {
                "n" => {
                    let Some(new_name) = self.prompt("Enter the new name of the assignment: ")? else {
                        return Ok(Flow::Quit);
                    };
                    break AssignmentEdit::Rename { new_name };
                }
                "w" => {
                    let Some(weight) =
                        self.prompt_score("Enter the weight of the assignment: ", "Invalid weight.")?
                    else {
                        return Ok(Flow::Quit);
                    };
                    let Some(grade) =
                        self.prompt_score("Enter the grade of the assignment: ", "Invalid grade.")?
                    else {
                        return Ok(Flow::Quit);
                    };
                    break AssignmentEdit::Regrade { weight, grade };
                }
                _ => self.say("Invalid option.")?,
            }
        };

        match self.book.get_course_mut(course)?.edit_assignment(&name, edit) {
            Ok(()) => self.say("Assignment edited successfully.")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn remove_assignment(&mut self, course: &str) -> Result<Flow> {
        let c = self.book.get_course(course)?;
        if c.is_empty() {
            self.say("No assignments to remove.")?;
            return Ok(Flow::Continue);
        }
        let listing = render_assignment_list(c);
        self.say(listing.trim_end())?;

        let Some(name) = self.prompt("Enter the name of the assignment you want to remove: ")? else {
            return Ok(Flow::Quit);
        };
        match self.book.get_course_mut(course)?.remove_assignment(&name) {
            Ok(_) => self.say("Assignment removed successfully.")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    /// Re-prompts until the answer is a whole number in `0..=100`.
    fn prompt_score(&mut self, question: &str, complaint: &str) -> Result<Option<u32>> {
        loop {
            let Some(answer) = self.prompt(question)? else {
                return Ok(None);
            };
            match answer.parse::<i64>() {
                Ok(n) if is_in_range_0_100(n) => return Ok(Some(n as u32)),
                _ => self.say(complaint)?,
            }
        }
    }

    /// Writes `question` and reads one trimmed line; `None` at end of input.
    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, message: impl Display) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    fn report(&mut self, err: impl Display) -> Result<()> {
        self.say(format!("Error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::encode;
    use std::io::Cursor;

    fn run_session(book: GradeBook, script: &str) -> (GradeBook, String) {
        let mut output = Vec::new();
        let mut shell = Shell::new(Cursor::new(script.to_string()), &mut output, book, "unused.txt");
        shell.run().unwrap();
        let book = shell.into_book();
        (book, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_parse_main_actions() {
        assert_eq!(MainAction::parse("1"), Some(MainAction::AddCourse));
        assert_eq!(MainAction::parse("Add"), Some(MainAction::AddCourse));
        assert_eq!(MainAction::parse(" C "), Some(MainAction::ViewCourses));
        assert_eq!(MainAction::parse("S"), Some(MainAction::Save));
        assert_eq!(MainAction::parse("quit"), Some(MainAction::Quit));
        assert_eq!(MainAction::parse("8"), None);
    }

    #[test]
    fn test_parse_course_actions() {
        assert_eq!(CourseAction::parse("b"), Some(CourseAction::Back));
        assert_eq!(CourseAction::parse("Q"), Some(CourseAction::Quit));
        assert_eq!(CourseAction::parse("4"), None);
    }

    #[test]
    fn test_add_course_and_assignments() {
        let script = "a\nCS101\n\
                      m\ncs101\n2\n\
                      1\nHW1\n40\n90\n\
                      1\nExam\n150\n60\n80\n\
                      b\nq\n";
        let (book, output) = run_session(GradeBook::new(), script);

        let course = book.get_course("CS101").unwrap();
        assert_eq!(course.final_grade(), 84.0);
        assert!(output.contains("Course added successfully."));
        assert!(output.contains("Invalid weight."));
        assert_eq!(output.matches("Assignment added successfully.").count(), 2);
        assert!(output.ends_with("Thanks for using the Gradebook Calculator!\n"));
    }

    #[test]
    fn test_capacity_rejected_before_grade_prompt() {
        let mut book = GradeBook::new();
        book.add_course("CS101")
            .unwrap()
            .add_assignment("HW1", 40, 90)
            .unwrap();

        let script = "3\nCS101\n2\n1\nHW2\n70\nq\n";
        let (book, output) = run_session(book, script);

        assert!(output.contains("Total weight exceeds 100. Please try again."));
        assert!(!output.contains("Enter the grade of the assignment"));
        assert_eq!(book.get_course("cs101").unwrap().len(), 1);
    }

    #[test]
    fn test_bad_assignment_name_rejected_before_weight_prompt() {
        let mut book = GradeBook::new();
        book.add_course("CS101").unwrap();

        let (book, output) = run_session(book, "3\nCS101\n2\n1\n \nq\n");
        assert!(output.contains("Error: assignment name must not be empty"));
        assert!(!output.contains("Enter the weight of the assignment"));

        let (book, output) = run_session(book, "3\nCS101\n2\n1\nQ\r1\nq\n");
        assert!(output.contains("must not contain control characters"));
        assert!(!output.contains("Enter the weight of the assignment"));
        assert!(book.get_course("cs101").unwrap().is_empty());
    }

    #[test]
    fn test_edit_and_remove_assignment() {
        let mut book = GradeBook::new();
        let cs = book.add_course("CS101").unwrap();
        cs.add_assignment("HW1", 40, 90).unwrap();
        cs.add_assignment("Exam", 60, 80).unwrap();

        let script = "m\nCS101\n2\n\
                      2\nhw1\nx\nn\nHomework\n\
                      2\nexam\nW\n50\n100\n\
                      3\nhomework\n\
                      b\nq\n";
        let (book, output) = run_session(book, script);

        let course = book.get_course("cs101").unwrap();
        assert_eq!(course.list_assignments().collect::<Vec<_>>(), vec!["Exam"]);
        assert_eq!(course.final_grade(), 50.0);
        assert!(output.contains("Invalid option."));
        assert_eq!(output.matches("Assignment edited successfully.").count(), 2);
        assert!(output.contains("Assignment removed successfully."));
    }

    #[test]
    fn test_rename_and_remove_course() {
        let mut book = GradeBook::new();
        book.add_course("Math").unwrap();
        book.add_course("Art").unwrap();

        let script = "3\nmath\n1\nAlgebra\n2\nart\n5\nq\n";
        let (book, output) = run_session(book, script);

        assert_eq!(book.list_courses().collect::<Vec<_>>(), vec!["Algebra"]);
        assert!(output.contains("Course edited successfully."));
        assert!(output.contains("Course removed successfully."));
        assert!(output.contains("• Algebra"));
    }

    #[test]
    fn test_errors_are_reported_and_session_continues() {
        let mut book = GradeBook::new();
        book.add_course("Math").unwrap();

        let script = "9\n1\nmath\n4\nBio\nv\nMath\nq\n";
        let (_, output) = run_session(book, script);

        assert!(output.contains("Invalid action."));
        assert!(output.contains("Error: course 'math' already exists"));
        assert!(output.contains("Error: course 'Bio' not found"));
        assert!(output.contains("Course Name: Math"));
    }

    #[test]
    fn test_remove_from_empty_book() {
        let (_, output) = run_session(GradeBook::new(), "2\nq\n");
        assert!(output.contains("No courses to remove."));
    }

    #[test]
    fn test_end_of_input_ends_session() {
        let (book, output) = run_session(GradeBook::new(), "a\nMath\n3\nmath\n2\n1\nQuiz\n");
        assert_eq!(book.len(), 1);
        assert!(book.get_course("math").unwrap().is_empty());
        assert!(output.ends_with("Thanks for using the Gradebook Calculator!\n"));
    }

    #[test]
    fn test_save_uses_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.txt");

        let mut book = GradeBook::new();
        book.add_course("Math")
            .unwrap()
            .add_assignment("Quiz1", 50, 88)
            .unwrap();
        let expected = encode(&book).unwrap();

        let mut output = Vec::new();
        let mut shell = Shell::new(Cursor::new("s\n\nq\n"), &mut output, book, &path);
        shell.run().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
    }

    #[test]
    fn test_startup_reads_file_after_retry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.txt");
        std::fs::write(&path, "1\nmath\n1\nQuiz1,50,88\n").unwrap();

        let script = format!(
            "x\nr\n{}\n{}\nq\n",
            dir.path().join("missing.txt").display(),
            path.display()
        );
        let mut output = Vec::new();
        let mut shell = Shell::new(Cursor::new(script), &mut output, GradeBook::new(), &path)
            .ask_for_source();
        shell.run().unwrap();

        let book = shell.into_book();
        assert_eq!(book.get_course("Math").unwrap().final_grade(), 44.0);
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Invalid input."));
        assert!(output.contains("Error in file:"));
    }

    #[test]
    fn test_startup_quit() {
        let mut output = Vec::new();
        let mut shell = Shell::new(Cursor::new("q\n"), &mut output, GradeBook::new(), "x.txt")
            .ask_for_source();
        shell.run().unwrap();
        drop(shell);

        let output = String::from_utf8(output).unwrap();
        assert!(!output.contains("Main Menu"));
    }
}
