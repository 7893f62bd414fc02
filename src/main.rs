//! CLI entry point for the gradebook tool.
//!
//! Provides an interactive menu session plus one-shot subcommands that load a
//! gradebook file, apply a single change, and save it back.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gradebook::config::Settings;
use gradebook::output::{append_report, render_course, render_course_list, to_json};
use gradebook::persistence::{load_from_path, save_to_path};
use gradebook::report::{CourseReport, GradeBookReport};
use gradebook::shell::Shell;
use gradebook::{AssignmentEdit, GradeBook};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(about = "Track weighted assignment grades per course", long_about = None)]
struct Cli {
    /// Gradebook file to read and write (defaults to $GRADEBOOK_FILE)
    #[arg(short, long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive menu
    Interactive,
    /// List all courses
    List,
    /// Show one course with its assignments and grades
    Show {
        course: String,

        /// Print a JSON report instead of the text summary
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Add an empty course
    AddCourse { name: String },
    /// Remove a course and all of its assignments
    RemoveCourse { name: String },
    /// Rename a course, keeping its assignments
    RenameCourse { name: String, new_name: String },
    /// Add an assignment to a course
    AddAssignment {
        course: String,
        name: String,

        /// Weight in percentage points (0-100)
        #[arg(short, long)]
        weight: u32,

        /// Grade (0-100)
        #[arg(short, long)]
        grade: u32,
    },
    /// Rename an assignment, or replace its weight and grade
    EditAssignment {
        course: String,
        name: String,

        /// New assignment name
        #[arg(long)]
        rename: Option<String>,

        /// New weight (requires --grade)
        #[arg(short, long)]
        weight: Option<u32>,

        /// New grade (requires --weight)
        #[arg(short, long)]
        grade: Option<u32>,
    },
    /// Remove an assignment from a course
    RemoveAssignment { course: String, name: String },
    /// Print a JSON report for every course, or append CSV rows to a file
    Report {
        /// CSV file to append per-course rows to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let settings = Settings::from_env();

    // Logging setup: quiet stderr + JSON rolling log file
    let log_dir = settings
        .log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = settings
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("gradebook.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("warn".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let explicit_file = cli.file.is_some();
    let path = cli.file.unwrap_or(settings.gradebook_file);

    match cli.command {
        Commands::Interactive => {
            let stdin = std::io::stdin().lock();
            let stdout = std::io::stdout().lock();
            let mut shell = if explicit_file {
                Shell::new(stdin, stdout, open_book(&path)?, &path)
            } else {
                Shell::new(stdin, stdout, GradeBook::new(), &path).ask_for_source()
            };
            shell.run()?;
        }
        Commands::List => {
            let book = open_book(&path)?;
            print!("{}", render_course_list(&book));
        }
        Commands::Show { course, json } => {
            let book = open_book(&path)?;
            let course = book.get_course(&course)?;
            if json {
                println!("{}", to_json(&CourseReport::from_course(course))?);
            } else {
                print!("{}", render_course(course));
            }
        }
        Commands::AddCourse { name } => {
            let mut book = open_book(&path)?;
            book.add_course(&name)?;
            commit(&book, &path)?;
        }
        Commands::RemoveCourse { name } => {
            let mut book = open_book(&path)?;
            book.remove_course(&name)?;
            commit(&book, &path)?;
        }
        Commands::RenameCourse { name, new_name } => {
            let mut book = open_book(&path)?;
            book.rename_course(&name, &new_name)?;
            commit(&book, &path)?;
        }
        Commands::AddAssignment {
            course,
            name,
            weight,
            grade,
        } => {
            let mut book = open_book(&path)?;
            book.get_course_mut(&course)?
                .add_assignment(&name, weight, grade)?;
            commit(&book, &path)?;
        }
        Commands::EditAssignment {
            course,
            name,
            rename,
            weight,
            grade,
        } => {
            let edit = AssignmentEdit::from_parts(rename, weight, grade)?;
            let mut book = open_book(&path)?;
            book.get_course_mut(&course)?.edit_assignment(&name, edit)?;
            commit(&book, &path)?;
        }
        Commands::RemoveAssignment { course, name } => {
            let mut book = open_book(&path)?;
            book.get_course_mut(&course)?.remove_assignment(&name)?;
            commit(&book, &path)?;
        }
        Commands::Report { output } => {
            let book = open_book(&path)?;
            let report = GradeBookReport::from_gradebook(&book);
            match output {
                Some(csv_path) => {
                    for row in &report.courses {
                        append_report(&csv_path, row)?;
                    }
                    info!(rows = report.courses.len(), path = %csv_path.display(), "Report appended");
                }
                None => println!("{}", to_json(&report)?),
            }
        }
    }

    Ok(())
}

/// Loads the gradebook at `path`, or starts an empty one if the file does not exist yet.
fn open_book(path: &Path) -> Result<GradeBook> {
    if !path.exists() {
        info!(path = %path.display(), "No gradebook file yet, starting empty");
        return Ok(GradeBook::new());
    }
    Ok(load_from_path(path)?)
}

fn commit(book: &GradeBook, path: &Path) -> Result<()> {
    save_to_path(book, path)?;
    println!("Saved {}.", path.display());
    Ok(())
}
