//! Line-oriented text codec for saving and loading a [`GradeBook`].
//!
//! ```text
//! <course_count>
//! <course_key>
//! <assignment_count>
//! <assignment_name>,<weight>,<grade>
//! ...
//! ```
//!
//! Course lines hold the lower-cased course key; assignment lines keep the
//! assignment's display name. Names are written verbatim, so a comma inside a
//! name cannot be read back.

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{GradebookError, GradebookResult};
use crate::gradebook::GradeBook;
use crate::validation::is_in_range_0_100;

/// Writes `book` to `sink` in the gradebook text format.
///
/// # Errors
///
/// Returns [`GradebookError::Io`] if the sink fails.
pub fn save<W: Write>(book: &GradeBook, sink: W) -> GradebookResult<()> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(sink);

    writer
        .write_record([book.len().to_string()])
        .map_err(write_fault)?;
    for (key, course) in book.keyed_courses() {
        writer.write_record([key]).map_err(write_fault)?;
        writer
            .write_record([course.len().to_string()])
            .map_err(write_fault)?;
        for a in course.assignments() {
            writer
                .write_record([a.name().to_string(), a.weight().to_string(), a.grade().to_string()])
                .map_err(write_fault)?;
        }
    }
    writer.flush()?;

    Ok(())
}

/// Renders `book` in the gradebook text format.
pub fn encode(book: &GradeBook) -> GradebookResult<String> {
    let mut buf = Vec::new();
    save(book, &mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Reads a complete [`GradeBook`] from `source`.
///
/// Weight and grade fields may be fractional; they are truncated toward zero
/// and must then lie in `0..=100`. Every course and assignment goes through
/// the regular add operations, so duplicate names and weight totals over 100
/// are rejected as well.
///
/// # Errors
///
/// Returns [`GradebookError::MalformedFile`] with the offending line number if
/// the content does not match the format, or [`GradebookError::Io`] if reading
/// fails. No partially loaded book is ever returned.
pub fn load<R: BufRead>(source: R) -> GradebookResult<GradeBook> {
    let mut lines = LineReader::new(source);
    let mut book = GradeBook::new();

    let course_count = lines.next_count("course count")?;
    for _ in 0..course_count {
        let (line_no, name) = lines.next_required("course name")?;
        let course = book
            .add_course(&name)
            .map_err(|e| GradebookError::malformed(line_no, e.to_string()))?;

        let assignment_count = lines.next_count("assignment count")?;
        for _ in 0..assignment_count {
            let (line_no, line) = lines.next_required("assignment line")?;
            let (name, weight, grade) = parse_assignment(line_no, &line)?;
            course
                .add_assignment(&name, weight, grade)
                .map_err(|e| GradebookError::malformed(line_no, e.to_string()))?;
        }
        debug!(course = %course.name(), assignments = assignment_count, "Loaded course");
    }
    lines.expect_end()?;

    Ok(book)
}

/// Saves `book` to `path`, replacing the file only once the write succeeded.
#[tracing::instrument(skip_all, fields(path = %path.display(), courses = book.len()))]
pub fn save_to_path(book: &GradeBook, path: &Path) -> GradebookResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    save(book, &mut file)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    info!("Gradebook saved");
    Ok(())
}

/// Opens `path` and loads the gradebook it contains.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_from_path(path: &Path) -> GradebookResult<GradeBook> {
    let file = File::open(path)?;
    let book = load(BufReader::new(file))?;

    info!(courses = book.len(), "Gradebook loaded");
    Ok(book)
}

fn write_fault(err: csv::Error) -> GradebookError {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => GradebookError::Io(e),
        other => GradebookError::Io(io::Error::other(format!("{other:?}"))),
    }
}

/// Splits an assignment line into exactly three fields.
fn parse_assignment(line_no: usize, line: &str) -> GradebookResult<(String, u32, u32)> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|e| GradebookError::malformed(line_no, e.to_string()))?;
    if !found || record.len() != 3 {
        return Err(GradebookError::malformed(
            line_no,
            format!("expected 'name,weight,grade', found '{line}'"),
        ));
    }

    let weight = parse_score(line_no, "weight", &record[1])?;
    let grade = parse_score(line_no, "grade", &record[2])?;
    Ok((record[0].to_string(), weight, grade))
}

/// Parses a whole or fractional number, truncated toward zero into `0..=100`.
fn parse_score(line_no: usize, field: &str, raw: &str) -> GradebookResult<u32> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| GradebookError::malformed(line_no, format!("{field} '{raw}' is not a number")))?;
    if !value.is_finite() {
        return Err(GradebookError::malformed(
            line_no,
            format!("{field} '{raw}' is not a finite number"),
        ));
    }

    let whole = value.trunc() as i64;
    if !is_in_range_0_100(whole) {
        return Err(GradebookError::malformed(
            line_no,
            format!("{field} {raw} is outside 0..=100"),
        ));
    }
    Ok(whole as u32)
}

/// Numbered line source that strips `\r\n` endings.
struct LineReader<R> {
    inner: io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(source: R) -> Self {
        Self {
            inner: source.lines(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> GradebookResult<Option<String>> {
        let Some(line) = self.inner.next() else {
            return Ok(None);
        };
        self.line_no += 1;

        let mut line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => GradebookError::malformed(self.line_no, "invalid UTF-8"),
            _ => GradebookError::Io(e),
        })?;
        if line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn next_required(&mut self, what: &str) -> GradebookResult<(usize, String)> {
        match self.next_line()? {
            Some(line) => Ok((self.line_no, line)),
            None => Err(GradebookError::malformed(
                self.line_no + 1,
                format!("unexpected end of file, expected {what}"),
            )),
        }
    }

    fn next_count(&mut self, what: &str) -> GradebookResult<usize> {
        let (line_no, line) = self.next_required(what)?;
        line.trim().parse().map_err(|_| {
            GradebookError::malformed(line_no, format!("expected {what}, found '{line}'"))
        })
    }

    /// Only blank lines may follow the last declared course.
    fn expect_end(&mut self) -> GradebookResult<()> {
        while let Some(line) = self.next_line()? {
            if !line.trim().is_empty() {
                return Err(GradebookError::malformed(
                    self.line_no,
                    format!("unexpected content after last course: '{line}'"),
                ));
            }
        }
        Ok(())
    }
}
