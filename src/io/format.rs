use super::{JsonFormat, LpFormat, MpsFormat};
use crate::solver::{Problem, ProblemFormatError};
use enum_dispatch::*;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error type returned when writing or reading problem files
pub enum ProblemFileError {
    /// underlying file access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// malformed text file
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// what went wrong
        message: String,
    },
    /// the format has no reader
    #[error("{0} files cannot be read")]
    Unsupported(&'static str),
    /// the file describes an inconsistent problem
    #[error("invalid problem: {0}")]
    Format(#[from] ProblemFormatError),
}

impl ProblemFileError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ProblemFileError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// A textual or serialized representation of a [`Problem`]
#[enum_dispatch]
pub trait ProblemFileFormat {
    /// short format name
    fn name(&self) -> &'static str;

    /// write `problem` under the given problem name
    fn write(
        &self,
        problem: &Problem,
        name: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProblemFileError>;

    /// read a problem and its name
    fn read(&self, _input: &mut dyn BufRead) -> Result<(String, Problem), ProblemFileError> {
        Err(ProblemFileError::Unsupported(self.name()))
    }
}

/// Problem file formats, selected by file extension
#[enum_dispatch(ProblemFileFormat)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// CPLEX LP text, write only
    LpFormat,
    /// free MPS
    MpsFormat,
    /// serde JSON
    JsonFormat,
}

impl FileFormat {
    /// Format implied by the extension of `path`.  Unknown or missing
    /// extensions give LP.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("mps") => MpsFormat.into(),
            Some("json") => JsonFormat.into(),
            _ => LpFormat.into(),
        }
    }
}

/// Write `problem` to `path` in the format implied by its extension
pub fn write_problem_file(
    problem: &Problem,
    name: &str,
    path: &Path,
) -> Result<(), ProblemFileError> {
    let format = FileFormat::from_path(path);
    let mut out = BufWriter::new(File::create(path)?);
    format.write(problem, name, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Read a problem and its name from `path`.  Supported for `.mps`
/// and `.json` files.
pub fn read_problem_file(path: &Path) -> Result<(String, Problem), ProblemFileError> {
    let format = FileFormat::from_path(path);
    let mut input = BufReader::new(File::open(path)?);
    let (name, problem) = format.read(&mut input)?;
    problem.check_format()?;
    Ok((name, problem))
}

// default names of rows and columns in text formats
pub(crate) fn column_name(j: usize) -> String {
    format!("x{}", j + 1)
}

pub(crate) fn row_name(i: usize) -> String {
    format!("c{}", i + 1)
}

// shortest text that parses back to the same value
pub(crate) fn fmt_num(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:?}", v)
    }
}

#[test]
fn test_format_from_path() {
    assert_eq!(
        FileFormat::from_path(Path::new("a/b.MPS")),
        FileFormat::MpsFormat(MpsFormat)
    );
    assert_eq!(
        FileFormat::from_path(Path::new("p.json")),
        FileFormat::JsonFormat(JsonFormat)
    );
    assert_eq!(
        FileFormat::from_path(Path::new("p.lp")),
        FileFormat::LpFormat(LpFormat)
    );
    assert_eq!(
        FileFormat::from_path(Path::new("noext")),
        FileFormat::LpFormat(LpFormat)
    );
    assert_eq!(
        FileFormat::from_path(Path::new("p.sav")),
        FileFormat::LpFormat(LpFormat)
    );
}

#[test]
fn test_fmt_num() {
    assert_eq!(fmt_num(1.0), "1");
    assert_eq!(fmt_num(-3.0), "-3");
    assert_eq!(fmt_num(0.5), "0.5");
    assert_eq!(fmt_num(1e20), "1e20");
    assert_eq!(fmt_num(-0.0), "0");
}

#[test]
fn test_lp_has_no_reader() {
    let mut input: &[u8] = b"Minimize\n obj: x1\nEnd\n";
    let err = FileFormat::from(LpFormat).read(&mut input);
    assert!(matches!(err, Err(ProblemFileError::Unsupported("LP"))));
}
