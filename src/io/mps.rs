use super::format::*;
use crate::algebra::SparseMatrix;
use crate::solver::utils::infbounds::*;
use crate::solver::{ColumnType, ObjectiveSense, Problem, RowSense};
use std::collections::HashMap;
use std::io::{BufRead, Write};

const OBJECTIVE_ROW: &str = "obj";

/// Free MPS format with `OBJSENSE`, integer markers, ranges, bounds
/// (`LO UP FX FR MI PL BV LI UI SC`) and a `QMATRIX` section.
///
/// Range rows are written as `E` rows with a signed range value.
/// When reading, `QUADOBJ` (upper triangle) is accepted as well as
/// `QMATRIX` (full matrix), and the leading run of equality rows is
/// taken as the problem's equality block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MpsFormat;

impl ProblemFileFormat for MpsFormat {
    fn name(&self) -> &'static str {
        "MPS"
    }

    fn write(
        &self,
        problem: &Problem,
        name: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProblemFileError> {
        write_mps(problem, name, out)?;
        Ok(())
    }

    fn read(&self, input: &mut dyn BufRead) -> Result<(String, Problem), ProblemFileError> {
        let mut reader = MpsReader::default();
        for (k, line) in input.lines().enumerate() {
            reader.parse_line(k + 1, &line?)?;
        }
        reader.finish()
    }
}

// ---------------------------------------------------------
// writer
// ---------------------------------------------------------

fn write_mps(problem: &Problem, name: &str, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "NAME {}", name)?;
    if problem.sense == ObjectiveSense::Maximize {
        writeln!(out, "OBJSENSE")?;
        writeln!(out, "    MAX")?;
    }

    let ranges = problem.range_values.as_deref();
    let range_of = |i: usize| ranges.map_or(0.0, |r| r[i]);

    writeln!(out, "ROWS")?;
    writeln!(out, " N  {}", OBJECTIVE_ROW)?;
    for (i, sense) in problem.row_senses.iter().enumerate() {
        let code = match sense {
            RowSense::R => 'E',
            s => s.code(),
        };
        writeln!(out, " {}  {}", code, row_name(i))?;
    }

    let types = problem.effective_column_types();
    let col_type = |j: usize| types.as_ref().map_or(ColumnType::C, |t| t[j]);

    writeln!(out, "COLUMNS")?;
    let mut in_marker = false;
    let mut markers = 0;
    for j in 0..problem.ncols {
        let integer = matches!(col_type(j), ColumnType::I | ColumnType::N);
        if integer != in_marker {
            let kind = if integer { "INTORG" } else { "INTEND" };
            writeln!(out, "    MARKER{}  'MARKER'  '{}'", markers, kind)?;
            markers += integer as usize;
            in_marker = integer;
        }

        let col = column_name(j);
        let mut entries: Vec<(usize, f64)> = problem.matrix.column(j).collect();
        entries.sort_by_key(|&(row, _)| row);

        let cost = problem.objective[j];
        if cost != 0.0 || entries.is_empty() {
            writeln!(out, "    {}  {}  {}", col, OBJECTIVE_ROW, fmt_num(cost))?;
        }
        for (row, v) in entries {
            writeln!(out, "    {}  {}  {}", col, row_name(row), fmt_num(v))?;
        }
    }
    if in_marker {
        writeln!(out, "    MARKER{}  'MARKER'  'INTEND'", markers)?;
    }

    writeln!(out, "RHS")?;
    for (i, &rhs) in problem.rhs.iter().enumerate() {
        if rhs != 0.0 {
            writeln!(out, "    RHS  {}  {}", row_name(i), fmt_num(rhs))?;
        }
    }

    let ranged: Vec<usize> = (0..problem.nrows)
        .filter(|&i| problem.row_senses[i] == RowSense::R && range_of(i) != 0.0)
        .collect();
    if !ranged.is_empty() {
        writeln!(out, "RANGES")?;
        for i in ranged {
            writeln!(out, "    RNG  {}  {}", row_name(i), fmt_num(range_of(i)))?;
        }
    }

    writeln!(out, "BOUNDS")?;
    for j in 0..problem.ncols {
        let col = column_name(j);
        for (kind, value) in bound_entries(col_type(j), problem.lower[j], problem.upper[j]) {
            match value {
                Some(v) => writeln!(out, " {} BND  {}  {}", kind, col, fmt_num(v))?,
                None => writeln!(out, " {} BND  {}", kind, col)?,
            }
        }
    }

    if let Some(Q) = &problem.quadratic {
        writeln!(out, "QMATRIX")?;
        for (row, col, v) in Q.triplets() {
            if v != 0.0 {
                writeln!(
                    out,
                    "    {}  {}  {}",
                    column_name(row),
                    column_name(col),
                    fmt_num(v)
                )?;
            }
        }
    }

    writeln!(out, "ENDATA")
}

// bound records for one column.  MPS defaults are [0, +inf).
fn bound_entries(kind: ColumnType, lower: f64, upper: f64) -> Vec<(&'static str, Option<f64>)> {
    let lo_inf = is_neg_infinite(lower);
    let hi_inf = is_pos_infinite(upper);
    let mut entries = Vec::new();

    match kind {
        ColumnType::B => entries.push(("BV", None)),
        ColumnType::S | ColumnType::N => {
            if !lo_inf && lower != 0.0 {
                entries.push(("LO", Some(lower)));
            }
            entries.push(("SC", Some(upper)));
        }
        ColumnType::C | ColumnType::I => match (lo_inf, hi_inf) {
            (true, true) => entries.push(("FR", None)),
            (true, false) => {
                entries.push(("MI", None));
                entries.push(("UP", Some(upper)));
            }
            (false, false) if lower == upper => entries.push(("FX", Some(lower))),
            (false, _) => {
                if lower != 0.0 {
                    entries.push(("LO", Some(lower)));
                }
                if !hi_inf {
                    entries.push(("UP", Some(upper)));
                } else if kind == ColumnType::I {
                    // some readers default marked integers to binary
                    entries.push(("PL", None));
                }
            }
        },
    }
    entries
}

// ---------------------------------------------------------
// reader
// ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    #[default]
    Start,
    ObjSense,
    Rows,
    Columns,
    Rhs,
    Ranges,
    Bounds,
    QMatrix,
    QuadObj,
    End,
}

#[derive(Debug)]
struct MpsColumn {
    cost: f64,
    lower: f64,
    upper: f64,
    kind: ColumnType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowRef {
    Objective,
    Free,
    Constraint(usize),
}

#[derive(Debug, Default)]
struct MpsReader {
    section: Section,
    name: String,
    sense: ObjectiveSense,
    objective_row: Option<String>,
    free_rows: Vec<String>,
    row_types: Vec<char>,
    row_index: HashMap<String, usize>,
    columns: Vec<MpsColumn>,
    column_index: HashMap<String, usize>,
    integer_marker: bool,
    entries: Vec<(usize, usize, f64)>,
    rhs: Vec<f64>,
    ranges: Vec<Option<f64>>,
    quadratic: Vec<(usize, usize, f64)>,
}

fn parse_num(line: usize, text: &str) -> Result<f64, ProblemFileError> {
    let v: f64 = text
        .parse()
        .map_err(|_| ProblemFileError::parse(line, format!("bad number '{}'", text)))?;
    if v.is_nan() {
        return Err(ProblemFileError::parse(line, "NaN value"));
    }
    if v.is_infinite() {
        return Ok(v.signum() * get_infinity());
    }
    Ok(v)
}

fn parse_sense(line: usize, text: &str) -> Result<ObjectiveSense, ProblemFileError> {
    match text.to_ascii_uppercase().as_str() {
        "MIN" | "MINIMIZE" => Ok(ObjectiveSense::Minimize),
        "MAX" | "MAXIMIZE" => Ok(ObjectiveSense::Maximize),
        _ => Err(ProblemFileError::parse(
            line,
            format!("unknown objective sense '{}'", text),
        )),
    }
}

impl MpsReader {
    fn parse_line(&mut self, line: usize, text: &str) -> Result<(), ProblemFileError> {
        let trimmed = text.trim_end();
        if trimmed.is_empty() || trimmed.starts_with('*') {
            return Ok(());
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();

        // section headers start in the first column
        if !text.starts_with(char::is_whitespace) {
            return self.parse_header(line, &fields);
        }

        match self.section {
            Section::ObjSense => {
                self.sense = parse_sense(line, fields[0])?;
                Ok(())
            }
            Section::Rows => self.parse_row(line, &fields),
            Section::Columns => self.parse_column(line, &fields),
            Section::Rhs => self.parse_row_values(line, &fields, false),
            Section::Ranges => self.parse_row_values(line, &fields, true),
            Section::Bounds => self.parse_bound(line, &fields),
            Section::QMatrix | Section::QuadObj => self.parse_quadratic(line, &fields),
            Section::Start | Section::End => Err(ProblemFileError::parse(
                line,
                "data outside of a section",
            )),
        }
    }

    fn parse_header(&mut self, line: usize, fields: &[&str]) -> Result<(), ProblemFileError> {
        self.section = match fields[0] {
            "NAME" => {
                self.name = fields[1..].join(" ");
                Section::Start
            }
            "OBJSENSE" => match fields.get(1) {
                Some(sense) => {
                    self.sense = parse_sense(line, sense)?;
                    Section::Start
                }
                None => Section::ObjSense,
            },
            "ROWS" => Section::Rows,
            "COLUMNS" => Section::Columns,
            "RHS" => Section::Rhs,
            "RANGES" => Section::Ranges,
            "BOUNDS" => Section::Bounds,
            "QMATRIX" => Section::QMatrix,
            "QUADOBJ" => Section::QuadObj,
            "ENDATA" => Section::End,
            other => {
                return Err(ProblemFileError::parse(
                    line,
                    format!("unknown section '{}'", other),
                ))
            }
        };
        Ok(())
    }

    fn parse_row(&mut self, line: usize, fields: &[&str]) -> Result<(), ProblemFileError> {
        if fields.len() < 2 {
            return Err(ProblemFileError::parse(line, "row needs a type and a name"));
        }
        let name = fields[1].to_string();
        match fields[0].to_ascii_uppercase().as_str() {
            "N" if self.objective_row.is_none() => self.objective_row = Some(name),
            "N" => self.free_rows.push(name),
            code @ ("L" | "E" | "G") => {
                if self.row_index.contains_key(&name) {
                    return Err(ProblemFileError::parse(line, format!("duplicate row '{}'", name)));
                }
                self.row_index.insert(name, self.row_types.len());
                self.row_types.push(code.chars().next().unwrap_or('E'));
                self.rhs.push(0.0);
                self.ranges.push(None);
            }
            other => {
                return Err(ProblemFileError::parse(
                    line,
                    format!("unknown row type '{}'", other),
                ))
            }
        }
        Ok(())
    }

    fn row_ref(&self, line: usize, name: &str) -> Result<RowRef, ProblemFileError> {
        if self.objective_row.as_deref() == Some(name) {
            return Ok(RowRef::Objective);
        }
        if self.free_rows.iter().any(|r| r == name) {
            return Ok(RowRef::Free);
        }
        self.row_index
            .get(name)
            .map(|&i| RowRef::Constraint(i))
            .ok_or_else(|| ProblemFileError::parse(line, format!("unknown row '{}'", name)))
    }

    fn column(&self, line: usize, name: &str) -> Result<usize, ProblemFileError> {
        self.column_index
            .get(name)
            .copied()
            .ok_or_else(|| ProblemFileError::parse(line, format!("unknown column '{}'", name)))
    }

    fn parse_column(&mut self, line: usize, fields: &[&str]) -> Result<(), ProblemFileError> {
        if fields.len() >= 3 && fields[1] == "'MARKER'" {
            match fields[2] {
                "'INTORG'" => self.integer_marker = true,
                "'INTEND'" => self.integer_marker = false,
                other => {
                    return Err(ProblemFileError::parse(
                        line,
                        format!("unknown marker {}", other),
                    ))
                }
            }
            return Ok(());
        }
        if fields.len() < 3 || fields.len() % 2 == 0 {
            return Err(ProblemFileError::parse(line, "expected column name and row/value pairs"));
        }

        let name = fields[0];
        let j = match self.column_index.get(name) {
            Some(&j) => j,
            None => {
                let j = self.columns.len();
                self.column_index.insert(name.to_string(), j);
                self.columns.push(MpsColumn {
                    cost: 0.0,
                    lower: 0.0,
                    upper: get_infinity(),
                    kind: if self.integer_marker {
                        ColumnType::I
                    } else {
                        ColumnType::C
                    },
                });
                j
            }
        };

        for pair in fields[1..].chunks(2) {
            let v = parse_num(line, pair[1])?;
            match self.row_ref(line, pair[0])? {
                RowRef::Objective => self.columns[j].cost += v,
                RowRef::Free => {}
                RowRef::Constraint(i) => self.entries.push((i, j, v)),
            }
        }
        Ok(())
    }

    // RHS and RANGES records, with or without a leading set name
    fn parse_row_values(
        &mut self,
        line: usize,
        fields: &[&str],
        ranges: bool,
    ) -> Result<(), ProblemFileError> {
        let pairs = if fields.len() % 2 == 1 { &fields[1..] } else { fields };
        if pairs.is_empty() {
            return Err(ProblemFileError::parse(line, "expected row/value pairs"));
        }
        for pair in pairs.chunks(2) {
            let v = parse_num(line, pair[1])?;
            match self.row_ref(line, pair[0])? {
                // objective constants are not represented
                RowRef::Objective | RowRef::Free => {}
                RowRef::Constraint(i) if ranges => self.ranges[i] = Some(v),
                RowRef::Constraint(i) => self.rhs[i] = v,
            }
        }
        Ok(())
    }

    fn parse_bound(&mut self, line: usize, fields: &[&str]) -> Result<(), ProblemFileError> {
        let kind = fields[0].to_ascii_uppercase();
        let with_value = matches!(kind.as_str(), "UP" | "LO" | "FX" | "LI" | "UI");

        // the bound set name is optional
        let (col, value) = match (with_value, fields.len()) {
            (true, 4) => (fields[2], Some(parse_num(line, fields[3])?)),
            (true, 3) => (fields[1], Some(parse_num(line, fields[2])?)),
            (false, 4) => (fields[2], Some(parse_num(line, fields[3])?)),
            (false, 3) => (fields[2], None),
            (false, 2) => (fields[1], None),
            _ => return Err(ProblemFileError::parse(line, "malformed bound record")),
        };
        let j = self.column(line, col)?;
        let c = &mut self.columns[j];
        let value = || value.ok_or_else(|| ProblemFileError::parse(line, "bound needs a value"));

        match kind.as_str() {
            "UP" => c.upper = value()?,
            "LO" => c.lower = value()?,
            "FX" => {
                c.lower = value()?;
                c.upper = c.lower;
            }
            "FR" => {
                c.lower = -get_infinity();
                c.upper = get_infinity();
            }
            "MI" => c.lower = -get_infinity(),
            "PL" => c.upper = get_infinity(),
            "BV" => {
                c.kind = ColumnType::B;
                c.lower = 0.0;
                c.upper = 1.0;
            }
            "LI" => {
                c.kind = ColumnType::I;
                c.lower = value()?;
            }
            "UI" => {
                c.kind = ColumnType::I;
                c.upper = value()?;
            }
            "SC" => {
                c.kind = match c.kind {
                    ColumnType::I | ColumnType::N => ColumnType::N,
                    _ => ColumnType::S,
                };
                c.upper = value().unwrap_or(get_infinity());
            }
            other => {
                return Err(ProblemFileError::parse(
                    line,
                    format!("unknown bound type '{}'", other),
                ))
            }
        }
        Ok(())
    }

    fn parse_quadratic(&mut self, line: usize, fields: &[&str]) -> Result<(), ProblemFileError> {
        if fields.len() != 3 {
            return Err(ProblemFileError::parse(line, "expected two columns and a value"));
        }
        let i = self.column(line, fields[0])?;
        let j = self.column(line, fields[1])?;
        let v = parse_num(line, fields[2])?;
        self.quadratic.push((i, j, v));
        if self.section == Section::QuadObj && i != j {
            self.quadratic.push((j, i, v));
        }
        Ok(())
    }

    fn finish(self) -> Result<(String, Problem), ProblemFileError> {
        let nrows = self.row_types.len();
        let ncols = self.columns.len();

        let mut row_senses = Vec::with_capacity(nrows);
        let mut range_values = vec![0.0; nrows];
        for (i, &code) in self.row_types.iter().enumerate() {
            let sense = match (code, self.ranges[i]) {
                ('E', Some(r)) => {
                    range_values[i] = r;
                    RowSense::R
                }
                ('G', Some(r)) => {
                    range_values[i] = r.abs();
                    RowSense::R
                }
                ('L', Some(r)) => {
                    range_values[i] = -r.abs();
                    RowSense::R
                }
                ('G', None) => RowSense::G,
                ('L', None) => RowSense::L,
                _ => RowSense::E,
            };
            row_senses.push(sense);
        }
        let neq = row_senses
            .iter()
            .take_while(|&&s| s == RowSense::E)
            .count();

        let types: Vec<ColumnType> = self.columns.iter().map(|c| c.kind).collect();
        let matrix = SparseMatrix::from_triplets(nrows, ncols, &self.entries);

        let mut problem = Problem::new(
            self.sense,
            self.columns.iter().map(|c| c.cost).collect(),
            matrix,
            row_senses,
            self.rhs,
            self.columns.iter().map(|c| c.lower).collect(),
            self.columns.iter().map(|c| c.upper).collect(),
            neq,
        );
        if problem.row_senses.contains(&RowSense::R) {
            problem.range_values = Some(range_values);
        }
        if types.iter().any(|&t| t != ColumnType::C) {
            problem.column_types = Some(types);
        }
        if !self.quadratic.is_empty() {
            problem.quadratic = Some(SparseMatrix::from_triplets(ncols, ncols, &self.quadratic));
        }
        Ok((self.name, problem))
    }
}

// ---------------------------------------------------------
// tests
// ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(text: &str) -> Result<(String, Problem), ProblemFileError> {
        let mut input = text.as_bytes();
        MpsFormat.read(&mut input)
    }

    #[test]
    fn test_mps_read() {
        let text = "\
* a comment
NAME          TESTLP
OBJSENSE
    MAXIMIZE
ROWS
 N  COST
 E  LIM1
 G  LIM2
 L  MYEQN
COLUMNS
    X1        COST         1.0   LIM1         1.0
    X1        LIM2         1.0
    MARKER    'MARKER'     'INTORG'
    X2        COST         2.0   LIM1         1.0
    X2        MYEQN       -1.0
    MARKER    'MARKER'     'INTEND'
    X3        COST        -1.0   MYEQN        1.0
RHS
    RHS       LIM1         4.0   LIM2         1.0
    RHS       MYEQN        7.0
RANGES
    RNG       MYEQN        2.0
BOUNDS
 UP BND       X1           4.0
 MI BND       X3
 UP BND       X3           1e30
QUADOBJ
    X1        X1           2.0
    X1        X2           0.5
ENDATA
";
        let (name, p) = read_str(text).unwrap();
        assert_eq!(name, "TESTLP");
        assert_eq!(p.sense, ObjectiveSense::Maximize);
        assert_eq!((p.nrows, p.ncols), (3, 3));
        assert_eq!(p.neq, 1);
        assert_eq!(p.objective, vec![1., 2., -1.]);
        assert_eq!(p.row_senses, vec![RowSense::E, RowSense::G, RowSense::R]);
        assert_eq!(p.rhs, vec![4., 1., 7.]);
        assert_eq!(p.range_values, Some(vec![0., 0., -2.]));
        assert_eq!(p.matrix.get_entry((2, 1)), Some(-1.));
        assert_eq!(p.lower, vec![0., 0., -1e20]);
        assert_eq!(p.upper[0], 4.);
        assert!(is_pos_infinite(p.upper[2]));
        assert_eq!(
            p.column_types,
            Some(vec![ColumnType::C, ColumnType::I, ColumnType::C])
        );

        let Q = p.quadratic.as_ref().unwrap();
        assert_eq!(Q.get_entry((0, 1)), Some(0.5));
        assert_eq!(Q.get_entry((1, 0)), Some(0.5));
        assert!(p.check_format().is_ok());
    }

    #[test]
    fn test_mps_write_then_read() {
        let A = SparseMatrix::from_triplets(
            3,
            3,
            &[(0, 0, 1.), (0, 1, 1.), (1, 0, 1.), (1, 2, -1.), (2, 1, 2.)],
        );
        let p = Problem::new(
            ObjectiveSense::Minimize,
            vec![1., 0., 0.5],
            A,
            vec![RowSense::E, RowSense::L, RowSense::R],
            vec![1., 3., 2.],
            vec![0., -1e20, 1.],
            vec![1e20, 5., 1.],
            1,
        )
        .with_range_values(vec![0., 0., -1.5])
        .with_quadratic(SparseMatrix::identity(3))
        .with_column_types(vec![ColumnType::I, ColumnType::B, ColumnType::C])
        .with_semicontinuous(vec![0]);

        let mut buf = Vec::new();
        MpsFormat.write(&p, "roundtrip", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("'INTORG'"));
        assert!(text.contains(" SC BND  x1  1e20"));
        assert!(text.contains(" BV BND  x2"));
        assert!(text.contains(" FX BND  x3  1"));

        let (name, q) = read_str(&text).unwrap();
        assert_eq!(name, "roundtrip");
        assert_eq!(q.objective, p.objective);
        assert_eq!(q.rhs, p.rhs);
        assert_eq!(q.row_senses, p.row_senses);
        assert_eq!(q.range_values, p.range_values);
        assert_eq!(q.lower, vec![0., 0., 1.]);
        assert_eq!(q.upper, vec![1e20, 1., 1.]);
        assert_eq!(q.neq, 1);
        assert_eq!(q.column_types, p.effective_column_types());
        assert_eq!(q.matrix.to_colptr(), p.matrix.to_colptr());
        assert_eq!(q.quadratic, Some(SparseMatrix::identity(3)));
    }

    #[test]
    fn test_mps_errors() {
        let err = read_str("ROWS\n N obj\n E c1\nCOLUMNS\n    x1 c2 1\nENDATA\n");
        assert!(matches!(err, Err(ProblemFileError::Parse { line: 5, .. })));

        let err = read_str("FOO\n");
        assert!(matches!(err, Err(ProblemFileError::Parse { line: 1, .. })));

        let err = read_str("ROWS\n N obj\nCOLUMNS\n    x1 obj abc\n");
        assert!(matches!(err, Err(ProblemFileError::Parse { line: 4, .. })));
    }
}
