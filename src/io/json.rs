use super::format::*;
use crate::solver::Problem;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

// The problem together with its name, as stored on disk

#[derive(Serialize, Deserialize)]
struct JsonProblemFile {
    pub name: String,
    pub problem: Problem,
}

/// Problem data serialized with `serde_json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonFormat;

impl ProblemFileFormat for JsonFormat {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn write(
        &self,
        problem: &Problem,
        name: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProblemFileError> {
        let mut json_data = JsonProblemFile {
            name: name.to_string(),
            problem: problem.clone(),
        };

        // sanitize values that can't be serialized, i.e. infs
        sanitize_problem(&mut json_data.problem);

        let json = serde_json::to_string(&json_data)?;
        out.write_all(json.as_bytes())?;
        Ok(())
    }

    fn read(&self, input: &mut dyn BufRead) -> Result<(String, Problem), ProblemFileError> {
        let mut buffer = String::new();
        input.read_to_string(&mut buffer)?;
        let mut json_data: JsonProblemFile = serde_json::from_str(&buffer)?;

        // restore sanitized values to their (likely) original values
        desanitize_problem(&mut json_data.problem);

        Ok((json_data.name, json_data.problem))
    }
}

fn bound_vectors(problem: &mut Problem) -> [&mut Vec<f64>; 3] {
    [&mut problem.lower, &mut problem.upper, &mut problem.rhs]
}

fn sanitize_problem(problem: &mut Problem) {
    for v in bound_vectors(problem).into_iter().flat_map(|v| v.iter_mut()) {
        if v.is_infinite() {
            *v = v.signum() * f64::MAX;
        }
    }
}

fn desanitize_problem(problem: &mut Problem) {
    for v in bound_vectors(problem).into_iter().flat_map(|v| v.iter_mut()) {
        if v.abs() == f64::MAX {
            *v = v.signum() * f64::INFINITY;
        }
    }
}

#[test]
fn test_json_io() {
    use crate::algebra::SparseMatrix;
    use crate::solver::{ColumnType, ObjectiveSense, RowSense};
    use std::io::{BufReader, Seek, SeekFrom};

    let A = SparseMatrix::from_triplets(2, 2, &[(0, 0, 1.), (1, 1, 1.)]);
    let p = Problem::new(
        ObjectiveSense::Maximize,
        vec![1., 2.],
        A,
        vec![RowSense::L, RowSense::R],
        vec![4., f64::INFINITY],
        vec![f64::NEG_INFINITY, 0.],
        vec![1e20, 3.],
        0,
    )
    .with_range_values(vec![0., -1.])
    .with_quadratic(SparseMatrix::identity(2))
    .with_column_types(vec![ColumnType::C, ColumnType::I]);

    let mut file = tempfile::tempfile().unwrap();
    JsonFormat.write(&p, "json demo", &mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut input = BufReader::new(file);
    let (name, p2) = JsonFormat.read(&mut input).unwrap();

    assert_eq!(name, "json demo");
    assert_eq!(p, p2);
}
