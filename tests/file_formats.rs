#![allow(non_snake_case)]

mod common;
use common::*;
use optbind::algebra::SparseMatrix;
use optbind::io::*;
use optbind::solver::*;
use std::path::Path;

fn mixed_problem() -> Problem {
    // max 3x0 + 2x1 - x2 + ½ x0²
    // s.t. x0 + x1 + x2 == 10      (c1)
    //      -5 <= x0 - x1 <= 5      (c2)
    //      x1 + 2x2 >= 2           (c3)
    //      x0 in [0, 8] integer, x1 binary, x2 free
    let A = SparseMatrix::from_triplets(
        3,
        3,
        &[
            (0, 0, 1.),
            (0, 1, 1.),
            (0, 2, 1.),
            (1, 0, 1.),
            (1, 1, -1.),
            (2, 1, 1.),
            (2, 2, 2.),
        ],
    );
    Problem::new(
        ObjectiveSense::Maximize,
        vec![3., 2., -1.],
        A,
        vec![RowSense::E, RowSense::R, RowSense::G],
        vec![10., -5., 2.],
        vec![0., 0., -get_infinity()],
        vec![8., 1., get_infinity()],
        1,
    )
    .with_range_values(vec![0., 10., 0.])
    .with_quadratic(SparseMatrix::from_triplets(3, 3, &[(0, 0, 1.)]))
    .with_column_types(vec![ColumnType::I, ColumnType::B, ColumnType::C])
}

#[test]
fn test_mps_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.mps");
    let problem = mixed_problem();

    write_problem_file(&problem, "mixed", &path).unwrap();
    let (name, reread) = read_problem_file(&path).unwrap();

    assert_eq!(name, "mixed");
    assert_eq!(reread.sense, problem.sense);
    assert_eq!(reread.objective, problem.objective);
    assert_eq!(reread.rhs, problem.rhs);
    assert_eq!(reread.row_senses, problem.row_senses);
    assert_eq!(reread.range_values, problem.range_values);
    assert_eq!(reread.lower, problem.lower);
    assert_eq!(reread.upper, problem.upper);
    assert_eq!(reread.neq, 1);
    assert_eq!(reread.column_types, problem.column_types);
    assert_eq!(reread.matrix, problem.matrix);
    assert_eq!(reread.quadratic, problem.quadratic);

    // objective agrees at any point
    let x = [2., 1., 7.];
    assert_eq!(reread.objective_at(&x), problem.objective_at(&x));
}

#[test]
fn test_json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.JSON");
    let problem = mixed_problem().with_semicontinuous(vec![2]);

    write_problem_file(&problem, "mixed json", &path).unwrap();
    let (name, reread) = read_problem_file(&path).unwrap();

    assert_eq!(name, "mixed json");
    assert_eq!(reread, problem);
}

#[test]
fn test_lp_file_is_write_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.lp");

    write_problem_file(&mixed_problem(), "mixed", &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();

    assert!(text.contains("Maximize"));
    assert!(text.contains(" obj: 3 x1 + 2 x2 - 1 x3 + [ 1 x1 ^ 2 ] / 2"));
    assert!(text.contains(" c1: 1 x1 + 1 x2 + 1 x3 = 10"));
    assert!(text.contains(" c2: -5 <= 1 x1 - 1 x2 <= 5"));
    assert!(text.contains(" c3: 1 x2 + 2 x3 >= 2"));
    assert!(text.contains(" 0 <= x1 <= 8"));
    assert!(text.contains(" x3 free"));
    assert!(text.contains("General\n x1\n"));
    assert!(text.contains("Binary\n x2\n"));

    assert!(matches!(
        read_problem_file(&path),
        Err(ProblemFileError::Unsupported("LP"))
    ));
}

#[test]
fn test_unknown_extension_writes_lp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.sav");
    write_problem_file(&simple_lp(), "fallback", &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("\\Problem name: fallback"));
    assert_eq!(FileFormat::from_path(&path), FileFormat::from(LpFormat));
}

#[test]
fn test_write_errors() {
    let path = Path::new("/nonexistent-directory/model.mps");
    assert!(matches!(
        write_problem_file(&simple_lp(), "x", path),
        Err(ProblemFileError::Io(_))
    ));
}

#[test]
fn test_read_rejects_inconsistent_problem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.mps");
    let text = "\
NAME bad
ROWS
 N  obj
 L  c1
COLUMNS
    x1  obj  1  c1  1
RHS
    RHS  c1  1
BOUNDS
 LO BND  x1  5
 UP BND  x1  2
ENDATA
";
    std::fs::write(&path, text).unwrap();
    assert!(matches!(
        read_problem_file(&path),
        Err(ProblemFileError::Format(ProblemFormatError::InvertedBounds(0)))
    ));
}
