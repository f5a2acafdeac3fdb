#![cfg(feature = "clarabel")]
#![allow(non_snake_case)]

mod common;
use common::*;
use optbind::algebra::SparseMatrix;
use optbind::io::{read_problem_file, PrintSink};
use optbind::solver::*;
use std::sync::Arc;

fn clarabel_solve(problem: &Problem, options: &SolveOptions) -> Result<SolveResult, SolveError> {
    SolveSession::new(ClarabelBackend::default()).solve("test", problem, options)
}

#[test]
fn test_lp_feasible() {
    let result = clarabel_solve(&simple_lp(), &SolveOptions::default()).unwrap();

    assert_eq!(result.status, SolveStatus::Optimal);
    assert_close(result.objective, 1., 1e-6);
    assert_close(result.x[0] + result.x[1], 1., 1e-6);
    assert!(result.x.iter().all(|&x| x >= -1e-8));
    // a >= row of a minimization has a nonnegative multiplier
    assert!(result.lambda[0] >= -1e-8);
    assert_close(result.lambda[0], 1., 1e-6);
}

#[test]
fn test_default_solve() {
    let result = optbind::solve("default", &simple_lp(), &SolveOptions::default()).unwrap();
    assert_close(result.objective, 1., 1e-6);
}

#[test]
fn test_lp_maximize() {
    // max x0 + 2x1  s.t.  x0 + x1 <= 4,  0 <= x1 <= 3,  x0 >= 0
    let A = SparseMatrix::from_triplets(1, 2, &[(0, 0, 1.), (0, 1, 1.)]);
    let problem = Problem::new(
        ObjectiveSense::Maximize,
        vec![1., 2.],
        A,
        vec![RowSense::L],
        vec![4.],
        vec![0., 0.],
        vec![get_infinity(), 3.],
        0,
    );
    let result = clarabel_solve(&problem, &SolveOptions::default()).unwrap();

    assert_eq!(result.status, SolveStatus::Optimal);
    assert_close(result.objective, 7., 1e-6);
    assert_close(result.x[0], 1., 1e-5);
    assert_close(result.x[1], 3., 1e-5);
    // one more unit of rhs is worth one unit of objective
    assert_close(result.lambda[0], 1., 1e-5);
}

#[test]
fn test_lp_range_row() {
    // min x0  s.t.  2 <= x0 + x1 <= 5,  x1 <= 1
    let A = SparseMatrix::from_triplets(1, 2, &[(0, 0, 1.), (0, 1, 1.)]);
    let problem = Problem::new(
        ObjectiveSense::Minimize,
        vec![1., 0.],
        A,
        vec![RowSense::R],
        vec![2.],
        vec![0., 0.],
        vec![get_infinity(), 1.],
        0,
    )
    .with_range_values(vec![3.]);
    let result = clarabel_solve(&problem, &SolveOptions::default()).unwrap();

    assert_close(result.objective, 1., 1e-6);
    assert_close(result.x[1], 1., 1e-5);
}

#[test]
fn test_lp_infeasible() {
    // x0 + x1 >= 1 and x0 + x1 <= 0 with x >= 0
    let A = SparseMatrix::from_triplets(2, 2, &[(0, 0, 1.), (0, 1, 1.), (1, 0, 1.), (1, 1, 1.)]);
    let problem = Problem::new(
        ObjectiveSense::Minimize,
        vec![1., 1.],
        A,
        vec![RowSense::G, RowSense::L],
        vec![1., 0.],
        vec![0., 0.],
        vec![get_infinity(); 2],
        0,
    );

    let session = SolveSession::new(ClarabelBackend::default());
    let mut result = SolveResult::new(2, 2);
    let err = session
        .solve_into("infeasible", &problem, &SolveOptions::default(), &mut result)
        .unwrap_err();

    assert!(matches!(
        err,
        SolveError::Extraction {
            item: ExtractionItem::Objective,
            ..
        }
    ));
    assert_eq!(result.status, SolveStatus::Infeasible);
}

#[test]
fn test_qp_feasible() {
    let result = clarabel_solve(&simple_qp(), &SolveOptions::default()).unwrap();

    assert_eq!(result.status, SolveStatus::Optimal);
    assert_close(result.objective, 0.25, 1e-6);
    assert_close(result.x[0], 0.5, 1e-5);
    assert_close(result.x[1], 0.5, 1e-5);
    assert_close(result.lambda[0], 0.5, 1e-5);
}

#[test]
fn test_mip_is_rejected() {
    let problem = simple_lp().with_column_types(vec![ColumnType::I, ColumnType::C]);
    let err = clarabel_solve(&problem, &SolveOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        SolveError::Optimize {
            kind: ProblemKind::MixedInteger,
            ..
        }
    ));

    // all continuous tags are fine
    let problem = simple_lp().with_column_types(vec![ColumnType::C, ColumnType::C]);
    let result = clarabel_solve(&problem, &SolveOptions::default()).unwrap();
    assert_close(result.objective, 1., 1e-6);
    assert_eq!(result.lambda, vec![0.]);
}

#[test]
fn test_tuning_parameters() {
    let options = SolveOptionsBuilder::default()
        .parameter(("max_iter".to_string(), ParamValue::from(100)))
        .parameter(("tol_gap_abs".to_string(), ParamValue::from(1e-9)))
        .build()
        .unwrap();
    let result = clarabel_solve(&simple_lp(), &options).unwrap();
    assert_close(result.objective, 1., 1e-6);

    let options = SolveOptionsBuilder::default()
        .parameter(("no_such_option".to_string(), ParamValue::from(1)))
        .build()
        .unwrap();
    let err = clarabel_solve(&simple_lp(), &options).unwrap_err();
    assert!(matches!(err, SolveError::Configuration(_)));

    let options = SolveOptionsBuilder::default()
        .parameter(("max_iter".to_string(), ParamValue::from("many")))
        .build()
        .unwrap();
    let err = clarabel_solve(&simple_lp(), &options).unwrap_err();
    assert!(matches!(err, SolveError::Configuration(_)));
}

#[test]
fn test_transport_lp() {
    let problem = transport_lp();
    let result = clarabel_solve(&problem, &SolveOptions::default()).unwrap();

    assert_eq!(result.status, SolveStatus::Optimal);
    assert_close(result.objective, problem.objective_at(&result.x), 1e-6);

    let x = &result.x;
    for (i, cap) in [20., 30., 25.].iter().enumerate() {
        let shipped: f64 = x[i * 4..i * 4 + 4].iter().sum();
        assert!(shipped <= cap + 1e-6);
    }
    for (j, need) in [10., 25., 15., 20.].iter().enumerate() {
        let received: f64 = (0..3).map(|i| x[i * 4 + j]).sum();
        assert!(received >= need - 1e-6);
    }
}

#[test]
fn test_iteration_limit() {
    let options = SolveOptionsBuilder::default()
        .parameter(("max_iter".to_string(), ParamValue::from(1)))
        .build()
        .unwrap();
    let result = clarabel_solve(&transport_lp(), &options).unwrap();

    // the last iterate is still reported
    assert_eq!(result.status, SolveStatus::IterationLimit);
    assert_eq!(result.x.len(), 12);
    assert_eq!(result.lambda.len(), 7);
    assert!(result.objective.is_finite());
    assert!(result.x.iter().all(|v| v.is_finite()));
}

#[test]
fn test_simplex_request_warns() {
    let info = Arc::new(PrintSink::buffer());
    let diagnostics = Diagnostics::default().with_info_sink(info.clone());
    let options = SolveOptionsBuilder::default()
        .algorithm(AlgorithmSelector::DualSimplex)
        .build()
        .unwrap();

    let result = SolveSession::with_diagnostics(ClarabelBackend::default(), diagnostics)
        .solve("dual", &simple_lp(), &options)
        .unwrap();

    assert_close(result.objective, 1., 1e-6);
    assert!(info.contents().unwrap().contains("not available"));
}

#[test]
fn test_verbose_log() {
    let info = Arc::new(PrintSink::buffer());
    let diagnostics = Diagnostics::default().with_info_sink(info.clone());
    let options = SolveOptionsBuilder::default().verbosity(1u32).build().unwrap();

    SolveSession::with_diagnostics(ClarabelBackend::default(), diagnostics)
        .solve("verbose", &simple_lp(), &options)
        .unwrap();

    let text = info.contents().unwrap();
    assert!(text.contains("iterations"));
    assert!(text.contains("verbose: status"));
}

#[test]
fn test_persisted_problem_gives_same_objective() {
    let dir = tempfile::tempdir().unwrap();
    let problem = simple_qp();
    let direct = clarabel_solve(&problem, &SolveOptions::default()).unwrap();

    for file in ["persist.mps", "persist.json"] {
        let path = dir.path().join(file);
        let options = SolveOptionsBuilder::default()
            .output_file(path.clone())
            .build()
            .unwrap();
        let first = clarabel_solve(&problem, &options).unwrap();
        assert_close(first.objective, direct.objective, 1e-9);

        let (name, reread) = read_problem_file(&path).unwrap();
        assert_eq!(name, "test");
        let again = clarabel_solve(&reread, &SolveOptions::default()).unwrap();
        assert_close(again.objective, direct.objective, 1e-6);
    }
}

#[test]
fn test_save_only_writes_lp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved");
    let options = SolveOptionsBuilder::default()
        .output_file(path.clone())
        .save_only(true)
        .build()
        .unwrap();

    let result = clarabel_solve(&simple_qp(), &options).unwrap();
    assert_eq!(result.status, SolveStatus::Unset);
    assert!(result.objective.is_nan());

    // no extension falls back to LP text
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.is_empty());
    assert!(text.contains("[ 1 x1 ^ 2 + 1 x2 ^ 2 ] / 2"));
    assert!(text.contains(" x1 free"));
}
