#![allow(non_snake_case)]

use optbind::algebra::*;
use optbind::solver::*;

// min 3x0² + 2x1² - x0 - 4x1
// s.t.  x0 - 2x1 == 0
//       -1 <= x0 <= 1,  -1 <= x1 <= 1
//       x0 + x1 in [-1, 1]

fn problem_data() -> Problem {
    let A = SparseMatrix::from_triplets(2, 2, &[(0, 0, 1.), (0, 1, -2.), (1, 0, 1.), (1, 1, 1.)]);

    // full symmetric, the objective is c'x + ½x'Qx
    let Q = SparseMatrix::from_triplets(2, 2, &[(0, 0, 6.), (1, 1, 4.)]);

    Problem::new(
        ObjectiveSense::Minimize,
        vec![-1., -4.],
        A,
        vec![RowSense::E, RowSense::R],
        vec![0., -1.],
        vec![-1., -1.],
        vec![1., 1.],
        1,
    )
    .with_range_values(vec![0., 2.])
    .with_quadratic(Q)
}

fn main() {
    let problem = problem_data();

    let options = SolveOptionsBuilder::default()
        .parameter(("max_iter".to_string(), ParamValue::from(50)))
        .parameter(("equilibrate_enable".to_string(), ParamValue::from(true)))
        .build()
        .unwrap();

    match optbind::solve("example_qp", &problem, &options) {
        Ok(result) => {
            println!("status    = {}", result.status);
            println!("objective = {}", result.objective);
            println!("x         = {:?}", result.x);
            println!("solved in {:.3e} seconds", result.solve_time);
        }
        Err(e) => println!("solve failed: {}", e),
    }
}
