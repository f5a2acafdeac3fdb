#![allow(non_snake_case)]

use optbind::algebra::*;
use optbind::io::PrintSink;
use optbind::solver::*;
use std::sync::Arc;

// min -x0 - 2x1
// s.t.  x0 + x1 <= 4
//       x0 - x1 >= -2
//       0 <= x0, 0 <= x1 <= 3

fn problem_data() -> Problem {
    let A = SparseMatrix::new(
        2,                     // nrows
        2,                     // ncols
        vec![0, 2],            // column_start
        vec![2, 2],            // column_count
        vec![0, 1, 0, 1],      // row_index
        vec![1., 1., 1., -1.], // value
    );

    Problem::new(
        ObjectiveSense::Minimize,
        vec![-1., -2.],
        A,
        vec![RowSense::L, RowSense::G],
        vec![4., -2.],
        vec![0., 0.],
        vec![get_infinity(), 3.],
        0,
    )
}

fn main() {
    let problem = problem_data();

    let options = SolveOptionsBuilder::default()
        .verbosity(1u32)
        .build()
        .unwrap();

    let stdout = Arc::new(PrintSink::stdout());
    let diagnostics = Diagnostics::new(stdout.clone(), stdout);
    let session = SolveSession::with_diagnostics(ClarabelBackend::default(), diagnostics);

    match session.solve("example_lp", &problem, &options) {
        Ok(result) => {
            println!("status    = {}", result.status);
            println!("objective = {}", result.objective);
            println!("x         = {:?}", result.x);
            println!("lambda    = {:?}", result.lambda);
        }
        Err(e) => println!("solve failed: {}", e),
    }
}
