#![allow(non_snake_case)]

use optbind::algebra::*;
use optbind::io::read_problem_file;
use optbind::solver::*;

// max 5x0 + 4x1 + 3x2
// s.t.  2x0 + 3x1 + x2 <= 5
//       4x0 + x1 + 2x2 <= 11
//       3x0 + 4x1 + 2x2 <= 8
//       x >= 0

fn problem_data() -> Problem {
    let A = SparseMatrix::from_triplets(
        3,
        3,
        &[
            (0, 0, 2.), (0, 1, 3.), (0, 2, 1.),
            (1, 0, 4.), (1, 1, 1.), (1, 2, 2.),
            (2, 0, 3.), (2, 1, 4.), (2, 2, 2.),
        ],
    );

    Problem::new(
        ObjectiveSense::Maximize,
        vec![5., 4., 3.],
        A,
        vec![RowSense::L; 3],
        vec![5., 11., 8.],
        vec![0.; 3],
        vec![get_infinity(); 3],
        0,
    )
}

fn main() {
    let problem = problem_data();
    let path = std::env::temp_dir().join("example_save_only.mps");

    // write the problem without solving it
    let options = SolveOptionsBuilder::default()
        .output_file(path.clone())
        .save_only(true)
        .build()
        .unwrap();

    if let Err(e) = optbind::solve("example_save_only", &problem, &options) {
        println!("save failed: {}", e);
        return;
    }
    println!("problem written to {}", path.display());

    // read it back and solve the copy
    let (name, copy) = match read_problem_file(&path) {
        Ok(p) => p,
        Err(e) => {
            println!("read failed: {}", e);
            return;
        }
    };

    match optbind::solve(&name, &copy, &SolveOptions::default()) {
        Ok(result) => println!(
            "{}: status {}, objective {}",
            name, result.status, result.objective
        ),
        Err(e) => println!("solve failed: {}", e),
    }
}
