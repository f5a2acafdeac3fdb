use serde::{Deserialize, Serialize};

/// Engine-neutral termination status

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default, Serialize, Deserialize)]
pub enum SolveStatus {
    /// No optimizer has run (e.g. save-only sessions).
    #[default]
    Unset = 0,
    /// Optimal solution found.
    Optimal = 1,
    /// Solution found to reduced accuracy.
    OptimalInaccurate = 2,
    /// Problem is infeasible.
    Infeasible = 3,
    /// Problem is unbounded.
    Unbounded = 4,
    /// Problem is infeasible or unbounded, the engine could not tell which.
    InfeasibleOrUnbounded = 5,
    /// Iteration limit reached.
    IterationLimit = 6,
    /// Time limit reached.
    TimeLimit = 7,
    /// Objective bound or target reached before optimality was proven.
    ObjectiveLimit = 8,
    /// Engine terminated with a numerical error.
    NumericalError = 9,
    /// Engine terminated due to lack of progress.
    InsufficientProgress = 10,
    /// Any other engine status.
    Unknown = 99,
}

impl SolveStatus {
    /// stable integer code of the status
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// true if the result carries a usable primal solution
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::OptimalInaccurate)
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Result of a solve session, filled in place by
/// [`SolveSession::solve_into`](crate::solver::SolveSession::solve_into).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    /// termination status
    pub status: SolveStatus,
    /// objective value, NaN until extracted
    pub objective: f64,
    /// primal solution, one entry per column
    pub x: Vec<f64>,
    /// row multipliers, one entry per row.  Non-equality rows come
    /// first, equality rows last.   All zero for MIPs.
    pub lambda: Vec<f64>,
    /// wall clock time of the session in seconds
    pub solve_time: f64,
}

impl SolveResult {
    /// an unset result sized for `ncols` columns and `nrows` rows
    pub fn new(ncols: usize, nrows: usize) -> Self {
        Self {
            status: SolveStatus::Unset,
            objective: f64::NAN,
            x: vec![0.0; ncols],
            lambda: vec![0.0; nrows],
            solve_time: 0.0,
        }
    }

    /// restore the unset state and resize the vectors
    pub fn reset(&mut self, ncols: usize, nrows: usize) {
        self.status = SolveStatus::Unset;
        self.objective = f64::NAN;
        self.x.clear();
        self.x.resize(ncols, 0.0);
        self.lambda.clear();
        self.lambda.resize(nrows, 0.0);
        self.solve_time = 0.0;
    }
}

impl Default for SolveResult {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[test]
fn test_result_reset() {
    let mut r = SolveResult::new(2, 3);
    assert!(r.objective.is_nan());
    assert_eq!(r.status.code(), 0);

    r.status = SolveStatus::Optimal;
    r.objective = 1.0;
    r.x = vec![1.0; 5];
    r.reset(2, 1);
    assert_eq!(r.status, SolveStatus::Unset);
    assert!(r.objective.is_nan());
    assert_eq!(r.x, vec![0.0; 2]);
    assert_eq!(r.lambda, vec![0.0]);
}
