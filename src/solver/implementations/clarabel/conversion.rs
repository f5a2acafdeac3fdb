#![allow(non_snake_case)]

use crate::algebra::SparseMatrix;
use crate::solver::utils::infbounds::*;
use crate::solver::{LinearData, Problem};
use ::clarabel::algebra::CscMatrix;
use ::clarabel::solver::{DefaultSettings, DefaultSolver, SupportedConeT};

// The conic form solved by clarabel is
//
//   minimize    ½x'Px + q'x
//   subject to  Ax + s = b,  s in K
//
// with K a zero cone (equality rows) followed by a nonnegative cone
// (one-sided rows, both sides of range rows, then finite column
// bounds).  Maximization negates the objective.

pub(crate) struct StandardForm {
    pub P: SparseMatrix,
    pub q: Vec<f64>,
    pub A: SparseMatrix,
    pub b: Vec<f64>,
    pub nzero: usize,
    pub nnonneg: usize,
    // (problem row, sign) for each conic row coming from a problem row
    pub row_map: Vec<(usize, f64)>,
    // +1 minimize, -1 maximize
    pub sigma: f64,
}

impl StandardForm {
    pub fn new(problem: &Problem) -> Self {
        let data = problem.linear_data();
        let sigma = data.sense.sign();
        let n = data.ncols;

        let q = data.objective.iter().map(|c| sigma * c).collect();

        let mut P = match &problem.quadratic {
            Some(Q) => Q.upper_triangle(),
            None => SparseMatrix::zeros(n, n),
        };
        P.value.iter_mut().for_each(|v| *v *= sigma);

        let (zero_rows, nonneg_rows) = split_rows(&data);
        let nzero = zero_rows.len();

        // rows of the constraint matrix are the columns of its transpose
        let At = data.matrix.transpose();
        let mut triplets = Vec::with_capacity(2 * data.matrix.nnz() + 2 * n);
        let mut b = Vec::with_capacity(zero_rows.len() + nonneg_rows.len());
        let mut row_map = Vec::with_capacity(zero_rows.len() + nonneg_rows.len());

        for (row, sign, rhs) in zero_rows.into_iter().chain(nonneg_rows) {
            let k = b.len();
            triplets.extend(At.column(row).map(|(col, v)| (k, col, sign * v)));
            b.push(sign * rhs);
            row_map.push((row, sign));
        }

        // column bounds as x_j <= u and -x_j <= -l
        for j in 0..n {
            if !is_pos_infinite(data.upper[j]) {
                triplets.push((b.len(), j, 1.0));
                b.push(data.upper[j]);
            }
            if !is_neg_infinite(data.lower[j]) {
                triplets.push((b.len(), j, -1.0));
                b.push(-data.lower[j]);
            }
        }

        let m = b.len();
        let A = SparseMatrix::from_triplets(m, n, &triplets);

        StandardForm {
            P,
            q,
            A,
            b,
            nzero,
            nnonneg: m - nzero,
            row_map,
            sigma,
        }
    }

    pub fn cones(&self) -> Vec<SupportedConeT<f64>> {
        let mut cones = Vec::with_capacity(2);
        if self.nzero > 0 {
            cones.push(SupportedConeT::ZeroConeT(self.nzero));
        }
        if self.nnonneg > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(self.nnonneg));
        }
        cones
    }

    pub fn build_solver(&self, settings: DefaultSettings<f64>) -> DefaultSolver<f64> {
        let P = to_csc(&self.P);
        let A = to_csc(&self.A);
        DefaultSolver::new(&P, &self.q, &A, &self.b, &self.cones(), settings)
    }

    /// Row multipliers of the original problem from the conic dual `z`,
    /// signed as the derivative of the objective w.r.t. the row rhs
    pub fn row_duals(&self, z: &[f64], nrows: usize) -> Vec<f64> {
        let mut pi = vec![0.0; nrows];
        for (&(row, sign), zk) in self.row_map.iter().zip(z) {
            pi[row] -= self.sigma * sign * zk;
        }
        pi
    }

    pub fn objective(&self, obj_val: f64) -> f64 {
        self.sigma * obj_val
    }
}

// (row, sign, rhs) triples for the zero cone and the nonnegative cone
type ConicRows = Vec<(usize, f64, f64)>;

fn split_rows(data: &LinearData<'_>) -> (ConicRows, ConicRows) {
    let mut zero = Vec::new();
    let mut nonneg = Vec::new();

    for i in 0..data.nrows {
        let (lo, hi) = data.row_bounds(i);
        match (lo, hi) {
            (Some(lo), Some(hi)) if lo == hi => {
                zero.push((i, 1.0, hi));
            }
            _ => {
                if let Some(hi) = hi {
                    nonneg.push((i, 1.0, hi));
                }
                if let Some(lo) = lo {
                    nonneg.push((i, -1.0, lo));
                }
            }
        }
    }
    (zero, nonneg)
}

fn to_csc(M: &SparseMatrix) -> CscMatrix<f64> {
    let (colptr, rowval, nzval) = M.to_colptr();
    CscMatrix::new(M.nrows, M.ncols, colptr, rowval, nzval)
}

// ---------------------------------------------------------
// tests
// ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{ObjectiveSense, RowSense};

    // max 2x0 + x1
    // s.t. x0 + x1 == 4        (row 0)
    //      x0 - x1 <= 1        (row 1)
    //      1 <= 0.5x0 + x1 <= 3 (row 2, range)
    //      x0 >= 0, x1 in [-inf, 10]
    fn test_problem() -> Problem {
        let A = SparseMatrix::from_triplets(
            3,
            2,
            &[(0, 0, 1.), (0, 1, 1.), (1, 0, 1.), (1, 1, -1.), (2, 0, 0.5), (2, 1, 1.)],
        );
        Problem::new(
            ObjectiveSense::Maximize,
            vec![2., 1.],
            A,
            vec![RowSense::E, RowSense::L, RowSense::R],
            vec![4., 1., 1.],
            vec![0., -1e20],
            vec![1e20, 10.],
            1,
        )
        .with_range_values(vec![0., 0., 2.])
    }

    #[test]
    fn test_standard_form_rows() {
        let sf = StandardForm::new(&test_problem());

        assert_eq!(sf.sigma, -1.);
        assert_eq!(sf.q, vec![-2., -1.]);
        assert_eq!(sf.nzero, 1);
        // row 1, both sides of row 2, x0 lower, x1 upper
        assert_eq!(sf.nnonneg, 5);
        assert_eq!(sf.b, vec![4., 1., 3., -1., 0., 10.]);
        assert_eq!(sf.row_map, vec![(0, 1.), (1, 1.), (2, 1.), (2, -1.)]);

        assert_eq!(sf.A.get_entry((3, 0)), Some(-0.5));
        assert_eq!(sf.A.get_entry((3, 1)), Some(-1.));
        assert_eq!(sf.A.get_entry((4, 0)), Some(-1.));
        assert_eq!(sf.A.get_entry((5, 1)), Some(1.));
        assert_eq!(sf.cones().len(), 2);
    }

    #[test]
    fn test_row_duals() {
        let sf = StandardForm::new(&test_problem());
        let z = [0.5, 2., 1., 3., 7., 7.];
        // sigma = -1 so pi = sum(sign * z) per row
        assert_eq!(sf.row_duals(&z, 3), vec![0.5, 2., 1. - 3.]);
    }

    #[test]
    fn test_quadratic_upper_triangle() {
        let Q = SparseMatrix::from_triplets(
            2,
            2,
            &[(0, 0, 2.), (0, 1, 1.), (1, 0, 1.), (1, 1, 2.)],
        );
        let p = test_problem().with_quadratic(Q);
        let sf = StandardForm::new(&p);
        assert_eq!(sf.P.nnz(), 3);
        assert_eq!(sf.P.get_entry((0, 1)), Some(-1.));
        assert_eq!(sf.P.get_entry((1, 0)), None);
    }
}
