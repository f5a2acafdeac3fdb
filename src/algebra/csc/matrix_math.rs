use crate::algebra::SparseMatrix;

impl SparseMatrix {
    /// y = A*x
    ///
    /// # Panics
    /// Panics on incompatible vector lengths.
    pub fn mul_vec(&self, y: &mut [f64], x: &[f64]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        y.fill(0.0);
        for (col, &xj) in x.iter().enumerate() {
            for (row, v) in self.column(col) {
                y[row] += v * xj;
            }
        }
    }

    /// x'*A*x for a square matrix
    pub fn quad_form(&self, x: &[f64]) -> f64 {
        assert_eq!(self.nrows, self.ncols);
        assert_eq!(x.len(), self.ncols);
        self.triplets().map(|(row, col, v)| x[row] * v * x[col]).sum()
    }
}
