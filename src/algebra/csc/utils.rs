//---------------------------------------------------------
// structural transformations of compressed-column matrices
//---------------------------------------------------------

use crate::algebra::SparseMatrix;

impl SparseMatrix {
    /// Allocates the transpose.  Entries in each column of the result are
    /// sorted by row, so the transpose doubles as a row-wise view of `self`.
    pub fn transpose(&self) -> Self {
        let mut counts = vec![0usize; self.nrows];
        for (row, _, _) in self.triplets() {
            counts[row] += 1;
        }

        let mut colptr = Vec::with_capacity(self.nrows + 1);
        let mut total = 0;
        colptr.push(total);
        for c in &counts {
            total += c;
            colptr.push(total);
        }

        let nnz = colptr[self.nrows];
        let mut rowval = vec![0; nnz];
        let mut nzval = vec![0.0; nnz];
        let mut next = colptr.clone();

        //columns are visited in order, so each
        //destination column fills with sorted rows
        for (row, col, v) in self.triplets() {
            let dest = next[row];
            rowval[dest] = col;
            nzval[dest] = v;
            next[row] += 1;
        }

        SparseMatrix::from_colptr(self.ncols, self.nrows, colptr, rowval, nzval)
    }

    /// Allocates a new matrix containing only entries on or above the diagonal
    pub fn upper_triangle(&self) -> Self {
        assert_eq!(self.nrows, self.ncols);
        let (colptr, rowval, nzval) = self.to_colptr();

        let mut tcolptr = Vec::with_capacity(self.ncols + 1);
        let mut trowval = Vec::new();
        let mut tnzval = Vec::new();
        tcolptr.push(0);

        for col in 0..self.ncols {
            for ptr in colptr[col]..colptr[col + 1] {
                if rowval[ptr] <= col {
                    trowval.push(rowval[ptr]);
                    tnzval.push(nzval[ptr]);
                }
            }
            tcolptr.push(trowval.len());
        }
        SparseMatrix::from_colptr(self.nrows, self.ncols, tcolptr, trowval, tnzval)
    }

    /// Mirror an upper triangular matrix into a full symmetric one.
    /// Entries below the diagonal in `self` are ignored.
    pub fn symmetrize_upper(&self) -> Self {
        assert_eq!(self.nrows, self.ncols);
        let mut triplets = Vec::with_capacity(2 * self.nnz());
        for (row, col, v) in self.triplets() {
            if row < col {
                triplets.push((row, col, v));
                triplets.push((col, row, v));
            } else if row == col {
                triplets.push((row, col, v));
            }
        }
        SparseMatrix::from_triplets(self.nrows, self.ncols, &triplets)
    }

    /// True if the matrix is square and equal to its transpose within `tol`
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if self.nrows != self.ncols {
            return false;
        }
        let t = self.transpose();
        let (ap, ai, ax) = self.to_colptr();
        let (tp, ti, tx) = t.to_colptr();

        // compare column by column, treating a missing entry as zero
        for col in 0..self.ncols {
            let mut a = ap[col];
            let mut b = tp[col];
            while a < ap[col + 1] || b < tp[col + 1] {
                let ra = if a < ap[col + 1] { ai[a] } else { usize::MAX };
                let rb = if b < tp[col + 1] { ti[b] } else { usize::MAX };
                let (va, vb) = match ra.cmp(&rb) {
                    std::cmp::Ordering::Equal => {
                        a += 1;
                        b += 1;
                        (ax[a - 1], tx[b - 1])
                    }
                    std::cmp::Ordering::Less => {
                        a += 1;
                        (ax[a - 1], 0.0)
                    }
                    std::cmp::Ordering::Greater => {
                        b += 1;
                        (0.0, tx[b - 1])
                    }
                };
                if (va - vb).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}
