use crate::algebra::SparseFormatError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Sparse matrix in compressed-column form with explicit column counts.
///
/// Each column `j` occupies the entries
/// `column_start[j] .. column_start[j] + column_count[j]` of the
/// `row_index` and `value` arrays.   This is the layout accepted by most
/// commercial optimization engines, and it allows unused space between
/// columns.
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use optbind::algebra::SparseMatrix;
///
/// let A = SparseMatrix::new(
///    3,                                // nrows
///    3,                                // ncols
///    vec![0, 2, 4],                    // column_start
///    vec![2, 2, 3],                    // column_count
///    vec![0, 1, 0, 2, 0, 1, 2],        // row_index
///    vec![1., 2., 3., 4., 5., 6., 7.], // value
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
///
/// ```
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    /// number of rows
    pub nrows: usize,
    /// number of columns
    pub ncols: usize,
    /// offset of the first entry of each column
    pub column_start: Vec<usize>,
    /// number of entries in each column
    pub column_count: Vec<usize>,
    /// row index of each entry
    pub row_index: Vec<usize>,
    /// value of each entry
    pub value: Vec<f64>,
}

impl SparseMatrix {
    /// `SparseMatrix` constructor.
    ///
    /// # Panics
    /// Panics if the array lengths disagree with `ncols` or with each
    /// other.  Row bounds and column overlap are __not__ checked here;
    /// use [`check_format`](SparseMatrix::check_format) for that.
    pub fn new(
        nrows: usize,
        ncols: usize,
        column_start: Vec<usize>,
        column_count: Vec<usize>,
        row_index: Vec<usize>,
        value: Vec<f64>,
    ) -> Self {
        assert_eq!(column_start.len(), ncols);
        assert_eq!(column_count.len(), ncols);
        assert_eq!(row_index.len(), value.len());
        SparseMatrix {
            nrows,
            ncols,
            column_start,
            column_count,
            row_index,
            value,
        }
    }

    /// Build from a standard CSC column pointer of length `ncols + 1`.
    ///
    /// # Panics
    /// Panics if `colptr` has the wrong length or does not end at the
    /// number of entries.
    pub fn from_colptr(
        nrows: usize,
        ncols: usize,
        colptr: Vec<usize>,
        rowval: Vec<usize>,
        nzval: Vec<f64>,
    ) -> Self {
        assert_eq!(colptr.len(), ncols + 1);
        assert_eq!(colptr[ncols], rowval.len());
        let column_count = colptr.windows(2).map(|w| w[1] - w[0]).collect();
        let mut column_start = colptr;
        column_start.truncate(ncols);
        SparseMatrix::new(nrows, ncols, column_start, column_count, rowval, nzval)
    }

    /// Build from `(row, col, value)` triplets.  Entries in each column are
    /// sorted by row and repeated positions are summed.
    ///
    /// # Panics
    /// Panics if any triplet lies outside the matrix.
    pub fn from_triplets(nrows: usize, ncols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ncols];
        for &(row, col, v) in triplets {
            assert!(row < nrows && col < ncols);
            columns[col].push((row, v));
        }

        let mut colptr = Vec::with_capacity(ncols + 1);
        let mut rowval = Vec::with_capacity(triplets.len());
        let mut nzval = Vec::with_capacity(triplets.len());
        colptr.push(0);

        for mut entries in columns {
            entries.sort_by_key(|&(row, _)| row);
            let first = rowval.len();
            for (row, v) in entries {
                match nzval.last_mut() {
                    Some(last) if rowval.len() > first && rowval.last() == Some(&row) => {
                        *last += v;
                    }
                    _ => {
                        rowval.push(row);
                        nzval.push(v);
                    }
                }
            }
            colptr.push(rowval.len());
        }
        SparseMatrix::from_colptr(nrows, ncols, colptr, rowval, nzval)
    }

    /// An `nrows` x `ncols` matrix with no entries
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        SparseMatrix::new(
            nrows,
            ncols,
            vec![0; ncols],
            vec![0; ncols],
            Vec::new(),
            Vec::new(),
        )
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        SparseMatrix::new(
            n,
            n,
            (0..n).collect(),
            vec![1; n],
            (0..n).collect(),
            vec![1.0; n],
        )
    }

    /// (nrows, ncols)
    pub fn size(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// number of structural entries, i.e. the sum of the column counts
    pub fn nnz(&self) -> usize {
        self.column_count.iter().sum()
    }

    /// Entry positions occupied by column `col`
    pub fn column_range(&self, col: usize) -> Range<usize> {
        let first = self.column_start[col];
        first..first + self.column_count[col]
    }

    /// Iterate over the `(row, value)` entries of column `col`
    pub fn column(&self, col: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let rng = self.column_range(col);
        self.row_index[rng.clone()]
            .iter()
            .copied()
            .zip(self.value[rng].iter().copied())
    }

    /// Iterate over all `(row, col, value)` entries in column order
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.ncols).flat_map(move |col| self.column(col).map(move |(row, v)| (row, col, v)))
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.column_start.len() != self.ncols
            || self.column_count.len() != self.ncols
            || self.row_index.len() != self.value.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        let nnz = self.row_index.len();

        //column starts must be monotone and every range must fit
        if self.column_start.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColumnStart);
        }

        for col in 0..self.ncols {
            let rng = self.column_range(col);
            if rng.end > nnz {
                return Err(SparseFormatError::BadColumnStart);
            }
            if col + 1 < self.ncols && rng.end > self.column_start[col + 1] {
                return Err(SparseFormatError::OverlappingColumns(col));
            }

            let rows = &self.row_index[rng.clone()];
            if rows.iter().any(|&r| r >= self.nrows) {
                return Err(SparseFormatError::BadRowIndex(col));
            }
            if self.value[rng].iter().any(|v| !v.is_finite()) {
                return Err(SparseFormatError::NonFiniteValue(col));
            }

            //rows need not be sorted, but may not repeat
            let mut sorted = rows.to_vec();
            sorted.sort_unstable();
            if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
                return Err(SparseFormatError::DuplicateEntry { row: w[0], col });
            }
        }

        Ok(())
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<f64> {
        let (row, col) = idx;
        assert!(row < self.nrows && col < self.ncols);
        self.column(col).find(|&(r, _)| r == row).map(|(_, v)| v)
    }

    /// Standard CSC arrays `(colptr, rowval, nzval)` with no gaps between
    /// columns and entries sorted by increasing row within each column.
    pub fn to_colptr(&self) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
        let nnz = self.nnz();
        let mut colptr = Vec::with_capacity(self.ncols + 1);
        let mut rowval = Vec::with_capacity(nnz);
        let mut nzval = Vec::with_capacity(nnz);
        colptr.push(0);

        for col in 0..self.ncols {
            let mut entries: Vec<(usize, f64)> = self.column(col).collect();
            entries.sort_by_key(|&(row, _)| row);
            for (row, v) in entries {
                rowval.push(row);
                nzval.push(v);
            }
            colptr.push(rowval.len());
        }
        (colptr, rowval, nzval)
    }
}

#[test]
fn test_sparse_get_entry() {
    // A =
    //[ ⋅   4.0    ⋅    ⋅   12.0]
    //[1.0  5.0    ⋅    ⋅     ⋅ ]
    //[ ⋅   6.0    ⋅    ⋅   13.0]
    //[2.0  7.0  10.0   ⋅     ⋅ ]
    //[ ⋅   8.0  11.0   ⋅   14.0]
    //[3.0  9.0    ⋅    ⋅     ⋅ ]

    let A = SparseMatrix::from_colptr(
        6,                                                                 // nrows
        5,                                                                 // ncols
        vec![0, 3, 9, 11, 11, 14],                                         // colptr
        vec![1, 3, 5, 0, 1, 2, 3, 4, 5, 3, 4, 0, 2, 4],                    // rowval
        vec![1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.], // nzval
    );

    assert_eq!(A.get_entry((1, 0)).unwrap(), 1.);
    assert_eq!(A.get_entry((5, 0)).unwrap(), 3.);
    assert_eq!(A.get_entry((0, 1)).unwrap(), 4.);
    assert_eq!(A.get_entry((3, 1)).unwrap(), 7.);
    assert_eq!(A.get_entry((4, 2)).unwrap(), 11.);
    assert_eq!(A.get_entry((4, 4)).unwrap(), 14.);

    assert!(A.get_entry((0, 0)).is_none());
    assert!(A.get_entry((2, 2)).is_none());
    assert!(A.get_entry((1, 3)).is_none());
    assert!(A.get_entry((3, 4)).is_none());
}
