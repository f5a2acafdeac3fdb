use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by sparse matrix format checks.
pub enum SparseFormatError {
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    /// Column start offsets are decreasing or point outside the entry arrays
    #[error("Bad column start values")]
    BadColumnStart,
    /// Column ranges overlap the following column
    #[error("Column {0} overlaps the following column")]
    OverlappingColumns(usize),
    /// Row value exceeds the matrix row dimension
    #[error("Row value exceeds the matrix row dimension in column {0}")]
    BadRowIndex(usize),
    /// Same row index appears twice in one column
    #[error("Duplicate entry at row {row}, column {col}")]
    DuplicateEntry {
        /// row of the repeated entry
        row: usize,
        /// column of the repeated entry
        col: usize,
    },
    /// Non-finite coefficient
    #[error("Non-finite value in column {0}")]
    NonFiniteValue(usize),
}
