use crate::algebra::*;
use crate::solver::utils::infbounds::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction of optimization
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub enum ObjectiveSense {
    /// minimize the objective
    #[default]
    Minimize,
    /// maximize the objective
    Maximize,
}

impl ObjectiveSense {
    /// +1 for minimization, -1 for maximization
    pub fn sign(&self) -> f64 {
        match self {
            ObjectiveSense::Minimize => 1.0,
            ObjectiveSense::Maximize => -1.0,
        }
    }
}

/// Sense of a single constraint row
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum RowSense {
    /// `a'x <= rhs`
    L,
    /// `a'x == rhs`
    E,
    /// `a'x >= rhs`
    G,
    /// `a'x` within the range defined by `rhs` and the row's range value
    R,
}

impl RowSense {
    /// Parse a single character code.  Codes are case sensitive.
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'L' => Some(RowSense::L),
            'E' => Some(RowSense::E),
            'G' => Some(RowSense::G),
            'R' => Some(RowSense::R),
            _ => None,
        }
    }

    /// single character code
    pub fn code(&self) -> char {
        match self {
            RowSense::L => 'L',
            RowSense::E => 'E',
            RowSense::G => 'G',
            RowSense::R => 'R',
        }
    }
}

/// Variable type tag of a single column
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ColumnType {
    /// continuous
    C,
    /// general integer
    I,
    /// binary
    B,
    /// semi-continuous: zero or within `[lower, upper]`
    S,
    /// semi-integer: zero or an integer within `[lower, upper]`
    N,
}

impl ColumnType {
    /// Parse a single character code.  Codes are case sensitive.
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'C' => Some(ColumnType::C),
            'I' => Some(ColumnType::I),
            'B' => Some(ColumnType::B),
            'S' => Some(ColumnType::S),
            'N' => Some(ColumnType::N),
            _ => None,
        }
    }

    /// single character code
    pub fn code(&self) -> char {
        match self {
            ColumnType::C => 'C',
            ColumnType::I => 'I',
            ColumnType::B => 'B',
            ColumnType::S => 'S',
            ColumnType::N => 'N',
        }
    }

    /// true for any type requiring integral values
    pub fn is_integer(&self) -> bool {
        matches!(self, ColumnType::I | ColumnType::B | ColumnType::N)
    }

    /// true for semi-continuous and semi-integer columns
    pub fn is_semicontinuous(&self) -> bool {
        matches!(self, ColumnType::S | ColumnType::N)
    }
}

/// Class of optimizer required for a problem
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ProblemKind {
    /// no column types and no quadratic objective
    Linear,
    /// quadratic objective, no column types
    Quadratic,
    /// column types present.  A quadratic objective is still loaded.
    MixedInteger,
}

impl std::fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ProblemKind::Linear => write!(f, "LP"),
            ProblemKind::Quadratic => write!(f, "QP"),
            ProblemKind::MixedInteger => write!(f, "MIP"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
/// Error type returned by problem data checks
pub enum ProblemFormatError {
    /// A vector does not have the length implied by `ncols` or `nrows`
    #[error("{field} has length {found}, expected {expected}")]
    BadLength {
        /// name of the offending field
        field: &'static str,
        /// expected length
        expected: usize,
        /// length found
        found: usize,
    },
    /// more equality rows than rows
    #[error("neq = {neq} exceeds nrows = {nrows}")]
    BadEqualityCount {
        /// declared equality rows
        neq: usize,
        /// number of rows
        nrows: usize,
    },
    /// a matrix has the wrong shape
    #[error("{field} is {found:?}, expected {expected:?}")]
    BadShape {
        /// name of the offending field
        field: &'static str,
        /// expected (nrows, ncols)
        expected: (usize, usize),
        /// shape found
        found: (usize, usize),
    },
    /// malformed sparse matrix
    #[error("bad {field} matrix: {source}")]
    Matrix {
        /// name of the offending field
        field: &'static str,
        /// the underlying format problem
        #[source]
        source: SparseFormatError,
    },
    /// quadratic objective matrix is not symmetric
    #[error("quadratic objective matrix is not symmetric")]
    AsymmetricQuadratic,
    /// lower bound above upper bound
    #[error("column {0} has lower bound above its upper bound")]
    InvertedBounds(usize),
    /// NaN in the problem vectors
    #[error("{field} contains NaN at position {index}")]
    NaN {
        /// name of the offending field
        field: &'static str,
        /// position of the NaN
        index: usize,
    },
    /// semi-continuous index outside the column range
    #[error("semi-continuous index {0} is out of range")]
    BadSemicontinuousIndex(usize),
}

/// Problem data describing an LP, QP or MIP
///
/// ```text
/// minimize (or maximize)   c'x + ½ x'Qx
/// subject to               A x  (<=, ==, >=, in range)  rhs
///                          lower <= x <= upper
///                          x_j integer / binary / semi-continuous per column type
/// ```
///
/// Bounds and right-hand sides at or beyond the unbounded sentinel
/// (see [`get_infinity`](crate::solver::get_infinity)) are infinite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// objective direction
    pub sense: ObjectiveSense,
    /// number of columns (variables)
    pub ncols: usize,
    /// number of rows (constraints)
    pub nrows: usize,
    /// number of equality rows.  Only used to order the multipliers.
    pub neq: usize,
    /// linear objective coefficients
    pub objective: Vec<f64>,
    /// column lower bounds
    pub lower: Vec<f64>,
    /// column upper bounds
    pub upper: Vec<f64>,
    /// row right-hand sides
    pub rhs: Vec<f64>,
    /// row senses
    pub row_senses: Vec<RowSense>,
    /// range values for `R` rows, zero when absent
    pub range_values: Option<Vec<f64>>,
    /// constraint matrix, `nrows x ncols`
    pub matrix: SparseMatrix,
    /// full symmetric quadratic objective matrix, `ncols x ncols`
    pub quadratic: Option<SparseMatrix>,
    /// column type tags.  Their presence makes the problem a MIP.
    pub column_types: Option<Vec<ColumnType>>,
    /// indices of semi-continuous columns
    pub semicontinuous: Option<Vec<usize>>,
}

/// Borrowed view of the linear part of a [`Problem`], loaded by
/// an engine in a single call.
#[derive(Debug, Clone, Copy)]
pub struct LinearData<'a> {
    /// objective direction
    pub sense: ObjectiveSense,
    /// number of columns
    pub ncols: usize,
    /// number of rows
    pub nrows: usize,
    /// linear objective coefficients
    pub objective: &'a [f64],
    /// column lower bounds
    pub lower: &'a [f64],
    /// column upper bounds
    pub upper: &'a [f64],
    /// row right-hand sides
    pub rhs: &'a [f64],
    /// row senses
    pub row_senses: &'a [RowSense],
    /// range values for `R` rows
    pub range_values: Option<&'a [f64]>,
    /// constraint matrix
    pub matrix: &'a SparseMatrix,
}

impl Problem {
    /// Creates a continuous, linear problem.  Quadratic and integer
    /// data can be attached with the `with_*` methods.
    ///
    /// # Panics
    /// Panics if the vector lengths disagree with the matrix shape.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sense: ObjectiveSense,
        objective: Vec<f64>,
        matrix: SparseMatrix,
        row_senses: Vec<RowSense>,
        rhs: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
        neq: usize,
    ) -> Self {
        let (nrows, ncols) = matrix.size();
        assert_eq!(objective.len(), ncols);
        assert_eq!(lower.len(), ncols);
        assert_eq!(upper.len(), ncols);
        assert_eq!(rhs.len(), nrows);
        assert_eq!(row_senses.len(), nrows);
        Problem {
            sense,
            ncols,
            nrows,
            neq,
            objective,
            lower,
            upper,
            rhs,
            row_senses,
            range_values: None,
            matrix,
            quadratic: None,
            column_types: None,
            semicontinuous: None,
        }
    }

    /// attach a full symmetric quadratic objective matrix
    pub fn with_quadratic(mut self, Q: SparseMatrix) -> Self {
        self.quadratic = Some(Q);
        self
    }

    /// attach column type tags
    pub fn with_column_types(mut self, types: Vec<ColumnType>) -> Self {
        self.column_types = Some(types);
        self
    }

    /// attach range values for `R` rows
    pub fn with_range_values(mut self, ranges: Vec<f64>) -> Self {
        self.range_values = Some(ranges);
        self
    }

    /// attach a list of semi-continuous column indices
    pub fn with_semicontinuous(mut self, cols: Vec<usize>) -> Self {
        self.semicontinuous = Some(cols);
        self
    }

    /// the linear part of the problem
    pub fn linear_data(&self) -> LinearData<'_> {
        LinearData {
            sense: self.sense,
            ncols: self.ncols,
            nrows: self.nrows,
            objective: &self.objective,
            lower: &self.lower,
            upper: &self.upper,
            rhs: &self.rhs,
            row_senses: &self.row_senses,
            range_values: self.range_values.as_deref(),
            matrix: &self.matrix,
        }
    }

    /// Column types as submitted to an engine.
    ///
    /// Semi-continuous indices promote their column to `S`, or to `N`
    /// if the column is tagged `I`.   A semi-continuous list without
    /// explicit tags starts from all `C`.   Returns `None` for problems
    /// with neither tags nor a non-empty semi-continuous list.
    pub fn effective_column_types(&self) -> Option<Vec<ColumnType>> {
        let semi = self
            .semicontinuous
            .as_deref()
            .filter(|s| !s.is_empty());

        let mut types = match (&self.column_types, semi) {
            (Some(t), _) => t.clone(),
            (None, Some(_)) => vec![ColumnType::C; self.ncols],
            (None, None) => return None,
        };

        for &j in semi.unwrap_or_default() {
            if let Some(t) = types.get_mut(j) {
                *t = match *t {
                    ColumnType::I | ColumnType::N => ColumnType::N,
                    _ => ColumnType::S,
                };
            }
        }
        Some(types)
    }

    /// Which optimizer the problem requires
    pub fn kind(&self) -> ProblemKind {
        if self.effective_column_types().is_some() {
            ProblemKind::MixedInteger
        } else if self.quadratic.is_some() {
            ProblemKind::Quadratic
        } else {
            ProblemKind::Linear
        }
    }

    /// Objective value `c'x + ½ x'Qx` at `x`
    pub fn objective_at(&self, x: &[f64]) -> f64 {
        let linear: f64 = self.objective.iter().zip(x).map(|(c, x)| c * x).sum();
        match &self.quadratic {
            Some(Q) => linear + 0.5 * Q.quad_form(x),
            None => linear,
        }
    }

    /// Check that problem data is consistently sized and formatted
    pub fn check_format(&self) -> Result<(), ProblemFormatError> {
        self.linear_data().check_format()?;

        if let Some(Q) = &self.quadratic {
            check_quadratic(Q, self.ncols)?;
        }
        if let Some(types) = &self.column_types {
            check_length("column_types", types.len(), self.ncols)?;
        }
        if let Some(semi) = &self.semicontinuous {
            if let Some(&j) = semi.iter().find(|&&j| j >= self.ncols) {
                return Err(ProblemFormatError::BadSemicontinuousIndex(j));
            }
        }
        if self.neq > self.nrows {
            return Err(ProblemFormatError::BadEqualityCount {
                neq: self.neq,
                nrows: self.nrows,
            });
        }
        Ok(())
    }
}

impl<'a> LinearData<'a> {
    /// Check the linear part for consistent sizes, a valid matrix,
    /// no NaNs and ordered column bounds
    pub fn check_format(&self) -> Result<(), ProblemFormatError> {
        check_length("objective", self.objective.len(), self.ncols)?;
        check_length("lower", self.lower.len(), self.ncols)?;
        check_length("upper", self.upper.len(), self.ncols)?;
        check_length("rhs", self.rhs.len(), self.nrows)?;
        check_length("row_senses", self.row_senses.len(), self.nrows)?;
        if let Some(r) = self.range_values {
            check_length("range_values", r.len(), self.nrows)?;
            check_nan("range_values", r)?;
        }

        if self.matrix.size() != (self.nrows, self.ncols) {
            return Err(ProblemFormatError::BadShape {
                field: "matrix",
                expected: (self.nrows, self.ncols),
                found: self.matrix.size(),
            });
        }
        self.matrix
            .check_format()
            .map_err(|source| ProblemFormatError::Matrix {
                field: "matrix",
                source,
            })?;

        check_nan("objective", self.objective)?;
        check_nan("lower", self.lower)?;
        check_nan("upper", self.upper)?;
        check_nan("rhs", self.rhs)?;

        if let Some(j) = (0..self.ncols).find(|&j| self.lower[j] > self.upper[j]) {
            return Err(ProblemFormatError::InvertedBounds(j));
        }
        Ok(())
    }

    /// Finite row bounds `(lo, hi)` for row `i`, with `None` for an
    /// infinite side.  Range rows span `[rhs, rhs + r]` for `r >= 0`
    /// and `[rhs + r, rhs]` otherwise.
    pub fn row_bounds(&self, i: usize) -> (Option<f64>, Option<f64>) {
        let rhs = self.rhs[i];
        let finite = |v: f64| (!is_pos_infinite(v) && !is_neg_infinite(v)).then_some(v);
        match self.row_senses[i] {
            RowSense::L => (None, finite(rhs)),
            RowSense::G => (finite(rhs), None),
            RowSense::E => (finite(rhs), finite(rhs)),
            RowSense::R => {
                let r = self.range_values.map_or(0.0, |r| r[i]);
                if r >= 0.0 {
                    (finite(rhs), finite(rhs + r))
                } else {
                    (finite(rhs + r), finite(rhs))
                }
            }
        }
    }
}

pub(crate) fn check_quadratic(Q: &SparseMatrix, ncols: usize) -> Result<(), ProblemFormatError> {
    if Q.size() != (ncols, ncols) {
        return Err(ProblemFormatError::BadShape {
            field: "quadratic",
            expected: (ncols, ncols),
            found: Q.size(),
        });
    }
    Q.check_format()
        .map_err(|source| ProblemFormatError::Matrix {
            field: "quadratic",
            source,
        })?;
    if !Q.is_symmetric(1e-12) {
        return Err(ProblemFormatError::AsymmetricQuadratic);
    }
    Ok(())
}

fn check_length(
    field: &'static str,
    found: usize,
    expected: usize,
) -> Result<(), ProblemFormatError> {
    if found != expected {
        return Err(ProblemFormatError::BadLength {
            field,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_nan(field: &'static str, v: &[f64]) -> Result<(), ProblemFormatError> {
    match v.iter().position(|x| x.is_nan()) {
        Some(index) => Err(ProblemFormatError::NaN { field, index }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------
// tests
// ---------------------------------------------------------

#[cfg(test)]
fn test_problem() -> Problem {
    // min x0 + x1 s.t. x0 + x1 >= 1, x0 - x1 == 0
    let A = SparseMatrix::from_triplets(2, 2, &[(0, 0, 1.), (0, 1, 1.), (1, 0, 1.), (1, 1, -1.)]);
    Problem::new(
        ObjectiveSense::Minimize,
        vec![1., 1.],
        A,
        vec![RowSense::G, RowSense::E],
        vec![1., 0.],
        vec![0., 0.],
        vec![1e20, 1e20],
        1,
    )
}

#[test]
fn test_problem_kind() {
    let lp = test_problem();
    assert_eq!(lp.kind(), ProblemKind::Linear);
    assert!(lp.check_format().is_ok());

    let qp = test_problem().with_quadratic(SparseMatrix::identity(2));
    assert_eq!(qp.kind(), ProblemKind::Quadratic);

    let mip = qp.clone().with_column_types(vec![ColumnType::C, ColumnType::I]);
    assert_eq!(mip.kind(), ProblemKind::MixedInteger);

    // an empty semi-continuous list adds nothing
    let lp2 = test_problem().with_semicontinuous(vec![]);
    assert_eq!(lp2.kind(), ProblemKind::Linear);
}

#[test]
fn test_semicontinuous_promotion() {
    let p = test_problem().with_semicontinuous(vec![1]);
    assert_eq!(p.kind(), ProblemKind::MixedInteger);
    assert_eq!(
        p.effective_column_types(),
        Some(vec![ColumnType::C, ColumnType::S])
    );

    let p = test_problem()
        .with_column_types(vec![ColumnType::I, ColumnType::I])
        .with_semicontinuous(vec![0]);
    assert_eq!(
        p.effective_column_types(),
        Some(vec![ColumnType::N, ColumnType::I])
    );

    let p = test_problem().with_semicontinuous(vec![2]);
    assert_eq!(
        p.check_format(),
        Err(ProblemFormatError::BadSemicontinuousIndex(2))
    );
}

#[test]
fn test_problem_check_format() {
    let mut p = test_problem();
    p.neq = 3;
    assert!(matches!(
        p.check_format(),
        Err(ProblemFormatError::BadEqualityCount { .. })
    ));

    let mut p = test_problem();
    p.lower[1] = 2e20;
    assert_eq!(p.check_format(), Err(ProblemFormatError::InvertedBounds(1)));

    let mut p = test_problem();
    p.rhs.push(0.);
    assert!(matches!(
        p.check_format(),
        Err(ProblemFormatError::BadLength { field: "rhs", .. })
    ));

    let p = test_problem().with_quadratic(SparseMatrix::from_triplets(2, 2, &[(0, 1, 1.)]));
    assert_eq!(p.check_format(), Err(ProblemFormatError::AsymmetricQuadratic));
}

#[test]
fn test_row_bounds() {
    let mut p = test_problem();
    p.row_senses = vec![RowSense::R, RowSense::R];
    p.rhs = vec![1., 5.];
    p.range_values = Some(vec![2., -3.]);
    let data = p.linear_data();
    assert_eq!(data.row_bounds(0), (Some(1.), Some(3.)));
    assert_eq!(data.row_bounds(1), (Some(2.), Some(5.)));

    p.row_senses = vec![RowSense::L, RowSense::G];
    p.rhs = vec![1e20, 4.];
    let data = p.linear_data();
    assert_eq!(data.row_bounds(0), (None, None));
    assert_eq!(data.row_bounds(1), (Some(4.), None));
}

#[test]
fn test_objective_at() {
    let p = test_problem().with_quadratic(SparseMatrix::identity(2));
    assert_eq!(p.objective_at(&[1., 2.]), 3. + 2.5);
}
