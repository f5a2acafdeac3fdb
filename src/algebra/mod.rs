//! Sparse matrix types used to describe problem data.
//!
//! Constraint and quadratic objective matrices are held in the
//! compressed-column layout expected by optimization engines: a
//! start offset and an entry count per column, followed by the row
//! indices and values of the nonzeros.

mod csc;
mod error_types;

pub use csc::*;
pub use error_types::*;

#[cfg(test)]
mod tests;
