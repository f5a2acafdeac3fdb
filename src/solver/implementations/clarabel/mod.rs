//! Interior point backend for LP and QP problems.
//!
//! Problems are converted to the conic form solved by `clarabel`:
//! equality rows become a zero cone, one-sided rows, both sides of
//! range rows and finite column bounds become a nonnegative cone.
//! Row multipliers are recovered from the conic duals and signed as
//! the sensitivity of the objective to each right-hand side.

mod conversion;
mod environment;
mod params;

pub use environment::*;
