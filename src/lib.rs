//! __optbind__ is a solve session manager for sparse linear, quadratic and
//! mixed-integer optimization problems.   It binds a problem description
//! to an external optimization engine and drives the engine through one
//! complete solve:
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize (or maximize)} & c^T x + \frac{1}{2}x^T Q x\\\\\[2ex\]
//!  \text{subject to} & A x \; (\le, =, \ge, \text{in range}) \; b \\\\\[1ex\]
//!         & l \le x \le u, \quad x_j \text{ integer, binary or semi-continuous}
//!  \end{array}
//! $$
//!
//! A [`SolveSession`](crate::solver::SolveSession) opens an engine
//! environment, attaches message channels, applies options, loads the
//! problem, optionally writes it to a file, runs the optimizer matching
//! the problem kind, extracts the solution, and always tears the engine
//! down again.   Every outcome is either a complete
//! [`SolveResult`](crate::solver::SolveResult) or a typed
//! [`SolveError`](crate::solver::SolveError).
//!
//! ## Features
//!
//! * __Engines__: an interior point backend built on `clarabel` for LP and
//!   QP problems (feature `clarabel`, enabled by default) and a HiGHS
//!   backend for LP and MIP problems (feature `highs`).   New engines are
//!   added by implementing the [engine traits](crate::solver::traits).
//!
//! * __Problem files__: problems can be written as CPLEX LP, free MPS or
//!   JSON files, and MPS or JSON files read back, see [`io`].
//!
//! * __Diagnostics__: engine messages are routed to caller supplied
//!   sinks.   By default they are forwarded to `tracing`.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

#![allow(non_snake_case)]

/// crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod solver;
pub mod timers;

#[cfg(any(feature = "clarabel", feature = "highs"))]
pub use crate::solver::solve;
