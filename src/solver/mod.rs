//! Solve session main module.
//!
//! This module contains the problem, options and result types, the
//! [`SolveSession`] that drives an engine through a complete solve, and
//! the engine [traits](crate::solver::traits) a backend implements.
//!
//! The crate comes with [backend implementations](crate::solver::implementations)
//! for the `clarabel` interior point solver (LP and QP, enabled by
//! default) and for HiGHS (LP and MIP, feature `highs`).

pub(crate) const _INFINITY_DEFAULT: f64 = 1e20;
// internal module structure
pub(crate) mod core;
pub mod implementations;
pub(crate) mod utils;

//Here we expose only part of the solver internals
//and rearrange public modules a bit to give a more
//user friendly API

pub use crate::solver::utils::infbounds::*;

//user facing traits required to define new backends
pub use crate::solver::core::traits;

//problem data, options, results and the session itself
pub use crate::solver::core::{
    set_lp_method, AlgorithmSelector, BackendError, ColumnType, Diagnostics, ExtractionItem,
    LinearData, LoadStage, ObjectiveSense, ParamValue, Problem, ProblemFormatError, ProblemKind,
    RowSense, SettingsError, SolveError, SolveOptions, SolveOptionsBuilder,
    SolveOptionsBuilderError, SolveResult, SolveSession, SolveStatus, TeardownFailure,
    TeardownStep, TracingSink,
};

#[cfg(feature = "clarabel")]
pub use crate::solver::implementations::clarabel::{
    ClarabelBackend, ClarabelEnvironment, ClarabelModel,
};

#[cfg(feature = "highs")]
pub use crate::solver::implementations::highs::{HighsBackend, HighsEnvironment, HighsModel};

cfg_if::cfg_if! {
    if #[cfg(feature = "clarabel")] {
        /// Backend used by [`solve`]
        pub type DefaultBackend = ClarabelBackend;
    } else if #[cfg(feature = "highs")] {
        /// Backend used by [`solve`]
        pub type DefaultBackend = HighsBackend;
    }
}

/// Solve `problem` with the default backend and `tracing` diagnostics
#[cfg(any(feature = "clarabel", feature = "highs"))]
pub fn solve(
    name: &str,
    problem: &Problem,
    options: &SolveOptions,
) -> Result<SolveResult, SolveError> {
    SolveSession::new(DefaultBackend::default()).solve(name, problem, options)
}
