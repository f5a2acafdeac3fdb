//! Required traits for types providing an optimization engine.
//!
//! A session drives an engine through two mutually associated types:
//! a [`SolverBackend`] that opens environments, and the
//! [`SolverEnvironment`] it produces.   The environment owns engine
//! state (parameters, message channels) and creates problem objects,
//! loads data into them, optimizes and answers solution queries.
//!
//! The shape follows the C interfaces of commercial engines:  every
//! call returns a status, and all problem data moves in bulk.
//!
//! In nearly all cases there is no need for a user to implement these
//! traits.   Instead, use one of the backends provided in
//! [implementations](crate::solver::implementations).

use super::error::BackendError;
use super::problem::{ColumnType, LinearData};
use super::settings::ParamValue;
use super::solution::SolveStatus;
use crate::algebra::SparseMatrix;
use std::path::Path;
use std::sync::Arc;

/// Engine message channels
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Channel {
    /// error messages
    Error,
    /// warnings
    Warning,
    /// results and summaries
    Results,
    /// progress log
    Log,
}

impl Channel {
    /// all channels, in attachment order
    pub const ALL: [Channel; 4] = [
        Channel::Error,
        Channel::Warning,
        Channel::Results,
        Channel::Log,
    ];
}

/// Destination for engine messages
pub trait MessageSink: Send + Sync {
    /// receive one message
    fn message(&self, text: &str);
}

/// Handle identifying a sink attached to a channel
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub struct SinkId(pub usize);

/// Integer engine parameters written by a session
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum IntParam {
    /// engine output to the terminal, 0 = off
    ScreenOutput,
    /// engine display level
    SimplexDisplay,
    /// algorithm for continuous problems, see [`LpMethod`]
    LpMethod,
    /// crossover after barrier, see [`LpMethod`] for values
    BarrierCrossover,
}

/// Engine algorithm identifiers
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LpMethod {
    /// no explicit method
    None,
    /// engine chooses
    Automatic,
    /// primal simplex
    Primal,
    /// dual simplex
    Dual,
    /// network simplex
    Network,
    /// barrier
    Barrier,
    /// sifting
    Sifting,
    /// concurrent optimizers
    Concurrent,
}

impl LpMethod {
    /// integer value written to the engine
    pub fn id(&self) -> i64 {
        match self {
            LpMethod::None => -1,
            LpMethod::Automatic => 0,
            LpMethod::Primal => 1,
            LpMethod::Dual => 2,
            LpMethod::Network => 3,
            LpMethod::Barrier => 4,
            LpMethod::Sifting => 5,
            LpMethod::Concurrent => 6,
        }
    }

    /// inverse of [`id`](LpMethod::id)
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            -1 => Some(LpMethod::None),
            0 => Some(LpMethod::Automatic),
            1 => Some(LpMethod::Primal),
            2 => Some(LpMethod::Dual),
            3 => Some(LpMethod::Network),
            4 => Some(LpMethod::Barrier),
            5 => Some(LpMethod::Sifting),
            6 => Some(LpMethod::Concurrent),
            _ => None,
        }
    }
}

/// An optimization engine able to open environments
pub trait SolverBackend {
    /// environment type produced by this backend
    type Environment: SolverEnvironment;

    /// engine name, used in log messages
    fn name(&self) -> &'static str;

    /// Acquire a fresh engine environment
    fn open_environment(&self) -> Result<Self::Environment, BackendError>;
}

/// An open engine environment
///
/// Row and column ranges passed to the solution queries are half open,
/// and `out` must have exactly `end - begin` entries.
pub trait SolverEnvironment: Sized {
    /// in-engine problem object
    type Problem;

    /// Attach a message sink to a channel
    fn add_channel_sink(
        &mut self,
        channel: Channel,
        sink: Arc<dyn MessageSink>,
    ) -> Result<SinkId, BackendError>;

    /// Detach a previously attached sink
    fn remove_channel_sink(&mut self, channel: Channel, id: SinkId) -> Result<(), BackendError>;

    /// Write an integer parameter
    fn set_int_param(&mut self, param: IntParam, value: i64) -> Result<(), BackendError>;

    /// Write a named tuning option
    fn set_parameter(&mut self, name: &str, value: &ParamValue) -> Result<(), BackendError>;

    /// Create an empty problem object
    fn create_problem(&mut self, name: &str) -> Result<Self::Problem, BackendError>;

    /// Load objective, bounds, rows and constraint matrix in one call
    fn copy_lp(&mut self, prob: &mut Self::Problem, data: &LinearData<'_>)
        -> Result<(), BackendError>;

    /// Load the full symmetric quadratic objective matrix
    fn copy_quad(&mut self, prob: &mut Self::Problem, Q: &SparseMatrix)
        -> Result<(), BackendError>;

    /// Load column type tags
    fn copy_ctype(
        &mut self,
        prob: &mut Self::Problem,
        types: &[ColumnType],
    ) -> Result<(), BackendError>;

    /// Write the loaded problem to a file, format chosen by extension
    fn write_problem(&mut self, prob: &Self::Problem, path: &Path) -> Result<(), BackendError>;

    /// Optimize a continuous linear problem
    fn lp_optimize(&mut self, prob: &mut Self::Problem) -> Result<(), BackendError>;

    /// Optimize a continuous quadratic problem
    fn qp_optimize(&mut self, prob: &mut Self::Problem) -> Result<(), BackendError>;

    /// Optimize a problem with column types
    fn mip_optimize(&mut self, prob: &mut Self::Problem) -> Result<(), BackendError>;

    /// number of rows held by the engine
    fn num_rows(&self, prob: &Self::Problem) -> usize;

    /// number of columns held by the engine
    fn num_cols(&self, prob: &Self::Problem) -> usize;

    /// termination status of the last optimization
    fn status(&self, prob: &Self::Problem) -> SolveStatus;

    /// objective value of the last optimization
    fn objective_value(&self, prob: &Self::Problem) -> Result<f64, BackendError>;

    /// primal values of columns `begin..end`
    fn primal_values(
        &self,
        prob: &Self::Problem,
        out: &mut [f64],
        begin: usize,
        end: usize,
    ) -> Result<(), BackendError>;

    /// multipliers of rows `begin..end`
    fn dual_values(
        &self,
        prob: &Self::Problem,
        out: &mut [f64],
        begin: usize,
        end: usize,
    ) -> Result<(), BackendError>;

    /// Destroy a problem object
    fn free_problem(&mut self, prob: Self::Problem) -> Result<(), BackendError>;

    /// Release the environment
    fn close(self) -> Result<(), BackendError>;
}

#[test]
fn test_lp_method_ids() {
    for id in -1..=6 {
        assert_eq!(LpMethod::from_id(id).map(|m| m.id()), Some(id));
    }
    assert!(LpMethod::from_id(7).is_none());
}
