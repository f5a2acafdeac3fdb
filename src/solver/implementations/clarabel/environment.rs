use super::conversion::StandardForm;
use super::params::apply_parameter;
use crate::algebra::SparseMatrix;
use crate::io::write_problem_file;
use crate::solver::core::check_quadratic;
use crate::solver::implementations::*;
use crate::solver::traits::*;
use crate::solver::*;
use ::clarabel::solver::{DefaultSettings, IPSolver, SolverStatus};
use std::path::Path;
use std::sync::Arc;

/// Interior point engine for LP and QP problems, backed by the
/// `clarabel` crate.
///
/// Column types are accepted, but only all-continuous tags can be
/// optimized.   Simplex style algorithm selections fall back to the
/// interior point method with a warning.
#[derive(Debug, Clone)]
pub struct ClarabelBackend {
    /// base settings for every environment.   Named tuning options are
    /// applied on top of a copy.
    pub settings: DefaultSettings<f64>,
}

impl Default for ClarabelBackend {
    fn default() -> Self {
        let mut settings = DefaultSettings::default();
        settings.verbose = false;
        Self { settings }
    }
}

impl ClarabelBackend {
    /// backend with the given base settings
    pub fn new(settings: DefaultSettings<f64>) -> Self {
        Self { settings }
    }
}

impl SolverBackend for ClarabelBackend {
    type Environment = ClarabelEnvironment;

    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn open_environment(&self) -> Result<ClarabelEnvironment, BackendError> {
        Ok(ClarabelEnvironment {
            settings: self.settings.clone(),
            channels: ChannelTable::default(),
            display: 0,
            lp_method: LpMethod::None,
        })
    }
}

/// Open clarabel environment
pub struct ClarabelEnvironment {
    settings: DefaultSettings<f64>,
    channels: ChannelTable,
    display: i64,
    lp_method: LpMethod,
}

/// Problem object of a [`ClarabelEnvironment`]
#[derive(Debug)]
pub struct ClarabelModel {
    name: String,
    problem: Option<Problem>,
    solution: Option<ModelSolution>,
}

#[derive(Debug)]
struct ModelSolution {
    status: SolveStatus,
    objective: f64,
    x: Vec<f64>,
    pi: Vec<f64>,
}

impl ClarabelModel {
    /// name given at creation
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ClarabelEnvironment {
    fn loaded<'a>(&self, model: &'a ClarabelModel) -> Result<&'a Problem, BackendError> {
        model
            .problem
            .as_ref()
            .ok_or_else(|| self.channels.fail(ERR_BAD_DATA, "no problem data loaded"))
    }

    fn loaded_mut<'a>(
        &self,
        model: &'a mut ClarabelModel,
    ) -> Result<&'a mut Problem, BackendError> {
        model
            .problem
            .as_mut()
            .ok_or_else(|| self.channels.fail(ERR_BAD_DATA, "no problem data loaded"))
    }

    fn solution<'a>(&self, model: &'a ClarabelModel) -> Result<&'a ModelSolution, BackendError> {
        match &model.solution {
            Some(sol) if sol.status.has_solution() || has_iterate(sol.status) => Ok(sol),
            Some(sol) => Err(self.channels.fail(
                ERR_NO_SOLUTION,
                format!("no solution exists, status {}", sol.status),
            )),
            None => Err(self.channels.fail(ERR_NO_SOLUTION, "problem has not been optimized")),
        }
    }

    // interior point for every continuous problem
    fn optimize(&mut self, model: &mut ClarabelModel) -> Result<(), BackendError> {
        let problem = self.loaded(model)?;
        let form = StandardForm::new(problem);
        let mut solver = form.build_solver(self.settings.clone());

        solver.solve();
        let sol = &solver.solution;
        let status = map_status(sol.status);

        let solution = ModelSolution {
            status,
            objective: form.objective(sol.obj_val),
            x: sol.x.clone(),
            pi: form.row_duals(&sol.z, problem.nrows),
        };

        if self.display > 0 {
            self.channels.emit(
                Channel::Log,
                &format!(
                    "interior point ({:?} requested): {} iterations, {:.3e} seconds",
                    self.lp_method, sol.iterations, sol.solve_time
                ),
            );
            self.channels.emit(
                Channel::Results,
                &format!(
                    "{}: status {}, objective {:.8e}",
                    model.name, status, solution.objective
                ),
            );
        }

        model.solution = Some(solution);
        Ok(())
    }
}

// statuses that still leave a primal iterate worth reporting
fn has_iterate(status: SolveStatus) -> bool {
    matches!(
        status,
        SolveStatus::IterationLimit
            | SolveStatus::TimeLimit
            | SolveStatus::NumericalError
            | SolveStatus::InsufficientProgress
    )
}

pub(crate) fn map_status(status: SolverStatus) -> SolveStatus {
    match status {
        SolverStatus::Solved => SolveStatus::Optimal,
        SolverStatus::AlmostSolved => SolveStatus::OptimalInaccurate,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            SolveStatus::Infeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            SolveStatus::Unbounded
        }
        SolverStatus::MaxIterations => SolveStatus::IterationLimit,
        SolverStatus::MaxTime => SolveStatus::TimeLimit,
        SolverStatus::NumericalError => SolveStatus::NumericalError,
        SolverStatus::InsufficientProgress => SolveStatus::InsufficientProgress,
        SolverStatus::Unsolved => SolveStatus::Unset,
        #[allow(unreachable_patterns)]
        _ => SolveStatus::Unknown,
    }
}

impl SolverEnvironment for ClarabelEnvironment {
    type Problem = ClarabelModel;

    fn add_channel_sink(
        &mut self,
        channel: Channel,
        sink: Arc<dyn MessageSink>,
    ) -> Result<SinkId, BackendError> {
        Ok(self.channels.add(channel, sink))
    }

    fn remove_channel_sink(&mut self, channel: Channel, id: SinkId) -> Result<(), BackendError> {
        self.channels.remove(channel, id)
    }

    fn set_int_param(&mut self, param: IntParam, value: i64) -> Result<(), BackendError> {
        match param {
            IntParam::ScreenOutput => self.settings.verbose = value != 0,
            IntParam::SimplexDisplay => self.display = value,
            IntParam::LpMethod => {
                let method = LpMethod::from_id(value).ok_or_else(|| {
                    self.channels
                        .fail(ERR_BAD_PARAM, format!("invalid LP method {}", value))
                })?;
                if !matches!(
                    method,
                    LpMethod::None | LpMethod::Automatic | LpMethod::Barrier
                ) {
                    self.channels.emit(
                        Channel::Warning,
                        &format!("LP method {:?} is not available, using interior point", method),
                    );
                }
                self.lp_method = method;
            }
            // there is no crossover step to switch off
            IntParam::BarrierCrossover => {}
        }
        Ok(())
    }

    fn set_parameter(&mut self, name: &str, value: &ParamValue) -> Result<(), BackendError> {
        apply_parameter(&mut self.settings, name, value)
            .map_err(|e| self.channels.fail(ERR_BAD_PARAM, e.to_string()))
    }

    fn create_problem(&mut self, name: &str) -> Result<ClarabelModel, BackendError> {
        Ok(ClarabelModel {
            name: name.to_string(),
            problem: None,
            solution: None,
        })
    }

    fn copy_lp(
        &mut self,
        model: &mut ClarabelModel,
        data: &LinearData<'_>,
    ) -> Result<(), BackendError> {
        data.check_format()
            .map_err(|e| self.channels.fail(ERR_BAD_DATA, e.to_string()))?;

        let mut problem = Problem::new(
            data.sense,
            data.objective.to_vec(),
            data.matrix.clone(),
            data.row_senses.to_vec(),
            data.rhs.to_vec(),
            data.lower.to_vec(),
            data.upper.to_vec(),
            0,
        );
        problem.range_values = data.range_values.map(|r| r.to_vec());
        model.problem = Some(problem);
        model.solution = None;
        Ok(())
    }

    fn copy_quad(
        &mut self,
        model: &mut ClarabelModel,
        Q: &SparseMatrix,
    ) -> Result<(), BackendError> {
        let ncols = self.loaded(model)?.ncols;
        check_quadratic(Q, ncols).map_err(|e| self.channels.fail(ERR_BAD_DATA, e.to_string()))?;
        self.loaded_mut(model)?.quadratic = Some(Q.clone());
        Ok(())
    }

    fn copy_ctype(
        &mut self,
        model: &mut ClarabelModel,
        types: &[ColumnType],
    ) -> Result<(), BackendError> {
        let ncols = self.loaded(model)?.ncols;
        if types.len() != ncols {
            return Err(self.channels.fail(
                ERR_BAD_DATA,
                format!("{} column types for {} columns", types.len(), ncols),
            ));
        }
        self.loaded_mut(model)?.column_types = Some(types.to_vec());
        Ok(())
    }

    fn write_problem(&mut self, model: &ClarabelModel, path: &Path) -> Result<(), BackendError> {
        let problem = self.loaded(model)?;
        write_problem_file(problem, &model.name, path)
            .map_err(|e| self.channels.fail(ERR_FILE, e.to_string()))
    }

    fn lp_optimize(&mut self, model: &mut ClarabelModel) -> Result<(), BackendError> {
        self.optimize(model)
    }

    fn qp_optimize(&mut self, model: &mut ClarabelModel) -> Result<(), BackendError> {
        self.optimize(model)
    }

    fn mip_optimize(&mut self, model: &mut ClarabelModel) -> Result<(), BackendError> {
        let problem = self.loaded(model)?;
        let types = problem.column_types.as_deref().unwrap_or_default();
        if let Some(j) = types.iter().position(|t| *t != ColumnType::C) {
            return Err(self.channels.fail(
                ERR_UNSUPPORTED,
                format!(
                    "column {} has type {}, clarabel solves continuous problems only",
                    j,
                    types[j].code()
                ),
            ));
        }
        self.optimize(model)
    }

    fn num_rows(&self, model: &ClarabelModel) -> usize {
        model.problem.as_ref().map_or(0, |p| p.nrows)
    }

    fn num_cols(&self, model: &ClarabelModel) -> usize {
        model.problem.as_ref().map_or(0, |p| p.ncols)
    }

    fn status(&self, model: &ClarabelModel) -> SolveStatus {
        model.solution.as_ref().map_or(SolveStatus::Unset, |s| s.status)
    }

    fn objective_value(&self, model: &ClarabelModel) -> Result<f64, BackendError> {
        Ok(self.solution(model)?.objective)
    }

    fn primal_values(
        &self,
        model: &ClarabelModel,
        out: &mut [f64],
        begin: usize,
        end: usize,
    ) -> Result<(), BackendError> {
        let sol = self.solution(model)?;
        check_range(&self.channels, "column", begin, end, sol.x.len(), out.len())?;
        out.copy_from_slice(&sol.x[begin..end]);
        Ok(())
    }

    fn dual_values(
        &self,
        model: &ClarabelModel,
        out: &mut [f64],
        begin: usize,
        end: usize,
    ) -> Result<(), BackendError> {
        let sol = self.solution(model)?;
        check_range(&self.channels, "row", begin, end, sol.pi.len(), out.len())?;
        out.copy_from_slice(&sol.pi[begin..end]);
        Ok(())
    }

    fn free_problem(&mut self, model: ClarabelModel) -> Result<(), BackendError> {
        drop(model);
        Ok(())
    }

    fn close(mut self) -> Result<(), BackendError> {
        self.channels.clear();
        Ok(())
    }
}
