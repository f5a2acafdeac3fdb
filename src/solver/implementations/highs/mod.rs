//! Simplex and branch-and-bound backend for LP and MIP problems,
//! backed by the `highs` crate.
//!
//! Quadratic objectives and semi-continuous columns are rejected at
//! load time.  Named options are checked against a table of supported
//! HiGHS options when they are set.

mod params;
use params::*;

use crate::algebra::SparseMatrix;
use crate::io::write_problem_file;
use crate::solver::implementations::*;
use crate::solver::traits::*;
use crate::solver::utils::infbounds::*;
use crate::solver::*;
use ::highs::{ColProblem, HighsModelStatus, Sense};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// HiGHS engine
#[derive(Debug, Clone, Default)]
pub struct HighsBackend {
    /// options applied to every environment before the session's own
    pub options: BTreeMap<String, ParamValue>,
}

impl SolverBackend for HighsBackend {
    type Environment = HighsEnvironment;

    fn name(&self) -> &'static str {
        "highs"
    }

    fn open_environment(&self) -> Result<HighsEnvironment, BackendError> {
        let mut options = BTreeMap::new();
        for (name, value) in &self.options {
            let option = highs_option(name, value)
                .map_err(|e| BackendError::new(ERR_BAD_PARAM, e.to_string()))?;
            options.insert(name.clone(), option);
        }
        Ok(HighsEnvironment {
            options,
            channels: ChannelTable::default(),
            quiet: true,
            display: 0,
        })
    }
}

/// Open HiGHS environment
pub struct HighsEnvironment {
    options: BTreeMap<String, HighsOption>,
    channels: ChannelTable,
    quiet: bool,
    display: i64,
}

/// Problem object of a [`HighsEnvironment`]
#[derive(Debug)]
pub struct HighsModel {
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

fn map_status(status: HighsModelStatus) -> SolveStatus {
    match status {
        HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => SolveStatus::Optimal,
        HighsModelStatus::Infeasible => SolveStatus::Infeasible,
        HighsModelStatus::Unbounded => SolveStatus::Unbounded,
        HighsModelStatus::UnboundedOrInfeasible => SolveStatus::InfeasibleOrUnbounded,
        HighsModelStatus::ReachedTimeLimit => SolveStatus::TimeLimit,
        HighsModelStatus::ReachedIterationLimit => SolveStatus::IterationLimit,
        HighsModelStatus::ObjectiveBound | HighsModelStatus::ObjectiveTarget => {
            SolveStatus::ObjectiveLimit
        }
        _ => SolveStatus::Unknown,
    }
}

// HiGHS has its own infinity
fn highs_bound(v: f64) -> f64 {
    if is_pos_infinite(v) {
        f64::INFINITY
    } else if is_neg_infinite(v) {
        f64::NEG_INFINITY
    } else {
        v
    }
}

impl HighsEnvironment {
    fn loaded<'a>(&self, model: &'a HighsModel) -> Result<&'a Problem, BackendError> {
        model
            .problem
            .as_ref()
            .ok_or_else(|| self.channels.fail(ERR_BAD_DATA, "no problem data loaded"))
    }

    fn solution<'a>(&self, model: &'a HighsModel) -> Result<&'a ModelSolution, BackendError> {
        match &model.solution {
            Some(sol) if sol.status.has_solution() => Ok(sol),
            Some(sol) => Err(self.channels.fail(
                ERR_NO_SOLUTION,
                format!("no solution exists, status {}", sol.status),
            )),
            None => Err(self.channels.fail(ERR_NO_SOLUTION, "problem has not been optimized")),
        }
    }

    fn optimize(&mut self, model: &mut HighsModel, integer: bool) -> Result<(), BackendError> {
        let problem = self.loaded(model)?;
        let data = problem.linear_data();

        let mut pb = ColProblem::default();
        let rows: Vec<_> = (0..data.nrows)
            .map(|i| {
                let (lo, hi) = data.row_bounds(i);
                pb.add_row(lo.unwrap_or(f64::NEG_INFINITY)..=hi.unwrap_or(f64::INFINITY))
            })
            .collect();

        let types = problem.column_types.as_deref().filter(|_| integer);
        for j in 0..data.ncols {
            let factors: Vec<_> = data.matrix.column(j).map(|(i, v)| (rows[i], v)).collect();
            let (mut lo, mut hi) = (highs_bound(data.lower[j]), highs_bound(data.upper[j]));
            let is_int = match types.map(|t| t[j]) {
                Some(ColumnType::B) => {
                    lo = lo.max(0.0);
                    hi = hi.min(1.0);
                    true
                }
                Some(t) => t.is_integer(),
                None => false,
            };
            if is_int {
                pb.add_integer_column(data.objective[j], lo..=hi, &factors);
            } else {
                pb.add_column(data.objective[j], lo..=hi, &factors);
            }
        }

        let sense = match data.sense {
            ObjectiveSense::Minimize => Sense::Minimise,
            ObjectiveSense::Maximize => Sense::Maximise,
        };
        let mut highs = pb
            .try_optimise(sense)
            .map_err(|e| self.channels.fail(ERR_ENGINE, format!("invalid problem: {:?}", e)))?;

        if self.quiet {
            highs.make_quiet();
        }
        for (name, option) in &self.options {
            option.apply(name, &mut highs);
        }

        let solved = highs
            .try_solve()
            .map_err(|e| self.channels.fail(ERR_ENGINE, format!("solve failed: {:?}", e)))?;

        let status = map_status(solved.status());
        let solution = solved.get_solution();
        let x = solution.columns().to_vec();

        // HiGHS row duals are already the rhs sensitivities; MIPs have none
        let pi = if integer {
            vec![0.0; data.nrows]
        } else {
            solution.dual_rows().to_vec()
        };
        let objective = problem.objective_at(&x);

        if self.display > 0 {
            self.channels.emit(
                Channel::Results,
                &format!("{}: status {}, objective {:.8e}", model.name, status, objective),
            );
        }

        model.solution = Some(ModelSolution {
            status,
            objective,
            x,
            pi,
        });
        Ok(())
    }
}

impl SolverEnvironment for HighsEnvironment {
    type Problem = HighsModel;

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
            IntParam::ScreenOutput => self.quiet = value == 0,
            IntParam::SimplexDisplay => self.display = value,
            IntParam::LpMethod => {
                let solver = match LpMethod::from_id(value) {
                    Some(LpMethod::None) => None,
                    Some(LpMethod::Automatic) => Some("choose"),
                    Some(LpMethod::Primal) | Some(LpMethod::Dual) | Some(LpMethod::Network) => {
                        Some("simplex")
                    }
                    Some(LpMethod::Barrier) => Some("ipm"),
                    Some(LpMethod::Sifting) | Some(LpMethod::Concurrent) => {
                        self.channels.emit(
                            Channel::Warning,
                            "LP method is not available, HiGHS chooses the algorithm",
                        );
                        Some("choose")
                    }
                    None => {
                        return Err(self
                            .channels
                            .fail(ERR_BAD_PARAM, format!("invalid LP method {}", value)))
                    }
                };
                if let Some(solver) = solver {
                    self.options.insert("solver".to_string(), HighsOption::Str(solver));
                }
                let strategy = match LpMethod::from_id(value) {
                    Some(LpMethod::Primal) => Some(4),
                    Some(LpMethod::Dual) => Some(1),
                    _ => None,
                };
                if let Some(strategy) = strategy {
                    self.options
                        .insert("simplex_strategy".to_string(), HighsOption::Int(strategy));
                }
            }
            IntParam::BarrierCrossover => {
                let crossover = if value == LpMethod::None.id() { "off" } else { "on" };
                self.options
                    .insert("run_crossover".to_string(), HighsOption::Str(crossover));
            }
        }
        Ok(())
    }

    fn set_parameter(&mut self, name: &str, value: &ParamValue) -> Result<(), BackendError> {
        let option = highs_option(name, value)
            .map_err(|e| self.channels.fail(ERR_BAD_PARAM, e.to_string()))?;
        self.options.insert(name.to_string(), option);
        Ok(())
    }

    fn create_problem(&mut self, name: &str) -> Result<HighsModel, BackendError> {
        Ok(HighsModel {
            name: name.to_string(),
            problem: None,
            solution: None,
        })
    }

    fn copy_lp(
        &mut self,
        model: &mut HighsModel,
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
        _model: &mut HighsModel,
        _Q: &SparseMatrix,
    ) -> Result<(), BackendError> {
        Err(self
            .channels
            .fail(ERR_UNSUPPORTED, "quadratic objectives are not supported by HiGHS"))
    }

    fn copy_ctype(
        &mut self,
        model: &mut HighsModel,
        types: &[ColumnType],
    ) -> Result<(), BackendError> {
        let ncols = self.loaded(model)?.ncols;
        if types.len() != ncols {
            return Err(self.channels.fail(
                ERR_BAD_DATA,
                format!("{} column types for {} columns", types.len(), ncols),
            ));
        }
        if let Some(j) = types.iter().position(|t| t.is_semicontinuous()) {
            return Err(self.channels.fail(
                ERR_UNSUPPORTED,
                format!("column {} is semi-continuous, not supported by HiGHS", j),
            ));
        }
        if let Some(problem) = model.problem.as_mut() {
            problem.column_types = Some(types.to_vec());
        }
        Ok(())
    }

    fn write_problem(&mut self, model: &HighsModel, path: &Path) -> Result<(), BackendError> {
        let problem = self.loaded(model)?;
        write_problem_file(problem, &model.name, path)
            .map_err(|e| self.channels.fail(ERR_FILE, e.to_string()))
    }

    fn lp_optimize(&mut self, model: &mut HighsModel) -> Result<(), BackendError> {
        self.optimize(model, false)
    }

    fn qp_optimize(&mut self, _model: &mut HighsModel) -> Result<(), BackendError> {
        Err(self
            .channels
            .fail(ERR_UNSUPPORTED, "quadratic objectives are not supported by HiGHS"))
    }

    fn mip_optimize(&mut self, model: &mut HighsModel) -> Result<(), BackendError> {
        self.optimize(model, true)
    }

    fn num_rows(&self, model: &HighsModel) -> usize {
        model.problem.as_ref().map_or(0, |p| p.nrows)
    }

    fn num_cols(&self, model: &HighsModel) -> usize {
        model.problem.as_ref().map_or(0, |p| p.ncols)
    }

    fn status(&self, model: &HighsModel) -> SolveStatus {
        model.solution.as_ref().map_or(SolveStatus::Unset, |s| s.status)
    }

    fn objective_value(&self, model: &HighsModel) -> Result<f64, BackendError> {
        Ok(self.solution(model)?.objective)
    }

    fn primal_values(
        &self,
        model: &HighsModel,
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
        model: &HighsModel,
        out: &mut [f64],
        begin: usize,
        end: usize,
    ) -> Result<(), BackendError> {
        let sol = self.solution(model)?;
        check_range(&self.channels, "row", begin, end, sol.pi.len(), out.len())?;
        out.copy_from_slice(&sol.pi[begin..end]);
        Ok(())
    }

    fn free_problem(&mut self, model: HighsModel) -> Result<(), BackendError> {
        drop(model);
        Ok(())
    }

    fn close(mut self) -> Result<(), BackendError> {
        self.channels.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highs_mip() {
        // max x0 + 2 x1  s.t. x0 + x1 <= 3.5,  x0 - x1 >= 1,  x1 integer
        let A = SparseMatrix::from_triplets(
            2,
            2,
            &[(0, 0, 1.), (0, 1, 1.), (1, 0, 1.), (1, 1, -1.)],
        );
        let problem = Problem::new(
            ObjectiveSense::Maximize,
            vec![1., 2.],
            A,
            vec![RowSense::L, RowSense::G],
            vec![3.5, 1.],
            vec![0., 0.],
            vec![get_infinity(); 2],
            0,
        )
        .with_column_types(vec![ColumnType::C, ColumnType::I]);

        let session = SolveSession::new(HighsBackend::default());
        let result = session
            .solve("mip", &problem, &SolveOptions::default())
            .unwrap();

        assert_eq!(result.status, SolveStatus::Optimal);
        assert!((result.x[0] - 2.5).abs() < 1e-6);
        assert!((result.x[1] - 1.0).abs() < 1e-6);
        assert!((result.objective - 4.5).abs() < 1e-6);
        assert_eq!(result.lambda, vec![0.0, 0.0]);
    }

    fn small_lp() -> Problem {
        // min x0 + x1  s.t.  x0 + x1 >= 1
        let A = SparseMatrix::from_triplets(1, 2, &[(0, 0, 1.), (0, 1, 1.)]);
        Problem::new(
            ObjectiveSense::Minimize,
            vec![1., 1.],
            A,
            vec![RowSense::G],
            vec![1.],
            vec![0., 0.],
            vec![get_infinity(); 2],
            0,
        )
    }

    fn solve_with(name: &str, value: ParamValue) -> Result<SolveResult, SolveError> {
        let options = SolveOptionsBuilder::default()
            .parameter((name.to_string(), value))
            .build()
            .unwrap();
        SolveSession::new(HighsBackend::default()).solve("options", &small_lp(), &options)
    }

    #[test]
    fn test_highs_options() {
        let result = solve_with("time_limit", ParamValue::Int(10)).unwrap();
        assert!((result.objective - 1.0).abs() < 1e-6);
        assert!((result.lambda[0] - 1.0).abs() < 1e-6);

        let err = solve_with("no_such_option", ParamValue::Int(1)).unwrap_err();
        assert!(matches!(err, SolveError::Configuration(_)));

        let err = solve_with("time_limit", ParamValue::from("soon")).unwrap_err();
        assert!(matches!(err, SolveError::Configuration(_)));

        let err = solve_with("threads", ParamValue::Int(i64::MAX)).unwrap_err();
        assert!(matches!(err, SolveError::Configuration(_)));
    }

    #[test]
    fn test_highs_backend_options() {
        let mut backend = HighsBackend::default();
        backend
            .options
            .insert("presolve".to_string(), ParamValue::from("sometimes"));

        let err = SolveSession::new(backend)
            .solve("options", &small_lp(), &SolveOptions::default())
            .unwrap_err();
        assert!(matches!(err, SolveError::Environment(_)));
    }
}
