use super::channels::{ChannelRegistrations, Diagnostics};
use super::error::*;
use super::problem::{Problem, ProblemKind};
use super::settings::{AlgorithmSelector, SolveOptions};
use super::solution::SolveResult;
use super::traits::*;
use crate::timers::*;
use tracing::{debug, warn};

/// Write the algorithm selector to an engine environment.
///
/// Unrecognized selectors map to [`LpMethod::None`], which is still
/// written.  Barrier without crossover also turns crossover off, and a
/// failure there is reported like any other parameter failure.
pub fn set_lp_method<E: SolverEnvironment>(
    env: &mut E,
    selector: AlgorithmSelector,
) -> Result<(), BackendError> {
    let method = match selector {
        AlgorithmSelector::Automatic => LpMethod::Automatic,
        AlgorithmSelector::PrimalSimplex => LpMethod::Primal,
        AlgorithmSelector::DualSimplex => LpMethod::Dual,
        AlgorithmSelector::Network => LpMethod::Network,
        AlgorithmSelector::BarrierCrossover => LpMethod::Barrier,
        AlgorithmSelector::BarrierNoCrossover => {
            env.set_int_param(IntParam::BarrierCrossover, LpMethod::None.id())?;
            LpMethod::Barrier
        }
        AlgorithmSelector::Sifting => LpMethod::Sifting,
        AlgorithmSelector::Concurrent => LpMethod::Concurrent,
        AlgorithmSelector::Unspecified => LpMethod::None,
    };
    env.set_int_param(IntParam::LpMethod, method.id())
}

/// Drives one engine through a complete solve per call
///
/// Each call to [`solve`](SolveSession::solve) or
/// [`solve_into`](SolveSession::solve_into) opens a fresh environment,
/// configures it, loads the problem, optionally writes it to a file,
/// optimizes, extracts the solution and releases every engine resource,
/// whatever the outcome.
///
/// ```no_run
/// # #[cfg(feature = "clarabel")] {
/// use optbind::algebra::*;
/// use optbind::solver::*;
///
/// // min x0 + x1  s.t.  x0 + x1 >= 1,  x >= 0
/// let A = SparseMatrix::from_triplets(1, 2, &[(0, 0, 1.), (0, 1, 1.)]);
/// let problem = Problem::new(
///     ObjectiveSense::Minimize,
///     vec![1., 1.],
///     A,
///     vec![RowSense::G],
///     vec![1.],
///     vec![0., 0.],
///     vec![get_infinity(); 2],
///     0,
/// );
///
/// let session = SolveSession::new(ClarabelBackend::default());
/// let result = session.solve("example", &problem, &SolveOptions::default()).unwrap();
/// assert_eq!(result.status, SolveStatus::Optimal);
/// # }
/// ```
pub struct SolveSession<B: SolverBackend> {
    backend: B,
    diagnostics: Diagnostics,
}

impl<B: SolverBackend> SolveSession<B> {
    /// session reporting through the default `tracing` sinks
    pub fn new(backend: B) -> Self {
        Self::with_diagnostics(backend, Diagnostics::default())
    }

    /// session reporting through the given sinks
    pub fn with_diagnostics(backend: B, diagnostics: Diagnostics) -> Self {
        Self {
            backend,
            diagnostics,
        }
    }

    /// the engine behind this session
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// the sinks this session reports to
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Solve `problem` and return a new result
    pub fn solve(
        &self,
        name: &str,
        problem: &Problem,
        options: &SolveOptions,
    ) -> Result<SolveResult, SolveError> {
        let mut result = SolveResult::new(problem.ncols, problem.nrows);
        self.solve_into(name, problem, options, &mut result)?;
        Ok(result)
    }

    /// Solve `problem`, writing into a caller supplied result.
    ///
    /// The result is reset first.  Fields filled before a failure keep
    /// their values, e.g. the status survives a failed objective query.
    pub fn solve_into(
        &self,
        name: &str,
        problem: &Problem,
        options: &SolveOptions,
        result: &mut SolveResult,
    ) -> Result<(), SolveError> {
        result.reset(problem.ncols, problem.nrows);

        let mut timers = Timers::default();
        timers.start_as_current("session");

        debug!(problem = name, backend = self.backend.name(), "opening environment");
        let env = match self.backend.open_environment() {
            Ok(env) => env,
            Err(e) => {
                let e = SolveError::Environment(e);
                self.diagnostics.error(&e.to_string());
                return Err(e);
            }
        };

        let mut active = ActiveSession::new(env);
        let forward = self.forward(&mut active, name, problem, options, result, &mut timers);
        let failures = active.teardown();

        timers.stop_all();
        result.solve_time = timers.total_time().as_secs_f64();
        if options.verbosity > 1 {
            self.diagnostics.info(&timers.report());
        }

        let outcome = match forward {
            Err(e) => {
                for f in &failures {
                    self.diagnostics.error(&f.to_string());
                }
                Err(e)
            }
            Ok(()) if !failures.is_empty() => Err(SolveError::Teardown { failures }),
            Ok(()) => Ok(()),
        };

        if let Err(e) = &outcome {
            debug!(problem = name, "session failed: {}", e);
            self.diagnostics.error(&e.to_string());
        }
        outcome
    }

    // every step up to and including extraction.  Teardown is
    // left to the caller and always runs.
    fn forward(
        &self,
        active: &mut ActiveSession<B::Environment>,
        name: &str,
        problem: &Problem,
        options: &SolveOptions,
        result: &mut SolveResult,
        timers: &mut Timers,
    ) -> Result<(), SolveError> {
        let column_types = problem.effective_column_types();
        let kind = problem.kind();

        timeit! {timers => "setup"; {
            debug!(problem = name, "configuring environment");
            self.configure(active, options)
                .map_err(SolveError::Configuration)?;

            debug!(problem = name, "creating problem object");
            let (env, _) = active.parts()?;
            let prob = env
                .create_problem(name)
                .map_err(|source| SolveError::ProblemCreation {
                    name: name.to_string(),
                    source,
                })?;
            active.problem = Some(prob);
        }}

        let (env, prob) = active.parts_with_problem()?;

        timeit! {timers => "load"; {
            debug!(problem = name, "loading linear data");
            env.copy_lp(prob, &problem.linear_data())
                .map_err(|source| load_error(LoadStage::Linear, source))?;

            if let Some(Q) = &problem.quadratic {
                debug!(problem = name, "loading quadratic objective");
                env.copy_quad(prob, Q)
                    .map_err(|source| load_error(LoadStage::Quadratic, source))?;
            }

            if let Some(types) = &column_types {
                debug!(problem = name, "loading column types");
                env.copy_ctype(prob, types)
                    .map_err(|source| load_error(LoadStage::ColumnTypes, source))?;
            }
        }}

        if let Some(path) = &options.output_file {
            timeit! {timers => "persist"; {
                debug!(problem = name, file = %path.display(), "writing problem file");
                env.write_problem(prob, path).map_err(SolveError::Persist)?;
            }}
        }

        if options.save_only {
            debug!(problem = name, "save only, skipping optimization");
            return Ok(());
        }

        timeit! {timers => "optimize"; {
            debug!(problem = name, %kind, "optimizing");
            match kind {
                ProblemKind::MixedInteger => env.mip_optimize(prob),
                ProblemKind::Quadratic => env.qp_optimize(prob),
                ProblemKind::Linear => env.lp_optimize(prob),
            }
            .map_err(|source| SolveError::Optimize { kind, source })?;
        }}

        let found = (env.num_rows(prob), env.num_cols(prob));
        let expected = (problem.nrows, problem.ncols);
        if found != expected {
            return Err(SolveError::DimensionMismatch { expected, found });
        }

        timeit! {timers => "extract"; {
            debug!(problem = name, "extracting solution");
            extract(env, prob, problem, kind, result)?;
        }}

        Ok(())
    }

    // diagnostics channels, display, algorithm and tuning options
    fn configure(
        &self,
        active: &mut ActiveSession<B::Environment>,
        options: &SolveOptions,
    ) -> Result<(), BackendError> {
        let ActiveSession {
            env, registrations, ..
        } = active;
        let env = match env {
            Some(env) => env,
            None => return Err(BackendError::new(-1, "environment is closed")),
        };

        for channel in Channel::ALL {
            let always = matches!(channel, Channel::Error | Channel::Warning);
            if always || options.verbosity > 0 {
                registrations.attach(env, channel, self.diagnostics.channel_sink(channel))?;
            }
        }

        env.set_int_param(IntParam::ScreenOutput, 0)?;
        env.set_int_param(IntParam::SimplexDisplay, i64::from(options.verbosity))?;
        set_lp_method(env, options.algorithm)?;

        for (key, value) in &options.parameters {
            env.set_parameter(key, value)?;
        }
        Ok(())
    }
}

fn load_error(stage: LoadStage, source: BackendError) -> SolveError {
    SolveError::DataLoad { stage, source }
}

// status, objective, primal values, then the multipliers in the
// order non-equality rows first, equality rows last
fn extract<E: SolverEnvironment>(
    env: &E,
    prob: &E::Problem,
    problem: &Problem,
    kind: ProblemKind,
    result: &mut SolveResult,
) -> Result<(), SolveError> {
    let (nrows, ncols) = (problem.nrows, problem.ncols);
    let neq = problem.neq.min(nrows);

    result.status = env.status(prob);

    result.objective = env
        .objective_value(prob)
        .map_err(|source| SolveError::Extraction {
            item: ExtractionItem::Objective,
            source,
        })?;

    if ncols > 0 {
        env.primal_values(prob, &mut result.x, 0, ncols)
            .map_err(|source| SolveError::Extraction {
                item: ExtractionItem::Primal,
                source,
            })?;
    }

    if kind == ProblemKind::MixedInteger {
        result.lambda.fill(0.0);
        return Ok(());
    }

    let dual_error = |source| SolveError::Extraction {
        item: ExtractionItem::Dual,
        source,
    };
    let (head, tail) = result.lambda.split_at_mut(nrows - neq);
    if !head.is_empty() {
        env.dual_values(prob, head, neq, nrows).map_err(dual_error)?;
    }
    if !tail.is_empty() {
        env.dual_values(prob, tail, 0, neq).map_err(dual_error)?;
    }
    Ok(())
}

// Environment and problem object of a running session.  Teardown
// runs explicitly on the normal path, or from Drop when unwinding.
struct ActiveSession<E: SolverEnvironment> {
    env: Option<E>,
    problem: Option<E::Problem>,
    registrations: ChannelRegistrations,
}

impl<E: SolverEnvironment> ActiveSession<E> {
    fn new(env: E) -> Self {
        Self {
            env: Some(env),
            problem: None,
            registrations: ChannelRegistrations::default(),
        }
    }

    fn closed() -> SolveError {
        SolveError::Environment(BackendError::new(-1, "environment is closed"))
    }

    fn parts(&mut self) -> Result<(&mut E, Option<&mut E::Problem>), SolveError> {
        match self.env.as_mut() {
            Some(env) => Ok((env, self.problem.as_mut())),
            None => Err(Self::closed()),
        }
    }

    fn parts_with_problem(&mut self) -> Result<(&mut E, &mut E::Problem), SolveError> {
        match self.parts()? {
            (env, Some(prob)) => Ok((env, prob)),
            (_, None) => Err(Self::closed()),
        }
    }

    // free problem, detach channels, close environment
    fn teardown(&mut self) -> Vec<TeardownFailure> {
        let mut failures = Vec::new();
        let Some(mut env) = self.env.take() else {
            return failures;
        };

        if let Some(prob) = self.problem.take() {
            if let Err(source) = env.free_problem(prob) {
                warn!("could not free problem object: {}", source);
                failures.push(TeardownFailure {
                    step: TeardownStep::FreeProblem,
                    source,
                });
            }
        }

        self.registrations.detach_all(&mut env);

        if let Err(source) = env.close() {
            warn!("could not close environment: {}", source);
            failures.push(TeardownFailure {
                step: TeardownStep::CloseEnvironment,
                source,
            });
        }
        failures
    }
}

impl<E: SolverEnvironment> Drop for ActiveSession<E> {
    fn drop(&mut self) {
        if self.env.is_some() {
            let _ = self.teardown();
        }
    }
}
