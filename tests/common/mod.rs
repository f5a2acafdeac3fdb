#![allow(non_snake_case)]
#![allow(dead_code)]

// A recording engine for session protocol tests.  Every engine call is
// logged, any call can be made to fail, and the reported problem size
// can be overridden.   Solutions are fixed: objective 42, x_j = j + 1
// and the multiplier of row i is i + 1.

use optbind::algebra::SparseMatrix;
use optbind::io::write_problem_file;
use optbind::solver::traits::*;
use optbind::solver::*;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open,
    AddSink(Channel),
    RemoveSink(Channel),
    SetInt(IntParam, i64),
    SetParam(String),
    CreateProblem(String),
    CopyLp,
    CopyQuad,
    CopyCtype(Vec<ColumnType>),
    WriteProblem,
    LpOptimize,
    QpOptimize,
    MipOptimize,
    Status,
    Objective,
    Primal(usize, usize),
    Dual(usize, usize),
    FreeProblem,
    Close,
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::Open => "open",
            Call::AddSink(_) => "add_sink",
            Call::RemoveSink(_) => "remove_sink",
            Call::SetInt(..) => "set_int",
            Call::SetParam(_) => "set_param",
            Call::CreateProblem(_) => "create_problem",
            Call::CopyLp => "copy_lp",
            Call::CopyQuad => "copy_quad",
            Call::CopyCtype(_) => "copy_ctype",
            Call::WriteProblem => "write_problem",
            Call::LpOptimize => "lp_optimize",
            Call::QpOptimize => "qp_optimize",
            Call::MipOptimize => "mip_optimize",
            Call::Status => "status",
            Call::Objective => "objective",
            Call::Primal(..) => "primal",
            Call::Dual(..) => "dual",
            Call::FreeProblem => "free_problem",
            Call::Close => "close",
        }
    }
}

#[derive(Default)]
pub struct MockState {
    pub calls: Vec<Call>,
    pub fail_on: Vec<&'static str>,
    pub fail_nth: Option<(&'static str, usize)>,
    pub fail_int_param: Option<IntParam>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    sinks: Vec<(Channel, SinkId, Arc<dyn MessageSink>)>,
    next_sink: usize,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    pub state: Rc<RefCell<MockState>>,
}

impl MockBackend {
    pub fn failing(steps: &[&'static str]) -> Self {
        let backend = Self::default();
        backend.state.borrow_mut().fail_on = steps.to_vec();
        backend
    }

    /// fail only the `n`th call (counting from 1) of `step`
    pub fn failing_nth(step: &'static str, n: usize) -> Self {
        let backend = Self::default();
        backend.state.borrow_mut().fail_nth = Some((step, n));
        backend
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.state.borrow().calls.iter().map(Call::name).collect()
    }

    pub fn called(&self, name: &str) -> bool {
        self.call_names().contains(&name)
    }

    pub fn attached_sinks(&self) -> usize {
        self.state.borrow().sinks.len()
    }
}

// log a call, failing it if requested
fn record(state: &Rc<RefCell<MockState>>, call: Call) -> Result<(), BackendError> {
    let mut s = state.borrow_mut();
    let name = call.name();
    let nth = s.calls.iter().filter(|c| c.name() == name).count() + 1;
    let fail = s.fail_on.contains(&name)
        || s.fail_nth == Some((name, nth))
        || matches!(call, Call::SetInt(p, _) if Some(p) == s.fail_int_param);
    s.calls.push(call);

    if fail {
        let message = format!("mock failure in {}", name);
        for (channel, _, sink) in &s.sinks {
            if *channel == Channel::Error {
                sink.message(&message);
            }
        }
        return Err(BackendError::new(99, message));
    }
    Ok(())
}

impl SolverBackend for MockBackend {
    type Environment = MockEnvironment;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn open_environment(&self) -> Result<MockEnvironment, BackendError> {
        record(&self.state, Call::Open)?;
        Ok(MockEnvironment {
            state: Rc::clone(&self.state),
        })
    }
}

pub struct MockEnvironment {
    state: Rc<RefCell<MockState>>,
}

pub struct MockProblem {
    name: String,
    problem: Option<Problem>,
}

impl MockEnvironment {
    fn record(&self, call: Call) -> Result<(), BackendError> {
        record(&self.state, call)
    }
}

impl SolverEnvironment for MockEnvironment {
    type Problem = MockProblem;

    fn add_channel_sink(
        &mut self,
        channel: Channel,
        sink: Arc<dyn MessageSink>,
    ) -> Result<SinkId, BackendError> {
        self.record(Call::AddSink(channel))?;
        let mut s = self.state.borrow_mut();
        let id = SinkId(s.next_sink);
        s.next_sink += 1;
        s.sinks.push((channel, id, sink));
        Ok(id)
    }

    fn remove_channel_sink(&mut self, channel: Channel, id: SinkId) -> Result<(), BackendError> {
        self.record(Call::RemoveSink(channel))?;
        self.state.borrow_mut().sinks.retain(|(_, i, _)| *i != id);
        Ok(())
    }

    fn set_int_param(&mut self, param: IntParam, value: i64) -> Result<(), BackendError> {
        self.record(Call::SetInt(param, value))
    }

    fn set_parameter(&mut self, name: &str, _value: &ParamValue) -> Result<(), BackendError> {
        self.record(Call::SetParam(name.to_string()))
    }

    fn create_problem(&mut self, name: &str) -> Result<MockProblem, BackendError> {
        self.record(Call::CreateProblem(name.to_string()))?;
        Ok(MockProblem {
            name: name.to_string(),
            problem: None,
        })
    }

    fn copy_lp(
        &mut self,
        prob: &mut MockProblem,
        data: &LinearData<'_>,
    ) -> Result<(), BackendError> {
        self.record(Call::CopyLp)?;
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
        prob.problem = Some(problem);
        Ok(())
    }

    fn copy_quad(&mut self, prob: &mut MockProblem, Q: &SparseMatrix) -> Result<(), BackendError> {
        self.record(Call::CopyQuad)?;
        if let Some(p) = prob.problem.as_mut() {
            p.quadratic = Some(Q.clone());
        }
        Ok(())
    }

    fn copy_ctype(
        &mut self,
        prob: &mut MockProblem,
        types: &[ColumnType],
    ) -> Result<(), BackendError> {
        self.record(Call::CopyCtype(types.to_vec()))?;
        if let Some(p) = prob.problem.as_mut() {
            p.column_types = Some(types.to_vec());
        }
        Ok(())
    }

    fn write_problem(&mut self, prob: &MockProblem, path: &Path) -> Result<(), BackendError> {
        self.record(Call::WriteProblem)?;
        let problem = prob
            .problem
            .as_ref()
            .ok_or_else(|| BackendError::new(1, "nothing loaded"))?;
        write_problem_file(problem, &prob.name, path)
            .map_err(|e| BackendError::new(2, e.to_string()))
    }

    fn lp_optimize(&mut self, _prob: &mut MockProblem) -> Result<(), BackendError> {
        self.record(Call::LpOptimize)
    }

    fn qp_optimize(&mut self, _prob: &mut MockProblem) -> Result<(), BackendError> {
        self.record(Call::QpOptimize)
    }

    fn mip_optimize(&mut self, _prob: &mut MockProblem) -> Result<(), BackendError> {
        self.record(Call::MipOptimize)
    }

    fn num_rows(&self, prob: &MockProblem) -> usize {
        let loaded = prob.problem.as_ref().map_or(0, |p| p.nrows);
        self.state.borrow().rows.unwrap_or(loaded)
    }

    fn num_cols(&self, prob: &MockProblem) -> usize {
        let loaded = prob.problem.as_ref().map_or(0, |p| p.ncols);
        self.state.borrow().cols.unwrap_or(loaded)
    }

    fn status(&self, _prob: &MockProblem) -> SolveStatus {
        let _ = self.record(Call::Status);
        SolveStatus::Optimal
    }

    fn objective_value(&self, _prob: &MockProblem) -> Result<f64, BackendError> {
        self.record(Call::Objective)?;
        Ok(42.0)
    }

    fn primal_values(
        &self,
        _prob: &MockProblem,
        out: &mut [f64],
        begin: usize,
        end: usize,
    ) -> Result<(), BackendError> {
        self.record(Call::Primal(begin, end))?;
        assert_eq!(out.len(), end - begin);
        for (k, v) in out.iter_mut().enumerate() {
            *v = (begin + k + 1) as f64;
        }
        Ok(())
    }

    fn dual_values(
        &self,
        _prob: &MockProblem,
        out: &mut [f64],
        begin: usize,
        end: usize,
    ) -> Result<(), BackendError> {
        self.record(Call::Dual(begin, end))?;
        assert_eq!(out.len(), end - begin);
        for (k, v) in out.iter_mut().enumerate() {
            *v = (begin + k + 1) as f64;
        }
        Ok(())
    }

    fn free_problem(&mut self, _prob: MockProblem) -> Result<(), BackendError> {
        self.record(Call::FreeProblem)
    }

    fn close(self) -> Result<(), BackendError> {
        self.record(Call::Close)
    }
}

// ---------------------------------------------------------
// test problems
// ---------------------------------------------------------

/// min x0 + x1  s.t.  x0 + x1 >= 1,  x >= 0
pub fn simple_lp() -> Problem {
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

/// four rows, the first `neq` of them equalities
pub fn four_row_lp(neq: usize) -> Problem {
    let A = SparseMatrix::from_triplets(
        4,
        2,
        &[(0, 0, 1.), (1, 1, 1.), (2, 0, 1.), (2, 1, 1.), (3, 0, 1.)],
    );
    let senses = (0..4)
        .map(|i| if i < neq { RowSense::E } else { RowSense::L })
        .collect();
    Problem::new(
        ObjectiveSense::Minimize,
        vec![1., 1.],
        A,
        senses,
        vec![1., 1., 4., 3.],
        vec![0., 0.],
        vec![10., 10.],
        neq,
    )
}

/// min ½(x0² + x1²)  s.t.  x0 + x1 == 1
pub fn simple_qp() -> Problem {
    let A = SparseMatrix::from_triplets(1, 2, &[(0, 0, 1.), (0, 1, 1.)]);
    Problem::new(
        ObjectiveSense::Minimize,
        vec![0., 0.],
        A,
        vec![RowSense::E],
        vec![1.],
        vec![-get_infinity(); 2],
        vec![get_infinity(); 2],
        1,
    )
    .with_quadratic(SparseMatrix::identity(2))
}

/// transportation problem: three depots ship to four customers.
/// Rows 0..3 cap the depot supply, rows 3..7 meet the customer demand.
pub fn transport_lp() -> Problem {
    let supply = [20., 30., 25.];
    let demand = [10., 25., 15., 20.];
    let cost = [[8., 6., 10., 9.], [9., 12., 13., 7.], [14., 9., 16., 5.]];

    // column i * 4 + j ships from depot i to customer j
    let mut triplets = Vec::new();
    for i in 0..3 {
        for j in 0..4 {
            triplets.push((i, i * 4 + j, 1.));
            triplets.push((3 + j, i * 4 + j, 1.));
        }
    }
    let A = SparseMatrix::from_triplets(7, 12, &triplets);

    let mut senses = vec![RowSense::L; 3];
    senses.extend([RowSense::G; 4]);
    Problem::new(
        ObjectiveSense::Minimize,
        cost.iter().flatten().copied().collect(),
        A,
        senses,
        supply.iter().chain(demand.iter()).copied().collect(),
        vec![0.; 12],
        vec![get_infinity(); 12],
        0,
    )
}

pub fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "{} differs from {} by more than {}", a, b, tol);
}
