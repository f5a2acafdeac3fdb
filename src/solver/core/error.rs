use super::problem::ProblemKind;
use itertools::Itertools;
use thiserror::Error;

/// Diagnostic returned by an engine call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct BackendError {
    /// engine status code
    pub code: i32,
    /// engine message
    pub message: String,
}

impl BackendError {
    /// new diagnostic from a code and a message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Part of the problem data being loaded
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LoadStage {
    /// objective, bounds, rows and constraint matrix
    Linear,
    /// quadratic objective matrix
    Quadratic,
    /// column type tags
    ColumnTypes,
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LoadStage::Linear => write!(f, "linear data"),
            LoadStage::Quadratic => write!(f, "quadratic objective"),
            LoadStage::ColumnTypes => write!(f, "column types"),
        }
    }
}

/// Solution item being extracted
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ExtractionItem {
    /// objective value
    Objective,
    /// primal solution
    Primal,
    /// row multipliers
    Dual,
}

impl std::fmt::Display for ExtractionItem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ExtractionItem::Objective => write!(f, "objective value"),
            ExtractionItem::Primal => write!(f, "primal values"),
            ExtractionItem::Dual => write!(f, "dual values"),
        }
    }
}

/// Teardown step that failed
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TeardownStep {
    /// destroying the in-engine problem object
    FreeProblem,
    /// closing the engine environment
    CloseEnvironment,
}

/// A single failed teardown step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{step:?} failed: {source}")]
pub struct TeardownFailure {
    /// which step failed
    pub step: TeardownStep,
    /// engine diagnostic
    #[source]
    pub source: BackendError,
}

#[derive(Error, Debug, Clone, PartialEq)]
/// Error type returned by a solve session
pub enum SolveError {
    /// The engine environment could not be opened
    #[error("could not open the solver environment: {0}")]
    Environment(#[source] BackendError),
    /// A diagnostics channel, display level, algorithm or tuning option could not be set
    #[error("could not configure the solver environment: {0}")]
    Configuration(#[source] BackendError),
    /// The engine refused to create a problem object
    #[error("could not create problem \"{name}\": {source}")]
    ProblemCreation {
        /// problem name
        name: String,
        /// engine diagnostic
        #[source]
        source: BackendError,
    },
    /// Loading one part of the problem data failed
    #[error("could not load {stage}: {source}")]
    DataLoad {
        /// part being loaded
        stage: LoadStage,
        /// engine diagnostic
        #[source]
        source: BackendError,
    },
    /// Writing the problem file failed
    #[error("could not write problem file: {0}")]
    Persist(#[source] BackendError),
    /// The optimizer call failed
    #[error("failed to optimize {kind}: {source}")]
    Optimize {
        /// which optimizer was called
        kind: ProblemKind,
        /// engine diagnostic
        #[source]
        source: BackendError,
    },
    /// The engine reports a problem size other than the one submitted
    #[error("solver reports {found:?} rows and columns, submitted {expected:?}")]
    DimensionMismatch {
        /// submitted (nrows, ncols)
        expected: (usize, usize),
        /// engine (nrows, ncols)
        found: (usize, usize),
    },
    /// A solution item could not be queried
    #[error("could not extract {item}: {source}")]
    Extraction {
        /// item being extracted
        item: ExtractionItem,
        /// engine diagnostic
        #[source]
        source: BackendError,
    },
    /// Releasing engine resources failed after an otherwise successful session
    #[error("solver teardown failed: {}", join_failures(.failures))]
    Teardown {
        /// every failed step, in teardown order
        failures: Vec<TeardownFailure>,
    },
}

fn join_failures(failures: &[TeardownFailure]) -> String {
    failures.iter().join("; ")
}

impl SolveError {
    /// the engine diagnostic behind the error, if any
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            SolveError::Environment(e) | SolveError::Configuration(e) | SolveError::Persist(e) => {
                Some(e)
            }
            SolveError::ProblemCreation { source, .. }
            | SolveError::DataLoad { source, .. }
            | SolveError::Optimize { source, .. }
            | SolveError::Extraction { source, .. } => Some(source),
            SolveError::Teardown { failures } => failures.first().map(|f| &f.source),
            SolveError::DimensionMismatch { .. } => None,
        }
    }
}

#[test]
fn test_error_messages() {
    let e = SolveError::DataLoad {
        stage: LoadStage::Quadratic,
        source: BackendError::new(1001, "out of memory"),
    };
    assert_eq!(
        e.to_string(),
        "could not load quadratic objective: out of memory (code 1001)"
    );
    assert_eq!(e.backend_error().map(|b| b.code), Some(1001));

    let e = SolveError::DimensionMismatch {
        expected: (3, 2),
        found: (2, 2),
    };
    assert!(e.backend_error().is_none());
}
