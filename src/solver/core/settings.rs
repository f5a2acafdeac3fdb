use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
/// Error type returned by options validation
pub enum SettingsError {
    /// A bad value in one of the fields
    #[error("Bad value for field {0}")]
    BadFieldValue(&'static str),
    /// A named tuning option the engine does not recognize
    #[error("Unknown parameter \"{0}\"")]
    UnknownParameter(String),
    /// A named tuning option given a value of the wrong type
    #[error("Parameter \"{name}\" expects a value of type {expected}")]
    BadParameterType {
        /// option name
        name: String,
        /// type the engine expects
        expected: &'static str,
    },
    /// A named tuning option given a value outside its allowed range
    #[error("Parameter \"{name}\" does not accept the value {value}")]
    BadParameterValue {
        /// option name
        name: String,
        /// the rejected value
        value: String,
    },
}

/// Algorithm choice for continuous problems.
///
/// Parsed leniently from single character codes: any unrecognized
/// code becomes [`Unspecified`](AlgorithmSelector::Unspecified), which
/// leaves the engine's own default in place.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub enum AlgorithmSelector {
    /// `o` : engine chooses
    Automatic,
    /// `p` : primal simplex
    PrimalSimplex,
    /// `d` : dual simplex
    DualSimplex,
    /// `n` : network simplex
    Network,
    /// `h` : barrier followed by crossover
    BarrierCrossover,
    /// `b` : barrier without crossover
    BarrierNoCrossover,
    /// `s` : sifting
    Sifting,
    /// `c` : concurrent
    Concurrent,
    /// anything else : no explicit method
    #[default]
    Unspecified,
}

impl AlgorithmSelector {
    /// Parse a selector code.  Never fails.
    pub fn from_code(c: char) -> Self {
        match c {
            'o' => AlgorithmSelector::Automatic,
            'p' => AlgorithmSelector::PrimalSimplex,
            'd' => AlgorithmSelector::DualSimplex,
            'n' => AlgorithmSelector::Network,
            'h' => AlgorithmSelector::BarrierCrossover,
            'b' => AlgorithmSelector::BarrierNoCrossover,
            's' => AlgorithmSelector::Sifting,
            'c' => AlgorithmSelector::Concurrent,
            _ => AlgorithmSelector::Unspecified,
        }
    }

    /// selector code, `' '` for `Unspecified`
    pub fn code(&self) -> char {
        match self {
            AlgorithmSelector::Automatic => 'o',
            AlgorithmSelector::PrimalSimplex => 'p',
            AlgorithmSelector::DualSimplex => 'd',
            AlgorithmSelector::Network => 'n',
            AlgorithmSelector::BarrierCrossover => 'h',
            AlgorithmSelector::BarrierNoCrossover => 'b',
            AlgorithmSelector::Sifting => 's',
            AlgorithmSelector::Concurrent => 'c',
            AlgorithmSelector::Unspecified => ' ',
        }
    }
}

/// Value of a named engine tuning option
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// boolean option
    Bool(bool),
    /// integer option
    Int(i64),
    /// floating point option
    Float(f64),
    /// string option
    Str(String),
}

impl ParamValue {
    /// name of the contained type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
        }
    }

    /// boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ParamValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// numeric value, with integers widened to float
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ParamValue::Int(v) => Some(v as f64),
            ParamValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// non-negative integer value that fits in a u32
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            ParamValue::Int(v) => u32::try_from(v).ok(),
            _ => None,
        }
    }
}

macro_rules! impl_param_from {
    ($variant:ident, $($t:ty),+) => {
        $(
            impl From<$t> for ParamValue {
                fn from(v: $t) -> Self {
                    ParamValue::$variant(v.into())
                }
            }
        )+
    };
}
impl_param_from!(Bool, bool);
impl_param_from!(Int, i32, i64, u32);
impl_param_from!(Float, f32, f64);
impl_param_from!(Str, String, &str);

/// Per-call options for a solve session
///
/// ```no_run
/// use optbind::solver::*;
///
/// let options = SolveOptionsBuilder::default()
///     .algorithm(AlgorithmSelector::from_code('d'))
///     .verbosity(1u32)
///     .build()
///     .unwrap();
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct SolveOptions {
    ///algorithm choice for continuous problems
    #[builder(default)]
    pub algorithm: AlgorithmSelector,

    ///engine message verbosity.   0 attaches only the error and
    ///warning channels, values above 1 also report phase timings
    #[builder(default = "0")]
    pub verbosity: u32,

    ///named engine tuning options, applied in key order
    #[builder(default, setter(each(name = "parameter")))]
    pub parameters: BTreeMap<String, ParamValue>,

    ///write the loaded problem to this file before solving
    #[builder(default, setter(into, strip_option))]
    pub output_file: Option<PathBuf>,

    ///only write the problem file, do not solve
    #[builder(default = "false")]
    pub save_only: bool,
}

impl Default for SolveOptions {
    fn default() -> SolveOptions {
        SolveOptionsBuilder::default().build().unwrap()
    }
}

impl SolveOptions {
    /// check that an options object is consistent
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_save_only(self.save_only, self.output_file.as_ref())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for SolveOptionsBuilderError {
    fn from(e: SettingsError) -> Self {
        SolveOptionsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build options validation
impl SolveOptionsBuilder {
    /// check that save-only is not requested without a file
    pub fn validate(&self) -> Result<(), SettingsError> {
        let save_only = self.save_only.unwrap_or(false);
        let output_file = self.output_file.as_ref().and_then(|f| f.as_ref());
        validate_save_only(save_only, output_file)
    }
}

fn validate_save_only(save_only: bool, output_file: Option<&PathBuf>) -> Result<(), SettingsError> {
    if save_only && output_file.is_none() {
        return Err(SettingsError::BadFieldValue("save_only"));
    }
    Ok(())
}

#[test]
fn test_options_validate() {
    // all standard options
    let opts = SolveOptionsBuilder::default().build().unwrap();
    assert_eq!(opts.algorithm, AlgorithmSelector::Unspecified);
    assert!(!opts.save_only);

    // fail on save only without a file
    assert!(SolveOptionsBuilder::default()
        .save_only(true)
        .build()
        .is_err());

    let opts = SolveOptionsBuilder::default()
        .save_only(true)
        .output_file("model.lp")
        .parameter(("max_iter".to_string(), ParamValue::from(50)))
        .build()
        .unwrap();
    assert!(opts.validate().is_ok());
    assert_eq!(opts.parameters["max_iter"], ParamValue::Int(50));
}

#[test]
fn test_selector_codes() {
    for c in ['o', 'p', 'd', 'n', 'h', 'b', 's', 'c'] {
        assert_eq!(AlgorithmSelector::from_code(c).code(), c);
    }
    assert_eq!(AlgorithmSelector::from_code('x'), AlgorithmSelector::Unspecified);
    assert_eq!(AlgorithmSelector::from_code('O'), AlgorithmSelector::Unspecified);
}
