use crate::solver::{ParamValue, SettingsError};

// HiGHS aborts on an option it rejects, so every named option is checked
// here for name, type and range before it reaches the engine

/// A checked HiGHS option value
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum HighsOption {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(&'static str),
}

impl HighsOption {
    pub(crate) fn apply(&self, name: &str, model: &mut ::highs::Model) {
        match *self {
            HighsOption::Bool(v) => model.set_option(name, v),
            HighsOption::Int(v) => model.set_option(name, v),
            HighsOption::Float(v) => model.set_option(name, v),
            HighsOption::Str(v) => model.set_option(name, v),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum OptionKind {
    Bool,
    Int(i32, i32),
    Float(f64, f64),
    Choice(&'static [&'static str]),
}

const OFF_CHOOSE_ON: &[&str] = &["off", "choose", "on"];
const SOLVERS: &[&str] = &["simplex", "choose", "ipm"];
const INF: f64 = f64::INFINITY;

#[rustfmt::skip]
const OPTIONS: &[(&str, OptionKind)] = &[
    ("presolve",                     OptionKind::Choice(OFF_CHOOSE_ON)),
    ("parallel",                     OptionKind::Choice(OFF_CHOOSE_ON)),
    ("run_crossover",                OptionKind::Choice(OFF_CHOOSE_ON)),
    ("solver",                       OptionKind::Choice(SOLVERS)),
    ("output_flag",                  OptionKind::Bool),
    ("log_to_console",               OptionKind::Bool),
    ("mip_detect_symmetry",          OptionKind::Bool),
    ("threads",                      OptionKind::Int(0, i32::MAX)),
    ("random_seed",                  OptionKind::Int(0, i32::MAX)),
    ("simplex_strategy",             OptionKind::Int(0, 4)),
    ("simplex_scale_strategy",       OptionKind::Int(0, 5)),
    ("simplex_iteration_limit",      OptionKind::Int(0, i32::MAX)),
    ("ipm_iteration_limit",          OptionKind::Int(0, i32::MAX)),
    ("mip_max_nodes",                OptionKind::Int(0, i32::MAX)),
    ("mip_max_leaves",               OptionKind::Int(0, i32::MAX)),
    ("time_limit",                   OptionKind::Float(0.0, INF)),
    ("primal_feasibility_tolerance", OptionKind::Float(1e-10, INF)),
    ("dual_feasibility_tolerance",   OptionKind::Float(1e-10, INF)),
    ("ipm_optimality_tolerance",     OptionKind::Float(1e-12, INF)),
    ("mip_feasibility_tolerance",    OptionKind::Float(1e-10, INF)),
    ("mip_rel_gap",                  OptionKind::Float(0.0, INF)),
    ("mip_abs_gap",                  OptionKind::Float(0.0, INF)),
    ("objective_bound",              OptionKind::Float(-INF, INF)),
    ("objective_target",             OptionKind::Float(-INF, INF)),
    ("infinite_bound",               OptionKind::Float(1e15, INF)),
    ("infinite_cost",                OptionKind::Float(1e15, INF)),
];

fn value_text(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(v) => v.to_string(),
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Float(v) => v.to_string(),
        ParamValue::Str(v) => format!("\"{}\"", v),
    }
}

/// Check a named option against the HiGHS option table.  Integers are
/// widened for float options.
pub(crate) fn highs_option(name: &str, value: &ParamValue) -> Result<HighsOption, SettingsError> {
    let kind = OPTIONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| SettingsError::UnknownParameter(name.to_string()))?;

    let bad_type = |expected: &'static str| SettingsError::BadParameterType {
        name: name.to_string(),
        expected,
    };
    let bad_value = || SettingsError::BadParameterValue {
        name: name.to_string(),
        value: value_text(value),
    };

    match kind {
        OptionKind::Bool => value.as_bool().map(HighsOption::Bool).ok_or_else(|| bad_type("bool")),
        OptionKind::Int(lo, hi) => {
            let v = match value {
                ParamValue::Int(v) => *v,
                _ => return Err(bad_type("integer")),
            };
            i32::try_from(v)
                .ok()
                .filter(|v| (lo..=hi).contains(v))
                .map(HighsOption::Int)
                .ok_or_else(bad_value)
        }
        OptionKind::Float(lo, hi) => {
            let v = value.as_f64().ok_or_else(|| bad_type("float"))?;
            if v >= lo && v <= hi {
                Ok(HighsOption::Float(v))
            } else {
                Err(bad_value())
            }
        }
        OptionKind::Choice(choices) => {
            let v = match value {
                ParamValue::Str(s) => s.as_str(),
                _ => return Err(bad_type("string")),
            };
            choices
                .iter()
                .find(|c| **c == v)
                .copied()
                .map(HighsOption::Str)
                .ok_or_else(bad_value)
        }
    }
}

#[test]
fn test_highs_option() {
    assert_eq!(
        highs_option("time_limit", &ParamValue::Int(10)),
        Ok(HighsOption::Float(10.0))
    );
    assert_eq!(
        highs_option("threads", &ParamValue::Int(2)),
        Ok(HighsOption::Int(2))
    );
    assert_eq!(
        highs_option("presolve", &ParamValue::from("off")),
        Ok(HighsOption::Str("off"))
    );
    assert_eq!(
        highs_option("output_flag", &ParamValue::Bool(true)),
        Ok(HighsOption::Bool(true))
    );

    assert_eq!(
        highs_option("no_such_option", &ParamValue::Int(1)),
        Err(SettingsError::UnknownParameter("no_such_option".to_string()))
    );
    assert_eq!(
        highs_option("threads", &ParamValue::Float(2.0)),
        Err(SettingsError::BadParameterType {
            name: "threads".to_string(),
            expected: "integer"
        })
    );
    assert_eq!(
        highs_option("presolve", &ParamValue::Bool(false)),
        Err(SettingsError::BadParameterType {
            name: "presolve".to_string(),
            expected: "string"
        })
    );

    // values HiGHS itself would refuse
    assert_eq!(
        highs_option("threads", &ParamValue::Int(1 << 40)),
        Err(SettingsError::BadParameterValue {
            name: "threads".to_string(),
            value: "1099511627776".to_string()
        })
    );
    assert!(highs_option("time_limit", &ParamValue::Float(-1.0)).is_err());
    assert!(highs_option("time_limit", &ParamValue::Float(f64::NAN)).is_err());
    assert!(highs_option("simplex_strategy", &ParamValue::Int(9)).is_err());
    assert_eq!(
        highs_option("solver", &ParamValue::from("magic")),
        Err(SettingsError::BadParameterValue {
            name: "solver".to_string(),
            value: "\"magic\"".to_string()
        })
    );
}
