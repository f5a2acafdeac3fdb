use crate::solver::{ParamValue, SettingsError};
use ::clarabel::solver::DefaultSettings;

// named options map onto DefaultSettings fields of the same name

macro_rules! set_field {
    ($settings:ident, $name:ident, $value:ident, $conv:ident, $ty:literal) => {
        $settings.$name = $value
            .$conv()
            .ok_or_else(|| SettingsError::BadParameterType {
                name: stringify!($name).to_string(),
                expected: $ty,
            })?
    };
}

pub(crate) fn apply_parameter(
    settings: &mut DefaultSettings<f64>,
    name: &str,
    value: &ParamValue,
) -> Result<(), SettingsError> {
    match name {
        "max_iter" => set_field!(settings, max_iter, value, as_u32, "integer"),
        "time_limit" => set_field!(settings, time_limit, value, as_f64, "float"),
        "max_step_fraction" => set_field!(settings, max_step_fraction, value, as_f64, "float"),
        "tol_gap_abs" => set_field!(settings, tol_gap_abs, value, as_f64, "float"),
        "tol_gap_rel" => set_field!(settings, tol_gap_rel, value, as_f64, "float"),
        "tol_feas" => set_field!(settings, tol_feas, value, as_f64, "float"),
        "tol_infeas_abs" => set_field!(settings, tol_infeas_abs, value, as_f64, "float"),
        "tol_infeas_rel" => set_field!(settings, tol_infeas_rel, value, as_f64, "float"),
        "tol_ktratio" => set_field!(settings, tol_ktratio, value, as_f64, "float"),
        "equilibrate_enable" => set_field!(settings, equilibrate_enable, value, as_bool, "bool"),
        "equilibrate_max_iter" => {
            set_field!(settings, equilibrate_max_iter, value, as_u32, "integer")
        }
        "static_regularization_enable" => {
            set_field!(settings, static_regularization_enable, value, as_bool, "bool")
        }
        "iterative_refinement_enable" => {
            set_field!(settings, iterative_refinement_enable, value, as_bool, "bool")
        }
        "direct_solve_method" => {
            settings.direct_solve_method = match value {
                ParamValue::Str(s) => s.clone(),
                _ => {
                    return Err(SettingsError::BadParameterType {
                        name: name.to_string(),
                        expected: "string",
                    })
                }
            }
        }
        _ => return Err(SettingsError::UnknownParameter(name.to_string())),
    }
    Ok(())
}

#[test]
fn test_apply_parameter() {
    let mut settings = DefaultSettings::<f64>::default();

    apply_parameter(&mut settings, "max_iter", &ParamValue::Int(17)).unwrap();
    apply_parameter(&mut settings, "tol_feas", &ParamValue::Int(1)).unwrap();
    apply_parameter(&mut settings, "time_limit", &ParamValue::Float(2.5)).unwrap();
    apply_parameter(&mut settings, "equilibrate_enable", &ParamValue::Bool(false)).unwrap();
    assert_eq!(settings.max_iter, 17);
    assert_eq!(settings.tol_feas, 1.0);
    assert_eq!(settings.time_limit, 2.5);
    assert!(!settings.equilibrate_enable);

    assert_eq!(
        apply_parameter(&mut settings, "max_iter", &ParamValue::Float(1.5)),
        Err(SettingsError::BadParameterType {
            name: "max_iter".to_string(),
            expected: "integer"
        })
    );
    assert!(apply_parameter(&mut settings, "max_iter", &ParamValue::Int(-3)).is_err());
    assert_eq!(
        apply_parameter(&mut settings, "presolve", &ParamValue::Bool(true)),
        Err(SettingsError::UnknownParameter("presolve".to_string()))
    );
}
