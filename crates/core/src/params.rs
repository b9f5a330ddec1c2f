//! Helpers for reading typed parameters from a `serde_json::Value` object
//! and for checking the few preconditions the integrators rely on.
//!
//! The readers take a JSON value, a key name, and a default. If the key is
//! missing or the value is not the expected type, the default is returned.
//! They never fail. Validation is separate and explicit.

use serde_json::Value;

use crate::error::EngineError;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON numbers (including integers) and converts them to f64.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts an `i64` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_i64(params: &Value, name: &str, default: i64) -> i64 {
    params.get(name).and_then(Value::as_i64).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Grid spacing must be finite and strictly positive (it is squared and divided by).
pub fn check_spacing(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid_param(
            name,
            format!("must be finite and > 0, got {value}"),
        ))
    }
}

/// Time steps must be finite and non-negative. Zero is allowed and freezes
/// the simulation.
pub fn check_time_step(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid_param(
            name,
            format!("must be finite and >= 0, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- param_f64 --

    #[test]
    fn param_f64_extracts_existing_float() {
        let params = json!({"dt": 2.5});
        assert!((param_f64(&params, "dt", 1.0) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_extracts_integer_as_float() {
        let params = json!({"beta": 10});
        assert!((param_f64(&params, "beta", 0.0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_when_key_missing() {
        let params = json!({"other": 1.0});
        assert!((param_f64(&params, "dt", 3.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_when_wrong_type() {
        let params = json!({"dt": "fast"});
        assert!((param_f64(&params, "dt", 1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_for_non_object() {
        let params = json!("not an object");
        assert!((param_f64(&params, "dt", 7.0) - 7.0).abs() < f64::EPSILON);
    }

    // -- param_i64 --

    #[test]
    fn param_i64_accepts_negative() {
        assert_eq!(param_i64(&json!({"spots": -3}), "spots", 0), -3);
        assert_eq!(param_i64(&json!({}), "spots", 100), 100);
    }

    // -- param_string --

    #[test]
    fn param_string_extracts_existing_string() {
        let params = json!({"boundary": "toroidal"});
        assert_eq!(param_string(&params, "boundary", "reflect"), "toroidal");
    }

    #[test]
    fn param_string_returns_default_for_wrong_type() {
        let params = json!({"boundary": 42});
        assert_eq!(param_string(&params, "boundary", "reflect"), "reflect");
    }

    // -- checks --

    #[test]
    fn spacing_must_be_positive_and_finite() {
        assert!(check_spacing("dx", 1.0).is_ok());
        assert!(check_spacing("dx", 0.0).is_err());
        assert!(check_spacing("dx", -1.0).is_err());
        assert!(check_spacing("dx", f64::NAN).is_err());
        assert!(check_spacing("dx", f64::INFINITY).is_err());
    }

    #[test]
    fn time_step_may_be_zero_but_not_negative() {
        assert!(check_time_step("dt", 0.0).is_ok());
        assert!(check_time_step("dt", 0.5).is_ok());
        assert!(check_time_step("dt", -1e-9).is_err());
        assert!(check_time_step("dt", f64::NAN).is_err());
    }

    #[test]
    fn check_error_names_the_parameter() {
        let err = check_spacing("dx", 0.0).unwrap_err();
        assert!(err.to_string().contains("dx"));
    }
}
