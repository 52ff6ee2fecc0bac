//! Error types surfaced by the engine.

use std::fmt;

use thiserror::Error;

/// A dataset document could not be turned into a viewable session.
#[derive(Debug, Error)]
pub enum DatasetError {
	#[error("invalid dataset JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("dataset contains no networks")]
	NoNetworks,
	#[error("dataset declares {count} nodes, more than the limit of {limit}")]
	TooManyNodes { count: usize, limit: usize },
}

/// A user-tunable physical parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parameter {
	Charge,
	Gravity,
	LinkDistance,
	LinkStrength,
	Radius,
}

impl fmt::Display for Parameter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Parameter::Charge => "Repulsion",
			Parameter::Gravity => "Gravity",
			Parameter::LinkDistance => "Distance",
			Parameter::LinkStrength => "Link strength",
			Parameter::Radius => "Node radius",
		})
	}
}

/// A parameter edit was rejected; the previous value stays in effect.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ParameterError {
	#[error("{parameter} must be nonnegative (got {value})")]
	Negative { parameter: Parameter, value: f64 },
}

/// Accept `value` for `parameter` when it is a nonnegative number.
pub fn nonnegative(parameter: Parameter, value: f64) -> Result<f64, ParameterError> {
	if value >= 0.0 {
		Ok(value)
	} else {
		Err(ParameterError::Negative { parameter, value })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn notice_names_the_parameter() {
		let err = nonnegative(Parameter::Charge, -3.0).unwrap_err();
		assert_eq!(err.to_string(), "Repulsion must be nonnegative (got -3)");
	}

	#[test]
	fn nan_is_rejected() {
		assert!(nonnegative(Parameter::Gravity, f64::NAN).is_err());
		assert_eq!(nonnegative(Parameter::LinkDistance, 0.0), Ok(0.0));
	}

	#[test]
	fn json_errors_convert() {
		let err: DatasetError = serde_json::from_str::<u8>("nope").unwrap_err().into();
		assert!(matches!(err, DatasetError::Json(_)));
	}
}
