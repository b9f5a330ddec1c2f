//! Error types for the fieldlab core.

use thiserror::Error;

/// Errors produced by engine construction, parameter updates and field operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or their product overflowed) when creating a Field.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A parameter value violated a precondition (e.g. non-positive `dx`).
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// An (x, y) coordinate was outside the field bounds.
    #[error("index ({x}, {y}) out of bounds for field of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Two fields had incompatible dimensions for a copy or element-wise operation.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// The requested engine name is not registered.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// The requested channel does not exist on this engine.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// A file could not be written or read (snapshot, config).
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for building an [`EngineError::InvalidParameter`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let err = EngineError::InvalidDimensions;
        let msg = format!("{err}");
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_parameter_includes_name_and_reason() {
        let err = EngineError::invalid_param("dx", "must be positive");
        let msg = format!("{err}");
        assert!(msg.contains("dx"), "missing param name in: {msg}");
        assert!(msg.contains("must be positive"), "missing reason in: {msg}");
    }

    #[test]
    fn out_of_bounds_includes_coordinates_and_dimensions() {
        let err = EngineError::OutOfBounds {
            x: 10,
            y: 20,
            width: 8,
            height: 8,
        };
        let msg = format!("{err}");
        assert!(msg.contains("10"), "missing x in: {msg}");
        assert!(msg.contains("20"), "missing y in: {msg}");
        assert!(msg.contains("8"), "missing dimension in: {msg}");
    }

    #[test]
    fn dimension_mismatch_includes_all_dimensions() {
        let err = EngineError::DimensionMismatch {
            lhs_w: 10,
            lhs_h: 20,
            rhs_w: 30,
            rhs_h: 40,
        };
        let msg = format!("{err}");
        for n in ["10", "20", "30", "40"] {
            assert!(msg.contains(n), "missing {n} in: {msg}");
        }
    }

    #[test]
    fn unknown_engine_and_channel_include_names() {
        assert!(EngineError::UnknownEngine("lava".into())
            .to_string()
            .contains("lava"));
        assert!(EngineError::UnknownChannel("w".into())
            .to_string()
            .contains("w"));
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
