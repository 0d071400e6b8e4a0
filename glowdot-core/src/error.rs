//! Errors raised by the projection and billboard math

/// Magnitude below which a perspective divisor or a vector length is
/// treated as zero.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Failure of a single per-point geometric computation
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// A divisor or a vector to normalize is zero, near zero or not finite
    #[error("degenerate geometry: {what}")]
    DegenerateGeometry { what: &'static str },

    /// Billboard radius is not a finite, strictly positive number
    #[error("invalid radius {0}, expected a finite value > 0")]
    InvalidRadius(f32),
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// Returns `value` if it can safely be used as a divisor or norm.
pub(crate) fn non_degenerate(value: f32, what: &'static str) -> GeometryResult<f32> {
    if !value.is_finite() || value.abs() < DEGENERATE_EPSILON {
        return Err(GeometryError::DegenerateGeometry { what });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_degenerate_rejects_zero_and_nan() {
        assert!(non_degenerate(0.0, "w").is_err());
        assert!(non_degenerate(1e-9, "w").is_err());
        assert!(non_degenerate(f32::NAN, "w").is_err());
        assert!(non_degenerate(f32::INFINITY, "w").is_err());
        assert_eq!(non_degenerate(-2.0, "w"), Ok(-2.0));
    }

    #[test]
    fn test_error_messages() {
        let err = GeometryError::DegenerateGeometry { what: "perspective divisor w" };
        assert_eq!(err.to_string(), "degenerate geometry: perspective divisor w");
        assert_eq!(
            GeometryError::InvalidRadius(-1.0).to_string(),
            "invalid radius -1, expected a finite value > 0"
        );
    }
}
