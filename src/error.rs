use thiserror::Error;

/// Failures of the numerical core.
///
/// Every variant carries a single descriptive message suitable for showing to
/// a user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// An input violates a model's physical precondition.
    #[error("Domain error: {0}")]
    Domain(String),

    /// The solver stopped without meeting its convergence tolerance.
    #[error(
        "No solution found: solver stopped after {iterations} iterations at x={last_value:.6} nm (residual {residual:.3e} m^2/s)."
    )]
    NonConvergence {
        iterations: usize,
        last_value: f64,
        residual: f64,
    },

    /// A sweep range that cannot produce a grid.
    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),
}

impl EstimateError {
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        let exit_code = match err {
            EstimateError::Domain(_) | EstimateError::InvalidSweep(_) => 2,
            EstimateError::NonConvergence { .. } => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_errors_map_to_exit_codes() {
        let domain: AppError = EstimateError::domain("a must be > 0").into();
        assert_eq!(domain.exit_code(), 2);
        assert!(domain.to_string().contains("a must be > 0"));

        let stalled: AppError = EstimateError::NonConvergence {
            iterations: 200,
            last_value: 3.0,
            residual: 1e-12,
        }
        .into();
        assert_eq!(stalled.exit_code(), 3);
        assert!(stalled.to_string().starts_with("No solution found"));
    }
}
