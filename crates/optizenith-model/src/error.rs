use optizenith_solver::SolveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("[VARIABLE_INVALID_BOUNDS] Variable {name} has invalid bounds [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: f64, upper: f64 },
    #[error("[VARIABLE_DUPLICATE] Variable {name} was already added to the model")]
    DuplicateVariable { name: String },
    #[error("[VARIABLE_UNKNOWN] Variable {name} is not part of the model")]
    UnknownVariable { name: String },
    #[error(transparent)]
    Solve(#[from] SolveError),
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::DuplicateVariable { .. } => "VARIABLE_DUPLICATE",
            ModelError::UnknownVariable { .. } => "VARIABLE_UNKNOWN",
            ModelError::Solve(err) => err.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_error_is_transparent() {
        let err = ModelError::from(SolveError::MissingObjective);
        assert_eq!(err.code(), "OBJECTIVE_MISSING");
        assert_eq!(err.to_string(), SolveError::MissingObjective.to_string());
    }

    #[test]
    fn test_unknown_variable_message() {
        let err = ModelError::UnknownVariable { name: "z".to_string() };
        assert_eq!(err.code(), "VARIABLE_UNKNOWN");
        assert!(err.to_string().contains("Variable z"));
    }
}
