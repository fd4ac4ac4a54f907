use thiserror::Error;

/// Validation failures. These are raised before any numeric work starts;
/// numeric outcomes (infeasible, unbounded, ...) are reported through
/// [`crate::SolutionStatus`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("[MODEL_EMPTY] Model has no variables")]
    EmptyModel,
    #[error("[OBJECTIVE_MISSING] Model has no objective")]
    MissingObjective,
    #[error("[VARIABLE_UNKNOWN] {context} references unknown variable index {index}")]
    UnknownVariable { context: String, index: usize },
    #[error("[VARIABLE_INVALID_BOUNDS] Variable {variable} has invalid bounds [{lower}, {upper}]")]
    InvalidBounds {
        variable: String,
        lower: f64,
        upper: f64,
    },
    #[error("[COEFFICIENT_NON_FINITE] {context} contains a non-finite value")]
    NonFiniteCoefficient { context: String },
    #[error("[ENGINE_UNKNOWN] Unknown engine '{0}' (expected 'simplex' or 'interior-point')")]
    UnknownEngine(String),
    #[error("[CONFIG_INVALID] Invalid solver configuration: {0}")]
    InvalidConfig(String),
}

impl SolveError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolveError::EmptyModel => "MODEL_EMPTY",
            SolveError::MissingObjective => "OBJECTIVE_MISSING",
            SolveError::UnknownVariable { .. } => "VARIABLE_UNKNOWN",
            SolveError::InvalidBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            SolveError::NonFiniteCoefficient { .. } => "COEFFICIENT_NON_FINITE",
            SolveError::UnknownEngine(_) => "ENGINE_UNKNOWN",
            SolveError::InvalidConfig(_) => "CONFIG_INVALID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_code() {
        let msg = SolveError::MissingObjective.to_string();
        assert!(msg.contains("OBJECTIVE_MISSING"));
        assert!(msg.contains("no objective"));
    }

    #[test]
    fn test_unknown_variable_display() {
        let err = SolveError::UnknownVariable {
            context: "constraint 'cap'".to_string(),
            index: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("VARIABLE_UNKNOWN"));
        assert!(msg.contains("cap"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_unknown_engine_display() {
        let msg = SolveError::UnknownEngine("barrier".to_string()).to_string();
        assert!(msg.contains("ENGINE_UNKNOWN"));
        assert!(msg.contains("barrier"));
    }
}
