/// Frozen numeric description of a linear programming problem.
///
/// This is the only input the engines consume. Variables are referenced by
/// their position in `variables`; terms naming the same variable twice in one
/// expression accumulate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LpProblem {
    /// Problem name (diagnostics only)
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Decision variables in column order
    pub variables: Vec<VariableSpec>,
    /// Constraints in row order
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<Constraint>,
    /// Objective function, if one has been set
    #[cfg_attr(feature = "serde", serde(default))]
    pub objective: Option<Objective>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    pub name: String,
    /// Lower bound, `f64::NEG_INFINITY` for a free variable
    #[cfg_attr(feature = "serde", serde(default, with = "lower_bound"))]
    pub lower: f64,
    /// Upper bound, `f64::INFINITY` when unbounded above
    #[cfg_attr(
        feature = "serde",
        serde(default = "unbounded_above", with = "upper_bound")
    )]
    pub upper: f64,
    /// Integrality tag. Carried as metadata, never enforced.
    #[cfg_attr(feature = "serde", serde(default))]
    pub integer: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Sparse coefficients as `(variable index, coefficient)`
    pub terms: Vec<(usize, f64)>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Sparse coefficients as `(variable index, coefficient)`
    pub terms: Vec<(usize, f64)>,
    /// Whether to minimize or maximize
    pub sense: Sense,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl VariableSpec {
    /// Continuous variable with bounds `[lower, upper]`.
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
            integer: false,
        }
    }

    /// Continuous variable in `[0, +inf)`.
    pub fn nonnegative(name: impl Into<String>) -> Self {
        Self::new(name, 0.0, f64::INFINITY)
    }

    /// Continuous variable in `(-inf, +inf)`.
    pub fn free(name: impl Into<String>) -> Self {
        Self::new(name, f64::NEG_INFINITY, f64::INFINITY)
    }
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }
}

impl Objective {
    pub fn minimize(terms: Vec<(usize, f64)>) -> Self {
        Self {
            terms,
            sense: Sense::Minimize,
        }
    }

    pub fn maximize(terms: Vec<(usize, f64)>) -> Self {
        Self {
            terms,
            sense: Sense::Maximize,
        }
    }

    /// Dense coefficient vector of length `n`, accumulating repeated terms.
    /// Indices `>= n` are ignored; validation rejects them before this is used.
    pub fn dense_coefficients(&self, n: usize) -> Vec<f64> {
        accumulate(&self.terms, n)
    }
}

impl Constraint {
    /// Dense coefficient vector of length `n`, accumulating repeated terms.
    pub fn dense_coefficients(&self, n: usize) -> Vec<f64> {
        accumulate(&self.terms, n)
    }
}

fn accumulate(terms: &[(usize, f64)], n: usize) -> Vec<f64> {
    let mut dense = vec![0.0; n];
    for &(j, coef) in terms {
        if let Some(slot) = dense.get_mut(j) {
            *slot += coef;
        }
    }
    dense
}

impl LpProblem {
    pub fn new(variables: Vec<VariableSpec>) -> Self {
        Self {
            name: String::new(),
            variables,
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn set_objective(&mut self, terms: Vec<(usize, f64)>, sense: Sense) {
        self.objective = Some(Objective { terms, sense });
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(usize, f64)>,
        op: ConstraintOp,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            terms,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(feature = "serde")]
fn unbounded_above() -> f64 {
    f64::INFINITY
}

// JSON has no infinities: an infinite bound is written as `null`.
#[cfg(feature = "serde")]
mod lower_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}

#[cfg(feature = "serde")]
mod upper_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        super::lower_bound::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
