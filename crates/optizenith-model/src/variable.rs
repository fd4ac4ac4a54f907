use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ModelError;

/// Process-unique identity of a [`Variable`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(u64);

impl VariableId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        VariableId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableKind {
    #[default]
    Continuous,
    /// Accepted but relaxed to continuous by the solver
    Integer,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Continuous => "continuous",
            VariableKind::Integer => "integer",
        }
    }
}

/// A decision variable.
///
/// Variables are immutable values with validated bounds. Two variables are
/// equal when they share an identity, regardless of name: cloning keeps the
/// identity, constructing a new variable always gets a fresh one.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Variable {
    id: VariableId,
    name: String,
    lower: f64,
    upper: f64,
    kind: VariableKind,
}

impl Variable {
    /// Continuous variable with bounds `[lower, upper]`; either side may be
    /// infinite.
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Result<Self, ModelError> {
        Self::with_kind(name.into(), lower, upper, VariableKind::Continuous)
    }

    /// Same as [`Variable::new`].
    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Result<Self, ModelError> {
        Self::new(name, lower, upper)
    }

    /// Integer-flagged variable. Solved as its continuous relaxation.
    pub fn integer(name: impl Into<String>, lower: f64, upper: f64) -> Result<Self, ModelError> {
        Self::with_kind(name.into(), lower, upper, VariableKind::Integer)
    }

    /// `[0, +inf)`
    pub fn nonnegative(name: impl Into<String>) -> Self {
        Self::unchecked(name.into(), 0.0, f64::INFINITY)
    }

    /// `(-inf, +inf)`
    pub fn free(name: impl Into<String>) -> Self {
        Self::unchecked(name.into(), f64::NEG_INFINITY, f64::INFINITY)
    }

    /// The same variable with different bounds. The identity is kept, so the
    /// result is meant to replace `self` before it is added to a model.
    pub fn with_bounds(&self, lower: f64, upper: f64) -> Result<Self, ModelError> {
        check_bounds(&self.name, lower, upper)?;
        Ok(Self {
            lower,
            upper,
            ..self.clone()
        })
    }

    fn with_kind(name: String, lower: f64, upper: f64, kind: VariableKind) -> Result<Self, ModelError> {
        check_bounds(&name, lower, upper)?;
        Ok(Self {
            kind,
            ..Self::unchecked(name, lower, upper)
        })
    }

    fn unchecked(name: String, lower: f64, upper: f64) -> Self {
        Self {
            id: VariableId::next(),
            name,
            lower,
            upper,
            kind: VariableKind::Continuous,
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn is_integer(&self) -> bool {
        self.kind == VariableKind::Integer
    }
}

fn check_bounds(name: &str, lower: f64, upper: f64) -> Result<(), ModelError> {
    let invalid = lower.is_nan()
        || upper.is_nan()
        || lower > upper
        || lower == f64::INFINITY
        || upper == f64::NEG_INFINITY;
    if invalid {
        return Err(ModelError::InvalidBounds {
            name: name.to_string(),
            lower,
            upper,
        });
    }
    Ok(())
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): [{}, {}]",
            self.name,
            self.kind.as_str(),
            self.lower,
            self.upper
        )
    }
}
