//! Linear expressions over [`Variable`]s.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use optizenith_solver::ConstraintOp;

use crate::{Constraint, Variable};

/// `Σ coefficient · variable`, one term per distinct variable in insertion
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(Variable, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-term expression `coefficient · variable`.
    pub fn term(variable: &Variable, coefficient: f64) -> Self {
        let mut expr = Self::new();
        expr.add_term(variable, coefficient);
        expr
    }

    /// Adds `coefficient` to the coefficient of `variable`.
    pub fn add_term(&mut self, variable: &Variable, coefficient: f64) {
        match self.terms.iter_mut().find(|(v, _)| v == variable) {
            Some((_, existing)) => *existing += coefficient,
            None => self.terms.push((variable.clone(), coefficient)),
        }
    }

    /// Builder form of [`LinearExpr::add_term`].
    pub fn with_term(mut self, variable: &Variable, coefficient: f64) -> Self {
        self.add_term(variable, coefficient);
        self
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(v, c)| (v.clone(), c * factor))
                .collect(),
        }
    }

    /// Sum of two expressions.
    pub fn combine(&self, other: &LinearExpr) -> Self {
        let mut result = self.clone();
        for (v, c) in &other.terms {
            result.add_term(v, *c);
        }
        result
    }

    /// Coefficient of `variable`, zero when it does not appear.
    pub fn coefficient(&self, variable: &Variable) -> f64 {
        self.terms
            .iter()
            .find(|(v, _)| v == variable)
            .map_or(0.0, |(_, c)| *c)
    }

    pub fn terms(&self) -> &[(Variable, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn leq(self, rhs: f64) -> Constraint {
        Constraint::new(self, ConstraintOp::Le, rhs)
    }

    pub fn geq(self, rhs: f64) -> Constraint {
        Constraint::new(self, ConstraintOp::Ge, rhs)
    }

    pub fn equals(self, rhs: f64) -> Constraint {
        Constraint::new(self, ConstraintOp::Eq, rhs)
    }
}

impl From<&Variable> for LinearExpr {
    fn from(variable: &Variable) -> Self {
        LinearExpr::term(variable, 1.0)
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(self, rhs: LinearExpr) -> Self::Output {
        self.combine(&rhs)
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> Self::Output {
        self.combine(&rhs.scale(-1.0))
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> Self::Output {
        self.scale(-1.0)
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, (v, c)) in self.terms.iter().enumerate() {
            let magnitude = c.abs();
            match (i, *c < 0.0) {
                (0, true) => f.write_str("-")?,
                (0, false) => {}
                (_, true) => f.write_str(" - ")?,
                (_, false) => f.write_str(" + ")?,
            }
            if magnitude != 1.0 {
                write!(f, "{magnitude} ")?;
            }
            f.write_str(v.name())?;
        }
        Ok(())
    }
}
