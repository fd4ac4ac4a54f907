use std::fmt;

use optizenith_solver::{ConstraintOp, Sense};

use crate::LinearExpr;

/// `expression (<= | >= | =) rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    name: String,
    expression: LinearExpr,
    op: ConstraintOp,
    rhs: f64,
}

impl Constraint {
    pub fn new(expression: LinearExpr, op: ConstraintOp, rhs: f64) -> Self {
        Self {
            name: String::new(),
            expression,
            op,
            rhs,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &LinearExpr {
        &self.expression
    }

    pub fn op(&self) -> ConstraintOp {
        self.op
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            write!(f, "{}: ", self.name)?;
        }
        write!(f, "{} {} {}", self.expression, self.op.symbol(), self.rhs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    expression: LinearExpr,
    sense: Sense,
}

impl Objective {
    pub fn new(expression: LinearExpr, sense: Sense) -> Self {
        Self { expression, sense }
    }

    pub fn minimize(expression: LinearExpr) -> Self {
        Self::new(expression, Sense::Minimize)
    }

    pub fn maximize(expression: LinearExpr) -> Self {
        Self::new(expression, Sense::Maximize)
    }

    pub fn expression(&self) -> &LinearExpr {
        &self.expression
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sense = match self.sense {
            Sense::Minimize => "Minimize",
            Sense::Maximize => "Maximize",
        };
        write!(f, "{sense} {}", self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variable;

    #[test]
    fn test_constraint_display() {
        let x = Variable::nonnegative("x");
        let y = Variable::nonnegative("y");
        let c = (LinearExpr::from(&x) + LinearExpr::term(&y, 4.0))
            .leq(20.0)
            .named("b");
        assert_eq!(c.to_string(), "b: x + 4 y <= 20");
        assert_eq!(LinearExpr::from(&x).equals(1.5).to_string(), "x = 1.5");
    }

    #[test]
    fn test_objective_display() {
        let x = Variable::nonnegative("x");
        let objective = Objective::maximize(LinearExpr::term(&x, 2.0));
        assert_eq!(objective.sense(), Sense::Maximize);
        assert_eq!(objective.to_string(), "Maximize 2 x");
    }
}
