pub mod display;
pub mod expression;
pub mod latex;
pub mod ordering;

pub use display::DisplayExpr;
pub use expression::{
    as_constant_fraction, as_signed_constant_fraction, numeric_value, Context, Expr, ExprId,
};
pub use latex::{Highlight, LatexExpr};
pub use ordering::exprs_equal;

use serde::Serialize;
use std::fmt;

/// Relational operator of an equation or inequality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelOp {
    Eq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl RelOp {
    /// Mirror for side swaps and for multiplication or division by a
    /// negative constant. Equality is its own mirror.
    pub fn flipped(self) -> RelOp {
        match self {
            RelOp::Eq => RelOp::Eq,
            RelOp::Lt => RelOp::Gt,
            RelOp::Gt => RelOp::Lt,
            RelOp::Leq => RelOp::Geq,
            RelOp::Geq => RelOp::Leq,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelOp::Eq => write!(f, "="),
            RelOp::Lt => write!(f, "<"),
            RelOp::Leq => write!(f, "<="),
            RelOp::Gt => write!(f, ">"),
            RelOp::Geq => write!(f, ">="),
        }
    }
}

/// A two-sided relation over one `Context`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Equation {
    pub lhs: ExprId,
    pub rhs: ExprId,
    pub op: RelOp,
}

impl Equation {
    pub fn new(lhs: ExprId, op: RelOp, rhs: ExprId) -> Self {
        Self { lhs, rhs, op }
    }

    pub fn display<'a>(&self, context: &'a Context) -> DisplayEquation<'a> {
        DisplayEquation {
            context,
            equation: *self,
        }
    }
}

pub struct DisplayEquation<'a> {
    pub context: &'a Context,
    pub equation: Equation,
}

impl<'a> fmt::Display for DisplayEquation<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            DisplayExpr {
                context: self.context,
                id: self.equation.lhs
            },
            self.equation.op,
            DisplayExpr {
                context: self.context,
                id: self.equation.rhs
            }
        )
    }
}
