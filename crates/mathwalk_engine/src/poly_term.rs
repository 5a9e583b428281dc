//! The polynomial-term lens.
//!
//! A polynomial term is any subtree of the shape `coefficient · symbol ^
//! exponent`, with the coefficient and exponent optionally implicit. The
//! lens reads that shape without introducing a dedicated node kind; the
//! constructor rebuilds the canonical tree: implicit multiplication, the
//! coefficient's absolute value in front, and the sign as an outer `Neg`.

use mathwalk_ast::{numeric_value, Context, Expr, ExprId};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

#[derive(Debug, Clone)]
pub struct PolyTerm {
    /// Signed coefficient; `1` when the tree carries none.
    pub coefficient: BigRational,
    pub symbol: String,
    /// `None` means exponent `1`.
    pub exponent: Option<ExprId>,
}

impl PolyTerm {
    /// Read a polynomial term out of a subtree. Recognized shapes, each
    /// optionally behind parentheses or a negation:
    /// `x`, `x^e`, `c * term`, `term * c`, `term / c`.
    pub fn from_expr(ctx: &Context, id: ExprId) -> Option<PolyTerm> {
        let id = ctx.unwrap_parens(id);
        match ctx.get(id) {
            Expr::Symbol(name) => Some(PolyTerm {
                coefficient: BigRational::one(),
                symbol: name.clone(),
                exponent: None,
            }),
            Expr::Pow(base, exp) => {
                let base = ctx.unwrap_parens(*base);
                match ctx.get(base) {
                    Expr::Symbol(name) => Some(PolyTerm {
                        coefficient: BigRational::one(),
                        symbol: name.clone(),
                        exponent: Some(*exp),
                    }),
                    _ => None,
                }
            }
            Expr::Neg(inner) => {
                let term = PolyTerm::from_expr(ctx, *inner)?;
                Some(PolyTerm {
                    coefficient: -term.coefficient,
                    ..term
                })
            }
            Expr::Mul(_, factors) if factors.len() == 2 => {
                let try_pair = |coef_id: ExprId, rest_id: ExprId| -> Option<PolyTerm> {
                    let c = numeric_value(ctx, coef_id)?;
                    let inner = PolyTerm::from_expr(ctx, rest_id)?;
                    Some(PolyTerm {
                        coefficient: c * inner.coefficient,
                        ..inner
                    })
                };
                try_pair(factors[0], factors[1]).or_else(|| try_pair(factors[1], factors[0]))
            }
            Expr::Div(num, den) => {
                let d = numeric_value(ctx, *den)?;
                if d.is_zero() {
                    return None;
                }
                let inner = PolyTerm::from_expr(ctx, *num)?;
                Some(PolyTerm {
                    coefficient: inner.coefficient / d,
                    ..inner
                })
            }
            _ => None,
        }
    }

    /// Degree as an exact number, when the exponent is constant.
    pub fn degree(&self, ctx: &Context) -> Option<BigRational> {
        match self.exponent {
            None => Some(BigRational::one()),
            Some(exp) => numeric_value(ctx, exp),
        }
    }

    /// Canonical subtree: `symbol`, `symbol^exp`, `coef·core` implicit, with
    /// negative coefficients hoisted into an outer `Neg`.
    pub fn build(&self, ctx: &mut Context) -> ExprId {
        let symbol = ctx.var(&self.symbol);
        let core = match self.exponent {
            None => symbol,
            Some(exp) => {
                if numeric_value(ctx, exp).is_some_and(|v| v.is_one()) {
                    symbol
                } else {
                    ctx.add(Expr::Pow(symbol, exp))
                }
            }
        };
        let magnitude = self.coefficient.abs();
        let unsigned = if magnitude.is_one() {
            core
        } else {
            let coef = ctx.rat(&magnitude);
            ctx.add(Expr::Mul(true, vec![coef, core]))
        };
        if self.coefficient.is_negative() {
            ctx.add(Expr::Neg(unsigned))
        } else {
            unsigned
        }
    }

}
