//! ASCII rendering of expressions.
//!
//! The printer owns the spacing conventions of the step trace:
//! - `a + Neg(b)` prints as `a - b`,
//! - constant divisions print compactly (`2/3`, `(4 + 3)/5`) while symbolic
//!   divisions keep spaces (`x / y`),
//! - canonical polynomial terms print implicitly (`2x`, `5x^3`, `3/2 x`),
//!   every other product uses ` * `,
//! - unary minus parenthesizes sums only: `-(a + b)` but `-x` and `-8x^2`.
//!
//! Everything printed here re-parses to a structurally equivalent tree; the
//! round-trip contract in the engine's tests depends on it.

use crate::expression::as_constant_fraction;
use crate::{Context, Expr, ExprId};
use std::fmt;

pub struct DisplayExpr<'a> {
    pub context: &'a Context,
    pub id: ExprId,
}

impl<'a> DisplayExpr<'a> {
    fn at(&self, id: ExprId) -> DisplayExpr<'a> {
        DisplayExpr {
            context: self.context,
            id,
        }
    }

    fn write_in_parens(&self, f: &mut fmt::Formatter<'_>, id: ExprId) -> fmt::Result {
        write!(f, "({})", self.at(id))
    }
}

/// True when the node is the coefficient slot of a displayable polynomial
/// term: a plain constant, or a constant fraction.
fn is_term_coefficient(ctx: &Context, id: ExprId) -> bool {
    ctx.constant_value(id).is_some() || as_constant_fraction(ctx, id).is_some()
}

/// True when the node is a symbol, or a power of a symbol.
fn is_term_core(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Symbol(_) => true,
        Expr::Pow(base, _) => matches!(ctx.get(ctx.unwrap_parens(*base)), Expr::Symbol(_)),
        _ => false,
    }
}

impl<'a> fmt::Display for DisplayExpr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.context;
        match ctx.get(self.id) {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Paren(inner) => self.write_in_parens(f, *inner),
            Expr::Neg(inner) => {
                write!(f, "-")?;
                match ctx.get(*inner) {
                    Expr::Add(_) | Expr::Sub(_, _) => self.write_in_parens(f, *inner),
                    _ => write!(f, "{}", self.at(*inner)),
                }
            }
            Expr::Add(terms) => {
                for (i, &term) in terms.iter().enumerate() {
                    if i == 0 {
                        write!(f, "{}", self.at(term))?;
                        continue;
                    }
                    if let Expr::Neg(inner) = ctx.get(term) {
                        write!(f, " - ")?;
                        match ctx.get(*inner) {
                            Expr::Add(_) | Expr::Sub(_, _) => self.write_in_parens(f, *inner)?,
                            _ => write!(f, "{}", self.at(*inner))?,
                        }
                    } else {
                        write!(f, " + {}", self.at(term))?;
                    }
                }
                Ok(())
            }
            Expr::Sub(l, r) => {
                write!(f, "{} - ", self.at(*l))?;
                match ctx.get(*r) {
                    Expr::Add(_) | Expr::Sub(_, _) | Expr::Neg(_) => self.write_in_parens(f, *r),
                    _ => write!(f, "{}", self.at(*r)),
                }
            }
            Expr::Mul(_, factors) => {
                // Canonical polynomial term: coefficient directly against
                // the symbol part. `2x`, `5x^3`; fraction coefficients get
                // one space: `3/2 x`. The implicit flag is not required —
                // whether the source wrote `2 * x` or `2x`, the term shape
                // itself earns the implicit rendering.
                if factors.len() == 2
                    && is_term_coefficient(ctx, factors[0])
                    && is_term_core(ctx, factors[1])
                {
                    let sep = if as_constant_fraction(ctx, factors[0]).is_some() {
                        " "
                    } else {
                        ""
                    };
                    return write!(f, "{}{}{}", self.at(factors[0]), sep, self.at(factors[1]));
                }
                for (i, &factor) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, " * ")?;
                    }
                    let needs_parens = match ctx.get(factor) {
                        Expr::Add(_) | Expr::Sub(_, _) => true,
                        Expr::Neg(_) if i > 0 => true,
                        Expr::Div(_, _) if i > 0 => !ctx.is_constant_subtree(factor),
                        _ => false,
                    };
                    if needs_parens {
                        self.write_in_parens(f, factor)?;
                    } else {
                        write!(f, "{}", self.at(factor))?;
                    }
                }
                Ok(())
            }
            Expr::Div(num, den) => {
                let compact = ctx.is_constant_subtree(self.id);
                let slash = if compact { "/" } else { " / " };
                let num_parens = match ctx.get(*num) {
                    Expr::Add(_) | Expr::Sub(_, _) => true,
                    Expr::Mul(_, _) => compact,
                    _ => false,
                };
                if num_parens {
                    self.write_in_parens(f, *num)?;
                } else {
                    write!(f, "{}", self.at(*num))?;
                }
                write!(f, "{}", slash)?;
                let den_parens = matches!(
                    ctx.get(*den),
                    Expr::Add(_) | Expr::Sub(_, _) | Expr::Mul(_, _) | Expr::Div(_, _)
                );
                if den_parens {
                    self.write_in_parens(f, *den)
                } else {
                    write!(f, "{}", self.at(*den))
                }
            }
            Expr::Pow(base, exp) => {
                let base_parens = matches!(
                    ctx.get(*base),
                    Expr::Add(_)
                        | Expr::Sub(_, _)
                        | Expr::Mul(_, _)
                        | Expr::Div(_, _)
                        | Expr::Neg(_)
                        | Expr::Pow(_, _)
                );
                if base_parens {
                    self.write_in_parens(f, *base)?;
                } else {
                    write!(f, "{}", self.at(*base))?;
                }
                write!(f, "^")?;
                let exp_parens = matches!(
                    ctx.get(*exp),
                    Expr::Add(_)
                        | Expr::Sub(_, _)
                        | Expr::Mul(_, _)
                        | Expr::Div(_, _)
                        | Expr::Neg(_)
                        | Expr::Pow(_, _)
                );
                if exp_parens {
                    self.write_in_parens(f, *exp)
                } else {
                    write!(f, "{}", self.at(*exp))
                }
            }
            Expr::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, &arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.at(arg))?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(ctx: &Context, id: ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn sum_with_negated_term_prints_as_subtraction() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let three = ctx.num(3);
        let neg = ctx.add(Expr::Neg(three));
        let sum = ctx.add(Expr::Add(vec![x, neg]));
        assert_eq!(show(&ctx, sum), "x - 3");
    }

    #[test]
    fn constant_division_prints_compactly() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let three = ctx.num(3);
        let frac = ctx.add(Expr::Div(two, three));
        assert_eq!(show(&ctx, frac), "2/3");

        let x = ctx.var("x");
        let y = ctx.var("y");
        let div = ctx.add(Expr::Div(x, y));
        assert_eq!(show(&ctx, div), "x / y");
    }

    #[test]
    fn grouped_numerator_keeps_its_parens() {
        let mut ctx = Context::new();
        let four = ctx.num(4);
        let three = ctx.num(3);
        let sum = ctx.add(Expr::Add(vec![four, three]));
        let grouped = ctx.add(Expr::Paren(sum));
        let five = ctx.num(5);
        let div = ctx.add(Expr::Div(grouped, five));
        assert_eq!(show(&ctx, div), "(4 + 3)/5");
    }

    #[test]
    fn polynomial_terms_print_implicitly() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let x = ctx.var("x");
        let term = ctx.add(Expr::Mul(true, vec![two, x]));
        assert_eq!(show(&ctx, term), "2x");

        let five = ctx.num(5);
        let x2 = ctx.var("x");
        let three = ctx.num(3);
        let pow = ctx.add(Expr::Pow(x2, three));
        let cubic = ctx.add(Expr::Mul(true, vec![five, pow]));
        assert_eq!(show(&ctx, cubic), "5x^3");

        let neg = ctx.add(Expr::Neg(cubic));
        assert_eq!(show(&ctx, neg), "-5x^3");
    }

    #[test]
    fn fraction_coefficient_gets_a_space() {
        let mut ctx = Context::new();
        let three = ctx.num(3);
        let two = ctx.num(2);
        let frac = ctx.add(Expr::Div(three, two));
        let x = ctx.var("x");
        let term = ctx.add(Expr::Mul(true, vec![frac, x]));
        assert_eq!(show(&ctx, term), "3/2 x");
    }

    #[test]
    fn unary_minus_parenthesizes_sums_only() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let sum = ctx.add(Expr::Add(vec![a, b]));
        let neg_sum = ctx.add(Expr::Neg(sum));
        assert_eq!(show(&ctx, neg_sum), "-(a + b)");

        let x = ctx.var("x");
        let neg_x = ctx.add(Expr::Neg(x));
        assert_eq!(show(&ctx, neg_x), "-x");
    }

    #[test]
    fn explicit_product_spells_out_the_operator() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let x = ctx.var("x");
        let three = ctx.num(3);
        let x_pow = ctx.add(Expr::Pow(x, three));
        let y = ctx.var("y");
        let four = ctx.num(4);
        let y_pow = ctx.add(Expr::Pow(y, four));
        let product = ctx.add(Expr::Mul(false, vec![two, x_pow, y_pow]));
        assert_eq!(show(&ctx, product), "2 * x^3 * y^4");
    }
}
