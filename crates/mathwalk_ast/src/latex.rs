//! LaTeX rendering, with optional change-group coloring.
//!
//! The renderer mirrors the ASCII printer's structure but emits `\frac`,
//! braced exponents and `\left( \right)` grouping. A single subtree can be
//! highlighted with `\textcolor`, keyed to the index of the change group a
//! step attached to it.

use crate::expression::as_constant_fraction;
use crate::{Context, Expr, ExprId};
use std::fmt;

/// Palette cycled by change-group index.
const GROUP_COLORS: [&str; 5] = ["red", "blue", "teal", "purple", "orange"];

#[derive(Debug, Clone, Copy)]
pub struct Highlight {
    pub target: ExprId,
    pub group: usize,
}

pub struct LatexExpr<'a> {
    pub context: &'a Context,
    pub id: ExprId,
    pub highlight: Option<Highlight>,
}

impl<'a> LatexExpr<'a> {
    pub fn new(context: &'a Context, id: ExprId) -> Self {
        Self {
            context,
            id,
            highlight: None,
        }
    }

    pub fn with_highlight(context: &'a Context, id: ExprId, target: ExprId, group: usize) -> Self {
        Self {
            context,
            id,
            highlight: Some(Highlight { target, group }),
        }
    }

    fn at(&self, id: ExprId) -> LatexExpr<'a> {
        LatexExpr {
            context: self.context,
            id,
            highlight: self.highlight,
        }
    }

    fn grouped(&self, f: &mut fmt::Formatter<'_>, id: ExprId) -> fmt::Result {
        write!(f, "\\left({}\\right)", self.at(id))
    }
}

impl<'a> fmt::Display for LatexExpr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(h) = self.highlight {
            if h.target == self.id {
                let color = GROUP_COLORS[h.group % GROUP_COLORS.len()];
                let plain = LatexExpr {
                    context: self.context,
                    id: self.id,
                    highlight: None,
                };
                return write!(f, "\\textcolor{{{}}}{{{}}}", color, plain);
            }
        }
        let ctx = self.context;
        match ctx.get(self.id) {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Paren(inner) => self.grouped(f, *inner),
            Expr::Neg(inner) => match ctx.get(*inner) {
                Expr::Add(_) | Expr::Sub(_, _) => {
                    write!(f, "-")?;
                    self.grouped(f, *inner)
                }
                _ => write!(f, "-{}", self.at(*inner)),
            },
            Expr::Add(terms) => {
                for (i, &term) in terms.iter().enumerate() {
                    if i == 0 {
                        write!(f, "{}", self.at(term))?;
                    } else if let Expr::Neg(inner) = ctx.get(term) {
                        write!(f, " - ")?;
                        match ctx.get(*inner) {
                            Expr::Add(_) | Expr::Sub(_, _) => self.grouped(f, *inner)?,
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
                    Expr::Add(_) | Expr::Sub(_, _) | Expr::Neg(_) => self.grouped(f, *r),
                    _ => write!(f, "{}", self.at(*r)),
                }
            }
            Expr::Mul(_, factors) => {
                let term_like = factors.len() == 2
                    && (ctx.constant_value(factors[0]).is_some()
                        || as_constant_fraction(ctx, factors[0]).is_some());
                for (i, &factor) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", if term_like { " " } else { " \\cdot " })?;
                    }
                    match ctx.get(factor) {
                        Expr::Add(_) | Expr::Sub(_, _) => self.grouped(f, factor)?,
                        Expr::Neg(_) if i > 0 => self.grouped(f, factor)?,
                        _ => write!(f, "{}", self.at(factor))?,
                    }
                }
                Ok(())
            }
            Expr::Div(num, den) => {
                write!(f, "\\frac{{{}}}{{{}}}", self.at(*num), self.at(*den))
            }
            Expr::Pow(base, exp) => {
                match ctx.get(*base) {
                    Expr::Add(_)
                    | Expr::Sub(_, _)
                    | Expr::Mul(_, _)
                    | Expr::Div(_, _)
                    | Expr::Neg(_)
                    | Expr::Pow(_, _) => self.grouped(f, *base)?,
                    _ => write!(f, "{}", self.at(*base))?,
                }
                write!(f, "^{{{}}}", self.at(*exp))
            }
            Expr::Function(name, args) => {
                if name == "abs" && args.len() == 1 {
                    return write!(f, "\\left|{}\\right|", self.at(args[0]));
                }
                write!(f, "\\mathrm{{{}}}\\left(", name)?;
                for (i, &arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.at(arg))?;
                }
                write!(f, "\\right)")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latex(ctx: &Context, id: ExprId) -> String {
        format!("{}", LatexExpr::new(ctx, id))
    }

    #[test]
    fn division_renders_as_frac() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let three = ctx.num(3);
        let frac = ctx.add(Expr::Div(two, three));
        assert_eq!(latex(&ctx, frac), "\\frac{2}{3}");
    }

    #[test]
    fn exponents_are_braced() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let pow = ctx.add(Expr::Pow(x, two));
        assert_eq!(latex(&ctx, pow), "x^{2}");
    }

    #[test]
    fn abs_renders_with_bars() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let abs = ctx.add(Expr::Function("abs".to_string(), vec![x]));
        assert_eq!(latex(&ctx, abs), "\\left|x\\right|");
    }

    #[test]
    fn highlight_wraps_target_in_textcolor() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let x = ctx.var("x");
        let term = ctx.add(Expr::Mul(true, vec![two, x]));
        let one = ctx.num(1);
        let sum = ctx.add(Expr::Add(vec![term, one]));
        let rendered = format!("{}", LatexExpr::with_highlight(&ctx, sum, term, 0));
        assert_eq!(rendered, "\\textcolor{red}{2 x} + 1");
    }
}
