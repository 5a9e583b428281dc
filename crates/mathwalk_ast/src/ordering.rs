//! Structural comparison of expressions.
//!
//! Comparison ignores `Paren` wrappers and the implicit-multiplication flag:
//! both are display artifacts. Child order is significant — the engine keeps
//! rewrites source-order stable, so `x + 1` and `1 + x` are distinct.

use crate::{Context, Expr, ExprId};

/// Structural equality modulo parentheses and implicit-multiplication flags.
pub fn exprs_equal(ctx: &Context, a: ExprId, b: ExprId) -> bool {
    let a = ctx.unwrap_parens(a);
    let b = ctx.unwrap_parens(b);
    if a == b {
        return true;
    }
    match (ctx.get(a), ctx.get(b)) {
        (Expr::Number(x), Expr::Number(y)) => x == y,
        (Expr::Symbol(x), Expr::Symbol(y)) => x == y,
        (Expr::Add(xs), Expr::Add(ys)) => ids_equal(ctx, xs, ys),
        (Expr::Mul(_, xs), Expr::Mul(_, ys)) => ids_equal(ctx, xs, ys),
        (Expr::Sub(a1, a2), Expr::Sub(b1, b2))
        | (Expr::Div(a1, a2), Expr::Div(b1, b2))
        | (Expr::Pow(a1, a2), Expr::Pow(b1, b2)) => {
            exprs_equal(ctx, *a1, *b1) && exprs_equal(ctx, *a2, *b2)
        }
        (Expr::Neg(x), Expr::Neg(y)) => exprs_equal(ctx, *x, *y),
        (Expr::Function(n1, xs), Expr::Function(n2, ys)) => n1 == n2 && ids_equal(ctx, xs, ys),
        _ => false,
    }
}

fn ids_equal(ctx: &Context, xs: &[ExprId], ys: &[ExprId]) -> bool {
    xs.len() == ys.len()
        && xs
            .iter()
            .zip(ys.iter())
            .all(|(&x, &y)| exprs_equal(ctx, x, y))
}
