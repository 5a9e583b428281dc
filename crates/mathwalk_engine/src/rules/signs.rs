//! Sign handling: double negation, the `a + (-b) → a - b` resolution, and
//! the fraction sign policy (`-a/-b → a/b`, `a/-b → -a/b`; a lone negative
//! numerator is already canonical).

use crate::change::ChangeKind;
use crate::define_rule;
use crate::rule::Rewrite;
use mathwalk_ast::{Expr, ExprId};

define_rule!(
    DoubleUnaryMinusRule,
    "Resolve Double Negation",
    ChangeKind::DoubleUnaryMinus,
    |ctx, expr| {
        if let Expr::Neg(inner) = ctx.get(expr) {
            let inner = ctx.unwrap_parens(*inner);
            if let Expr::Neg(deep) = ctx.get(inner) {
                return Some(Rewrite::new(*deep).desc("-(-a) = a"));
            }
        }
        None
    }
);

define_rule!(
    ResolveAddUnaryMinusRule,
    "Resolve Added Negation",
    ChangeKind::ResolveAddUnaryMinus,
    |ctx, expr| {
        if let Expr::Add(terms) = ctx.get(expr).clone() {
            let mut new_terms: Vec<ExprId> = Vec::with_capacity(terms.len());
            let mut changed = false;
            for &t in &terms {
                if let Expr::Paren(inner) = ctx.get(t) {
                    if matches!(ctx.get(*inner), Expr::Neg(_)) {
                        new_terms.push(*inner);
                        changed = true;
                        continue;
                    }
                }
                new_terms.push(t);
            }
            if changed {
                return Some(
                    Rewrite::new(ctx.add(Expr::Add(new_terms))).desc("a + (-b) = a - b"),
                );
            }
        }
        None
    }
);

define_rule!(
    FractionSignsRule,
    "Simplify Fraction Signs",
    ChangeKind::SimplifyFraction,
    |ctx, expr| {
        if let Expr::Div(num, den) = ctx.get(expr) {
            let (num, den) = (*num, *den);
            let num_bare = ctx.unwrap_parens(num);
            let den_bare = ctx.unwrap_parens(den);
            let num_neg = match ctx.get(num_bare) {
                Expr::Neg(inner) => Some(*inner),
                _ => None,
            };
            let den_neg = match ctx.get(den_bare) {
                Expr::Neg(inner) => Some(*inner),
                _ => None,
            };
            match (num_neg, den_neg) {
                (Some(n), Some(d)) => {
                    let new_expr = ctx.add(Expr::Div(n, d));
                    return Some(Rewrite::new(new_expr).desc("-a / -b = a / b"));
                }
                (None, Some(d)) => {
                    let neg_num = ctx.add(Expr::Neg(num));
                    let new_expr = ctx.add(Expr::Div(neg_num, d));
                    return Some(Rewrite::new(new_expr).desc("a / -b = -a / b"));
                }
                _ => {}
            }
        }
        None
    }
);

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(DoubleUnaryMinusRule));
    simplifier.add_rule(Box::new(ResolveAddUnaryMinusRule));
    simplifier.add_rule(Box::new(FractionSignsRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use mathwalk_ast::{Context, DisplayExpr};
    use mathwalk_parser::parse;

    fn apply(rule: &dyn Rule, input: &str) -> Option<String> {
        let mut ctx = Context::new();
        let id = parse(input, &mut ctx).expect("parse failed");
        let id = crate::normalize::normalize(&mut ctx, id);
        let rewrite = rule.apply(&mut ctx, id)?;
        Some(format!(
            "{}",
            DisplayExpr {
                context: &ctx,
                id: rewrite.new_expr
            }
        ))
    }

    #[test]
    fn double_negation_collapses() {
        assert_eq!(apply(&DoubleUnaryMinusRule, "-(-x)").as_deref(), Some("x"));
        assert_eq!(apply(&DoubleUnaryMinusRule, "-x"), None);
    }

    #[test]
    fn added_negation_resolves_to_subtraction() {
        assert_eq!(
            apply(&ResolveAddUnaryMinusRule, "a + (-b)").as_deref(),
            Some("a - b")
        );
        // A parsed subtraction has no parenthesized negation to resolve.
        assert_eq!(apply(&ResolveAddUnaryMinusRule, "a - b"), None);
    }

    #[test]
    fn fraction_sign_policy() {
        assert_eq!(apply(&FractionSignsRule, "-3/-2").as_deref(), Some("3/2"));
        assert_eq!(apply(&FractionSignsRule, "3/-2").as_deref(), Some("-3/2"));
        // Sign on the numerator is canonical.
        assert_eq!(apply(&FractionSignsRule, "-3/2"), None);
    }
}
