//! Cancellation of common factors across a division.
//!
//! Both sides of the fraction are decomposed into signed factor lists
//! (negations hoisted, products flattened through parentheses, polynomial
//! terms split into coefficient and core). One matching pair cancels per
//! firing: an identical subtree, a same-symbol power pair (reported as
//! `DIVIDE_POLY_TERM`), or a constant pair sharing a gcd. Pure constant
//! fractions are excluded — reducing those is the fraction rules' job.

use crate::change::ChangeKind;
use crate::define_rule;
use crate::helpers::gcd;
use crate::rule::Rewrite;
use mathwalk_ast::{
    as_constant_fraction, exprs_equal, Context, Expr, ExprId,
};
use num_traits::{One, Signed};

/// Split a subtree into (negative?, factors), looking through parentheses
/// and nested products.
fn signed_factors(ctx: &Context, id: ExprId) -> (bool, Vec<ExprId>) {
    let id = ctx.unwrap_parens(id);
    match ctx.get(id).clone() {
        Expr::Neg(inner) => {
            let (neg, factors) = signed_factors(ctx, inner);
            (!neg, factors)
        }
        Expr::Mul(_, fs) => {
            let mut negative = false;
            let mut all = Vec::new();
            for f in fs {
                let (neg, mut inner) = signed_factors(ctx, f);
                negative ^= neg;
                all.append(&mut inner);
            }
            (negative, all)
        }
        _ => (false, vec![id]),
    }
}

fn rebuild_side(ctx: &mut Context, factors: &[ExprId]) -> ExprId {
    match factors.len() {
        0 => ctx.num(1),
        1 => factors[0],
        _ => ctx.add(Expr::Mul(false, factors.to_vec())),
    }
}

struct Cancellation {
    numerator: Vec<ExprId>,
    denominator: Vec<ExprId>,
    change: ChangeKind,
    description: String,
}

fn find_cancellation(
    ctx: &mut Context,
    num_factors: &[ExprId],
    den_factors: &[ExprId],
) -> Option<Cancellation> {
    for (i, &a) in num_factors.iter().enumerate() {
        for (j, &b) in den_factors.iter().enumerate() {
            // Identical subtrees cancel outright.
            if exprs_equal(ctx, a, b) {
                let numerator = without(num_factors, i, None);
                let denominator = without(den_factors, j, None);
                return Some(Cancellation {
                    numerator,
                    denominator,
                    change: ChangeKind::Cancel,
                    description: "cancel the common factor".to_string(),
                });
            }
            // Powers of one symbol divide by subtracting exponents.
            if let (Some((sa, ea)), Some((sb, eb))) = (
                crate::helpers::as_symbol_power(ctx, a),
                crate::helpers::as_symbol_power(ctx, b),
            ) {
                if sa == sb {
                    let ea_node = ea.unwrap_or_else(|| ctx.num(1));
                    let eb_node = eb.unwrap_or_else(|| ctx.num(1));
                    let neg_eb = ctx.add(Expr::Neg(eb_node));
                    let exp = ctx.add(Expr::Add(vec![ea_node, neg_eb]));
                    let symbol = ctx.var(&sa);
                    let replacement = ctx.add(Expr::Pow(symbol, exp));
                    let numerator = without(num_factors, i, Some(replacement));
                    let denominator = without(den_factors, j, None);
                    return Some(Cancellation {
                        numerator,
                        denominator,
                        change: ChangeKind::DividePolyTerm,
                        description: format!("{0}^a / {0}^b = {0}^(a - b)", sa),
                    });
                }
            }
            // Constant pairs reduce by their gcd.
            if let (Some(va), Some(vb)) = (ctx.constant_value(a), ctx.constant_value(b)) {
                if va.is_integer() && vb.is_integer() {
                    let g = gcd(&va.to_integer().abs(), &vb.to_integer().abs());
                    if !g.is_one() {
                        let na = va / num_rational::BigRational::from_integer(g.clone());
                        let nb = vb / num_rational::BigRational::from_integer(g.clone());
                        let na_node = (!na.is_one() || num_factors.len() == 1)
                            .then(|| ctx.rat(&na));
                        let nb_node = (!nb.is_one() || den_factors.len() == 1)
                            .then(|| ctx.rat(&nb));
                        let numerator = match na_node {
                            Some(node) => without(num_factors, i, Some(node)),
                            None => without(num_factors, i, None),
                        };
                        let denominator = match nb_node {
                            Some(node) => without(den_factors, j, Some(node)),
                            None => without(den_factors, j, None),
                        };
                        return Some(Cancellation {
                            numerator,
                            denominator,
                            change: ChangeKind::Cancel,
                            description: format!("divide top and bottom by {}", g),
                        });
                    }
                }
            }
        }
    }
    None
}

fn without(factors: &[ExprId], index: usize, replacement: Option<ExprId>) -> Vec<ExprId> {
    let mut out = Vec::with_capacity(factors.len());
    for (k, &f) in factors.iter().enumerate() {
        if k == index {
            if let Some(r) = replacement {
                out.push(r);
            }
        } else {
            out.push(f);
        }
    }
    out
}

define_rule!(
    CancelCommonFactorsRule,
    "Cancel Common Factors",
    ChangeKind::Cancel,
    |ctx, expr| {
        let (num, den) = match ctx.get(expr) {
            Expr::Div(num, den) => (*num, *den),
            _ => return None,
        };
        // Pure constant fractions reduce via the gcd fraction rule instead.
        if as_constant_fraction(ctx, expr).is_some() {
            return None;
        }
        let (num_neg, num_factors) = signed_factors(ctx, num);
        let (den_neg, den_factors) = signed_factors(ctx, den);
        let cancellation = find_cancellation(ctx, &num_factors, &den_factors)?;

        let negative = num_neg ^ den_neg;
        let numerator = rebuild_side(ctx, &cancellation.numerator);
        let new_expr = if cancellation.denominator.is_empty() {
            if negative {
                ctx.add(Expr::Neg(numerator))
            } else {
                numerator
            }
        } else {
            let signed_num = if negative {
                ctx.add(Expr::Neg(numerator))
            } else {
                numerator
            };
            let denominator = rebuild_side(ctx, &cancellation.denominator);
            ctx.add(Expr::Div(signed_num, denominator))
        };
        Some(
            Rewrite::new(new_expr)
                .desc(cancellation.description)
                .with_change(cancellation.change),
        )
    }
);

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(CancelCommonFactorsRule));
}
