//! Distribution of products over parenthesized sums.
//!
//! One factor pair expands per step, which keeps traces readable: the
//! remaining factors wait for the next firing. A sum whose addends are all
//! numeric is never distributed — that shape is pending coefficient
//! arithmetic (`(1 + 1/2) * x` must add the fractions, not expand). A
//! cofactor that is a symbolic fraction is not distributed either; the
//! original engine flags that combination as fragile.

use crate::change::ChangeKind;
use crate::define_rule;
use crate::rule::Rewrite;
use mathwalk_ast::{numeric_value, Context, Expr, ExprId};
use num_traits::ToPrimitive;

/// Largest exponent expanded into a repeated product.
const MAX_EXPANDED_POWER: i64 = 4;

fn sum_addends(ctx: &Context, id: ExprId) -> Option<Vec<ExprId>> {
    match ctx.get(ctx.unwrap_parens(id)) {
        Expr::Add(terms) => Some(terms.clone()),
        _ => None,
    }
}

fn all_numeric(ctx: &Context, terms: &[ExprId]) -> bool {
    terms.iter().all(|&t| numeric_value(ctx, t).is_some())
}

/// Symbolic fraction cofactors are excluded (known-fragile in the source
/// engine); everything else may multiply into a sum.
fn can_distribute_over(ctx: &Context, cofactor: ExprId) -> bool {
    let bare = ctx.unwrap_parens(cofactor);
    !(matches!(ctx.get(bare), Expr::Div(_, _)) && !ctx.is_constant_subtree(bare))
}

define_rule!(
    DistributeRule,
    "Distribute Over a Sum",
    ChangeKind::Distribute,
    |ctx, expr| {
        let factors = match ctx.get(expr) {
            Expr::Mul(_, factors) => factors.clone(),
            _ => return None,
        };
        if factors.len() < 2 {
            return None;
        }
        for (i, &factor) in factors.iter().enumerate() {
            let addends = match sum_addends(ctx, factor) {
                Some(a) => a,
                None => continue,
            };
            if all_numeric(ctx, &addends) {
                continue;
            }
            let m = if i > 0 { i - 1 } else { i + 1 };
            let multiplier = factors[m];
            if !can_distribute_over(ctx, multiplier) {
                continue;
            }
            let products: Vec<ExprId> = addends
                .iter()
                .map(|&a| {
                    if m < i {
                        ctx.add(Expr::Mul(false, vec![multiplier, a]))
                    } else {
                        ctx.add(Expr::Mul(false, vec![a, multiplier]))
                    }
                })
                .collect();
            let sum = ctx.add(Expr::Add(products));
            let expanded = ctx.add(Expr::Paren(sum));

            let mut rest: Vec<ExprId> = Vec::with_capacity(factors.len() - 1);
            for (k, &f) in factors.iter().enumerate() {
                if k == i.min(m) {
                    rest.push(expanded);
                } else if k != i && k != m {
                    rest.push(f);
                }
            }
            let new_expr = if rest.len() == 1 {
                rest[0]
            } else {
                ctx.add(Expr::Mul(false, rest))
            };
            return Some(Rewrite::new(new_expr).desc("multiply each addend"));
        }
        None
    }
);

define_rule!(
    DistributePowRule,
    "Expand Power of a Sum",
    ChangeKind::Distribute,
    |ctx, expr| {
        if let Expr::Pow(base, exp) = ctx.get(expr) {
            let (base, exp) = (*base, *exp);
            let addends = sum_addends(ctx, base)?;
            if all_numeric(ctx, &addends) {
                return None;
            }
            let n = ctx
                .constant_value(exp)
                .filter(|v| v.is_integer())
                .and_then(|v| v.to_integer().to_i64())?;
            if !(2..=MAX_EXPANDED_POWER).contains(&n) {
                return None;
            }
            let bare = ctx.unwrap_parens(base);
            let copy = ctx.add(Expr::Paren(bare));
            let copies = vec![copy; n as usize];
            let new_expr = ctx.add(Expr::Mul(false, copies));
            return Some(
                Rewrite::new(new_expr).desc(format!("write the power as {} factors", n)),
            );
        }
        None
    }
);

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(DistributeRule));
    simplifier.add_rule(Box::new(DistributePowRule));
}
