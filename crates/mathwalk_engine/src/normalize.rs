//! Tree normalization.
//!
//! `flatten` establishes the n-ary invariants: no `+` directly under `+`,
//! no `*` directly under `*`, no `Sub` nodes, and division chains collapsed
//! into a single denominator product. `remove_unnecessary_parens` then
//! strips grouping that neither the printer nor any rule needs. Both run
//! once on parsed input and again after every rule firing; neither is a
//! visible step.

use crate::poly_term::PolyTerm;
use mathwalk_ast::{Context, Expr, ExprId};

/// Full normalization pass.
///
/// Stripping a parenthesis can expose a product inside a product
/// (`x/(y*z)/w` does it), so the two passes iterate to a fixed point. Both
/// passes return the identical node id when nothing changed, which is the
/// loop's exit condition; two or three rounds settle any tree.
pub fn normalize(ctx: &mut Context, id: ExprId) -> ExprId {
    let mut current = id;
    for _ in 0..32 {
        let flat = flatten(ctx, current);
        let next = remove_unnecessary_parens(ctx, flat, Slot::Root);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// A `Mul` that reads as one polynomial term (`2x`, `-x^3`, `2/3 y^2`)
/// stays atomic inside an enclosing product, so the like-term rules see it
/// as a unit rather than as loose factors.
pub(crate) fn is_atomic_term(ctx: &Context, id: ExprId) -> bool {
    matches!(ctx.get(id), Expr::Mul(true, _)) && PolyTerm::from_expr(ctx, id).is_some()
}

pub fn flatten(ctx: &mut Context, id: ExprId) -> ExprId {
    match ctx.get(id).clone() {
        Expr::Number(_) | Expr::Symbol(_) => id,
        Expr::Paren(inner) => {
            let new_inner = flatten(ctx, inner);
            if new_inner == inner {
                id
            } else {
                ctx.add(Expr::Paren(new_inner))
            }
        }
        Expr::Neg(inner) => {
            let new_inner = flatten(ctx, inner);
            if new_inner == inner {
                id
            } else {
                ctx.add(Expr::Neg(new_inner))
            }
        }
        Expr::Function(name, args) => {
            let new_args: Vec<ExprId> = args.iter().map(|&a| flatten(ctx, a)).collect();
            if new_args == args {
                id
            } else {
                ctx.add(Expr::Function(name, new_args))
            }
        }
        Expr::Pow(base, exp) => {
            let new_base = flatten(ctx, base);
            let new_exp = flatten(ctx, exp);
            if new_base == base && new_exp == exp {
                id
            } else {
                ctx.add(Expr::Pow(new_base, new_exp))
            }
        }
        Expr::Sub(lhs, rhs) => {
            let lhs = flatten(ctx, lhs);
            let rhs = flatten(ctx, rhs);
            let neg_rhs = ctx.add(Expr::Neg(rhs));
            let mut terms = match ctx.get(lhs).clone() {
                Expr::Add(ts) => ts,
                _ => vec![lhs],
            };
            terms.push(neg_rhs);
            ctx.add(Expr::Add(terms))
        }
        Expr::Add(terms) => {
            let flattened: Vec<ExprId> = terms.iter().map(|&t| flatten(ctx, t)).collect();
            let mut merged: Vec<ExprId> = Vec::with_capacity(flattened.len());
            let mut changed = flattened != terms;
            for t in flattened {
                match ctx.get(ctx.unwrap_parens(t)).clone() {
                    Expr::Add(inner) => {
                        merged.extend(inner);
                        changed = true;
                    }
                    _ => merged.push(t),
                }
            }
            if merged.len() == 1 {
                return merged[0];
            }
            if changed {
                ctx.add(Expr::Add(merged))
            } else {
                id
            }
        }
        Expr::Mul(implicit, factors) => {
            let flattened: Vec<ExprId> = factors.iter().map(|&f| flatten(ctx, f)).collect();
            let mut merged: Vec<ExprId> = Vec::with_capacity(flattened.len());
            let mut changed = flattened != factors;
            let mut merged_any = false;
            for f in flattened {
                let bare = ctx.unwrap_parens(f);
                if !is_atomic_term(ctx, bare) {
                    if let Expr::Mul(_, inner) = ctx.get(bare).clone() {
                        merged.extend(inner);
                        changed = true;
                        merged_any = true;
                        continue;
                    }
                }
                merged.push(f);
            }
            if merged.len() == 1 {
                return merged[0];
            }
            if changed {
                ctx.add(Expr::Mul(implicit && !merged_any, merged))
            } else {
                id
            }
        }
        Expr::Div(num, den) => {
            let mut numerator = flatten(ctx, num);
            let mut denominators = vec![flatten(ctx, den)];
            // a / b / c groups its denominators into one product; the left
            // spine collapses through grouping parens ((a/b)/c is a/b/c).
            loop {
                let bare = ctx.unwrap_parens(numerator);
                match ctx.get(bare).clone() {
                    Expr::Div(inner_num, inner_den) => {
                        denominators.push(inner_den);
                        numerator = inner_num;
                    }
                    _ => break,
                }
            }
            denominators.reverse();
            let new_den = if denominators.len() == 1 {
                denominators[0]
            } else {
                ctx.add(Expr::Mul(false, denominators))
            };
            let orig_num = num;
            let orig_den = den;
            if numerator == orig_num && new_den == orig_den {
                id
            } else {
                ctx.add(Expr::Div(numerator, new_den))
            }
        }
    }
}

/// Where a node sits relative to its parent; governs which parentheses are
/// redundant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Root,
    AddTerm,
    MulFactor,
    DivNumerator,
    DivDenominator,
    PowBase,
    PowExponent,
    NegInner,
    FunctionArg,
}

pub fn remove_unnecessary_parens(ctx: &mut Context, id: ExprId, slot: Slot) -> ExprId {
    match ctx.get(id).clone() {
        Expr::Number(_) | Expr::Symbol(_) => id,
        Expr::Paren(original) => {
            let inner = remove_unnecessary_parens(ctx, original, slot);
            if paren_is_redundant(ctx, inner, slot) {
                inner
            } else if matches!(ctx.get(inner), Expr::Paren(_)) {
                inner
            } else if inner == original {
                id
            } else {
                ctx.add(Expr::Paren(inner))
            }
        }
        Expr::Add(terms) => {
            let new: Vec<ExprId> = terms
                .iter()
                .map(|&t| remove_unnecessary_parens(ctx, t, Slot::AddTerm))
                .collect();
            if new == terms {
                id
            } else {
                ctx.add(Expr::Add(new))
            }
        }
        Expr::Mul(implicit, factors) => {
            let new: Vec<ExprId> = factors
                .iter()
                .map(|&f| remove_unnecessary_parens(ctx, f, Slot::MulFactor))
                .collect();
            if new == factors {
                id
            } else {
                ctx.add(Expr::Mul(implicit, new))
            }
        }
        Expr::Sub(l, r) => {
            let nl = remove_unnecessary_parens(ctx, l, Slot::AddTerm);
            let nr = remove_unnecessary_parens(ctx, r, Slot::AddTerm);
            if nl == l && nr == r {
                id
            } else {
                ctx.add(Expr::Sub(nl, nr))
            }
        }
        Expr::Div(num, den) => {
            let nn = remove_unnecessary_parens(ctx, num, Slot::DivNumerator);
            let nd = remove_unnecessary_parens(ctx, den, Slot::DivDenominator);
            if nn == num && nd == den {
                id
            } else {
                ctx.add(Expr::Div(nn, nd))
            }
        }
        Expr::Pow(base, exp) => {
            let nb = remove_unnecessary_parens(ctx, base, Slot::PowBase);
            let ne = remove_unnecessary_parens(ctx, exp, Slot::PowExponent);
            if nb == base && ne == exp {
                id
            } else {
                ctx.add(Expr::Pow(nb, ne))
            }
        }
        Expr::Neg(inner) => {
            let ni = remove_unnecessary_parens(ctx, inner, Slot::NegInner);
            if ni == inner {
                id
            } else {
                ctx.add(Expr::Neg(ni))
            }
        }
        Expr::Function(name, args) => {
            let new: Vec<ExprId> = args
                .iter()
                .map(|&a| remove_unnecessary_parens(ctx, a, Slot::FunctionArg))
                .collect();
            if new == args {
                id
            } else {
                ctx.add(Expr::Function(name, new))
            }
        }
    }
}

fn paren_is_redundant(ctx: &Context, inner: ExprId, slot: Slot) -> bool {
    match ctx.get(inner) {
        // Leaves and calls never need grouping.
        Expr::Number(_) | Expr::Symbol(_) | Expr::Function(_, _) => true,
        Expr::Paren(_) => false, // handled by the caller's double-paren collapse
        Expr::Neg(_) => match slot {
            // `a + (-b)` keeps its parens: stripping them is the visible
            // resolve-add-unary-minus step.
            Slot::AddTerm => false,
            _ => true,
        },
        Expr::Add(_) | Expr::Sub(_, _) => match slot {
            Slot::Root | Slot::AddTerm | Slot::FunctionArg => true,
            // Grouping in products and fraction slots is meaningful:
            // `(4 + 3)/5`, `(1 + 1/2) * x`.
            Slot::MulFactor | Slot::DivNumerator | Slot::DivDenominator => false,
            // The printer re-parenthesizes power bases and exponents itself.
            Slot::PowBase | Slot::PowExponent => true,
            Slot::NegInner => true,
        },
        Expr::Mul(_, _) => match slot {
            // `(4 * 5)/(9 * 5)` keeps its product grouping.
            Slot::DivNumerator | Slot::DivDenominator => false,
            _ => true,
        },
        Expr::Div(_, _) => match slot {
            // `x/(4/2)` stays grouped in the denominator.
            Slot::DivDenominator => false,
            _ => true,
        },
        Expr::Pow(_, _) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathwalk_ast::DisplayExpr;
    use mathwalk_parser::parse;

    fn normalized(input: &str) -> (Context, ExprId) {
        let mut ctx = Context::new();
        let id = parse(input, &mut ctx).expect("parse failed");
        let id = normalize(&mut ctx, id);
        (ctx, id)
    }

    fn show(ctx: &Context, id: ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn addition_chains_become_one_node() {
        let (ctx, id) = normalized("a + (b + c) + d");
        match ctx.get(id) {
            Expr::Add(terms) => assert_eq!(terms.len(), 4),
            other => panic!("expected Add, got {:?}", other),
        }
    }

    #[test]
    fn subtraction_becomes_added_negation() {
        let (ctx, id) = normalized("a - b + c");
        match ctx.get(id) {
            Expr::Add(terms) => {
                assert_eq!(terms.len(), 3);
                assert!(matches!(ctx.get(terms[1]), Expr::Neg(_)));
            }
            other => panic!("expected Add, got {:?}", other),
        }
    }

    #[test]
    fn division_chain_groups_denominators() {
        let (ctx, id) = normalized("a / b / c");
        match ctx.get(id) {
            Expr::Div(num, den) => {
                assert!(matches!(ctx.get(*num), Expr::Symbol(_)));
                match ctx.get(*den) {
                    Expr::Mul(_, fs) => assert_eq!(fs.len(), 2),
                    other => panic!("expected product denominator, got {:?}", other),
                }
            }
            other => panic!("expected Div, got {:?}", other),
        }
    }

    #[test]
    fn polynomial_terms_stay_atomic_in_products() {
        let (ctx, id) = normalized("2x * 3y");
        match ctx.get(id) {
            Expr::Mul(_, fs) => {
                assert_eq!(fs.len(), 2);
                assert!(matches!(ctx.get(fs[0]), Expr::Mul(true, _)));
            }
            other => panic!("expected two-factor product, got {:?}", other),
        }
    }

    #[test]
    fn plain_nested_products_merge() {
        let (ctx, id) = normalized("x * (y * z)");
        match ctx.get(id) {
            Expr::Mul(_, fs) => assert_eq!(fs.len(), 3),
            other => panic!("expected merged product, got {:?}", other),
        }
    }

    #[test]
    fn negated_addend_keeps_parens_until_the_rule_fires() {
        let (ctx, id) = normalized("a + (-b)");
        match ctx.get(id) {
            Expr::Add(terms) => {
                assert!(matches!(ctx.get(terms[1]), Expr::Paren(_)));
            }
            other => panic!("expected Add, got {:?}", other),
        }
        assert_eq!(show(&ctx, id), "a + (-b)");
    }

    #[test]
    fn redundant_parens_are_stripped() {
        let (ctx, id) = normalized("((x)) + (y^2)");
        assert_eq!(show(&ctx, id), "x + y^2");
    }

    #[test]
    fn sum_grouping_survives_in_products_and_fractions() {
        let (ctx, id) = normalized("(1 + x) * 2");
        assert_eq!(show(&ctx, id), "(1 + x) * 2");

        let (ctx2, id2) = normalized("(4 + 3) / 5");
        assert_eq!(show(&ctx2, id2), "(4 + 3)/5");
    }
}
