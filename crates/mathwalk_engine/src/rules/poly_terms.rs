//! Like-term collection and polynomial-term products.
//!
//! `MultiplyLikeTermsRule` merges same-symbol factors of a product into one
//! power per symbol (`x · x → x^2`, `x^a · x^b → x^(a+b)`), multiplying the
//! coefficients exactly. `CombineLikeTermsRule` groups the addends of a sum
//! by (symbol, exponent) and rewrites each group of two or more as a
//! coefficient sum times the shared core, reordering the result by falling
//! degree with constants last. `CanonicalizePolyTermRule` rebuilds stray
//! coefficient-times-core products into the canonical implicit form the
//! printer renders as `2x` or `-8x^2`.

use crate::change::ChangeKind;
use crate::define_rule;
use crate::poly_term::PolyTerm;
use crate::rule::Rewrite;
use mathwalk_ast::{exprs_equal, numeric_value, Context, Expr, ExprId};
use num_rational::BigRational;
use num_traits::{One, Signed};
use rustc_hash::FxHashMap;

/// Exponent keys compare structurally, with a missing exponent equal to a
/// literal exponent of one.
fn exponents_match(ctx: &Context, a: Option<ExprId>, b: Option<ExprId>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => exprs_equal(ctx, x, y),
        (None, Some(e)) | (Some(e), None) => numeric_value(ctx, e).is_some_and(|v| v.is_one()),
    }
}

define_rule!(
    MultiplyLikeTermsRule,
    "Multiply Like Terms",
    ChangeKind::MultiplyPolyTerms,
    |ctx, expr| {
        let factors = match ctx.get(expr) {
            Expr::Mul(_, factors) => factors.clone(),
            _ => return None,
        };
        if factors.len() < 2 {
            return None;
        }

        struct SymbolGroup {
            symbol: String,
            exponents: Vec<Option<ExprId>>,
        }

        let mut groups: Vec<SymbolGroup> = Vec::new();
        let mut index_of: FxHashMap<String, usize> = FxHashMap::default();
        let mut coefficient = BigRational::one();
        let mut others: Vec<ExprId> = Vec::new();

        for &f in &factors {
            if let Some(v) = numeric_value(ctx, f) {
                coefficient *= v;
                continue;
            }
            if let Some(term) = PolyTerm::from_expr(ctx, f) {
                coefficient *= &term.coefficient;
                match index_of.get(&term.symbol) {
                    Some(&idx) => groups[idx].exponents.push(term.exponent),
                    None => {
                        index_of.insert(term.symbol.clone(), groups.len());
                        groups.push(SymbolGroup {
                            symbol: term.symbol,
                            exponents: vec![term.exponent],
                        });
                    }
                }
                continue;
            }
            others.push(f);
        }

        let merged: Vec<&SymbolGroup> =
            groups.iter().filter(|g| g.exponents.len() >= 2).collect();
        if merged.is_empty() {
            return None;
        }
        let description = format!(
            "multiply powers of {}",
            merged
                .iter()
                .map(|g| g.symbol.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut out: Vec<ExprId> = Vec::new();
        let magnitude = coefficient.abs();
        if !magnitude.is_one() {
            let c = ctx.rat(&magnitude);
            out.push(c);
        }
        for group in &groups {
            let symbol = ctx.var(&group.symbol);
            let core = if group.exponents.len() == 1 {
                match group.exponents[0] {
                    None => symbol,
                    Some(exp) => ctx.add(Expr::Pow(symbol, exp)),
                }
            } else {
                let exps: Vec<ExprId> = group
                    .exponents
                    .iter()
                    .map(|&e| e.unwrap_or_else(|| ctx.num(1)))
                    .collect();
                let exp_sum = ctx.add(Expr::Add(exps));
                ctx.add(Expr::Pow(symbol, exp_sum))
            };
            out.push(core);
        }
        out.extend(others);

        let body = match out.len() {
            0 => ctx.rat(&magnitude),
            1 => out[0],
            _ => ctx.add(Expr::Mul(false, out)),
        };
        let new_expr = if coefficient.is_negative() {
            ctx.add(Expr::Neg(body))
        } else {
            body
        };
        Some(Rewrite::new(new_expr).desc(description))
    }
);

define_rule!(
    CombineLikeTermsRule,
    "Combine Like Terms",
    ChangeKind::CombineLikeTerms,
    |ctx, expr| {
        let terms = match ctx.get(expr) {
            Expr::Add(terms) => terms.clone(),
            _ => return None,
        };
        if terms.len() < 2 {
            return None;
        }

        struct Group {
            symbol: String,
            exponent: Option<ExprId>,
            members: Vec<PolyTerm>,
            first_member: ExprId,
        }

        let mut groups: Vec<Group> = Vec::new();
        let mut tail: Vec<ExprId> = Vec::new(); // non-term addends, in order
        let mut numeric_tail: Vec<ExprId> = Vec::new(); // constants sort last

        for &t in &terms {
            if numeric_value(ctx, t).is_some() {
                numeric_tail.push(t);
                continue;
            }
            match PolyTerm::from_expr(ctx, t) {
                Some(term) => {
                    let position = groups.iter().position(|g| {
                        g.symbol == term.symbol && exponents_match(ctx, g.exponent, term.exponent)
                    });
                    match position {
                        Some(i) => groups[i].members.push(term),
                        None => groups.push(Group {
                            symbol: term.symbol.clone(),
                            exponent: term.exponent,
                            members: vec![term],
                            first_member: t,
                        }),
                    }
                }
                None => tail.push(t),
            }
        }

        if !groups.iter().any(|g| g.members.len() >= 2) {
            return None;
        }

        // Descending constant degree first, symbolic exponents after, both
        // stable; then non-term addends; constants close the sum.
        let degree_of = |g: &Group| -> Option<BigRational> {
            match g.exponent {
                None => Some(BigRational::one()),
                Some(e) => numeric_value(ctx, e),
            }
        };
        let mut ordered: Vec<usize> = (0..groups.len()).collect();
        ordered.sort_by(|&a, &b| {
            match (degree_of(&groups[a]), degree_of(&groups[b])) {
                (Some(da), Some(db)) => db.cmp(&da),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });

        let combined: Vec<String> = groups
            .iter()
            .filter(|g| g.members.len() >= 2)
            .map(|g| g.symbol.clone())
            .collect();

        let mut new_terms: Vec<ExprId> = Vec::new();
        for &gi in &ordered {
            let group = &groups[gi];
            if group.members.len() == 1 {
                new_terms.push(group.first_member);
                continue;
            }
            let coefs: Vec<ExprId> = group
                .members
                .iter()
                .map(|m| ctx.rat(&m.coefficient))
                .collect();
            let coef_sum = ctx.add(Expr::Add(coefs));
            let grouped = ctx.add(Expr::Paren(coef_sum));
            let symbol = ctx.var(&group.symbol);
            let core = match group.exponent {
                None => symbol,
                Some(exp) => ctx.add(Expr::Pow(symbol, exp)),
            };
            new_terms.push(ctx.add(Expr::Mul(false, vec![grouped, core])));
        }
        new_terms.extend(tail);
        new_terms.extend(numeric_tail);

        let new_expr = if new_terms.len() == 1 {
            new_terms[0]
        } else {
            ctx.add(Expr::Add(new_terms))
        };
        Some(Rewrite::new(new_expr).desc(format!("collect like terms in {}", combined.join(", "))))
    }
);

define_rule!(
    CanonicalizePolyTermRule,
    "Rewrite Coefficient Product",
    ChangeKind::MultiplyPolyTerms,
    |ctx, expr| {
        if !matches!(ctx.get(expr), Expr::Mul(_, _)) {
            return None;
        }
        let term = PolyTerm::from_expr(ctx, expr)?;
        let built = term.build(ctx);
        if exprs_equal(ctx, expr, built) {
            return None;
        }
        Some(Rewrite::new(built).desc("rewrite as a single polynomial term"))
    }
);

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(MultiplyLikeTermsRule));
    simplifier.add_rule(Box::new(CombineLikeTermsRule));
    simplifier.add_rule(Box::new(CanonicalizePolyTermRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use mathwalk_ast::DisplayExpr;
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
    fn squares_a_repeated_symbol() {
        assert_eq!(
            apply(&MultiplyLikeTermsRule, "x * x").as_deref(),
            Some("x^(1 + 1)")
        );
    }

    #[test]
    fn multiplies_coefficients_and_sums_exponents() {
        assert_eq!(
            apply(&MultiplyLikeTermsRule, "2x * 3x").as_deref(),
            Some("6x^(1 + 1)")
        );
        assert_eq!(
            apply(&MultiplyLikeTermsRule, "2x^2 * y * x * y^3").as_deref(),
            Some("2 * x^(2 + 1) * y^(1 + 3)")
        );
    }

    #[test]
    fn symbolic_exponents_add() {
        assert_eq!(
            apply(&MultiplyLikeTermsRule, "x^a * x^b").as_deref(),
            Some("x^(a + b)")
        );
    }

    #[test]
    fn negative_coefficient_becomes_outer_negation() {
        assert_eq!(
            apply(&MultiplyLikeTermsRule, "3x * (-4x)").as_deref(),
            Some("-12x^(1 + 1)")
        );
    }

    #[test]
    fn no_shared_symbols_means_no_change() {
        assert_eq!(apply(&MultiplyLikeTermsRule, "2x * 3y"), None);
    }

    #[test]
    fn combines_like_terms_by_symbol_and_exponent() {
        assert_eq!(
            apply(&CombineLikeTermsRule, "x + 2x").as_deref(),
            Some("(1 + 2) * x")
        );
        assert_eq!(
            apply(&CombineLikeTermsRule, "x^2 + x + 3x^2").as_deref(),
            Some("(1 + 3) * x^2 + x")
        );
    }

    #[test]
    fn combined_groups_sort_by_falling_degree() {
        assert_eq!(
            apply(&CombineLikeTermsRule, "6 + x^2 + 5x^3 + 3x^2").as_deref(),
            Some("5x^3 + (1 + 3) * x^2 + 6")
        );
    }

    #[test]
    fn fraction_coefficients_participate() {
        assert_eq!(
            apply(&CombineLikeTermsRule, "x + x/2").as_deref(),
            Some("(1 + 1/2) * x")
        );
    }

    #[test]
    fn canonicalizes_coefficient_products() {
        assert_eq!(apply(&CanonicalizePolyTermRule, "x * 2").as_deref(), Some("2x"));
        assert!(apply(&CanonicalizePolyTermRule, "x * y").is_none());
    }
}
