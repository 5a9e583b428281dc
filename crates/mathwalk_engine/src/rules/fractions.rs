//! Constant-fraction arithmetic.
//!
//! These rules work on the fraction *children* of a sum or product and
//! leave unrelated siblings in place, so `x + 1/2 - 1/2` cancels its
//! fractions without disturbing `x`. Denominators are expected positive;
//! negative denominators are the sign rules' business and make these rules
//! pass.

use crate::change::ChangeKind;
use crate::define_rule;
use crate::helpers::{const_eval, gcd, lcm};
use crate::rule::Rewrite;
use mathwalk_ast::{as_constant_fraction, as_signed_constant_fraction, Context, Expr, ExprId};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

fn fraction_children(ctx: &Context, terms: &[ExprId]) -> Vec<(usize, BigRational, BigRational)> {
    terms
        .iter()
        .enumerate()
        .filter_map(|(i, &t)| {
            let (n, d) = as_signed_constant_fraction(ctx, t)?;
            d.is_positive().then(|| (i, n, d))
        })
        .collect()
}

/// A fraction-shaped addend whose sides are fully-constant subtrees —
/// `4/5`, but also the unfolded `(4 * 5)/(9 * 5)` a common-denominator
/// step leaves behind. Matching those by denominator *value* lets the
/// addition fire before the gcd rule could reduce an individual addend
/// and undo the scaling.
struct SubtreeFraction {
    index: usize,
    /// Numerator node, with an outer negation already folded in.
    numerator: ExprId,
    denominator: ExprId,
    den_value: BigRational,
}

fn subtree_fractions(ctx: &mut Context, terms: &[ExprId]) -> Vec<SubtreeFraction> {
    let mut out = Vec::new();
    for (i, &t) in terms.iter().enumerate() {
        let bare = ctx.unwrap_parens(t);
        let (negated, core) = match ctx.get(bare) {
            Expr::Neg(inner) => (true, ctx.unwrap_parens(*inner)),
            _ => (false, bare),
        };
        if let Expr::Div(num, den) = ctx.get(core).clone() {
            if !ctx.is_constant_subtree(num) || !ctx.is_constant_subtree(den) {
                continue;
            }
            let den_value = match const_eval(ctx, den) {
                Some(v) if v.is_positive() => v,
                _ => continue,
            };
            let numerator = if negated {
                ctx.add(Expr::Neg(num))
            } else {
                num
            };
            out.push(SubtreeFraction {
                index: i,
                numerator,
                denominator: den,
                den_value,
            });
        }
    }
    out
}

define_rule!(
    AddConstantFractionsRule,
    "Add Constant Fractions",
    ChangeKind::AddFractions,
    |ctx, expr| {
        let terms = match ctx.get(expr) {
            Expr::Add(terms) => terms.clone(),
            _ => return None,
        };
        let fractions = subtree_fractions(ctx, &terms);
        if fractions.len() >= 2 {
            let first_den = fractions[0].den_value.clone();
            if fractions.iter().all(|f| f.den_value == first_den) {
                // Shared denominator (by value): one fraction with the
                // summed numerators, keeping each numerator's current form.
                let numerators: Vec<ExprId> = fractions.iter().map(|f| f.numerator).collect();
                let inner = ctx.add(Expr::Add(numerators));
                let grouped = ctx.add(Expr::Paren(inner));
                let combined = ctx.add(Expr::Div(grouped, fractions[0].denominator));

                let mut new_terms = Vec::new();
                let mut placed = false;
                let fraction_idx: Vec<usize> = fractions.iter().map(|f| f.index).collect();
                for (i, &t) in terms.iter().enumerate() {
                    if fraction_idx.contains(&i) {
                        if !placed {
                            new_terms.push(combined);
                            placed = true;
                        }
                    } else {
                        new_terms.push(t);
                    }
                }
                let new_expr = if new_terms.len() == 1 {
                    new_terms[0]
                } else {
                    ctx.add(Expr::Add(new_terms))
                };
                return Some(
                    Rewrite::new(new_expr)
                        .desc(format!("add the numerators over {}", first_den)),
                );
            }
        }

        // Different denominators: scale every plain constant fraction up to
        // the LCM, shown as explicit products so the next steps can
        // evaluate them. Unfolded fractions wait for their arithmetic.
        let plain = fraction_children(ctx, &terms);
        if plain.len() < 2 || plain.len() != fractions.len() {
            return None;
        }
        let common = plain
            .iter()
            .fold(BigInt::one(), |acc, (_, _, d)| lcm(&acc, &d.to_integer()));
        let mut new_terms = terms.clone();
        for (i, n, d) in &plain {
            let factor = &common / d.to_integer();
            if factor.is_one() {
                continue;
            }
            let n_expr = ctx.rat(n);
            let f_num = ctx.big(factor.clone());
            let num_product = ctx.add(Expr::Mul(false, vec![n_expr, f_num]));
            let num_grouped = ctx.add(Expr::Paren(num_product));

            let d_expr = ctx.rat(d);
            let f_den = ctx.big(factor);
            let den_product = ctx.add(Expr::Mul(false, vec![d_expr, f_den]));
            let den_grouped = ctx.add(Expr::Paren(den_product));

            new_terms[*i] = ctx.add(Expr::Div(num_grouped, den_grouped));
        }
        Some(
            Rewrite::new(ctx.add(Expr::Add(new_terms)))
                .desc(format!("the least common denominator is {}", common))
                .with_change(ChangeKind::CommonDenominator),
        )
    }
);

define_rule!(
    AddConstantAndFractionRule,
    "Write Integers as Fractions",
    ChangeKind::CommonDenominator,
    |ctx, expr| {
        let terms = match ctx.get(expr) {
            Expr::Add(terms) => terms.clone(),
            _ => return None,
        };
        let fractions = fraction_children(ctx, &terms);
        if fractions.is_empty() {
            return None;
        }
        let constants: Vec<(usize, BigRational)> = terms
            .iter()
            .enumerate()
            .filter_map(|(i, &t)| ctx.constant_value(t).map(|v| (i, v)))
            .collect();
        if constants.is_empty() {
            return None;
        }
        let lcd = fractions
            .iter()
            .fold(BigInt::one(), |acc, (_, _, d)| lcm(&acc, &d.to_integer()));
        let mut new_terms = terms.clone();
        for (i, v) in &constants {
            let scaled = v * BigRational::from_integer(lcd.clone());
            let num = ctx.rat(&scaled);
            let den = ctx.big(lcd.clone());
            new_terms[*i] = ctx.add(Expr::Div(num, den));
        }
        Some(
            Rewrite::new(ctx.add(Expr::Add(new_terms)))
                .desc(format!("write integers over the denominator {}", lcd)),
        )
    }
);

define_rule!(
    MultiplyConstantsAndFractionsRule,
    "Multiply Constants and Fractions",
    ChangeKind::MultiplyFractions,
    |ctx, expr| {
        let factors = match ctx.get(expr) {
            Expr::Mul(_, factors) => factors.clone(),
            _ => return None,
        };
        let mut numerators: Vec<ExprId> = Vec::new();
        let mut denominators: Vec<ExprId> = Vec::new();
        let mut fraction_count = 0usize;
        for &f in &factors {
            if let Some((n, d)) = as_signed_constant_fraction(ctx, f) {
                if !d.is_positive() {
                    return None;
                }
                let n_expr = ctx.rat(&n);
                let d_expr = ctx.rat(&d);
                numerators.push(n_expr);
                denominators.push(d_expr);
                fraction_count += 1;
            } else if let Some(v) = ctx.constant_value(f) {
                let v_expr = ctx.rat(&v);
                numerators.push(v_expr);
            } else {
                return None;
            }
        }
        if fraction_count == 0 || factors.len() < 2 {
            return None;
        }
        let num_node = if numerators.len() == 1 {
            numerators[0]
        } else {
            let product = ctx.add(Expr::Mul(false, numerators));
            ctx.add(Expr::Paren(product))
        };
        let den_node = if denominators.len() == 1 {
            denominators[0]
        } else {
            let product = ctx.add(Expr::Mul(false, denominators));
            ctx.add(Expr::Paren(product))
        };
        let new_expr = ctx.add(Expr::Div(num_node, den_node));
        Some(Rewrite::new(new_expr).desc("multiply numerators and denominators"))
    }
);

define_rule!(
    DivideByFractionRule,
    "Divide by a Fraction",
    ChangeKind::MultiplyFractions,
    |ctx, expr| {
        if let Expr::Div(num, den) = ctx.get(expr) {
            let (num, den) = (*num, *den);
            let (n, d) = as_constant_fraction(ctx, den)?;
            if n.is_zero() {
                return None;
            }
            // Dividing by n/d multiplies by d/n.
            let new_num = ctx.rat(&d);
            let new_den = ctx.rat(&n);
            let reciprocal = ctx.add(Expr::Div(new_num, new_den));
            let new_expr = ctx.add(Expr::Mul(false, vec![num, reciprocal]));
            return Some(
                Rewrite::new(new_expr).desc("multiply by the reciprocal of the denominator"),
            );
        }
        None
    }
);

define_rule!(
    SimplifyFractionRule,
    "Reduce Fraction to Lowest Terms",
    ChangeKind::SimplifyFraction,
    |ctx, expr| {
        if !matches!(ctx.get(expr), Expr::Div(_, _)) {
            return None;
        }
        let (n, d) = as_constant_fraction(ctx, expr)?;
        let mut ni = n.to_integer();
        let mut di = d.to_integer();
        if di.is_zero() {
            return None;
        }
        let mut flipped = false;
        if di.is_negative() {
            // The canonical denominator is positive; the sign moves up.
            ni = -ni;
            di = -di;
            flipped = true;
        }
        let g = gcd(&ni.abs(), &di);
        let reduced_num = &ni / &g;
        let reduced_den = &di / &g;
        if reduced_den.is_one() {
            let new_expr = ctx.big(reduced_num.clone());
            return Some(Rewrite::new(new_expr).desc(format!("{}/{} = {}", ni, di, reduced_num)));
        }
        if g.is_one() && !flipped {
            return None;
        }
        let num_expr = ctx.big(reduced_num.clone());
        let den_expr = ctx.big(reduced_den.clone());
        let new_expr = ctx.add(Expr::Div(num_expr, den_expr));
        Some(Rewrite::new(new_expr).desc(format!(
            "divide numerator and denominator by {}",
            g
        )))
    }
);

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(AddConstantFractionsRule));
    simplifier.add_rule(Box::new(AddConstantAndFractionRule));
    simplifier.add_rule(Box::new(MultiplyConstantsAndFractionsRule));
    simplifier.add_rule(Box::new(DivideByFractionRule));
    simplifier.add_rule(Box::new(SimplifyFractionRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use mathwalk_ast::DisplayExpr;
    use mathwalk_parser::parse;

    fn apply(rule: &dyn Rule, input: &str) -> Option<(String, Option<ChangeKind>)> {
        let mut ctx = Context::new();
        let id = parse(input, &mut ctx).expect("parse failed");
        let id = crate::normalize::normalize(&mut ctx, id);
        let rewrite = rule.apply(&mut ctx, id)?;
        let shown = format!(
            "{}",
            DisplayExpr {
                context: &ctx,
                id: rewrite.new_expr
            }
        );
        Some((shown, rewrite.change))
    }

    #[test]
    fn same_denominator_adds_numerators() {
        let (shown, change) = apply(&AddConstantFractionsRule, "4/5 + 3/5").unwrap();
        assert_eq!(shown, "(4 + 3)/5");
        assert_eq!(change, None); // default kind: ADD_FRACTIONS
    }

    #[test]
    fn different_denominators_scale_to_the_lcm() {
        let (shown, change) = apply(&AddConstantFractionsRule, "4/9 + 3/5").unwrap();
        assert_eq!(shown, "(4 * 5)/(9 * 5) + (3 * 9)/(5 * 9)");
        assert_eq!(change, Some(ChangeKind::CommonDenominator));
    }

    #[test]
    fn fraction_siblings_combine_without_disturbing_others() {
        let (shown, _) = apply(&AddConstantFractionsRule, "x + 1/2 + 3/2").unwrap();
        assert_eq!(shown, "x + (1 + 3)/2");
    }

    #[test]
    fn integers_are_rewritten_over_the_lcd() {
        let (shown, _) = apply(&AddConstantAndFractionRule, "1 + 1/2").unwrap();
        assert_eq!(shown, "2/2 + 1/2");
    }

    #[test]
    fn products_gather_into_one_fraction() {
        let (shown, _) =
            apply(&MultiplyConstantsAndFractionsRule, "3 * 1/5 * 5/9").unwrap();
        assert_eq!(shown, "(3 * 1 * 5)/(5 * 9)");
    }

    #[test]
    fn fractions_reduce_by_gcd() {
        let (shown, _) = apply(&SimplifyFractionRule, "2/4").unwrap();
        assert_eq!(shown, "1/2");
        let (shown, _) = apply(&SimplifyFractionRule, "12/27").unwrap();
        assert_eq!(shown, "4/9");
        assert!(apply(&SimplifyFractionRule, "4/9").is_none());
    }

    #[test]
    fn dividing_by_a_fraction_multiplies_by_its_reciprocal() {
        let (shown, _) = apply(&DivideByFractionRule, "x / (2/3)").unwrap();
        assert_eq!(shown, "x * 3/2");
        assert!(apply(&DivideByFractionRule, "x / 2").is_none());
    }

    #[test]
    fn reduction_to_an_integer_unwraps_the_fraction() {
        let (shown, _) = apply(&SimplifyFractionRule, "4/2").unwrap();
        assert_eq!(shown, "2");
    }
}
