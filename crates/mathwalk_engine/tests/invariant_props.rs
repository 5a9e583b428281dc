//! Property-based invariants: numeric agreement with exact rational
//! evaluation, flatness and canonical sign of normal forms, idempotence,
//! one-term-per-exponent after like-term collection, and lens negation.

use mathwalk_ast::{exprs_equal, numeric_value, Context, Expr, ExprId};
use mathwalk_engine::{PolyTerm, Simplifier};
use mathwalk_parser::parse;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use proptest::prelude::*;

/// Direct exact evaluation, independent of the rewrite engine.
fn eval(ctx: &Context, id: ExprId) -> Option<BigRational> {
    match ctx.get(id) {
        Expr::Number(n) => Some(n.clone()),
        Expr::Symbol(_) => None,
        Expr::Add(terms) => {
            let mut sum = BigRational::zero();
            for &t in terms {
                sum += eval(ctx, t)?;
            }
            Some(sum)
        }
        Expr::Sub(l, r) => Some(eval(ctx, *l)? - eval(ctx, *r)?),
        Expr::Mul(_, factors) => {
            let mut product = BigRational::from_integer(1.into());
            for &f in factors {
                product *= eval(ctx, f)?;
            }
            Some(product)
        }
        Expr::Div(l, r) => {
            let den = eval(ctx, *r)?;
            if den.is_zero() {
                return None;
            }
            Some(eval(ctx, *l)? / den)
        }
        Expr::Pow(b, e) => {
            let exp = eval(ctx, *e)?;
            if !exp.is_integer() || exp.is_negative() {
                return None;
            }
            let n = exp.to_integer().to_i32()?;
            if n > 16 {
                return None;
            }
            Some(eval(ctx, *b)?.pow(n))
        }
        Expr::Neg(inner) => Some(-eval(ctx, *inner)?),
        Expr::Paren(inner) => eval(ctx, *inner),
        Expr::Function(name, args) => {
            if name == "abs" && args.len() == 1 {
                Some(eval(ctx, args[0])?.abs())
            } else {
                None
            }
        }
    }
}

fn assert_flat_and_sign_canonical(ctx: &Context, id: ExprId) {
    match ctx.get(id) {
        Expr::Add(terms) => {
            assert!(terms.len() >= 2, "underfilled + node");
            for &t in terms {
                assert!(
                    !matches!(ctx.get(t), Expr::Add(_)),
                    "+ directly under + in normal form"
                );
            }
        }
        Expr::Mul(_, factors) => {
            assert!(factors.len() >= 2, "underfilled * node");
            for &f in factors {
                assert!(
                    !matches!(ctx.get(f), Expr::Mul(_, _)),
                    "* directly under * in normal form"
                );
            }
        }
        Expr::Div(_, _) => {
            if let Some((_, d)) = mathwalk_ast::as_constant_fraction(ctx, id) {
                assert!(d.is_positive(), "constant fraction with non-positive denominator");
            }
        }
        _ => {}
    }
    for child in ctx.children(id) {
        assert_flat_and_sign_canonical(ctx, child);
    }
}

/// Random fully-constant expression, rendered as source text.
fn arb_constant_expr() -> impl Strategy<Value = String> {
    let leaf = (0i64..=12).prop_map(|n| n.to_string());
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({} + {})", a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({} - {})", a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({} * {})", a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({} / {})", a, b)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn constant_expressions_evaluate_exactly(input in arb_constant_expr()) {
        let mut simplifier = Simplifier::with_default_rules();
        let expr = parse(&input, &mut simplifier.context).expect("generated input parses");
        let expected = eval(&simplifier.context, expr);
        prop_assume!(expected.is_some());
        let expected = expected.expect("assumed");

        let (result, _) = simplifier.simplify(expr).expect("simplify succeeds");
        let got = numeric_value(&simplifier.context, result);
        prop_assert_eq!(
            got.clone(),
            Some(expected),
            "engine result {:?} disagrees with exact evaluation for {}",
            got,
            input
        );
        assert_flat_and_sign_canonical(&simplifier.context, result);
    }

    #[test]
    fn simplification_is_idempotent_on_constants(input in arb_constant_expr()) {
        let mut simplifier = Simplifier::with_default_rules();
        let expr = parse(&input, &mut simplifier.context).expect("generated input parses");
        prop_assume!(eval(&simplifier.context, expr).is_some());
        let (once, _) = simplifier.simplify(expr).expect("first pass");
        let (twice, steps) = simplifier.simplify(once).expect("second pass");
        prop_assert!(steps.is_empty());
        prop_assert!(exprs_equal(&simplifier.context, once, twice));
    }

    #[test]
    fn collection_leaves_one_term_per_exponent(
        terms in proptest::collection::vec((-9i64..=9, 0u32..=4), 1..6)
    ) {
        let rendered: Vec<String> = terms
            .iter()
            .map(|(c, e)| format!("{} * x^{}", c, e))
            .collect();
        let input = rendered.join(" + ");

        let mut simplifier = Simplifier::with_default_rules();
        let expr = parse(&input, &mut simplifier.context).expect("generated input parses");
        let (result, _) = simplifier.simplify(expr).expect("simplify succeeds");

        let ctx = &simplifier.context;
        let addends: Vec<ExprId> = match ctx.get(result) {
            Expr::Add(ts) => ts.clone(),
            _ => vec![result],
        };
        let mut seen_degrees: Vec<BigRational> = Vec::new();
        for addend in addends {
            if let Some(term) = PolyTerm::from_expr(ctx, addend) {
                if term.symbol == "x" {
                    if let Some(degree) = term.degree(ctx) {
                        prop_assert!(
                            !seen_degrees.contains(&degree),
                            "two terms of degree {} survived in {}",
                            degree,
                            input
                        );
                        seen_degrees.push(degree);
                    }
                }
            }
        }
    }

    #[test]
    fn lens_negation_is_an_involution(coef in -20i64..=20, exp in 1u32..=5) {
        prop_assume!(coef != 0);
        let mut ctx = Context::new();
        let input = format!("{} * x^{}", coef, exp);
        let expr = parse(&input, &mut ctx).expect("generated input parses");
        let term = PolyTerm::from_expr(&ctx, expr).expect("polynomial term");

        let negate = |t: &PolyTerm| PolyTerm {
            coefficient: -t.coefficient.clone(),
            symbol: t.symbol.clone(),
            exponent: t.exponent,
        };
        let double = negate(&negate(&term));
        let original = term.build(&mut ctx);
        let restored = double.build(&mut ctx);
        prop_assert!(exprs_equal(&ctx, original, restored));
        prop_assert_eq!(double.coefficient, term.coefficient);
    }
}
