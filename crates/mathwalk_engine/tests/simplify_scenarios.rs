//! End-to-end simplification scenarios: parse, run to the normal form,
//! compare printed output, and check selected step annotations.

use mathwalk_ast::DisplayExpr;
use mathwalk_engine::{ChangeKind, Simplifier};
use mathwalk_parser::parse;

fn simplified(input: &str) -> String {
    let mut simplifier = Simplifier::with_default_rules();
    let expr = parse(input, &mut simplifier.context).expect("parse failed");
    let (result, _) = simplifier.simplify(expr).expect("simplify failed");
    format!(
        "{}",
        DisplayExpr {
            context: &simplifier.context,
            id: result
        }
    )
}

fn first_step(input: &str) -> (ChangeKind, String) {
    let mut simplifier = Simplifier::with_default_rules();
    let expr = parse(input, &mut simplifier.context).expect("parse failed");
    let steps = simplifier.step_through(expr).expect("simplify failed");
    let step = steps.first().expect("expected at least one step");
    let shown = format!(
        "{}",
        DisplayExpr {
            context: &simplifier.context,
            id: step.after
        }
    );
    (step.change, shown)
}

fn changes(input: &str) -> Vec<ChangeKind> {
    let mut simplifier = Simplifier::with_default_rules();
    let expr = parse(input, &mut simplifier.context).expect("parse failed");
    let steps = simplifier.step_through(expr).expect("simplify failed");
    steps.into_iter().map(|s| s.change).collect()
}

#[test]
fn same_denominator_fractions_add_in_one_visible_step() {
    let (change, shown) = first_step("4/5 + 3/5");
    assert_eq!(change, ChangeKind::AddFractions);
    assert_eq!(shown, "(4 + 3)/5");
    assert_eq!(simplified("4/5 + 3/5"), "7/5");
}

#[test]
fn different_denominators_go_through_the_lcm_first() {
    let (change, shown) = first_step("4/9 + 3/5");
    assert_eq!(change, ChangeKind::CommonDenominator);
    assert_eq!(shown, "(4 * 5)/(9 * 5) + (3 * 9)/(5 * 9)");
    assert_eq!(simplified("4/9 + 3/5"), "47/45");
}

#[test]
fn fractions_reduce_to_lowest_terms() {
    assert_eq!(simplified("2/4"), "1/2");
    assert_eq!(simplified("-3/-2"), "3/2");
    assert_eq!(simplified("12/27"), "4/9");
}

#[test]
fn products_of_constants_and_fractions_merge() {
    let (change, shown) = first_step("3 * 1/5 * 5/9");
    assert_eq!(change, ChangeKind::MultiplyFractions);
    assert_eq!(shown, "(3 * 1 * 5)/(5 * 9)");
    assert_eq!(simplified("3 * 1/5 * 5/9"), "1/3");
}

#[test]
fn constant_expressions_fold_completely() {
    assert_eq!(simplified("(2 + 2) * 5"), "20");
    assert_eq!(simplified("(8 - 2) * 2^2 * (1 + 1)/(4/2)/5"), "24/5");
}

#[test]
fn polynomial_collection_orders_by_degree() {
    assert_eq!(
        simplified("x^2 + 3x * (-4x) + 5x^3 + 3x^2 + 6"),
        "5x^3 - 8x^2 + 6"
    );
}

#[test]
fn like_factors_multiply_across_symbols() {
    assert_eq!(simplified("2x^2 * y * x * y^3"), "2 * x^3 * y^4");
    assert_eq!(simplified("x * x"), "x^2");
    assert_eq!(simplified("2x * 3x"), "6x^2");
}

#[test]
fn triple_binomial_product_expands_fully() {
    assert_eq!(
        simplified("(3 + x)(4 + x)(x + 5)"),
        "x^3 + 12x^2 + 47x + 60"
    );
}

#[test]
fn division_cancels_shared_symbol_powers() {
    assert_eq!(simplified("(x^3 * y)/x^2 + 5"), "x * y + 5");
    assert_eq!(simplified("x^2/x"), "x");
    assert_eq!(simplified("(-x)/x"), "-1");
}

#[test]
fn fraction_coefficients_combine_into_one_term() {
    assert_eq!(simplified("x + x/2"), "3/2 x");
}

#[test]
fn resolve_add_unary_minus_is_the_first_step() {
    let (change, shown) = first_step("x + (-3)");
    assert_eq!(change, ChangeKind::ResolveAddUnaryMinus);
    assert_eq!(shown, "x - 3");
}

#[test]
fn absolute_values_of_constants_fold() {
    assert_eq!(simplified("abs(-3)"), "3");
    assert_eq!(simplified("abs(2/3) + 1"), "5/3");
    assert_eq!(simplified("abs(abs(-4))"), "4");
    assert_eq!(simplified("abs(x)"), "abs(x)");
}

#[test]
fn unsupported_functions_leave_the_tree_untouched() {
    let mut simplifier = Simplifier::with_default_rules();
    let expr = parse("sqrt(x) + 1", &mut simplifier.context).expect("parse failed");
    let (result, steps) = simplifier.simplify(expr).expect("simplify failed");
    assert_eq!(result, expr);
    assert!(steps.is_empty());
}

#[test]
fn traces_replay_to_the_final_tree() {
    let mut simplifier = Simplifier::with_default_rules();
    let expr = parse("x^2 + 3x * (-4x) + 5x^3 + 3x^2 + 6", &mut simplifier.context)
        .expect("parse failed");
    let (result, steps) = simplifier.simplify(expr).expect("simplify failed");
    assert!(!steps.is_empty());
    // Each step's after-tree is the next step's input; the last one is the
    // result itself.
    let last = steps.last().expect("non-empty");
    assert_eq!(last.after, result);
    for pair in steps.windows(2) {
        assert_eq!(pair[0].after, pair[1].before);
    }
}

#[test]
fn double_negation_is_a_visible_step() {
    let kinds = changes("-(-x)");
    assert_eq!(kinds, vec![ChangeKind::DoubleUnaryMinus]);
    assert_eq!(simplified("-(-(-x))"), "-x");
}

#[test]
fn step_records_serialize_for_front_ends() {
    let mut simplifier = Simplifier::with_default_rules();
    let expr = parse("4/5 + 3/5", &mut simplifier.context).expect("parse failed");
    let steps = simplifier.step_through(expr).expect("simplify failed");
    let json = serde_json::to_string(&steps).expect("steps serialize");
    assert!(json.contains("\"ADD_FRACTIONS\""));
}

#[test]
fn simplification_is_idempotent() {
    for input in [
        "4/9 + 3/5",
        "x + x/2",
        "(3 + x)(4 + x)(x + 5)",
        "2x^2 * y * x * y^3",
        "x^2 + 3x * (-4x) + 5x^3 + 3x^2 + 6",
    ] {
        let mut simplifier = Simplifier::with_default_rules();
        let expr = parse(input, &mut simplifier.context).expect("parse failed");
        let (once, _) = simplifier.simplify(expr).expect("first pass");
        let (twice, steps) = simplifier.simplify(once).expect("second pass");
        assert!(
            steps.is_empty(),
            "second pass on {:?} still produced steps",
            input
        );
        assert!(mathwalk_ast::exprs_equal(&simplifier.context, once, twice));
    }
}

#[test]
fn printed_normal_forms_reparse_to_the_same_normal_form() {
    for input in [
        "4/9 + 3/5",
        "x + x/2",
        "(3 + x)(4 + x)(x + 5)",
        "x^2 + 3x * (-4x) + 5x^3 + 3x^2 + 6",
        "(x^3 * y)/x^2 + 5",
    ] {
        let first = simplified(input);
        let second = simplified(&first);
        assert_eq!(first, second, "round-trip diverged for {:?}", input);
    }
}
