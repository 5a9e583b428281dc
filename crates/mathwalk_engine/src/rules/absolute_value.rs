//! Absolute value of exact constants.

use crate::change::ChangeKind;
use crate::define_rule;
use crate::rule::Rewrite;
use mathwalk_ast::{numeric_value, Expr};
use num_traits::Signed;

define_rule!(
    AbsoluteValueRule,
    "Evaluate Absolute Value",
    ChangeKind::AbsoluteValue,
    |ctx, expr| {
        if let Expr::Function(name, args) = ctx.get(expr) {
            if name == "abs" && args.len() == 1 {
                let arg = args[0];
                let value = numeric_value(ctx, arg)?;
                let magnitude = value.abs();
                let new_expr = ctx.rat(&magnitude);
                return Some(Rewrite::new(new_expr).desc(format!("|{}| = {}", value, magnitude)));
            }
        }
        None
    }
);

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(AbsoluteValueRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use mathwalk_ast::{Context, DisplayExpr};
    use mathwalk_parser::parse;

    fn apply(input: &str) -> Option<String> {
        let mut ctx = Context::new();
        let id = parse(input, &mut ctx).expect("parse failed");
        let id = crate::normalize::normalize(&mut ctx, id);
        let rewrite = AbsoluteValueRule.apply(&mut ctx, id)?;
        Some(format!(
            "{}",
            DisplayExpr {
                context: &ctx,
                id: rewrite.new_expr
            }
        ))
    }

    #[test]
    fn folds_constant_arguments() {
        assert_eq!(apply("abs(-3)").as_deref(), Some("3"));
        assert_eq!(apply("abs(2/3)").as_deref(), Some("2/3"));
        assert_eq!(apply("abs(-2/3)").as_deref(), Some("2/3"));
    }

    #[test]
    fn symbolic_arguments_are_retained() {
        assert_eq!(apply("abs(x)"), None);
        assert_eq!(apply("abs(x - 1)"), None);
    }
}
